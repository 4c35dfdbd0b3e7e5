use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PaginationError {
    #[error("Pagination assertion failed: {0}")]
    Assertion(String),
    #[error("Tail element is not a descendant of the wrapper it closes")]
    MissingAncestor,
    #[error("Invalid selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },
    #[error("Invalid pagination config: {0}")]
    InvalidConfig(String),
    #[error("Content flow is not an element inside the root")]
    EmptyFlow,
}

pub mod assert;
pub mod config;
pub mod context;
pub mod marks;
pub mod pages;
pub mod queue;

mod children;
mod classifier;
mod collapse;
mod constraints;
mod edges;
mod fitters;
mod paragraph;
mod positioning;
mod probe;
mod splitters;

pub use self::children::{Edge, NodeShape};
pub use self::classifier::{FlowVerdict, SkipReason};
pub use self::config::{LinePolicy, PaginationConfig};
pub use self::constraints::ConstraintSelectors;
pub use self::context::FlowContext;
pub use self::marks::{Mark, MarkSet};
pub use self::pages::{Page, PageStartKind, Pagination, PaginationOutcome, paginate};
pub use self::probe::StyleOverride;

#[cfg(test)]
mod test_utils;
