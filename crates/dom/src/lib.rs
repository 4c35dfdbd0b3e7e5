use pagecut_style::StyleParseError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Failed to read fixture: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid inline style on <{tag}>: {source}")]
    Style {
        tag: String,
        #[source]
        source: StyleParseError,
    },
    #[error("Invalid document: {0}")]
    Invalid(String),
}

pub mod builder;
pub mod defaults;
pub mod document;
pub mod fixture;

pub use self::builder::{DocumentBuilder, ElementSpec, LayoutOptions, NodeSpec};
pub use self::document::{Document, NodeData, NodeKind, WordBox};
pub use self::fixture::DocumentFixture;

// Re-export the node handle so hosts and tests don't need a direct indextree dependency.
pub use indextree::NodeId;
