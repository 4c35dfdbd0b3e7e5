//! pagecut decides where pages break in already laid-out HTML content.
//!
//! The decision engine lives in [`pagecut_pagination`] and talks to its host
//! through the traits of [`pagecut_traits`]. This crate ties the engine to the
//! in-memory reference host of [`pagecut_dom`]: fixtures in, page reports out.

pub mod error;

pub use error::PipelineError;

pub use pagecut_dom::{
    Document, DocumentBuilder, DocumentError, DocumentFixture, ElementSpec, LayoutOptions, NodeId,
    NodeSpec,
};
pub use pagecut_pagination::{
    FlowContext, Mark, MarkSet, Page, PaginationConfig, PaginationError, PaginationOutcome,
    paginate,
};
pub use pagecut_style::{ComputedStyle, Display, SelectorList};
pub use pagecut_traits::{DomMutator, GeometryOracle, SyntheticTag};
pub use pagecut_types::Rect;

use serde::Serialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// One page of a [`PaginationReport`], with nodes rendered as labels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageReport {
    pub number: usize,
    pub top: f32,
    pub bottom: f32,
    pub start: String,
    pub end: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaginationReport {
    pub pages: Vec<PageReport>,
    pub assertions: Vec<String>,
}

impl PaginationReport {
    pub fn new(doc: &Document, outcome: &PaginationOutcome<NodeId>) -> Self {
        let pages = outcome
            .pages
            .iter()
            .enumerate()
            .map(|(index, page)| PageReport {
                number: index + 1,
                top: page.page_top,
                bottom: page.page_bottom,
                start: doc.describe(page.page_start),
                end: page.page_end.map(|end| doc.describe(end)),
            })
            .collect();
        Self {
            pages,
            assertions: outcome.assertions.clone(),
        }
    }
}

pub fn load_fixture(path: impl AsRef<Path>) -> Result<DocumentFixture, PipelineError> {
    let file = File::open(path)?;
    Ok(DocumentFixture::from_reader(BufReader::new(file))?)
}

pub fn load_config(path: impl AsRef<Path>) -> Result<PaginationConfig, PipelineError> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

/// Builds the fixture and paginates its root element as the content flow.
///
/// The document is returned alongside the outcome since page starts and the
/// synthetic nodes inserted while splitting live in its tree.
pub fn paginate_fixture(
    fixture: &DocumentFixture,
    config: PaginationConfig,
) -> Result<(Document, PaginationOutcome<NodeId>), PipelineError> {
    let mut doc = fixture.build()?;
    let root = doc.root();
    let outcome = paginate(&mut doc, root, root, config)?;
    Ok((doc, outcome))
}
