#![allow(dead_code)]

use pagecut::{
    Document, DocumentFixture, NodeId, PaginationConfig, PaginationOutcome, PipelineError,
    paginate_fixture,
};
use serde_json::{Value, json};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// `count` words of 40px each: seventeen fill a 700px line.
pub fn words(count: usize) -> String {
    vec!["word"; count].join(" ")
}

/// A paragraph of `lines` full 20px lines.
pub fn paragraph(id: &str, lines: usize) -> Value {
    json!({
        "tag": "p",
        "attributes": { "id": id },
        "children": [words(17 * lines)]
    })
}

pub fn fixed_block(id: &str, height: u32) -> Value {
    json!({
        "tag": "div",
        "attributes": { "id": id },
        "style": format!("height: {height}px")
    })
}

/// A `body` root with default layout options around `children`.
pub fn document(children: Vec<Value>) -> Value {
    json!({
        "root": { "tag": "body", "children": children }
    })
}

pub fn fixture(document: Value) -> Result<DocumentFixture, PipelineError> {
    Ok(serde_json::from_value(document)?)
}

pub fn config(reference_height: f32) -> PaginationConfig {
    PaginationConfig {
        reference_height,
        ..Default::default()
    }
}

pub fn run(
    document: Value,
    config: PaginationConfig,
) -> Result<(Document, PaginationOutcome<NodeId>), PipelineError> {
    init_logger();
    paginate_fixture(&fixture(document)?, config)
}

pub fn page_tops(outcome: &PaginationOutcome<NodeId>) -> Vec<f32> {
    outcome.pages.iter().map(|p| p.page_top).collect()
}

/// Page tops strictly increase and every page spans exactly one page height.
pub fn assert_page_geometry(outcome: &PaginationOutcome<NodeId>, reference_height: f32) {
    for pair in outcome.pages.windows(2) {
        assert!(
            pair[0].page_top < pair[1].page_top,
            "page tops must increase: {} then {}",
            pair[0].page_top,
            pair[1].page_top
        );
    }
    for page in &outcome.pages {
        assert_eq!(page.page_bottom, page.page_top + reference_height);
    }
}

pub fn by_id(doc: &Document, id: &str) -> NodeId {
    doc.element_by_id(id)
        .unwrap_or_else(|| panic!("fixture should contain #{id}"))
}
