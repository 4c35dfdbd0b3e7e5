mod common;

use common::{TestResult, document, fixed_block, init_logger, paragraph};
use pagecut::{
    PaginationError, PaginationReport, PipelineError, load_config, load_fixture, paginate_fixture,
};
use serde_json::{Value, json};
use std::fs;

#[test]
fn fixture_and_config_files_produce_a_report() -> TestResult {
    init_logger();
    let dir = tempfile::tempdir()?;
    let document_path = dir.path().join("document.json");
    let config_path = dir.path().join("config.json");
    fs::write(
        &document_path,
        document(vec![fixed_block("a", 400), fixed_block("b", 400), fixed_block("c", 400)])
            .to_string(),
    )?;
    fs::write(&config_path, json!({ "referenceHeight": 1000.0 }).to_string())?;

    let fixture = load_fixture(&document_path)?;
    let config = load_config(&config_path)?;
    assert_eq!(config.min_left_lines, 2);

    let (doc, outcome) = paginate_fixture(&fixture, config)?;
    let report = PaginationReport::new(&doc, &outcome);
    assert_eq!(report.pages.len(), 2);
    assert_eq!(report.pages[1].number, 2);
    assert_eq!(report.pages[1].top, 800.0);
    assert_eq!(report.pages[1].bottom, 1800.0);
    assert_eq!(report.pages[1].start, "div#c");
    assert_eq!(report.pages[0].end.as_deref(), Some("div#b"));

    let json: Value = serde_json::to_value(&report)?;
    assert_eq!(json["pages"][0]["number"], 1);
    assert_eq!(json["assertions"], json!([]));
    Ok(())
}

#[test]
fn layout_options_come_from_the_fixture() -> TestResult {
    init_logger();
    let fixture = serde_json::from_value(json!({
        "layout": { "lineHeight": 40.0 },
        "root": { "tag": "body", "children": [paragraph("p", 1)] }
    }))?;
    let (doc, outcome) = paginate_fixture(&fixture, Default::default())?;
    let p = doc.element_by_id("p").ok_or("missing paragraph")?;
    assert_eq!(pagecut::GeometryOracle::height(&doc, p), 40.0);
    assert_eq!(outcome.pages.len(), 1);
    Ok(())
}

#[test]
fn invalid_config_is_a_pagination_error() -> TestResult {
    init_logger();
    let fixture = serde_json::from_value(document(vec![paragraph("p", 1)]))?;
    let config = serde_json::from_value(json!({ "imageReductionRatio": 1.5 }))?;
    let err = paginate_fixture(&fixture, config).err().ok_or("config should be rejected")?;
    assert!(matches!(
        err,
        PipelineError::Pagination(PaginationError::InvalidConfig(_))
    ));
    Ok(())
}

#[test]
fn missing_and_malformed_files_are_reported() -> TestResult {
    let dir = tempfile::tempdir()?;
    let missing = load_fixture(dir.path().join("nowhere.json"));
    assert!(matches!(missing, Err(PipelineError::Io(_))));

    let broken = dir.path().join("broken.json");
    fs::write(&broken, "{ \"root\": ")?;
    assert!(matches!(load_fixture(&broken), Err(PipelineError::Document(_))));
    assert!(matches!(load_config(&broken), Err(PipelineError::Json(_))));
    Ok(())
}
