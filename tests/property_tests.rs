mod common;

use common::{
    TestResult, assert_page_geometry, by_id, config, document, fixed_block, fixture, init_logger,
    page_tops, paragraph, run, words,
};
use pagecut::{FlowContext, GeometryOracle, Mark, PaginationConfig, SyntheticTag};
use serde_json::{Value, json};

fn table(rows: usize) -> Value {
    let rows: Vec<Value> = (0..rows)
        .map(|i| json!({ "tag": "tr", "children": [{ "tag": "td", "children": [format!("row {i}")] }] }))
        .collect();
    json!({ "tag": "table", "children": rows })
}

fn preformatted(lines: usize) -> Value {
    let text = (0..lines)
        .map(|i| format!("line {i}"))
        .collect::<Vec<_>>()
        .join("\n");
    json!({ "tag": "pre", "children": [text] })
}

fn mixed_report() -> Vec<Value> {
    let mut children = vec![json!({ "tag": "h1", "children": ["Quarterly report"] })];
    for i in 0..6 {
        children.push(paragraph(&format!("p{i}"), 4 + i));
        children.push(json!({
            "tag": "img",
            "style": format!("height: {}px; width: 300px", 80 + 40 * i)
        }));
    }
    children.push(table(40));
    children.push(fixed_block("chart", 260));
    children.push(preformatted(30));
    children
}

#[test]
fn page_tops_strictly_increase_for_varied_content() -> TestResult {
    for reference_height in [250.0, 400.0, 700.0] {
        let (_, outcome) = run(document(mixed_report()), config(reference_height))?;
        assert!(outcome.pages.len() > 1, "{reference_height}px pages");
        assert_page_geometry(&outcome, reference_height);
    }
    Ok(())
}

#[test]
fn short_flow_is_a_single_untouched_page() -> TestResult {
    let (doc, outcome) = run(
        document(vec![paragraph("a", 3), paragraph("b", 3)]),
        config(1000.0),
    )?;

    assert_eq!(page_tops(&outcome), vec![0.0]);
    for id in ["a", "b"] {
        let p = by_id(&doc, id);
        assert!(!outcome.marks.is_marked(p, Mark::Processed));
        assert!(doc.element_children(p).is_empty());
    }
    Ok(())
}

#[test]
fn no_break_content_is_never_decomposed() -> TestResult {
    let config = PaginationConfig {
        reference_height: 150.0,
        no_break_selectors: "blockquote".into(),
        ..Default::default()
    };
    let quote = json!({
        "tag": "blockquote",
        "attributes": { "id": "q" },
        "children": [words(17 * 10)]
    });
    let (doc, outcome) = run(document(vec![fixed_block("a", 50), quote]), config)?;

    let q = by_id(&doc, "q");
    assert_eq!(outcome.pages[1].page_start, q);
    let fragments = doc.descendants(q).into_iter().filter(|&n| {
        doc.is_synthetic(n, SyntheticTag::TextLine) || doc.is_synthetic(n, SyntheticTag::TextGroup)
    });
    assert_eq!(fragments.count(), 0);
    Ok(())
}

#[test]
fn broken_paragraph_keeps_two_lines_at_each_end() -> TestResult {
    let (doc, outcome) = run(document(vec![paragraph("p", 9)]), config(100.0))?;

    let p = by_id(&doc, "p");
    let (p_top, p_bottom) = (doc.top(p, doc.root()), doc.bottom(p, doc.root()));
    let inside: Vec<f32> = outcome
        .pages
        .iter()
        .filter(|page| doc.contains(p, page.page_start))
        .map(|page| page.page_top)
        .collect();
    assert!(!inside.is_empty());
    for top in inside {
        assert!(top - p_top >= 40.0, "page at {top} leaves an orphan");
        assert!(p_bottom - top >= 40.0, "page at {top} leaves a widow");
    }
    Ok(())
}

#[test]
fn preparing_children_twice_adds_no_wrappers() -> TestResult {
    init_logger();
    let text = json!({ "tag": "p", "attributes": { "id": "p" }, "children": [
        "Lead ",
        { "tag": "em", "children": [words(30)] },
        " and a tail"
    ]});
    let mut doc = fixture(document(vec![text]))?.build()?;
    let p = by_id(&doc, "p");
    let root = doc.root();

    let mut ctx = FlowContext::new(&mut doc, root, root, PaginationConfig::default());
    let first = ctx.get_prepared_children(p);
    let second = ctx.get_prepared_children(p);
    assert_eq!(first, second);

    let wrappers = doc
        .descendants(p)
        .into_iter()
        .filter(|&n| doc.is_synthetic(n, SyntheticTag::ComplexTextBlock))
        .count();
    assert!(wrappers <= 1);
    Ok(())
}
