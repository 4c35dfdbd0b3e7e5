//! Pagination throughput over long synthetic documents
//!
//! Measures a full run (pre-scan, splitting, scanning, edge normalisation) with varying:
//! - Section counts (10, 50, 200)
//! - Page heights (small pages force many line splits)
//!
//! Run benchmarks: `cargo bench --bench pagination_throughput`

use criterion::{BatchSize, BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use pagecut::{
    Document, DocumentBuilder, ElementSpec, LayoutOptions, PaginationConfig, paginate,
};
use std::hint::black_box;

fn words(count: usize) -> String {
    vec!["lorem"; count].join(" ")
}

/// A report-like document: headings, paragraphs, a table and a figure per section.
fn long_document(sections: usize) -> ElementSpec {
    let mut body = ElementSpec::new("body");
    for i in 0..sections {
        body = body
            .child(ElementSpec::new("h2").text(&format!("Section {i}")))
            .child(ElementSpec::new("p").text(&words(120)))
            .child(
                ElementSpec::new("p")
                    .text(&words(40))
                    .child(ElementSpec::new("em").text(&words(30)))
                    .text(&words(50)),
            )
            .child(ElementSpec::new("table").children((0..12).map(|row| {
                ElementSpec::new("tr")
                    .child(ElementSpec::new("td").text(&format!("row {row}")))
                    .child(ElementSpec::new("td").text(&words(3)))
            })))
            .child(ElementSpec::new("img").style("height: 180px; width: 320px"));
    }
    body
}

fn build(spec: &ElementSpec) -> Document {
    DocumentBuilder::new(LayoutOptions::default())
        .build(spec)
        .expect("benchmark document should build")
}

fn run(mut doc: Document, config: PaginationConfig) -> usize {
    let root = doc.root();
    let outcome = paginate(&mut doc, root, root, config).expect("pagination should succeed");
    outcome.pages.len()
}

/// Benchmark pagination with growing document length
fn bench_document_length(c: &mut Criterion) {
    let mut group = c.benchmark_group("document_length");

    for sections in [10, 50, 200] {
        let spec = long_document(sections);
        group.throughput(Throughput::Elements(sections as u64));
        group.bench_with_input(BenchmarkId::from_parameter(sections), &spec, |b, spec| {
            b.iter_batched(
                || build(spec),
                |doc| black_box(run(doc, PaginationConfig::default())),
                BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

/// Benchmark how page height changes the amount of splitting work
fn bench_page_height(c: &mut Criterion) {
    let mut group = c.benchmark_group("page_height");
    let spec = long_document(50);

    for reference_height in [300.0_f32, 1000.0, 3000.0] {
        let config = PaginationConfig {
            reference_height,
            ..Default::default()
        };
        group.bench_with_input(
            BenchmarkId::from_parameter(reference_height as u32),
            &config,
            |b, config| {
                b.iter_batched(
                    || build(&spec),
                    |doc| black_box(run(doc, config.clone())),
                    BatchSize::LargeInput,
                );
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_document_length, bench_page_height);
criterion_main!(benches);
