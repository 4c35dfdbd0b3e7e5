use crate::config::PaginationConfig;
use crate::context::FlowContext;
use crate::pages::{PaginationOutcome, paginate};
use pagecut_dom::{Document, DocumentBuilder, ElementSpec, LayoutOptions, NodeId};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn el(tag: &str) -> ElementSpec {
    ElementSpec::new(tag)
}

/// Lays out `root` with 20px lines, 8px characters on a 700px wide body.
pub fn build(root: ElementSpec) -> Document {
    DocumentBuilder::new(LayoutOptions::default())
        .build(&root)
        .expect("test fixture should build")
}

/// Runs `f` on a context whose root and flow are the document root.
pub fn with_context<R>(doc: &mut Document, f: impl FnOnce(&mut FlowContext<'_, Document>) -> R) -> R {
    with_config(doc, PaginationConfig::default(), f)
}

pub fn with_config<R>(
    doc: &mut Document,
    config: PaginationConfig,
    f: impl FnOnce(&mut FlowContext<'_, Document>) -> R,
) -> R {
    init_logger();
    let root = doc.root();
    let mut ctx = FlowContext::new(doc, root, root, config);
    f(&mut ctx)
}

/// Paginates the whole document with the given page height.
pub fn paginate_doc(doc: &mut Document, reference_height: f32) -> PaginationOutcome<NodeId> {
    paginate_with(
        doc,
        PaginationConfig {
            reference_height,
            ..Default::default()
        },
    )
}

pub fn paginate_with(doc: &mut Document, config: PaginationConfig) -> PaginationOutcome<NodeId> {
    init_logger();
    let root = doc.root();
    paginate(doc, root, root, config).expect("pagination should succeed")
}

/// Page tops of a run, for compact assertions.
pub fn page_tops(outcome: &PaginationOutcome<NodeId>) -> Vec<f32> {
    outcome.pages.iter().map(|p| p.page_top).collect()
}
