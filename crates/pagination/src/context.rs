//! Shared state of one pagination run.
//!
//! The engine's operations are spread over several modules as `impl` blocks
//! on [`FlowContext`]; this module holds the state and the small queries
//! every one of them needs.

use crate::assert::Assertions;
use crate::classifier::FlowVerdict;
use crate::config::PaginationConfig;
use crate::marks::{Mark, MarkSet};
use crate::queue::MutationQueue;
use pagecut_style::{ComputedStyle, Display};
use pagecut_traits::{DomMutator, SyntheticTag};
use std::collections::HashMap;

pub struct FlowContext<'d, D: DomMutator> {
    pub(crate) dom: &'d mut D,
    /// Reference for every geometry read.
    pub(crate) root: D::Node,
    /// The content flow being paginated.
    pub(crate) flow: D::Node,
    pub(crate) config: PaginationConfig,
    pub(crate) marks: MarkSet<D::Node>,
    pub(crate) assertions: Assertions,
    pub(crate) queue: MutationQueue<D::Node>,
    pub(crate) verdicts: HashMap<D::Node, FlowVerdict>,
}

impl<'d, D: DomMutator> FlowContext<'d, D> {
    pub fn new(dom: &'d mut D, root: D::Node, flow: D::Node, config: PaginationConfig) -> Self {
        let assertions = Assertions::new(config.strict_assertions);
        Self {
            dom,
            root,
            flow,
            config,
            marks: MarkSet::new(),
            assertions,
            queue: MutationQueue::default(),
            verdicts: HashMap::new(),
        }
    }

    pub fn dom(&self) -> &D {
        self.dom
    }

    pub fn marks(&self) -> &MarkSet<D::Node> {
        &self.marks
    }

    pub fn config(&self) -> &PaginationConfig {
        &self.config
    }

    pub fn assertions(&self) -> &Assertions {
        &self.assertions
    }

    pub(crate) fn top(&self, node: D::Node) -> f32 {
        self.dom.top(node, self.root)
    }

    pub(crate) fn bottom(&self, node: D::Node) -> f32 {
        self.dom.bottom(node, self.root)
    }

    pub(crate) fn height(&self, node: D::Node) -> f32 {
        self.dom.height(node)
    }

    pub(crate) fn style(&self, node: D::Node) -> ComputedStyle {
        self.dom.computed_style(node).unwrap_or_default()
    }

    pub(crate) fn display(&self, node: D::Node) -> Display {
        self.dom
            .computed_style(node)
            .map(|s| s.display)
            .unwrap_or(Display::Inline)
    }

    /// Text nodes count as inline content.
    pub(crate) fn is_inline(&self, node: D::Node) -> bool {
        match self.dom.computed_style(node) {
            Some(style) => style.display.is_inline(),
            None => self.dom.is_significant_text(node),
        }
    }

    pub(crate) fn is_no_break(&self, node: D::Node) -> bool {
        self.marks.is_marked(node, Mark::NoBreak)
    }

    pub(crate) fn is_no_hanging(&self, node: D::Node) -> bool {
        self.marks.is_marked(node, Mark::NoHang)
    }

    pub(crate) fn is_forced_page_break(&self, node: D::Node) -> bool {
        self.dom.is_synthetic(node, SyntheticTag::ForcedPageBreak)
            || self.marks.is_marked(node, Mark::ForcedPageBreak)
    }

    pub(crate) fn is_complex_text_block(&self, node: D::Node) -> bool {
        self.dom.is_synthetic(node, SyntheticTag::ComplexTextBlock)
    }

    pub(crate) fn is_wrapped_text_node(&self, node: D::Node) -> bool {
        self.dom.is_synthetic(node, SyntheticTag::TextNode)
    }

    pub(crate) fn is_flow_start(&self, node: D::Node) -> bool {
        self.dom.is_synthetic(node, SyntheticTag::FlowStart)
    }

    pub(crate) fn is_flow_end(&self, node: D::Node) -> bool {
        self.dom.is_synthetic(node, SyntheticTag::FlowEnd)
    }

    pub(crate) fn find_all_forced_page_breaks_inside(&self, node: D::Node) -> Vec<D::Node> {
        self.dom
            .descendants(node)
            .into_iter()
            .filter(|&n| self.is_forced_page_break(n))
            .collect()
    }
}
