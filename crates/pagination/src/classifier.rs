//! Decides which elements take part in the page flow.

use crate::context::FlowContext;
use log::trace;
use pagecut_style::{Display, Position, Visibility};
use pagecut_traits::DomMutator;

/// Tags that never render a box in the flow.
pub const SKIPPED_TAGS: [&str; 9] = [
    "SOURCE", "TEMPLATE", "SCRIPT", "NOSCRIPT", "STYLE", "LINK", "META", "HEAD", "TITLE",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Tag,
    DisplayNone,
    Absolute,
    Fixed,
    VisibilityCollapse,
}

/// Cached classification of one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlowVerdict {
    pub skip: Option<SkipReason>,
    /// Floated elements stay in the flow but some walkers step over them.
    pub floated: bool,
}

impl<D: DomMutator> FlowContext<'_, D> {
    /// Classifies `node` once and caches the verdict for the rest of the run.
    pub(crate) fn classify(&mut self, node: D::Node) -> FlowVerdict {
        if let Some(verdict) = self.verdicts.get(&node) {
            return *verdict;
        }
        let verdict = self.compute_verdict(node);
        if let Some(reason) = verdict.skip {
            trace!("{:?} leaves the flow ({:?})", node, reason);
        }
        self.verdicts.insert(node, verdict);
        verdict
    }

    fn compute_verdict(&self, node: D::Node) -> FlowVerdict {
        if !self.dom.is_element(node) {
            return FlowVerdict::default();
        }
        let tag_skipped = self
            .dom
            .tag_name(node)
            .is_some_and(|tag| SKIPPED_TAGS.iter().any(|s| s.eq_ignore_ascii_case(tag)));
        if tag_skipped {
            return FlowVerdict {
                skip: Some(SkipReason::Tag),
                floated: false,
            };
        }
        let style = self.style(node);
        let skip = if style.display == Display::None {
            Some(SkipReason::DisplayNone)
        } else if style.position == Position::Absolute {
            Some(SkipReason::Absolute)
        } else if style.position == Position::Fixed {
            Some(SkipReason::Fixed)
        } else if style.visibility == Visibility::Collapse {
            Some(SkipReason::VisibilityCollapse)
        } else {
            None
        };
        FlowVerdict {
            skip,
            floated: style.is_floated(),
        }
    }

    pub fn should_skip_flow_element(&mut self, node: D::Node) -> bool {
        self.classify(node).skip.is_some()
    }

    pub fn is_registered_float(&mut self, node: D::Node) -> bool {
        self.classify(node).floated
    }

    /// At least one child that is significant text or a participating element.
    pub fn has_renderable_child(&mut self, node: D::Node) -> bool {
        let mut child = self.dom.first_child(node);
        while let Some(c) = child {
            if self.dom.is_element(c) {
                if !self.should_skip_flow_element(c) {
                    return true;
                }
            } else if self.dom.is_significant_text(c) {
                return true;
            }
            child = self.dom.next_sibling(c);
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{build, el, with_context};

    #[test]
    fn out_of_flow_elements_are_skipped() {
        let mut doc = build(
            el("body")
                .child(el("script").id("script"))
                .child(el("div").id("hidden").style("display: none"))
                .child(el("div").id("abs").style("position: absolute"))
                .child(el("div").id("collapsed").style("visibility: collapse"))
                .child(el("div").id("float").style("float: left; height: 10px"))
                .child(el("p").id("p").text("text")),
        );
        let ids = ["script", "hidden", "abs", "collapsed", "float", "p"]
            .map(|id| doc.element_by_id(id).unwrap());
        with_context(&mut doc, |ctx| {
            let verdicts = ids.map(|id| ctx.classify(id));
            assert_eq!(verdicts[0].skip, Some(SkipReason::Tag));
            assert_eq!(verdicts[1].skip, Some(SkipReason::DisplayNone));
            assert_eq!(verdicts[2].skip, Some(SkipReason::Absolute));
            assert_eq!(verdicts[3].skip, Some(SkipReason::VisibilityCollapse));
            assert_eq!(verdicts[4], FlowVerdict { skip: None, floated: true });
            assert!(!ctx.should_skip_flow_element(ids[5]));
            assert!(ctx.is_registered_float(ids[4]));
        });
    }

    #[test]
    fn whitespace_and_scripts_render_nothing() {
        let mut doc = build(
            el("body")
                .child(el("div").id("empty").text("   ").child(el("script")))
                .child(el("div").id("full").text(" x ")),
        );
        let [empty, full] = ["empty", "full"].map(|id| doc.element_by_id(id).unwrap());
        with_context(&mut doc, |ctx| {
            assert!(!ctx.has_renderable_child(empty));
            assert!(ctx.has_renderable_child(full));
        });
    }
}
