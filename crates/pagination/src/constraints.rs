//! The pre-scan: configuration selectors turned into marks and forced breaks.

use crate::PaginationError;
use crate::config::PaginationConfig;
use crate::context::FlowContext;
use crate::marks::Mark;
use log::{debug, trace};
use pagecut_style::{Selector, SelectorList};
use pagecut_traits::{DomMutator, SyntheticTag};

/// Parsed selector lists of a [`PaginationConfig`].
#[derive(Debug, Clone, Default)]
pub struct ConstraintSelectors {
    pub no_hanging: SelectorList,
    pub no_break: SelectorList,
    pub page_break_before: SelectorList,
    pub page_break_after: SelectorList,
    /// Always includes the forced break marker tag.
    pub forced_page_break: SelectorList,
    pub garbage: SelectorList,
}

impl ConstraintSelectors {
    pub fn from_config(config: &PaginationConfig) -> Result<Self, PaginationError> {
        let mut forced_page_break = parse(&config.forced_page_break_selectors)?;
        forced_page_break.push(
            Selector::parse(SyntheticTag::ForcedPageBreak.as_tag())
                .map_err(|e| invalid_selector(SyntheticTag::ForcedPageBreak.as_tag(), e))?,
        );
        Ok(Self {
            no_hanging: parse(&config.no_hanging_selectors)?,
            no_break: parse(&config.no_break_selectors)?,
            page_break_before: parse(&config.page_break_before_selectors)?,
            page_break_after: parse(&config.page_break_after_selectors)?,
            forced_page_break,
            garbage: parse(&config.garbage_selectors)?,
        })
    }
}

fn parse(selectors: &str) -> Result<SelectorList, PaginationError> {
    SelectorList::parse(selectors).map_err(|e| invalid_selector(selectors, e))
}

fn invalid_selector(selector: &str, error: impl std::fmt::Display) -> PaginationError {
    PaginationError::InvalidSelector {
        selector: selector.to_string(),
        message: error.to_string(),
    }
}

impl<D: DomMutator> FlowContext<'_, D> {
    /// Makes sure the flow opens with a start sentinel and closes with an end sentinel.
    pub fn ensure_flow_sentinels(&mut self) -> (D::Node, D::Node) {
        let start = match self.dom.first_element_child(self.flow) {
            Some(first) if self.is_flow_start(first) => first,
            _ => {
                let start = self.dom.create_synthetic(SyntheticTag::FlowStart);
                self.dom.insert_at_start(self.flow, start);
                start
            }
        };
        let end = match self.dom.last_element_child(self.flow) {
            Some(last) if self.is_flow_end(last) => last,
            _ => {
                let end = self.dom.create_synthetic(SyntheticTag::FlowEnd);
                self.dom.insert_at_end(self.flow, end);
                end
            }
        };
        (start, end)
    }

    /// Matches of `selectors` inside the flow that take part in it.
    pub fn resolve_config_selector_constraints(&mut self, selectors: &SelectorList) -> Vec<D::Node> {
        let matches = self.dom.query_selector_all(self.flow, selectors);
        matches
            .into_iter()
            .filter(|&n| !self.should_skip_flow_element(n))
            .collect()
    }

    /// Runs the whole pre-scan in order: garbage, no-hanging, forced breaks, no-break.
    pub fn prepare_constraints(&mut self, selectors: &ConstraintSelectors) {
        self.remove_garbage(&selectors.garbage);
        self.prepare_no_hanging(&selectors.no_hanging);
        self.prepare_forced_page_breaks(
            &selectors.page_break_before,
            &selectors.page_break_after,
            &selectors.forced_page_break,
        );
        self.prepare_no_break(&selectors.no_break);
    }

    pub fn remove_garbage(&mut self, selectors: &SelectorList) {
        let garbage = self.dom.query_selector_all(self.flow, selectors);
        if !garbage.is_empty() {
            debug!("removing {} garbage elements", garbage.len());
        }
        for node in garbage {
            self.dom.remove_node(node);
        }
    }

    pub fn prepare_no_hanging(&mut self, selectors: &SelectorList) {
        for element in self.resolve_config_selector_constraints(selectors) {
            self.marks.set_mark(element, Mark::NoHang);
            if let Some(parent) = self.find_last_child_parent(element) {
                self.marks.set_mark(parent, Mark::NoHang);
            }
        }
    }

    pub fn prepare_no_break(&mut self, selectors: &SelectorList) {
        for element in self.resolve_config_selector_constraints(selectors) {
            self.marks.set_mark(element, Mark::NoBreak);
        }
    }

    pub fn prepare_forced_page_breaks(
        &mut self,
        before: &SelectorList,
        after: &SelectorList,
        forced: &SelectorList,
    ) {
        let mut page_starters = self.resolve_config_selector_constraints(before);
        let mut page_enders = self.resolve_config_selector_constraints(after);
        let forced_starters = self.resolve_config_selector_constraints(forced);

        // A page break before the very first participant is already implied.
        if let Some(&first) = page_starters.first() {
            let outermost = self.find_first_child_parent(first).unwrap_or(first);
            if self.is_after_content_flow_start(outermost) {
                trace!("{:?} already opens the flow", first);
                page_starters.remove(0);
            }
        }
        // Likewise after the very last one.
        if let Some(&last) = page_enders.last() {
            let outermost = self.find_last_child_parent(last).unwrap_or(last);
            if self.is_before_content_flow_end(outermost) {
                trace!("{:?} already closes the flow", last);
                page_enders.pop();
            }
        }

        for element in page_starters {
            let starter = self.find_better_forced_page_starter(element);
            let marker = self.create_forced_page_break();
            self.dom.insert_before(starter, marker);
        }

        for element in forced_starters {
            if self.is_forced_page_break(element) {
                continue;
            }
            let starter = self.find_better_forced_page_starter(element);
            let marker = self.create_forced_page_break();
            self.dom.insert_before(starter, marker);
        }

        for element in page_enders {
            let ender = self.find_last_child_parent(element).unwrap_or(element);
            let next_is_marker = self
                .dom
                .right_neighbor(ender)
                .is_some_and(|n| self.is_forced_page_break(n));
            if !next_is_marker {
                let marker = self.create_forced_page_break();
                self.dom.insert_after(ender, marker);
            }
        }
    }

    fn create_forced_page_break(&mut self) -> D::Node {
        let marker = self.dom.create_synthetic(SyntheticTag::ForcedPageBreak);
        self.marks.set_mark(marker, Mark::ForcedPageBreak);
        marker
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{build, el, with_context};
    use pagecut_traits::GeometryOracle;

    fn selectors(config: PaginationConfig) -> ConstraintSelectors {
        ConstraintSelectors::from_config(&config).unwrap()
    }

    #[test]
    fn invalid_selector_is_reported() {
        let config = PaginationConfig {
            no_break_selectors: "div >".into(),
            ..Default::default()
        };
        let err = ConstraintSelectors::from_config(&config).unwrap_err();
        assert!(matches!(err, PaginationError::InvalidSelector { ref selector, .. } if selector == "div >"));
    }

    #[test]
    fn sentinels_are_inserted_once() {
        let mut doc = build(el("body").child(el("p").text("content")));
        with_context(&mut doc, |ctx| {
            let (start, end) = ctx.ensure_flow_sentinels();
            assert_eq!(ctx.ensure_flow_sentinels(), (start, end));
            let flow = ctx.flow;
            let children = ctx.dom().element_children(flow);
            assert_eq!(children.first(), Some(&start));
            assert_eq!(children.last(), Some(&end));
        });
    }

    #[test]
    fn break_before_first_element_is_dropped() {
        let mut doc = build(
            el("body")
                .child(el("h1").id("first").text("Title"))
                .child(el("p").text("body"))
                .child(el("h1").id("second").text("Next")),
        );
        let second = doc.element_by_id("second").unwrap();
        with_context(&mut doc, |ctx| {
            ctx.ensure_flow_sentinels();
            let config = PaginationConfig {
                page_break_before_selectors: "h1".into(),
                ..Default::default()
            };
            ctx.prepare_constraints(&selectors(config));
            let flow = ctx.flow;
            let markers = ctx.find_all_forced_page_breaks_inside(flow);
            assert_eq!(markers.len(), 1);
            assert_eq!(ctx.dom().right_neighbor(markers[0]), Some(second));
        });
    }

    #[test]
    fn break_after_goes_behind_the_outermost_last_child() {
        let mut doc = build(
            el("body")
                .child(el("section").id("s").child(el("p").id("p").text("end of section")))
                .child(el("p").text("next")),
        );
        let [s, p] = ["s", "p"].map(|id| doc.element_by_id(id).unwrap());
        with_context(&mut doc, |ctx| {
            ctx.ensure_flow_sentinels();
            let config = PaginationConfig {
                page_break_after_selectors: "#p".into(),
                no_hanging_selectors: "#p".into(),
                ..Default::default()
            };
            ctx.prepare_constraints(&selectors(config));
            let marker = ctx.dom().right_neighbor(s).unwrap();
            assert!(ctx.is_forced_page_break(marker));
            assert!(ctx.is_no_hanging(p));
            assert!(ctx.is_no_hanging(s));
        });
    }

    #[test]
    fn garbage_and_no_break() {
        let mut doc = build(
            el("body")
                .child(el("div").class("ad").text("buy"))
                .child(el("figure").id("f").text("figure")),
        );
        let figure = doc.element_by_id("f").unwrap();
        with_context(&mut doc, |ctx| {
            let config = PaginationConfig {
                garbage_selectors: ".ad".into(),
                no_break_selectors: "figure".into(),
                ..Default::default()
            };
            ctx.prepare_constraints(&selectors(config));
            let flow = ctx.flow;
            assert_eq!(ctx.dom().element_children(flow), vec![figure]);
            assert!(ctx.is_no_break(figure));
        });
    }
}
