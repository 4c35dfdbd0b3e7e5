//! Turning an element's children into an ordered list of breakable units.

use crate::context::FlowContext;
use crate::marks::Mark;
use log::{debug, trace};
use pagecut_style::Display;
use pagecut_traits::{DomMutator, SyntheticTag};

/// How a node breaks apart, decided once per dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeShape {
    NoBreak,
    ComplexTextBlock,
    WrappedText,
    Empty,
    Table,
    TableLike,
    Preformatted,
    FlexRow,
    GridRows,
    Generic,
}

/// Which edge of a subtree a walker follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    First,
    Last,
}

impl<D: DomMutator> FlowContext<'_, D> {
    /// Cleaned, flattened children of `element`, ready to be scanned.
    ///
    /// Significant text is wrapped, flowless containers are unwrapped in
    /// place, and runs of side-by-side inline children are bundled into
    /// complex text blocks.
    pub fn get_prepared_children(&mut self, element: D::Node) -> Vec<D::Node> {
        if self.is_complex_text_block(element) {
            return self.dom.element_children(element);
        }
        if !self.has_renderable_child(element) {
            trace!("{:?} has nothing to render", element);
            return Vec::new();
        }

        let mut children = Vec::new();
        for item in self.dom.child_nodes(element) {
            if self.dom.is_tag(item, "STYLE") {
                continue;
            }
            if self.dom.is_significant_text(item) {
                let wrapper = self.dom.create_synthetic(SyntheticTag::TextNode);
                self.dom.wrap(item, wrapper);
                children.push(wrapper);
                continue;
            }
            if !self.dom.is_element(item) || self.should_skip_flow_element(item) {
                continue;
            }
            if self.dom.offset_parent(item).is_none() {
                trace!("unwrapping flowless {:?}", item);
                children.extend(self.get_prepared_children(item));
                continue;
            }
            children.push(item);
        }

        if self.is_vertical_flow_disrupted(&children) {
            if self.is_inline(element) {
                debug!("promoting inline wrapper {:?} to a complex text block", element);
                children = vec![self.wrap_in_complex_text_block(element)];
            } else {
                children = self.bundle_inline_runs(children);
            }
        }
        children
    }

    /// Participating element children, read-only.
    pub fn get_flow_children(&mut self, element: D::Node) -> Vec<D::Node> {
        self.dom
            .element_children(element)
            .into_iter()
            .filter(|&c| !self.should_skip_flow_element(c))
            .collect()
    }

    pub fn get_flow_first_child(&mut self, element: D::Node) -> Option<D::Node> {
        self.get_flow_children(element).first().copied()
    }

    pub fn get_flow_last_child(&mut self, element: D::Node) -> Option<D::Node> {
        self.get_flow_children(element).last().copied()
    }

    /// Some neighbour starts above the bottom of the one before it.
    fn is_vertical_flow_disrupted(&self, children: &[D::Node]) -> bool {
        children
            .windows(2)
            .any(|pair| self.bottom(pair[0]) > self.top(pair[1]))
    }

    fn bundle_inline_runs(&mut self, children: Vec<D::Node>) -> Vec<D::Node> {
        let mut bundled = Vec::with_capacity(children.len());
        let mut block: Option<D::Node> = None;
        for child in children {
            if self.is_inline(child) {
                match block {
                    Some(b) => self.dom.insert_at_end(b, child),
                    None => {
                        let b = self.wrap_in_complex_text_block(child);
                        bundled.push(b);
                        block = Some(b);
                    }
                }
            } else {
                block = None;
                bundled.push(child);
            }
        }
        bundled
    }

    fn wrap_in_complex_text_block(&mut self, element: D::Node) -> D::Node {
        let block = self.dom.create_synthetic(SyntheticTag::ComplexTextBlock);
        self.dom.wrap(element, block);
        block
    }

    pub fn node_shape(&mut self, node: D::Node) -> NodeShape {
        if self.is_no_break(node) {
            return NodeShape::NoBreak;
        }
        if self.is_complex_text_block(node) {
            return NodeShape::ComplexTextBlock;
        }
        if self.is_wrapped_text_node(node) {
            return NodeShape::WrappedText;
        }
        if !self.has_renderable_child(node) {
            return NodeShape::Empty;
        }
        let style = self.style(node);
        // Tables first: a table can look preformatted too.
        if self.dom.is_tag(node, "TABLE") {
            NodeShape::Table
        } else if style.display == Display::Table {
            NodeShape::TableLike
        } else if self.dom.is_tag(node, "PRE")
            || (style.white_space.is_preformatted() && !style.display.is_inline())
        {
            NodeShape::Preformatted
        } else if style.is_flex_row() {
            NodeShape::FlexRow
        } else if style.is_grid_auto_flow_row() {
            NodeShape::GridRows
        } else {
            NodeShape::Generic
        }
    }

    /// Breakable units of `node`, or an empty list when it cannot be broken.
    pub fn get_split_children(
        &mut self,
        node: D::Node,
        first_page_bottom: f32,
        full_page_height: f32,
    ) -> Vec<D::Node> {
        let shape = self.node_shape(node);
        trace!(
            "splitting {:?} as {:?}, {} px left on the page, {} px per page",
            node,
            shape,
            first_page_bottom - self.top(node),
            full_page_height
        );
        match shape {
            NodeShape::NoBreak | NodeShape::Empty => Vec::new(),
            NodeShape::ComplexTextBlock | NodeShape::WrappedText => {
                let policy = self.config.paragraph_policy();
                self.split_into_lines(node, policy)
            }
            NodeShape::Table => self.split_table(node),
            NodeShape::TableLike => self.split_table_like(node),
            NodeShape::Preformatted => self.split_preformatted(node),
            NodeShape::FlexRow => {
                let prepared = self.get_prepared_children(node);
                self.strip_zero_height_children(prepared)
            }
            NodeShape::GridRows => self.split_grid(node),
            NodeShape::Generic => self.get_prepared_children(node),
        }
    }

    fn strip_zero_height_children(&self, children: Vec<D::Node>) -> Vec<D::Node> {
        let filtered: Vec<D::Node> = children
            .iter()
            .copied()
            .filter(|&c| self.height(c) > 0.0)
            .collect();
        if filtered.is_empty() { children } else { filtered }
    }

    /// Nested first (or last) participating children, outermost first.
    ///
    /// The walk stops at wrapped text, where the flow turns into glyphs, or
    /// as soon as `stop(child, parent)` says so.
    pub fn get_children_chain(
        &mut self,
        node: D::Node,
        edge: Edge,
        skip_float: bool,
        stop: &dyn Fn(&Self, D::Node, D::Node) -> bool,
    ) -> Vec<D::Node> {
        let mut chain = Vec::new();
        let mut current = node;
        loop {
            let mut child = match edge {
                Edge::First => self.dom.first_element_child(current),
                Edge::Last => self.dom.last_element_child(current),
            };
            while let Some(c) = child {
                let skipped = self.should_skip_flow_element(c)
                    || (skip_float && self.is_registered_float(c));
                if !skipped {
                    break;
                }
                child = match edge {
                    Edge::First => self.dom.right_neighbor(c),
                    Edge::Last => self.dom.left_neighbor(c),
                };
            }
            let Some(c) = child else { break };
            if self.is_wrapped_text_node(c) || stop(self, c, current) {
                break;
            }
            chain.push(c);
            current = c;
        }
        chain
    }

    pub(crate) fn mark_sliced(&mut self, node: D::Node) {
        self.marks.set_mark(node, Mark::Sliced);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{build, el, with_context};
    use pagecut_traits::GeometryOracle;

    #[test]
    fn prepared_children_skip_and_unwrap() {
        let mut doc = build(
            el("body")
                .child(el("p").id("p").text("first"))
                .child(el("section").style("display: contents").child(el("div").id("inner").text("nested")))
                .child(el("script"))
                .child(el("div").style("display: none")),
        );
        let [p, inner] = ["p", "inner"].map(|id| doc.element_by_id(id).unwrap());
        with_context(&mut doc, |ctx| {
            let root = ctx.root;
            assert_eq!(ctx.get_prepared_children(root), vec![p, inner]);
        });
    }

    #[test]
    fn side_by_side_inline_children_are_bundled() {
        let mut doc = build(
            el("body").child(el("p").id("p").text("hello ").child(el("em").id("em").text("world"))),
        );
        let [p, em] = ["p", "em"].map(|id| doc.element_by_id(id).unwrap());
        with_context(&mut doc, |ctx| {
            let children = ctx.get_prepared_children(p);
            assert_eq!(children.len(), 1);
            let block = children[0];
            assert!(ctx.is_complex_text_block(block));
            let inside = ctx.dom().element_children(block);
            assert_eq!(inside.len(), 2);
            assert!(ctx.is_wrapped_text_node(inside[0]));
            assert_eq!(inside[1], em);
            // Complex text blocks hand out their children as they are.
            assert_eq!(ctx.get_prepared_children(block), inside);
        });
    }

    #[test]
    fn inline_wrapper_with_side_by_side_children_becomes_one_block() {
        let mut doc = build(
            el("body")
                .child(el("div").style("height: 40px"))
                .child(
                    el("span")
                        .id("s")
                        .text("plain ")
                        .child(el("b").id("b").text("bold"))
                        .text(" and more"),
                )
                .child(el("div").style("height: 40px")),
        );
        let [s, b] = ["s", "b"].map(|id| doc.element_by_id(id).unwrap());
        with_context(&mut doc, |ctx| {
            let root = ctx.root;
            let children = ctx.get_prepared_children(s);
            assert_eq!(children.len(), 1);
            let block = children[0];
            assert!(ctx.is_complex_text_block(block));
            assert_eq!(ctx.dom().parent(s), Some(block));
            assert_eq!(ctx.dom().parent(block), Some(root));
            // The wrapper keeps its own content untouched inside the block.
            assert!(ctx.dom().contains(s, b));
        });
    }

    #[test]
    fn shapes_follow_display_and_tags() {
        let mut doc = build(
            el("body")
                .child(el("table").id("table").child(el("tr").child(el("td").text("x"))))
                .child(el("div").id("table-like").style("display: table").child(el("div").text("x")))
                .child(el("pre").id("pre").text("a\nb"))
                .child(el("div").id("flex").style("display: flex").child(el("div").text("x")))
                .child(el("div").id("grid").style("display: grid").child(el("div").text("x")))
                .child(el("div").id("empty"))
                .child(el("p").id("generic").text("x")),
        );
        let expected = [
            ("table", NodeShape::Table),
            ("table-like", NodeShape::TableLike),
            ("pre", NodeShape::Preformatted),
            ("flex", NodeShape::FlexRow),
            ("grid", NodeShape::GridRows),
            ("empty", NodeShape::Empty),
            ("generic", NodeShape::Generic),
        ];
        let nodes: Vec<_> = expected
            .iter()
            .map(|(id, shape)| (doc.element_by_id(id).unwrap(), *shape))
            .collect();
        with_context(&mut doc, |ctx| {
            for (node, shape) in nodes {
                assert_eq!(ctx.node_shape(node), shape);
            }
        });
    }

    #[test]
    fn no_break_overrides_shape() {
        let mut doc = build(el("body").child(el("p").id("p").text("x")));
        let p = doc.element_by_id("p").unwrap();
        with_context(&mut doc, |ctx| {
            ctx.marks.set_mark(p, Mark::NoBreak);
            assert_eq!(ctx.node_shape(p), NodeShape::NoBreak);
            assert!(ctx.get_split_children(p, 100.0, 1000.0).is_empty());
        });
    }

    #[test]
    fn flex_row_drops_zero_height_items() {
        let mut doc = build(
            el("body").child(
                el("div")
                    .id("row")
                    .style("display: flex")
                    .child(el("div").id("spacer").style("height: 0px"))
                    .child(el("div").id("item").style("height: 30px")),
            ),
        );
        let [row, item] = ["row", "item"].map(|id| doc.element_by_id(id).unwrap());
        with_context(&mut doc, |ctx| {
            assert_eq!(ctx.get_split_children(row, 10.0, 1000.0), vec![item]);
        });
    }

    #[test]
    fn children_chain_skips_floats() {
        let mut doc = build(
            el("body").child(
                el("div")
                    .id("outer")
                    .child(el("div").style("float: right; height: 5px"))
                    .child(el("div").id("inner").child(el("p").id("p").text("x"))),
            ),
        );
        let [outer, inner, p] = ["outer", "inner", "p"].map(|id| doc.element_by_id(id).unwrap());
        with_context(&mut doc, |ctx| {
            let chain = ctx.get_children_chain(outer, Edge::First, true, &|_, _, _| false);
            assert_eq!(chain, vec![inner, p]);
        });
    }
}
