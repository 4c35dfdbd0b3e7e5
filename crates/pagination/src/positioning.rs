//! Where things sit relative to the flow: edge parents, page start anchors
//! and media resolution.

use crate::children::Edge;
use crate::context::FlowContext;
use crate::marks::Mark;
use pagecut_style::Display;
use pagecut_traits::DomMutator;

/// Tags rendered as an opaque box.
pub const REPLACED_TAGS: [&str; 7] = ["IMG", "SVG", "OBJECT", "EMBED", "VIDEO", "CANVAS", "IFRAME"];

impl<D: DomMutator> FlowContext<'_, D> {
    pub fn is_replaced_element(&self, node: D::Node) -> bool {
        self.dom
            .tag_name(node)
            .is_some_and(|tag| REPLACED_TAGS.iter().any(|t| t.eq_ignore_ascii_case(tag)))
    }

    /// The nearest participating sibling before `element` is the flow start sentinel.
    pub fn is_after_content_flow_start(&mut self, element: D::Node) -> bool {
        let mut sibling = self.dom.left_neighbor(element);
        while let Some(s) = sibling {
            if !self.should_skip_flow_element(s) {
                return self.is_flow_start(s);
            }
            sibling = self.dom.left_neighbor(s);
        }
        false
    }

    /// Only skipped or empty siblings separate `element` from the flow end sentinel.
    pub fn is_before_content_flow_end(&mut self, element: D::Node) -> bool {
        let mut sibling = self.dom.right_neighbor(element);
        while let Some(s) = sibling {
            if self.is_flow_end(s) {
                return true;
            }
            let invisible = self.should_skip_flow_element(s)
                || (self.height(s) == 0.0 && self.dom.width(s) == 0.0);
            if !invisible {
                return false;
            }
            sibling = self.dom.right_neighbor(s);
        }
        false
    }

    /// The outermost ancestor below the flow whose leading edge `element` is.
    pub fn find_first_child_parent(&mut self, element: D::Node) -> Option<D::Node> {
        self.find_edge_parent(element, Edge::First)
    }

    /// The outermost ancestor below the flow whose trailing edge `element` is.
    pub fn find_last_child_parent(&mut self, element: D::Node) -> Option<D::Node> {
        self.find_edge_parent(element, Edge::Last)
    }

    fn find_edge_parent(&mut self, element: D::Node, edge: Edge) -> Option<D::Node> {
        let mut found = None;
        let mut current = element;
        while let Some(parent) = self.dom.parent(current) {
            if parent == self.flow || parent == self.root {
                break;
            }
            let edge_child = match edge {
                Edge::First => self.get_flow_first_child(parent),
                Edge::Last => self.get_flow_last_child(parent),
            };
            if edge_child != Some(current) {
                break;
            }
            found = Some(parent);
            current = parent;
        }
        found
    }

    /// Where a forced break for `element` belongs: before its outermost first-child parent.
    pub fn find_better_forced_page_starter(&mut self, element: D::Node) -> D::Node {
        self.find_first_child_parent(element).unwrap_or(element)
    }

    /// Climbs from `candidate` to the outermost ancestor it opens, so a page
    /// starts with the wrapper rather than inside it.
    ///
    /// The climb stops at the flow, at the previous page start or any page
    /// start, and before a parent that begins at or above the previous page top.
    pub fn find_better_page_start(
        &mut self,
        candidate: D::Node,
        previous_start: Option<D::Node>,
        previous_top: Option<f32>,
    ) -> D::Node {
        let mut best = candidate;
        while let Some(parent) = self.dom.parent(best) {
            if parent == self.flow
                || parent == self.root
                || Some(parent) == previous_start
                || self.marks.is_marked(parent, Mark::PageStart)
            {
                break;
            }
            if self.get_flow_first_child(parent) != Some(best) {
                break;
            }
            let parent_top = self.page_start_top_info(parent).0;
            if previous_top.is_some_and(|top| parent_top <= top) {
                break;
            }
            best = parent;
        }
        best
    }

    /// The element itself when it owns a box, otherwise the first (or last)
    /// box found through `display: contents` wrappers.
    pub fn resolve_flow_box_element(&mut self, element: D::Node, prefer: Edge) -> Option<D::Node> {
        let mut current = element;
        // Bounded by tree depth: every step moves one level down.
        loop {
            if self.dom.offset_parent(current).is_some() {
                return Some(current);
            }
            let style = self.dom.computed_style(current)?;
            if self.should_skip_flow_element(current) || style.display != Display::Contents {
                return None;
            }
            current = match prefer {
                Edge::First => self.dom.first_element_child(current)?,
                Edge::Last => self.dom.last_element_child(current)?,
            };
        }
    }

    /// Top of a page started by `element`, and the box element it was read from.
    pub fn page_start_top_info(&mut self, element: D::Node) -> (f32, Option<D::Node>) {
        match self.resolve_flow_box_element(element, Edge::First) {
            Some(anchor) => (self.top(anchor), Some(anchor)),
            None => (self.top(element), None),
        }
    }

    /// An empty paragraph that would only open a page with blank space.
    pub fn is_ignorable_spacer_paragraph(&mut self, element: D::Node) -> bool {
        self.dom.is_tag(element, "P") && !self.has_renderable_child(element)
    }

    /// The replaced element `node` boils down to: the node itself, or the only
    /// participating descendant down a chain of single-child wrappers.
    pub fn resolve_replaced_element(&mut self, node: D::Node) -> Option<D::Node> {
        let mut current = node;
        loop {
            if self.is_replaced_element(current) {
                return Some(current);
            }
            let has_text = self
                .dom
                .child_nodes(current)
                .into_iter()
                .any(|c| self.dom.is_significant_text(c));
            if has_text {
                return None;
            }
            match self.get_flow_children(current).as_slice() {
                [only] => current = *only,
                _ => return None,
            }
        }
    }

    /// Space an inline image leaves below itself for the text descent.
    pub fn inline_media_gap(&self, parent: Option<D::Node>, media: D::Node) -> f32 {
        let Some(parent) = parent else {
            return 0.0;
        };
        if !self.display(media).is_inline() {
            return 0.0;
        }
        let gap = self.bottom(parent) - self.bottom(media);
        gap.clamp(0.0, self.dom.line_height(parent))
    }
}
