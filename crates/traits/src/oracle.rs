//! The read side of the host boundary.
//!
//! A host (a rendering engine, or the in-memory `pagecut-dom` document) exposes
//! already computed geometry and style. Every query is side-effect free and
//! must reflect all mutations applied before it.

use crate::synthetic::SyntheticTag;
use pagecut_style::{ComputedStyle, SelectorList, SelectorSubject};
use std::fmt::Debug;
use std::hash::Hash;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Element,
    Text,
    Comment,
}

pub trait GeometryOracle {
    /// Stable node identity. Marks and caches are keyed by it.
    type Node: Copy + Eq + Hash + Debug;

    // --- Geometry, relative to `root` ---

    fn top(&self, node: Self::Node, root: Self::Node) -> f32;
    fn bottom(&self, node: Self::Node, root: Self::Node) -> f32;
    fn left(&self, node: Self::Node, root: Self::Node) -> f32;
    fn width(&self, node: Self::Node) -> f32;
    fn height(&self, node: Self::Node) -> f32;

    // --- Style ---

    /// `None` for anything that is not an element.
    fn computed_style(&self, node: Self::Node) -> Option<ComputedStyle>;
    /// Used line height in pixels, inherited when the node does not set one.
    fn line_height(&self, node: Self::Node) -> f32;
    /// Value of a property set directly on the node's inline style.
    fn inline_style(&self, node: Self::Node, property: &str) -> Option<&str>;
    /// Non-`None` iff the element participates in layout with a box of its own.
    fn offset_parent(&self, node: Self::Node) -> Option<Self::Node>;

    // --- Structure ---

    fn node_type(&self, node: Self::Node) -> NodeType;
    fn tag_name(&self, node: Self::Node) -> Option<&str>;
    fn text_content(&self, node: Self::Node) -> Option<&str>;
    fn attribute(&self, node: Self::Node, name: &str) -> Option<&str>;
    fn parent(&self, node: Self::Node) -> Option<Self::Node>;
    fn first_child(&self, node: Self::Node) -> Option<Self::Node>;
    fn last_child(&self, node: Self::Node) -> Option<Self::Node>;
    fn next_sibling(&self, node: Self::Node) -> Option<Self::Node>;
    fn previous_sibling(&self, node: Self::Node) -> Option<Self::Node>;

    // --- Provided helpers ---

    fn is_element(&self, node: Self::Node) -> bool {
        self.node_type(node) == NodeType::Element
    }

    fn is_tag(&self, node: Self::Node, tag: &str) -> bool {
        self.tag_name(node).is_some_and(|t| t.eq_ignore_ascii_case(tag))
    }

    fn synthetic_tag(&self, node: Self::Node) -> Option<SyntheticTag> {
        self.tag_name(node).and_then(SyntheticTag::from_tag)
    }

    fn is_synthetic(&self, node: Self::Node, tag: SyntheticTag) -> bool {
        self.synthetic_tag(node) == Some(tag)
    }

    /// A text node with at least one non-whitespace character.
    fn is_significant_text(&self, node: Self::Node) -> bool {
        self.node_type(node) == NodeType::Text
            && self
                .text_content(node)
                .is_some_and(|t| !t.trim().is_empty())
    }

    fn child_nodes(&self, node: Self::Node) -> Vec<Self::Node> {
        let mut children = Vec::new();
        let mut child = self.first_child(node);
        while let Some(c) = child {
            children.push(c);
            child = self.next_sibling(c);
        }
        children
    }

    fn element_children(&self, node: Self::Node) -> Vec<Self::Node> {
        self.child_nodes(node)
            .into_iter()
            .filter(|&c| self.is_element(c))
            .collect()
    }

    fn first_element_child(&self, node: Self::Node) -> Option<Self::Node> {
        let mut child = self.first_child(node);
        while let Some(c) = child {
            if self.is_element(c) {
                return Some(c);
            }
            child = self.next_sibling(c);
        }
        None
    }

    fn last_element_child(&self, node: Self::Node) -> Option<Self::Node> {
        let mut child = self.last_child(node);
        while let Some(c) = child {
            if self.is_element(c) {
                return Some(c);
            }
            child = self.previous_sibling(c);
        }
        None
    }

    /// Next element sibling.
    fn right_neighbor(&self, node: Self::Node) -> Option<Self::Node> {
        let mut sibling = self.next_sibling(node);
        while let Some(s) = sibling {
            if self.is_element(s) {
                return Some(s);
            }
            sibling = self.next_sibling(s);
        }
        None
    }

    /// Previous element sibling.
    fn left_neighbor(&self, node: Self::Node) -> Option<Self::Node> {
        let mut sibling = self.previous_sibling(node);
        while let Some(s) = sibling {
            if self.is_element(s) {
                return Some(s);
            }
            sibling = self.previous_sibling(s);
        }
        None
    }

    /// All descendants of `node` in document order, `node` excluded.
    fn descendants(&self, node: Self::Node) -> Vec<Self::Node> {
        let mut out = Vec::new();
        let mut stack: Vec<Self::Node> = self.child_nodes(node).into_iter().rev().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.child_nodes(current).into_iter().rev());
        }
        out
    }

    fn contains(&self, ancestor: Self::Node, node: Self::Node) -> bool {
        let mut current = Some(node);
        while let Some(c) = current {
            if c == ancestor {
                return true;
            }
            current = self.parent(c);
        }
        false
    }

    fn matches(&self, node: Self::Node, selectors: &SelectorList) -> bool
    where
        Self: Sized,
    {
        self.is_element(node) && selectors.matches(&OracleSubject(self), node)
    }

    /// Descendant elements of `scope` matching `selectors`, in document order.
    fn query_selector_all(&self, scope: Self::Node, selectors: &SelectorList) -> Vec<Self::Node>
    where
        Self: Sized,
    {
        if selectors.is_empty() {
            return Vec::new();
        }
        self.descendants(scope)
            .into_iter()
            .filter(|&n| self.matches(n, selectors))
            .collect()
    }
}

/// Adapts any oracle to the selector matcher.
struct OracleSubject<'a, O>(&'a O);

impl<O: GeometryOracle> SelectorSubject for OracleSubject<'_, O> {
    type Handle = O::Node;

    fn tag_name(&self, node: O::Node) -> Option<&str> {
        self.0.tag_name(node)
    }

    fn attribute(&self, node: O::Node, name: &str) -> Option<&str> {
        self.0.attribute(node, name)
    }

    fn parent_element(&self, node: O::Node) -> Option<O::Node> {
        self.0.parent(node).filter(|&p| self.0.is_element(p))
    }
}
