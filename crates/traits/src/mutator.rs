//! The write side of the host boundary.
//!
//! All mutations are synchronous: the next `GeometryOracle` query must see them.

use crate::oracle::GeometryOracle;
use crate::synthetic::SyntheticTag;

pub trait DomMutator: GeometryOracle {
    fn create_element(&mut self, tag: &str) -> Self::Node;
    fn create_text(&mut self, text: &str) -> Self::Node;

    /// Inserts `node` (detaching it first) as the previous sibling of `reference`.
    fn insert_before(&mut self, reference: Self::Node, node: Self::Node);
    /// Inserts `node` (detaching it first) as the next sibling of `reference`.
    fn insert_after(&mut self, reference: Self::Node, node: Self::Node);
    fn insert_at_start(&mut self, parent: Self::Node, node: Self::Node);
    fn insert_at_end(&mut self, parent: Self::Node, node: Self::Node);
    fn remove_node(&mut self, node: Self::Node);

    fn set_style(&mut self, node: Self::Node, property: &str, value: &str);
    fn remove_style(&mut self, node: Self::Node, property: &str);
    fn set_attribute(&mut self, node: Self::Node, name: &str, value: &str);

    /// Deep copy of `node`, geometry included. The copy is detached.
    fn deep_clone(&mut self, node: Self::Node) -> Self::Node;

    /// Replaces a text node by one inline element per word, in place.
    ///
    /// Returns the word elements. Each one must own its own box so that line
    /// starts can be read back from geometry.
    fn split_text_into_words(&mut self, text: Self::Node) -> Vec<Self::Node>;

    // --- Provided helpers ---

    /// Puts `wrapper` where `node` is and moves `node` inside it.
    fn wrap(&mut self, node: Self::Node, wrapper: Self::Node) {
        self.insert_before(node, wrapper);
        self.insert_at_end(wrapper, node);
    }

    /// Replaces `node` by `replacements`, keeping their order.
    fn insert_instead_of(&mut self, node: Self::Node, replacements: &[Self::Node]) {
        for &r in replacements {
            self.insert_before(node, r);
        }
        self.remove_node(node);
    }

    fn create_synthetic(&mut self, tag: SyntheticTag) -> Self::Node {
        let node = self.create_element(tag.as_tag());
        self.set_style(node, "display", tag.default_display());
        node
    }
}
