//! Mutations that must not disturb geometry while the scan is running.

use log::debug;
use pagecut_traits::DomMutator;

#[derive(Debug, Clone, PartialEq)]
pub enum PendingMutation<N> {
    /// `display: none`.
    Hide(N),
    SetStyle {
        node: N,
        property: &'static str,
        value: String,
    },
    SetAttribute {
        node: N,
        name: &'static str,
        value: String,
    },
}

#[derive(Debug, Clone)]
pub struct MutationQueue<N> {
    pending: Vec<PendingMutation<N>>,
}

impl<N> Default for MutationQueue<N> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
        }
    }
}

impl<N: Copy> MutationQueue<N> {
    pub fn enqueue(&mut self, mutation: PendingMutation<N>) {
        self.pending.push(mutation);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Applies every pending mutation in registration order and empties the queue.
    pub fn flush<D: DomMutator<Node = N>>(&mut self, dom: &mut D) {
        if self.pending.is_empty() {
            return;
        }
        debug!("Flushing {} deferred mutations", self.pending.len());
        for mutation in self.pending.drain(..) {
            match mutation {
                PendingMutation::Hide(node) => dom.set_style(node, "display", "none"),
                PendingMutation::SetStyle {
                    node,
                    property,
                    value,
                } => dom.set_style(node, property, &value),
                PendingMutation::SetAttribute { node, name, value } => {
                    dom.set_attribute(node, name, &value)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagecut_dom::Document;
    use pagecut_traits::GeometryOracle;

    #[test]
    fn flush_applies_in_order_and_clears() {
        let mut doc = Document::new("body");
        let root = doc.root();
        let p = doc.append_element(root, "p");

        let mut queue = MutationQueue::default();
        queue.enqueue(PendingMutation::SetStyle {
            node: p,
            property: "display",
            value: "inline".into(),
        });
        queue.enqueue(PendingMutation::Hide(p));
        queue.enqueue(PendingMutation::SetAttribute {
            node: p,
            name: "data-hidden",
            value: "true".into(),
        });
        assert_eq!(queue.len(), 3);

        queue.flush(&mut doc);
        assert!(queue.is_empty());
        assert_eq!(doc.inline_style(p, "display"), Some("none"));
        assert_eq!(doc.attribute(p, "data-hidden"), Some("true"));
    }
}
