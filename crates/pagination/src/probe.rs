use pagecut_traits::DomMutator;
use std::ops::{Deref, DerefMut};

/// Temporarily overrides one inline style property.
///
/// The previous inline value (or its absence) is restored on drop, so a
/// measurement taken through the guard never leaks into later reads.
pub struct StyleOverride<'a, D: DomMutator> {
    dom: &'a mut D,
    node: D::Node,
    property: &'static str,
    previous: Option<String>,
}

impl<'a, D: DomMutator> StyleOverride<'a, D> {
    pub fn new(dom: &'a mut D, node: D::Node, property: &'static str, value: &str) -> Self {
        let previous = dom.inline_style(node, property).map(str::to_owned);
        dom.set_style(node, property, value);
        Self {
            dom,
            node,
            property,
            previous,
        }
    }
}

impl<D: DomMutator> Deref for StyleOverride<'_, D> {
    type Target = D;

    fn deref(&self) -> &D {
        self.dom
    }
}

impl<D: DomMutator> DerefMut for StyleOverride<'_, D> {
    fn deref_mut(&mut self) -> &mut D {
        self.dom
    }
}

impl<D: DomMutator> Drop for StyleOverride<'_, D> {
    fn drop(&mut self) {
        match self.previous.take() {
            Some(value) => self.dom.set_style(self.node, self.property, &value),
            None => self.dom.remove_style(self.node, self.property),
        }
    }
}
