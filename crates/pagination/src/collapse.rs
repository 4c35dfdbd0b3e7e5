//! Nested margins that collapse into a page edge.
//!
//! Assumes no negative margins and no compensating relative offsets.

use crate::children::Edge;
use crate::context::FlowContext;
use pagecut_traits::DomMutator;
use pagecut_types::approx_eq;

impl<D: DomMutator> FlowContext<'_, D> {
    /// First-child descendants of `node` sharing its top edge.
    pub fn get_top_collapse_chain(&mut self, node: D::Node) -> Vec<D::Node> {
        self.get_children_chain(node, Edge::First, true, &|ctx, child, parent| {
            !approx_eq(ctx.top(child), ctx.top(parent))
        })
    }

    /// Last-child descendants of `node` sharing its bottom edge.
    pub fn get_bottom_collapse_chain(&mut self, node: D::Node) -> Vec<D::Node> {
        self.get_children_chain(node, Edge::Last, true, &|ctx, child, parent| {
            !approx_eq(ctx.bottom(child), ctx.bottom(parent))
        })
    }
}
