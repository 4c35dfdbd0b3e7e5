use crate::context::FlowContext;
use log::debug;
use pagecut_traits::DomMutator;
use pagecut_types::approx_eq;

impl<D: DomMutator> FlowContext<'_, D> {
    /// The first item of every visual row of a row-flowing grid.
    pub fn split_grid(&mut self, grid: D::Node) -> Vec<D::Node> {
        let mut row_starts: Vec<(D::Node, f32)> = Vec::new();
        for item in self.get_prepared_children(grid) {
            let top = self.top(item);
            if !row_starts.iter().any(|&(_, t)| approx_eq(t, top)) {
                row_starts.push((item, top));
            }
        }
        if row_starts.len() < self.config.min_breakable_grid_rows {
            debug!("grid {:?} has {} rows, keeping it whole", grid, row_starts.len());
            return Vec::new();
        }
        row_starts.into_iter().map(|(item, _)| item).collect()
    }
}
