use crate::context::FlowContext;
use log::debug;
use pagecut_style::Display;
use pagecut_traits::DomMutator;

impl<D: DomMutator> FlowContext<'_, D> {
    /// Caption first, then every row with row groups unwrapped.
    pub fn split_table(&mut self, table: D::Node) -> Vec<D::Node> {
        let mut units = Vec::new();
        let mut rows = 0;
        for child in self.get_flow_children(table) {
            let display = self.display(child);
            if display == Display::TableCaption || self.dom.is_tag(child, "CAPTION") {
                units.insert(0, child);
            } else if display == Display::TableRow {
                units.push(child);
                rows += 1;
            } else if display.is_row_group() {
                for row in self.get_flow_children(child) {
                    if self.display(row) == Display::TableRow {
                        units.push(row);
                        rows += 1;
                    }
                }
            }
        }

        let config = &self.config;
        let needed = config
            .min_breakable_rows
            .max(config.min_left_rows + config.min_dangling_rows);
        if rows < needed {
            debug!("table {:?} has {} rows, keeping it whole", table, rows);
            return Vec::new();
        }
        self.mark_sliced(table);
        units
    }

    /// `display: table` on something that is not a `TABLE`.
    pub fn split_table_like(&mut self, node: D::Node) -> Vec<D::Node> {
        self.split_table(node)
    }
}

#[cfg(test)]
mod tests {
    use crate::marks::Mark;
    use crate::test_utils::{build, el, with_context};
    use pagecut_dom::ElementSpec;

    fn row(id: &str) -> ElementSpec {
        el("tr")
            .id(id)
            .child(el("td").style("height: 40px"))
            .child(el("td").style("height: 30px"))
    }

    #[test]
    fn rows_become_units_after_the_caption() {
        let mut doc = build(
            el("body").child(
                el("table")
                    .id("t")
                    .child(el("caption").id("cap").style("height: 20px"))
                    .child(el("tbody").child(row("r1")).child(row("r2")).child(row("r3"))),
            ),
        );
        let ids = ["t", "cap", "r1", "r2", "r3"].map(|id| doc.element_by_id(id).unwrap());
        with_context(&mut doc, |ctx| {
            let units = ctx.split_table(ids[0]);
            assert_eq!(units, ids[1..].to_vec());
            assert!(ctx.marks().is_marked(ids[0], Mark::Sliced));
        });
    }

    #[test]
    fn single_row_table_stays_whole() {
        let mut doc = build(el("body").child(el("table").id("t").child(row("r1"))));
        let table = doc.element_by_id("t").unwrap();
        with_context(&mut doc, |ctx| {
            assert!(ctx.split_table(table).is_empty());
            assert!(!ctx.marks().is_marked(table, Mark::Sliced));
        });
    }

    #[test]
    fn table_like_divs_split_by_rows() {
        let mut doc = build(
            el("body").child(
                el("div")
                    .id("t")
                    .style("display: table")
                    .child(el("div").id("a").style("display: table-row; height: 30px"))
                    .child(el("div").id("b").style("display: table-row; height: 30px")),
            ),
        );
        let t = doc.element_by_id("t").unwrap();
        let a = doc.element_by_id("a").unwrap();
        let b = doc.element_by_id("b").unwrap();
        with_context(&mut doc, |ctx| {
            assert_eq!(ctx.split_table_like(t), vec![a, b]);
        });
    }
}
