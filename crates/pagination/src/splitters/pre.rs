use crate::context::FlowContext;
use pagecut_traits::DomMutator;

impl<D: DomMutator> FlowContext<'_, D> {
    /// Preformatted text breaks like a paragraph, with its own line policy.
    pub fn split_preformatted(&mut self, node: D::Node) -> Vec<D::Node> {
        let policy = self.config.pre_policy();
        let children = self.get_prepared_children(node);
        match children.as_slice() {
            [only] if self.is_complex_text_block(*only) => self.split_into_lines(*only, policy),
            _ => self.split_into_lines(node, policy),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::test_utils::{build, el, with_context};
    use pagecut_traits::{GeometryOracle, SyntheticTag};

    #[test]
    fn keeps_three_lines_at_each_end() {
        let source = (1..=10).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n");
        let mut doc = build(el("body").child(el("pre").id("code").text(&source)));
        let pre = doc.element_by_id("code").unwrap();
        with_context(&mut doc, |ctx| {
            let fragments = ctx.split_preformatted(pre);
            // Head group, four single lines, tail group.
            assert_eq!(fragments.len(), 6);
            let dom = ctx.dom();
            assert!(dom.is_synthetic(fragments[0], SyntheticTag::TextGroup));
            assert!(dom.is_synthetic(fragments[1], SyntheticTag::TextLine));
            assert!(dom.is_synthetic(fragments[5], SyntheticTag::TextGroup));
            assert_eq!(dom.height(fragments[0]), 60.0);
        });
    }

    #[test]
    fn short_listing_is_not_broken() {
        let mut doc = build(el("body").child(el("pre").id("code").text("a\nb\nc\nd\ne")));
        let pre = doc.element_by_id("code").unwrap();
        with_context(&mut doc, |ctx| assert!(ctx.split_preformatted(pre).is_empty()));
    }
}
