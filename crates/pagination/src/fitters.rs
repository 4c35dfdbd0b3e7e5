//! Shrinking content that cannot be broken so that it fits a page.

use crate::context::FlowContext;
use log::debug;
use pagecut_traits::{DomMutator, SyntheticTag};
use pagecut_types::EPSILON;

impl<D: DomMutator> FlowContext<'_, D> {
    /// Sets explicit pixel sizes on `element` so it fits `vspace` x `hspace`,
    /// keeping its aspect ratio. Never enlarges.
    pub fn fit_element_within_boundaries(
        &mut self,
        element: D::Node,
        height: f32,
        width: f32,
        vspace: f32,
        hspace: f32,
    ) {
        let mut scale: f32 = 1.0;
        if height > 0.0 {
            scale = scale.min(vspace / height);
        }
        if width > 0.0 {
            scale = scale.min(hspace / width);
        }
        let scale = scale.max(0.0);
        let new_height = whole_px(height * scale);
        let new_width = whole_px(width * scale);
        debug!(
            "fitting {:?}: {}x{} -> {}x{} (scale {:.3})",
            element, width, height, new_width, new_height, scale
        );
        self.dom.set_style(element, "width", &format!("{new_width}px"));
        self.dom.set_style(element, "height", &format!("{new_height}px"));
    }

    /// Scales `element` visually and wraps it in a neutral box reserving the
    /// scaled height. Returns the box.
    pub fn scale_element_with_wrapper(
        &mut self,
        element: D::Node,
        contextual_height: f32,
        scale: f32,
    ) -> D::Node {
        let scaled_height = format!("{}px", whole_px(contextual_height * scale));
        self.dom
            .set_style(element, "transform", &format!("scale({scale})"));
        self.dom.set_style(element, "transform-origin", "top center");

        if let Some(parent) = self
            .dom
            .parent(element)
            .filter(|&p| self.dom.is_synthetic(p, SyntheticTag::Neutral))
        {
            self.dom.set_style(parent, "height", &scaled_height);
            return parent;
        }

        let wrapper = self.dom.create_synthetic(SyntheticTag::Neutral);
        self.dom.set_style(wrapper, "display", "inline-block");
        self.dom.set_style(wrapper, "vertical-align", "top");
        self.dom.set_style(wrapper, "height", &scaled_height);
        self.dom.wrap(element, wrapper);
        debug!("scaled {:?} by {:.3} inside {:?}", element, scale, wrapper);
        wrapper
    }
}

/// Drops the fraction, tolerating float noise just below a whole pixel.
fn whole_px(value: f32) -> f32 {
    (value + EPSILON).trunc()
}

#[cfg(test)]
mod tests {
    use crate::test_utils::{build, el, with_context};
    use pagecut_traits::{GeometryOracle, SyntheticTag};

    #[test]
    fn fit_keeps_aspect_ratio() {
        let mut doc = build(el("body").child(el("img").id("img").style("width: 400px; height: 1100px")));
        let img = doc.element_by_id("img").unwrap();
        with_context(&mut doc, |ctx| {
            ctx.fit_element_within_boundaries(img, 1100.0, 400.0, 1000.0, 700.0);
            let dom = ctx.dom();
            assert_eq!(dom.inline_style(img, "height"), Some("1000px"));
            assert_eq!(dom.inline_style(img, "width"), Some("363px"));
            assert_eq!(dom.height(img), 1000.0);
        });
    }

    #[test]
    fn wrapper_reserves_scaled_height() {
        let mut doc = build(el("body").child(el("div").id("box").style("height: 400px")));
        let block = doc.element_by_id("box").unwrap();
        with_context(&mut doc, |ctx| {
            let wrapper = ctx.scale_element_with_wrapper(block, 400.0, 0.5);
            let dom = ctx.dom();
            assert!(dom.is_synthetic(wrapper, SyntheticTag::Neutral));
            assert_eq!(dom.parent(block), Some(wrapper));
            assert_eq!(dom.height(wrapper), 200.0);
            assert_eq!(dom.inline_style(block, "transform"), Some("scale(0.5)"));

            // A second scaling reuses the same wrapper.
            let again = ctx.scale_element_with_wrapper(block, 400.0, 0.25);
            assert_eq!(again, wrapper);
            assert_eq!(ctx.dom().height(wrapper), 100.0);
        });
    }
}
