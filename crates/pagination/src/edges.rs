//! Finishing touches once every page is known: page numbers on the
//! boundary elements and margins that must not survive a page edge.

use crate::context::FlowContext;
use crate::pages::Page;
use crate::queue::PendingMutation;
use log::trace;
use pagecut_traits::DomMutator;

impl<D: DomMutator> FlowContext<'_, D> {
    /// Records page numbers on the start and end element of every page,
    /// both as marks and as `data-page-start` / `data-page-end` attributes.
    pub fn mark_page_boundaries(&mut self, pages: &[Page<D::Node>]) {
        for (index, page) in pages.iter().enumerate() {
            let number = index + 1;
            self.queue.enqueue(PendingMutation::SetAttribute {
                node: page.page_start,
                name: "data-page-start",
                value: number.to_string(),
            });
            if let Some(end) = page.page_end {
                self.marks.mark_page_end(end, number);
                self.queue.enqueue(PendingMutation::SetAttribute {
                    node: end,
                    name: "data-page-end",
                    value: number.to_string(),
                });
            }
        }
    }

    /// Zeroes the margins collapsing into each page edge, so that a page
    /// neither opens nor closes with blank space.
    pub fn normalize_page_edges(&mut self, pages: &[Page<D::Node>]) {
        for page in pages {
            self.reset_top_margins(page.page_start);
            if let Some(end) = page.prev_page_end {
                self.reset_bottom_margins(end);
            }
        }
        if let Some(last) = pages.last().and_then(|p| p.to_reset_bottom) {
            self.reset_bottom_margins(last);
        }
    }

    fn reset_top_margins(&mut self, node: D::Node) {
        let mut chain = vec![node];
        chain.extend(self.get_top_collapse_chain(node));
        trace!("resetting top margins of {:?}", chain);
        for element in chain {
            self.enqueue_style(element, "margin-top", "0");
        }
    }

    fn reset_bottom_margins(&mut self, node: D::Node) {
        let mut chain = vec![node];
        chain.extend(self.get_bottom_collapse_chain(node));
        trace!("resetting bottom margins of {:?}", chain);
        for element in chain {
            self.enqueue_style(element, "margin-bottom", "0");
            // Baseline alignment leaves a descent gap below inline media.
            if self.is_replaced_element(element) {
                self.enqueue_style(element, "vertical-align", "top");
            }
        }
    }

    fn enqueue_style(&mut self, node: D::Node, property: &'static str, value: &str) {
        self.queue.enqueue(PendingMutation::SetStyle {
            node,
            property,
            value: value.to_string(),
        });
    }
}
