//! The page scanner: walks the prepared flow and records where pages start.

use crate::PaginationError;
use crate::config::PaginationConfig;
use crate::constraints::ConstraintSelectors;
use crate::context::FlowContext;
use crate::marks::{Mark, MarkSet};
use crate::queue::PendingMutation;
use log::{debug, info, trace, warn};
use pagecut_style::Display;
use pagecut_traits::{DomMutator, SyntheticTag};
use pagecut_types::{approx_eq, approx_le};

/// One output page.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<N> {
    pub page_start: N,
    pub page_top: f32,
    /// Always `page_top + reference_height`.
    pub page_bottom: f32,
    /// The box the page top was read from, when it differs from nothing.
    pub page_top_anchor: Option<N>,
    /// Element sibling right before `page_start`; it ends the previous page.
    pub prev_page_end: Option<N>,
    pub page_end: Option<N>,
    /// Last page only: the last content element, whose bottom margin is reset.
    pub to_reset_bottom: Option<N>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStartKind {
    /// The element itself opens the new page.
    Current,
    /// The element follows one that just closed a page.
    Next,
}

/// The pages registered so far. The last one is the page being filled.
#[derive(Debug, Clone)]
pub struct PageList<N> {
    pages: Vec<Page<N>>,
}

impl<N> Default for PageList<N> {
    fn default() -> Self {
        Self { pages: Vec::new() }
    }
}

impl<N: Copy + PartialEq> PageList<N> {
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn last(&self) -> Option<&Page<N>> {
        self.pages.last()
    }

    pub fn last_start(&self) -> Option<N> {
        self.pages.last().map(|p| p.page_start)
    }

    /// Bottom of the page being filled; unbounded before the first page.
    pub fn current_bottom(&self) -> f32 {
        self.pages.last().map_or(f32::INFINITY, |p| p.page_bottom)
    }

    pub fn as_slice(&self) -> &[Page<N>] {
        &self.pages
    }

    fn push(&mut self, page: Page<N>) {
        self.pages.push(page);
    }

    fn into_vec(self) -> Vec<Page<N>> {
        self.pages
    }
}

/// What the scanner knows about the node being visited.
#[derive(Debug, Clone, Copy)]
struct ScanItem<N> {
    previous: Option<N>,
    current: N,
    next: Option<N>,
    is_first: bool,
    /// The wrapper this node opens, handed down to first children only.
    top_parent: Option<N>,
    /// The wrapper this node closes, handed down to last children only.
    bottom_parent: Option<N>,
}

/// Result of a pagination run.
#[derive(Debug, Clone)]
pub struct PaginationOutcome<N> {
    pub pages: Vec<Page<N>>,
    pub marks: MarkSet<N>,
    /// Permissive-mode assertion failures, in the order they happened.
    pub assertions: Vec<String>,
}

/// One pagination run over a content flow.
pub struct Pagination<'d, D: DomMutator> {
    ctx: FlowContext<'d, D>,
    selectors: ConstraintSelectors,
    minimum_breakable_height: f32,
    flow_end: Option<D::Node>,
    flow_last_child: Option<D::Node>,
}

impl<'d, D: DomMutator> Pagination<'d, D> {
    /// `root` is the reference for all geometry, `flow` the element whose
    /// content is paginated. They may be the same node.
    pub fn new(
        dom: &'d mut D,
        root: D::Node,
        flow: D::Node,
        config: PaginationConfig,
    ) -> Result<Self, PaginationError> {
        config.validate()?;
        if !dom.is_element(flow) || !dom.contains(root, flow) {
            return Err(PaginationError::EmptyFlow);
        }
        let selectors = ConstraintSelectors::from_config(&config)?;
        let minimum_breakable_height = dom.line_height(root) * config.min_breakable_lines() as f32;
        Ok(Self {
            ctx: FlowContext::new(dom, root, flow, config),
            selectors,
            minimum_breakable_height,
            flow_end: None,
            flow_last_child: None,
        })
    }

    pub fn calculate(mut self) -> Result<PaginationOutcome<D::Node>, PaginationError> {
        let (flow_start, flow_end) = self.ctx.ensure_flow_sentinels();
        self.ctx.prepare_constraints(&self.selectors);

        let mut pages = PageList::default();
        self.calculate_page_starts(&mut pages, flow_start, flow_end)?;
        self.resolve_page_ends(&mut pages);

        self.ctx.mark_page_boundaries(pages.as_slice());
        if self.ctx.config.reset_page_edge_margins {
            self.ctx.normalize_page_edges(pages.as_slice());
        }
        // Geometry is no longer read past this point.
        self.ctx.queue.flush(&mut *self.ctx.dom);

        info!("Paginated flow into {} pages", pages.len());
        Ok(PaginationOutcome {
            pages: pages.into_vec(),
            marks: self.ctx.marks,
            assertions: self.ctx.assertions.into_failures(),
        })
    }

    fn calculate_page_starts(
        &mut self,
        pages: &mut PageList<D::Node>,
        flow_start: D::Node,
        flow_end: D::Node,
    ) -> Result<(), PaginationError> {
        self.register_page_start(pages, flow_start, false, PageStartKind::Current, "first page")?;

        if self.ctx.bottom(flow_end) < self.ctx.config.reference_height {
            debug!("Content flow fits one page, looking for forced breaks only");
            self.flow_end = Some(flow_end);
            self.flow_last_child = self.previous_flow_sibling(flow_end);
            let flow = self.ctx.flow;
            for marker in self.ctx.find_all_forced_page_breaks_inside(flow) {
                self.register_page_start(pages, marker, false, PageStartKind::Current, "forced break in a short flow")?;
            }
            return Ok(());
        }

        let flow = self.ctx.flow;
        let content = self.ctx.get_prepared_children(flow);
        self.flow_end = content.last().copied();
        self.flow_last_child = content.len().checked_sub(2).map(|i| content[i]);
        self.parse_nodes(pages, &content, None, None, None, None)
    }

    fn previous_flow_sibling(&mut self, node: D::Node) -> Option<D::Node> {
        let mut sibling = self.ctx.dom.left_neighbor(node);
        while let Some(s) = sibling {
            if !self.ctx.should_skip_flow_element(s) {
                return Some(s);
            }
            sibling = self.ctx.dom.left_neighbor(s);
        }
        None
    }

    fn resolve_page_ends(&self, pages: &mut PageList<D::Node>) {
        for i in 1..pages.pages.len() {
            pages.pages[i - 1].page_end = pages.pages[i].prev_page_end;
        }
        if let Some(last) = pages.pages.last_mut() {
            last.to_reset_bottom = self.flow_last_child;
            last.page_end = self.flow_end;
        }
    }

    fn register_page_start(
        &mut self,
        pages: &mut PageList<D::Node>,
        element: D::Node,
        improve: bool,
        kind: PageStartKind,
        context: &str,
    ) -> Result<(), PaginationError> {
        if kind == PageStartKind::Next && self.ctx.is_flow_end(element) {
            trace!("{context}: reached the end of the flow, nothing to register");
            return Ok(());
        }
        if self.ctx.marks.is_marked(element, Mark::PageStart) {
            trace!("{context}: {element:?} already starts a page");
            return Ok(());
        }
        if self.ctx.is_ignorable_spacer_paragraph(element) {
            if self.ctx.marks.set_mark(element, Mark::IgnorableSpacer) {
                debug!("{context}: hiding empty paragraph {element:?} instead of starting a page with it");
                self.ctx.queue.enqueue(PendingMutation::Hide(element));
            }
            return Ok(());
        }

        let mut page_start = element;
        if improve {
            let previous = pages.last().map(|p| (p.page_start, p.page_top));
            page_start = self.ctx.find_better_page_start(
                element,
                previous.map(|(start, _)| start),
                previous.map(|(_, top)| top),
            );
        }
        if self.ctx.dom.offset_parent(page_start).is_none() {
            warn!("{context}: page start {page_start:?} has no offset parent");
        }

        let (page_top, page_top_anchor) = self.ctx.page_start_top_info(page_start);
        if let Some(last) = pages.last() {
            if approx_eq(page_top, last.page_top) {
                debug!("{context}: {page_start:?} would open an empty page at {page_top}, skipped");
                return Ok(());
            }
            if page_top < last.page_top {
                let previous_top = last.page_top;
                return self.ctx.assertions.check(false, || {
                    format!(
                        "page start {page_start:?} at {page_top} lies above the previous page top {previous_top} ({context})"
                    )
                });
            }
        }

        let page_bottom = page_top + self.ctx.config.reference_height;
        let prev_page_end = self.ctx.dom.left_neighbor(page_start);
        pages.push(Page {
            page_start,
            page_top,
            page_bottom,
            page_top_anchor,
            prev_page_end,
            page_end: None,
            to_reset_bottom: None,
        });
        let number = pages.len();
        self.ctx.marks.mark_page_start(page_start, number);
        debug!(
            "Registered page {number}: top {page_top}, bottom {page_bottom}, start {page_start:?} ({context})"
        );
        Ok(())
    }

    fn parse_nodes(
        &mut self,
        pages: &mut PageList<D::Node>,
        array: &[D::Node],
        previous: Option<D::Node>,
        next: Option<D::Node>,
        top_parent: Option<D::Node>,
        bottom_parent: Option<D::Node>,
    ) -> Result<(), PaginationError> {
        let last = array.len().saturating_sub(1);
        for (i, &current) in array.iter().enumerate() {
            let item = ScanItem {
                previous: if i == 0 { previous } else { Some(array[i - 1]) },
                current,
                next: array.get(i + 1).copied().or(next),
                is_first: i == 0,
                top_parent: if i == 0 { top_parent } else { None },
                bottom_parent: if i == last { bottom_parent } else { None },
            };
            self.parse_node(pages, item)?;
        }
        Ok(())
    }

    fn mark_processed(&mut self, node: D::Node, reason: &str) {
        self.ctx.marks.mark_processed(node, reason);
    }

    fn parse_node(
        &mut self,
        pages: &mut PageList<D::Node>,
        item: ScanItem<D::Node>,
    ) -> Result<(), PaginationError> {
        let current = item.current;
        let Some(next) = item.next else {
            self.mark_processed(current, "content flow end");
            return Ok(());
        };
        let reference_height = self.ctx.config.reference_height;
        let current_top = self.ctx.top(current);
        let current_bottom = self.ctx.bottom(current);
        let parent_bottom_edge = item.bottom_parent.map(|p| self.ctx.bottom(p));
        let mut current_parent_bottom_edge = parent_bottom_edge;
        trace!(
            "visiting {current:?} [{current_top}, {current_bottom}] on page {} ending at {}",
            pages.len(),
            pages.current_bottom()
        );

        // Wrappers closing below this node reach more than a page further down.
        if let (Some(bottom_parent), Some(edge)) = (item.bottom_parent, parent_bottom_edge) {
            if edge - current_bottom >= reference_height {
                current_parent_bottom_edge = None;
                if current_bottom <= pages.current_bottom() {
                    return self.break_tail(pages, current, bottom_parent, edge);
                }
                trace!("{current:?} crosses the cut itself, resolving it before its tail");
            }
        }

        let block_bottom = current_parent_bottom_edge.unwrap_or(current_bottom);

        if pages.last_start() == Some(current)
            && (self.ctx.is_no_break(current) || block_bottom <= pages.current_bottom())
        {
            self.mark_processed(current, "already starts the page and fits");
            return Ok(());
        }

        if current_top >= pages.current_bottom() && current_bottom - current_top != 0.0 {
            let parent_top = match (item.is_first, item.top_parent) {
                (true, Some(parent)) => Some(self.ctx.page_start_top_info(parent).0),
                _ => None,
            };
            let beginning_tail = parent_top.is_some_and(|top| current_top - top >= reference_height);
            if !beginning_tail {
                let display = self.ctx.display(current);
                if display.is_inline() || display == Display::Contents {
                    return self.register_page_start(
                        pages,
                        current,
                        true,
                        PageStartKind::Current,
                        "current in thin wrapper",
                    );
                }
            }
            self.register_page_start(
                pages,
                current,
                !beginning_tail,
                PageStartKind::Current,
                "current starts below the page bottom",
            )?;
        }

        if self.ctx.is_forced_page_break(current) {
            self.register_page_start(pages, current, false, PageStartKind::Current, "forced page break")?;
            self.mark_processed(current, "forced page break");
            return Ok(());
        }

        let has_box = self.ctx.dom.offset_parent(current).is_some();
        self.ctx
            .assertions
            .check(has_box, || format!("{current:?} is expected to have an offset parent"))?;

        let next_top = self.ctx.top(next);
        if approx_le(next_top, pages.current_bottom()) {
            self.mark_processed(current, "fits");
            for marker in self.ctx.find_all_forced_page_breaks_inside(current) {
                self.mark_processed(marker, "forced page break inside a fitting node");
                self.register_page_start(
                    pages,
                    marker,
                    false,
                    PageStartKind::Current,
                    "forced page break inside a fitting node",
                )?;
            }
            return Ok(());
        }

        if approx_le(block_bottom, pages.current_bottom()) {
            if self.ctx.is_no_hanging(current) {
                self.mark_processed(current, "no-hanging element moves to the next page");
                return self.register_page_start(
                    pages,
                    current,
                    true,
                    PageStartKind::Current,
                    "no-hanging element",
                );
            }
            self.register_page_start(pages, next, false, PageStartKind::Next, "current ends the page")?;
            self.mark_processed(current, "fits, ends the page");
            self.mark_processed(next, "starts the next page");
            return Ok(());
        }

        if let Some(media) = self.ctx.resolve_replaced_element(current) {
            return self.place_media(pages, item, next, media, parent_bottom_edge);
        }

        if self.ctx.dom.inline_style(current, "height").is_some() {
            return self.place_fixed_height(pages, current, next, current_top, next_top);
        }

        if self.ctx.height(current) < self.minimum_breakable_height {
            self.register_page_start(pages, current, true, PageStartKind::Current, "too few lines to split")?;
            self.mark_processed(current, "moved whole, too few lines");
            return Ok(());
        }

        let children = self
            .ctx
            .get_split_children(current, pages.current_bottom(), reference_height);
        if children.is_empty() {
            self.register_page_start(
                pages,
                current,
                true,
                PageStartKind::Current,
                "does not fit and cannot be split",
            )?;
            self.mark_processed(current, "unbreakable, moved whole");
            return Ok(());
        }

        let sliced = self.ctx.marks.is_marked(current, Mark::Sliced)
            || self.ctx.marks.is_marked(current, Mark::Slough);
        let (top_parent, bottom_parent) = if sliced {
            (None, None)
        } else {
            (
                Some(item.top_parent.unwrap_or(current)),
                Some(item.bottom_parent.unwrap_or(current)),
            )
        };
        self.parse_nodes(pages, &children, item.previous, item.next, top_parent, bottom_parent)?;
        self.mark_processed(current, "split into children");
        Ok(())
    }

    /// Breaks the run of wrapper bottoms below `current` with service markers
    /// wherever a wrapper closes past the page bottom.
    fn break_tail(
        &mut self,
        pages: &mut PageList<D::Node>,
        current: D::Node,
        bottom_parent: D::Node,
        edge: f32,
    ) -> Result<(), PaginationError> {
        let mut parents = Vec::new();
        let mut walker = Some(current);
        while let Some(element) = walker {
            if element == bottom_parent {
                break;
            }
            parents.push((element, self.ctx.bottom(element)));
            walker = self.ctx.dom.parent(element);
        }
        if walker != Some(bottom_parent) {
            return self.ctx.assertions.report(PaginationError::MissingAncestor);
        }
        parents.push((bottom_parent, edge));

        for (element, bottom) in parents {
            if bottom <= pages.current_bottom() {
                continue;
            }
            let starter = self.ctx.dom.create_synthetic(SyntheticTag::Neutral);
            self.ctx.dom.set_attribute(starter, "class", "service");
            self.ctx.dom.insert_at_end(element, starter);
            self.register_page_start(pages, starter, false, PageStartKind::Current, "tail longer than a page")?;
            self.mark_processed(starter, "tail page start");
            if edge <= pages.current_bottom() {
                break;
            }
        }
        Ok(())
    }

    fn place_media(
        &mut self,
        pages: &mut PageList<D::Node>,
        item: ScanItem<D::Node>,
        next: D::Node,
        media: D::Node,
        parent_bottom_edge: Option<f32>,
    ) -> Result<(), PaginationError> {
        let current = item.current;
        let reference_width = self.ctx.config.reference_width;
        let image_top = self.ctx.top(media);
        let image_bottom = self.ctx.bottom(media);
        let image_parent = item.top_parent.or_else(|| self.ctx.dom.parent(media));
        let gap = self.media_gap_below(image_parent, media);

        let mut available = pages.current_bottom() - image_top - gap;
        if let Some(edge) = parent_bottom_edge {
            available -= edge - image_bottom;
        }
        let height = self.ctx.height(media);
        let width = self.ctx.dom.width(media);
        if width > reference_width {
            warn!("{media:?} is wider ({width}) than the page ({reference_width})");
        }

        if height < available {
            self.mark_processed(current, "media fits, next starts a page");
            return self.register_page_start(pages, next, false, PageStartKind::Next, "media fits");
        }

        let ratio = available / height;
        if ratio > self.ctx.config.image_reduction_ratio {
            self.mark_processed(current, "media shrunk into the remaining space");
            self.ctx
                .fit_element_within_boundaries(media, height, width, available, reference_width);
            return self.register_page_start(pages, next, false, PageStartKind::Next, "media shrunk");
        }

        self.mark_processed(current, "media moves to the next page");
        self.register_page_start(pages, media, true, PageStartKind::Current, "media moves to the next page")?;

        let mut full_space = pages.current_bottom() - image_top - gap;
        let tail_bottom = match parent_bottom_edge {
            Some(edge) => edge,
            None => {
                let tail = self.ctx.find_last_child_parent(current).unwrap_or(current);
                self.ctx.bottom(tail)
            }
        };
        if tail_bottom > image_bottom {
            full_space -= tail_bottom - image_bottom;
        }
        if height > full_space {
            self.ctx
                .fit_element_within_boundaries(media, height, width, full_space, reference_width);
        }
        Ok(())
    }

    /// The descent gap below inline media, only meaningful inside a wrapper it closes.
    fn media_gap_below(&mut self, parent: Option<D::Node>, media: D::Node) -> f32 {
        let Some(parent) = parent else {
            return 0.0;
        };
        if parent == self.ctx.flow || self.ctx.get_flow_last_child(parent) != Some(media) {
            return 0.0;
        }
        self.ctx.inline_media_gap(Some(parent), media)
    }

    fn place_fixed_height(
        &mut self,
        pages: &mut PageList<D::Node>,
        current: D::Node,
        next: D::Node,
        current_top: f32,
        next_top: f32,
    ) -> Result<(), PaginationError> {
        let contextual_height = next_top - current_top;
        if contextual_height <= 0.0 {
            self.mark_processed(current, "fixed height without extent");
            return self.register_page_start(pages, current, true, PageStartKind::Current, "fixed height");
        }
        let available = pages.current_bottom() - current_top;
        let available_factor = available / contextual_height;
        let full_page_factor = self.ctx.config.reference_height / contextual_height;
        self.ctx.assertions.check(available_factor < 1.0, || {
            format!("{current:?} with fixed height was expected to overflow (factor {available_factor})")
        })?;

        if available_factor > self.ctx.config.image_reduction_ratio {
            self.ctx
                .scale_element_with_wrapper(current, contextual_height, available_factor);
            self.register_page_start(pages, next, false, PageStartKind::Next, "fixed height shrunk into the remaining space")?;
            self.mark_processed(current, "fixed height shrunk");
            self.mark_processed(next, "follows a shrunk fixed height");
            return Ok(());
        }

        if full_page_factor < 1.0 {
            self.mark_processed(current, "fixed height shrunk to a full page");
            self.ctx
                .scale_element_with_wrapper(current, contextual_height, full_page_factor);
        }
        self.register_page_start(pages, current, true, PageStartKind::Current, "fixed height moves to the next page")?;
        self.mark_processed(current, "fixed height starts a page");
        Ok(())
    }
}

/// Paginates `flow` in one call.
pub fn paginate<D: DomMutator>(
    dom: &mut D,
    root: D::Node,
    flow: D::Node,
    config: PaginationConfig,
) -> Result<PaginationOutcome<D::Node>, PaginationError> {
    Pagination::new(dom, root, flow, config)?.calculate()
}
