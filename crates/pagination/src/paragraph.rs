//! Breaking text blocks into orphan/widow safe line fragments.

use crate::config::LinePolicy;
use crate::context::FlowContext;
use crate::marks::Mark;
use crate::probe::StyleOverride;
use log::{debug, trace};
use pagecut_style::Display;
use pagecut_traits::{DomMutator, NodeType, SyntheticTag};

impl<D: DomMutator> FlowContext<'_, D> {
    /// Splits a complex text block (or a wrapped text run) into line fragments.
    ///
    /// The first `min_left` and last `min_dangling` lines come back as one
    /// fragment each. Returns an empty list when the block has too few lines
    /// to be broken. A block split once returns the same fragments again.
    pub fn split_into_lines(&mut self, node: D::Node, policy: LinePolicy) -> Vec<D::Node> {
        let min_breakable = policy.min_breakable();
        if self.estimate_line_count(node) < min_breakable {
            trace!("{:?}: too few lines to break", node);
            return Vec::new();
        }
        if self.marks.is_marked(node, Mark::Split) {
            return self.dom.element_children(node);
        }

        let children = self.get_prepared_children(node);
        let mut lined = Vec::with_capacity(children.len());
        for child in children {
            if self.estimate_line_count(child) > 1 && !self.is_no_break(child) {
                lined.extend(self.break_into_lines(child));
            } else {
                lined.push(child);
            }
        }

        let mut groups = self.group_into_rows(&lined);
        if groups.len() < min_breakable {
            trace!("{:?}: only {} rows, not breaking", node, groups.len());
            return Vec::new();
        }

        let head: Vec<D::Node> = groups.drain(..policy.min_left).flatten().collect();
        let tail_start = groups.len().saturating_sub(policy.min_dangling);
        let tail: Vec<D::Node> = groups.drain(tail_start..).flatten().collect();
        groups.insert(0, head);
        if !tail.is_empty() {
            groups.push(tail);
        }

        let mut fragments = Vec::with_capacity(groups.len());
        for (index, group) in groups.into_iter().enumerate() {
            let fragment = match group.as_slice() {
                [] => continue,
                [single] => *single,
                [first, ..] => {
                    let wrapper = self.dom.create_synthetic(SyntheticTag::TextGroup);
                    self.dom.insert_before(*first, wrapper);
                    for &item in &group {
                        self.dom.insert_at_end(wrapper, item);
                    }
                    wrapper
                }
            };
            self.dom
                .set_attribute(fragment, "data-child", &index.to_string());
            fragments.push(fragment);
        }

        self.marks.set_mark(node, Mark::Split);
        debug!("{:?} split into {} line fragments", node, fragments.len());
        fragments
    }

    pub(crate) fn estimate_line_count(&self, node: D::Node) -> usize {
        let line_height = self.dom.line_height(node);
        if line_height <= 0.0 {
            return 1;
        }
        (self.height(node) / line_height).ceil() as usize
    }

    /// A new row starts after a line break or wherever the flow drops down.
    fn group_into_rows(&self, items: &[D::Node]) -> Vec<Vec<D::Node>> {
        let mut rows: Vec<Vec<D::Node>> = Vec::new();
        for &item in items {
            let Some(row) = rows.last_mut() else {
                rows.push(vec![item]);
                continue;
            };
            if self.dom.is_tag(item, "BR") {
                // The break closes its own line.
                row.push(item);
                rows.push(Vec::new());
                continue;
            }
            let previous = row.last().copied();
            match previous {
                None => row.push(item),
                Some(p) if self.is_vertical_drop(p, item) => rows.push(vec![item]),
                Some(_) => row.push(item),
            }
        }
        rows.retain(|row| !row.is_empty());
        rows
    }

    /// `second` starts below `first`, give or take subpixel rounding.
    pub fn is_vertical_drop(&self, first: D::Node, second: D::Node) -> bool {
        self.top(second) - self.bottom(first) > -self.config.vertical_drop_tolerance
    }

    fn break_into_lines(&mut self, item: D::Node) -> Vec<D::Node> {
        if self.is_no_break(item) {
            return vec![item];
        }
        if self.is_wrapped_text_node(item) {
            return self.break_wrapped_text(item);
        }
        // Atomic inline boxes (inline-block and friends) keep their own lines.
        if self.display(item) != Display::Inline {
            return vec![item];
        }
        self.break_nested_inline(item)
    }

    fn break_wrapped_text(&mut self, wrapper: D::Node) -> Vec<D::Node> {
        let mut words = Vec::new();
        for child in self.dom.child_nodes(wrapper) {
            if self.dom.node_type(child) == NodeType::Text {
                words.extend(self.dom.split_text_into_words(child));
            }
        }
        if words.is_empty() {
            return vec![wrapper];
        }

        let starts = self.find_new_line_starts(&words, wrapper);
        let mut lines = Vec::with_capacity(starts.len());
        for (i, &start) in starts.iter().enumerate() {
            let end = starts.get(i + 1).copied().unwrap_or(words.len());
            let line = self.dom.create_synthetic(SyntheticTag::TextLine);
            self.dom.insert_before(wrapper, line);
            for &word in &words[start..end] {
                self.dom.insert_at_end(line, word);
            }
            lines.push(line);
        }
        self.dom.remove_node(wrapper);
        self.marks.set_mark(wrapper, Mark::Slough);
        trace!("text run {:?} broken into {} lines", wrapper, lines.len());
        lines
    }

    fn break_nested_inline(&mut self, node: D::Node) -> Vec<D::Node> {
        let nested = self.get_nested_inline_children(node);
        let mut lined = Vec::with_capacity(nested.len());
        for child in nested {
            if self.estimate_line_count(child) > 1 {
                lined.extend(self.break_into_lines(child));
            } else {
                lined.push(child);
            }
        }
        if lined.is_empty() {
            return vec![node];
        }

        let starts = self.find_new_line_starts(&lined, node);
        let paths: Vec<Vec<usize>> = lined
            .iter()
            .filter_map(|&leaf| self.child_index_path(node, leaf))
            .collect();
        if paths.len() != lined.len() {
            debug!("{:?}: fragments escaped their inline parent, leaving it whole", node);
            return vec![node];
        }

        let mut parts = Vec::with_capacity(starts.len());
        for (i, &start) in starts.iter().enumerate() {
            let end = starts.get(i + 1).copied().unwrap_or(lined.len());
            parts.push(self.clone_and_clean_outside_range(node, &paths, start, end));
        }
        self.dom.insert_instead_of(node, &parts);
        self.marks.set_mark(node, Mark::Slough);
        trace!("inline {:?} replaced by {} line clones", node, parts.len());
        parts
    }

    /// Leaves of an inline subtree: wrapped text runs and childless elements.
    fn get_nested_inline_children(&mut self, element: D::Node) -> Vec<D::Node> {
        let mut leaves = Vec::new();
        for item in self.dom.child_nodes(element) {
            if self.dom.is_significant_text(item) {
                let wrapper = self.dom.create_synthetic(SyntheticTag::TextNode);
                self.dom.wrap(item, wrapper);
                leaves.push(wrapper);
                continue;
            }
            if !self.dom.is_element(item) || self.should_skip_flow_element(item) {
                continue;
            }
            if self.dom.offset_parent(item).is_none() {
                leaves.extend(self.get_prepared_children(item));
            } else if self.dom.first_child(item).is_none() || self.is_wrapped_text_node(item) {
                leaves.push(item);
            } else {
                leaves.extend(self.get_nested_inline_children(item));
            }
        }
        leaves
    }

    /// Indices of the items that begin a new visual line. Always starts with 0.
    pub(crate) fn find_new_line_starts(&mut self, items: &[D::Node], container: D::Node) -> Vec<usize> {
        let probe_value = self.config.new_line_probe_line_height.clone();
        let root = self.root;
        let probe = StyleOverride::new(&mut *self.dom, container, "line-height", &probe_value);
        let mut starts = vec![0];
        for (i, pair) in items.windows(2).enumerate() {
            let previous_bottom = probe.top(pair[0], root) + probe.height(pair[0]);
            if previous_bottom <= probe.top(pair[1], root) {
                starts.push(i + 1);
            }
        }
        starts
    }

    fn child_index_path(&self, ancestor: D::Node, node: D::Node) -> Option<Vec<usize>> {
        let mut path = Vec::new();
        let mut current = node;
        while current != ancestor {
            let parent = self.dom.parent(current)?;
            let index = self
                .dom
                .child_nodes(parent)
                .iter()
                .position(|&c| c == current)?;
            path.push(index);
            current = parent;
        }
        path.reverse();
        Some(path)
    }

    fn resolve_path(&self, root: D::Node, path: &[usize]) -> Option<D::Node> {
        let mut current = root;
        for &index in path {
            current = *self.dom.child_nodes(current).get(index)?;
        }
        Some(current)
    }

    /// A deep copy of `node` keeping only the leaves in `start..end`.
    fn clone_and_clean_outside_range(
        &mut self,
        node: D::Node,
        leaf_paths: &[Vec<usize>],
        start: usize,
        end: usize,
    ) -> D::Node {
        let copy = self.dom.deep_clone(node);
        let outside: Vec<D::Node> = leaf_paths
            .iter()
            .enumerate()
            .filter(|(i, _)| *i < start || *i >= end)
            .filter_map(|(_, path)| self.resolve_path(copy, path))
            .collect();
        for leaf in outside {
            let mut parent = self.dom.parent(leaf);
            self.dom.remove_node(leaf);
            // Drop wrappers the removal left empty.
            while let Some(p) = parent {
                if p == copy || self.dom.first_child(p).is_some() {
                    break;
                }
                parent = self.dom.parent(p);
                self.dom.remove_node(p);
            }
        }
        copy
    }
}
