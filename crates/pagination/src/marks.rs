//! Per-node pagination marks, keyed by node identity.
//!
//! Marks are monotonic within a run: nothing is ever unset.

use log::trace;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mark {
    Processed,
    PageStart,
    PageEnd,
    NoBreak,
    NoHang,
    /// The node was fully split and its fragments replace it.
    Sliced,
    /// The node's content was moved into fragments; only its shell remains.
    Slough,
    ForcedPageBreak,
    IgnorableSpacer,
    /// Line splitting already ran on the node.
    Split,
}

impl Mark {
    fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct NodeMarks {
    flags: u16,
    page_start: Option<usize>,
    page_end: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct MarkSet<N> {
    marks: HashMap<N, NodeMarks>,
}

impl<N> Default for MarkSet<N> {
    fn default() -> Self {
        Self {
            marks: HashMap::new(),
        }
    }
}

impl<N: Copy + Eq + Hash + Debug> MarkSet<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_marked(&self, node: N, mark: Mark) -> bool {
        self.marks
            .get(&node)
            .is_some_and(|m| m.flags & mark.bit() != 0)
    }

    /// Sets `mark` on `node`. Returns `false` when it was already set.
    pub fn set_mark(&mut self, node: N, mark: Mark) -> bool {
        let entry = self.marks.entry(node).or_default();
        if entry.flags & mark.bit() != 0 {
            trace!("{:?} already carries {:?}", node, mark);
            return false;
        }
        entry.flags |= mark.bit();
        true
    }

    pub fn mark_processed(&mut self, node: N, reason: &str) {
        if self.set_mark(node, Mark::Processed) {
            trace!("processed {:?}: {}", node, reason);
        }
    }

    pub fn mark_page_start(&mut self, node: N, page: usize) {
        self.set_mark(node, Mark::PageStart);
        let entry = self.marks.entry(node).or_default();
        entry.page_start.get_or_insert(page);
    }

    pub fn mark_page_end(&mut self, node: N, page: usize) {
        self.set_mark(node, Mark::PageEnd);
        let entry = self.marks.entry(node).or_default();
        entry.page_end.get_or_insert(page);
    }

    /// 1-based number of the page `node` starts.
    pub fn page_start(&self, node: N) -> Option<usize> {
        self.marks.get(&node).and_then(|m| m.page_start)
    }

    /// 1-based number of the page `node` ends.
    pub fn page_end(&self, node: N) -> Option<usize> {
        self.marks.get(&node).and_then(|m| m.page_end)
    }

    pub fn len(&self) -> usize {
        self.marks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marks_are_independent_flags() {
        let mut marks = MarkSet::new();
        assert!(marks.set_mark(1u32, Mark::NoBreak));
        assert!(marks.set_mark(1, Mark::NoHang));
        assert!(!marks.set_mark(1, Mark::NoBreak));
        assert!(marks.is_marked(1, Mark::NoHang));
        assert!(!marks.is_marked(1, Mark::Sliced));
        assert!(!marks.is_marked(2, Mark::NoBreak));
    }

    #[test]
    fn first_page_number_wins() {
        let mut marks = MarkSet::new();
        marks.mark_page_start(7u32, 2);
        marks.mark_page_start(7, 5);
        assert_eq!(marks.page_start(7), Some(2));
        assert!(marks.is_marked(7, Mark::PageStart));
        assert_eq!(marks.page_end(7), None);
    }
}
