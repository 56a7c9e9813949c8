use core::ops::Range;

use super::range;
use intrusive_collections::intrusive_adapter;
use intrusive_collections::rbtree::Cursor;
use intrusive_collections::{Bound, KeyAdapter, RBTree, RBTreeAtomicLink};

struct Node {
    link: RBTreeAtomicLink,
    start: usize,
    end: usize,
}

impl Node {
    fn new(range: Range<usize>) -> Box<Self> {
        Box::new(Self {
            link: RBTreeAtomicLink::default(),
            start: range.start,
            end: range.end,
        })
    }

    fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

intrusive_adapter!(NodeTreeAdapter = Box<Node>: Node { link: RBTreeAtomicLink });

impl<'a> KeyAdapter<'a> for NodeTreeAdapter {
    type Key = usize;

    fn get_key(&self, node: &'a Node) -> Self::Key {
        node.start
    }
}

/// An ordered set of half-open `usize` intervals.
///
/// Stored intervals are kept in minimal form: sorted by start, never
/// overlapping and never adjacent. Any insertion touching existing intervals
/// is merged with them.
#[derive(Default)]
pub struct RangeSet {
    nodes: RBTree<NodeTreeAdapter>,
}

impl RangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `range` to the set, merging it with every stored interval that
    /// overlaps or is adjacent to it. Empty ranges are ignored.
    pub fn insert(&mut self, range: Range<usize>) {
        if range.is_empty() {
            return;
        }

        let mut merged = range;

        {
            // Start from the last interval beginning at or before the new one,
            // since it is the only lower interval which can reach into it.
            let mut it = self.nodes.upper_bound_mut(Bound::Included(&merged.start));
            if it.is_null() {
                it = self.nodes.front_mut();
            }

            while let Some(node) = it.get() {
                if node.start > merged.end {
                    break;
                }

                if !range::touching(&node.range(), &merged) {
                    it.move_next();
                    continue;
                }

                merged = merged.start.min(node.start)..merged.end.max(node.end);

                // Removal advances the cursor to the next interval.
                it.remove();
            }
        }

        self.nodes.insert(Node::new(merged));
    }

    /// Returns true if a single stored interval covers all of `range`.
    /// Empty ranges are always contained.
    pub fn contains(&self, range: Range<usize>) -> bool {
        if range.is_empty() {
            return true;
        }

        match self.at_or_before(range.start).get() {
            Some(node) => range::covers(&node.range(), &range),
            None => false,
        }
    }

    /// Length of the stored run beginning exactly at `offset`, or 0 if
    /// `offset` is not covered.
    pub fn prefix_len(&self, offset: usize) -> usize {
        match self.at_or_before(offset).get() {
            Some(node) if node.end > offset => node.end - offset,
            _ => 0,
        }
    }

    /// Returns the smallest range spanning every part of `range` that is not
    /// covered by the set, or [`None`] if `range` is fully covered.
    pub fn gaps(&self, range: Range<usize>) -> Option<Range<usize>> {
        let mut span: Option<Range<usize>> = None;
        let mut hole = |start: usize, end: usize| {
            span = Some(span.take().map_or(start, |span| span.start)..end);
        };

        let mut offset = range.start;
        let mut it = self.at_or_before(offset);
        if it.is_null() {
            it = self.nodes.front();
        }

        while offset < range.end {
            match it.get() {
                Some(node) if node.end <= offset => it.move_next(),
                Some(node) if node.start <= offset => {
                    offset = node.end;
                    it.move_next();
                }
                Some(node) if node.start < range.end => {
                    hole(offset, node.start);
                    offset = node.end;
                    it.move_next();
                }
                _ => {
                    hole(offset, range.end);
                    break;
                }
            }
        }

        span
    }

    /// Iterates the stored intervals in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = Range<usize>> + '_ {
        self.nodes.iter().map(Node::range)
    }

    /// Number of disjoint intervals stored.
    pub fn len(&self) -> usize {
        self.nodes.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Total number of elements covered by the set.
    pub fn covered_len(&self) -> usize {
        self.iter().map(|r| r.len()).sum()
    }

    fn at_or_before(&self, offset: usize) -> Cursor<'_, NodeTreeAdapter> {
        self.nodes.upper_bound(Bound::Included(&offset))
    }
}
