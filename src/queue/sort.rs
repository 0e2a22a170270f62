//! Stable merge sort over the node chain
//!
//! The chain is split with a slow/fast traversal (`fast` starts one node
//! ahead, so the front half gets the extra node on odd lengths) and the halves
//! are sorted recursively. Split recursion depth is `ceil(log2 n)`. Merging is
//! iterative and only relinks nodes; nothing is allocated or freed.

use super::node::NodeId;
use super::Queue;
use std::cmp::Ordering;

/// Byte-wise ASCII case-insensitive ordering, as `strcasecmp` in the C locale
pub fn compare_ignore_case(a: &str, b: &str) -> Ordering {
    a.bytes()
        .map(|c| c.to_ascii_lowercase())
        .cmp(b.bytes().map(|c| c.to_ascii_lowercase()))
}

/// A sorted run: (first node, last node)
type Run = (NodeId, NodeId);

impl Queue {
    /// Sort ascending, ignoring ASCII case. Equal values keep their order.
    pub fn sort(&mut self) {
        if self.size < 2 {
            return;
        }
        let Some(head) = self.head else {
            return;
        };

        let (head, tail) = self.merge_sort(head);
        self.head = Some(head);
        self.tail = Some(tail);
    }

    fn merge_sort(&mut self, head: NodeId) -> Run {
        let Some(back) = self.split(head) else {
            return (head, head);
        };

        let front = self.merge_sort(head);
        let back = self.merge_sort(back);
        self.merge(front, back)
    }

    /// Cut the chain after its midpoint; returns the first node of the back half
    fn split(&mut self, head: NodeId) -> Option<NodeId> {
        let mut slow = head;
        let mut fast = self.nodes[head].next;

        while let Some(f) = fast {
            fast = self.nodes[f].next;
            if let Some(f) = fast {
                if let Some(s) = self.nodes[slow].next {
                    slow = s;
                }
                fast = self.nodes[f].next;
            }
        }

        self.nodes[slow].next.take()
    }

    /// Merge two non-empty sorted runs; the left run wins ties
    fn merge(&mut self, left: Run, right: Run) -> Run {
        let mut a = Some(left.0);
        let mut b = Some(right.0);
        let mut head = None;
        let mut last: Option<NodeId> = None;

        while let (Some(x), Some(y)) = (a, b) {
            let pick = if compare_ignore_case(&self.nodes[y].value, &self.nodes[x].value)
                == Ordering::Less
            {
                b = self.nodes[y].next;
                y
            } else {
                a = self.nodes[x].next;
                x
            };

            match last {
                Some(l) => self.nodes[l].next = Some(pick),
                None => head = Some(pick),
            }
            last = Some(pick);
        }

        // One run is exhausted; the other is appended whole and keeps its tail
        let (rest, tail) = if a.is_some() { (a, left.1) } else { (b, right.1) };
        match last {
            Some(l) => self.nodes[l].next = rest,
            None => head = rest,
        }

        match head {
            Some(head) => (head, tail),
            None => unreachable!("merge of two non-empty runs produced no head"),
        }
    }
}
