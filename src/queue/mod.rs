//! Singly linked string queue
//!
//! This module provides the queue itself:
//! - [`Queue`]: head/tail-linked chain of owned strings with an element count
//! - [`QueueSlot`]: the same operations on an `Option<Queue>`, where `None`
//!   plays the role of an absent queue
//! - [`errors`]: [`QueueError`] and its allocation causes
//!
//! # Ownership
//!
//! The head index is the entry point that owns the chain; every node owns its
//! string and, through `next`, the rest of the chain. The tail index is a
//! cached position only. It is rewritten by every operation that changes the
//! structural end of the chain: insertion into an empty queue, tail insertion,
//! removal of the last node, reversal, and sorting.
//!
//! # Allocation
//!
//! All storage is registered with a caller-supplied [`Heap`] ledger. Each
//! insertion allocates one string block and one node block; each removal
//! releases the string block and then the node block. Teardown releases every
//! node before the queue header.

pub mod errors;
mod node;
mod reverse;
mod sort;

pub use errors::{AllocCause, QueueError};
pub use sort::compare_ignore_case;

use crate::memory::heap::Heap;
use crate::memory::{sizeof_block, Address, BlockKind};
use node::{Node, NodeArena, NodeId};
use tracing::{debug, error};

/// Outcome of a successful [`Queue::remove_head`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Removed {
    /// Bytes written to the buffer, terminator excluded
    pub copied: usize,
    /// The stored value did not fit in the buffer
    pub truncated: bool,
}

/// The queue
#[derive(Debug)]
pub struct Queue {
    nodes: NodeArena,
    head: Option<NodeId>,
    tail: Option<NodeId>,
    size: usize,
    /// Ledger address of the queue header
    addr: Address,
}

/// Read-only view of one node, for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeView {
    pub addr: Address,
    pub value_addr: Address,
    pub value: String,
}

impl Queue {
    /// Create an empty queue whose header is allocated from `heap`
    pub fn new(heap: &mut Heap) -> Result<Self, QueueError> {
        let addr = heap
            .allocate(sizeof_block(BlockKind::Queue, 0), BlockKind::Queue)
            .map_err(|e| QueueError::alloc(BlockKind::Queue, e))?;

        Ok(Queue {
            nodes: NodeArena::new(),
            head: None,
            tail: None,
            size: 0,
            addr,
        })
    }

    /// Release every node, every string, and finally the queue header
    pub fn free(mut self, heap: &mut Heap) {
        let mut cursor = self.head.take();
        while let Some(id) = cursor {
            match self.nodes.remove(id) {
                Some(node) => {
                    cursor = node.next;
                    release(heap, node.value_addr);
                    release(heap, node.addr);
                }
                None => {
                    error!(slot = id, "queue chain links to a vacant slot");
                    break;
                }
            }
        }
        self.tail = None;
        self.size = 0;
        release(heap, self.addr);
    }

    /// Insert a copy of `s` at the head. O(1).
    pub fn insert_head(&mut self, heap: &mut Heap, s: &str) -> Result<(), QueueError> {
        let id = self.alloc_node(heap, s, self.head)?;

        self.head = Some(id);
        if self.tail.is_none() {
            self.tail = Some(id);
        }
        self.size += 1;
        Ok(())
    }

    /// Insert a copy of `s` at the tail. O(1); never walks the chain.
    pub fn insert_tail(&mut self, heap: &mut Heap, s: &str) -> Result<(), QueueError> {
        let id = self.alloc_node(heap, s, None)?;

        match self.tail {
            Some(tail) => self.nodes[tail].next = Some(id),
            None => self.head = Some(id),
        }
        self.tail = Some(id);
        self.size += 1;
        Ok(())
    }

    /// Remove the head element. O(1).
    ///
    /// When `out` is given, the value is copied into it first: at most
    /// `out.len() - 1` bytes, then a NUL terminator, with the remainder of the
    /// buffer zero-filled. A zero-length buffer receives nothing. Returns
    /// `None` when the queue is empty.
    pub fn remove_head(&mut self, heap: &mut Heap, out: Option<&mut [u8]>) -> Option<Removed> {
        let id = self.head?;
        let node = self.nodes.remove(id)?;

        self.head = node.next;
        if self.head.is_none() {
            self.tail = None;
        }
        self.size = match self.size.checked_sub(1) {
            Some(size) => size,
            None => {
                error!("queue size underflow while removing the head");
                0
            }
        };

        let removed = match out {
            Some(buf) => copy_out(&node.value, buf),
            None => Removed {
                copied: 0,
                truncated: false,
            },
        };

        release(heap, node.value_addr);
        release(heap, node.addr);
        drop(node);

        Some(removed)
    }

    /// Number of elements. O(1).
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Ledger address of the queue header
    pub fn address(&self) -> Address {
        self.addr
    }

    /// Allocate the string copy and the node, rolling back on failure
    fn alloc_node(
        &mut self,
        heap: &mut Heap,
        s: &str,
        next: Option<NodeId>,
    ) -> Result<NodeId, QueueError> {
        if s.as_bytes().contains(&0) {
            return Err(QueueError::InvalidArgument {
                reason: "string contains an interior NUL byte",
            });
        }

        let value_addr = heap
            .allocate(sizeof_block(BlockKind::String, s.len()), BlockKind::String)
            .map_err(|e| QueueError::alloc(BlockKind::String, e))?;

        let mut value = String::new();
        if let Err(e) = value.try_reserve_exact(s.len()) {
            debug!(len = s.len(), "string copy refused, rolling back");
            release(heap, value_addr);
            return Err(QueueError::alloc(BlockKind::String, e));
        }
        value.push_str(s);

        let addr = match heap.allocate(sizeof_block(BlockKind::Node, 0), BlockKind::Node) {
            Ok(addr) => addr,
            Err(e) => {
                debug!("node allocation refused, releasing string copy");
                release(heap, value_addr);
                return Err(QueueError::alloc(BlockKind::Node, e));
            }
        };

        if let Err(e) = self.nodes.reserve() {
            debug!("node slot refused, releasing node and string copy");
            release(heap, addr);
            release(heap, value_addr);
            return Err(QueueError::alloc(BlockKind::Node, e));
        }

        Ok(self.nodes.insert(Node {
            value,
            next,
            addr,
            value_addr,
        }))
    }

    /// Walk the chain from head to tail
    pub(crate) fn chain(&self) -> impl Iterator<Item = NodeView> + '_ {
        let mut cursor = self.head;
        std::iter::from_fn(move || {
            let id = cursor?;
            let node = &self.nodes[id];
            cursor = node.next;
            Some(NodeView {
                addr: node.addr,
                value_addr: node.value_addr,
                value: node.value.clone(),
            })
        })
    }

    /// Ledger address of the tail node, if any
    pub(crate) fn tail_address(&self) -> Option<Address> {
        self.tail.map(|id| self.nodes[id].addr)
    }

    /// Verify the size and tail invariants by walking the chain
    pub(crate) fn check_invariants(&self) -> Result<(), String> {
        let limit = self.nodes.occupied();
        let mut count = 0;
        let mut last = None;
        let mut cursor = self.head;

        while let Some(id) = cursor {
            count += 1;
            if count > limit {
                return Err("chain does not terminate".to_string());
            }
            last = Some(id);
            cursor = self.nodes[id].next;
        }

        if count != self.size {
            return Err(format!(
                "size is {} but {} nodes are reachable from head",
                self.size, count
            ));
        }
        if last != self.tail {
            return Err("tail does not reference the last node".to_string());
        }
        if count != limit {
            return Err(format!("{} nodes are stored but not linked", limit - count));
        }
        Ok(())
    }
}

/// Copy up to `buf.len() - 1` bytes of `value`, terminate, and zero the rest
fn copy_out(value: &str, buf: &mut [u8]) -> Removed {
    let bytes = value.as_bytes();
    let Some(limit) = buf.len().checked_sub(1) else {
        return Removed {
            copied: 0,
            truncated: !bytes.is_empty(),
        };
    };

    let copied = bytes.len().min(limit);
    buf[..copied].copy_from_slice(&bytes[..copied]);
    buf[copied..].fill(0);

    Removed {
        copied,
        truncated: bytes.len() > limit,
    }
}

/// Return a block to the ledger; failures are consistency errors, not results
fn release(heap: &mut Heap, addr: Address) {
    if let Err(e) = heap.free(addr) {
        error!(address = addr, "ledger rejected release: {}", e);
    }
}

/// Queue operations on a slot that may hold no queue
///
/// `None` is the absent queue: insertions fail with
/// [`QueueError::InvalidArgument`], removal reports nothing removed, `size` is
/// zero, and `reverse`, `sort` and `free` do nothing.
pub trait QueueSlot {
    fn insert_head(&mut self, heap: &mut Heap, s: &str) -> Result<(), QueueError>;
    fn insert_tail(&mut self, heap: &mut Heap, s: &str) -> Result<(), QueueError>;
    fn remove_head(&mut self, heap: &mut Heap, out: Option<&mut [u8]>) -> Option<Removed>;
    fn size(&self) -> usize;
    fn reverse(&mut self);
    fn sort(&mut self);
    /// Tear down the queue, leaving the slot empty
    fn free(&mut self, heap: &mut Heap);
}

impl QueueSlot for Option<Queue> {
    fn insert_head(&mut self, heap: &mut Heap, s: &str) -> Result<(), QueueError> {
        self.as_mut()
            .ok_or_else(QueueError::absent_queue)?
            .insert_head(heap, s)
    }

    fn insert_tail(&mut self, heap: &mut Heap, s: &str) -> Result<(), QueueError> {
        self.as_mut()
            .ok_or_else(QueueError::absent_queue)?
            .insert_tail(heap, s)
    }

    fn remove_head(&mut self, heap: &mut Heap, out: Option<&mut [u8]>) -> Option<Removed> {
        self.as_mut()?.remove_head(heap, out)
    }

    fn size(&self) -> usize {
        self.as_ref().map_or(0, Queue::size)
    }

    fn reverse(&mut self) {
        if let Some(q) = self {
            q.reverse();
        }
    }

    fn sort(&mut self) {
        if let Some(q) = self {
            q.sort();
        }
    }

    fn free(&mut self, heap: &mut Heap) {
        if let Some(q) = self.take() {
            q.free(heap);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::heap::HeapError;

    fn values(q: &Queue) -> Vec<String> {
        q.chain().map(|n| n.value).collect()
    }

    #[test]
    fn test_new_queue_is_empty() {
        let mut heap = Heap::default();
        let q = Queue::new(&mut heap).unwrap();

        assert_eq!(q.size(), 0);
        assert!(q.is_empty());
        assert!(q.head.is_none());
        assert!(q.tail.is_none());
        assert_eq!(heap.live_blocks(), 1);
        assert_eq!(heap.block(q.address()).map(|b| b.kind), Some(BlockKind::Queue));

        q.free(&mut heap);
        assert_eq!(heap.live_blocks(), 0);
    }

    #[test]
    fn test_insert_head_sets_tail_once() {
        let mut heap = Heap::default();
        let mut q = Queue::new(&mut heap).unwrap();

        q.insert_head(&mut heap, "a").unwrap();
        let first = q.tail;
        q.insert_head(&mut heap, "b").unwrap();

        assert_eq!(q.tail, first);
        assert_eq!(values(&q), ["b", "a"]);
        assert!(q.check_invariants().is_ok());
        q.free(&mut heap);
    }

    #[test]
    fn test_insert_tail_appends() {
        let mut heap = Heap::default();
        let mut q = Queue::new(&mut heap).unwrap();

        q.insert_tail(&mut heap, "a").unwrap();
        q.insert_tail(&mut heap, "b").unwrap();
        q.insert_head(&mut heap, "z").unwrap();

        assert_eq!(values(&q), ["z", "a", "b"]);
        assert_eq!(q.tail_address(), q.chain().last().map(|n| n.addr));
        assert!(q.check_invariants().is_ok());
        q.free(&mut heap);
    }

    #[test]
    fn test_each_insert_allocates_node_and_string() {
        let mut heap = Heap::default();
        let mut q = Queue::new(&mut heap).unwrap();
        q.insert_tail(&mut heap, "hello").unwrap();

        let node = q.chain().next().unwrap();
        let node_block = heap.block(node.addr).unwrap();
        let str_block = heap.block(node.value_addr).unwrap();
        assert_eq!(node_block.kind, BlockKind::Node);
        assert_eq!(node_block.size, 16);
        assert_eq!(str_block.kind, BlockKind::String);
        assert_eq!(str_block.size, 6);
        assert_eq!(heap.live_blocks(), 3);
        q.free(&mut heap);
    }

    #[test]
    fn test_remove_last_clears_tail() {
        let mut heap = Heap::default();
        let mut q = Queue::new(&mut heap).unwrap();
        q.insert_tail(&mut heap, "only").unwrap();

        let mut buf = [0xffu8; 8];
        let removed = q.remove_head(&mut heap, Some(&mut buf)).unwrap();

        assert_eq!(removed, Removed { copied: 4, truncated: false });
        assert_eq!(&buf, b"only\0\0\0\0");
        assert!(q.head.is_none());
        assert!(q.tail.is_none());
        assert_eq!(heap.live_blocks(), 1);
        assert!(q.remove_head(&mut heap, None).is_none());
        q.free(&mut heap);
    }

    #[test]
    fn test_copy_out_truncates() {
        let mut buf = [0xffu8; 4];
        let removed = copy_out("abcdef", &mut buf);
        assert_eq!(removed, Removed { copied: 3, truncated: true });
        assert_eq!(&buf, b"abc\0");

        let mut one = [0xffu8; 1];
        assert_eq!(copy_out("abc", &mut one).copied, 0);
        assert_eq!(one, [0]);

        let mut empty: [u8; 0] = [];
        assert_eq!(
            copy_out("abc", &mut empty),
            Removed { copied: 0, truncated: true }
        );
    }

    #[test]
    fn test_failed_string_allocation_leaves_queue_untouched() {
        let mut heap = Heap::default();
        let mut q = Queue::new(&mut heap).unwrap();
        q.insert_tail(&mut heap, "keep").unwrap();

        heap.fail_after(0);
        let err = q.insert_tail(&mut heap, "lost").unwrap_err();

        assert!(matches!(
            err,
            QueueError::AllocationFailure {
                kind: BlockKind::String,
                ..
            }
        ));
        assert_eq!(values(&q), ["keep"]);
        assert_eq!(heap.live_blocks(), 3);
        assert!(q.check_invariants().is_ok());
        q.free(&mut heap);
    }

    #[test]
    fn test_failed_node_allocation_releases_string() {
        let mut heap = Heap::default();
        let mut q = Queue::new(&mut heap).unwrap();

        heap.fail_after(1);
        let err = q.insert_head(&mut heap, "lost").unwrap_err();

        assert!(matches!(
            err,
            QueueError::AllocationFailure {
                kind: BlockKind::Node,
                cause: AllocCause::Heap(HeapError::InjectedFailure)
            }
        ));
        assert_eq!(q.size(), 0);
        assert!(q.tail.is_none());
        assert_eq!(heap.live_blocks(), 1);
        assert_eq!(heap.total_frees(), 1);
        q.free(&mut heap);
        assert_eq!(heap.live_blocks(), 0);
    }

    #[test]
    fn test_interior_nul_rejected() {
        let mut heap = Heap::default();
        let mut q = Queue::new(&mut heap).unwrap();

        let err = q.insert_head(&mut heap, "a\0b").unwrap_err();
        assert!(matches!(err, QueueError::InvalidArgument { .. }));
        assert_eq!(heap.total_allocations(), 1);
        q.free(&mut heap);
    }

    #[test]
    fn test_free_releases_every_block() {
        let mut heap = Heap::default();
        let mut q = Queue::new(&mut heap).unwrap();
        q.insert_tail(&mut heap, "a").unwrap();
        q.insert_tail(&mut heap, "b").unwrap();
        let size_before = q.size();

        q.free(&mut heap);
        assert_eq!(size_before, 2);
        assert_eq!(heap.live_blocks(), 0);
        assert_eq!(heap.total_frees(), 5);
    }

    #[test]
    fn test_slot_absent_queue() {
        let mut heap = Heap::default();
        let mut slot: Option<Queue> = None;

        assert_eq!(slot.size(), 0);
        assert_eq!(
            slot.insert_head(&mut heap, "x"),
            Err(QueueError::absent_queue())
        );
        assert_eq!(
            slot.insert_tail(&mut heap, "x"),
            Err(QueueError::absent_queue())
        );
        assert!(slot.remove_head(&mut heap, None).is_none());
        slot.reverse();
        slot.sort();
        slot.free(&mut heap);
        assert_eq!(heap.total_allocations(), 0);
    }

    #[test]
    fn test_slot_free_empties_slot() {
        let mut heap = Heap::default();
        let mut slot = Some(Queue::new(&mut heap).unwrap());
        slot.insert_tail(&mut heap, "x").unwrap();

        slot.free(&mut heap);
        assert!(slot.is_none());
        assert_eq!(heap.live_blocks(), 0);
    }

    #[test]
    fn test_new_fails_when_heap_is_exhausted() {
        let mut heap = Heap::new(8);
        let err = Queue::new(&mut heap).unwrap_err();
        assert!(err.is_allocation_failure());
        assert_eq!(heap.live_blocks(), 0);
    }
}
