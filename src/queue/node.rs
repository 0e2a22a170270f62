//! Node storage for the queue chain
//!
//! Nodes live in a slot arena and link to each other by slot index. The arena
//! is storage only: ownership of the chain flows from the queue's head index
//! through each node's `next` link. Vacant slots form an intrusive free list,
//! so releasing a node never allocates.

use crate::memory::Address;
use std::collections::TryReserveError;
use std::ops::{Index, IndexMut};

/// Index of a node slot
pub(crate) type NodeId = usize;

/// A single queue element
#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub value: String,
    pub next: Option<NodeId>,
    /// Ledger address of the node block
    pub addr: Address,
    /// Ledger address of the string block
    pub value_addr: Address,
}

#[derive(Debug, Clone)]
enum Slot {
    Occupied(Node),
    Vacant { next_free: Option<NodeId> },
}

#[derive(Debug, Clone, Default)]
pub(crate) struct NodeArena {
    slots: Vec<Slot>,
    free_head: Option<NodeId>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure the next `insert` will not need to grow the slot vector
    pub fn reserve(&mut self) -> Result<(), TryReserveError> {
        if self.free_head.is_some() {
            return Ok(());
        }
        self.slots.try_reserve(1)
    }

    /// Store a node, reusing a vacant slot when one exists
    pub fn insert(&mut self, node: Node) -> NodeId {
        match self.free_head {
            Some(id) => {
                if let Slot::Vacant { next_free } = self.slots[id] {
                    self.free_head = next_free;
                }
                self.slots[id] = Slot::Occupied(node);
                id
            }
            None => {
                self.slots.push(Slot::Occupied(node));
                self.slots.len() - 1
            }
        }
    }

    /// Take a node out of its slot and put the slot on the free list
    pub fn remove(&mut self, id: NodeId) -> Option<Node> {
        let slot = self.slots.get_mut(id)?;
        if matches!(slot, Slot::Vacant { .. }) {
            return None;
        }
        let old = std::mem::replace(
            slot,
            Slot::Vacant {
                next_free: self.free_head,
            },
        );
        self.free_head = Some(id);
        match old {
            Slot::Occupied(node) => Some(node),
            Slot::Vacant { .. } => None,
        }
    }

    /// Number of occupied slots
    pub fn occupied(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| matches!(s, Slot::Occupied(_)))
            .count()
    }
}

impl Index<NodeId> for NodeArena {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        match &self.slots[id] {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => unreachable!("vacant slot {} linked into the chain", id),
        }
    }
}

impl IndexMut<NodeId> for NodeArena {
    fn index_mut(&mut self, id: NodeId) -> &mut Node {
        match &mut self.slots[id] {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => unreachable!("vacant slot {} linked into the chain", id),
        }
    }
}
