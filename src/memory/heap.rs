//! Allocation ledger for queue storage
//!
//! Every block the queue obtains (its header, each node, each string copy) is
//! registered here, and every release goes back through [`Heap::free`]. The
//! ledger provides:
//! - Explicit allocation/deallocation with virtual addresses
//! - Tombstone tracking for freed blocks (double-free detection, UI history)
//! - A byte limit that turns into `OutOfMemory` failures
//! - One-shot fault injection for exercising allocation-failure paths
//!
//! The ledger does not own the bytes themselves; the queue keeps the actual
//! `String` values and uses the addresses only for bookkeeping.

use super::{Address, BlockKind};
use crate::constants::{DEFAULT_HEAP_LIMIT, HEAP_ADDRESS_START};
use rustc_hash::FxHashMap;
use thiserror::Error;

/// Errors reported by the ledger
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeapError {
    #[error("out of memory: requested {requested} bytes, {in_use} in use, limit is {limit}")]
    OutOfMemory {
        requested: usize,
        in_use: usize,
        limit: usize,
    },

    #[error("injected allocation failure")]
    InjectedFailure,

    #[error("double free detected at address 0x{address:x}")]
    DoubleFree { address: Address },

    #[error("invalid free: address 0x{address:x} was never allocated")]
    InvalidFree { address: Address },
}

/// State of a heap block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockState {
    Allocated,
    Tombstone, // Freed but kept for double-free detection and display
}

/// A ledger entry
#[derive(Debug, Clone)]
pub struct HeapBlock {
    pub size: usize,
    pub kind: BlockKind,
    pub state: BlockState,
}

/// The ledger
#[derive(Debug, Clone)]
pub struct Heap {
    allocations: FxHashMap<Address, HeapBlock>,
    next_address: Address,
    live_bytes: usize,
    max_heap_size: usize,
    total_allocations: usize,
    total_frees: usize,
    /// Number of allocations still allowed before the injected failure
    fault_countdown: Option<usize>,
}

impl Heap {
    /// Create a new ledger with a maximum live-byte limit
    pub fn new(max_heap_size: usize) -> Self {
        Heap {
            allocations: FxHashMap::default(),
            next_address: HEAP_ADDRESS_START,
            live_bytes: 0,
            max_heap_size,
            total_allocations: 0,
            total_frees: 0,
            fault_countdown: None,
        }
    }

    /// Allocate a block
    pub fn allocate(&mut self, size: usize, kind: BlockKind) -> Result<Address, HeapError> {
        if self.live_bytes + size > self.max_heap_size {
            return Err(HeapError::OutOfMemory {
                requested: size,
                in_use: self.live_bytes,
                limit: self.max_heap_size,
            });
        }

        // Only requests that would otherwise succeed count toward the fault
        if let Some(remaining) = self.fault_countdown {
            if remaining == 0 {
                self.fault_countdown = None;
                return Err(HeapError::InjectedFailure);
            }
            self.fault_countdown = Some(remaining - 1);
        }

        let addr = self.next_address;
        // Zero-sized requests still get a distinct address
        self.next_address += size.max(1) as u64;
        self.allocations.insert(
            addr,
            HeapBlock {
                size,
                kind,
                state: BlockState::Allocated,
            },
        );
        self.live_bytes += size;
        self.total_allocations += 1;

        Ok(addr)
    }

    /// Free a block (mark as tombstone)
    pub fn free(&mut self, addr: Address) -> Result<(), HeapError> {
        match self.allocations.get_mut(&addr) {
            Some(block) if block.state == BlockState::Allocated => {
                block.state = BlockState::Tombstone;
                self.live_bytes -= block.size;
                self.total_frees += 1;
                Ok(())
            }
            Some(_) => Err(HeapError::DoubleFree { address: addr }),
            None => Err(HeapError::InvalidFree { address: addr }),
        }
    }

    /// Let the next `n` allocations succeed, then fail exactly one
    pub fn fail_after(&mut self, n: usize) {
        self.fault_countdown = Some(n);
    }

    /// Disarm fault injection
    pub fn clear_fault(&mut self) {
        self.fault_countdown = None;
    }

    /// Whether a fault is still pending
    pub fn fault_armed(&self) -> bool {
        self.fault_countdown.is_some()
    }

    /// Look up a block, tombstones included
    pub fn block(&self, addr: Address) -> Option<&HeapBlock> {
        self.allocations.get(&addr)
    }

    /// All entries (for UI display, includes tombstones)
    pub fn allocations(&self) -> &FxHashMap<Address, HeapBlock> {
        &self.allocations
    }

    /// Number of blocks not yet freed
    pub fn live_blocks(&self) -> usize {
        self.allocations
            .values()
            .filter(|b| b.state == BlockState::Allocated)
            .count()
    }

    /// Bytes held by blocks not yet freed
    pub fn live_bytes(&self) -> usize {
        self.live_bytes
    }

    pub fn total_allocations(&self) -> usize {
        self.total_allocations
    }

    pub fn total_frees(&self) -> usize {
        self.total_frees
    }

    /// Get max heap size
    pub fn max_size(&self) -> usize {
        self.max_heap_size
    }
}

impl Default for Heap {
    fn default() -> Self {
        Self::new(DEFAULT_HEAP_LIMIT)
    }
}
