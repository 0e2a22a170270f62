//! Memory model for the queue
//!
//! This module provides the allocation bookkeeping the queue runs on:
//! - [`heap`]: allocation ledger with malloc/free, tombstones and fault injection
//!
//! # Block Sizes
//!
//! Sizes follow a 64-bit C layout so the ledger reads like a real heap:
//! - queue header: 24 bytes (two pointers and a padded `int`)
//! - node: 16 bytes (value pointer and next pointer)
//! - string: length + 1 (terminator included)

pub mod heap;

use crate::constants::{NODE_SIZE, QUEUE_HEADER_SIZE};
use std::fmt;

/// Memory address type (64-bit)
pub type Address = u64;

/// What a ledger block holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Queue,
    Node,
    String,
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockKind::Queue => write!(f, "queue"),
            BlockKind::Node => write!(f, "node"),
            BlockKind::String => write!(f, "string"),
        }
    }
}

/// Calculate the ledger size of a block
///
/// `payload_len` is only meaningful for strings and counts bytes without the
/// terminator.
pub fn sizeof_block(kind: BlockKind, payload_len: usize) -> usize {
    match kind {
        BlockKind::Queue => QUEUE_HEADER_SIZE,
        BlockKind::Node => NODE_SIZE,
        BlockKind::String => payload_len + 1,
    }
}
