//! Error types for queue operations
//!
//! Only two kinds of failure reach the caller: an invalid argument (absent
//! queue, unrepresentable string) and an allocation failure. Both are returned,
//! never panicked, and a failed operation leaves the queue as it was.

use crate::memory::heap::HeapError;
use crate::memory::BlockKind;
use std::collections::TryReserveError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    /// The operation needs a queue and got none, or the input cannot be stored
    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: &'static str },

    /// Storage for the queue header, a node, or a string copy was refused
    #[error("could not allocate {kind} storage: {cause}")]
    AllocationFailure { kind: BlockKind, cause: AllocCause },
}

/// Which allocator refused the request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocCause {
    #[error(transparent)]
    Heap(#[from] HeapError),

    #[error(transparent)]
    System(#[from] TryReserveError),
}

impl QueueError {
    pub(crate) fn absent_queue() -> Self {
        QueueError::InvalidArgument {
            reason: "queue is absent",
        }
    }

    pub(crate) fn alloc(kind: BlockKind, cause: impl Into<AllocCause>) -> Self {
        QueueError::AllocationFailure {
            kind,
            cause: cause.into(),
        }
    }

    pub fn is_allocation_failure(&self) -> bool {
        matches!(self, QueueError::AllocationFailure { .. })
    }
}
