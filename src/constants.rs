// Constants for the queue and its allocation ledger

/// Starting address for heap allocations
/// Heap addresses start at 0x10000000 so they read like real pointers in the UI
pub const HEAP_ADDRESS_START: u64 = 0x1000_0000;

/// Size of the queue header: head pointer, tail pointer, int size (padded)
pub const QUEUE_HEADER_SIZE: usize = 24;

/// Size of a list node: value pointer plus next pointer
pub const NODE_SIZE: usize = 16;

/// Default ledger limit (256 MB), enough for a few million short strings
pub const DEFAULT_HEAP_LIMIT: usize = 256 * 1024 * 1024;

/// Buffer size the shell hands to `remove_head`
pub const MAX_STRING: usize = 1024;

/// Default memory limit for the snapshot history (256 MB)
pub const DEFAULT_SNAPSHOT_LIMIT: usize = 256 * 1024 * 1024;

/// Most recent ledger blocks (live or freed) kept in each snapshot
pub const SNAPSHOT_BLOCK_WINDOW: usize = 256;

/// Leading queue nodes kept in each snapshot
pub const SNAPSHOT_NODE_WINDOW: usize = 256;
