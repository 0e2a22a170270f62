//! # Introduction
//!
//! strqueue is a mutable string queue built on a singly linked chain of owned
//! nodes, together with the tooling to check it: an allocation ledger that
//! every node and string copy goes through, a command shell that drives queues
//! from scripts, and a terminal UI that replays a session step by step.
//!
//! ## Pipeline
//!
//! ```text
//! Script → Shell → Queue ⇄ Heap ledger → Snapshots → TUI
//! ```
//!
//! 1. [`queue`]: the queue with head/tail insertion, head removal with a bounded
//!    copy-out, in-place reversal, stable case-insensitive merge sort.
//! 2. [`memory`]: the [`memory::heap::Heap`] ledger: addresses, tombstones,
//!    leak counts, byte limit and fault injection.
//! 3. [`shell`]: parses script commands and runs them against a
//!    [`shell::Session`], reporting mismatches and leaks.
//! 4. [`snapshot`]: snapshot history with a memory limit and a
//!    [`snapshot::MockTerminal`] that records shell output.
//! 5. [`ui`]: ratatui-based TUI; not part of the stable library API.
//!
//! ## Quick start
//!
//! ```
//! use strqueue::memory::heap::Heap;
//! use strqueue::queue::Queue;
//!
//! let mut heap = Heap::default();
//! let mut q = Queue::new(&mut heap).unwrap();
//! q.insert_tail(&mut heap, "banana").unwrap();
//! q.insert_tail(&mut heap, "Apple").unwrap();
//! q.sort();
//!
//! let mut buf = [0u8; 16];
//! q.remove_head(&mut heap, Some(&mut buf)).unwrap();
//! assert_eq!(&buf[..6], b"Apple\0");
//!
//! q.free(&mut heap);
//! assert_eq!(heap.live_blocks(), 0);
//! ```

pub mod constants;
pub mod memory;
pub mod queue;
pub mod shell;
pub mod snapshot;
pub mod ui;
