// Snapshot management for replaying a shell session

use crate::memory::heap::{Heap, HeapBlock};
use crate::memory::Address;
use crate::queue::{NodeView, Queue};
use std::collections::VecDeque;

/// Mock terminal for capturing shell output
#[derive(Debug, Clone)]
pub struct MockTerminal {
    pub lines: Vec<TerminalLine>,
}

impl MockTerminal {
    pub fn new() -> Self {
        MockTerminal { lines: Vec::new() }
    }

    /// Append one line of output produced by the command on `script_line`
    pub fn println(&mut self, text: impl Into<String>, script_line: usize) {
        self.lines.push(TerminalLine {
            text: text.into(),
            script_line,
        });
    }

    /// Get all lines as a vector of strings
    pub fn get_output(&self) -> Vec<String> {
        self.lines.iter().map(|tl| tl.text.clone()).collect()
    }
}

impl Default for MockTerminal {
    fn default() -> Self {
        Self::new()
    }
}

/// A line of terminal output with script line tracking
#[derive(Debug, Clone)]
pub struct TerminalLine {
    pub text: String,
    pub script_line: usize,
}

/// Frozen picture of a queue's chain
///
/// `nodes` may hold only the leading part of the chain; `size` is always the
/// full element count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueView {
    pub addr: Address,
    pub size: usize,
    pub tail: Option<Address>,
    pub nodes: Vec<NodeView>,
}

impl QueueView {
    /// Capture the whole chain
    pub fn capture(queue: &Queue) -> Self {
        Self::capture_window(queue, usize::MAX)
    }

    /// Capture the first `limit` nodes of the chain
    pub fn capture_window(queue: &Queue, limit: usize) -> Self {
        QueueView {
            addr: queue.address(),
            size: queue.size(),
            tail: queue.tail_address(),
            nodes: queue.chain().take(limit).collect(),
        }
    }

    /// Whether every node of the chain is present
    pub fn is_complete(&self) -> bool {
        self.nodes.len() == self.size
    }
}

/// Frozen picture of the ledger: counters plus the most recent blocks
#[derive(Debug, Clone)]
pub struct HeapView {
    /// Newest blocks, live or freed, sorted by address
    pub blocks: Vec<(Address, HeapBlock)>,
    /// Older blocks left out of `blocks`
    pub omitted: usize,
    pub live_blocks: usize,
    pub live_bytes: usize,
    pub total_allocations: usize,
    pub total_frees: usize,
    pub fault_armed: bool,
}

impl HeapView {
    /// Capture the counters and the `window` highest-addressed blocks
    pub fn capture(heap: &Heap, window: usize) -> Self {
        let mut entries: Vec<(Address, &HeapBlock)> =
            heap.allocations().iter().map(|(a, b)| (*a, b)).collect();

        // Addresses grow monotonically, so the highest are the newest
        let omitted = entries.len().saturating_sub(window);
        if omitted == entries.len() {
            entries.clear();
        } else if omitted > 0 {
            entries.select_nth_unstable_by_key(omitted, |(addr, _)| *addr);
            entries.drain(..omitted);
        }
        entries.sort_unstable_by_key(|(addr, _)| *addr);

        HeapView {
            blocks: entries
                .into_iter()
                .map(|(addr, block)| (addr, block.clone()))
                .collect(),
            omitted,
            live_blocks: heap.live_blocks(),
            live_bytes: heap.live_bytes(),
            total_allocations: heap.total_allocations(),
            total_frees: heap.total_frees(),
            fault_armed: heap.fault_armed(),
        }
    }
}

/// Snapshot of session state after one command
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub queue: Option<QueueView>,
    pub heap: HeapView,
    /// Terminal lines printed so far; the terminal itself only grows
    pub output_lines: usize,
    pub script_line: usize, // 1-based, 0 before the first command
    pub error_count: usize,
}

impl Snapshot {
    /// Estimate the memory usage of this snapshot in bytes
    pub fn estimated_size(&self) -> usize {
        let heap_size = self.heap.blocks.len() * std::mem::size_of::<(Address, HeapBlock)>();

        // Queue: node view plus the string itself
        let queue_size = self.queue.as_ref().map_or(0, |q| {
            q.nodes
                .iter()
                .map(|n| std::mem::size_of::<NodeView>() + n.value.len())
                .sum()
        });

        std::mem::size_of::<Snapshot>() + heap_size + queue_size
    }
}

/// Manages session history for replay
///
/// When the memory limit is reached the oldest snapshots are dropped to make
/// room; only a snapshot larger than the whole limit is refused.
#[derive(Debug)]
pub struct SnapshotManager {
    snapshots: VecDeque<Snapshot>,
    max_memory: usize,
    current_memory: usize,
    evicted: usize,
}

impl SnapshotManager {
    pub fn new(max_memory: usize) -> Self {
        SnapshotManager {
            snapshots: VecDeque::new(),
            max_memory,
            current_memory: 0,
            evicted: 0,
        }
    }

    /// Add a snapshot to history, dropping the oldest ones if needed
    pub fn push(&mut self, snapshot: Snapshot) -> Result<(), String> {
        let snapshot_size = snapshot.estimated_size();

        if snapshot_size > self.max_memory {
            return Err(format!(
                "snapshot of {} bytes exceeds the history limit of {} bytes",
                snapshot_size, self.max_memory
            ));
        }

        while self.current_memory + snapshot_size > self.max_memory {
            let Some(oldest) = self.snapshots.pop_front() else {
                break;
            };
            self.current_memory = self.current_memory.saturating_sub(oldest.estimated_size());
            self.evicted += 1;
        }

        self.current_memory += snapshot_size;
        self.snapshots.push_back(snapshot);
        Ok(())
    }

    /// Get a snapshot by index
    pub fn get(&self, index: usize) -> Option<&Snapshot> {
        self.snapshots.get(index)
    }

    /// Get the number of snapshots
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Get current memory usage
    pub fn memory_usage(&self) -> usize {
        self.current_memory
    }

    /// Get max memory limit
    pub fn memory_limit(&self) -> usize {
        self.max_memory
    }

    /// Number of snapshots dropped to stay under the limit
    pub fn evicted(&self) -> usize {
        self.evicted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::BlockKind;

    fn empty_snapshot(line: usize) -> Snapshot {
        Snapshot {
            queue: None,
            heap: HeapView::capture(&Heap::default(), 16),
            output_lines: 0,
            script_line: line,
            error_count: 0,
        }
    }

    #[test]
    fn test_capture_queue_view() {
        let mut heap = Heap::default();
        let mut q = Queue::new(&mut heap).unwrap();
        q.insert_tail(&mut heap, "a").unwrap();
        q.insert_tail(&mut heap, "b").unwrap();

        let view = QueueView::capture(&q);

        assert_eq!(view.size, 2);
        assert_eq!(view.nodes.len(), 2);
        assert!(view.is_complete());
        assert_eq!(view.tail, Some(view.nodes[1].addr));
        assert_eq!(view.addr, q.address());
        q.free(&mut heap);
    }

    #[test]
    fn test_queue_view_window() {
        let mut heap = Heap::default();
        let mut q = Queue::new(&mut heap).unwrap();
        for s in ["a", "b", "c", "d"] {
            q.insert_tail(&mut heap, s).unwrap();
        }

        let view = QueueView::capture_window(&q, 2);
        assert_eq!(view.size, 4);
        assert_eq!(view.nodes.len(), 2);
        assert!(!view.is_complete());
        assert_eq!(view.nodes[1].value, "b");
        q.free(&mut heap);
    }

    #[test]
    fn test_heap_view_keeps_newest_blocks() {
        let mut heap = Heap::default();
        let addrs: Vec<Address> = (0..10)
            .map(|_| heap.allocate(4, BlockKind::String).unwrap())
            .collect();
        for addr in &addrs[..6] {
            heap.free(*addr).unwrap();
        }

        let view = HeapView::capture(&heap, 3);
        let kept: Vec<Address> = view.blocks.iter().map(|(a, _)| *a).collect();
        assert_eq!(kept, &addrs[7..]);
        assert_eq!(view.omitted, 7);
        assert_eq!(view.live_blocks, 4);
        assert_eq!(view.total_frees, 6);

        let none = HeapView::capture(&heap, 0);
        assert!(none.blocks.is_empty());
        assert_eq!(none.omitted, 10);
    }

    #[test]
    fn test_manager_drops_oldest_to_fit() {
        let size = empty_snapshot(0).estimated_size();
        let mut manager = SnapshotManager::new(size * 2);

        for line in 1..=5 {
            manager.push(empty_snapshot(line)).unwrap();
        }

        assert_eq!(manager.len(), 2);
        assert_eq!(manager.evicted(), 3);
        assert_eq!(manager.get(0).map(|s| s.script_line), Some(4));
        assert_eq!(manager.memory_usage(), size * 2);
    }

    #[test]
    fn test_manager_refuses_oversized_snapshot() {
        let size = empty_snapshot(0).estimated_size();
        let mut manager = SnapshotManager::new(size - 1);

        assert!(manager.push(empty_snapshot(1)).is_err());
        assert!(manager.is_empty());
        assert_eq!(manager.evicted(), 0);
    }

    #[test]
    fn test_terminal_output() {
        let mut terminal = MockTerminal::default();
        terminal.println("q = []", 1);
        terminal.println("q = [a]", 2);

        assert_eq!(terminal.get_output(), ["q = []", "q = [a]"]);
        assert_eq!(terminal.lines[1].script_line, 2);
    }
}
