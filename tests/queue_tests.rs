// Integration tests for the string queue

use strqueue::memory::heap::{Heap, HeapError};
use strqueue::memory::BlockKind;
use strqueue::queue::{AllocCause, Queue, QueueError, QueueSlot, Removed};
use strqueue::snapshot::QueueView;

fn values(q: &Queue) -> Vec<String> {
    QueueView::capture(q)
        .nodes
        .into_iter()
        .map(|n| n.value)
        .collect()
}

fn pop(q: &mut Queue, heap: &mut Heap) -> Option<String> {
    let mut buf = [0u8; 64];
    let removed = q.remove_head(heap, Some(&mut buf))?;
    Some(String::from_utf8_lossy(&buf[..removed.copied]).into_owned())
}

#[test]
fn test_tail_insertion_is_fifo() {
    let mut heap = Heap::default();
    let mut q = Queue::new(&mut heap).expect("queue allocation failed");

    for s in ["a", "b", "c"] {
        q.insert_tail(&mut heap, s).unwrap();
    }

    assert_eq!(pop(&mut q, &mut heap).as_deref(), Some("a"));
    assert_eq!(pop(&mut q, &mut heap).as_deref(), Some("b"));
    assert_eq!(pop(&mut q, &mut heap).as_deref(), Some("c"));
    assert_eq!(pop(&mut q, &mut heap), None);

    q.free(&mut heap);
    assert_eq!(heap.live_blocks(), 0);
}

#[test]
fn test_head_insertion_is_lifo() {
    let mut heap = Heap::default();
    let mut q = Queue::new(&mut heap).unwrap();

    for s in ["a", "b", "c"] {
        q.insert_head(&mut heap, s).unwrap();
    }

    assert_eq!(values(&q), ["c", "b", "a"]);
    assert_eq!(pop(&mut q, &mut heap).as_deref(), Some("c"));
    q.free(&mut heap);
}

#[test]
fn test_size_follows_inserts_and_removes() {
    let mut heap = Heap::default();
    let mut q = Queue::new(&mut heap).unwrap();

    q.insert_head(&mut heap, "x").unwrap();
    q.insert_tail(&mut heap, "y").unwrap();
    q.insert_tail(&mut heap, "z").unwrap();
    assert_eq!(q.size(), 3);

    q.remove_head(&mut heap, None).unwrap();
    assert_eq!(q.size(), 2);
    assert_eq!(values(&q), ["y", "z"]);
    q.free(&mut heap);
}

#[test]
fn test_remove_from_empty_queue() {
    let mut heap = Heap::default();
    let mut q = Queue::new(&mut heap).unwrap();

    let mut buf = [0xaau8; 4];
    assert!(q.remove_head(&mut heap, Some(&mut buf)).is_none());
    assert_eq!(buf, [0xaa; 4]);
    q.free(&mut heap);
}

#[test]
fn test_remove_copies_bounded_value() {
    let mut heap = Heap::default();
    let mut q = Queue::new(&mut heap).unwrap();
    q.insert_tail(&mut heap, "abcdef").unwrap();
    q.insert_tail(&mut heap, "xy").unwrap();

    let mut buf = [0xffu8; 4];
    let removed = q.remove_head(&mut heap, Some(&mut buf)).unwrap();
    assert_eq!(
        removed,
        Removed {
            copied: 3,
            truncated: true
        }
    );
    assert_eq!(&buf, b"abc\0");

    let mut buf = [0xffu8; 6];
    let removed = q.remove_head(&mut heap, Some(&mut buf)).unwrap();
    assert!(!removed.truncated);
    assert_eq!(&buf, b"xy\0\0\0\0");

    q.free(&mut heap);
    assert_eq!(heap.live_blocks(), 0);
}

#[test]
fn test_stored_copy_is_independent() {
    let mut heap = Heap::default();
    let mut q = Queue::new(&mut heap).unwrap();

    let mut source = String::from("first");
    q.insert_tail(&mut heap, &source).unwrap();
    source.clear();
    source.push_str("changed");

    assert_eq!(values(&q), ["first"]);
    q.free(&mut heap);
}

#[test]
fn test_reverse_then_remove() {
    let mut heap = Heap::default();
    let mut q = Queue::new(&mut heap).unwrap();
    for s in ["a", "b", "c"] {
        q.insert_tail(&mut heap, s).unwrap();
    }

    q.reverse();
    assert_eq!(values(&q), ["c", "b", "a"]);

    // Tail insertion must land after the new tail
    q.insert_tail(&mut heap, "d").unwrap();
    assert_eq!(values(&q), ["c", "b", "a", "d"]);
    assert_eq!(pop(&mut q, &mut heap).as_deref(), Some("c"));
    q.free(&mut heap);
}

#[test]
fn test_sort_ignores_case() {
    let mut heap = Heap::default();
    let mut q = Queue::new(&mut heap).unwrap();
    for s in ["banana", "Apple", "cherry"] {
        q.insert_tail(&mut heap, s).unwrap();
    }

    q.sort();
    assert_eq!(values(&q), ["Apple", "banana", "cherry"]);

    q.insert_tail(&mut heap, "date").unwrap();
    assert_eq!(values(&q).last().map(String::as_str), Some("date"));
    q.free(&mut heap);
}

#[test]
fn test_sort_keeps_equal_keys_in_order() {
    let mut heap = Heap::default();
    let mut q = Queue::new(&mut heap).unwrap();
    for s in ["b", "A", "a", "B", "a"] {
        q.insert_tail(&mut heap, s).unwrap();
    }

    q.sort();
    assert_eq!(values(&q), ["A", "a", "a", "b", "B"]);
    q.free(&mut heap);
}

#[test]
fn test_empty_string_is_a_value() {
    let mut heap = Heap::default();
    let mut q = Queue::new(&mut heap).unwrap();
    q.insert_tail(&mut heap, "").unwrap();
    q.insert_tail(&mut heap, "a").unwrap();

    q.sort();
    assert_eq!(values(&q), ["", "a"]);

    let mut buf = [0xffu8; 3];
    let removed = q.remove_head(&mut heap, Some(&mut buf)).unwrap();
    assert_eq!(removed.copied, 0);
    assert_eq!(buf, [0, 0, 0]);
    q.free(&mut heap);
}

#[test]
fn test_failed_insert_leaves_queue_unchanged() {
    let mut heap = Heap::default();
    let mut q = Queue::new(&mut heap).unwrap();
    q.insert_tail(&mut heap, "a").unwrap();
    q.insert_tail(&mut heap, "b").unwrap();
    let live = heap.live_blocks();

    for after in 0..2 {
        heap.fail_after(after);
        let err = q.insert_head(&mut heap, "c").unwrap_err();
        assert!(matches!(
            err,
            QueueError::AllocationFailure {
                cause: AllocCause::Heap(HeapError::InjectedFailure),
                ..
            }
        ));
        assert_eq!(values(&q), ["a", "b"]);
        assert_eq!(q.size(), 2);
        assert_eq!(heap.live_blocks(), live);
    }

    q.insert_tail(&mut heap, "c").unwrap();
    assert_eq!(values(&q), ["a", "b", "c"]);
    q.free(&mut heap);
    assert_eq!(heap.live_blocks(), 0);
}

#[test]
fn test_heap_limit_refuses_insert() {
    // header (24) + node (16) + "a\0" (2) fits; a second string does not
    let mut heap = Heap::new(44);
    let mut q = Queue::new(&mut heap).unwrap();
    q.insert_tail(&mut heap, "a").unwrap();

    let err = q.insert_tail(&mut heap, "bb").unwrap_err();
    assert!(matches!(
        err,
        QueueError::AllocationFailure {
            kind: BlockKind::String,
            cause: AllocCause::Heap(HeapError::OutOfMemory { .. })
        }
    ));
    assert_eq!(values(&q), ["a"]);
    q.free(&mut heap);
}

#[test]
fn test_absent_queue_slot() {
    let mut heap = Heap::default();
    let mut slot: Option<Queue> = None;

    assert!(matches!(
        slot.insert_tail(&mut heap, "a"),
        Err(QueueError::InvalidArgument { .. })
    ));
    assert!(slot.remove_head(&mut heap, None).is_none());
    assert_eq!(slot.size(), 0);
    slot.reverse();
    slot.sort();
    slot.free(&mut heap);
    assert_eq!(heap.total_allocations(), 0);
}

#[test]
fn test_free_with_elements_leaves_no_blocks() {
    let mut heap = Heap::default();
    let mut q = Queue::new(&mut heap).unwrap();
    for i in 0..100 {
        q.insert_tail(&mut heap, &format!("item{}", i)).unwrap();
    }
    assert_eq!(heap.live_blocks(), 201);

    q.free(&mut heap);
    assert_eq!(heap.live_blocks(), 0);
    assert_eq!(heap.live_bytes(), 0);
}
