use super::Queue;

impl Queue {
    /// Reverse the chain in place
    ///
    /// One pass, constant extra space; only `next` links change. The old head
    /// becomes the tail.
    pub fn reverse(&mut self) {
        let Some(old_head) = self.head else {
            return;
        };

        let mut prev = None;
        let mut cursor = self.head;
        while let Some(id) = cursor {
            cursor = std::mem::replace(&mut self.nodes[id].next, prev);
            prev = Some(id);
        }

        self.head = prev;
        self.tail = Some(old_head);
    }
}

#[cfg(test)]
mod tests {
    use crate::memory::heap::Heap;
    use crate::queue::Queue;

    fn build(heap: &mut Heap, items: &[&str]) -> Queue {
        let mut q = Queue::new(heap).unwrap();
        for item in items {
            q.insert_tail(heap, item).unwrap();
        }
        q
    }

    fn values(q: &Queue) -> Vec<String> {
        q.chain().map(|n| n.value).collect()
    }

    #[test]
    fn test_reverse_swaps_head_and_tail() {
        let mut heap = Heap::default();
        let mut q = build(&mut heap, &["a", "b", "c", "d"]);
        let old_head = q.chain().next().map(|n| n.addr);

        q.reverse();

        assert_eq!(values(&q), ["d", "c", "b", "a"]);
        assert_eq!(q.tail_address(), old_head);
        assert_eq!(q.size(), 4);
        assert!(q.check_invariants().is_ok());
        q.free(&mut heap);
    }

    #[test]
    fn test_reverse_empty_and_single() {
        let mut heap = Heap::default();
        let mut empty = Queue::new(&mut heap).unwrap();
        empty.reverse();
        assert!(empty.check_invariants().is_ok());
        empty.free(&mut heap);

        let mut single = build(&mut heap, &["x"]);
        single.reverse();
        assert_eq!(values(&single), ["x"]);
        assert!(single.check_invariants().is_ok());
        single.free(&mut heap);
    }

    #[test]
    fn test_reverse_does_not_allocate() {
        let mut heap = Heap::default();
        let mut q = build(&mut heap, &["a", "b", "c"]);
        let allocations = heap.total_allocations();
        let frees = heap.total_frees();

        q.reverse();

        assert_eq!(heap.total_allocations(), allocations);
        assert_eq!(heap.total_frees(), frees);
        q.free(&mut heap);
    }

    #[test]
    fn test_insert_tail_after_reverse() {
        let mut heap = Heap::default();
        let mut q = build(&mut heap, &["a", "b"]);
        q.reverse();
        q.insert_tail(&mut heap, "z").unwrap();

        assert_eq!(values(&q), ["b", "a", "z"]);
        assert!(q.check_invariants().is_ok());
        q.free(&mut heap);
    }
}
