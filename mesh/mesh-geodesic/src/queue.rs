//! Priority queue of propagation events.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::arena::WindowId;

/// Work item for the propagation loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Propagate a window into the face across its edge.
    Window(WindowId),
    /// Emit windows from a saddle or boundary vertex.
    Vertex(usize),
}

/// State for the priority queue.
#[derive(Debug, Clone, Copy)]
struct Entry {
    /// Lower bound on any distance this event can produce.
    key: f64,
    /// Insertion order, breaks ties deterministically.
    seq: u64,
    event: Event,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap (BinaryHeap is max-heap by default)
        other
            .key
            .total_cmp(&self.key)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Min-queue of events keyed by distance lower bound.
#[derive(Debug, Default)]
pub struct EventQueue {
    heap: BinaryHeap<Entry>,
    next_seq: u64,
    peak_len: usize,
}

impl EventQueue {
    /// Empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule an event.
    pub fn push(&mut self, key: f64, event: Event) {
        self.heap.push(Entry {
            key,
            seq: self.next_seq,
            event,
        });
        self.next_seq += 1;
        self.peak_len = self.peak_len.max(self.heap.len());
    }

    /// Take the event with the smallest key.
    pub fn pop(&mut self) -> Option<(f64, Event)> {
        self.heap.pop().map(|e| (e.key, e.event))
    }

    /// Largest queue length seen.
    #[must_use]
    pub fn peak_len(&self) -> usize {
        self.peak_len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_smallest_key_first() {
        let mut queue = EventQueue::new();
        queue.push(3.0, Event::Vertex(3));
        queue.push(1.0, Event::Vertex(1));
        queue.push(2.0, Event::Vertex(2));

        assert_eq!(queue.pop(), Some((1.0, Event::Vertex(1))));
        assert_eq!(queue.pop(), Some((2.0, Event::Vertex(2))));
        assert_eq!(queue.pop(), Some((3.0, Event::Vertex(3))));
        assert!(queue.pop().is_none());
        assert_eq!(queue.peak_len(), 3);
    }

    #[test]
    fn equal_keys_pop_in_insertion_order() {
        let mut queue = EventQueue::new();
        for v in 0..5 {
            queue.push(1.0, Event::Vertex(v));
        }
        let order: Vec<Event> = std::iter::from_fn(|| queue.pop().map(|(_, e)| e)).collect();
        assert_eq!(order, (0..5).map(Event::Vertex).collect::<Vec<_>>());
        assert!(queue.pop().is_none());
    }
}
