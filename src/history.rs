//! Recency history of retrieved entities.
//!
//! A doubly-linked sequence of ids plus an id-to-node map, giving O(1)
//! record and forget and O(n) snapshot. Each id appears at most once:
//! re-recording an id unlinks its old entry before appending a fresh one at
//! the most-recent end. The list is unbounded; the store calls
//! [`History::forget`] whenever an entity is deleted, so the history never
//! references a dead id.

use std::collections::HashMap;

/// Links of one history entry. Nodes are keyed by entity id in the map, so
/// the links store neighbor ids rather than pointers.
#[derive(Debug, Clone, Copy)]
struct Node {
    prev: Option<u32>,
    next: Option<u32>,
}

#[derive(Debug, Clone, Default)]
pub struct History {
    nodes: HashMap<u32, Node>,
    head: Option<u32>,
    tail: Option<u32>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `id` as just accessed, moving it to the most-recent position.
    pub fn record(&mut self, id: u32) {
        self.forget(id);
        self.link_last(id);
    }

    /// Drop the entry for `id` if present; no-op otherwise.
    pub fn forget(&mut self, id: u32) {
        let Some(node) = self.nodes.remove(&id) else {
            return;
        };

        match node.prev {
            Some(prev) => {
                if let Some(prev_node) = self.nodes.get_mut(&prev) {
                    prev_node.next = node.next;
                }
            }
            None => self.head = node.next,
        }

        match node.next {
            Some(next) => {
                if let Some(next_node) = self.nodes.get_mut(&next) {
                    next_node.prev = node.prev;
                }
            }
            None => self.tail = node.prev,
        }
    }

    /// Ids ordered most-recent first.
    pub fn snapshot(&self) -> Vec<u32> {
        let mut ids = Vec::with_capacity(self.nodes.len());
        let mut cursor = self.tail;
        while let Some(id) = cursor {
            ids.push(id);
            cursor = self.nodes.get(&id).and_then(|node| node.prev);
        }
        ids
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: u32) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.head = None;
        self.tail = None;
    }

    fn link_last(&mut self, id: u32) {
        let node = Node {
            prev: self.tail,
            next: None,
        };
        if let Some(old_tail) = self.tail {
            if let Some(tail_node) = self.nodes.get_mut(&old_tail) {
                tail_node.next = Some(id);
            }
        } else {
            self.head = Some(id);
        }
        self.tail = Some(id);
        self.nodes.insert(id, node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_in_recency_order() {
        let mut history = History::new();
        history.record(1);
        history.record(2);
        history.record(3);
        assert_eq!(history.snapshot(), vec![3, 2, 1]);
    }

    #[test]
    fn re_recording_moves_instead_of_duplicating() {
        let mut history = History::new();
        history.record(1);
        history.record(2);
        history.record(3);
        history.record(1);

        assert_eq!(history.snapshot(), vec![1, 3, 2]);
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn forget_unlinks_head_middle_and_tail() {
        let mut history = History::new();
        for id in 1..=4 {
            history.record(id);
        }

        history.forget(2);
        assert_eq!(history.snapshot(), vec![4, 3, 1]);

        history.forget(1); // current head
        assert_eq!(history.snapshot(), vec![4, 3]);

        history.forget(4); // current tail
        assert_eq!(history.snapshot(), vec![3]);

        history.forget(3);
        assert!(history.is_empty());
        assert_eq!(history.snapshot(), Vec::<u32>::new());
    }

    #[test]
    fn forget_unknown_id_is_noop() {
        let mut history = History::new();
        history.record(1);
        history.forget(99);
        assert_eq!(history.snapshot(), vec![1]);
    }

    #[test]
    fn single_entry_can_be_re_recorded() {
        let mut history = History::new();
        history.record(5);
        history.record(5);
        assert_eq!(history.snapshot(), vec![5]);
        assert_eq!(history.len(), 1);
    }
}
