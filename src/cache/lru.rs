//! Recency Index Module
//!
//! Orders entries from least to most recently used with O(1) lookup,
//! move-to-back, removal and front eviction.
//!
//! The list is threaded through an arena: `links[i]` holds the neighbours of
//! slot `i` and `slots[i]` holds its entry. Freed slots are recycled through
//! a free list.

use std::collections::HashMap;

use crate::cache::entry::Entry;

/// Null link sentinel.
const NIL: usize = usize::MAX;

#[derive(Debug, Clone, Copy)]
struct Link {
    prev: usize,
    next: usize,
}

// == Recency Index ==
/// Entries ordered by access time.
///
/// - Front = least recently used
/// - Back = most recently used
#[derive(Debug)]
pub struct RecencyIndex<V> {
    slots: Vec<Option<Entry<V>>>,
    links: Vec<Link>,
    free: Vec<usize>,
    positions: HashMap<String, usize>,
    head: usize,
    tail: usize,
}

impl<V> Default for RecencyIndex<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> RecencyIndex<V> {
    // == Constructor ==
    /// Creates an empty index.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            links: Vec::new(),
            free: Vec::new(),
            positions: HashMap::new(),
            head: NIL,
            tail: NIL,
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.positions.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Entry<V>> {
        let idx = *self.positions.get(key)?;
        self.slots[idx].as_ref()
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Entry<V>> {
        let idx = *self.positions.get(key)?;
        self.slots[idx].as_mut()
    }

    // == Push Back ==
    /// Inserts an entry at the most recently used end.
    ///
    /// An existing entry under the same key is replaced and returned.
    pub fn push_back(&mut self, entry: Entry<V>) -> Option<Entry<V>> {
        let old = self.remove(&entry.key);
        let key = entry.key.clone();

        let idx = match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(entry);
                idx
            }
            None => {
                self.slots.push(Some(entry));
                self.links.push(Link { prev: NIL, next: NIL });
                self.slots.len() - 1
            }
        };

        self.positions.insert(key, idx);
        self.link_back(idx);
        old
    }

    // == Move To Back ==
    /// Marks a key as most recently used.
    ///
    /// Returns false if the key is absent.
    pub fn move_to_back(&mut self, key: &str) -> bool {
        let Some(&idx) = self.positions.get(key) else {
            return false;
        };
        if idx != self.tail {
            self.unlink(idx);
            self.link_back(idx);
        }
        true
    }

    // == Remove ==
    /// Removes and returns the entry for `key`.
    pub fn remove(&mut self, key: &str) -> Option<Entry<V>> {
        let idx = self.positions.remove(key)?;
        self.release(idx)
    }

    // == Pop Front ==
    /// Removes and returns the least recently used entry.
    pub fn pop_front(&mut self) -> Option<Entry<V>> {
        if self.head == NIL {
            return None;
        }
        let idx = self.head;
        let entry = self.release(idx)?;
        self.positions.remove(&entry.key);
        Some(entry)
    }

    /// Returns the least recently used entry without removing it.
    pub fn front(&self) -> Option<&Entry<V>> {
        self.slot(self.head)
    }

    /// Returns the most recently used entry.
    pub fn back(&self) -> Option<&Entry<V>> {
        self.slot(self.tail)
    }

    // == Keys ==
    /// Snapshot of all keys, in no particular order.
    pub fn keys(&self) -> Vec<String> {
        self.positions.keys().cloned().collect()
    }

    /// Iterates entries from least to most recently used.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            index: self,
            cursor: self.head,
        }
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.links.clear();
        self.free.clear();
        self.positions.clear();
        self.head = NIL;
        self.tail = NIL;
    }

    // == Internal Linking ==
    fn slot(&self, idx: usize) -> Option<&Entry<V>> {
        if idx == NIL {
            return None;
        }
        self.slots[idx].as_ref()
    }

    /// Unlinks a slot, frees it and returns its entry.
    fn release(&mut self, idx: usize) -> Option<Entry<V>> {
        self.unlink(idx);
        self.free.push(idx);
        self.slots[idx].take()
    }

    fn unlink(&mut self, idx: usize) {
        let Link { prev, next } = self.links[idx];

        if prev == NIL {
            self.head = next;
        } else {
            self.links[prev].next = next;
        }

        if next == NIL {
            self.tail = prev;
        } else {
            self.links[next].prev = prev;
        }

        self.links[idx] = Link { prev: NIL, next: NIL };
    }

    fn link_back(&mut self, idx: usize) {
        self.links[idx] = Link {
            prev: self.tail,
            next: NIL,
        };

        if self.tail == NIL {
            self.head = idx;
        } else {
            self.links[self.tail].next = idx;
        }
        self.tail = idx;
    }
}

/// Iterator over entries from least to most recently used.
pub struct Iter<'a, V> {
    index: &'a RecencyIndex<V>,
    cursor: usize,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a Entry<V>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.index.slot(self.cursor)?;
        self.cursor = self.index.links[self.cursor].next;
        Some(entry)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::time::Duration;

    fn entry(key: &str) -> Entry<String> {
        Entry::new(key.to_string(), format!("value_{key}"), Duration::from_secs(60), 0)
    }

    fn order(index: &RecencyIndex<String>) -> Vec<String> {
        index.iter().map(|e| e.key.clone()).collect()
    }

    /// Walks the list both ways and checks it agrees with the key map.
    fn assert_consistent(index: &RecencyIndex<String>) {
        let forward = order(index);
        let unique: HashSet<_> = forward.iter().cloned().collect();
        assert_eq!(unique.len(), forward.len(), "duplicate keys in list");
        assert_eq!(forward.len(), index.len());
        for key in &forward {
            assert!(index.contains(key));
        }

        let mut backward = Vec::new();
        let mut cursor = index.tail;
        while cursor != NIL {
            backward.push(index.slots[cursor].as_ref().unwrap().key.clone());
            cursor = index.links[cursor].prev;
        }
        backward.reverse();
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_index_new() {
        let index = RecencyIndex::<String>::new();
        assert!(index.is_empty());
        assert!(index.front().is_none());
        assert!(index.back().is_none());
    }

    #[test]
    fn test_push_back_orders_by_insertion() {
        let mut index = RecencyIndex::new();
        index.push_back(entry("a"));
        index.push_back(entry("b"));
        index.push_back(entry("c"));

        assert_eq!(order(&index), vec!["a", "b", "c"]);
        assert_eq!(index.front().unwrap().key, "a");
        assert_eq!(index.back().unwrap().key, "c");
        assert_consistent(&index);
    }

    #[test]
    fn test_push_back_replaces_existing_key() {
        let mut index = RecencyIndex::new();
        index.push_back(entry("a"));
        index.push_back(entry("b"));

        let old = index.push_back(entry("a"));

        assert_eq!(old.unwrap().key, "a");
        assert_eq!(index.len(), 2);
        assert_eq!(order(&index), vec!["b", "a"]);
        assert_consistent(&index);
    }

    #[test]
    fn test_move_to_back() {
        let mut index = RecencyIndex::new();
        index.push_back(entry("a"));
        index.push_back(entry("b"));
        index.push_back(entry("c"));

        assert!(index.move_to_back("a"));
        assert_eq!(order(&index), vec!["b", "c", "a"]);

        // Moving the tail is a no-op
        assert!(index.move_to_back("a"));
        assert_eq!(order(&index), vec!["b", "c", "a"]);

        assert!(!index.move_to_back("missing"));
        assert_consistent(&index);
    }

    #[test]
    fn test_remove_middle_head_tail() {
        let mut index = RecencyIndex::new();
        for key in ["a", "b", "c", "d"] {
            index.push_back(entry(key));
        }

        assert_eq!(index.remove("b").unwrap().key, "b");
        assert_eq!(order(&index), vec!["a", "c", "d"]);

        assert_eq!(index.remove("a").unwrap().key, "a");
        assert_eq!(index.remove("d").unwrap().key, "d");
        assert_eq!(order(&index), vec!["c"]);

        assert!(index.remove("a").is_none());
        assert_consistent(&index);
    }

    #[test]
    fn test_pop_front_evicts_oldest() {
        let mut index = RecencyIndex::new();
        for key in ["a", "b", "c"] {
            index.push_back(entry(key));
        }
        index.move_to_back("a");

        assert_eq!(index.pop_front().unwrap().key, "b");
        assert_eq!(index.pop_front().unwrap().key, "c");
        assert_eq!(index.pop_front().unwrap().key, "a");
        assert!(index.pop_front().is_none());
        assert!(index.is_empty());
    }

    #[test]
    fn test_slots_are_recycled() {
        let mut index = RecencyIndex::new();
        index.push_back(entry("a"));
        index.push_back(entry("b"));
        index.remove("a");
        index.push_back(entry("c"));

        assert_eq!(index.slots.len(), 2);
        assert_eq!(order(&index), vec!["b", "c"]);
        assert_consistent(&index);
    }

    #[test]
    fn test_get_mut_updates_in_place() {
        let mut index = RecencyIndex::new();
        index.push_back(entry("a"));

        index.get_mut("a").unwrap().value = "changed".to_string();
        assert_eq!(index.get("a").unwrap().value, "changed");
    }

    #[test]
    fn test_clear() {
        let mut index = RecencyIndex::new();
        index.push_back(entry("a"));
        index.push_back(entry("b"));
        index.clear();

        assert!(index.is_empty());
        assert!(index.iter().next().is_none());
        index.push_back(entry("c"));
        assert_eq!(order(&index), vec!["c"]);
    }

    #[test]
    fn test_keys_snapshot() {
        let mut index = RecencyIndex::new();
        index.push_back(entry("a"));
        index.push_back(entry("b"));

        let mut keys = index.keys();
        keys.sort();
        assert_eq!(keys, vec!["a", "b"]);
    }
}
