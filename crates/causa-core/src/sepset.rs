//! SepsetMap: unordered node pair -> separating set.
//!
//! Backed by `DashMap` so concurrent adjacency-search workers can record
//! sepsets without an external lock. Writers follow a single-writer-per-pair
//! discipline: each pair is owned by exactly one test sequence, so two threads
//! never write the same key. Reads after the search are unrestricted.

use std::collections::BTreeMap;

use dashmap::DashMap;

use crate::graph::NodeId;

/// Keys are normalized so `(a, b)` and `(b, a)` hit the same entry.
fn key(a: NodeId, b: NodeId) -> (NodeId, NodeId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// An absent entry means no independence was found; an empty set means the
/// pair was found marginally independent.
#[derive(Debug, Default, Clone)]
pub struct SepsetMap {
    sepsets: DashMap<(NodeId, NodeId), Vec<NodeId>>,
}

impl SepsetMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `z` for the pair, or delete the entry when `z` is `None`.
    pub fn set(&self, a: NodeId, b: NodeId, z: Option<Vec<NodeId>>) {
        match z {
            Some(z) => {
                self.sepsets.insert(key(a, b), z);
            }
            None => {
                self.sepsets.remove(&key(a, b));
            }
        }
    }

    pub fn get(&self, a: NodeId, b: NodeId) -> Option<Vec<NodeId>> {
        self.sepsets.get(&key(a, b)).map(|r| r.clone())
    }

    pub fn contains(&self, a: NodeId, b: NodeId) -> bool {
        self.sepsets.contains_key(&key(a, b))
    }

    /// `y` is in the recorded sepset of `(x, z)`. `None` when there is none.
    pub fn is_in_sepset(&self, y: NodeId, x: NodeId, z: NodeId) -> Option<bool> {
        self.sepsets.get(&key(x, z)).map(|s| s.contains(&y))
    }

    pub fn len(&self) -> usize {
        self.sepsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sepsets.is_empty()
    }

    /// Ordered copy of every entry, for comparison and display.
    pub fn snapshot(&self) -> BTreeMap<(NodeId, NodeId), Vec<NodeId>> {
        self.sepsets
            .iter()
            .map(|r| (*r.key(), r.value().clone()))
            .collect()
    }

    /// Pairs with a recorded sepset, ascending.
    pub fn pairs(&self) -> Vec<(NodeId, NodeId)> {
        self.snapshot().into_keys().collect()
    }
}

impl PartialEq for SepsetMap {
    fn eq(&self, other: &Self) -> bool {
        self.snapshot() == other.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_ignores_pair_order() {
        let map = SepsetMap::new();
        map.set(3, 1, Some(vec![2]));
        assert_eq!(map.get(1, 3), Some(vec![2]));
        assert_eq!(map.is_in_sepset(2, 1, 3), Some(true));
        assert_eq!(map.is_in_sepset(0, 3, 1), Some(false));
    }

    #[test]
    fn empty_sepset_differs_from_absent() {
        let map = SepsetMap::new();
        map.set(0, 1, Some(vec![]));
        assert_eq!(map.get(0, 1), Some(vec![]));
        assert_eq!(map.get(0, 2), None);
        assert_eq!(map.is_in_sepset(5, 0, 2), None);
    }

    #[test]
    fn setting_none_deletes() {
        let map = SepsetMap::new();
        map.set(0, 1, Some(vec![4]));
        map.set(1, 0, None);
        assert!(map.is_empty());
    }

    #[test]
    fn concurrent_writers_on_distinct_pairs() {
        let map = SepsetMap::new();
        std::thread::scope(|s| {
            for t in 0..4 {
                let map = &map;
                s.spawn(move || {
                    for i in 0..50 {
                        map.set(t * 100 + i, t * 100 + i + 1, Some(vec![t]));
                    }
                });
            }
        });
        assert_eq!(map.len(), 200);
        assert_eq!(map.get(301, 302), Some(vec![3]));
    }
}
