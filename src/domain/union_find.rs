//! Keyed disjoint sets over typed graph nodes
//!
//! Keys are interned into a dense arena of slots; the sets themselves are a
//! `petgraph` union-find (union by rank, path compression) over those slots.

use std::collections::HashMap;
use std::hash::Hash;

use petgraph::unionfind::UnionFind;

/// Node in the work-stream graph
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeId {
    Issue(u64),
    File(String),
}

/// Disjoint sets over a fixed universe of keys
#[derive(Debug, Clone)]
pub struct KeyedUnionFind<K> {
    index: HashMap<K, usize>,
    sets: UnionFind<usize>,
}

impl<K: Hash + Eq> KeyedUnionFind<K> {
    /// One singleton set per distinct key
    pub fn from_keys(keys: impl IntoIterator<Item = K>) -> Self {
        let mut index = HashMap::new();
        for key in keys {
            let slot = index.len();
            index.entry(key).or_insert(slot);
        }
        let sets = UnionFind::new(index.len());
        KeyedUnionFind { index, sets }
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Representative slot of the key's set, or None for a key outside the universe
    pub fn find(&mut self, key: &K) -> Option<usize> {
        let slot = *self.index.get(key)?;
        Some(self.sets.find_mut(slot))
    }

    /// Merge the sets of `a` and `b`. Returns true if two distinct sets were
    /// merged; unknown keys are ignored.
    pub fn union(&mut self, a: &K, b: &K) -> bool {
        match (self.index.get(a), self.index.get(b)) {
            (Some(&x), Some(&y)) => self.sets.union(x, y),
            _ => false,
        }
    }

    pub fn connected(&mut self, a: &K, b: &K) -> bool {
        match (self.find(a), self.find(b)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(path: &str) -> NodeId {
        NodeId::File(path.to_string())
    }

    #[test]
    fn test_singletons() {
        let mut uf = KeyedUnionFind::from_keys([NodeId::Issue(1), NodeId::Issue(2)]);
        assert_eq!(uf.len(), 2);
        assert!(!uf.connected(&NodeId::Issue(1), &NodeId::Issue(2)));
        assert!(uf.connected(&NodeId::Issue(1), &NodeId::Issue(1)));
    }

    #[test]
    fn test_duplicate_keys_share_a_slot() {
        let uf = KeyedUnionFind::from_keys([file("a.rs"), file("a.rs"), NodeId::Issue(1)]);
        assert_eq!(uf.len(), 2);
    }

    #[test]
    fn test_union_is_transitive() {
        let keys = [NodeId::Issue(1), NodeId::Issue(2), NodeId::Issue(3), file("a.rs")];
        let mut uf = KeyedUnionFind::from_keys(keys);
        assert!(uf.union(&NodeId::Issue(1), &file("a.rs")));
        assert!(uf.union(&NodeId::Issue(2), &file("a.rs")));
        assert!(uf.union(&NodeId::Issue(3), &NodeId::Issue(2)));
        assert!(!uf.union(&NodeId::Issue(1), &NodeId::Issue(3)));
        assert!(uf.connected(&NodeId::Issue(1), &NodeId::Issue(3)));
    }

    #[test]
    fn test_issue_and_file_keys_do_not_collide() {
        let mut uf = KeyedUnionFind::from_keys([NodeId::Issue(7), file("7")]);
        assert_eq!(uf.len(), 2);
        assert!(!uf.connected(&NodeId::Issue(7), &file("7")));
    }

    #[test]
    fn test_unknown_keys() {
        let mut uf = KeyedUnionFind::from_keys([NodeId::Issue(1)]);
        assert_eq!(uf.find(&NodeId::Issue(2)), None);
        assert!(!uf.union(&NodeId::Issue(1), &NodeId::Issue(2)));
        assert!(KeyedUnionFind::<NodeId>::from_keys([]).is_empty());
    }

    #[test]
    fn test_long_chain_stays_connected() {
        let mut uf = KeyedUnionFind::from_keys((0..=100u64).map(NodeId::Issue));
        for i in 0..100u64 {
            uf.union(&NodeId::Issue(i), &NodeId::Issue(i + 1));
        }
        assert!(uf.connected(&NodeId::Issue(0), &NodeId::Issue(100)));
    }
}
