//! Node storage for the writer: an arena plus an open-addressed index.
//!
//! Nodes live in an append-only arena whose order is insertion order; the
//! bucket array stores arena indices and is probed quadratically from the
//! key fingerprint. Growing the table rebuilds only the bucket array, so
//! arena indices — and every order derived from them — stay valid.

use crate::array::Array;
use crate::map::Map;

/// Buckets allocated up front.
pub(crate) const INITIAL_BUCKETS: usize = 16;

/// Bucket sentinel: no node.
const EMPTY: u32 = u32::MAX;

/// One gauge key and everything buffered for it.
#[derive(Debug)]
pub(crate) struct Node {
    pub key: Box<str>,
    pub namespace: u32,
    /// Fingerprint of `(namespace, key)`; fixes the probe start.
    pub seed: u32,
    /// Samples received since the last array flush.
    pub pending: Array,
    /// Flushed history.
    pub history: Map,
}

/// Open-addressed table of nodes keyed by `(namespace, key)`.
#[derive(Debug)]
pub(crate) struct NodeTable {
    buckets: Vec<u32>,
    nodes: Vec<Node>,
}

impl NodeTable {
    pub fn new() -> Self {
        NodeTable {
            buckets: vec![EMPTY; INITIAL_BUCKETS],
            nodes: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    pub fn get_mut(&mut self, idx: usize) -> &mut Node {
        &mut self.nodes[idx]
    }

    /// Arena index of the node matching `(namespace, key)`, if present.
    ///
    /// The probe stops at the first empty bucket; `seed` must be the
    /// fingerprint of the pair being looked up.
    pub fn find(&self, namespace: u32, key: &str, seed: u32) -> Option<usize> {
        let mask = self.buckets.len() - 1;
        let mut slot = seed as usize & mask;
        for j in 1..=self.buckets.len() {
            match self.buckets[slot] {
                EMPTY => return None,
                idx => {
                    let node = &self.nodes[idx as usize];
                    if node.seed == seed && node.namespace == namespace && &*node.key == key {
                        return Some(idx as usize);
                    }
                }
            }
            slot = (seed as usize).wrapping_add(j * j) & mask;
        }
        None
    }

    /// Insert a node known not to be present; returns its arena index.
    pub fn insert(&mut self, node: Node) -> usize {
        if self.nodes.len() > self.buckets.len() / 2 {
            self.grow();
        }
        let seed = node.seed;
        let idx = self.nodes.len() as u32;
        self.nodes.push(node);
        if !Self::place(&mut self.buckets, seed, idx) {
            // quadratic probing found no free slot at this size
            self.grow();
        }
        idx as usize
    }

    /// Drop every node and empty the buckets.
    pub fn clear(&mut self) {
        self.nodes.clear();
        for bucket in &mut self.buckets {
            *bucket = EMPTY;
        }
    }

    fn place(buckets: &mut [u32], seed: u32, idx: u32) -> bool {
        let mask = buckets.len() - 1;
        let mut slot = seed as usize & mask;
        for j in 1..=buckets.len() {
            if buckets[slot] == EMPTY {
                buckets[slot] = idx;
                return true;
            }
            slot = (seed as usize).wrapping_add(j * j) & mask;
        }
        false
    }

    /// Double the bucket array (again, if needed) and re-probe every node in
    /// arena order. The arena itself never moves.
    fn grow(&mut self) {
        let mut capacity = self.buckets.len();
        loop {
            capacity *= 2;
            let mut buckets = vec![EMPTY; capacity];
            let replaced = self
                .nodes
                .iter()
                .enumerate()
                .all(|(idx, node)| Self::place(&mut buckets, node.seed, idx as u32));
            if replaced {
                self.buckets = buckets;
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xxhash::gauge_fingerprint;

    fn node(namespace: u32, key: &str) -> Node {
        Node {
            key: key.into(),
            namespace,
            seed: gauge_fingerprint(namespace, key),
            pending: Array::new(),
            history: Map::new(),
        }
    }

    #[test]
    fn insert_then_find() {
        let mut table = NodeTable::new();
        let idx = table.insert(node(0, "foo"));
        assert_eq!(table.find(0, "foo", gauge_fingerprint(0, "foo")), Some(idx));
        assert_eq!(table.find(0, "bar", gauge_fingerprint(0, "bar")), None);
    }

    #[test]
    fn same_key_different_namespace_are_distinct() {
        let mut table = NodeTable::new();
        let a = table.insert(node(0, "baz"));
        let b = table.insert(node(1, "baz"));
        assert_ne!(a, b);
        assert_eq!(table.find(0, "baz", gauge_fingerprint(0, "baz")), Some(a));
        assert_eq!(table.find(1, "baz", gauge_fingerprint(1, "baz")), Some(b));
    }

    #[test]
    fn collisions_on_seed_still_compare_keys() {
        let mut table = NodeTable::new();
        // same seed, different identity: the probe must fall through to the
        // namespace/key comparison
        let mut first = node(0, "a");
        let mut second = node(1, "b");
        first.seed = 12345;
        second.seed = 12345;
        let a = table.insert(first);
        let b = table.insert(second);
        assert_eq!(table.find(0, "a", 12345), Some(a));
        assert_eq!(table.find(1, "b", 12345), Some(b));
    }

    #[test]
    fn growth_keeps_every_node_reachable_in_order() {
        let mut table = NodeTable::new();
        let keys: Vec<String> = (0..100).map(|i| format!("gauge.{i}")).collect();
        for key in &keys {
            table.insert(node(7, key));
        }
        assert_eq!(table.len(), 100);
        for (i, key) in keys.iter().enumerate() {
            assert_eq!(table.find(7, key, gauge_fingerprint(7, key)), Some(i));
        }
        // arena order is insertion order
        let stored: Vec<&str> = table.nodes().iter().map(|n| &*n.key).collect();
        let expected: Vec<&str> = keys.iter().map(|k| k.as_str()).collect();
        assert_eq!(stored, expected);
    }

    #[test]
    fn clear_empties_the_table() {
        let mut table = NodeTable::new();
        table.insert(node(0, "foo"));
        table.clear();
        assert_eq!(table.len(), 0);
        assert_eq!(table.find(0, "foo", gauge_fingerprint(0, "foo")), None);
    }
}
