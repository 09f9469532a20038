//! Ingestion front-end.
//!
//! A [`Writer`] owns every gauge it has seen: per key a pending [`Array`] of
//! samples since the last flush and an accumulated history [`Map`]. Samples
//! arrive one at a time through [`Writer::emit`] or in bulk through
//! [`Writer::emit_pairs`]; [`Writer::flush_arrays`] promotes each pending
//! array into its key's map under the caller's position.
//!
//! The writer is a single-owner structure: no internal locking, no sharing.

mod query;
mod table;

pub use query::{MAX_QUERY_LEN, MAX_QUERY_PAIRS};

use core::fmt;

use crate::array::Array;
use crate::map::Map;
use crate::xxhash::gauge_fingerprint;

use query::PairSpan;
use table::{Node, NodeTable};

/// Error returned by [`Writer::emit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitError {
    /// The key exceeds the writer's `max_key` budget; the sample was
    /// dropped and the writer is unchanged. Callers may carry on.
    KeyOverflow,
}

impl fmt::Display for EmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmitError::KeyOverflow => write!(f, "gauge key exceeds the configured maximum length"),
        }
    }
}

impl std::error::Error for EmitError {}

/// Buffers `(namespace, key, value)` samples and accumulates flushed
/// history per key.
#[derive(Debug)]
pub struct Writer {
    table: NodeTable,
    max_key: usize,
    /// Decoded query bytes, reused across parses.
    scratch: Vec<u8>,
    /// Key/value spans into `scratch` from the most recent parse.
    pairs: Vec<PairSpan>,
    /// Arena indices of nodes with unflushed samples, in first-sample order.
    dirty: Vec<u32>,
}

impl Writer {
    /// A writer that rejects keys whose stored size would exceed `max_key`
    /// bytes (one byte is reserved for a terminator by the storage tier);
    /// `max_key == 0` disables the check.
    pub fn new(max_key: usize) -> Self {
        Writer {
            table: NodeTable::new(),
            max_key,
            scratch: Vec::new(),
            pairs: Vec::new(),
            dirty: Vec::new(),
        }
    }

    /// Distinct `(namespace, key)` gauges held.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.len() == 0
    }

    /// Buffer one sample for `(namespace, key)`.
    pub fn emit(&mut self, namespace: u32, key: &str, value: f32) -> Result<(), EmitError> {
        Self::emit_routed(
            &mut self.table,
            &mut self.dirty,
            self.max_key,
            namespace,
            key,
            value,
        )
    }

    /// Parse an urlencoded query and emit every pair whose value has a
    /// numeric prefix. Returns the number of samples recorded; oversized
    /// keys, undecodable values, and non-UTF-8 keys are skipped.
    pub fn emit_pairs(&mut self, namespace: u32, pairs: &str) -> u32 {
        self.parse_query(pairs);
        let mut recorded = 0;
        for i in 0..self.pairs.len() {
            let (key_span, value_span) = self.pairs[i].clone();
            let value = match query::parse_float_prefix(&self.scratch[value_span]) {
                Some(value) => value,
                None => continue,
            };
            let key = match core::str::from_utf8(&self.scratch[key_span]) {
                Ok(key) => key,
                Err(_) => continue,
            };
            match Self::emit_routed(
                &mut self.table,
                &mut self.dirty,
                self.max_key,
                namespace,
                key,
                value,
            ) {
                Ok(()) => recorded += 1,
                Err(EmitError::KeyOverflow) => {}
            }
        }
        recorded
    }

    /// Parse an urlencoded query into the writer's pair buffer without
    /// emitting anything; inspect the result with [`Writer::pairs`].
    pub fn parse_query(&mut self, query: &str) {
        query::parse_query(query, &mut self.scratch, &mut self.pairs);
    }

    /// Decoded `(key, value)` pairs from the most recent parse.
    pub fn pairs(&self) -> impl Iterator<Item = (&[u8], &[u8])> + '_ {
        self.pairs
            .iter()
            .map(|(k, v)| (&self.scratch[k.clone()], &self.scratch[v.clone()]))
    }

    /// Promote every pending array into its key's history map at
    /// `position`, clearing the pending arrays.
    pub fn flush_arrays(&mut self, position: u32) {
        for &idx in &self.dirty {
            let node = self.table.get_mut(idx as usize);
            node.history.append(position, &node.pending);
            node.pending.clear();
        }
        self.dirty.clear();
    }

    /// Clear accumulated history. Soft keeps every node with an empty map;
    /// hard drops all nodes.
    pub fn flush_maps(&mut self, soft: bool) {
        if soft {
            for node in self.table.nodes_mut() {
                node.history.clear();
            }
        } else {
            self.table.clear();
            self.dirty.clear();
        }
    }

    /// Gauges in insertion order: `(namespace, key, history)`.
    pub fn nodes(&self) -> impl Iterator<Item = (u32, &str, &Map)> + '_ {
        self.table
            .nodes()
            .iter()
            .map(|n| (n.namespace, &*n.key, &n.history))
    }

    fn emit_routed(
        table: &mut NodeTable,
        dirty: &mut Vec<u32>,
        max_key: usize,
        namespace: u32,
        key: &str,
        value: f32,
    ) -> Result<(), EmitError> {
        if max_key != 0 && key.len() + 1 > max_key {
            return Err(EmitError::KeyOverflow);
        }
        let seed = gauge_fingerprint(namespace, key);
        match table.find(namespace, key, seed) {
            Some(idx) => {
                let node = table.get_mut(idx);
                if node.pending.is_empty() {
                    dirty.push(idx as u32);
                }
                node.pending.push(value);
            }
            None => {
                let mut pending = Array::new();
                pending.push(value);
                let idx = table.insert(Node {
                    key: key.into(),
                    namespace,
                    seed,
                    pending,
                    history: Map::new(),
                });
                dirty.push(idx as u32);
            }
        }
        Ok(())
    }
}
