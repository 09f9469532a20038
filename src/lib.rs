//! Append-only storage core for numeric gauge time series.
//!
//! Samples enter through the [`Writer`] as `(namespace, key, value)` triples
//! and collect in a per-key pending [`Array`]. [`Writer::flush_arrays`]
//! promotes each pending array into that key's [`Map`] — a packed word
//! buffer of `(position, samples)` entries that concatenates cheaply across
//! time windows and answers the usual gauge aggregates (sum, min, max, mean,
//! stddev, percentile) in a single pass.
//!
//! The crate has no persistence or network tier: embedders read a map's
//! buffer out with [`Map::to_bytes`], store it wherever they like, and
//! rebuild it later with [`Map::from_bytes`].

pub mod array;
pub mod map;
pub mod sort;
pub mod writer;
pub mod xxhash;

/// Growable float32 sample vector.
pub use array::Array;
/// Packed `(position, samples)` container.
pub use map::{Map, MapEntry};
/// Ingestion front-end.
pub use writer::{EmitError, Writer};
/// Query limits applied by [`Writer::parse_query`].
pub use writer::{MAX_QUERY_LEN, MAX_QUERY_PAIRS};
