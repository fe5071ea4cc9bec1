//! Recall Probe — retrieval-quality harness for scoped memory search.
//!
//! Replays a suite of user-phrased queries against an indexer's SQLite chunk
//! store, ranks chunks by cosine similarity and by FTS5 match, and checks
//! that an expected answer shows up above a similarity threshold.

// Foundation
pub mod config;
pub mod constants;
pub mod error;
pub mod tracing_init;

// Sub-systems
pub mod storage;
pub mod processing;
pub mod retrieval;
pub mod evaluation;
pub mod report;
pub mod harness;

#[cfg(test)]
pub mod test_helpers;

// Re-exports for convenience
pub use error::{ProbeError, ProbeResult};
