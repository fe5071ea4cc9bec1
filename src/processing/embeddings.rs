//! Stored embedding codec + cosine similarity.
//!
//! The indexer has written embeddings two ways over its lifetime: packed
//! little-endian f32 blobs and JSON arrays in a TEXT column. Both are read as
//! a `StoredEmbedding` and normalized to `Vec<f32>` right after the row is
//! read, so scoring only ever sees one representation.

use rusqlite::types::ValueRef;

use crate::{ProbeError, ProbeResult};

/// Raw embedding column as found in the store.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredEmbedding {
    /// Float32Array buffer, little-endian.
    Binary(Vec<u8>),
    /// `[0.1, -0.2, ...]`
    JsonArray(String),
}

impl StoredEmbedding {
    /// Classify a column value. NULL, empty and numeric values yield `None`.
    pub fn from_value_ref(value: ValueRef<'_>) -> Option<Self> {
        match value {
            ValueRef::Blob(b) if !b.is_empty() => Some(Self::Binary(b.to_vec())),
            ValueRef::Text(t) if !t.is_empty() => {
                Some(Self::JsonArray(String::from_utf8_lossy(t).into_owned()))
            }
            _ => None,
        }
    }

    /// Normalize to a float vector. A blob that is not a whole number of
    /// f32s is an error, like malformed JSON.
    pub fn decode(&self) -> ProbeResult<Vec<f32>> {
        match self {
            Self::Binary(blob) if blob.len() % 4 != 0 => Err(ProbeError::Storage(format!(
                "Embedding blob of {} bytes is not a whole number of f32 values",
                blob.len()
            ))),
            Self::Binary(blob) => Ok(decode_f32_blob(blob)),
            Self::JsonArray(text) => Ok(serde_json::from_str::<Vec<f32>>(text)?),
        }
    }
}

/// Serialize an f32 slice to a compact little-endian byte blob.
pub fn encode_f32_blob(vec: &[f32]) -> Vec<u8> {
    vec.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Deserialize a little-endian blob. Trailing bytes short of a full f32 are ignored.
pub fn decode_f32_blob(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

/// Cosine similarity between two vectors.
///
/// Zero when either norm is zero or the vectors are empty. Vectors of different
/// dimensions also score zero rather than being compared over the shorter
/// prefix: they come from different models and are not comparable.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| *x as f64 * *y as f64).sum();
    let norm_a: f64 = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
