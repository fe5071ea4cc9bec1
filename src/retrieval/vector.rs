//! Vector path — brute-force cosine ranking over every scoped chunk.

use crate::constants::{round_score, truncate_safe, PREVIEW_CHARS};
use crate::processing::embeddings::cosine_similarity;
use crate::storage::chunks::ChunkStore;
use crate::ProbeResult;

#[derive(Debug, Clone, PartialEq)]
pub struct VectorHit {
    /// Cosine similarity, rounded to 4 decimals.
    pub score: f64,
    pub path: String,
    pub start_line: i64,
    pub end_line: i64,
    /// First 200 characters of the chunk text.
    pub text: String,
}

impl VectorHit {
    pub fn lines(&self) -> String {
        format!("{}-{}", self.start_line, self.end_line)
    }
}

/// Top-`limit` chunks for `model` under `scope`, by descending similarity.
///
/// Chunks without an embedding are skipped; so are embeddings that fail to
/// decode (logged). Ties keep store order.
pub fn search_vector(
    store: &ChunkStore,
    query_vec: &[f32],
    scope: &str,
    model: &str,
    limit: usize,
) -> ProbeResult<Vec<VectorHit>> {
    let rows = store.scoped_chunks(scope, model)?;

    let mut scored: Vec<VectorHit> = Vec::with_capacity(rows.len());
    for row in rows {
        let Some(stored) = row.embedding else {
            continue;
        };
        let chunk_vec = match stored.decode() {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(chunk_id = %row.id, error = %e, "Undecodable embedding, skipping chunk");
                continue;
            }
        };
        let score = round_score(cosine_similarity(query_vec, &chunk_vec));
        scored.push(VectorHit {
            score,
            path: row.path,
            start_line: row.start_line,
            end_line: row.end_line,
            text: truncate_safe(&row.text, PREVIEW_CHARS).to_string(),
        });
    }

    // Stable sort: equal scores stay in store order
    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(limit);

    tracing::debug!(
        hits = scored.len(),
        top = scored.first().map(|h| h.score),
        "Vector search complete"
    );

    Ok(scored)
}
