//! Per-case evaluation — embed, search both paths, classify.
//!
//! Classification is a pure function of three match signals so the rule can
//! be tested without a store or an embeddings endpoint. Skip sits outside it:
//! a case with no query vector never reaches the searches.

pub mod cases;

use std::time::Instant;

use serde::Deserialize;

use crate::config::ProbeConfig;
use crate::processing::embedding_client::Embedder;
use crate::retrieval::lexical::{search_lexical, LexicalRow};
use crate::retrieval::vector::{search_vector, VectorHit};
use crate::storage::chunks::ChunkStore;
use crate::ProbeResult;

/// One retrieval expectation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TestCase {
    /// Phrased the way a user would ask.
    pub query: String,
    /// Case-insensitive substring a relevant chunk must contain.
    pub expected: String,
    pub description: String,
}

impl TestCase {
    pub fn new(query: &str, expected: &str, description: &str) -> Self {
        Self {
            query: query.to_string(),
            expected: expected.to_string(),
            description: description.to_string(),
        }
    }

    /// Does `text` contain the expected substring (case-insensitive)?
    pub fn matches(&self, text: &str) -> bool {
        text.to_lowercase().contains(&self.expected.to_lowercase())
    }
}

/// Terminal outcome of a case. Exactly one per case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// No query embedding; nothing was searched.
    Skip,
    Pass,
    /// Found by vector search, but only below the threshold.
    BelowThreshold,
    Fail,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Skip => "skip",
            Self::Pass => "PASS",
            Self::BelowThreshold => "BELOW_THRESHOLD",
            Self::Fail => "FAIL",
        }
    }

    /// One-char marker for the score chart.
    pub fn flag(&self) -> char {
        match self {
            Self::Skip => '?',
            Self::Pass => '+',
            Self::BelowThreshold => '~',
            Self::Fail => 'X',
        }
    }
}

/// Priority: PASS > BELOW_THRESHOLD > FAIL.
///
/// A lexical match passes the case regardless of vector scores: full-text
/// hits are not subject to the similarity threshold. This makes the lexical
/// path an unconditional override of BELOW_THRESHOLD.
pub fn classify(vector_above: bool, vector_any: bool, lexical: bool) -> Status {
    if vector_above || lexical {
        Status::Pass
    } else if vector_any {
        Status::BelowThreshold
    } else {
        Status::Fail
    }
}

/// Summary record consumed by the report.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseResult {
    pub status: Status,
    pub query: String,
    /// Best vector score (0 when skipped or nothing in scope).
    pub top_score: f64,
    /// Vector hits at or above the threshold.
    pub above_threshold: usize,
    pub embed_ms: u64,
}

/// Everything the trace prints for one case.
#[derive(Debug, Clone)]
pub struct CaseReport {
    pub result: CaseResult,
    pub vector_hits: Vec<VectorHit>,
    pub lexical_rows: Vec<LexicalRow>,
}

impl CaseReport {
    /// Score of the first (highest-ranked) vector hit containing the expectation.
    pub fn first_match_score(&self, case: &TestCase) -> Option<f64> {
        self.vector_hits.iter().find(|h| case.matches(&h.text)).map(|h| h.score)
    }
}

pub struct Evaluator<'a> {
    store: &'a ChunkStore,
    embedder: &'a dyn Embedder,
    config: &'a ProbeConfig,
}

impl<'a> Evaluator<'a> {
    pub fn new(store: &'a ChunkStore, embedder: &'a dyn Embedder, config: &'a ProbeConfig) -> Self {
        Self { store, embedder, config }
    }

    /// Run one case. Only a vector-path store failure is returned as `Err`.
    pub fn evaluate(&self, case: &TestCase) -> ProbeResult<CaseReport> {
        let started = Instant::now();
        let query_vec = self.embedder.embed(&case.query);
        let embed_ms = started.elapsed().as_millis() as u64;

        if query_vec.is_empty() {
            tracing::debug!(query = %case.query, embed_ms, "No embedding, case skipped");
            return Ok(CaseReport {
                result: CaseResult {
                    status: Status::Skip,
                    query: case.query.clone(),
                    top_score: 0.0,
                    above_threshold: 0,
                    embed_ms,
                },
                vector_hits: Vec::new(),
                lexical_rows: Vec::new(),
            });
        }

        let min_score = self.config.min_score;
        let vector_hits = search_vector(
            self.store,
            &query_vec,
            &self.config.scope,
            &self.config.model,
            self.config.max_results,
        )?;
        let lexical_rows =
            search_lexical(self.store, &case.query, &self.config.scope, self.config.max_results);

        let vector_above = vector_hits
            .iter()
            .any(|h| h.score >= min_score && case.matches(&h.text));
        let vector_any = vector_hits.iter().any(|h| case.matches(&h.text));
        let lexical = lexical_rows.iter().any(|r| case.matches(r.text()));

        let status = classify(vector_above, vector_any, lexical);
        let top_score = vector_hits.first().map(|h| h.score).unwrap_or(0.0);
        let above_threshold = vector_hits.iter().filter(|h| h.score >= min_score).count();

        tracing::debug!(
            query = %case.query,
            status = status.as_str(),
            top_score,
            vector_above,
            vector_any,
            lexical,
            "Case evaluated"
        );

        Ok(CaseReport {
            result: CaseResult {
                status,
                query: case.query.clone(),
                top_score,
                above_threshold,
                embed_ms,
            },
            vector_hits,
            lexical_rows,
        })
    }
}
