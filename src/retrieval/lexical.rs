//! Lexical path — FTS5 keyword match over the scoped index.
//!
//! Query errors (bad match syntax, missing `chunks_fts`) never escape: they
//! come back as one `LexicalRow::Error` so the case can still be scored on
//! the vector path.

use crate::constants::{truncate_safe, MIN_KEYWORD_CHARS, PREVIEW_CHARS};
use crate::storage::chunks::ChunkStore;

#[derive(Debug, Clone, PartialEq)]
pub struct LexicalHit {
    /// First 200 characters of the chunk text.
    pub text: String,
    pub path: String,
    pub start_line: i64,
    pub end_line: i64,
    /// FTS5 rank; lower is a stronger match.
    pub rank: f64,
}

impl LexicalHit {
    pub fn lines(&self) -> String {
        format!("{}-{}", self.start_line, self.end_line)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LexicalRow {
    Hit(LexicalHit),
    /// The query failed; carries the store's error message.
    Error(String),
}

impl LexicalRow {
    /// Text to match against. Error rows have none.
    pub fn text(&self) -> &str {
        match self {
            Self::Hit(hit) => &hit.text,
            Self::Error(_) => "",
        }
    }
}

/// `a OR b OR c` over whitespace-separated words of 3+ characters.
/// Falls back to the raw query when no word qualifies.
pub fn build_match_query(query: &str) -> String {
    let words: Vec<&str> = query
        .split_whitespace()
        .filter(|w| w.chars().count() >= MIN_KEYWORD_CHARS)
        .collect();
    if words.is_empty() {
        query.to_string()
    } else {
        words.join(" OR ")
    }
}

/// Up to `limit` scoped matches ordered by rank ascending.
pub fn search_lexical(store: &ChunkStore, query: &str, scope: &str, limit: usize) -> Vec<LexicalRow> {
    let match_query = build_match_query(query);

    match store.full_text_search(&match_query, scope, limit) {
        Ok(rows) => {
            tracing::debug!(match_query = %match_query, hits = rows.len(), "Full-text search complete");
            rows.into_iter()
                .map(|r| {
                    LexicalRow::Hit(LexicalHit {
                        text: truncate_safe(&r.text, PREVIEW_CHARS).to_string(),
                        path: r.path,
                        start_line: r.start_line,
                        end_line: r.end_line,
                        rank: r.rank,
                    })
                })
                .collect()
        }
        Err(e) => {
            tracing::debug!(match_query = %match_query, error = %e, "Full-text search failed");
            vec![LexicalRow::Error(e.to_string())]
        }
    }
}
