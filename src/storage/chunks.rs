//! Scoped reads over the indexer's chunk store.
//!
//! Tables consumed (never written):
//!   chunks(id, text, path, start_line, end_line, embedding, model)
//!   chunks_fts  — FTS5 over `text`, with path/start_line/end_line columns
//!   files(path)
//!
//! Every query is restricted to `path LIKE '{scope}/%'`, with wildcard
//! characters in the scope matched literally.

use std::path::Path;

use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, Row};

use crate::config::scope_pattern;
use crate::processing::embeddings::StoredEmbedding;
use crate::storage::database;
use crate::ProbeResult;

/// A chunk row as needed by the vector path.
#[derive(Debug, Clone)]
pub struct ChunkRow {
    pub id: String,
    pub text: String,
    pub path: String,
    pub start_line: i64,
    pub end_line: i64,
    /// `None` when the indexer has not embedded this chunk yet.
    pub embedding: Option<StoredEmbedding>,
}

/// A full-text match, ordered by FTS5 `rank` (lower is stronger).
#[derive(Debug, Clone, PartialEq)]
pub struct FullTextRow {
    pub text: String,
    pub path: String,
    pub start_line: i64,
    pub end_line: i64,
    pub rank: f64,
}

pub struct ChunkStore {
    conn: Connection,
}

// ── Row mapping ──

/// Ids and line numbers are loosely typed in the store; accept any scalar.
fn value_to_string(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) | ValueRef::Blob(t) => String::from_utf8_lossy(t).into_owned(),
    }
}

fn value_to_line(value: ValueRef<'_>) -> i64 {
    match value {
        ValueRef::Integer(i) => i,
        ValueRef::Real(f) => f as i64,
        ValueRef::Text(t) => std::str::from_utf8(t)
            .ok()
            .and_then(|s| s.trim().parse::<f64>().ok())
            .map(|f| f as i64)
            .unwrap_or(0),
        ValueRef::Null | ValueRef::Blob(_) => 0,
    }
}

fn chunk_from_row(row: &Row) -> rusqlite::Result<ChunkRow> {
    Ok(ChunkRow {
        id: value_to_string(row.get_ref("id")?),
        text: row.get::<_, Option<String>>("text")?.unwrap_or_default(),
        path: row.get("path")?,
        start_line: value_to_line(row.get_ref("start_line")?),
        end_line: value_to_line(row.get_ref("end_line")?),
        embedding: StoredEmbedding::from_value_ref(row.get_ref("embedding")?),
    })
}

fn full_text_from_row(row: &Row) -> rusqlite::Result<FullTextRow> {
    Ok(FullTextRow {
        text: row.get::<_, Option<String>>("text")?.unwrap_or_default(),
        path: row.get("path")?,
        start_line: value_to_line(row.get_ref("start_line")?),
        end_line: value_to_line(row.get_ref("end_line")?),
        rank: row.get("rank")?,
    })
}

impl ChunkStore {
    /// Open the store at `path` read-only. Fails with `StoreNotFound` if absent.
    pub fn open(path: &Path) -> ProbeResult<Self> {
        Ok(Self { conn: database::open_read_only(path)? })
    }

    /// Wrap an already-open connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn count_chunks(&self, scope: &str) -> ProbeResult<i64> {
        let n = self.conn.query_row(
            "SELECT COUNT(*) FROM chunks WHERE path LIKE ?1 ESCAPE '\\'",
            params![scope_pattern(scope)],
            |r| r.get(0),
        )?;
        Ok(n)
    }

    pub fn count_files(&self, scope: &str) -> ProbeResult<i64> {
        let n = self.conn.query_row(
            "SELECT COUNT(*) FROM files WHERE path LIKE ?1 ESCAPE '\\'",
            params![scope_pattern(scope)],
            |r| r.get(0),
        )?;
        Ok(n)
    }

    /// Every chunk in scope produced by `model`, in store order.
    pub fn scoped_chunks(&self, scope: &str, model: &str) -> ProbeResult<Vec<ChunkRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, text, path, start_line, end_line, embedding \
             FROM chunks \
             WHERE model = ?1 AND path LIKE ?2 ESCAPE '\\'",
        )?;
        let rows = stmt
            .query_map(params![model, scope_pattern(scope)], chunk_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(scope = scope, model = model, rows = rows.len(), "Scoped chunks loaded");
        Ok(rows)
    }

    /// Run a raw FTS5 match expression against the scoped index.
    ///
    /// The expression is passed through untouched, so syntax errors and a
    /// missing `chunks_fts` table come back as `Err`.
    pub fn full_text_search(
        &self,
        match_expr: &str,
        scope: &str,
        limit: usize,
    ) -> ProbeResult<Vec<FullTextRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT text, path, start_line, end_line, rank \
             FROM chunks_fts \
             WHERE chunks_fts MATCH ?1 AND path LIKE ?2 ESCAPE '\\' \
             ORDER BY rank \
             LIMIT ?3",
        )?;
        let rows = stmt
            .query_map(
                params![match_expr, scope_pattern(scope), limit as i64],
                full_text_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Close the connection, surfacing any error SQLite reports on close.
    pub fn close(self) -> ProbeResult<()> {
        self.conn.close().map_err(|(_, e)| e.into())
    }
}
