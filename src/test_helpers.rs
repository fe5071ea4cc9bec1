//! Shared test utilities — store fixtures, chunk builder, scripted embedder.
//!
//! Available only under `#[cfg(test)]`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::{params, Connection};

use crate::config::ProbeConfig;
use crate::constants::ENV_OPENAI_KEY;
use crate::processing::embedding_client::Embedder;
use crate::processing::embeddings::{encode_f32_blob, StoredEmbedding};
use crate::storage::chunks::ChunkStore;

pub const TEST_SCOPE: &str = "memory/customers/test-customer";
pub const TEST_MODEL: &str = "text-embedding-3-small";

/// Same shape as the indexer's tables (only the columns the probe reads).
const STORE_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS files (
    path TEXT PRIMARY KEY,
    hash TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS chunks (
    id TEXT PRIMARY KEY,
    path TEXT NOT NULL,
    start_line INTEGER NOT NULL,
    end_line INTEGER NOT NULL,
    model TEXT NOT NULL,
    text TEXT NOT NULL,
    embedding BLOB
);

CREATE VIRTUAL TABLE IF NOT EXISTS chunks_fts USING fts5(
    text,
    id UNINDEXED,
    path UNINDEXED,
    model UNINDEXED,
    start_line UNINDEXED,
    end_line UNINDEXED
);
";

// ============================================================================
// ChunkBuilder
// ============================================================================

pub struct ChunkBuilder {
    id: String,
    text: String,
    path: String,
    start_line: i64,
    end_line: i64,
    model: String,
    embedding: Option<StoredEmbedding>,
}

impl ChunkBuilder {
    pub fn new() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            text: "Test chunk content".to_string(),
            path: format!("{}/training.md", TEST_SCOPE),
            start_line: 1,
            end_line: 1,
            model: TEST_MODEL.to_string(),
            embedding: Some(StoredEmbedding::Binary(encode_f32_blob(&[0.0, 0.0, 1.0]))),
        }
    }

    pub fn id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }

    pub fn text(mut self, t: &str) -> Self {
        self.text = t.to_string();
        self
    }

    pub fn path(mut self, p: &str) -> Self {
        self.path = p.to_string();
        self
    }

    pub fn lines(mut self, start: i64, end: i64) -> Self {
        self.start_line = start;
        self.end_line = end;
        self
    }

    pub fn model(mut self, m: &str) -> Self {
        self.model = m.to_string();
        self
    }

    /// Packed little-endian blob.
    pub fn embedding(mut self, v: &[f32]) -> Self {
        self.embedding = Some(StoredEmbedding::Binary(encode_f32_blob(v)));
        self
    }

    /// Arbitrary bytes in the embedding column.
    pub fn raw_embedding(mut self, bytes: &[u8]) -> Self {
        self.embedding = Some(StoredEmbedding::Binary(bytes.to_vec()));
        self
    }

    /// JSON text column.
    pub fn json_embedding(mut self, json: &str) -> Self {
        self.embedding = Some(StoredEmbedding::JsonArray(json.to_string()));
        self
    }

    pub fn no_embedding(mut self) -> Self {
        self.embedding = None;
        self
    }

    /// Insert into chunks, files and chunks_fts.
    pub fn insert(self, conn: &Connection) {
        let embedding: rusqlite::types::Value = match self.embedding {
            Some(StoredEmbedding::Binary(b)) => b.into(),
            Some(StoredEmbedding::JsonArray(s)) => s.into(),
            None => rusqlite::types::Value::Null,
        };
        conn.execute(
            "INSERT INTO chunks (id, path, start_line, end_line, model, text, embedding)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![self.id, self.path, self.start_line, self.end_line, self.model, self.text, embedding],
        )
        .unwrap();
        conn.execute(
            "INSERT OR IGNORE INTO files (path) VALUES (?1)",
            params![self.path],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO chunks_fts (text, id, path, model, start_line, end_line)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![self.text, self.id, self.path, self.model, self.start_line, self.end_line],
        )
        .unwrap();
    }
}

// ============================================================================
// Store setup helpers
// ============================================================================

/// In-memory store with the indexer schema.
pub fn setup_chunk_store_conn() -> Connection {
    let conn = Connection::open(":memory:").unwrap();
    conn.execute_batch(STORE_SCHEMA).unwrap();
    conn
}

pub fn setup_chunk_store() -> ChunkStore {
    ChunkStore::from_connection(setup_chunk_store_conn())
}

/// On-disk store at `{dir}/main.sqlite`, populated by `fill`.
pub fn write_store_file(dir: &Path, fill: impl FnOnce(&Connection)) -> PathBuf {
    let path = dir.join("main.sqlite");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(STORE_SCHEMA).unwrap();
    fill(&conn);
    conn.close().unwrap();
    path
}

/// Config pointing at the test scope, with no inter-query pause.
pub fn test_config(min_score: f64) -> ProbeConfig {
    let mut config = ProbeConfig::from_lookup(min_score, |k| {
        (k == ENV_OPENAI_KEY).then(|| "sk-test".to_string())
    })
    .unwrap();
    config.scope = TEST_SCOPE.to_string();
    config.model = TEST_MODEL.to_string();
    config.query_delay = Duration::ZERO;
    config
}

// ============================================================================
// ScriptedEmbedder
// ============================================================================

/// Returns a fixed vector per query; unknown queries fail (empty vector).
pub struct ScriptedEmbedder {
    vectors: HashMap<String, Vec<f32>>,
    pub calls: RefCell<Vec<String>>,
}

impl ScriptedEmbedder {
    pub fn new() -> Self {
        Self { vectors: HashMap::new(), calls: RefCell::new(Vec::new()) }
    }

    pub fn with(mut self, query: &str, vector: &[f32]) -> Self {
        self.vectors.insert(query.to_string(), vector.to_vec());
        self
    }
}

impl Embedder for ScriptedEmbedder {
    fn embed(&self, text: &str) -> Vec<f32> {
        self.calls.borrow_mut().push(text.to_string());
        self.vectors.get(text).cloned().unwrap_or_default()
    }
}
