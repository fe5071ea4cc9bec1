// === Embedding ===
pub const EMBEDDING_MODEL: &str = "text-embedding-3-small";
pub const OPENROUTER_EMBEDDINGS_URL: &str = "https://openrouter.ai/api/v1/embeddings";
pub const OPENAI_EMBEDDINGS_URL: &str = "https://api.openai.com/v1/embeddings";
pub const EMBEDDING_TIMEOUT_SECS: u64 = 15;

// === Environment ===
pub const ENV_STORE_PATH: &str = "MEMORY_DB";
pub const ENV_OPENROUTER_KEY: &str = "OPENROUTER_KEY";
pub const ENV_OPENAI_KEY: &str = "OPENAI_API_KEY";
pub const ENV_SCOPE: &str = "MEMORY_SCOPE";
pub const ENV_CASES_PATH: &str = "MEMORY_TEST_CASES";

// === Store ===
pub const DEFAULT_STORE_RELATIVE: &str = ".openclaw/memory/main.sqlite";
pub const DEFAULT_SCOPE: &str = "memory/customers/test-customer";
pub const SQLITE_BUSY_TIMEOUT_MS: u32 = 5_000;

// === Retrieval ===
pub const MIN_SCORE_DEFAULT: f64 = 0.35;
pub const MAX_RESULTS: usize = 5;
pub const LEXICAL_DISPLAY: usize = 3;
pub const MIN_KEYWORD_CHARS: usize = 3;
pub const SCORE_DECIMALS: i32 = 4;

// === Pacing ===
pub const QUERY_DELAY_MS: u64 = 200; // embedding API rate limit

// === Report ===
pub const PREVIEW_CHARS: usize = 200;
pub const TRACE_PREVIEW_CHARS: usize = 120;
pub const CHART_QUERY_CHARS: usize = 50;
pub const BAR_WIDTH: f64 = 40.0; // chars for a score of 1.0
pub const SUGGESTED_THRESHOLD_FLOOR: f64 = 0.15;
pub const SUGGESTED_THRESHOLD_MARGIN: f64 = 0.05;
pub const RULE_WIDTH: usize = 70;

/// Truncate to at most `max_chars` characters without splitting a code point.
pub fn truncate_safe(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Round a similarity score to the precision used for ranking and display.
pub fn round_score(score: f64) -> f64 {
    let factor = 10f64.powi(SCORE_DECIMALS);
    (score * factor).round() / factor
}
