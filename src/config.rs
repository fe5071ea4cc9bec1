//! Run configuration — built once at startup, passed by reference everywhere.
//!
//! Sources, in order: CLI threshold, environment, then `constants.rs` defaults.
//! Credentials are resolved here so a missing key fails before the store is
//! touched.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{
    DEFAULT_SCOPE, DEFAULT_STORE_RELATIVE, EMBEDDING_MODEL, EMBEDDING_TIMEOUT_SECS,
    ENV_CASES_PATH, ENV_OPENAI_KEY, ENV_OPENROUTER_KEY, ENV_SCOPE, ENV_STORE_PATH,
    LEXICAL_DISPLAY, MAX_RESULTS, OPENAI_EMBEDDINGS_URL, OPENROUTER_EMBEDDINGS_URL,
    QUERY_DELAY_MS,
};
use crate::{ProbeError, ProbeResult};

// ============================================================================
// EMBEDDING PROVIDER
// ============================================================================

/// Embeddings backends speaking the same `{model, input}` protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// Primary: wins when both keys are present.
    OpenRouter,
    OpenAi,
}

impl ProviderKind {
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::OpenRouter => OPENROUTER_EMBEDDINGS_URL,
            Self::OpenAi => OPENAI_EMBEDDINGS_URL,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenRouter => "openrouter",
            Self::OpenAi => "openai",
        }
    }
}

#[derive(Clone)]
pub struct EmbeddingProvider {
    pub kind: ProviderKind,
    pub api_key: String,
}

impl fmt::Debug for EmbeddingProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddingProvider")
            .field("kind", &self.kind)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

// ============================================================================
// PROBE CONFIG
// ============================================================================

#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub store_path: PathBuf,
    pub provider: EmbeddingProvider,
    pub model: String,
    /// Path namespace; chunks match `{scope}/%`.
    pub scope: String,
    pub min_score: f64,
    pub max_results: usize,
    /// Lexical rows shown per case in the trace.
    pub lexical_display: usize,
    pub query_delay: Duration,
    pub request_timeout: Duration,
    /// Optional TOML file replacing the built-in suite.
    pub cases_path: Option<PathBuf>,
}

impl ProbeConfig {
    /// Build from the process environment.
    pub fn from_env(min_score: f64) -> ProbeResult<Self> {
        Self::from_lookup(min_score, |key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(min_score: f64, lookup: F) -> ProbeResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let provider = if let Some(key) = get(ENV_OPENROUTER_KEY) {
            EmbeddingProvider { kind: ProviderKind::OpenRouter, api_key: key }
        } else if let Some(key) = get(ENV_OPENAI_KEY) {
            EmbeddingProvider { kind: ProviderKind::OpenAi, api_key: key }
        } else {
            return Err(ProbeError::MissingCredentials);
        };

        let store_path = get(ENV_STORE_PATH)
            .map(|p| PathBuf::from(expand_tilde(&p)))
            .unwrap_or_else(default_store_path);

        let scope = get(ENV_SCOPE)
            .map(|s| s.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_SCOPE.to_string());

        let config = Self {
            store_path,
            provider,
            model: EMBEDDING_MODEL.to_string(),
            scope,
            min_score,
            max_results: MAX_RESULTS,
            lexical_display: LEXICAL_DISPLAY,
            query_delay: Duration::from_millis(QUERY_DELAY_MS),
            request_timeout: Duration::from_secs(EMBEDDING_TIMEOUT_SECS),
            cases_path: get(ENV_CASES_PATH).map(|p| PathBuf::from(expand_tilde(&p))),
        };

        tracing::debug!(
            store = %config.store_path.display(),
            provider = config.provider.kind.as_str(),
            scope = %config.scope,
            min_score = config.min_score,
            "Configuration resolved"
        );

        Ok(config)
    }

    /// `LIKE` pattern selecting everything under the scope.
    pub fn scope_pattern(&self) -> String {
        scope_pattern(&self.scope)
    }
}

/// `{scope}/%` with `\`, `%` and `_` in the scope escaped; use with `ESCAPE '\'`.
pub fn scope_pattern(scope: &str) -> String {
    let mut pattern = String::with_capacity(scope.len() + 2);
    for c in scope.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push_str("/%");
    pattern
}

/// `~/.openclaw/memory/main.sqlite`
pub fn default_store_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_STORE_RELATIVE)
}

/// Expand ~ to home directory in paths.
pub fn expand_tilde(path: &str) -> String {
    if path.starts_with("~/") || path == "~" {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    path.to_string()
}
