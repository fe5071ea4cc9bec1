//! Test suites — the built-in customer-channel suite, or a TOML file.
//!
//! File format:
//!
//! ```toml
//! [[case]]
//! query = "Can I get someone to hop on a call?"
//! expected = "money"
//! description = "Hop on a call -> for money"
//! ```

use std::path::Path;

use serde::Deserialize;

use super::TestCase;
use crate::config::ProbeConfig;
use crate::{ProbeError, ProbeResult};

#[derive(Deserialize)]
struct CaseFile {
    #[serde(default, rename = "case")]
    cases: Vec<TestCase>,
}

/// Trained Q&A pairs of the test-customer channel.
pub fn builtin_cases() -> Vec<TestCase> {
    vec![
        TestCase::new(
            "hey can I get somebody on a call to talk about this deal?",
            "CloudWarriors",
            "Presales call request → should ask if CW is partner",
        ),
        TestCase::new(
            "Can I get someone to hop on a call?",
            "money",
            "Hop on a call → for money (trained pair #1)",
        ),
        TestCase::new(
            "Can I get presales assistance?",
            "CloudWarriors is the partner",
            "Presales assistance → partner check (trained pair #2)",
        ),
        TestCase::new(
            "there is already a partner on this deal",
            "minimum of $10k",
            "Partner exists → $10k minimum (trained pair #3)",
        ),
        TestCase::new(
            "what is the minimum cost for an implementation?",
            "minimum engagement",
            "Minimum engagement pricing question",
        ),
        TestCase::new(
            "I need an executable SOW",
            "SOW",
            "SOW request → should match SOW-related Q&A",
        ),
        TestCase::new(
            "can you scope out a custom integration?",
            "integration",
            "Custom integration question",
        ),
        TestCase::new("I need a quote on CW paper", "quote", "Quote request"),
        TestCase::new(
            "Team, availability for a scoping call next week?",
            "scoping",
            "Scoping call availability (first Q&A pair in training)",
        ),
        TestCase::new(
            "what is the deal registration status?",
            "deal",
            "Deal registration question",
        ),
    ]
}

/// Parse a TOML suite. An empty suite is rejected.
pub fn parse_cases(content: &str) -> ProbeResult<Vec<TestCase>> {
    let file: CaseFile =
        toml::from_str(content).map_err(|e| ProbeError::CaseFile(e.to_string()))?;
    if file.cases.is_empty() {
        return Err(ProbeError::CaseFile("no [[case]] entries".to_string()));
    }
    if let Some(bad) = file.cases.iter().find(|c| c.expected.is_empty()) {
        return Err(ProbeError::CaseFile(format!(
            "case {:?} has an empty expected substring",
            bad.query
        )));
    }
    Ok(file.cases)
}

pub fn load_cases(path: &Path) -> ProbeResult<Vec<TestCase>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ProbeError::CaseFile(format!("{}: {}", path.display(), e)))?;
    parse_cases(&content)
}

/// The configured suite: the case file when set, else the built-in one.
pub fn resolve_cases(config: &ProbeConfig) -> ProbeResult<Vec<TestCase>> {
    match &config.cases_path {
        Some(path) => {
            let cases = load_cases(path)?;
            tracing::info!(path = %path.display(), cases = cases.len(), "Loaded test cases from file");
            Ok(cases)
        }
        None => Ok(builtin_cases()),
    }
}
