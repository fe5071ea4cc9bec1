//! Sequential run loop.
//!
//! One case at a time: embed, search both paths, classify, print, pause.
//! The store is opened once and closed after the summary. Case failures are
//! recorded, never raised, so the loop always reaches the close.

use std::io::Write;
use std::thread;

use crate::config::ProbeConfig;
use crate::evaluation::{CaseResult, Evaluator, Status, TestCase};
use crate::processing::embedding_client::Embedder;
use crate::report::Reporter;
use crate::storage::chunks::ChunkStore;
use crate::ProbeResult;

/// 1 if any case failed, else 0. Skips and below-threshold cases do not count.
pub fn exit_code(results: &[CaseResult]) -> i32 {
    if results.iter().any(|r| r.status == Status::Fail) {
        1
    } else {
        0
    }
}

/// Run every case against an open store, reporting as it goes.
pub fn run_cases<W: Write>(
    config: &ProbeConfig,
    store: &ChunkStore,
    embedder: &dyn Embedder,
    cases: &[TestCase],
    reporter: &mut Reporter<W>,
) -> ProbeResult<Vec<CaseResult>> {
    let evaluator = Evaluator::new(store, embedder, config);
    let mut results = Vec::with_capacity(cases.len());

    for case in cases {
        reporter.case_banner(case)?;
        let report = evaluator.evaluate(case)?;
        reporter.case_trace(case, &report)?;
        results.push(report.result);

        if !config.query_delay.is_zero() {
            thread::sleep(config.query_delay);
        }
    }

    Ok(results)
}

/// Full run: header, store preconditions, cases, summary. Returns the exit code.
pub fn run<W: Write>(
    config: &ProbeConfig,
    embedder: &dyn Embedder,
    cases: &[TestCase],
    out: W,
) -> ProbeResult<i32> {
    let mut reporter = Reporter::new(out, config);
    reporter.header(config, cases.len())?;

    let store = ChunkStore::open(&config.store_path)?;
    let files = store.count_files(&config.scope)?;
    let chunks = store.count_chunks(&config.scope)?;
    reporter.store_stats(files, chunks)?;

    tracing::info!(
        store = %config.store_path.display(),
        scope = %config.scope,
        files,
        chunks,
        cases = cases.len(),
        "Run started"
    );

    let results = run_cases(config, &store, embedder, cases, &mut reporter)?;
    reporter.summary(&results)?;
    store.close()?;

    let code = exit_code(&results);
    tracing::info!(cases = results.len(), exit_code = code, "Run finished");
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::QUERY_DELAY_MS;
    use crate::evaluation::cases::builtin_cases;
    use crate::test_helpers::{
        setup_chunk_store, test_config, write_store_file, ChunkBuilder, ScriptedEmbedder,
    };
    use crate::ProbeError;
    use std::time::{Duration, Instant};

    fn result(status: Status) -> CaseResult {
        CaseResult { status, query: "q".into(), top_score: 0.0, above_threshold: 0, embed_ms: 0 }
    }

    #[test]
    fn test_exit_code_rules() {
        assert_eq!(exit_code(&[]), 0);
        assert_eq!(
            exit_code(&[result(Status::Pass), result(Status::Skip), result(Status::BelowThreshold)]),
            0
        );
        assert_eq!(
            exit_code(&[result(Status::Pass), result(Status::Pass), result(Status::Fail)]),
            1
        );
    }

    #[test]
    fn test_missing_store_fails_before_any_case() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(0.35);
        config.store_path = dir.path().join("absent.sqlite");
        let embedder = ScriptedEmbedder::new();

        let mut out = Vec::new();
        let err = run(&config, &embedder, &builtin_cases(), &mut out).unwrap_err();
        assert!(matches!(err, ProbeError::StoreNotFound(_)));
        assert!(embedder.calls.borrow().is_empty());
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Memory Search Test Harness\n"));
        assert!(!text.contains("QUERY:"));
    }

    #[test]
    fn test_cases_are_paced_by_query_delay() {
        let mut config = test_config(0.35);
        config.query_delay = Duration::from_millis(QUERY_DELAY_MS);
        let store = setup_chunk_store();
        let embedder = ScriptedEmbedder::new();
        let cases = vec![TestCase::new("first", "x", "d"), TestCase::new("second", "x", "d")];

        let mut reporter = Reporter::new(Vec::new(), &config);
        let started = Instant::now();
        let results = run_cases(&config, &store, &embedder, &cases, &mut reporter).unwrap();
        let elapsed = started.elapsed();

        assert_eq!(results.len(), 2);
        assert!(
            elapsed >= Duration::from_millis(2 * QUERY_DELAY_MS),
            "two cases finished in {:?}",
            elapsed
        );
    }

    #[test]
    fn test_end_to_end_hop_on_a_call() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_store_file(dir.path(), |conn| {
            // cos([1,0],[0.6,0.8]) = 0.6
            ChunkBuilder::new()
                .text("Q: Can I get someone to hop on a call? A: Yes, for money.")
                .lines(12, 14)
                .embedding(&[0.6, 0.8])
                .insert(conn);
            ChunkBuilder::new().text("Unrelated note").embedding(&[0.0, 1.0]).insert(conn);
        });
        let mut config = test_config(0.35);
        config.store_path = path;
        let query = "Can I get someone to hop on a call?";
        let embedder = ScriptedEmbedder::new().with(query, &[1.0, 0.0]);
        let cases = vec![TestCase::new(query, "money", "Hop on a call")];

        let store = ChunkStore::open(&config.store_path).unwrap();
        let mut reporter = Reporter::new(Vec::new(), &config);
        let results = run_cases(&config, &store, &embedder, &cases, &mut reporter).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].status, Status::Pass);
        assert_eq!(results[0].top_score, 0.6);
        assert_eq!(results[0].above_threshold, 1);

        let mut out = Vec::new();
        let code = run(&config, &embedder, &cases, &mut out).unwrap();
        assert_eq!(code, 0);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Indexed: 1 files, 2 chunks in scope\n"));
        assert!(text.contains("  RESULT: PASS\n"));
        assert!(text.contains("  >>> [1] score=0.6 (ABOVE)"));
        // "call?" is not a valid FTS5 bareword: lexical path degrades to an error row
        assert!(text.contains("rank=? ?:?"));
        assert!(text.contains("  PASS: 1/1\n"));
    }

    #[test]
    fn test_fail_sets_exit_code_and_run_continues() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_store_file(dir.path(), |conn| {
            ChunkBuilder::new().text("money talk").embedding(&[1.0, 0.0]).insert(conn);
        });
        let mut config = test_config(0.35);
        config.store_path = path;
        let embedder = ScriptedEmbedder::new()
            .with("first question", &[0.0, 1.0])
            .with("second question", &[1.0, 0.0]);
        let cases = vec![
            TestCase::new("first question", "absent phrase", "fails"),
            TestCase::new("skipped question", "money", "no embedding"),
            TestCase::new("second question", "money", "passes"),
        ];

        let mut out = Vec::new();
        let code = run(&config, &embedder, &cases, &mut out).unwrap();
        assert_eq!(code, 1);
        assert_eq!(embedder.calls.borrow().len(), 3);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("  PASS: 1/3\n"));
        assert!(text.contains("  FAIL: 1/3\n"));
        assert!(text.contains("  SKIP: 1/3\n"));
        assert!(!text.contains("Suggested threshold"));
    }

    #[test]
    fn test_below_threshold_does_not_fail_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_store_file(dir.path(), |conn| {
            // cos = 0.3
            ChunkBuilder::new().text("the minimum engagement").embedding(&[0.3, 0.953_939_2]).insert(conn);
        });
        let mut config = test_config(0.35);
        config.store_path = path;
        let embedder = ScriptedEmbedder::new().with("pricing floor", &[1.0, 0.0]);
        let cases = vec![TestCase::new("pricing floor", "minimum engagement", "below")];

        let mut out = Vec::new();
        let code = run(&config, &embedder, &cases, &mut out).unwrap();
        assert_eq!(code, 0);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("  RESULT: BELOW_THRESHOLD\n"));
        assert!(text.contains("  Lowest matching score: 0.3\n"));
        assert!(text.contains("  Suggested threshold: 0.25\n"));
    }
}
