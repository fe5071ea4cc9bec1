//! Human-readable report — per-case trace and end-of-run summary.
//!
//! Writes to any `io::Write` so tests can capture the exact text.

use std::io::{self, Write};

use crate::config::ProbeConfig;
use crate::constants::{
    truncate_safe, BAR_WIDTH, CHART_QUERY_CHARS, RULE_WIDTH, SUGGESTED_THRESHOLD_FLOOR,
    SUGGESTED_THRESHOLD_MARGIN, TRACE_PREVIEW_CHARS,
};
use crate::evaluation::{CaseReport, CaseResult, Status, TestCase};
use crate::retrieval::lexical::LexicalRow;

/// Outcome counts for a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub pass: usize,
    pub fail: usize,
    pub below: usize,
    pub skip: usize,
}

impl Tally {
    pub fn from_results(results: &[CaseResult]) -> Self {
        let mut tally = Self::default();
        for r in results {
            match r.status {
                Status::Pass => tally.pass += 1,
                Status::Fail => tally.fail += 1,
                Status::BelowThreshold => tally.below += 1,
                Status::Skip => tally.skip += 1,
            }
        }
        tally
    }
}

/// Threshold recommendation: `(lowest BELOW_THRESHOLD top score, suggestion)`.
///
/// `None` when no case landed below the threshold.
pub fn suggested_threshold(results: &[CaseResult]) -> Option<(f64, f64)> {
    let lowest = results
        .iter()
        .filter(|r| r.status == Status::BelowThreshold)
        .map(|r| r.top_score)
        .fold(None, |acc: Option<f64>, s| Some(acc.map_or(s, |a| a.min(s))))?;
    let suggested = (lowest - SUGGESTED_THRESHOLD_MARGIN).max(SUGGESTED_THRESHOLD_FLOOR);
    Some((lowest, suggested))
}

/// `#` bar, one char per 0.025 of score. Non-positive scores get no bar.
pub fn score_bar(score: f64) -> String {
    if score <= 0.0 {
        return String::new();
    }
    "#".repeat((score * BAR_WIDTH) as usize)
}

pub struct Reporter<W: Write> {
    out: W,
    min_score: f64,
    max_results: usize,
    lexical_display: usize,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, config: &ProbeConfig) -> Self {
        Self {
            out,
            min_score: config.min_score,
            max_results: config.max_results,
            lexical_display: config.lexical_display,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn header(&mut self, config: &ProbeConfig, case_count: usize) -> io::Result<()> {
        writeln!(self.out, "Memory Search Test Harness")?;
        writeln!(self.out, "DB: {}", config.store_path.display())?;
        writeln!(self.out, "Scope: {}", config.scope)?;
        writeln!(self.out, "Min Score: {:?}", config.min_score)?;
        writeln!(self.out, "Embedding: {} (via {})", config.model, config.provider.kind.as_str())?;
        writeln!(self.out, "Tests: {}", case_count)
    }

    pub fn store_stats(&mut self, files: i64, chunks: i64) -> io::Result<()> {
        writeln!(self.out, "Indexed: {} files, {} chunks in scope", files, chunks)
    }

    pub fn case_banner(&mut self, case: &TestCase) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "{}", "=".repeat(RULE_WIDTH))?;
        writeln!(self.out, "QUERY: \"{}\"", case.query)?;
        writeln!(self.out, "EXPECT: substring \"{}\"", case.expected)?;
        writeln!(self.out, "DESC: {}", case.description)?;
        writeln!(self.out, "{}", "─".repeat(RULE_WIDTH))?;
        self.out.flush()
    }

    pub fn case_trace(&mut self, case: &TestCase, report: &CaseReport) -> io::Result<()> {
        let result = &report.result;
        if result.status == Status::Skip {
            writeln!(self.out, "  SKIP: Could not get embedding ({}ms)", result.embed_ms)?;
            return Ok(());
        }

        writeln!(self.out)?;
        writeln!(
            self.out,
            "  Vector results (top {}, embed={}ms):",
            self.max_results, result.embed_ms
        )?;
        for (i, hit) in report.vector_hits.iter().take(self.max_results).enumerate() {
            let marker = if case.matches(&hit.text) { ">>>" } else { "   " };
            let thresh = if hit.score >= self.min_score { "ABOVE" } else { "below" };
            writeln!(
                self.out,
                "  {} [{}] score={:?} ({}) {}:{}",
                marker,
                i + 1,
                hit.score,
                thresh,
                hit.path,
                hit.lines()
            )?;
            writeln!(self.out, "       {}...", truncate_safe(&hit.text, TRACE_PREVIEW_CHARS))?;
        }

        let shown = report.lexical_rows.len().min(self.lexical_display);
        writeln!(self.out)?;
        writeln!(self.out, "  FTS results (top {}):", shown)?;
        for (i, row) in report.lexical_rows.iter().take(shown).enumerate() {
            match row {
                LexicalRow::Hit(hit) => {
                    let marker = if case.matches(&hit.text) { ">>>" } else { "   " };
                    writeln!(
                        self.out,
                        "  {} [{}] rank={} {}:{}",
                        marker,
                        i + 1,
                        hit.rank,
                        hit.path,
                        hit.lines()
                    )?;
                    writeln!(self.out, "       {}...", truncate_safe(&hit.text, TRACE_PREVIEW_CHARS))?;
                }
                LexicalRow::Error(err) => {
                    writeln!(self.out, "      [{}] rank=? ?:?", i + 1)?;
                    writeln!(self.out, "       {}...", truncate_safe(err, TRACE_PREVIEW_CHARS))?;
                }
            }
        }

        writeln!(self.out)?;
        writeln!(self.out, "  RESULT: {}", result.status.as_str())?;
        writeln!(
            self.out,
            "  Top vector score: {:?} (threshold: {:?})",
            result.top_score, self.min_score
        )?;
        writeln!(
            self.out,
            "  Above threshold: {}/{}",
            result.above_threshold,
            report.vector_hits.len()
        )?;
        if result.status == Status::BelowThreshold {
            let match_score = report.first_match_score(case).unwrap_or(0.0);
            writeln!(
                self.out,
                "  Expected answer found but score {:?} < threshold {:?}",
                match_score, self.min_score
            )?;
        }
        self.out.flush()
    }

    pub fn summary(&mut self, results: &[CaseResult]) -> io::Result<()> {
        let total = results.len();
        let tally = Tally::from_results(results);

        writeln!(self.out)?;
        writeln!(self.out, "{}", "=".repeat(RULE_WIDTH))?;
        writeln!(self.out, "SUMMARY")?;
        writeln!(self.out, "{}", "=".repeat(RULE_WIDTH))?;
        writeln!(self.out, "  PASS: {}/{}", tally.pass, total)?;
        writeln!(self.out, "  FAIL: {}/{}", tally.fail, total)?;
        writeln!(
            self.out,
            "  BELOW_THRESHOLD: {}/{} (found but score < {:?})",
            tally.below, total, self.min_score
        )?;
        if tally.skip > 0 {
            writeln!(self.out, "  SKIP: {}/{}", tally.skip, total)?;
        }

        if let Some((lowest, suggested)) = suggested_threshold(results) {
            writeln!(self.out)?;
            writeln!(self.out, "  Recommendation: Lower minScore to capture more matches.")?;
            writeln!(self.out, "  Lowest matching score: {:?}", lowest)?;
            writeln!(self.out, "  Suggested threshold: {:.2}", suggested)?;
        }

        writeln!(self.out)?;
        writeln!(self.out, "  Score distribution:")?;
        let mut ordered: Vec<&CaseResult> = results.iter().collect();
        ordered.sort_by(|a, b| {
            a.top_score
                .partial_cmp(&b.top_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        for r in ordered {
            writeln!(
                self.out,
                "  [{}] {:.3} {} {}",
                r.status.flag(),
                r.top_score,
                score_bar(r.top_score),
                truncate_safe(&r.query, CHART_QUERY_CHARS)
            )?;
        }
        self.out.flush()
    }
}
