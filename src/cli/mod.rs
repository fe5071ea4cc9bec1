use anyhow::{Context, Result};
use recall_probe::config::ProbeConfig;
use recall_probe::evaluation::cases::resolve_cases;
use recall_probe::harness;
use recall_probe::processing::embedding_client::HttpEmbedder;

/// Resolve configuration and the suite, then run it. Returns the exit code.
pub fn run(min_score: f64) -> Result<i32> {
    if !min_score.is_finite() {
        anyhow::bail!("Minimum score must be a finite number, got {}", min_score);
    }

    let config = ProbeConfig::from_env(min_score).context("Configuration error")?;
    let cases = resolve_cases(&config).context("Failed to load test cases")?;
    let embedder = HttpEmbedder::from_config(&config);

    let stdout = std::io::stdout();
    let code = harness::run(&config, &embedder, &cases, stdout.lock())?;
    Ok(code)
}
