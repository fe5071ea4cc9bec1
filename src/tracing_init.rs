//! Tracing initialization — structured logs on stderr.
//!
//! The report owns stdout, so log lines never interleave with it when the
//! output is captured or piped.

/// Initialize tracing to stderr. `RUST_LOG` overrides the default `info` filter.
pub fn init_stderr_tracing() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_ansi(false)
        .try_init();
}
