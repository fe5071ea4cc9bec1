mod cli;

use clap::Parser;
use recall_probe::constants::MIN_SCORE_DEFAULT;

#[derive(Parser)]
#[command(
    name = "recall-probe",
    version,
    about = "Recall Probe — check that scoped memory search finds the trained answers"
)]
struct App {
    /// Minimum cosine similarity for a vector match to count (default 0.35)
    #[arg(allow_negative_numbers = true)]
    min_score: Option<f64>,
}

fn main() {
    let app = App::parse();
    recall_probe::tracing_init::init_stderr_tracing();

    // Exit 1 on any fatal precondition (no credentials, store missing) or FAIL case
    let code = cli::run(app.min_score.unwrap_or(MIN_SCORE_DEFAULT)).unwrap_or_else(|e| {
        eprintln!("\nERROR: {:#}", e);
        1
    });
    std::process::exit(code);
}
