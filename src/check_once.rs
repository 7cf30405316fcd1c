mod wiring;

use color_eyre::eyre::Result;
use courtwatch_core::clock::{Clock, SystemClock};
use dotenv::dotenv;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Load environment variables
    dotenv().ok();

    // Initialize logging
    wiring::init_tracing()?;

    let (watcher, _) = wiring::build_watcher()?;

    // Run a single cycle, for cron-style scheduling
    let report = watcher.run_cycle(SystemClock.now()).await;
    info!(
        new = report.evaluation.newly_available.len(),
        taken = report.evaluation.taken.len(),
        announced = report.evaluation.decision.is_announce(),
        saved = report.saved,
        "Single check finished"
    );

    Ok(())
}
