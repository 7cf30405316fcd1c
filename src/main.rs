mod wiring;

use std::time::Duration;

use async_trait::async_trait;
use color_eyre::eyre::Result;
use courtwatch_core::clock::SystemClock;
use courtwatch_core::schedule::{PollSchedule, PollTicker, Sleeper};
use dotenv::dotenv;
use tokio::signal;
use tracing::{debug, info};

/// Sleeps on the tokio timer.
struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Load environment variables
    dotenv().ok();

    // Initialize logging
    wiring::init_tracing()?;

    info!("Starting court watch");

    // Load configuration; any error here stops the process before polling
    let (watcher, notifier_config) = wiring::build_watcher()?;

    if notifier_config.heartbeat_on_startup {
        let outcome = watcher.send_heartbeat().await;
        debug!(?outcome, "Startup heartbeat");
    }

    let schedule = PollSchedule::from(watcher.config());
    let mut ticker = PollTicker::new(schedule, SystemClock, TokioSleeper);

    // One listener for the whole run, so a Ctrl+C during a cycle is seen at the next wait
    let shutdown = signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        let now = tokio::select! {
            biased;
            _ = &mut shutdown => {
                info!("Shutdown signal received, stopping...");
                break;
            }
            now = ticker.tick() => now,
        };

        let report = watcher.run_cycle(now).await;
        debug!(
            cycle = ticker.ticks(),
            new = report.evaluation.newly_available.len(),
            taken = report.evaluation.taken.len(),
            failed_windows = report.failed_windows,
            saved = report.saved,
            "Cycle finished"
        );
    }

    info!("Court watch stopped");
    Ok(())
}
