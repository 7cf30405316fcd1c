use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use crate::aggregator::{compute_available, HorizonPlan};
use crate::clock::{Clock, SystemClock};
use crate::config::WatchConfig;
use crate::engine::{cache_is_stale, evaluate, next_meta, EngineSettings, GateState};
use crate::models::{Evaluation, NotificationDecision, Snapshot, SuppressionReason};
use crate::traits::{AvailabilityFetcher, DeliveryOutcome, Notifier, SnapshotStore};

/// What happened during one poll cycle.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub evaluation: Evaluation,
    pub cache_was_stale: bool,
    pub windows: usize,
    pub failed_windows: usize,
    /// `None` when nothing was announced.
    pub delivery: Option<DeliveryOutcome>,
    /// Whether the snapshot was overwritten.
    pub saved: bool,
}

/// Runs poll cycles: fetch, diff, decide, notify, persist.
///
/// Holds no state between cycles besides what the snapshot store keeps.
pub struct Watcher {
    config: WatchConfig,
    plan: HorizonPlan,
    settings: EngineSettings,
    fetcher: Arc<dyn AvailabilityFetcher>,
    store: Arc<dyn SnapshotStore>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
}

impl Watcher {
    pub fn new(
        config: WatchConfig,
        fetcher: Arc<dyn AvailabilityFetcher>,
        store: Arc<dyn SnapshotStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let plan = HorizonPlan::from(&config);
        let settings = EngineSettings {
            gate: config.gate_policy,
            day_boundary: config.day_boundary,
            horizon_weeks: config.horizon_weeks,
        };
        Self {
            config,
            plan,
            settings,
            fetcher,
            store,
            notifier,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the clock used to stamp `saved_at` when the snapshot is written.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &WatchConfig {
        &self.config
    }

    /// Run one complete cycle anchored at `now`.
    pub async fn run_cycle(&self, now: DateTime<Utc>) -> CycleReport {
        info!("Checking for available slots...");
        let local_now = now.with_timezone(&self.config.timezone);

        let previous = self.store.load(local_now.date_naive());
        let stale = cache_is_stale(
            self.settings.gate,
            &previous,
            now,
            self.config.stale_after(),
        );

        let availability = compute_available(self.fetcher.as_ref(), &self.plan, local_now).await;

        let evaluation = evaluate(
            &availability.available,
            &previous.available,
            local_now,
            stale,
            &GateState::from(&previous.meta),
            &self.settings,
        );

        if !evaluation.taken.is_empty() {
            info!("{} slots have been taken since last check.", evaluation.taken.len());
        }

        let delivery = self.act_on(&evaluation.decision).await;

        let saved = if availability.is_total_failure() {
            warn!("Keeping previous snapshot because no availability data could be fetched");
            false
        } else {
            let mut meta = next_meta(&previous.meta, &evaluation, local_now);
            // Age is measured from the write, not from the start of the cycle
            meta.saved_at = Some(self.clock.now());
            let snapshot = Snapshot::new(availability.available.clone(), meta);
            match self.store.save(&snapshot) {
                Ok(()) => true,
                Err(e) => {
                    error!("Failed to save snapshot: {e}");
                    false
                }
            }
        };

        CycleReport {
            evaluation,
            cache_was_stale: stale,
            windows: availability.windows,
            failed_windows: availability.failed_windows,
            delivery,
            saved,
        }
    }

    /// Announce a startup message through the configured notifier.
    pub async fn send_heartbeat(&self) -> DeliveryOutcome {
        let courts: Vec<String> = self
            .config
            .courts
            .ids()
            .map(|id| self.config.courts.name_of(id))
            .collect();
        let message = format!(
            "Court watch is running: tracking {} for the next {} weeks, checking every {} minutes.",
            courts.join(", "),
            self.config.horizon_weeks,
            self.config.poll_interval.as_secs() / 60,
        );
        self.notifier.deliver(&message).await
    }

    async fn act_on(&self, decision: &NotificationDecision) -> Option<DeliveryOutcome> {
        match decision {
            NotificationDecision::Announce(slots) => {
                info!("Found {} newly available slots in the future!", slots.len());
                let message = self.notifier.format(slots, &self.config.courts);
                Some(self.notifier.deliver(&message).await)
            }
            NotificationDecision::Suppress { reason, withheld } => {
                match reason {
                    SuppressionReason::NoNewFutureSlots => {
                        info!("No new slots have become available in the future.");
                    }
                    SuppressionReason::StaleCache => info!(
                        "Found {} new slots, but cache is stale. Not sending a notification to avoid spam.",
                        withheld.len()
                    ),
                    SuppressionReason::FirstOfDay => info!(
                        "Found {} new slots on the first check of the day. Not sending a notification.",
                        withheld.len()
                    ),
                }
                None
            }
        }
    }
}
