//! # Slot-Change Engine
//!
//! Compares the current availability with the previous snapshot and decides
//! whether the difference is worth a notification.
//!
//! ## Evaluation Steps
//!
//! 1. `newly_available = current - previous`, `taken = previous - current`
//! 2. Keep only newly available slots that start strictly after the reference
//!    instant, compared as wall-clock time in the reference timezone
//! 3. Optionally drop slots on the last horizon day during the first check of
//!    a new day (that day was never enumerated before, so everything on it
//!    looks new)
//! 4. Apply the notification gate selected at startup
//! 5. Announce whatever survives, or suppress with a reason
//!
//! `taken` is informational only and never drives a notification.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::aggregator::horizon_last_day;
use crate::errors::WatchError;
use crate::models::{
    Evaluation, NotificationDecision, SlotSet, Snapshot, SnapshotMeta, SuppressionReason,
};

/// How the engine decides that a detected change should stay quiet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GatePolicy {
    /// Suppress when the previous snapshot is older than twice the poll interval.
    #[default]
    CacheStaleness,
    /// Suppress the first detection with candidates of every calendar day.
    OncePerDay,
}

impl FromStr for GatePolicy {
    type Err = WatchError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "cache-staleness" | "staleness" => Ok(GatePolicy::CacheStaleness),
            "once-per-day" | "daily" => Ok(GatePolicy::OncePerDay),
            other => Err(WatchError::Config(format!(
                "GATE_POLICY must be 'cache-staleness' or 'once-per-day', got {other:?}"
            ))),
        }
    }
}

impl fmt::Display for GatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatePolicy::CacheStaleness => f.write_str("cache-staleness"),
            GatePolicy::OncePerDay => f.write_str("once-per-day"),
        }
    }
}

/// Correction applied on the first check of a new calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DayBoundaryPolicy {
    /// Ignore new slots on the last horizon day until it has been seen once.
    #[default]
    ExcludeHorizonEdge,
    Off,
}

impl FromStr for DayBoundaryPolicy {
    type Err = WatchError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "exclude-horizon-edge" => Ok(DayBoundaryPolicy::ExcludeHorizonEdge),
            "off" | "none" => Ok(DayBoundaryPolicy::Off),
            other => Err(WatchError::Config(format!(
                "DAY_BOUNDARY_POLICY must be 'exclude-horizon-edge' or 'off', got {other:?}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    pub gate: GatePolicy,
    pub day_boundary: DayBoundaryPolicy,
    pub horizon_weeks: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            gate: GatePolicy::default(),
            day_boundary: DayBoundaryPolicy::default(),
            horizon_weeks: crate::config::DEFAULT_HORIZON_WEEKS,
        }
    }
}

/// Gate bookkeeping carried between cycles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GateState {
    pub last_check: Option<NaiveDate>,
    pub last_notification: Option<DateTime<FixedOffset>>,
}

impl From<&SnapshotMeta> for GateState {
    fn from(meta: &SnapshotMeta) -> Self {
        Self {
            last_check: meta.last_check,
            last_notification: meta.last_notification,
        }
    }
}

/// Whether `snapshot` is an untrustworthy baseline under `policy`.
///
/// A snapshot that was never saved is stale under every policy.
pub fn cache_is_stale(
    policy: GatePolicy,
    snapshot: &Snapshot,
    now: DateTime<Utc>,
    stale_after: Duration,
) -> bool {
    match policy {
        GatePolicy::CacheStaleness => snapshot.meta.is_older_than(now, stale_after),
        GatePolicy::OncePerDay => snapshot.is_cold(),
    }
}

pub fn evaluate(
    current: &SlotSet,
    previous: &SlotSet,
    reference_now: DateTime<Tz>,
    cache_is_stale: bool,
    gate: &GateState,
    settings: &EngineSettings,
) -> Evaluation {
    let newly_available = current.difference(previous);
    let taken = previous.difference(current);

    let now_local = reference_now.naive_local();
    let today = now_local.date();

    let mut candidates: SlotSet = newly_available
        .iter()
        .filter(|slot| slot.starts_at() > now_local)
        .copied()
        .collect();

    let first_check_today = gate.last_check != Some(today);
    if settings.day_boundary == DayBoundaryPolicy::ExcludeHorizonEdge && first_check_today {
        let edge = horizon_last_day(today, settings.horizon_weeks);
        candidates.retain(|slot| slot.date != edge);
    }

    let decision = if cache_is_stale {
        NotificationDecision::Suppress {
            reason: SuppressionReason::StaleCache,
            withheld: candidates,
        }
    } else if candidates.is_empty() {
        NotificationDecision::suppress(SuppressionReason::NoNewFutureSlots)
    } else if settings.gate == GatePolicy::OncePerDay
        && !notified_on(gate.last_notification, today, reference_now.timezone())
    {
        NotificationDecision::Suppress {
            reason: SuppressionReason::FirstOfDay,
            withheld: candidates,
        }
    } else {
        NotificationDecision::Announce(candidates)
    };

    Evaluation {
        newly_available,
        taken,
        decision,
    }
}

/// Metadata to persist after a cycle that produced `evaluation`.
///
/// `saved_at` is set to `reference_now`; callers that write later overwrite it.
pub fn next_meta(
    previous: &SnapshotMeta,
    evaluation: &Evaluation,
    reference_now: DateTime<Tz>,
) -> SnapshotMeta {
    let last_notification = if evaluation.decision.stamps_gate() {
        Some(reference_now.fixed_offset())
    } else {
        previous.last_notification
    };

    SnapshotMeta {
        last_check: Some(reference_now.date_naive()),
        last_notification,
        saved_at: Some(reference_now.with_timezone(&Utc)),
    }
}

fn notified_on(last: Option<DateTime<FixedOffset>>, today: NaiveDate, tz: Tz) -> bool {
    last.is_some_and(|at| at.with_timezone(&tz).date_naive() == today)
}
