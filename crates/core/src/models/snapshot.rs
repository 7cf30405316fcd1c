use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::slot::SlotSet;

/// Bookkeeping stored next to the slot set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotMeta {
    /// Local calendar date of the last completed check.
    #[serde(default)]
    pub last_check: Option<NaiveDate>,
    /// When a detection last passed (or consumed) the notification gate.
    #[serde(default)]
    pub last_notification: Option<DateTime<FixedOffset>>,
    /// When the snapshot was last written.
    #[serde(default)]
    pub saved_at: Option<DateTime<Utc>>,
}

impl SnapshotMeta {
    /// True when there is no record of a save, or the last save is older than `max_age`.
    pub fn is_older_than(&self, now: DateTime<Utc>, max_age: Duration) -> bool {
        match self.saved_at {
            Some(saved_at) => now - saved_at > max_age,
            None => true,
        }
    }
}

/// The single persisted record of the last known available slots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub available: SlotSet,
    pub meta: SnapshotMeta,
}

impl Snapshot {
    pub fn new(available: SlotSet, meta: SnapshotMeta) -> Self {
        Self { available, meta }
    }

    /// A snapshot that has never been saved (missing or unreadable on disk).
    pub fn is_cold(&self) -> bool {
        self.meta.saved_at.is_none() && self.available.is_empty()
    }
}
