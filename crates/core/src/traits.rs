//! Seams between the slot-change core and the outside world.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::WatchResult;
use crate::models::{CourtId, CourtRegistry, SlotSet, Snapshot};

/// One 7-day availability query against the booking service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowRequest {
    pub facility_id: u64,
    pub sport: String,
    pub courts: Vec<CourtId>,
    pub start_date: NaiveDate,
}

/// Source of booked/blocked slots.
#[async_trait]
pub trait AvailabilityFetcher: Send + Sync {
    /// Slots the service reports as unavailable in the week starting at `request.start_date`.
    async fn fetch_unavailable(&self, request: &WindowRequest) -> WatchResult<SlotSet>;
}

/// Persistence for the single live snapshot.
pub trait SnapshotStore: Send + Sync {
    /// Read the last snapshot, dropping slots dated before `today`.
    ///
    /// A missing or unreadable snapshot yields an empty one; this never fails.
    fn load(&self, today: NaiveDate) -> Snapshot;

    /// Replace the stored snapshot. A concurrent reader sees either the old or the new one.
    fn save(&self, snapshot: &Snapshot) -> WatchResult<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    /// No endpoint configured.
    Skipped,
    Failed,
}

/// Formats and sends slot announcements.
#[async_trait]
pub trait Notifier: Send + Sync {
    fn format(&self, slots: &SlotSet, courts: &CourtRegistry) -> String;

    /// Single delivery attempt. Failures are reported, never raised.
    async fn deliver(&self, text: &str) -> DeliveryOutcome;
}
