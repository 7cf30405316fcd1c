use async_trait::async_trait;
use chrono::NaiveDate;
use mockall::mock;

use crate::errors::WatchResult;
use crate::models::{CourtRegistry, SlotSet, Snapshot};
use crate::traits::{
    AvailabilityFetcher, DeliveryOutcome, Notifier, SnapshotStore, WindowRequest,
};

// Mock collaborators for testing
mock! {
    pub SlotFetcher {}

    #[async_trait]
    impl AvailabilityFetcher for SlotFetcher {
        async fn fetch_unavailable(&self, request: &WindowRequest) -> WatchResult<SlotSet>;
    }
}

mock! {
    pub SnapshotRepo {}

    impl SnapshotStore for SnapshotRepo {
        fn load(&self, today: NaiveDate) -> Snapshot;
        fn save(&self, snapshot: &Snapshot) -> WatchResult<()>;
    }
}

mock! {
    pub SlotNotifier {}

    #[async_trait]
    impl Notifier for SlotNotifier {
        fn format(&self, slots: &SlotSet, courts: &CourtRegistry) -> String;
        async fn deliver(&self, text: &str) -> DeliveryOutcome;
    }
}
