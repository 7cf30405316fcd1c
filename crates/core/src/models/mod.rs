pub mod court;
pub mod decision;
pub mod slot;
pub mod snapshot;

pub use court::CourtRegistry;
pub use decision::{Evaluation, NotificationDecision, SuppressionReason};
pub use slot::{CourtId, Slot, SlotRecord, SlotSet};
pub use snapshot::{Snapshot, SnapshotMeta};
