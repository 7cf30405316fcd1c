use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::slot::SlotSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SuppressionReason {
    NoNewFutureSlots,
    StaleCache,
    FirstOfDay,
}

impl fmt::Display for SuppressionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SuppressionReason::NoNewFutureSlots => "no-new-future-slots",
            SuppressionReason::StaleCache => "stale-cache",
            SuppressionReason::FirstOfDay => "first-of-day",
        };
        f.write_str(label)
    }
}

/// What a poll cycle should do about the slots it found. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationDecision {
    Announce(SlotSet),
    Suppress {
        reason: SuppressionReason,
        /// Future slots the gate held back; empty for `NoNewFutureSlots`.
        withheld: SlotSet,
    },
}

impl NotificationDecision {
    pub fn suppress(reason: SuppressionReason) -> Self {
        NotificationDecision::Suppress {
            reason,
            withheld: SlotSet::new(),
        }
    }

    pub fn is_announce(&self) -> bool {
        matches!(self, NotificationDecision::Announce(_))
    }

    pub fn slots(&self) -> Option<&SlotSet> {
        match self {
            NotificationDecision::Announce(slots) => Some(slots),
            NotificationDecision::Suppress { .. } => None,
        }
    }

    pub fn reason(&self) -> Option<SuppressionReason> {
        match self {
            NotificationDecision::Announce(_) => None,
            NotificationDecision::Suppress { reason, .. } => Some(*reason),
        }
    }

    /// Whether this decision moves the once-per-day gate forward.
    ///
    /// Announcements count whether or not delivery succeeds; a first-of-day
    /// suppression counts because it is what opens the gate for the rest of the day.
    pub fn stamps_gate(&self) -> bool {
        matches!(
            self,
            NotificationDecision::Announce(_)
                | NotificationDecision::Suppress {
                    reason: SuppressionReason::FirstOfDay,
                    ..
                }
        )
    }
}

/// Full result of comparing two availability snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub newly_available: SlotSet,
    pub taken: SlotSet,
    pub decision: NotificationDecision,
}
