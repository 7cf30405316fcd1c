//! Enumerates every slot that could exist on a given day, independent of bookings.

use chrono::{NaiveDate, NaiveTime};

use crate::errors::WatchError;
use crate::models::{CourtRegistry, Slot, SlotSet};

/// Inclusive range of whole hours at which a slot may start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusinessHours {
    pub start_hour: u32,
    pub end_hour: u32,
}

impl BusinessHours {
    pub const DEFAULT: BusinessHours = BusinessHours {
        start_hour: 8,
        end_hour: 21,
    };

    pub fn new(start_hour: u32, end_hour: u32) -> Result<Self, WatchError> {
        if end_hour > 23 {
            return Err(WatchError::Config(format!(
                "DAY_END_HOUR must be between 0 and 23, got {end_hour}"
            )));
        }
        if start_hour > end_hour {
            return Err(WatchError::Config(format!(
                "DAY_START_HOUR ({start_hour}) must not be after DAY_END_HOUR ({end_hour})"
            )));
        }
        Ok(Self {
            start_hour,
            end_hour,
        })
    }

    pub fn start_times(self) -> impl Iterator<Item = NaiveTime> {
        (self.start_hour..=self.end_hour).filter_map(|hour| NaiveTime::from_hms_opt(hour, 0, 0))
    }
}

impl Default for BusinessHours {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// All slots for `date`: every hour in `hours` on every registered court.
pub fn day_universe(date: NaiveDate, courts: &CourtRegistry, hours: BusinessHours) -> SlotSet {
    courts
        .ids()
        .flat_map(move |court| {
            hours
                .start_times()
                .map(move |start| Slot::new(date, start, court))
        })
        .collect()
}
