//! # Availability Aggregation
//!
//! Builds the current set of bookable slots over the tracking horizon.
//!
//! The booking service only reports slots that are taken or blocked, so the
//! bookable grid is generated locally and the reported slots are subtracted:
//!
//! 1. For each of `horizon_weeks` consecutive 7-day windows starting today
//!    (in the courts' timezone), ask the fetcher for unavailable slots
//! 2. Generate the full slot universe for every day of that window
//! 3. Return `universe - unavailable`
//!
//! A window whose fetch fails contributes no unavailable slots, so all of its
//! universe shows up as available. When every window fails the result is
//! empty instead, and the cycle is reported as a total failure.

use chrono::{DateTime, Days, NaiveDate};
use chrono_tz::Tz;
use tracing::{debug, warn};

use crate::config::WatchConfig;
use crate::models::{CourtRegistry, SlotSet};
use crate::traits::{AvailabilityFetcher, WindowRequest};
use crate::universe::{day_universe, BusinessHours};

pub const DAYS_PER_WINDOW: u64 = 7;

/// What to aggregate: which courts, how far ahead, which hours.
#[derive(Debug, Clone)]
pub struct HorizonPlan {
    pub facility_id: u64,
    pub sport: String,
    pub courts: CourtRegistry,
    pub horizon_weeks: u32,
    pub business_hours: BusinessHours,
}

impl From<&WatchConfig> for HorizonPlan {
    fn from(config: &WatchConfig) -> Self {
        Self {
            facility_id: config.facility_id,
            sport: config.sport.clone(),
            courts: config.courts.clone(),
            horizon_weeks: config.horizon_weeks,
            business_hours: config.business_hours,
        }
    }
}

impl HorizonPlan {
    /// First day of every query window, starting at `today`.
    pub fn window_starts(&self, today: NaiveDate) -> Vec<NaiveDate> {
        (0..u64::from(self.horizon_weeks))
            .filter_map(|week| today.checked_add_days(Days::new(week * DAYS_PER_WINDOW)))
            .collect()
    }

    fn request_for(&self, start_date: NaiveDate) -> WindowRequest {
        WindowRequest {
            facility_id: self.facility_id,
            sport: self.sport.clone(),
            courts: self.courts.ids().collect(),
            start_date,
        }
    }
}

/// Last calendar day covered when the horizon is anchored at `today`.
pub fn horizon_last_day(today: NaiveDate, horizon_weeks: u32) -> NaiveDate {
    let span = u64::from(horizon_weeks) * DAYS_PER_WINDOW;
    today
        .checked_add_days(Days::new(span.saturating_sub(1)))
        .unwrap_or(NaiveDate::MAX)
}

/// Result of one aggregation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Availability {
    pub available: SlotSet,
    pub windows: usize,
    pub failed_windows: usize,
}

impl Availability {
    /// No window produced data, so `available` carries no information.
    pub fn is_total_failure(&self) -> bool {
        self.windows > 0 && self.failed_windows == self.windows
    }
}

/// Compute the currently bookable slots across the whole horizon.
pub async fn compute_available(
    fetcher: &dyn AvailabilityFetcher,
    plan: &HorizonPlan,
    now: DateTime<Tz>,
) -> Availability {
    let today = now.date_naive();
    let mut unavailable = SlotSet::new();
    let mut universe = SlotSet::new();
    let mut windows = 0;
    let mut failed_windows = 0;

    for start_date in plan.window_starts(today) {
        windows += 1;
        let request = plan.request_for(start_date);

        match fetcher.fetch_unavailable(&request).await {
            Ok(slots) => {
                debug!(window = %start_date, unavailable = slots.len(), "Fetched availability window");
                unavailable.extend(slots);
            }
            Err(e) => {
                failed_windows += 1;
                warn!(window = %start_date, error = %e, "Availability fetch failed, treating window as fully open");
            }
        }

        for offset in 0..DAYS_PER_WINDOW {
            if let Some(day) = start_date.checked_add_days(Days::new(offset)) {
                universe.extend(day_universe(day, &plan.courts, plan.business_hours));
            }
        }
    }

    let mut availability = Availability {
        available: universe.difference(&unavailable),
        windows,
        failed_windows,
    };

    if availability.is_total_failure() {
        warn!(windows, "Every availability fetch failed; reporting no available slots");
        availability.available = SlotSet::new();
    }

    availability
}
