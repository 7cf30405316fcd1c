//! Poll timing: interval, random jitter and the nightly quiet window.
//!
//! `PollSchedule` is pure arithmetic over instants; `PollTicker` turns it into
//! tick events through the `Clock` and `Sleeper` seams so loops can be driven
//! without real delays.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Days, NaiveTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use rand::Rng;
use tracing::info;

use crate::clock::Clock;
use crate::config::WatchConfig;
use crate::errors::WatchError;

/// Local hours during which no check should start, `[start_hour, end_hour)`.
///
/// Wraps midnight when `start_hour > end_hour` (e.g. `22-6`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuietHours {
    pub start_hour: u32,
    pub end_hour: u32,
}

impl QuietHours {
    pub fn new(start_hour: u32, end_hour: u32) -> Result<Self, WatchError> {
        if start_hour > 23 || end_hour > 23 {
            return Err(WatchError::Config(format!(
                "QUIET_HOURS bounds must be between 0 and 23, got {start_hour}-{end_hour}"
            )));
        }
        Ok(Self {
            start_hour,
            end_hour,
        })
    }

    pub fn contains(&self, hour: u32) -> bool {
        if self.start_hour <= self.end_hour {
            (self.start_hour..self.end_hour).contains(&hour)
        } else {
            hour >= self.start_hour || hour < self.end_hour
        }
    }
}

impl FromStr for QuietHours {
    type Err = WatchError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || WatchError::Config(format!("QUIET_HOURS must look like '0-7', got {raw:?}"));
        let (start, end) = raw.trim().split_once('-').ok_or_else(invalid)?;
        let start = start.trim().parse().map_err(|_| invalid())?;
        let end = end.trim().parse().map_err(|_| invalid())?;
        QuietHours::new(start, end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSchedule {
    pub interval: Duration,
    pub jitter_max: Duration,
    pub quiet_hours: Option<QuietHours>,
    pub timezone: Tz,
}

impl From<&WatchConfig> for PollSchedule {
    fn from(config: &WatchConfig) -> Self {
        Self {
            interval: config.poll_interval,
            jitter_max: config.poll_jitter,
            quiet_hours: config.quiet_hours,
            timezone: config.timezone,
        }
    }
}

impl PollSchedule {
    /// Delay before the next check, given the jitter drawn for this round.
    pub fn next_delay(&self, now: DateTime<Utc>, jitter: Duration) -> Duration {
        let base = self.interval + jitter;
        let wake = chrono::Duration::from_std(base)
            .ok()
            .and_then(|offset| now.checked_add_signed(offset))
            .unwrap_or(now);
        base.max(self.until_quiet_end(now, wake))
    }

    /// Delay before the very first check: zero unless started inside quiet hours.
    pub fn initial_delay(&self, now: DateTime<Utc>) -> Duration {
        self.until_quiet_end(now, now)
    }

    /// Time from `now` until `wake` leaves the quiet window, or zero if `wake` is outside it.
    fn until_quiet_end(&self, now: DateTime<Utc>, wake: DateTime<Utc>) -> Duration {
        let Some(quiet) = self.quiet_hours else {
            return Duration::ZERO;
        };
        let local = wake.with_timezone(&self.timezone);
        if !quiet.contains(local.hour()) {
            return Duration::ZERO;
        }

        let Some(end_time) = NaiveTime::from_hms_opt(quiet.end_hour, 0, 0) else {
            return Duration::ZERO;
        };
        let mut end = local.date_naive().and_time(end_time);
        if end <= local.naive_local() {
            end = match end.checked_add_days(Days::new(1)) {
                Some(next) => next,
                None => return Duration::ZERO,
            };
        }

        self.timezone
            .from_local_datetime(&end)
            .earliest()
            .map(|resume| resume.with_timezone(&Utc) - now)
            .and_then(|delay| delay.to_std().ok())
            .unwrap_or(Duration::ZERO)
    }
}

/// Something that can wait. Real loops use tokio's timer; tests record the requests.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Yields one tick per poll cycle. The first tick is immediate outside quiet hours.
pub struct PollTicker<C, S> {
    schedule: PollSchedule,
    clock: C,
    sleeper: S,
    ticks: u64,
}

impl<C: Clock, S: Sleeper> PollTicker<C, S> {
    pub fn new(schedule: PollSchedule, clock: C, sleeper: S) -> Self {
        Self {
            schedule,
            clock,
            sleeper,
            ticks: 0,
        }
    }

    /// Wait for the next cycle and return the instant it starts at.
    pub async fn tick(&mut self) -> DateTime<Utc> {
        let now = self.clock.now();
        let delay = if self.ticks == 0 {
            self.schedule.initial_delay(now)
        } else {
            self.schedule.next_delay(now, random_jitter(self.schedule.jitter_max))
        };

        if !delay.is_zero() {
            info!("Waiting for {:.2} minutes before next check...", delay.as_secs_f64() / 60.0);
            self.sleeper.sleep(delay).await;
        }

        self.ticks += 1;
        self.clock.now()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

fn random_jitter(max: Duration) -> Duration {
    if max.is_zero() {
        return Duration::ZERO;
    }
    Duration::from_secs(rand::thread_rng().gen_range(0..=max.as_secs()))
}
