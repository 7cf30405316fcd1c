use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Europe::Berlin;
use courtwatch_core::{
    clock::{Clock, FixedClock},
    schedule::{PollSchedule, PollTicker, QuietHours, Sleeper},
};
use pretty_assertions::assert_eq;
use rstest::rstest;

const MINUTE: Duration = Duration::from_secs(60);

fn berlin_utc(d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Berlin
        .with_ymd_and_hms(2025, 1, d, h, min, 0)
        .unwrap()
        .with_timezone(&Utc)
}

fn schedule(quiet_hours: Option<QuietHours>) -> PollSchedule {
    PollSchedule {
        interval: 10 * MINUTE,
        jitter_max: Duration::ZERO,
        quiet_hours,
        timezone: Berlin,
    }
}

#[rstest]
#[case("0-7", 0, 7)]
#[case(" 22 - 6 ", 22, 6)]
fn test_quiet_hours_parse(#[case] raw: &str, #[case] start: u32, #[case] end: u32) {
    let quiet: QuietHours = raw.parse().expect("valid quiet hours");
    assert_eq!(quiet, QuietHours { start_hour: start, end_hour: end });
}

#[rstest]
#[case("7")]
#[case("a-b")]
#[case("0-24")]
fn test_quiet_hours_rejects_malformed(#[case] raw: &str) {
    assert!(raw.parse::<QuietHours>().is_err());
}

#[rstest]
#[case(QuietHours { start_hour: 0, end_hour: 7 }, 3, true)]
#[case(QuietHours { start_hour: 0, end_hour: 7 }, 7, false)]
#[case(QuietHours { start_hour: 22, end_hour: 6 }, 23, true)]
#[case(QuietHours { start_hour: 22, end_hour: 6 }, 5, true)]
#[case(QuietHours { start_hour: 22, end_hour: 6 }, 12, false)]
#[case(QuietHours { start_hour: 4, end_hour: 4 }, 4, false)]
fn test_quiet_hours_contains(#[case] quiet: QuietHours, #[case] hour: u32, #[case] expected: bool) {
    assert_eq!(quiet.contains(hour), expected);
}

#[test]
fn test_next_delay_is_interval_plus_jitter() {
    let now = berlin_utc(10, 12, 0);

    assert_eq!(schedule(None).next_delay(now, Duration::ZERO), 10 * MINUTE);
    assert_eq!(
        schedule(None).next_delay(now, Duration::from_secs(45)),
        10 * MINUTE + Duration::from_secs(45)
    );
}

#[test]
fn test_next_delay_skips_quiet_hours() {
    let quiet = Some(QuietHours { start_hour: 0, end_hour: 7 });
    let now = berlin_utc(10, 23, 55);

    // Waking at 00:05 would be inside quiet hours, so sleep until 07:00
    assert_eq!(schedule(quiet).next_delay(now, Duration::ZERO), 7 * 60 * MINUTE + 5 * MINUTE);
    assert_eq!(schedule(quiet).next_delay(berlin_utc(10, 12, 0), Duration::ZERO), 10 * MINUTE);
}

#[test]
fn test_initial_delay_only_inside_quiet_hours() {
    let quiet = Some(QuietHours { start_hour: 0, end_hour: 7 });

    assert_eq!(schedule(quiet).initial_delay(berlin_utc(10, 12, 0)), Duration::ZERO);
    assert_eq!(schedule(quiet).initial_delay(berlin_utc(10, 3, 0)), 4 * 60 * MINUTE);
}

/// Clock shared between the ticker and the sleeper so sleeping moves time forward.
struct SharedClock(Arc<FixedClock>);

impl Clock for SharedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0.now()
    }
}

struct RecordingSleeper {
    clock: Arc<FixedClock>,
    requested: Arc<Mutex<Vec<Duration>>>,
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.requested.lock().unwrap().push(duration);
        self.clock
            .advance(chrono::Duration::from_std(duration).unwrap());
    }
}

#[test_log::test(tokio::test)]
async fn test_ticker_first_tick_is_immediate_then_follows_schedule() {
    let clock = Arc::new(FixedClock::new(berlin_utc(10, 12, 0)));
    let requested = Arc::new(Mutex::new(Vec::new()));
    let sleeper = RecordingSleeper {
        clock: clock.clone(),
        requested: requested.clone(),
    };
    let mut ticker = PollTicker::new(schedule(None), SharedClock(clock.clone()), sleeper);

    let first = ticker.tick().await;
    let second = ticker.tick().await;
    let third = ticker.tick().await;

    assert_eq!(first, berlin_utc(10, 12, 0));
    assert_eq!(second, berlin_utc(10, 12, 10));
    assert_eq!(third, berlin_utc(10, 12, 20));
    assert_eq!(*requested.lock().unwrap(), vec![10 * MINUTE, 10 * MINUTE]);
    assert_eq!(ticker.ticks(), 3);
}

#[test_log::test(tokio::test)]
async fn test_ticker_jitter_stays_within_bounds() {
    let clock = Arc::new(FixedClock::new(berlin_utc(10, 12, 0)));
    let requested = Arc::new(Mutex::new(Vec::new()));
    let sleeper = RecordingSleeper {
        clock: clock.clone(),
        requested: requested.clone(),
    };
    let jittered = PollSchedule {
        jitter_max: Duration::from_secs(30),
        ..schedule(None)
    };
    let mut ticker = PollTicker::new(jittered, SharedClock(clock), sleeper);

    for _ in 0..20 {
        ticker.tick().await;
    }

    for delay in requested.lock().unwrap().iter() {
        assert!(*delay >= 10 * MINUTE);
        assert!(*delay <= 10 * MINUTE + Duration::from_secs(30));
    }
}

#[test]
fn test_ticker_starts_late_inside_quiet_hours() {
    let clock = Arc::new(FixedClock::new(berlin_utc(10, 3, 0)));
    let requested = Arc::new(Mutex::new(Vec::new()));
    let sleeper = RecordingSleeper {
        clock: clock.clone(),
        requested: requested.clone(),
    };
    let quiet = Some(QuietHours { start_hour: 0, end_hour: 7 });
    let mut ticker = PollTicker::new(schedule(quiet), SharedClock(clock), sleeper);

    let first = tokio_test::block_on(ticker.tick());

    assert_eq!(first, berlin_utc(10, 7, 0));
    assert_eq!(*requested.lock().unwrap(), vec![4 * 60 * MINUTE]);
}
