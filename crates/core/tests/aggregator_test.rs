use chrono::{NaiveDate, TimeZone};
use chrono_tz::Europe::Berlin;
use courtwatch_core::{
    aggregator::{compute_available, horizon_last_day, HorizonPlan},
    errors::WatchError,
    mock::MockSlotFetcher,
    models::{CourtRegistry, Slot, SlotSet},
    traits::WindowRequest,
    universe::BusinessHours,
};
use mockall::predicate;
use pretty_assertions::assert_eq;

fn slot(date: &str, time: &str, court: u32) -> Slot {
    Slot::parse(date, time, court).expect("valid slot")
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn plan(weeks: u32) -> HorizonPlan {
    let mut courts = CourtRegistry::new();
    courts.insert(100676, "Court 1");
    courts.insert(100677, "Court 2");
    HorizonPlan {
        facility_id: 76443,
        sport: "padel".to_string(),
        courts,
        horizon_weeks: weeks,
        business_hours: BusinessHours::new(8, 10).unwrap(),
    }
}

#[test]
fn test_window_starts_are_weekly_from_today() {
    let starts = plan(3).window_starts(date(2025, 1, 10));

    assert_eq!(starts, vec![date(2025, 1, 10), date(2025, 1, 17), date(2025, 1, 24)]);
    assert_eq!(horizon_last_day(date(2025, 1, 10), 3), date(2025, 1, 30));
    assert_eq!(horizon_last_day(date(2025, 1, 10), 6), date(2025, 2, 20));
}

#[tokio::test]
async fn test_compute_available_subtracts_unavailable_from_universe() {
    let mut fetcher = MockSlotFetcher::new();
    fetcher
        .expect_fetch_unavailable()
        .withf(|request| {
            request.facility_id == 76443
                && request.sport == "padel"
                && request.courts == vec![100676, 100677]
        })
        .times(2)
        .returning(|request| {
            if request.start_date == NaiveDate::from_ymd_opt(2025, 1, 10).unwrap() {
                // Booked slot plus one outside the generated grid
                Ok([
                    Slot::parse("2025-01-10", "0900", 100676).unwrap(),
                    Slot::parse("2025-01-10", "0730", 100676).unwrap(),
                ]
                .into_iter()
                .collect())
            } else {
                Ok(SlotSet::new())
            }
        });

    let now = Berlin.with_ymd_and_hms(2025, 1, 10, 7, 0, 0).unwrap();
    let availability = compute_available(&fetcher, &plan(2), now).await;

    // 14 days x 3 hours x 2 courts, minus the one booked grid slot
    assert_eq!(availability.available.len(), 14 * 3 * 2 - 1);
    assert!(!availability.available.contains(&slot("2025-01-10", "0900", 100676)));
    assert!(availability.available.contains(&slot("2025-01-10", "0900", 100677)));
    assert!(availability.available.contains(&slot("2025-01-23", "1000", 100677)));
    assert!(!availability.available.contains(&slot("2025-01-24", "0800", 100676)));
    assert_eq!(availability.windows, 2);
    assert_eq!(availability.failed_windows, 0);
    assert!(!availability.is_total_failure());
}

#[tokio::test]
async fn test_failed_window_is_reported_fully_open() {
    let mut fetcher = MockSlotFetcher::new();
    fetcher
        .expect_fetch_unavailable()
        .with(predicate::function(|request: &WindowRequest| {
            request.courts == vec![100676, 100677]
        }))
        .times(2)
        .returning(|request| {
            if request.start_date == NaiveDate::from_ymd_opt(2025, 1, 10).unwrap() {
                Ok([Slot::parse("2025-01-11", "0800", 100676).unwrap()].into_iter().collect())
            } else {
                Err(WatchError::Fetch("HTTP 503".to_string()))
            }
        });

    let now = Berlin.with_ymd_and_hms(2025, 1, 10, 7, 0, 0).unwrap();
    let availability = compute_available(&fetcher, &plan(2), now).await;

    assert_eq!(availability.failed_windows, 1);
    assert!(!availability.is_total_failure());
    assert!(!availability.available.contains(&slot("2025-01-11", "0800", 100676)));
    // Second week failed, so all of it counts as available
    assert!(availability.available.contains(&slot("2025-01-20", "0900", 100676)));
}

#[tokio::test]
async fn test_total_failure_yields_empty_set() {
    let mut fetcher = MockSlotFetcher::new();
    fetcher
        .expect_fetch_unavailable()
        .times(6)
        .returning(|_| Err(WatchError::Fetch("connection refused".to_string())));

    let now = Berlin.with_ymd_and_hms(2025, 1, 10, 7, 0, 0).unwrap();
    let availability = compute_available(&fetcher, &plan(6), now).await;

    assert!(availability.is_total_failure());
    assert!(availability.available.is_empty());
    assert_eq!(availability.windows, 6);
}

#[tokio::test]
async fn test_horizon_is_anchored_at_local_date() {
    let mut fetcher = MockSlotFetcher::new();
    fetcher
        .expect_fetch_unavailable()
        .times(1)
        .withf(|request| request.start_date == NaiveDate::from_ymd_opt(2025, 1, 11).unwrap())
        .returning(|_| Ok(SlotSet::new()));

    // 23:30 UTC on the 10th is already the 11th in Berlin
    let now = chrono::Utc
        .with_ymd_and_hms(2025, 1, 10, 23, 30, 0)
        .unwrap()
        .with_timezone(&Berlin);
    let availability = compute_available(&fetcher, &plan(1), now).await;

    assert!(availability.available.contains(&slot("2025-01-11", "0800", 100676)));
    assert!(!availability.available.contains(&slot("2025-01-10", "0800", 100676)));
}
