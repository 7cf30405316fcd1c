use std::collections::HashMap;
use std::time::Duration;

use chrono::NaiveDate;
use courtwatch_core::errors::WatchError;
use courtwatch_core::models::Slot;
use courtwatch_core::traits::{AvailabilityFetcher, WindowRequest};
use courtwatch_eversports::{query_params, ClientConfig, EversportsClient, SlotsResponse};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn request() -> WindowRequest {
    WindowRequest {
        facility_id: 76443,
        sport: "padel".to_string(),
        courts: vec![100676, 100677],
        start_date: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
    }
}

#[test]
fn test_query_params_repeat_courts() {
    let params = query_params(&request());

    assert_eq!(
        params,
        vec![
            ("facilityId", "76443".to_string()),
            ("sport", "padel".to_string()),
            ("startDate", "2025-01-10".to_string()),
            ("courts[]", "100676".to_string()),
            ("courts[]", "100677".to_string()),
        ]
    );
}

#[test]
fn test_response_parses_booked_slots() {
    let body = r#"{
        "slots": [
            {"date": "2025-01-10", "start": "1000", "court": 100676, "title": "Booked"},
            {"date": "2025-01-11", "start": "0800", "court": 100677}
        ]
    }"#;

    let slots = serde_json::from_str::<SlotsResponse>(body).unwrap().into_slot_set();

    assert_eq!(slots.len(), 2);
    assert!(slots.contains(&Slot::parse("2025-01-10", "1000", 100676).unwrap()));
    assert!(slots.contains(&Slot::parse("2025-01-11", "0800", 100677).unwrap()));
}

#[rstest]
#[case("{}", 0)]
#[case(r#"{"slots": []}"#, 0)]
#[case(r#"{"slots": [{"date": "10.01.2025", "start": "1000", "court": 1}, {"date": "2025-01-10", "start": "1000", "court": 1}]}"#, 1)]
fn test_response_tolerates_missing_and_malformed(#[case] body: &str, #[case] expected: usize) {
    let slots = serde_json::from_str::<SlotsResponse>(body).unwrap().into_slot_set();
    assert_eq!(slots.len(), expected);
}

#[test]
fn test_client_config_from_lookup() {
    let env = HashMap::from([("BASE_URL", " https://booking.example/api/slot ")]);
    let config = ClientConfig::from_lookup(|key| env.get(key).map(|v| v.to_string())).unwrap();

    assert_eq!(config.base_url, "https://booking.example/api/slot");
    assert_eq!(config.timeout, Duration::from_secs(20));

    let env = HashMap::from([
        ("BASE_URL", "https://booking.example/api/slot"),
        ("HTTP_TIMEOUT_SECONDS", "5"),
    ]);
    let config = ClientConfig::from_lookup(|key| env.get(key).map(|v| v.to_string())).unwrap();
    assert_eq!(config.timeout, Duration::from_secs(5));
}

#[rstest]
#[case(&[])]
#[case(&[("BASE_URL", "   ")])]
#[case(&[("BASE_URL", "https://booking.example"), ("HTTP_TIMEOUT_SECONDS", "soon")])]
fn test_client_config_rejects_bad_values(#[case] pairs: &[(&str, &str)]) {
    let env: HashMap<&str, &str> = pairs.iter().copied().collect();
    assert!(ClientConfig::from_lookup(|key| env.get(key).map(|v| v.to_string())).is_err());
}

#[tokio::test]
async fn test_unreachable_service_is_a_fetch_error() {
    let config = ClientConfig {
        base_url: "http://127.0.0.1:9/api/slot".to_string(),
        timeout: Duration::from_secs(2),
    };
    let client = EversportsClient::new(&config).unwrap();

    let result = client.fetch_unavailable(&request()).await;

    assert!(matches!(result, Err(WatchError::Fetch(_))));
}
