use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use courtwatch_core::errors::{WatchError, WatchResult};
use courtwatch_core::models::{CourtId, Slot, SlotSet};
use courtwatch_core::traits::{AvailabilityFetcher, WindowRequest};

use crate::config::ClientConfig;

/// The slot endpoint rejects obvious non-browser clients.
const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Body of the slot endpoint. Only the booked/blocked slots are listed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SlotsResponse {
    #[serde(default)]
    pub slots: Vec<BookedSlot>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BookedSlot {
    pub date: String,
    pub start: String,
    pub court: CourtId,
}

impl SlotsResponse {
    /// Convert to a slot set, skipping entries with unparseable dates or times.
    pub fn into_slot_set(self) -> SlotSet {
        self.slots
            .into_iter()
            .filter_map(|booked| match Slot::parse(&booked.date, &booked.start, booked.court) {
                Ok(slot) => Some(slot),
                Err(e) => {
                    warn!("Ignoring malformed slot in response: {e}");
                    None
                }
            })
            .collect()
    }
}

/// Query string for one weekly window; courts are sent as repeated `courts[]`.
pub fn query_params(request: &WindowRequest) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("facilityId", request.facility_id.to_string()),
        ("sport", request.sport.clone()),
        ("startDate", request.start_date.format("%Y-%m-%d").to_string()),
    ];
    params.extend(request.courts.iter().map(|court| ("courts[]", court.to_string())));
    params
}

/// HTTP client for the booking service's slot endpoint.
#[derive(Debug, Clone)]
pub struct EversportsClient {
    http: reqwest::Client,
    base_url: String,
}

impl EversportsClient {
    pub fn new(config: &ClientConfig) -> eyre::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.clone(),
        })
    }
}

#[async_trait]
impl AvailabilityFetcher for EversportsClient {
    async fn fetch_unavailable(&self, request: &WindowRequest) -> WatchResult<SlotSet> {
        let response = self
            .http
            .get(&self.base_url)
            .query(&query_params(request))
            .send()
            .await
            .map_err(|e| WatchError::Fetch(format!("Error making API request: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(WatchError::Fetch(format!(
                "slot endpoint answered HTTP {status} for week of {}",
                request.start_date
            )));
        }

        let body: SlotsResponse = response
            .json()
            .await
            .map_err(|e| WatchError::Fetch(format!("unreadable slot response: {e}")))?;

        let slots = body.into_slot_set();
        debug!(start_date = %request.start_date, unavailable = slots.len(), "Slot endpoint answered");
        Ok(slots)
    }
}
