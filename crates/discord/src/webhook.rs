use async_trait::async_trait;
use serde_json::json;
use tracing::{error, info};

use courtwatch_core::models::{CourtRegistry, SlotSet};
use courtwatch_core::traits::{DeliveryOutcome, Notifier};

use crate::config::NotifierConfig;
use crate::format::format_slot_message;

/// Posts messages to a Discord webhook. One attempt per message, no retries.
#[derive(Debug, Clone)]
pub struct DiscordWebhook {
    http: reqwest::Client,
    config: NotifierConfig,
}

impl DiscordWebhook {
    pub fn new(config: NotifierConfig) -> eyre::Result<Self> {
        let http = reqwest::Client::builder().timeout(config.timeout()).build()?;
        Ok(Self { http, config })
    }

    pub fn is_enabled(&self) -> bool {
        self.config.webhook().is_some()
    }

    pub fn config(&self) -> &NotifierConfig {
        &self.config
    }
}

#[async_trait]
impl Notifier for DiscordWebhook {
    fn format(&self, slots: &SlotSet, courts: &CourtRegistry) -> String {
        format_slot_message(slots, courts, self.config.booking_url.as_deref())
    }

    async fn deliver(&self, text: &str) -> DeliveryOutcome {
        let Some(url) = self.config.webhook() else {
            info!("Discord webhook URL not configured. Skipping notification.");
            return DeliveryOutcome::Skipped;
        };

        let result = self
            .http
            .post(url)
            .json(&json!({ "content": text }))
            .send()
            .await
            .and_then(|response| response.error_for_status());

        match result {
            Ok(_) => {
                info!("Discord message sent successfully!");
                DeliveryOutcome::Delivered
            }
            Err(e) => {
                error!("Failed to send Discord message: {e}");
                DeliveryOutcome::Failed
            }
        }
    }
}
