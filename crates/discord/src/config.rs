use eyre::{Result, WrapErr};
use serde::Deserialize;
use std::env;
use std::time::Duration;

/// Value shipped in the sample `.env`; treated the same as an unset URL.
pub const PLACEHOLDER_WEBHOOK_URL: &str = "your_discord_webhook_url_here";

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 20;

/// Configuration for slot notifications.
///
/// Delivery is disabled, not an error, when no webhook is configured.
#[derive(Debug, Clone, Deserialize)]
pub struct NotifierConfig {
    /// Discord webhook receiving the messages (optional)
    pub webhook_url: Option<String>,
    /// Link appended to every slot announcement (optional)
    pub booking_url: Option<String>,
    /// Timeout for a single delivery attempt, in seconds
    pub timeout_seconds: u64,
    /// Post a short message when the watcher starts
    pub heartbeat_on_startup: bool,
}

impl NotifierConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let webhook_url = lookup("DISCORD_WEBHOOK_URL");
        let booking_url = lookup("BOOKING_URL").filter(|url| !url.trim().is_empty());

        let timeout_seconds = match lookup("HTTP_TIMEOUT_SECONDS") {
            Some(raw) => raw
                .trim()
                .parse()
                .wrap_err("HTTP_TIMEOUT_SECONDS must be a valid number")?,
            None => DEFAULT_TIMEOUT_SECONDS,
        };

        let heartbeat_on_startup = lookup("HEARTBEAT_ON_STARTUP")
            .map(|raw| matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            webhook_url,
            booking_url,
            timeout_seconds,
            heartbeat_on_startup,
        })
    }

    /// The webhook URL, unless it is unset, blank or the placeholder.
    pub fn webhook(&self) -> Option<&str> {
        self.webhook_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty() && *url != PLACEHOLDER_WEBHOOK_URL)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}
