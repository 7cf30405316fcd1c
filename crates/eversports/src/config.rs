use eyre::{eyre, Result, WrapErr};
use std::env;
use std::time::Duration;

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 20;

/// Configuration for the booking-service client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Slot endpoint of the booking service (required)
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl ClientConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("BASE_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| eyre!("BASE_URL environment variable not set"))?;

        let timeout_seconds = match lookup("HTTP_TIMEOUT_SECONDS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .wrap_err("HTTP_TIMEOUT_SECONDS must be a valid number")?,
            None => DEFAULT_TIMEOUT_SECONDS,
        };

        Ok(Self {
            base_url: base_url.trim().to_string(),
            timeout: Duration::from_secs(timeout_seconds),
        })
    }
}
