//! # Watcher Configuration
//!
//! Loads the settings the poll loop and the slot-change engine need. Values come
//! from environment variables (a `.env` file is honoured by the binaries).
//!
//! ## Environment Variables
//!
//! - `FACILITY_ID`: booking-service facility id (required)
//! - `SPORT`: sport to query (default: "padel")
//! - `COURTS`: JSON object of court id to display name (required)
//! - `POLLING_INTERVAL_MINUTES`: minutes between checks (required)
//! - `POLLING_RANDOM_DELAY_SECONDS`: upper bound of the random extra delay (required)
//! - `HORIZON_WEEKS`: weeks ahead to track (default: 6)
//! - `DAY_START_HOUR` / `DAY_END_HOUR`: first and last bookable hour (default: 8 / 21)
//! - `TIMEZONE`: IANA zone the courts live in (default: "Europe/Berlin")
//! - `CACHE_FILE_PATH`: slot snapshot file (default: "data/available_slots.json")
//! - `META_FILE_PATH`: snapshot metadata sidecar (default: cache path with `.meta.json`)
//! - `GATE_POLICY`: `cache-staleness` (default) or `once-per-day`
//! - `DAY_BOUNDARY_POLICY`: `exclude-horizon-edge` (default) or `off`
//! - `QUIET_HOURS`: optional `START-END` local hours with no checks, e.g. `0-7`
//! - `LOG_LEVEL`: logging level (default: "info")

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono_tz::Tz;
use eyre::{eyre, Result, WrapErr};
use tracing::Level;

use crate::engine::{DayBoundaryPolicy, GatePolicy};
use crate::models::CourtRegistry;
use crate::schedule::QuietHours;
use crate::universe::BusinessHours;

pub const DEFAULT_SPORT: &str = "padel";
pub const DEFAULT_TIMEZONE: &str = "Europe/Berlin";
pub const DEFAULT_CACHE_FILE_PATH: &str = "data/available_slots.json";
pub const DEFAULT_HORIZON_WEEKS: u32 = 6;

/// Everything the watcher needs, constructed once at startup and passed down.
#[derive(Debug, Clone)]
pub struct WatchConfig {
    pub facility_id: u64,
    pub sport: String,
    pub courts: CourtRegistry,
    pub poll_interval: Duration,
    /// Upper bound of the random delay added to every interval.
    pub poll_jitter: Duration,
    pub horizon_weeks: u32,
    pub business_hours: BusinessHours,
    pub timezone: Tz,
    pub cache_path: PathBuf,
    pub meta_path: PathBuf,
    pub gate_policy: GatePolicy,
    pub day_boundary: DayBoundaryPolicy,
    pub quiet_hours: Option<QuietHours>,
}

impl WatchConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Fails when a required value is missing or any value is malformed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| eyre!("{key} environment variable must be set"))
        };

        let facility_id = required("FACILITY_ID")?
            .trim()
            .parse()
            .wrap_err("FACILITY_ID must be a valid integer")?;

        let sport = lookup("SPORT").unwrap_or_else(|| DEFAULT_SPORT.to_string());

        let courts = CourtRegistry::from_json(&required("COURTS")?)?;

        let interval_minutes: u64 = required("POLLING_INTERVAL_MINUTES")?
            .trim()
            .parse()
            .wrap_err("POLLING_INTERVAL_MINUTES must be a valid number")?;
        if interval_minutes == 0 {
            return Err(eyre!("POLLING_INTERVAL_MINUTES must be greater than zero"));
        }

        let jitter_seconds: u64 = required("POLLING_RANDOM_DELAY_SECONDS")?
            .trim()
            .parse()
            .wrap_err("POLLING_RANDOM_DELAY_SECONDS must be a valid number")?;

        let horizon_weeks = parse_or(&lookup, "HORIZON_WEEKS", DEFAULT_HORIZON_WEEKS)?;
        if horizon_weeks == 0 {
            return Err(eyre!("HORIZON_WEEKS must be at least 1"));
        }

        let business_hours = BusinessHours::new(
            parse_or(&lookup, "DAY_START_HOUR", BusinessHours::DEFAULT.start_hour)?,
            parse_or(&lookup, "DAY_END_HOUR", BusinessHours::DEFAULT.end_hour)?,
        )?;

        let timezone_name = lookup("TIMEZONE").unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());
        let timezone: Tz = timezone_name
            .trim()
            .parse()
            .map_err(|e| eyre!("TIMEZONE {timezone_name:?} is not a known IANA zone: {e}"))?;

        let cache_path =
            PathBuf::from(lookup("CACHE_FILE_PATH").unwrap_or_else(|| DEFAULT_CACHE_FILE_PATH.to_string()));
        let meta_path = lookup("META_FILE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| default_meta_path(&cache_path));

        let gate_policy = match lookup("GATE_POLICY") {
            Some(raw) => raw.parse()?,
            None => GatePolicy::default(),
        };
        let day_boundary = match lookup("DAY_BOUNDARY_POLICY") {
            Some(raw) => raw.parse()?,
            None => DayBoundaryPolicy::default(),
        };
        let quiet_hours = lookup("QUIET_HOURS")
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| raw.parse::<QuietHours>())
            .transpose()?;

        Ok(Self {
            facility_id,
            sport,
            courts,
            poll_interval: Duration::from_secs(interval_minutes * 60),
            poll_jitter: Duration::from_secs(jitter_seconds),
            horizon_weeks,
            business_hours,
            timezone,
            cache_path,
            meta_path,
            gate_policy,
            day_boundary,
            quiet_hours,
        })
    }

    /// Age past which a snapshot is no longer a trustworthy baseline.
    pub fn stale_after(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.poll_interval.as_secs() as i64 * 2)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .wrap_err_with(|| format!("{key} has an invalid value {raw:?}")),
        _ => Ok(default),
    }
}

fn default_meta_path(cache_path: &Path) -> PathBuf {
    cache_path.with_extension("meta.json")
}

/// Logging level named by `LOG_LEVEL`, defaulting to `info`.
pub fn log_level_from_env() -> Level {
    match env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()).to_ascii_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}
