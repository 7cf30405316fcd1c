use std::sync::Arc;

use color_eyre::eyre::Result;
use courtwatch_core::config::{log_level_from_env, WatchConfig};
use courtwatch_core::watcher::Watcher;
use courtwatch_discord::{DiscordWebhook, NotifierConfig};
use courtwatch_eversports::{ClientConfig, EversportsClient};
use tracing::info;
use tracing_subscriber::FmtSubscriber;

/// Install logging at the level named by `LOG_LEVEL`.
pub fn init_tracing() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level_from_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Load every configuration section and connect the collaborators.
///
/// Any missing or malformed setting is returned as an error before the first cycle.
pub fn build_watcher() -> Result<(Watcher, NotifierConfig)> {
    let watch_config = WatchConfig::from_env()?;
    let client_config = ClientConfig::from_env()?;
    let notifier_config = NotifierConfig::from_env()?;

    info!(
        courts = watch_config.courts.len(),
        horizon_weeks = watch_config.horizon_weeks,
        gate = %watch_config.gate_policy,
        timezone = %watch_config.timezone,
        "Configuration loaded"
    );

    let fetcher = Arc::new(EversportsClient::new(&client_config)?);
    let store = Arc::new(courtwatch_store::store_for(&watch_config));
    let notifier = DiscordWebhook::new(notifier_config.clone())?;
    if !notifier.is_enabled() {
        info!("Discord webhook URL not configured. Notifications will be skipped.");
    }

    let watcher = Watcher::new(watch_config, fetcher, store, Arc::new(notifier));
    Ok((watcher, notifier_config))
}
