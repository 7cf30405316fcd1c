//! Discord delivery for slot announcements.
//!
//! Messages are plain webhook posts; there is no bot connection. When no
//! webhook is configured every delivery is skipped with a log line.

pub mod config;
pub mod format;
pub mod webhook;

pub use config::NotifierConfig;
pub use format::format_slot_message;
pub use webhook::DiscordWebhook;
