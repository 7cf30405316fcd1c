use thiserror::Error;

#[derive(Error, Debug)]
pub enum WatchError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Delivery error: {0}")]
    Delivery(String),

    #[error("Internal error: {0}")]
    Internal(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl From<std::io::Error> for WatchError {
    fn from(err: std::io::Error) -> Self {
        WatchError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for WatchError {
    fn from(err: serde_json::Error) -> Self {
        WatchError::Parse(err.to_string())
    }
}

pub type WatchResult<T> = Result<T, WatchError>;
