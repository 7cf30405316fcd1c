//! Availability fetcher backed by the court-booking service's public slot endpoint.

pub mod client;
pub mod config;

pub use client::{query_params, EversportsClient, SlotsResponse};
pub use config::ClientConfig;
