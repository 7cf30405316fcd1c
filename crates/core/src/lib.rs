//! # Courtwatch Core
//!
//! Domain logic for watching a court-booking service for newly opened slots.
//!
//! - **Models**: slots, slot sets, the court registry, snapshots and decisions
//! - **Universe / Aggregator**: the theoretical slot grid and the current
//!   available set across the horizon
//! - **Engine**: diffing, future filtering and notification gating
//! - **Schedule**: poll timing decoupled from real time
//! - **Watcher**: one full poll cycle over the collaborator traits

pub mod aggregator;
pub mod clock;
pub mod config;
pub mod engine;
pub mod errors;
pub mod models;
pub mod schedule;
pub mod traits;
pub mod universe;
pub mod watcher;

pub mod mock;
