//! Synthetic tracking-event traffic for load-testing pixel ingestion services.

pub mod config;
pub mod domain;
pub mod driver;
pub mod payload;
pub mod settings;
pub mod stats;
pub mod telemetry;
pub mod transport;
