//! Versioned K-Beauty trend data with scheduled refreshes, archiving and
//! freshness reporting.

pub mod aggregator;
pub mod api;
pub mod app;
pub mod archiver;
pub mod cli;
pub mod config;
pub mod constants;
pub mod database;
pub mod error;
pub mod freshness;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod scheduler;
pub mod setup;
pub mod sources;
pub mod store;
pub mod versioning;

#[cfg(test)]
pub mod test_utils;
