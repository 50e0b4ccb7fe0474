//! Core types and configuration for the wxtrack forecast accuracy tracker.
//!
//! Everything here is shared by the provider, accuracy, and store crates:
//! the region catalog, the five tracked metrics, observation records, the
//! comparison/summary shapes persisted to disk, and the immutable runtime
//! configuration.

pub mod config;
pub mod types;

pub use config::{Config, MetricThresholds, ProviderConfig, ValidationResult};
pub use types::{
    round1, round2, AccuracyResult, DayResult, Metric, MetricComparison, MetricSet,
    MetricSummary, ObservationDocument, ObservationKind, ObservationRecord, Region,
    RegionComparison, SummaryEntry, SummaryFeed,
};

use anyhow::Result;

/// Initialize tracing for the process.
///
/// Honors `RUST_LOG`; defaults to `info`.
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::debug!("wxtrack core initialized");
    Ok(())
}
