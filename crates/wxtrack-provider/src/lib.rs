//! Observation fetcher for wxtrack.
//!
//! Turns an Open-Meteo daily+hourly response into one normalized
//! [`wxtrack_core::ObservationRecord`] per region and date. The same endpoint
//! serves both forecast and actual collection; the modes differ only in the
//! lookback window and which response index is selected.

pub mod client;
pub mod error;

pub use client::ObservationClient;
pub use error::ProviderError;
