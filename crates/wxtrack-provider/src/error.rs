use thiserror::Error;

/// Weather provider errors.
///
/// All of these are recovered per region: the caller logs the failure and
/// continues with the rest of the catalog.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Network error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Provider returned status {status}")]
    Status { status: u16 },

    #[error("Malformed provider response: {0}")]
    Malformed(String),

    #[error("Target date {date} not found in response dates {available:?}")]
    DateNotFound { date: String, available: Vec<String> },
}
