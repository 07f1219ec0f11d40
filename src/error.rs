//! Error types for the forecasting library
//!
//! Failures are split into what the marketplace collaborator reports ([`ApiError`]) and
//! what the forecasting layer reports to its callers ([`ForecastError`]). Per-cell API
//! failures during a long-term analysis never surface here; they become empty cells.

use thiserror::Error;

/// Failure reported by a [`crate::api::MarketplaceApi`] implementation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// Non-success HTTP status from the marketplace
    #[error("API Error: {status} {reason} for year {year}")]
    Status {
        status: u16,
        reason: String,
        year: i32,
    },

    /// Marketplace returned an error body with a message
    #[error("{0}")]
    Message(String),

    /// Request never completed (connection refused, DNS, TLS, ...)
    #[error("request failed: {0}")]
    Transport(String),

    /// Response body could not be decoded
    #[error("unexpected response: {0}")]
    Decode(String),
}

/// Errors surfaced to callers of the forecasting library
#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("Please enter a valid 5-digit ZIP code.")]
    InvalidZip(String),

    #[error("Could not find location data for this ZIP code.")]
    ZipNotFound(String),

    #[error("Failed to fetch location data: {0}")]
    LocationLookup(#[source] ApiError),

    #[error(
        "This tool does not support {state} as it uses a state-specific health insurance \
         marketplace. Please visit {program} ({url}) for assistance."
    )]
    UnsupportedState {
        state: String,
        program: &'static str,
        url: &'static str,
    },

    #[error("County {0} is not one of the counties for this ZIP code.")]
    UnknownCounty(String),

    #[error("Location is not set. Please select a valid ZIP code and county.")]
    LocationUnset,

    #[error("household is invalid: {}", .0.join(" "))]
    Validation(Vec<String>),

    #[error("No one in the household is eligible for coverage with the current settings.")]
    NoEligibleMembers,

    #[error("No income levels to process based on the provided range.")]
    EmptyIncomeRange,

    #[error("Income step must be greater than 0 (got {0}).")]
    InvalidIncomeStep(i64),

    #[error("Income cannot be negative (got {0}).")]
    NegativeIncome(i64),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used across the crate
pub type Result<T, E = ForecastError> = std::result::Result<T, E>;
