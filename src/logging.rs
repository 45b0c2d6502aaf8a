//! Structured logging for the air quality service
//!
//! Installs the `tracing` subscriber and provides context-rich logging of
//! provider failures, tagged with the coordinate that was looked up and a
//! classification of whether the failure is expected.

use std::fmt;

use tracing_subscriber::EnvFilter;

use crate::model::UpstreamError;

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "aqi_service=info,tower_http=info";

// ---------------------------------------------------------------------------
// Subscriber
// ---------------------------------------------------------------------------

/// Initialize the global subscriber. `RUST_LOG` takes precedence over
/// `default_filter`. Safe to call more than once; later calls are ignored.
pub fn init_logging(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // try_init fails only if a subscriber is already installed
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureType {
    /// Expected failure - provider has no station or no reading for the area
    Expected,
    /// Unexpected failure - indicates provider degradation or a configuration issue
    Unexpected,
    /// Unknown - cannot determine if this is expected or not
    Unknown,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Expected => write!(f, "EXPECTED"),
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
            FailureType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Classify a provider failure.
pub fn classify_upstream_failure(err: &UpstreamError) -> FailureType {
    match err {
        // "Unknown station" and friends: nothing nearby reports
        UpstreamError::Status { detail, .. } if detail.to_ascii_lowercase().contains("unknown") => {
            FailureType::Expected
        }
        // Bad token or quota
        UpstreamError::Status { .. } => FailureType::Unexpected,
        UpstreamError::Http(code) if *code >= 500 => FailureType::Unknown,
        UpstreamError::Http(_) => FailureType::Unexpected,
        // Station reporting "-" lands here too
        UpstreamError::Parse(msg) if msg.contains("aqi is not") => FailureType::Expected,
        UpstreamError::Parse(_) => FailureType::Unexpected,
        UpstreamError::Request(_) => FailureType::Unknown,
    }
}

// ---------------------------------------------------------------------------
// Structured Failure Logging
// ---------------------------------------------------------------------------

/// Log a provider failure at a level matching its classification.
pub fn log_upstream_failure(latitude: f64, longitude: f64, err: &UpstreamError) {
    let failure_type = classify_upstream_failure(err);

    match failure_type {
        FailureType::Expected => {
            tracing::debug!(latitude, longitude, %failure_type, "AQI lookup failed: {}", err)
        }
        FailureType::Unexpected => {
            tracing::error!(latitude, longitude, %failure_type, "AQI lookup failed: {}", err)
        }
        FailureType::Unknown => {
            tracing::warn!(latitude, longitude, %failure_type, "AQI lookup failed: {}", err)
        }
    }
}
