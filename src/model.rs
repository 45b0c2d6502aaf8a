//! Core data types for the air quality service.
//!
//! This module defines the shared domain model imported by all other modules.
//! It contains no I/O, only types and the error taxonomy.

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

use crate::levels::SeverityLevel;

// ---------------------------------------------------------------------------
// Observation types
// ---------------------------------------------------------------------------

/// A single AQI reading as kept by the history store.
///
/// `timestamp` is the UTC recording time in the layout produced by
/// `lookup::format_timestamp` (e.g. "2024-05-01T12:00:00.000Z"), so plain
/// string comparison orders observations chronologically.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    pub city: String,
    pub aqi: u32,
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: String,
    pub dominant_pollutant: Option<String>,
}

/// Observations falling on one calendar day, with their rounded mean AQI.
///
/// Derived on demand by `analysis::daily::aggregate_by_day`; never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyBucket {
    pub date: String, // YYYY-MM-DD
    pub avg_aqi: u32,
    pub observations: Vec<Observation>,
}

/// A successful provider lookup, before classification.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderReading {
    pub aqi: u32,
    pub city: String,
    /// Provider pollutant code, e.g. "pm25", "o3".
    pub dominant_pollutant: Option<String>,
    /// Per-pollutant sub-indices keyed by pollutant code.
    pub pollutants: BTreeMap<String, f64>,
    /// Observation time reported by the provider, ISO 8601 with offset.
    pub observed_at: Option<String>,
    /// Coordinates of the reporting station, when the provider includes them.
    pub station: Option<(f64, f64)>,
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// Result of `GET /api/aqi`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AqiReport {
    pub city: String,
    pub aqi: u32,
    pub level: &'static SeverityLevel,
    pub dominant_pollutant: Option<String>,
    pub pollutants: BTreeMap<String, f64>,
    pub observed_at: Option<String>,
    /// Coordinates of the station that produced the reading, `[lat, lon]`.
    pub station: Option<(f64, f64)>,
    pub latitude: f64,
    pub longitude: f64,
    pub recorded_at: String,
}

/// Result of `GET /api/history`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryReport {
    pub days: u32,
    pub daily: Vec<DailyBucket>,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Ways the AQI provider lookup can fail. None of these leave a trace in the
/// history store.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UpstreamError {
    /// The request never produced a response (DNS, connect, timeout).
    #[error("request failed: {0}")]
    Request(String),
    /// Non-2xx HTTP response from the provider.
    #[error("HTTP error: {0}")]
    Http(u16),
    /// The response body was not the payload we expect.
    #[error("parse error: {0}")]
    Parse(String),
    /// The provider answered with a status other than "ok".
    #[error("provider status {status}: {detail}")]
    Status { status: String, detail: String },
}

/// Request-scoped errors reported to API callers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AqiError {
    /// A query parameter failed type or range validation.
    #[error("invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },
    /// The AQI provider failed or returned an unusable payload.
    #[error("upstream failure: {0}")]
    Upstream(#[from] UpstreamError),
}

impl AqiError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        AqiError::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    /// Short machine-readable kind, used in API error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            AqiError::InvalidInput { .. } => "invalid_input",
            AqiError::Upstream(_) => "upstream_failure",
        }
    }
}
