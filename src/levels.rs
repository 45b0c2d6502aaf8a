//! AQI severity scale and classification.
//!
//! Defines the six US EPA AQI bands used throughout the service. This is the
//! single source of truth for band bounds, labels, and colors; the HTTP layer
//! serves `SEVERITY_LEVELS` as-is for the client legend.

use serde::Serialize;

// ---------------------------------------------------------------------------
// Severity bands
// ---------------------------------------------------------------------------

/// One band of the AQI scale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeverityLevel {
    /// Inclusive AQI ceiling for this band.
    pub upper_bound: u32,
    pub label: &'static str,
    /// Display color as a hex string.
    pub color: &'static str,
    pub recommendation: &'static str,
}

/// All bands, ordered by ascending `upper_bound`.
///
/// The last entry doubles as the catch-all for readings above its bound, so
/// the scale covers every non-negative AQI.
pub static SEVERITY_LEVELS: [SeverityLevel; 6] = [
    SeverityLevel {
        upper_bound: 50,
        label: "Good",
        color: "#00e400",
        recommendation: "Air quality is satisfactory. Enjoy outdoor activities.",
    },
    SeverityLevel {
        upper_bound: 100,
        label: "Moderate",
        color: "#ffff00",
        recommendation: "Unusually sensitive people should consider reducing \
                         prolonged or heavy exertion outdoors.",
    },
    SeverityLevel {
        upper_bound: 150,
        label: "Unhealthy for Sensitive Groups",
        color: "#ff7e00",
        recommendation: "Children, older adults, and people with heart or lung \
                         disease should reduce prolonged or heavy exertion outdoors.",
    },
    SeverityLevel {
        upper_bound: 200,
        label: "Unhealthy",
        color: "#ff0000",
        recommendation: "Everyone should reduce prolonged or heavy exertion. \
                         Sensitive groups should avoid it.",
    },
    SeverityLevel {
        upper_bound: 300,
        label: "Very Unhealthy",
        color: "#8f3f97",
        recommendation: "Everyone should avoid prolonged or heavy exertion. \
                         Sensitive groups should stay indoors.",
    },
    SeverityLevel {
        upper_bound: 500,
        label: "Hazardous",
        color: "#7e0023",
        recommendation: "Health warning of emergency conditions. Everyone \
                         should avoid all outdoor activity.",
    },
];

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Returns the band for an AQI value.
///
/// Scans in ascending order and returns the first band whose inclusive upper
/// bound is >= `aqi`, so exact bounds (50, 100, ...) stay in the lower band.
/// Anything above the last bound lands in the last band.
pub fn classify(aqi: u32) -> &'static SeverityLevel {
    SEVERITY_LEVELS
        .iter()
        .find(|level| aqi <= level.upper_bound)
        .unwrap_or(&SEVERITY_LEVELS[SEVERITY_LEVELS.len() - 1])
}

/// The full ordered band list, for rendering a legend.
pub fn all_levels() -> &'static [SeverityLevel] {
    &SEVERITY_LEVELS
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
