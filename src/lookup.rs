//! Lookup and history flows behind the HTTP API.
//!
//! Parameter parsing lives here rather than in the handlers so the boundary
//! rules (coordinate ranges, day clamping, AQI validation) are testable
//! without a running server.
//!
//! # Clock injection
//! `lookup_at` and `history_at` take `now` explicitly; `lookup` and `history`
//! are thin wrappers that pass `Utc::now()`.

use chrono::{Datelike, DateTime, Duration, SecondsFormat, Utc};

use crate::analysis::daily::aggregate_by_day;
use crate::history::HistoryStore;
use crate::ingest::AqiProvider;
use crate::levels::classify;
use crate::logging::log_upstream_failure;
use crate::model::{AqiError, AqiReport, HistoryReport, Observation};

// ---------------------------------------------------------------------------
// Timestamps
// ---------------------------------------------------------------------------

/// Formats a UTC instant the way observations store it,
/// e.g. "2024-05-01T12:00:00.000Z". Fixed width, so string order is time order.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

// ---------------------------------------------------------------------------
// Parameter parsing
// ---------------------------------------------------------------------------

/// Parses a latitude or longitude, which must be finite and within
/// `-limit..=limit`.
pub fn parse_coordinate(field: &'static str, raw: Option<&str>, limit: f64) -> Result<f64, AqiError> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AqiError::invalid(field, "is required"))?;

    let value: f64 = raw
        .parse()
        .map_err(|_| AqiError::invalid(field, format!("'{}' is not a number", raw)))?;

    if !value.is_finite() || value.abs() > limit {
        return Err(AqiError::invalid(
            field,
            format!("must be between -{} and {}", limit, limit),
        ));
    }
    Ok(value)
}

pub fn parse_latitude(raw: Option<&str>) -> Result<f64, AqiError> {
    parse_coordinate("lat", raw, 90.0)
}

pub fn parse_longitude(raw: Option<&str>) -> Result<f64, AqiError> {
    parse_coordinate("lon", raw, 180.0)
}

/// Clamps a requested window into `1..=max_days`.
pub fn clamp_days(requested: i64, max_days: u32) -> u32 {
    requested.clamp(1, i64::from(max_days.max(1))) as u32
}

/// Parses the `days` parameter. Missing means `default_days`; a non-integer
/// is invalid; any integer is clamped rather than rejected.
pub fn parse_days(raw: Option<&str>, default_days: u32, max_days: u32) -> Result<u32, AqiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(clamp_days(i64::from(default_days), max_days)),
        Some(raw) => raw
            .parse::<i64>()
            .map(|days| clamp_days(days, max_days))
            .map_err(|_| AqiError::invalid("days", format!("'{}' is not an integer", raw))),
    }
}

/// Parses an AQI value supplied by a caller. Negative and fractional values
/// are rejected.
pub fn parse_aqi(raw: Option<&str>) -> Result<u32, AqiError> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AqiError::invalid("aqi", "is required"))?;
    raw.parse()
        .map_err(|_| AqiError::invalid("aqi", format!("'{}' is not a non-negative integer", raw)))
}

// ---------------------------------------------------------------------------
// Flows
// ---------------------------------------------------------------------------

/// Fetches the AQI for a coordinate, classifies it, and records it.
///
/// Nothing is recorded when the provider fails; the failure is logged and
/// returned as `AqiError::Upstream`.
pub async fn lookup_at<P: AqiProvider>(
    provider: &P,
    store: &HistoryStore,
    latitude: f64,
    longitude: f64,
    now: DateTime<Utc>,
) -> Result<AqiReport, AqiError> {
    let reading = match provider.fetch(latitude, longitude).await {
        Ok(reading) => reading,
        Err(err) => {
            log_upstream_failure(latitude, longitude, &err);
            return Err(err.into());
        }
    };

    let level = classify(reading.aqi);
    let recorded_at = format_timestamp(now);

    store.record(Observation {
        city: reading.city.clone(),
        aqi: reading.aqi,
        latitude,
        longitude,
        timestamp: recorded_at.clone(),
        dominant_pollutant: reading.dominant_pollutant.clone(),
    });

    tracing::info!(
        city = %reading.city,
        aqi = reading.aqi,
        level = level.label,
        stored = store.len(),
        "recorded observation"
    );

    Ok(AqiReport {
        city: reading.city,
        aqi: reading.aqi,
        level,
        dominant_pollutant: reading.dominant_pollutant,
        pollutants: reading.pollutants,
        observed_at: reading.observed_at,
        station: reading.station,
        latitude,
        longitude,
        recorded_at,
    })
}

pub async fn lookup<P: AqiProvider>(
    provider: &P,
    store: &HistoryStore,
    latitude: f64,
    longitude: f64,
) -> Result<AqiReport, AqiError> {
    lookup_at(provider, store, latitude, longitude, Utc::now()).await
}

/// Aggregates the last `days` days of history into daily buckets.
///
/// `days` is expected to be clamped already (see `parse_days`). A window
/// starting before year 0 (or outside chrono's range) has no lower bound.
pub fn history_at(store: &HistoryStore, days: u32, now: DateTime<Utc>) -> HistoryReport {
    // RFC 3339 has no negative years; "" sorts before every stored timestamp
    let since = Duration::try_days(i64::from(days))
        .and_then(|window| now.checked_sub_signed(window))
        .filter(|start| start.year() >= 0)
        .map(format_timestamp)
        .unwrap_or_default();
    let observations = store.query(&since);
    HistoryReport {
        days,
        daily: aggregate_by_day(&observations),
    }
}

pub fn history(store: &HistoryStore, days: u32) -> HistoryReport {
    history_at(store, days, Utc::now())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    /// A fixed "now" used across tests: 2024-05-01 13:00:00 UTC.
    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 13, 0, 0).unwrap()
    }

    #[test]
    fn test_timestamp_format_is_fixed_width_utc() {
        assert_eq!(format_timestamp(fixed_now()), "2024-05-01T13:00:00.000Z");
    }

    // --- Coordinates --------------------------------------------------------

    #[test]
    fn test_valid_coordinates_parse() {
        assert_eq!(parse_latitude(Some("40.6936")), Ok(40.6936));
        assert_eq!(parse_longitude(Some(" -89.589 ")), Ok(-89.589));
        assert_eq!(parse_latitude(Some("90")), Ok(90.0));
        assert_eq!(parse_longitude(Some("-180")), Ok(-180.0));
    }

    #[test]
    fn test_out_of_range_coordinates_are_invalid() {
        assert!(parse_latitude(Some("90.01")).is_err());
        assert!(parse_longitude(Some("180.5")).is_err());
        assert!(parse_latitude(Some("NaN")).is_err());
        assert!(parse_latitude(Some("inf")).is_err());
    }

    #[test]
    fn test_missing_or_garbage_coordinates_are_invalid() {
        assert_eq!(
            parse_latitude(None),
            Err(AqiError::invalid("lat", "is required"))
        );
        assert!(parse_latitude(Some("")).is_err());
        assert!(matches!(
            parse_longitude(Some("west")),
            Err(AqiError::InvalidInput { field: "lon", .. })
        ));
    }

    // --- Days ---------------------------------------------------------------

    #[test]
    fn test_days_default_when_missing() {
        assert_eq!(parse_days(None, 7, 90), Ok(7));
        assert_eq!(parse_days(Some("  "), 7, 90), Ok(7));
    }

    #[test]
    fn test_days_are_clamped_not_rejected() {
        assert_eq!(parse_days(Some("30"), 7, 90), Ok(30));
        assert_eq!(parse_days(Some("0"), 7, 90), Ok(1));
        assert_eq!(parse_days(Some("-4"), 7, 90), Ok(1));
        assert_eq!(parse_days(Some("365"), 7, 90), Ok(90));
    }

    #[test]
    fn test_non_integer_days_are_invalid() {
        assert!(parse_days(Some("7.5"), 7, 90).is_err());
        assert!(parse_days(Some("week"), 7, 90).is_err());
    }

    #[test]
    fn test_clamp_days_with_degenerate_max() {
        assert_eq!(clamp_days(10, 0), 1);
    }

    // --- AQI ----------------------------------------------------------------

    #[test]
    fn test_parse_aqi() {
        assert_eq!(parse_aqi(Some("151")), Ok(151));
        assert_eq!(parse_aqi(Some("0")), Ok(0));
        assert!(parse_aqi(Some("-1")).is_err(), "negative AQI is rejected");
        assert!(parse_aqi(Some("42.5")).is_err(), "fractional AQI is rejected");
        assert!(parse_aqi(None).is_err());
    }

    // --- History window -----------------------------------------------------

    fn obs_at(aqi: u32, timestamp: &str) -> Observation {
        Observation {
            city: "Peoria".to_string(),
            aqi,
            latitude: 40.6936,
            longitude: -89.589,
            timestamp: timestamp.to_string(),
            dominant_pollutant: None,
        }
    }

    #[test]
    fn test_history_only_includes_the_trailing_window() {
        let store = HistoryStore::new(10);
        store.record(obs_at(100, "2024-04-20T12:00:00.000Z")); // 11 days ago
        store.record(obs_at(10, "2024-04-30T12:00:00.000Z"));
        store.record(obs_at(30, "2024-04-30T18:00:00.000Z"));
        store.record(obs_at(50, "2024-05-01T12:59:00.000Z"));

        let report = history_at(&store, 7, fixed_now());
        assert_eq!(report.days, 7);
        let summary: Vec<(String, u32)> = report
            .daily
            .iter()
            .map(|b| (b.date.clone(), b.avg_aqi))
            .collect();
        assert_eq!(
            summary,
            vec![("2024-04-30".to_string(), 20), ("2024-05-01".to_string(), 50)]
        );
    }

    #[test]
    fn test_history_window_start_is_inclusive() {
        let store = HistoryStore::new(10);
        store.record(obs_at(42, "2024-04-30T13:00:00.000Z")); // exactly 1 day ago
        let report = history_at(&store, 1, fixed_now());
        assert_eq!(report.daily.len(), 1);
    }

    #[test]
    fn test_history_window_past_the_calendar_start_includes_everything() {
        let store = HistoryStore::new(10);
        store.record(obs_at(7, "2024-04-30T12:00:00.000Z"));
        store.record(obs_at(9, "1970-01-01T00:00:00.000Z"));

        // beyond chrono's range, and inside it but before year 0
        for days in [u32::MAX, 4_000_000_000, 800_000] {
            let report = history_at(&store, days, fixed_now());
            assert_eq!(report.days, days);
            let dates: Vec<String> = report.daily.into_iter().map(|b| b.date).collect();
            assert_eq!(dates, vec!["1970-01-01", "2024-04-30"], "window of {} days", days);
        }

        let report = history_at(&store, 3650, fixed_now());
        assert_eq!(report.daily.len(), 1, "a ten-year window stops short of 1970");
    }

    #[test]
    fn test_history_of_empty_store_is_empty() {
        let report = history_at(&HistoryStore::new(10), 7, fixed_now());
        assert!(report.daily.is_empty());
    }
}
