//! World Air Quality Index (WAQI) API client.
//!
//! Retrieves the current AQI for the monitoring station nearest a coordinate
//! using the geo feed endpoint.
//!
//! API documentation: https://aqicn.org/json-api/doc/
//! Geo feed: https://api.waqi.info/feed/geo:{lat};{lon}/?token={token}

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use super::AqiProvider;
use crate::config::ProviderConfig;
use crate::model::{ProviderReading, UpstreamError};

pub const WAQI_BASE_URL: &str = "https://api.waqi.info";

// ============================================================================
// WAQI API Response Structures
// ============================================================================

/// Outer envelope. `data` is an object when `status` is "ok" and an error
/// message string otherwise.
#[derive(Debug, Deserialize)]
struct FeedEnvelope {
    status: String,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Deserialize)]
struct FeedData {
    /// Usually an integer; "-" when the station has no current reading.
    aqi: Value,
    city: FeedCity,
    /// Provider spelling.
    #[serde(rename = "dominentpol")]
    dominant_pollutant: Option<String>,
    #[serde(default)]
    iaqi: BTreeMap<String, FeedIaqi>,
    time: Option<FeedTime>,
}

#[derive(Debug, Deserialize)]
struct FeedCity {
    name: String,
    #[serde(default)]
    geo: Vec<Value>,
}

/// Individual pollutant sub-index
#[derive(Debug, Deserialize)]
struct FeedIaqi {
    v: Value,
}

#[derive(Debug, Deserialize)]
struct FeedTime {
    iso: Option<String>,
}

// ============================================================================
// URL Construction and Parsing
// ============================================================================

/// Builds the geo feed URL for a coordinate.
pub fn build_feed_url(base_url: &str, latitude: f64, longitude: f64, token: &str) -> String {
    format!(
        "{}/feed/geo:{};{}/?token={}",
        base_url.trim_end_matches('/'),
        latitude,
        longitude,
        token
    )
}

/// Parses a geo feed response body.
///
/// Fails with `UpstreamError::Status` when the provider reports anything
/// other than "ok", and with `UpstreamError::Parse` when the payload is not
/// JSON, lacks required fields, or carries an AQI that is not a non-negative
/// integer.
pub fn parse_feed_response(body: &str) -> Result<ProviderReading, UpstreamError> {
    let envelope: FeedEnvelope =
        serde_json::from_str(body).map_err(|e| UpstreamError::Parse(e.to_string()))?;

    if envelope.status != "ok" {
        let detail = match envelope.data {
            Value::String(message) => message,
            Value::Null => String::new(),
            other => other.to_string(),
        };
        return Err(UpstreamError::Status {
            status: envelope.status,
            detail,
        });
    }

    let data: FeedData =
        serde_json::from_value(envelope.data).map_err(|e| UpstreamError::Parse(e.to_string()))?;

    let aqi = data
        .aqi
        .as_u64()
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| UpstreamError::Parse(format!("aqi is not a non-negative integer: {}", data.aqi)))?;

    let pollutants = data
        .iaqi
        .into_iter()
        .filter_map(|(code, sub)| sub.v.as_f64().map(|v| (code, v)))
        .collect();

    let station = match data.city.geo.as_slice() {
        [lat, lon] => coordinate(lat).zip(coordinate(lon)),
        _ => None,
    };

    Ok(ProviderReading {
        aqi,
        city: data.city.name,
        dominant_pollutant: data.dominant_pollutant.filter(|p| !p.is_empty()),
        pollutants,
        observed_at: data.time.and_then(|t| t.iso),
        station,
    })
}

/// Station coordinates arrive as numbers or numeric strings.
fn coordinate(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

// ============================================================================
// API Client
// ============================================================================

/// Async WAQI client.
pub struct WaqiClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl WaqiClient {
    pub fn new(config: &ProviderConfig) -> reqwest::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            token: config.token.clone(),
        })
    }
}

impl AqiProvider for WaqiClient {
    async fn fetch(&self, latitude: f64, longitude: f64) -> Result<ProviderReading, UpstreamError> {
        let url = build_feed_url(&self.base_url, latitude, longitude, &self.token);
        tracing::debug!(base_url = %self.base_url, latitude, longitude, "requesting WAQI geo feed");

        // without_url keeps the token out of error messages
        let response = self
            .http
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| UpstreamError::Request(e.without_url().to_string()))?;

        if !response.status().is_success() {
            return Err(UpstreamError::Http(response.status().as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| UpstreamError::Request(e.without_url().to_string()))?;

        parse_feed_response(&body)
    }
}

// ============================================================================
// Tests
// ============================================================================
