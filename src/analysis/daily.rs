//! Per-day aggregation of observations.

use std::collections::BTreeMap;

use crate::model::{DailyBucket, Observation};

/// Groups observations by the date portion of their timestamp and averages
/// the AQI within each day.
///
/// The date key is the first 10 characters of the ISO 8601 timestamp
/// (`YYYY-MM-DD`), so buckets follow the timestamp's own offset rather than
/// any local calendar. Buckets come back in ascending date order; within a
/// bucket, observations keep their input order. Empty input yields no buckets.
pub fn aggregate_by_day(observations: &[Observation]) -> Vec<DailyBucket> {
    let mut by_date: BTreeMap<&str, Vec<Observation>> = BTreeMap::new();
    for obs in observations {
        by_date
            .entry(date_key(&obs.timestamp))
            .or_default()
            .push(obs.clone());
    }

    by_date
        .into_iter()
        .map(|(date, observations)| DailyBucket {
            date: date.to_string(),
            avg_aqi: rounded_mean(&observations),
            observations,
        })
        .collect()
}

fn date_key(timestamp: &str) -> &str {
    timestamp.get(..10).unwrap_or(timestamp)
}

/// Arithmetic mean AQI, rounded half away from zero. Zero for an empty slice.
fn rounded_mean(observations: &[Observation]) -> u32 {
    if observations.is_empty() {
        return 0;
    }
    let total: u64 = observations.iter().map(|o| u64::from(o.aqi)).sum();
    (total as f64 / observations.len() as f64).round() as u32
}
