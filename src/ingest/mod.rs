//! AQI provider clients.
//!
//! The lookup flow only depends on the `AqiProvider` trait, so tests can
//! substitute an in-memory provider for the live WAQI client.

use std::future::Future;

use crate::model::{ProviderReading, UpstreamError};

pub mod waqi;

/// A source of current AQI readings for a coordinate.
pub trait AqiProvider: Send + Sync {
    /// Fetch the current reading nearest to (`latitude`, `longitude`).
    fn fetch(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> impl Future<Output = Result<ProviderReading, UpstreamError>> + Send;
}
