//! Air quality lookup service.
//!
//! Fetches the AQI for a coordinate from the WAQI provider, classifies it on
//! the six-band EPA scale, keeps a bounded in-memory history, and serves all
//! of it over a small JSON API.

pub mod analysis;
pub mod config;
pub mod history;
pub mod ingest;
pub mod levels;
pub mod logging;
pub mod lookup;
pub mod model;
pub mod server;
