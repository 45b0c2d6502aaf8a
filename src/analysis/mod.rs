//! Aggregation helpers over stored observations.
//!
//! Submodules:
//! - `daily` — groups observations into per-calendar-day buckets.

pub mod daily;
