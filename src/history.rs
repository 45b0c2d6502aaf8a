//! Bounded in-memory observation history.
//!
//! The store is process-lifetime memory only. It is constructed once at
//! startup and handed to the HTTP layer behind an `Arc`; nothing reaches it
//! through a global.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::model::Observation;

/// Default number of observations retained.
pub const DEFAULT_CAPACITY: usize = 500;

/// Append-only sequence of observations with oldest-first eviction.
///
/// `len() <= capacity()` holds after every call. Append and trim happen under
/// a single lock acquisition, so concurrent `record` calls never evict based
/// on a stale length.
#[derive(Debug)]
pub struct HistoryStore {
    capacity: usize,
    observations: Mutex<VecDeque<Observation>>,
}

impl HistoryStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            observations: Mutex::new(VecDeque::new()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Appends an observation, evicting the oldest one if the store is full.
    pub fn record(&self, observation: Observation) {
        let mut observations = self.lock();
        observations.push_back(observation);
        while observations.len() > self.capacity {
            observations.pop_front();
        }
    }

    /// Returns every observation with `timestamp >= since`, oldest first.
    ///
    /// Timestamps compare as strings; `since` must use the same ISO 8601
    /// layout as the stored timestamps.
    pub fn query(&self, since: &str) -> Vec<Observation> {
        self.lock()
            .iter()
            .filter(|obs| obs.timestamp.as_str() >= since)
            .cloned()
            .collect()
    }

    /// Copy of the full history, oldest first.
    pub fn snapshot(&self) -> Vec<Observation> {
        self.lock().iter().cloned().collect()
    }

    // The sequence is valid after any panic mid-`record` (push then pop), so a
    // poisoned lock is still safe to read.
    fn lock(&self) -> MutexGuard<'_, VecDeque<Observation>> {
        self.observations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
