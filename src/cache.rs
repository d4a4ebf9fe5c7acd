//! Per-target Result Cache
//!
//! Keeps the last successful measurement of every target seen by the exporter.
//! Entries are keyed by the target string alone, so requests for the same host
//! on a different port or thread count share one entry until it goes stale.
//!
//! # Locking
//!
//! The map itself sits behind a short-lived `std` mutex that is only held to
//! look up or insert an entry. Each entry carries its own `tokio` mutex, which a
//! collection session holds across the whole stale-check / probe / update
//! sequence. This gives at most one in-flight probe per target while probes
//! against different targets run concurrently.
//!
//! Entries are never evicted; the monitored target set is expected to be small
//! and operator-controlled.

use crate::probe::ProbeResult;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::Mutex as AsyncMutex;
use tokio::time::Instant;

/// Default TTL when `CACHE_TIME` is absent or unparsable.
pub const DEFAULT_CACHE_TIME: Duration = Duration::from_secs(60 * 60);

/// Last measurement recorded for one target.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheEntry {
    /// `None` until the first successful probe, which makes a fresh entry stale.
    pub last_measurement: Option<Instant>,
    pub thread: u32,
    pub sent_seconds: f64,
    pub sent_bytes: f64,
    pub received_seconds: f64,
    pub received_bytes: f64,
}

impl CacheEntry {
    pub fn is_stale(&self, now: Instant, ttl: Duration) -> bool {
        match self.last_measurement {
            Some(at) => now.saturating_duration_since(at) >= ttl,
            None => true,
        }
    }

    /// Overwrite the entry with a fresh probe result taken at `now`.
    pub fn record(&mut self, thread: u32, result: &ProbeResult, now: Instant) {
        self.thread = thread;
        self.sent_seconds = result.sent_seconds;
        self.sent_bytes = result.sent_bytes;
        self.received_seconds = result.received_seconds;
        self.received_bytes = result.received_bytes;
        self.last_measurement = Some(now);
    }
}

pub type SharedEntry = Arc<AsyncMutex<CacheEntry>>;

/// Process-wide store of [`CacheEntry`] values keyed by target.
#[derive(Debug)]
pub struct ResultCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, SharedEntry>>,
}

impl ResultCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the entry for `target`, inserting an already-stale one if absent.
    pub fn get_or_create(&self, target: &str) -> SharedEntry {
        // The map is only ever mutated by inserting default entries, so a
        // poisoned lock still guards a consistent map.
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries
            .entry(target.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(CacheEntry::default())))
            .clone()
    }

    /// Number of targets seen so far.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TIME)
    }
}

/// Resolve the TTL from the `CACHE_TIME` value, an integer count of minutes.
///
/// Absent or unparsable values fall back to [`DEFAULT_CACHE_TIME`]; negative
/// values mean every scrape refreshes.
pub fn cache_time_from_minutes(raw: Option<&str>) -> Duration {
    match raw.map(|v| v.trim().parse::<i64>()) {
        Some(Ok(minutes)) => {
            Duration::from_secs(minutes.max(0).unsigned_abs().saturating_mul(60))
        }
        _ => DEFAULT_CACHE_TIME,
    }
}
