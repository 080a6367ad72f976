use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use log::debug;
use tokio::sync::Mutex;

use crate::models::FetchResult;

/// A stored result. Immutable; replaced wholesale, never mutated.
#[derive(Clone, Debug)]
pub struct CacheEntry {
    pub key: String,
    pub result: FetchResult,
    pub expires_at: DateTime<Utc>,
    /// Cache generation the fetch started in.
    pub generation: u64,
}

impl CacheEntry {
    /// Valid up to and including `expires_at`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now <= self.expires_at
    }
}

/// Process-wide result cache.
///
/// Reads go straight to the entry map and never wait on a network call.
/// Writers for the same key serialize on that key's in-flight lock.
/// Expired entries are left in place until replaced or invalidated.
///
/// Every invalidation starts a new generation. Entries stored by a fetch that
/// began in an earlier generation are never served.
#[derive(Debug, Default)]
pub struct ResultCache {
    entries: DashMap<String, Arc<CacheEntry>>,
    in_flight: DashMap<String, Arc<Mutex<()>>>,
    generation: AtomicU64,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entry for `key` if it has not expired at `now`.
    pub fn get_valid(&self, key: &str, now: DateTime<Utc>) -> Option<Arc<CacheEntry>> {
        let entry = self.entries.get(key).map(|e| Arc::clone(e.value()))?;
        if entry.generation != self.generation() {
            debug!("Cache entry for '{}' predates the last invalidation", key);
            None
        } else if entry.is_valid_at(now) {
            Some(entry)
        } else {
            debug!("Cache entry for '{}' expired at {}", key, entry.expires_at);
            None
        }
    }

    /// Current cache generation.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Store a result fetched in `generation`, replacing any previous entry
    /// for the key.
    pub fn store(
        &self,
        key: &str,
        result: FetchResult,
        expires_at: DateTime<Utc>,
        generation: u64,
    ) {
        debug!("Caching '{}' from {} until {}", key, result.source_label, expires_at);
        self.entries.insert(
            key.to_string(),
            Arc::new(CacheEntry {
                key: key.to_string(),
                result,
                expires_at,
                generation,
            }),
        );
    }

    /// Drop every entry and start a new generation. Returns the number of
    /// entries removed.
    pub fn invalidate_all(&self) -> usize {
        self.generation.fetch_add(1, Ordering::SeqCst);
        let count = self.entries.len();
        self.entries.clear();
        self.in_flight.retain(|_, lock| Arc::strong_count(lock) > 1);
        count
    }

    /// Lock serializing live fetches for one key.
    pub fn flight_lock(&self, key: &str) -> Arc<Mutex<()>> {
        Arc::clone(
            self.in_flight
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .value(),
        )
    }

    /// Forget the in-flight lock for `key` once nobody holds or waits on it.
    ///
    /// Callers must drop their own handle from [`flight_lock`](Self::flight_lock) first.
    pub fn release_flight(&self, key: &str) {
        self.in_flight
            .remove_if(key, |_, lock| Arc::strong_count(lock) == 1);
    }

    /// Number of keys with a live in-flight lock.
    pub fn in_flight_len(&self) -> usize {
        self.in_flight.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
