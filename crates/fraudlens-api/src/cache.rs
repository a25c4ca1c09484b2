//! Time-boxed response cache
//!
//! Best-effort, never authoritative: an expired entry is treated as
//! absent and the caller refetches. Backs the slow-moving stats
//! endpoints with a two-minute window.

use std::collections::HashMap;
use std::hash::Hash;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;

struct Entry<V> {
    value: V,
    stored_at: DateTime<Utc>,
}

/// A small TTL cache keyed by endpoint identity
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: Mutex<HashMap<K, Entry<V>>>,
}

impl<K: Eq + Hash, V: Clone> TtlCache<K, V> {
    /// Create a cache whose entries live for `ttl`
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Default dashboard cache: two minutes
    pub fn dashboard() -> Self {
        Self::new(Duration::seconds(120))
    }

    /// Look up a live entry at `now`
    pub fn get(&self, key: &K, now: DateTime<Utc>) -> Option<V> {
        let entries = self.entries.lock();
        entries
            .get(key)
            .filter(|e| now - e.stored_at < self.ttl)
            .map(|e| e.value.clone())
    }

    /// Store a value at `now`, replacing any previous entry
    pub fn put(&self, key: K, value: V, now: DateTime<Utc>) {
        self.entries.lock().insert(
            key,
            Entry {
                value,
                stored_at: now,
            },
        );
    }

    /// Drop everything (used on logout / user switch)
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}
