use async_trait::async_trait;
use dashmap::DashMap;
use log::debug;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use super::CacheStore;

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    expires_at: Instant,
}

/// Every this many writes, `set` sweeps out expired entries.
pub const PURGE_EVERY: usize = 64;

/// Process-local `CacheStore`. Expired entries are dropped on read, and
/// swept every `PURGE_EVERY` writes so keys that are never read again do
/// not pile up.
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    entries: DashMap<String, CacheEntry>,
    writes: AtomicUsize,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored entry count, expired entries included until read or swept.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn purge_expired(&self) {
        let now = Instant::now();
        self.entries.retain(|_, entry| entry.expires_at > now);
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> Option<Value> {
        let now = Instant::now();
        let hit = self
            .entries
            .get(key)
            .map(|entry| (entry.expires_at > now, entry.value.clone()));
        match hit {
            Some((true, value)) => Some(value),
            Some((false, _)) => {
                self.entries.remove(key);
                debug!("Cache entry '{}' expired", key);
                None
            }
            None => None,
        }
    }

    async fn set(&self, key: &str, value: Value, ttl: Duration) {
        let written = self.writes.fetch_add(1, Ordering::Relaxed) + 1;
        if written % PURGE_EVERY == 0 {
            let before = self.entries.len();
            self.purge_expired();
            debug!(
                "Swept {} expired cache entries",
                before.saturating_sub(self.entries.len())
            );
        }
        let expires_at = Instant::now() + ttl;
        self.entries
            .insert(key.to_string(), CacheEntry { value, expires_at });
    }

    async fn invalidate(&self, key: &str) {
        self.entries.remove(key);
    }

    async fn invalidate_prefix(&self, prefix: &str) {
        self.entries.retain(|key, _| !key.starts_with(prefix));
    }
}
