use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use log::warn;

/// Key-value store with a time-to-live per entry.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Returns the value when present and not expired.
    async fn get(&self, key: &str) -> Option<Value>;

    async fn set(&self, key: &str, value: Value, ttl: Duration);

    async fn invalidate(&self, key: &str);

    /// Drops every entry whose key starts with `prefix`.
    async fn invalidate_prefix(&self, prefix: &str);
}

/// Returns the cached value for `key` or computes, stores and returns it.
///
/// Entries that no longer deserialize into `T` are recomputed. Errors are
/// returned as-is and never cached.
pub async fn get_or_compute<T, E, F, Fut>(
    cache: &dyn CacheStore,
    key: &str,
    ttl: Duration,
    compute: F,
) -> std::result::Result<T, E>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = std::result::Result<T, E>>,
{
    if let Some(cached) = cache.get(key).await {
        if let Ok(value) = serde_json::from_value::<T>(cached) {
            return Ok(value);
        }
    }
    let value = compute().await?;
    match serde_json::to_value(&value) {
        Ok(json) => cache.set(key, json, ttl).await,
        Err(e) => warn!("Not caching '{}': {}", key, e),
    }
    Ok(value)
}
