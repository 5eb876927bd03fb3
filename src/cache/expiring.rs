use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use tracing::debug;

/// Source of the current time, injectable so tests can drive expiry.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Cache for memoizing upstream lookups with a fixed time-to-live.
#[derive(Clone)]
pub struct ExpiringCache<V> {
    /// Map of product key to (value, expires_at)
    entries: Arc<RwLock<HashMap<String, (V, DateTime<Utc>)>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> ExpiringCache<V> {
    /// Create a cache whose entries live for `ttl` after being stored.
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    /// Create a cache with an explicit clock. Tests use this to substitute
    /// a manual clock and exercise expiry without sleeping.
    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
            clock,
        }
    }

    /// Return the value stored for `key` if its expiry has not passed;
    /// otherwise invoke `fetch` and store the fresh value for the TTL.
    ///
    /// A successful fetch is always stored, including one that resolved to
    /// an absent value. A failed fetch is never stored: the error is
    /// returned as-is and the next call for the same key retries the fetch.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: &str, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        {
            let entries = self.entries.read().await;
            if let Some((value, expires_at)) = entries.get(key) {
                if self.clock.now() < *expires_at {
                    debug!(key = %key, "cache hit");
                    return Ok(value.clone());
                }
            }
        }

        // Two concurrent misses for the same key may both fetch and both
        // write. Last writer wins, which is acceptable since entries are
        // idempotent per key within a TTL window.
        let value = fetch().await?;
        let expires_at = self.clock.now() + self.ttl;

        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), (value.clone(), expires_at));
        debug!(key = %key, expires_at = %expires_at, "stored fresh value");

        Ok(value)
    }
}
