//! In-process TTL cache for hot read paths (settings, catalog).

use std::{
    sync::RwLock,
    time::{Duration, Instant},
};

use rustc_hash::FxHashMap;
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

/// How long site settings stay cached.
pub const SETTINGS_TTL: Duration = Duration::from_secs(300);

/// How long catalog reads stay cached.
pub const CATALOG_TTL: Duration = Duration::from_secs(60);

#[derive(Debug)]
struct CacheEntry {
    expires_at: Instant,
    value: serde_json::Value,
}

/// String-keyed cache with a per-entry expiry. Values are held as JSON.
#[derive(Debug, Default)]
pub struct TtlCache {
    entries: RwLock<FxHashMap<String, CacheEntry>>,
}

impl TtlCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch a live entry, or `None` if it is missing, expired or of another shape.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let entries = self.entries.read().ok()?;
        let entry = entries.get(key)?;

        if entry.expires_at <= Instant::now() {
            return None;
        }

        serde_json::from_value(entry.value.clone()).ok()
    }

    /// Store `value` under `key` for `ttl`. Expired entries are pruned on write.
    pub fn set<T: Serialize>(&self, key: impl Into<String>, value: &T, ttl: Duration) {
        let key = key.into();

        let value = match serde_json::to_value(value) {
            Ok(value) => value,
            Err(error) => {
                warn!(%key, %error, "skipping cache write for unserializable value");
                return;
            }
        };

        let Ok(mut entries) = self.entries.write() else {
            return;
        };

        let now = Instant::now();

        entries.retain(|_, entry| entry.expires_at > now);
        entries.insert(
            key,
            CacheEntry {
                expires_at: now + ttl,
                value,
            },
        );
    }

    /// Drop every entry whose key starts with `prefix`.
    pub fn invalidate_prefix(&self, prefix: &str) {
        if let Ok(mut entries) = self.entries.write() {
            entries.retain(|key, _| !key.starts_with(prefix));

            debug!(%prefix, "invalidated cache prefix");
        }
    }

    /// Drop every entry.
    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
    }
}
