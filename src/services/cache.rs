//! Bounded in-memory response cache with per-entry TTL and LRU eviction.
//!
//! Entries are `serde_json::Value` so any HR payload can be stored without a
//! type per resource. Expired entries are dropped lazily on `get` and by
//! `cleanup_expired`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::domain::models::CacheConfig;

/// Cache key builders for HR resources.
pub struct CacheKeys;

impl CacheKeys {
    pub fn employee(employee_id: i64) -> String {
        format!("employee:{employee_id}")
    }

    pub fn shift(shift_id: i64) -> String {
        format!("shift:{shift_id}")
    }

    pub fn availability(employee_id: i64, date: &str) -> String {
        format!("availability:{employee_id}:{date}")
    }

    pub fn fatigue(employee_id: i64) -> String {
        format!("fatigue:{employee_id}")
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    created_at: Instant,
    ttl: Duration,
    hit_count: u64,
    last_access: u64,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.created_at) > self.ttl
    }
}

/// Snapshot of cache counters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub size: usize,
    pub max_size: usize,
    pub hit_rate_percent: f64,
}

#[derive(Debug, Default)]
struct CacheInner {
    entries: HashMap<String, CacheEntry>,
    /// Keys by last access tick, oldest first.
    recency: BTreeMap<u64, String>,
    hits: u64,
    misses: u64,
    evictions: u64,
    /// Monotonic access clock for recency ordering.
    tick: u64,
}

impl CacheInner {
    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    fn insert(&mut self, key: String, entry: CacheEntry) {
        self.recency.insert(entry.last_access, key.clone());
        if let Some(previous) = self.entries.insert(key, entry) {
            self.recency.remove(&previous.last_access);
        }
    }

    fn remove(&mut self, key: &str) -> Option<CacheEntry> {
        let entry = self.entries.remove(key)?;
        self.recency.remove(&entry.last_access);
        Some(entry)
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.recency.clear();
    }

    fn evict_lru(&mut self) {
        if let Some((_, key)) = self.recency.pop_first() {
            self.entries.remove(&key);
            self.evictions += 1;
            debug!(key = %key, "Evicted least recently used cache entry");
        }
    }
}

/// Thread-safe TTL + LRU cache.
#[derive(Debug)]
pub struct ResponseCache {
    inner: Mutex<CacheInner>,
    max_size: usize,
    default_ttl: Duration,
}

impl ResponseCache {
    pub fn new(max_size: usize, default_ttl: Duration) -> Self {
        Self {
            inner: Mutex::new(CacheInner::default()),
            max_size: max_size.max(1),
            default_ttl,
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(
            config.max_size,
            Duration::from_secs(config.default_ttl_secs),
        )
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CacheInner> {
        // A panic while holding the lock cannot leave the map half-updated.
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Look up a live entry. Expired entries are removed and count as a miss.
    pub fn get(&self, key: &str) -> Option<Value> {
        let now = Instant::now();
        let mut inner = self.lock();
        let tick = inner.next_tick();

        let previous_access = match inner.entries.get_mut(key) {
            None => {
                inner.misses += 1;
                debug!(key, "Cache miss");
                return None;
            }
            Some(entry) if entry.is_expired(now) => None,
            Some(entry) => {
                entry.hit_count += 1;
                Some(std::mem::replace(&mut entry.last_access, tick))
            }
        };

        match previous_access {
            Some(previous) => {
                inner.recency.remove(&previous);
                inner.recency.insert(tick, key.to_string());
                inner.hits += 1;
                debug!(key, "Cache hit");
                inner.entries.get(key).map(|entry| entry.value.clone())
            }
            None => {
                inner.remove(key);
                inner.misses += 1;
                debug!(key, "Cache entry expired");
                None
            }
        }
    }

    /// Insert or refresh an entry. `ttl` of `None` uses the default TTL.
    pub fn set(&self, key: impl Into<String>, value: Value, ttl: Option<Duration>) {
        let key = key.into();
        let mut inner = self.lock();
        let tick = inner.next_tick();

        if !inner.entries.contains_key(&key) && inner.entries.len() >= self.max_size {
            inner.evict_lru();
        }

        inner.insert(
            key,
            CacheEntry {
                value,
                created_at: Instant::now(),
                ttl: ttl.unwrap_or(self.default_ttl),
                hit_count: 0,
                last_access: tick,
            },
        );
    }

    /// Remove an entry. Returns true if it was present.
    pub fn delete(&self, key: &str) -> bool {
        self.lock().remove(key).is_some()
    }

    /// Remove every entry. Counters are kept.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Drop all expired entries and return how many were removed.
    pub fn cleanup_expired(&self) -> usize {
        let now = Instant::now();
        let mut inner = self.lock();
        let expired: Vec<String> = inner
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &expired {
            inner.remove(key);
        }
        let removed = expired.len();
        if removed > 0 {
            debug!(removed, "Swept expired cache entries");
        }
        removed
    }

    pub fn stats(&self) -> CacheStats {
        let inner = self.lock();
        let lookups = inner.hits + inner.misses;
        let hit_rate_percent = if lookups == 0 {
            0.0
        } else {
            (inner.hits as f64 / lookups as f64 * 10_000.0).round() / 100.0
        };

        CacheStats {
            hits: inner.hits,
            misses: inner.misses,
            evictions: inner.evictions,
            size: inner.entries.len(),
            max_size: self.max_size,
            hit_rate_percent,
        }
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default())
    }
}
