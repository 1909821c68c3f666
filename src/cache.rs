//! In-memory TTL cache for per-pair insight bundles.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::insights::InsightBundle;

/// Unordered pair of user ids; `PairKey::new(a, b) == PairKey::new(b, a)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PairKey {
    low: String,
    high: String,
}

impl PairKey {
    pub fn new(a: &str, b: &str) -> Self {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        Self {
            low: low.to_string(),
            high: high.to_string(),
        }
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.low, self.high)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

struct CachedBundle {
    bundle: Arc<InsightBundle>,
    inserted_at: DateTime<Utc>,
    seq: u64,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<PairKey, CachedBundle>,
    next_seq: u64,
}

pub struct InsightCache {
    ttl: Duration,
    capacity: usize,
    clock: Arc<dyn Clock>,
    state: Mutex<CacheState>,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl InsightCache {
    /// A capacity of zero disables caching.
    pub fn new(ttl: Duration, capacity: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            capacity,
            clock,
            state: Mutex::new(CacheState::default()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Entries older than the TTL are dropped on read.
    pub fn get(&self, key: &PairKey) -> Option<Arc<InsightBundle>> {
        let now = self.clock.now();
        let Ok(mut state) = self.state.lock() else {
            warn!("insight cache lock poisoned; treating as miss");
            self.misses.fetch_add(1, Ordering::Relaxed);
            return None;
        };

        let fresh = match state.entries.get(key) {
            Some(entry) if now - entry.inserted_at < self.ttl => Some(Arc::clone(&entry.bundle)),
            Some(_) => {
                state.entries.remove(key);
                None
            }
            None => None,
        };

        match fresh {
            Some(bundle) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(bundle)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// At capacity, expired entries go first, then the oldest insertion.
    pub fn insert(&self, key: PairKey, bundle: Arc<InsightBundle>) {
        if self.capacity == 0 {
            return;
        }
        let now = self.clock.now();
        let Ok(mut state) = self.state.lock() else {
            warn!("insight cache lock poisoned; skipping insert");
            return;
        };

        if !state.entries.contains_key(&key) && state.entries.len() >= self.capacity {
            let removed = purge(&mut state, now, self.ttl);
            self.evictions.fetch_add(removed as u64, Ordering::Relaxed);
            let mut evicted = removed;
            while state.entries.len() >= self.capacity {
                let oldest = state
                    .entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.seq)
                    .map(|(k, _)| k.clone());
                match oldest {
                    Some(k) => {
                        state.entries.remove(&k);
                        self.evictions.fetch_add(1, Ordering::Relaxed);
                        evicted += 1;
                    }
                    None => break,
                }
            }
            debug!(evicted, capacity = self.capacity, "insight cache full");
        }

        let seq = state.next_seq;
        state.next_seq += 1;
        state.entries.insert(
            key,
            CachedBundle {
                bundle,
                inserted_at: now,
                seq,
            },
        );
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        match self.state.lock() {
            Ok(mut state) => purge(&mut state, now, self.ttl),
            Err(_) => 0,
        }
    }

    pub fn len(&self) -> usize {
        self.state.lock().map(|s| s.entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.entries.clear();
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }
}

fn purge(state: &mut CacheState, now: DateTime<Utc>, ttl: Duration) -> usize {
    let before = state.entries.len();
    state.entries.retain(|_, entry| now - entry.inserted_at < ttl);
    before - state.entries.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::insights::fallback_bundle;
    use chrono::TimeZone;

    fn setup(capacity: usize) -> (Arc<ManualClock>, InsightCache) {
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 10, 1, 0, 0, 0).unwrap()));
        let cache = InsightCache::new(Duration::hours(1), capacity, clock.clone());
        (clock, cache)
    }

    fn bundle() -> Arc<InsightBundle> {
        Arc::new(fallback_bundle(Utc::now()))
    }

    #[test]
    fn pair_key_is_unordered() {
        assert_eq!(PairKey::new("u2", "u1"), PairKey::new("u1", "u2"));
        assert_eq!(PairKey::new("u2", "u1").to_string(), "u1|u2");
    }

    #[test]
    fn hit_returns_same_allocation() {
        let (_, cache) = setup(4);
        let b = bundle();
        cache.insert(PairKey::new("a", "b"), Arc::clone(&b));
        let hit = cache.get(&PairKey::new("b", "a")).unwrap();
        assert!(Arc::ptr_eq(&hit, &b));
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn entries_expire_at_ttl() {
        let (clock, cache) = setup(4);
        cache.insert(PairKey::new("a", "b"), bundle());
        clock.advance(Duration::minutes(59));
        assert!(cache.get(&PairKey::new("a", "b")).is_some());
        clock.advance(Duration::minutes(1));
        assert!(cache.get(&PairKey::new("a", "b")).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn capacity_evicts_expired_then_oldest() {
        let (clock, cache) = setup(2);
        cache.insert(PairKey::new("a", "b"), bundle());
        clock.advance(Duration::minutes(90));
        cache.insert(PairKey::new("c", "d"), bundle());
        cache.insert(PairKey::new("e", "f"), bundle());
        assert_eq!(cache.len(), 2);
        assert!(cache.get(&PairKey::new("c", "d")).is_some());

        cache.insert(PairKey::new("g", "h"), bundle());
        assert_eq!(cache.len(), 2);
        assert!(cache.get(&PairKey::new("c", "d")).is_none());
        assert!(cache.get(&PairKey::new("g", "h")).is_some());
        assert_eq!(cache.stats().evictions, 2);
    }

    #[test]
    fn purge_expired_drops_only_stale_entries() {
        let (clock, cache) = setup(8);
        cache.insert(PairKey::new("a", "b"), bundle());
        clock.advance(Duration::minutes(30));
        cache.insert(PairKey::new("c", "d"), bundle());
        clock.advance(Duration::minutes(45));

        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&PairKey::new("c", "d")).is_some());
    }

    #[test]
    fn zero_capacity_disables_caching() {
        let (_, cache) = setup(0);
        cache.insert(PairKey::new("a", "b"), bundle());
        assert!(cache.get(&PairKey::new("a", "b")).is_none());
    }
}
