//! Bounded in-process cache with per-entry expiry.
//!
//! Owned by whoever builds it and passed in explicitly; there is no global
//! instance. Time comes from a [`Clock`] so tests can step it by hand.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::debug;

pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

struct Entry<V> {
    value: V,
    expires_at: Instant,
    last_used: AtomicU64,
}

impl<V> Entry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at <= now
    }
}

/// LRU cache with an entry limit and a fixed time-to-live.
///
/// Entries are sharded; recency is a per-entry stamp from a shared counter,
/// so reads never block each other. Under concurrent inserts the limit may be
/// overshot briefly.
pub struct TtlCache<V> {
    entries: DashMap<String, Entry<V>>,
    tick: AtomicU64,
    max_entries: usize,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> TtlCache<V> {
    /// `max_entries` is raised to 1 and `ttl` to one second if smaller.
    #[must_use]
    pub fn new(max_entries: usize, ttl: Duration) -> Self {
        Self::with_clock(max_entries, ttl, Arc::new(SystemClock))
    }

    #[must_use]
    pub fn with_clock(max_entries: usize, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            tick: AtomicU64::new(0),
            max_entries: max_entries.max(1),
            ttl: ttl.max(Duration::from_secs(1)),
            clock,
        }
    }

    fn next_tick(&self) -> u64 {
        self.tick.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Returns a live entry and marks it most recently used.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();

        match self.entries.get(key) {
            None => {
                debug!(key, "cache miss");
                return None;
            }
            Some(entry) if !entry.is_expired(now) => {
                entry.last_used.store(self.next_tick(), Ordering::Relaxed);
                debug!(key, "cache hit");
                return Some(entry.value.clone());
            }
            Some(_) => {}
        }

        self.entries.remove_if(key, |_, e| e.is_expired(now));
        debug!(key, "cache entry expired");
        None
    }

    /// Inserts or replaces `key`, evicting the least recently used entry when full.
    pub fn set(&self, key: impl Into<String>, value: V) {
        let now = self.clock.now();
        let key = key.into();

        if !self.entries.contains_key(&key) {
            self.entries.retain(|_, e| !e.is_expired(now));
            while self.entries.len() >= self.max_entries {
                let oldest = self
                    .entries
                    .iter()
                    .min_by_key(|e| e.last_used.load(Ordering::Relaxed))
                    .map(|e| e.key().clone());
                let Some(oldest) = oldest else {
                    break;
                };
                self.entries.remove(&oldest);
            }
        }

        self.entries.insert(
            key,
            Entry {
                value,
                expires_at: now + self.ttl,
                last_used: AtomicU64::new(self.next_tick()),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

#[cfg(test)]
pub(crate) use manual_clock::ManualClock;

#[cfg(test)]
mod manual_clock {
    use std::sync::Mutex;
    use std::time::{Duration, Instant};

    use super::Clock;

    /// Clock that only moves when told to.
    #[derive(Debug)]
    pub struct ManualClock {
        now: Mutex<Instant>,
    }

    impl Default for ManualClock {
        fn default() -> Self {
            Self {
                now: Mutex::new(Instant::now()),
            }
        }
    }

    impl ManualClock {
        pub fn advance(&self, by: Duration) {
            *self.now.lock().unwrap() += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            *self.now.lock().unwrap()
        }
    }
}
