//! Time-boxed memoization for outbound fetches
//!
//! An [`ExpiringCache`] is owned by whoever performs the fetches; there is
//! no process-wide cache. The clock is injected so expiry can be tested
//! without sleeping.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, SystemTime};

/// Default freshness window for cached responses (5 minutes)
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Time source for freshness checks
pub trait Clock {
    /// Time elapsed since a fixed origin
    fn now(&self) -> Duration;
}

/// Wall clock measured from the Unix epoch
///
/// Readings stay comparable across processes, which lets entries that were
/// persisted by an earlier run be aged with the same clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default()
    }
}

#[cfg(any(test, feature = "test-util"))]
pub use manual::ManualClock;

#[cfg(any(test, feature = "test-util"))]
mod manual {
    use super::Clock;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    /// Clock that only moves when told to; clones share the same time
    ///
    /// For callers that need deterministic expiry. Enabled by the
    /// `test-util` feature.
    #[derive(Debug, Clone, Default)]
    pub struct ManualClock {
        millis: Arc<AtomicU64>,
    }

    impl ManualClock {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn advance(&self, by: Duration) {
            self.millis
                .fetch_add(by.as_millis() as u64, Ordering::SeqCst);
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Duration {
            Duration::from_millis(self.millis.load(Ordering::SeqCst))
        }
    }
}

#[derive(Debug, Clone)]
struct Slot<V> {
    stored_at: Duration,
    value: V,
}

/// Key-value store whose entries expire a fixed time after insertion
#[derive(Debug, Clone)]
pub struct ExpiringCache<K, V, C = SystemClock> {
    ttl: Duration,
    clock: C,
    slots: HashMap<K, Slot<V>>,
}

impl<K: Eq + Hash, V: Clone> ExpiringCache<K, V, SystemClock> {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, SystemClock)
    }
}

impl<K: Eq + Hash, V: Clone, C: Clock> ExpiringCache<K, V, C> {
    pub fn with_clock(ttl: Duration, clock: C) -> Self {
        Self {
            ttl,
            clock,
            slots: HashMap::new(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh value for `key`; an expired entry is dropped and reported as a miss
    pub fn get(&mut self, key: &K) -> Option<V> {
        let now = self.clock.now();
        let slot = self.slots.get(key)?;

        if now.saturating_sub(slot.stored_at) < self.ttl {
            return Some(slot.value.clone());
        }

        self.slots.remove(key);
        None
    }

    pub fn insert(&mut self, key: K, value: V) {
        let stored_at = self.clock.now();
        self.insert_at(key, value, stored_at);
    }

    /// Store an entry that was produced at `stored_at` on this cache's clock
    ///
    /// Used to restore persisted entries with their original age.
    pub fn insert_at(&mut self, key: K, value: V, stored_at: Duration) {
        self.slots.insert(key, Slot { stored_at, value });
    }

    /// When the entry for `key` was stored, expired or not
    pub fn stored_at(&self, key: &K) -> Option<Duration> {
        self.slots.get(key).map(|slot| slot.stored_at)
    }

    pub fn invalidate(&mut self, key: &K) -> bool {
        self.slots.remove(key).is_some()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    /// Drop every expired entry, returning how many were removed
    pub fn purge_expired(&mut self) -> usize {
        let now = self.clock.now();
        let ttl = self.ttl;
        let before = self.slots.len();
        self.slots
            .retain(|_, slot| now.saturating_sub(slot.stored_at) < ttl);
        before - self.slots.len()
    }

    /// Number of stored entries, expired or not
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
