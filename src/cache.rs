//! Bounded result caches for referentially transparent remote queries.
//!
//! Answers such as "is X a collection" never change within a session, so
//! tools keep them in a [`BoundedCache`] instead of asking the knowledge base
//! again. Two independent limits apply:
//!
//! - **capacity**: past it, the least recently used entry goes (reads and
//!   writes both count as use),
//! - **max age** (optional): an entry inserted `max_age` or more insertions
//!   ago goes regardless of use.
//!
//! One mutex guards the LRU list, the insertion log and the counters, so a
//! `get` can never observe an entry after the `put` that evicted it.

use std::collections::VecDeque;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard};

use lru::LruCache;

use crate::error::{ConfigError, WireResult};
use crate::term::Term;

/// Cache keyed by a single term, e.g. `isa-collection?`.
pub type TermCache<V> = BoundedCache<Term, V>;

/// Cache keyed by a pair of terms, e.g. `genls?`.
pub type TermPairCache<V> = BoundedCache<(Term, Term), V>;

/// Hit/miss/eviction counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Entries dropped by either limit. Explicit `remove` and `clear` are not counted.
    pub evictions: u64,
}

impl CacheStats {
    /// Fraction of lookups answered from the cache.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

struct Entry<V> {
    value: V,
    generation: u64,
}

struct State<K: Hash + Eq, V> {
    lru: LruCache<K, Entry<V>>,
    /// Insertion counter; bumped by every `put`.
    generation: u64,
    /// `(generation, key)` per insertion, oldest first. Only kept with a max age.
    log: VecDeque<(u64, K)>,
    stats: CacheStats,
}

/// Fixed-capacity LRU map with an optional insertion-count age limit.
pub struct BoundedCache<K: Hash + Eq, V> {
    capacity: NonZeroUsize,
    max_age: Option<u64>,
    state: Mutex<State<K, V>>,
}

impl<K, V> BoundedCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    /// A cache holding at most `capacity` entries, each living for fewer than
    /// `max_age` subsequent insertions when an age is given.
    pub fn new(capacity: usize, max_age: Option<u64>) -> WireResult<Self> {
        let capacity = NonZeroUsize::new(capacity).ok_or_else(|| ConfigError::Invalid {
            message: "cache capacity must be at least 1".into(),
        })?;
        if max_age == Some(0) {
            return Err(ConfigError::Invalid {
                message: "cache max_age must be at least 1 when set".into(),
            }
            .into());
        }
        Ok(Self {
            capacity,
            max_age,
            state: Mutex::new(State {
                lru: LruCache::new(capacity),
                generation: 0,
                log: VecDeque::new(),
                stats: CacheStats::default(),
            }),
        })
    }

    fn state(&self) -> MutexGuard<'_, State<K, V>> {
        self.state.lock().expect("cache lock poisoned")
    }

    /// Look up `key`, marking it most recently used.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut state = self.state();
        let generation = state.generation;
        let max_age = self.max_age;
        let found = state
            .lru
            .get(key)
            .filter(|entry| !expired(generation, entry.generation, max_age))
            .map(|entry| entry.value.clone());
        match found {
            Some(value) => {
                state.stats.hits += 1;
                Some(value)
            }
            None => {
                state.stats.misses += 1;
                None
            }
        }
    }

    /// Insert or replace `key`, evicting by capacity and age as needed.
    pub fn put(&self, key: K, value: V) {
        let mut state = self.state();
        state.generation += 1;
        let generation = state.generation;
        if self.max_age.is_some() {
            state.log.push_back((generation, key.clone()));
        }
        let displaced = state.lru.push(key.clone(), Entry { value, generation });
        if let Some((old_key, _)) = displaced {
            if old_key != key {
                state.stats.evictions += 1;
                tracing::trace!(generation, "evicted least recently used entry");
            }
        }
        self.expire(&mut state);
        self.compact_log(&mut state);
    }

    /// Drop every entry whose age has reached `max_age`.
    fn expire(&self, state: &mut State<K, V>) {
        let Some(max_age) = self.max_age else { return };
        let now = state.generation;
        while let Some((inserted, _)) = state.log.front() {
            if !expired(now, *inserted, Some(max_age)) {
                break;
            }
            let Some((inserted, key)) = state.log.pop_front() else {
                break;
            };
            // A later put of the same key refreshed it; only the latest insertion counts.
            let current = state
                .lru
                .peek(&key)
                .is_some_and(|entry| entry.generation == inserted);
            if current {
                state.lru.pop(&key);
                state.stats.evictions += 1;
                tracing::trace!(inserted, now, "expired cache entry");
            }
        }
    }

    /// Drop log records of entries that capacity eviction, `remove` or a
    /// later `put` already superseded. Keeps the log within twice the
    /// capacity, since each live entry has exactly one current record.
    fn compact_log(&self, state: &mut State<K, V>) {
        if state.log.len() <= 2 * self.capacity.get() {
            return;
        }
        let State { lru, log, .. } = state;
        log.retain(|(inserted, key)| {
            lru.peek(key)
                .is_some_and(|entry| entry.generation == *inserted)
        });
    }

    /// Return the cached value for `key`, computing and inserting it on a miss.
    ///
    /// `compute` runs without the lock held, so a slow remote query does not
    /// block other callers. Two racing misses may both compute; the later
    /// `put` wins. Errors are returned and nothing is cached.
    pub fn get_or_try_insert_with<E>(
        &self,
        key: K,
        compute: impl FnOnce() -> Result<V, E>,
    ) -> Result<V, E> {
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }
        let value = compute()?;
        self.put(key, value.clone());
        Ok(value)
    }

    /// Remove `key`, returning its value if present.
    pub fn remove(&self, key: &K) -> Option<V> {
        self.state().lru.pop(key).map(|entry| entry.value)
    }

    /// Drop every entry. Counters are kept.
    pub fn clear(&self) {
        let mut state = self.state();
        state.lru.clear();
        state.log.clear();
    }

    pub fn len(&self) -> usize {
        self.state().lru.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    pub fn max_age(&self) -> Option<u64> {
        self.max_age
    }

    pub fn stats(&self) -> CacheStats {
        self.state().stats
    }
}

fn expired(now: u64, inserted: u64, max_age: Option<u64>) -> bool {
    max_age.is_some_and(|age| now - inserted >= age)
}

impl<K: Hash + Eq, V> std::fmt::Debug for BoundedCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut out = f.debug_struct("BoundedCache");
        out.field("capacity", &self.capacity)
            .field("max_age", &self.max_age);
        if let Ok(state) = self.state.try_lock() {
            out.field("len", &state.lru.len())
                .field("stats", &state.stats);
        }
        out.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WireError;

    #[test]
    fn capacity_two_evicts_first_key() {
        let cache = BoundedCache::new(2, None).unwrap();
        cache.put("k1", 1);
        cache.put("k2", 2);
        cache.put("k3", 3);
        assert_eq!(cache.get(&"k1"), None);
        assert_eq!(cache.get(&"k2"), Some(2));
        assert_eq!(cache.get(&"k3"), Some(3));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn reading_protects_from_eviction() {
        let cache = BoundedCache::new(2, None).unwrap();
        cache.put("k1", 1);
        cache.put("k2", 2);
        assert_eq!(cache.get(&"k1"), Some(1));
        cache.put("k3", 3);
        assert_eq!(cache.get(&"k1"), Some(1));
        assert_eq!(cache.get(&"k2"), None);
    }

    #[test]
    fn rewriting_protects_from_eviction() {
        let cache = BoundedCache::new(2, None).unwrap();
        cache.put("k1", 1);
        cache.put("k2", 2);
        cache.put("k1", 10);
        cache.put("k3", 3);
        assert_eq!(cache.get(&"k1"), Some(10));
        assert_eq!(cache.get(&"k2"), None);
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn max_age_expires_regardless_of_use() {
        let cache = BoundedCache::new(10, Some(2)).unwrap();
        cache.put("a", 1);
        assert_eq!(cache.get(&"a"), Some(1));
        cache.put("b", 2);
        assert_eq!(cache.get(&"a"), Some(1));
        cache.put("c", 3);
        assert_eq!(cache.get(&"a"), None);
        assert_eq!(cache.get(&"b"), Some(2));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn reinsertion_resets_age() {
        let cache = BoundedCache::new(10, Some(2)).unwrap();
        cache.put("a", 1);
        cache.put("b", 2);
        cache.put("a", 1);
        cache.put("c", 3);
        assert_eq!(cache.get(&"a"), Some(1));
        assert_eq!(cache.get(&"b"), None);
    }

    #[test]
    fn insertion_log_is_bounded_by_capacity() {
        let cache = BoundedCache::new(2, Some(100_000)).unwrap();
        for key in 0..1_000u32 {
            cache.put(key, key);
        }
        assert!(cache.state().log.len() <= 4);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&999), Some(999));

        // Survivors still expire on schedule after compaction.
        let aged = BoundedCache::new(2, Some(6)).unwrap();
        for key in 0..6u32 {
            aged.put(key, key);
        }
        for _ in 0..4 {
            aged.put(5, 5);
            assert_eq!(aged.get(&4), Some(4));
        }
        aged.put(5, 5);
        assert_eq!(aged.get(&4), None);
        assert_eq!(aged.get(&5), Some(5));
    }

    #[test]
    fn zero_limits_are_rejected() {
        assert!(matches!(
            BoundedCache::<u32, u32>::new(0, None),
            Err(WireError::Config(ConfigError::Invalid { .. }))
        ));
        assert!(BoundedCache::<u32, u32>::new(1, Some(0)).is_err());
    }

    #[test]
    fn get_or_try_insert_with_caches_success_only() {
        let cache: TermCache<bool> = BoundedCache::new(4, None).unwrap();
        let dog = Term::symbol("Dog");

        let failed: Result<bool, &str> =
            cache.get_or_try_insert_with(dog.clone(), || Err("offline"));
        assert!(failed.is_err());
        assert!(cache.is_empty());

        let first: Result<bool, &str> = cache.get_or_try_insert_with(dog.clone(), || Ok(true));
        assert_eq!(first, Ok(true));
        let second: Result<bool, &str> =
            cache.get_or_try_insert_with(dog, || panic!("should be cached"));
        assert_eq!(second, Ok(true));
    }

    #[test]
    fn term_pair_keys() {
        let cache: TermPairCache<bool> = BoundedCache::new(8, None).unwrap();
        let key = (Term::symbol("Dog"), Term::symbol("Animal"));
        cache.put(key.clone(), true);
        assert_eq!(cache.get(&key), Some(true));
        assert_eq!(cache.get(&(Term::symbol("Animal"), Term::symbol("Dog"))), None);
        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses), (1, 1));
        assert!((stats.hit_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn remove_and_clear() {
        let cache = BoundedCache::new(4, Some(3)).unwrap();
        cache.put(1, "one");
        cache.put(2, "two");
        assert_eq!(cache.remove(&1), Some("one"));
        assert_eq!(cache.remove(&1), None);
        cache.clear();
        assert!(cache.is_empty());
        cache.put(3, "three");
        assert_eq!(cache.get(&3), Some("three"));
    }

    #[test]
    fn concurrent_puts_and_gets() {
        let cache = BoundedCache::new(64, Some(200)).unwrap();
        std::thread::scope(|s| {
            for t in 0..8u64 {
                let cache = &cache;
                s.spawn(move || {
                    for i in 0..100u64 {
                        let key = t * 1000 + i;
                        cache.put(key, key * 2);
                        if let Some(v) = cache.get(&key) {
                            assert_eq!(v, key * 2);
                        }
                    }
                });
            }
        });
        assert!(cache.len() <= 64);
        let stats = cache.stats();
        assert_eq!(stats.hits + stats.misses, 800);
        assert_eq!(stats.evictions as usize + cache.len(), 800);
    }
}
