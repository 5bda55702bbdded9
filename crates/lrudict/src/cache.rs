//! Thread-safe LRU dictionary
//!
//! A single mutex guards the index, the recency list, and the capacity
//! field. Operations that evict entries stage the evicted pairs while
//! holding the mutex and invoke the user callback only after releasing
//! it, so a callback that calls back into the cache cannot deadlock.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use ahash::RandomState;
use parking_lot::{Mutex, RwLock};
use tracing::warn;

use crate::error::{Error, Result};
use crate::list::RecencyList;
use crate::stats::CacheStats;

/// Callback invoked once per evicted (key, value) pair, outside the lock
pub type EvictCallback<K, V> = Arc<dyn Fn(K, V) + Send + Sync>;

/// State guarded by the cache mutex
struct Core<K, V> {
    list: RecencyList<K, V>,
    index: HashMap<K, usize, RandomState>,
    capacity: usize,
}

impl<K, V> Core<K, V>
where
    K: Hash + Eq + Clone,
{
    /// Remove the LRU entry from list and index, staging it for
    /// notification
    fn evict_tail(&mut self, staged: &mut Vec<(K, V)>) {
        if let Some((key, value)) = self.list.pop_tail() {
            self.index.remove(&key);
            staged.push((key, value));
        }
    }
}

/// Fixed-capacity dictionary that evicts the least-recently-used entry
/// on overflow
///
/// All methods take `&self`; the cache is safe to share between threads
/// behind an [`Arc`]. Evicted entries are handed to the configured
/// callback (if any) after the internal lock is released, in eviction
/// order.
pub struct LruDict<K, V> {
    core: Mutex<Core<K, V>>,
    callback: RwLock<Option<EvictCallback<K, V>>>,
    stats: CacheStats,
}

impl<K, V> LruDict<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    /// Create a cache holding at most `capacity` entries
    ///
    /// # Errors
    /// Returns [`Error::InvalidCapacity`] if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::InvalidCapacity);
        }

        Ok(Self {
            core: Mutex::new(Core {
                list: RecencyList::with_capacity(capacity),
                index: HashMap::with_capacity_and_hasher(capacity, RandomState::new()),
                capacity,
            }),
            callback: RwLock::new(None),
            stats: CacheStats::new(),
        })
    }

    /// Create a cache with an eviction callback already configured
    ///
    /// # Errors
    /// Returns [`Error::InvalidCapacity`] if `capacity` is zero.
    pub fn with_callback<F>(capacity: usize, callback: F) -> Result<Self>
    where
        F: Fn(K, V) + Send + Sync + 'static,
    {
        let dict = Self::new(capacity)?;
        *dict.callback.write() = Some(Arc::new(callback));
        Ok(dict)
    }

    /// Look up `key`, promoting it to most-recently-used on a hit
    ///
    /// The only read path that reorders entries. Counts a hit or a miss.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut core = self.core.lock();
        match core.index.get(key).copied() {
            Some(idx) => {
                core.list.move_to_head(idx);
                self.stats.record_hit();
                core.list.value(idx).cloned()
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    /// Look up `key`, returning `default` on a miss
    ///
    /// Same promotion and counter behavior as [`get`](Self::get).
    pub fn get_or(&self, key: &K, default: V) -> V {
        self.get(key).unwrap_or(default)
    }

    /// Insert or update an entry, evicting the LRU entry on overflow
    ///
    /// An existing key has its value replaced in place and is promoted
    /// to most-recently-used; no eviction occurs. A new key evicts at
    /// most one entry.
    pub fn insert(&self, key: K, value: V) {
        let staged = {
            let mut core = self.core.lock();
            let mut staged = Vec::new();

            if let Some(&idx) = core.index.get(&key) {
                if let Some(slot) = core.list.value_mut(idx) {
                    *slot = value;
                }
                core.list.move_to_head(idx);
            } else {
                if core.list.len() >= core.capacity {
                    core.evict_tail(&mut staged);
                }
                let idx = core.list.push_head(key.clone(), value);
                core.index.insert(key, idx);
            }

            staged
        };
        self.notify(staged);
    }

    /// Return the value for `key`, inserting `default` if absent
    ///
    /// A hit counts a hit and promotes the entry; a miss counts a miss
    /// and inserts `default`, which may evict the LRU entry.
    pub fn get_or_insert(&self, key: K, default: V) -> V {
        let (value, staged) = {
            let mut core = self.core.lock();
            let mut staged = Vec::new();

            let existing = match core.index.get(&key).copied() {
                Some(idx) => {
                    core.list.move_to_head(idx);
                    self.stats.record_hit();
                    core.list.value(idx).cloned()
                }
                None => None,
            };

            let value = match existing {
                Some(value) => value,
                None => {
                    self.stats.record_miss();
                    if core.list.len() >= core.capacity {
                        core.evict_tail(&mut staged);
                    }
                    let idx = core.list.push_head(key.clone(), default.clone());
                    core.index.insert(key, idx);
                    default
                }
            };

            (value, staged)
        };
        self.notify(staged);
        value
    }

    /// Remove `key` if present, returning its value
    ///
    /// Explicit removal: never invokes the eviction callback and never
    /// touches the hit/miss counters.
    pub fn remove(&self, key: &K) -> Option<V> {
        let mut core = self.core.lock();
        let idx = core.index.remove(key)?;
        core.list.remove(idx).map(|(_, value)| value)
    }

    /// Remove `key`, counting the lookup toward hit/miss statistics
    ///
    /// # Errors
    /// Returns [`Error::KeyNotFound`] if `key` is absent (after counting
    /// a miss).
    pub fn pop(&self, key: &K) -> Result<V> {
        let mut core = self.core.lock();
        match core.index.remove(key) {
            Some(idx) => {
                self.stats.record_hit();
                core.list
                    .remove(idx)
                    .map(|(_, value)| value)
                    .ok_or(Error::KeyNotFound)
            }
            None => {
                self.stats.record_miss();
                Err(Error::KeyNotFound)
            }
        }
    }

    /// Remove and return the LRU entry (or the MRU entry if
    /// `least_recent` is false)
    ///
    /// Does not touch the hit/miss counters and never invokes the
    /// callback.
    ///
    /// # Errors
    /// Returns [`Error::Empty`] if the cache holds no entries.
    pub fn pop_item(&self, least_recent: bool) -> Result<(K, V)> {
        let mut core = self.core.lock();
        let idx = if least_recent {
            core.list.tail()
        } else {
            core.list.head()
        }
        .ok_or(Error::Empty)?;

        let (key, value) = core.list.remove(idx).ok_or(Error::Empty)?;
        core.index.remove(&key);
        Ok((key, value))
    }

    /// Return the MRU (key, value) pair without reordering
    pub fn peek_first_item(&self) -> Option<(K, V)> {
        let core = self.core.lock();
        let idx = core.list.head()?;
        core.list.peek(idx).map(|(k, v)| (k.clone(), v.clone()))
    }

    /// Return the LRU (key, value) pair without reordering
    pub fn peek_last_item(&self) -> Option<(K, V)> {
        let core = self.core.lock();
        let idx = core.list.tail()?;
        core.list.peek(idx).map(|(k, v)| (k.clone(), v.clone()))
    }

    /// Snapshot of the keys in MRU to LRU order
    pub fn keys(&self) -> Vec<K> {
        self.core.lock().list.iter().map(|(k, _)| k.clone()).collect()
    }

    /// Snapshot of the values in MRU to LRU order
    pub fn values(&self) -> Vec<V> {
        self.core.lock().list.iter().map(|(_, v)| v.clone()).collect()
    }

    /// Snapshot of the (key, value) pairs in MRU to LRU order
    pub fn items(&self) -> Vec<(K, V)> {
        self.core
            .lock()
            .list
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Check membership without reordering or counting a hit/miss
    pub fn contains(&self, key: &K) -> bool {
        self.core.lock().index.contains_key(key)
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.core.lock().list.len()
    }

    /// Check if the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of entries before eviction triggers
    pub fn capacity(&self) -> usize {
        self.core.lock().capacity
    }

    /// Change the capacity, evicting LRU entries if shrinking below the
    /// current size
    ///
    /// Each entry evicted by a shrink is staged and notified exactly
    /// once, oldest first, after the lock is released.
    ///
    /// # Errors
    /// Returns [`Error::InvalidCapacity`] if `capacity` is zero; no
    /// entries are evicted in that case.
    pub fn set_capacity(&self, capacity: usize) -> Result<()> {
        if capacity == 0 {
            return Err(Error::InvalidCapacity);
        }

        let staged = {
            let mut core = self.core.lock();
            let mut staged = Vec::new();
            while core.list.len() > capacity {
                core.evict_tail(&mut staged);
            }
            core.capacity = capacity;
            staged
        };
        self.notify(staged);
        Ok(())
    }

    /// Drop every entry and reset the statistics
    ///
    /// A bulk reset, not a policy eviction: the callback is not invoked
    /// for the discarded entries.
    pub fn clear(&self) {
        let mut core = self.core.lock();
        core.list.clear();
        core.index.clear();
        self.stats.reset();
    }

    /// Cache statistics
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Snapshot of (hits, misses)
    pub fn get_stats(&self) -> (u64, u64) {
        self.stats.get_stats()
    }

    /// Replace the eviction callback
    pub fn set_callback<F>(&self, callback: F)
    where
        F: Fn(K, V) + Send + Sync + 'static,
    {
        *self.callback.write() = Some(Arc::new(callback));
    }

    /// Remove the eviction callback; evicted pairs are then discarded
    pub fn clear_callback(&self) {
        *self.callback.write() = None;
    }

    /// Apply each (key, value) pair with [`insert`](Self::insert)
    /// semantics, in iteration order
    pub fn update<I>(&self, entries: I)
    where
        I: IntoIterator<Item = (K, V)>,
    {
        for (key, value) in entries {
            self.insert(key, value);
        }
    }

    /// Drain staged evictions through the callback, oldest-evicted
    /// first
    ///
    /// Runs without the core lock held, so the callback may re-enter the
    /// cache. A panicking callback does not abort the drain; remaining
    /// pairs are still delivered.
    fn notify(&self, staged: Vec<(K, V)>) {
        if staged.is_empty() {
            return;
        }

        let callback = self.callback.read().clone();
        for (key, value) in staged {
            self.stats.record_eviction();
            if let Some(callback) = &callback {
                if panic::catch_unwind(AssertUnwindSafe(|| callback(key, value))).is_err() {
                    warn!("eviction callback panicked; continuing drain");
                }
            }
        }
    }
}

impl<K, V> fmt::Debug for LruDict<K, V>
where
    K: Hash + Eq + Clone + fmt::Debug,
    V: Clone + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.items()).finish()
    }
}
