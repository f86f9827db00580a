use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::LazyLock;

use lru::LruCache;
use parking_lot::Mutex;

use crate::fingerprint::Fingerprint;

/// The number of results each memoized function keeps.
pub const CAPACITY: usize = 128;

/// Executes a function, trying to use a cached result for it.
///
/// The cache is not locked while `func` runs, so memoized functions may
/// recurse. Two threads missing on the same fingerprint both compute, and the
/// later insertion wins.
pub fn memoized<T, F>(name: &str, cache: &Cache<T>, fingerprint: Fingerprint, func: F) -> T
where
    T: Clone,
    F: FnOnce() -> T,
{
    // Check if there is a cached output.
    if let Some(output) = cache.lookup(&fingerprint) {
        tracing::trace!(function = name, "cache hit");

        #[cfg(feature = "testing")]
        crate::testing::register_hit();

        return output;
    }

    tracing::trace!(function = name, dependencies = fingerprint.len(), "cache miss");

    // Execute the function and remember its output.
    let output = func();
    cache.insert(fingerprint, output.clone());

    #[cfg(feature = "testing")]
    crate::testing::register_miss();

    output
}

/// The results of a single memoized function.
pub struct Cache<T>(LazyLock<Mutex<Store<Fingerprint, T>>>);

impl<T> Cache<T> {
    /// Create an empty cache holding up to [`CAPACITY`] results.
    pub const fn new() -> Self {
        Self(LazyLock::new(|| Mutex::new(Store::new(CAPACITY))))
    }

    /// The number of cached results.
    pub fn len(&self) -> usize {
        self.0.lock().lru.len()
    }

    /// Whether no result is cached.
    pub fn is_empty(&self) -> bool {
        self.0.lock().lru.is_empty()
    }

    /// Remove all cached results.
    pub fn clear(&self) {
        self.0.lock().lru.clear();
    }

    /// Insert a result, evicting the least recently used one if full.
    pub fn insert(&self, fingerprint: Fingerprint, output: T) {
        let mut store = self.0.lock();
        if store.insert(fingerprint, output) {
            tracing::debug!(
                capacity = store.lru.cap().get(),
                "evicted least recently used result"
            );
        }
    }
}

impl<T: Clone> Cache<T> {
    /// Look for a cached result and mark it as most recently used.
    pub fn lookup(&self, fingerprint: &Fingerprint) -> Option<T> {
        self.0.lock().lru.get(fingerprint).cloned()
    }
}

impl<T> Default for Cache<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A bounded map that evicts its least recently used entry.
struct Store<K, V> {
    lru: LruCache<K, V>,
}

impl<K: Hash + Eq, V> Store<K, V> {
    /// Create an empty store. A capacity of zero is treated as one.
    fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self { lru: LruCache::new(capacity) }
    }

    /// Insert or overwrite an entry and mark it as most recently used.
    ///
    /// Returns whether a different entry was evicted to make room.
    fn insert(&mut self, key: K, value: V) -> bool {
        let evicts = self.lru.len() == self.lru.cap().get() && !self.lru.contains(&key);
        self.lru.put(key, value);
        evicts
    }
}
