//! Memoization primitives behind every selector.
//!
//! [`Memo`] is a single-slot cache keyed on the identity of an ordered tuple of
//! inputs. Shared containers (`Arc`) compare by pointer, scalars and strings by
//! value. The upstream store must therefore replace a container whenever its
//! contents change; mutating in place would leave stale projections behind.
//!
//! [`BoundedCache`] is the secondary, argument-keyed LRU used by selectors that
//! hand out lookup objects.

use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;

/// Input equality used to decide whether a projection must be recomputed.
pub trait Dependency: Clone {
    fn is_same(&self, other: &Self) -> bool;
}

impl<T: ?Sized> Dependency for Arc<T> {
    fn is_same(&self, other: &Self) -> bool {
        Arc::ptr_eq(self, other)
    }
}

impl<T: Dependency> Dependency for Option<T> {
    fn is_same(&self, other: &Self) -> bool {
        match (self, other) {
            (Some(a), Some(b)) => a.is_same(b),
            (None, None) => true,
            _ => false,
        }
    }
}

macro_rules! value_dependency {
    ($($ty:ty),*) => {
        $(impl Dependency for $ty {
            fn is_same(&self, other: &Self) -> bool {
                self == other
            }
        })*
    };
}

value_dependency!(bool, i64, u32, u64, usize, String);

macro_rules! tuple_dependency {
    ($($name:ident : $idx:tt),+) => {
        impl<$($name: Dependency),+> Dependency for ($($name,)+) {
            fn is_same(&self, other: &Self) -> bool {
                $(self.$idx.is_same(&other.$idx))&&+
            }
        }
    };
}

tuple_dependency!(A: 0);
tuple_dependency!(A: 0, B: 1);
tuple_dependency!(A: 0, B: 1, C: 2);
tuple_dependency!(A: 0, B: 1, C: 2, D: 3);
tuple_dependency!(A: 0, B: 1, C: 2, D: 3, E: 4);
tuple_dependency!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5);

/// Single-slot dependency-tracked projection cache.
pub struct Memo<I, O> {
    name: &'static str,
    slot: Mutex<Option<(I, O)>>,
    recomputations: AtomicUsize,
}

impl<I: Dependency, O: Clone> Memo<I, O> {
    pub fn new(name: &'static str) -> Self {
        Memo {
            name,
            slot: Mutex::new(None),
            recomputations: AtomicUsize::new(0),
        }
    }

    /// Returns the cached output when `inputs` match the previous call,
    /// otherwise runs `combine` and caches the result.
    pub fn select<F>(&self, inputs: I, combine: F) -> O
    where
        F: FnOnce(&I) -> O,
    {
        let mut slot = self.slot.lock();
        if let Some((previous, output)) = slot.as_ref() {
            if previous.is_same(&inputs) {
                return output.clone();
            }
        }
        let output = combine(&inputs);
        self.recomputations.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(projection = self.name, "recomputed");
        *slot = Some((inputs, output.clone()));
        output
    }

    pub fn recomputations(&self) -> usize {
        self.recomputations.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        *self.slot.lock() = None;
    }
}

impl<I, O> std::fmt::Debug for Memo<I, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Memo")
            .field("name", &self.name)
            .field("recomputations", &self.recomputations.load(Ordering::Relaxed))
            .finish()
    }
}

/// Bounded LRU cache keyed by the exact argument.
pub struct BoundedCache<K: Hash + Eq, V> {
    name: &'static str,
    entries: Mutex<LruCache<K, V>>,
    misses: AtomicUsize,
}

impl<K: Hash + Eq, V: Clone> BoundedCache<K, V> {
    pub fn new(name: &'static str, capacity: NonZeroUsize) -> Self {
        BoundedCache {
            name,
            entries: Mutex::new(LruCache::new(capacity)),
            misses: AtomicUsize::new(0),
        }
    }

    /// Returns the cached value for `key`, computing and inserting it on a miss.
    /// The least recently used entry is evicted once the cache is full.
    ///
    /// `compute` runs without the cache lock held, so it may consult other caches.
    pub fn get_or_insert_with<F>(&self, key: K, compute: F) -> V
    where
        F: FnOnce(&K) -> V,
    {
        if let Some(value) = self.entries.lock().get(&key) {
            return value.clone();
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        let value = compute(&key);
        let mut entries = self.entries.lock();
        if let Some((evicted, _)) = entries.push(key, value.clone()) {
            // push hands back the replaced entry for an existing key too
            if !entries.contains(&evicted) {
                tracing::trace!(cache = self.name, "evicted least recently used entry");
            }
        }
        value
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.lock().contains(key)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.entries.lock().cap().get()
    }

    pub fn misses(&self) -> usize {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl<K: Hash + Eq, V> std::fmt::Debug for BoundedCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedCache")
            .field("name", &self.name)
            .field("misses", &self.misses.load(Ordering::Relaxed))
            .finish()
    }
}

/// Hashes and compares an `Arc` by address, so a record can key a cache on its
/// identity rather than its contents.
#[derive(Debug)]
pub struct ByAddress<T>(pub Arc<T>);

impl<T> Clone for ByAddress<T> {
    fn clone(&self) -> Self {
        ByAddress(Arc::clone(&self.0))
    }
}

impl<T> PartialEq for ByAddress<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<T> Eq for ByAddress<T> {}

impl<T> Hash for ByAddress<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.0) as *const () as usize).hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn capacity(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).expect("non-zero")
    }

    #[test]
    fn memo_skips_combiner_for_same_inputs() {
        let memo: Memo<(Arc<Vec<i64>>, bool), Arc<i64>> = Memo::new("sum");
        let values = Arc::new(vec![1, 2, 3]);
        let calls = Cell::new(0);
        let sum = |(values, _): &(Arc<Vec<i64>>, bool)| {
            calls.set(calls.get() + 1);
            Arc::new(values.iter().sum())
        };

        let first = memo.select((values.clone(), true), sum);
        let second = memo.select((values.clone(), true), sum);
        assert_eq!(calls.get(), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(memo.recomputations(), 1);
    }

    #[test]
    fn memo_recomputes_on_new_container_with_equal_contents() {
        let memo: Memo<(Arc<Vec<i64>>,), usize> = Memo::new("len");
        memo.select((Arc::new(vec![1]),), |(v,)| v.len());
        memo.select((Arc::new(vec![1]),), |(v,)| v.len());
        assert_eq!(memo.recomputations(), 2);
    }

    #[test]
    fn memo_keeps_one_slot_of_history() {
        let memo: Memo<(String,), usize> = Memo::new("len");
        memo.select(("a".to_string(),), |(s,)| s.len());
        memo.select(("bb".to_string(),), |(s,)| s.len());
        memo.select(("a".to_string(),), |(s,)| s.len());
        assert_eq!(memo.recomputations(), 3);
        memo.reset();
        memo.select(("a".to_string(),), |(s,)| s.len());
        assert_eq!(memo.recomputations(), 4);
    }

    #[test]
    fn bounded_cache_evicts_least_recently_used() {
        let cache: BoundedCache<String, usize> = BoundedCache::new("test", capacity(3));
        for key in ["a", "b", "c"] {
            cache.get_or_insert_with(key.to_string(), |k| k.len());
        }
        // touch "a" so "b" becomes the oldest
        cache.get_or_insert_with("a".to_string(), |_| unreachable!());
        cache.get_or_insert_with("d".to_string(), |k| k.len());

        assert!(!cache.contains(&"b".to_string()));
        assert!(cache.contains(&"a".to_string()));
        assert_eq!(cache.len(), 3);

        let before = cache.misses();
        cache.get_or_insert_with("b".to_string(), |k| k.len());
        assert_eq!(cache.misses(), before + 1);
    }

    #[test]
    fn bounded_cache_capacity_plus_one_drops_first_key() {
        let cache: BoundedCache<u64, u64> = BoundedCache::new("test", capacity(4));
        for key in 0..5u64 {
            cache.get_or_insert_with(key, |k| k * 2);
        }
        assert!(!cache.contains(&0));
        assert_eq!(cache.capacity(), 4);
        assert_eq!(cache.misses(), 5);
    }

    #[test]
    fn by_address_distinguishes_equal_values() {
        let a = Arc::new("same".to_string());
        let b = Arc::new("same".to_string());
        assert_eq!(ByAddress(a.clone()), ByAddress(a.clone()));
        assert_ne!(ByAddress(a), ByAddress(b));
    }
}
