//! The shared lock-upgrade discipline used by both the PK cache and the
//! statement cache (spec §5, §9).
//!
//! Every public Reader operation holds the cache's shared (read) mode for
//! its duration; cache reads happen under that shared hold. Populating or
//! invalidating an entry requires releasing the shared hold, computing the
//! new entry with **no** cache lock held at all (so the I/O never blocks
//! an unrelated reader and never happens while we hold the exclusive
//! mode), then acquiring exclusive just long enough to recheck the map and
//! insert -- a concurrent promoter may have already done the same work, in
//! which case we discard ours. This is deliberately racy: the design
//! accepts duplicated metadata queries as the price of keeping the
//! exclusive region I/O-free (spec §9).

pub mod pk;
pub mod stmt;

use parking_lot::RwLock;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

pub struct Cache<K, V> {
    entries: RwLock<HashMap<K, Arc<V>>>,
}

impl<K, V> Default for Cache<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Returns the cached entry for `key`, computing and inserting it on
    /// miss. `compute` is called with no cache lock held, so it may take
    /// as long as it needs (including further locking elsewhere) without
    /// blocking readers of unrelated keys, or even of this same key.
    pub fn get_or_try_populate<E>(
        &self,
        key: &K,
        compute: impl FnOnce() -> Result<V, E>,
    ) -> Result<Arc<V>, E> {
        if let Some(hit) = self.entries.read().get(key).cloned() {
            return Ok(hit);
        }

        // No lock held here -- the deliberately racy window (spec §9).
        let computed = Arc::new(compute()?);

        let mut write = self.entries.write();
        // Recheck: a concurrent promoter may have already populated this
        // key while we were computing. Prefer the existing entry so that
        // all concurrent observers converge on the same `Arc`.
        let entry = write.entry(key.clone()).or_insert(computed);
        Ok(Arc::clone(entry))
    }

    pub fn invalidate(&self, key: &K) {
        self.entries.write().remove(key);
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn hit_does_not_recompute() {
        let cache: Cache<String, u32> = Cache::default();
        let calls = AtomicUsize::new(0);
        let key = "k".to_string();

        for _ in 0..5 {
            let v = cache
                .get_or_try_populate::<std::convert::Infallible>(&key, || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(42)
                })
                .unwrap();
            assert_eq!(*v, 42);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn invalidate_forces_recompute() {
        let cache: Cache<String, u32> = Cache::default();
        let key = "k".to_string();
        let mut next = 1;

        let v1 = cache
            .get_or_try_populate::<std::convert::Infallible>(&key, || {
                let v = next;
                next += 1;
                Ok(v)
            })
            .unwrap();
        assert_eq!(*v1, 1);

        cache.invalidate(&key);

        let v2 = cache
            .get_or_try_populate::<std::convert::Infallible>(&key, || {
                let v = next;
                next += 1;
                Ok(v)
            })
            .unwrap();
        assert_eq!(*v2, 2);
    }

    #[test]
    fn failed_compute_leaves_cache_unchanged() {
        let cache: Cache<String, u32> = Cache::default();
        let key = "k".to_string();

        let err: Result<Arc<u32>, &str> = cache.get_or_try_populate(&key, || Err("boom"));
        assert!(err.is_err());
        assert!(cache.is_empty());

        let ok = cache.get_or_try_populate::<&str>(&key, || Ok(7)).unwrap();
        assert_eq!(*ok, 7);
    }

    #[test]
    fn concurrent_populate_converges_to_one_entry() {
        use std::sync::Barrier;
        use std::thread;

        let cache: Arc<Cache<String, u32>> = Arc::new(Cache::default());
        let key = "k".to_string();
        let barrier = Arc::new(Barrier::new(8));
        let calls = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let key = key.clone();
                let barrier = Arc::clone(&barrier);
                let calls = Arc::clone(&calls);
                thread::spawn(move || {
                    barrier.wait();
                    cache
                        .get_or_try_populate::<std::convert::Infallible>(&key, || {
                            calls.fetch_add(1, Ordering::SeqCst);
                            thread::yield_now();
                            Ok(99)
                        })
                        .unwrap()
                })
            })
            .collect();

        let results: Vec<Arc<u32>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(results.iter().all(|v| **v == 99));
        assert_eq!(cache.len(), 1);
        // Duplicate computation under the race is tolerated, never absent.
        assert!(calls.load(Ordering::SeqCst) >= 1);
    }
}
