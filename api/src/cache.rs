//! Keyed result cache with in-flight request sharing.
//!
//! A key is either `Ready` (a stored success) or `InFlight` (a shared future
//! every caller awaits). Errors are never stored: a failed fetch clears its
//! slot so the next caller issues a fresh request.
//!
//! A cache built with [`QueryCache::with_capacity`] keeps at most that many
//! `Ready` entries; storing one more evicts the oldest stored value.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};

use crate::ApiError;

type SharedFetch<V> = Shared<BoxFuture<'static, Result<V, ApiError>>>;

enum Slot<V: Clone> {
    /// `stored` orders entries for eviction.
    Ready { value: V, stored: u64 },
    InFlight { id: u64, fetch: SharedFetch<V> },
}

pub struct QueryCache<K, V: Clone> {
    slots: Arc<Mutex<HashMap<K, Slot<V>>>>,
    next_id: Arc<AtomicU64>,
    capacity: usize,
}

impl<K, V: Clone> Clone for QueryCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            slots: Arc::clone(&self.slots),
            next_id: Arc::clone(&self.next_id),
            capacity: self.capacity,
        }
    }
}

impl<K, V: Clone> Default for QueryCache<K, V> {
    fn default() -> Self {
        Self {
            slots: Arc::new(Mutex::new(HashMap::new())),
            next_id: Arc::new(AtomicU64::new(0)),
            capacity: usize::MAX,
        }
    }
}

impl<K, V> QueryCache<K, V>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
    V: Clone + Send + Sync + 'static,
{
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A cache holding at most `capacity` stored values (minimum 1).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            ..Self::default()
        }
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<K, Slot<V>>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Return the cached value for `key`, join an in-flight fetch, or start one.
    pub async fn get_or_fetch<F, Fut>(&self, key: K, fetch: F) -> Result<V, ApiError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, ApiError>> + Send + 'static,
    {
        let (id, shared) = {
            let mut slots = self.slots();
            match slots.get(&key) {
                Some(Slot::Ready { value, .. }) => {
                    tracing::debug!(?key, "cache hit");
                    return Ok(value.clone());
                }
                Some(Slot::InFlight { id, fetch }) => {
                    tracing::debug!(?key, "joining in-flight request");
                    (*id, fetch.clone())
                }
                None => {
                    let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                    let shared = fetch().boxed().shared();
                    slots.insert(
                        key.clone(),
                        Slot::InFlight {
                            id,
                            fetch: shared.clone(),
                        },
                    );
                    tracing::debug!(?key, "cache miss");
                    (id, shared)
                }
            }
        };

        let result = shared.await;

        let mut slots = self.slots();
        // Only settle the slot this fetch created; an invalidate may have replaced it.
        if matches!(slots.get(&key), Some(Slot::InFlight { id: current, .. }) if *current == id) {
            match &result {
                Ok(value) => {
                    let stored = self.next_id.fetch_add(1, Ordering::Relaxed);
                    slots.insert(
                        key,
                        Slot::Ready {
                            value: value.clone(),
                            stored,
                        },
                    );
                    self.evict_over_capacity(&mut slots);
                }
                Err(err) => {
                    tracing::debug!(?key, %err, "fetch failed; not cached");
                    slots.remove(&key);
                }
            }
        }
        result
    }

    fn evict_over_capacity(&self, slots: &mut HashMap<K, Slot<V>>) {
        loop {
            let mut ready = 0;
            let mut oldest: Option<(&K, u64)> = None;
            for (key, slot) in slots.iter() {
                if let Slot::Ready { stored, .. } = slot {
                    ready += 1;
                    if oldest.is_none_or(|(_, seen)| *stored < seen) {
                        oldest = Some((key, *stored));
                    }
                }
            }
            if ready <= self.capacity {
                return;
            }
            let Some((key, _)) = oldest else {
                return;
            };
            let key = key.clone();
            tracing::debug!(?key, "evicting oldest cached value");
            slots.remove(&key);
        }
    }

    /// Cached value without fetching.
    #[must_use]
    pub fn peek(&self, key: &K) -> Option<V> {
        match self.slots().get(key) {
            Some(Slot::Ready { value, .. }) => Some(value.clone()),
            _ => None,
        }
    }

    /// Drop the entry for `key`, ready or in flight.
    pub fn invalidate(&self, key: &K) -> bool {
        self.slots().remove(key).is_some()
    }

    pub fn clear(&self) {
        self.slots().clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use tokio::sync::Notify;

    use super::*;

    #[tokio::test]
    async fn concurrent_callers_share_one_fetch() {
        let cache: QueryCache<u32, String> = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let gate = Arc::new(Notify::new());

        let make = |calls: Arc<AtomicUsize>, gate: Arc<Notify>| {
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                gate.notified().await;
                Ok::<_, ApiError>("page one".to_string())
            }
        };

        let first = cache.get_or_fetch(1, make(Arc::clone(&calls), Arc::clone(&gate)));
        let second = cache.get_or_fetch(1, make(Arc::clone(&calls), Arc::clone(&gate)));
        let release = async {
            tokio::task::yield_now().await;
            gate.notify_one();
        };

        let (a, b, ()) = tokio::join!(first, second, release);
        assert_eq!(a.unwrap(), "page one");
        assert_eq!(b.unwrap(), "page one");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.peek(&1).as_deref(), Some("page one"));
    }

    #[tokio::test]
    async fn ready_values_are_served_from_cache() {
        let cache: QueryCache<&'static str, u32> = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        for _ in 0..3 {
            let calls = Arc::clone(&calls);
            let value = cache
                .get_or_fetch("k", move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(7)
                })
                .await
                .unwrap();
            assert_eq!(value, 7);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn errors_are_not_cached() {
        let cache: QueryCache<u32, u32> = QueryCache::new();
        let err = cache
            .get_or_fetch(5, || async { Err(ApiError::Timeout) })
            .await
            .unwrap_err();
        assert_eq!(err, ApiError::Timeout);
        assert!(cache.is_empty());

        let ok = cache.get_or_fetch(5, || async { Ok(42) }).await.unwrap();
        assert_eq!(ok, 42);
    }

    #[tokio::test]
    async fn invalidate_forces_refetch() {
        let cache: QueryCache<u32, u32> = QueryCache::new();
        cache.get_or_fetch(1, || async { Ok(1) }).await.unwrap();
        assert!(cache.invalidate(&1));
        assert!(!cache.invalidate(&1));
        let value = cache.get_or_fetch(1, || async { Ok(2) }).await.unwrap();
        assert_eq!(value, 2);
    }

    #[tokio::test]
    async fn capacity_evicts_oldest_stored_value() {
        let cache: QueryCache<String, usize> = QueryCache::with_capacity(3);
        for (n, query) in ["portal", "half-life", "dota", "counter"].iter().enumerate() {
            cache
                .get_or_fetch((*query).to_string(), move || async move { Ok(n) })
                .await
                .unwrap();
        }
        assert_eq!(cache.len(), 3);
        assert_eq!(cache.peek(&"portal".to_string()), None);
        assert_eq!(cache.peek(&"counter".to_string()), Some(3));

        let calls = Arc::new(AtomicUsize::new(0));
        let refetch = {
            let calls = Arc::clone(&calls);
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(10)
            }
        };
        let value = cache.get_or_fetch("portal".to_string(), refetch).await.unwrap();
        assert_eq!(value, 10);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 3);
        assert_eq!(cache.peek(&"half-life".to_string()), None);
    }

    #[tokio::test]
    async fn in_flight_entries_are_not_evicted() {
        let cache: QueryCache<u32, u32> = QueryCache::with_capacity(1);
        let gate = Arc::new(Notify::new());
        let pending = {
            let gate = Arc::clone(&gate);
            cache.get_or_fetch(1, move || async move {
                gate.notified().await;
                Ok(1)
            })
        };
        let others = async {
            tokio::task::yield_now().await;
            cache.get_or_fetch(2, || async { Ok(2) }).await.unwrap();
            cache.get_or_fetch(3, || async { Ok(3) }).await.unwrap();
            assert_eq!(cache.peek(&2), None);
            assert_eq!(cache.len(), 2);
            gate.notify_one();
        };
        let (value, ()) = tokio::join!(pending, others);
        assert_eq!(value.unwrap(), 1);
        assert_eq!(cache.peek(&1), Some(1));
        assert_eq!(cache.peek(&3), None);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn invalidated_in_flight_result_is_not_stored() {
        let cache: QueryCache<u32, u32> = QueryCache::new();
        let gate = Arc::new(Notify::new());
        let pending = {
            let gate = Arc::clone(&gate);
            cache.get_or_fetch(9, move || async move {
                gate.notified().await;
                Ok(1)
            })
        };
        let invalidate = async {
            tokio::task::yield_now().await;
            cache.invalidate(&9);
            gate.notify_one();
        };
        let (value, ()) = tokio::join!(pending, invalidate);
        assert_eq!(value.unwrap(), 1);
        assert_eq!(cache.peek(&9), None);
    }
}
