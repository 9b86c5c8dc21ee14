//! Per-natural-key serialization.
//!
//! Check-then-insert is not atomic, so two units carrying the same key
//! (a category listed twice, a model repeating a category) must not overlap.
//! Units with different keys never contend. Entries are dropped once the
//! last holder or waiter releases them, so the registry stays bounded by
//! the number of keys currently in flight.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::OwnedMutexGuard;

type Slot = Arc<tokio::sync::Mutex<()>>;

#[derive(Default)]
pub(crate) struct KeyLocks {
    slots: Mutex<HashMap<String, Slot>>,
}

pub(crate) struct KeyGuard<'a> {
    locks: &'a KeyLocks,
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl KeyLocks {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<String, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Wait until no other unit holds `key`, then hold it until the guard drops.
    pub(crate) async fn lock(&self, key: impl Into<String>) -> KeyGuard<'_> {
        let key = key.into();
        let slot = Arc::clone(self.slots().entry(key.clone()).or_default());
        let guard = slot.lock_owned().await;
        KeyGuard { locks: self, key, guard: Some(guard) }
    }

    /// Keys currently held or awaited.
    #[cfg(test)]
    pub(crate) fn in_flight(&self) -> usize {
        self.slots().len()
    }
}

impl Drop for KeyGuard<'_> {
    fn drop(&mut self) {
        let mut slots = self.locks.slots();
        drop(self.guard.take());
        // Waiters clone the slot under the map lock, so the count is stable here.
        if slots.get(&self.key).is_some_and(|slot| Arc::strong_count(slot) == 1) {
            slots.remove(&self.key);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use futures_util::future::join_all;

    use super::*;

    #[tokio::test]
    async fn same_key_is_exclusive() {
        let locks = KeyLocks::new();
        let active = AtomicUsize::new(0);
        let peak = AtomicUsize::new(0);

        join_all((0..8).map(|_| {
            let (locks, active, peak) = (&locks, &active, &peak);
            async move {
                let _guard = locks.lock("x").await;
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(2)).await;
                active.fetch_sub(1, Ordering::SeqCst);
            }
        }))
        .await;

        assert_eq!(peak.load(Ordering::SeqCst), 1);
        assert_eq!(locks.in_flight(), 0);
    }

    #[tokio::test]
    async fn different_keys_overlap() {
        let locks = KeyLocks::new();
        let active = AtomicUsize::new(0);
        let peak = AtomicUsize::new(0);

        join_all(["a", "b", "c", "d"].into_iter().map(|key| {
            let (locks, active, peak) = (&locks, &active, &peak);
            async move {
                let _guard = locks.lock(key).await;
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                active.fetch_sub(1, Ordering::SeqCst);
            }
        }))
        .await;

        assert!(peak.load(Ordering::SeqCst) > 1);
        assert_eq!(locks.in_flight(), 0);
    }

    #[tokio::test]
    async fn slot_survives_while_awaited() {
        let locks = KeyLocks::new();
        let first = locks.lock("k").await;
        let waiter = async { locks.lock("k").await };
        let (_, second) = tokio::join!(
            async {
                tokio::time::sleep(Duration::from_millis(5)).await;
                assert_eq!(locks.in_flight(), 1);
                drop(first);
            },
            waiter
        );
        assert_eq!(locks.in_flight(), 1);
        drop(second);
        assert_eq!(locks.in_flight(), 0);
    }
}
