//! Per-key single-flight locking for regenerations.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};

use tokio::sync::{Mutex, OwnedMutexGuard};

type Inflight = Arc<StdMutex<HashMap<String, Arc<Mutex<()>>>>>;

fn lock_map(map: &StdMutex<HashMap<String, Arc<Mutex<()>>>>) -> MutexGuard<'_, HashMap<String, Arc<Mutex<()>>>> {
    map.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Serializes regenerations of the same key.
#[derive(Debug, Default, Clone)]
pub struct Coalescer {
    inflight: Inflight,
}

/// Held for the duration of one regeneration.
#[derive(Debug)]
pub struct FlightGuard {
    guard: Option<OwnedMutexGuard<()>>,
    lock: Arc<Mutex<()>>,
    key: String,
    inflight: Inflight,
    waited: bool,
}

impl FlightGuard {
    /// True when another flight for the same key held the lock first.
    pub fn waited(&self) -> bool {
        self.waited
    }
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.guard.take();
        let mut map = lock_map(&self.inflight);
        // One reference lives in the map, one here; more means waiters.
        if Arc::strong_count(&self.lock) <= 2 {
            map.remove(&self.key);
        }
    }
}

impl Coalescer {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, key: &str) -> FlightGuard {
        let lock = {
            let mut map = lock_map(&self.inflight);
            Arc::clone(map.entry(key.to_string()).or_insert_with(|| Arc::new(Mutex::new(()))))
        };

        let (guard, waited) = match Arc::clone(&lock).try_lock_owned() {
            Ok(guard) => (guard, false),
            Err(_) => (Arc::clone(&lock).lock_owned().await, true),
        };

        FlightGuard { guard: Some(guard), lock, key: key.to_string(), inflight: Arc::clone(&self.inflight), waited }
    }

    /// Keys with a regeneration in progress or queued.
    pub fn in_flight(&self) -> usize {
        lock_map(&self.inflight).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_first_caller_does_not_wait() {
        let coalescer = Coalescer::new();
        let guard = coalescer.acquire("a").await;
        assert!(!guard.waited());
        assert_eq!(coalescer.in_flight(), 1);
        drop(guard);
        assert_eq!(coalescer.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_second_caller_waits_for_first() {
        let coalescer = Coalescer::new();
        let first = coalescer.acquire("a").await;

        let other = coalescer.clone();
        let waiter = tokio::spawn(async move { other.acquire("a").await.waited() });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());
        drop(first);

        assert!(waiter.await.unwrap());
        assert_eq!(coalescer.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_distinct_keys_do_not_block() {
        let coalescer = Coalescer::new();
        let _a = coalescer.acquire("a").await;
        let b = coalescer.acquire("b").await;
        assert!(!b.waited());
        assert_eq!(coalescer.in_flight(), 2);
    }
}
