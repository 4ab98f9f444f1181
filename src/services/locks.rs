//! Per-bid single-flight guard
//!
//! Estimate recomputes for one bid run one at a time; different bids do
//! not contend.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

#[derive(Default)]
pub struct BidLocks {
    locks: Mutex<HashMap<Uuid, Arc<AsyncMutex<()>>>>,
}

/// Held for the duration of one bid's recompute
pub struct BidGuard {
    _guard: OwnedMutexGuard<()>,
}

impl BidLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, bid_id: Uuid) -> BidGuard {
        let lock = {
            let mut locks = self.locks.lock();
            // Drop locks nobody holds or waits on
            locks.retain(|id, lock| *id == bid_id || Arc::strong_count(lock) > 1);
            locks.entry(bid_id).or_default().clone()
        };
        BidGuard {
            _guard: lock.lock_owned().await,
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_bid_is_serialized() {
        let locks = Arc::new(BidLocks::new());
        let bid = Uuid::new_v4();

        let guard = locks.acquire(bid).await;
        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire(bid).await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(guard);
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_different_bids_do_not_contend() {
        let locks = BidLocks::new();
        let _a = locks.acquire(Uuid::new_v4()).await;
        let b = tokio::time::timeout(Duration::from_secs(1), locks.acquire(Uuid::new_v4())).await;
        assert!(b.is_ok());
    }

    #[tokio::test]
    async fn test_released_locks_are_pruned() {
        let locks = BidLocks::new();
        for _ in 0..5 {
            let _guard = locks.acquire(Uuid::new_v4()).await;
        }
        let _held = locks.acquire(Uuid::new_v4()).await;
        assert_eq!(locks.len(), 1);
    }
}
