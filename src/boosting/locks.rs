// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

/// Serialization point for one user's session operations.
///
/// The generation moves forward on every start and stop, so a start that
/// released the lock while resolving can tell whether it was overtaken.
#[derive(Debug, Default)]
pub struct UserSlot {
    lock: Mutex<()>,
    generation: AtomicU64,
}

impl UserSlot {
    pub async fn lock(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().await
    }

    /// Move to a new generation and return it. Call with the lock held.
    pub fn advance(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}

/// Lazily created slot per user id. Different users never contend.
///
/// Slots of idle users are dropped through [`UserLocks::release`], so the map
/// holds users with a session or an operation in flight.
#[derive(Debug, Default)]
pub struct UserLocks {
    slots: Mutex<HashMap<i32, Arc<UserSlot>>>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn slot(&self, user_id: i32) -> Arc<UserSlot> {
        let mut slots = self.slots.lock().await;
        slots.entry(user_id).or_default().clone()
    }

    /// Forget the user's slot if `slot` is the last handle outside the map.
    ///
    /// Call after the guard is dropped. Anyone else holding the slot, even
    /// while waiting for its lock, keeps it alive.
    pub async fn release(&self, user_id: i32, slot: Arc<UserSlot>) {
        let mut slots = self.slots.lock().await;
        let unshared = slots
            .get(&user_id)
            .is_some_and(|stored| Arc::ptr_eq(stored, &slot) && Arc::strong_count(&slot) == 2);
        if unshared {
            slots.remove(&user_id);
        }
    }

    pub async fn tracked(&self) -> usize {
        self.slots.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn same_user_shares_a_slot() {
        let locks = UserLocks::new();
        let a = locks.slot(1).await;
        let b = locks.slot(1).await;
        let other = locks.slot(2).await;
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &other));
    }

    #[tokio::test]
    async fn advance_is_observed_by_earlier_readers() {
        let locks = UserLocks::new();
        let slot = locks.slot(1).await;

        let taken = {
            let _guard = slot.lock().await;
            slot.advance()
        };
        assert_eq!(slot.generation(), taken);

        {
            let _guard = slot.lock().await;
            slot.advance();
        }
        assert_ne!(slot.generation(), taken);
    }

    #[tokio::test]
    async fn release_drops_only_unshared_slots() {
        let locks = UserLocks::new();
        let first = locks.slot(1).await;
        let waiting = locks.slot(1).await;

        locks.release(1, first).await;
        assert_eq!(locks.tracked().await, 1);

        locks.release(1, waiting).await;
        assert_eq!(locks.tracked().await, 0);
    }

    #[tokio::test]
    async fn other_users_do_not_wait_on_a_held_lock() {
        let locks = UserLocks::new();
        let first = locks.slot(1).await;
        let _held = first.lock().await;

        let second = locks.slot(2).await;
        let guard = tokio::time::timeout(std::time::Duration::from_millis(100), second.lock()).await;
        tokio_test::assert_ok!(guard);
    }
}
