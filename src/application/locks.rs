use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::AccountNumber;

/// Per-account mutual exclusion for read-modify-write cycles.
///
/// Each account number maps to its own async mutex, so operations on different
/// accounts never wait on each other while operations on the same account run
/// one at a time.
#[derive(Debug, Default)]
pub struct AccountLocks {
    locks: Mutex<HashMap<AccountNumber, Arc<Mutex<()>>>>,
}

/// Guards held for the duration of one ledger operation.
#[derive(Debug)]
pub struct AccountGuard {
    _guards: Vec<OwnedMutexGuard<()>>,
}

impl AccountLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock a single account.
    pub async fn lock(&self, account_number: AccountNumber) -> AccountGuard {
        self.lock_all(&[account_number]).await
    }

    /// Lock several accounts. Numbers are locked in ascending order and
    /// duplicates are locked once, so two callers locking overlapping sets
    /// cannot deadlock.
    pub async fn lock_all(&self, account_numbers: &[AccountNumber]) -> AccountGuard {
        let mut numbers = account_numbers.to_vec();
        numbers.sort_unstable();
        numbers.dedup();

        let mutexes: Vec<Arc<Mutex<()>>> = {
            let mut locks = self.locks.lock().await;
            numbers
                .iter()
                .map(|n| locks.entry(*n).or_default().clone())
                .collect()
        };

        let mut guards = Vec::with_capacity(mutexes.len());
        for mutex in mutexes {
            guards.push(mutex.lock_owned().await);
        }
        AccountGuard { _guards: guards }
    }

    /// Drop map entries no operation currently holds or waits on.
    pub async fn prune(&self) {
        self.locks
            .lock()
            .await
            .retain(|_, mutex| Arc::strong_count(mutex) > 1);
    }

    /// Number of account numbers with a lock entry.
    pub async fn tracked(&self) -> usize {
        self.locks.lock().await.len()
    }
}
