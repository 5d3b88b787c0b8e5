// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Result, bail};
use async_trait::async_trait;
use fxledger::application::LedgerService;
use fxledger::domain::{Account, AccountNumber, Amount, CurrencyConverter, NewAccount};
use fxledger::storage::{InMemoryStore, RecordStore, Repository};
use tempfile::TempDir;

pub const ACCOUNT_A: AccountNumber = 1_623_000_001;
pub const ACCOUNT_B: AccountNumber = 1_623_000_002;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(LedgerService<Repository>, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service =
        LedgerService::init(db_path.to_str().unwrap(), CurrencyConverter::default()).await?;
    Ok((service, temp_dir))
}

/// Helper to create a test service over the in-memory store
pub fn memory_service() -> LedgerService<InMemoryStore> {
    LedgerService::new(InMemoryStore::new(), CurrencyConverter::default())
}

/// Test fixture: the two accounts used throughout the scenarios
pub struct StandardAccounts;

impl StandardAccounts {
    pub fn user_a() -> NewAccount {
        NewAccount::new(ACCOUNT_A, "User", "A", "userA@email.com")
    }

    pub fn user_b() -> NewAccount {
        NewAccount::new(ACCOUNT_B, "User", "B", "userB@email.com")
    }

    /// Open both accounts, each at a zero balance
    pub async fn open<S: RecordStore>(service: &LedgerService<S>) -> Result<(Account, Account)> {
        let a = service.open_account(Self::user_a()).await?;
        let b = service.open_account(Self::user_b()).await?;
        Ok((a, b))
    }
}

pub fn assert_close(actual: Amount, expected: Amount) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

/// In-memory store whose writes can be switched to fail, for exercising
/// store outages in the middle of an operation.
#[derive(Default)]
pub struct FlakyStore {
    inner: InMemoryStore,
    fail_writes: AtomicBool,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            bail!("store unavailable");
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for FlakyStore {
    async fn find_by_account_number(
        &self,
        account_number: AccountNumber,
    ) -> Result<Option<Account>> {
        self.inner.find_by_account_number(account_number).await
    }

    async fn save(&self, account: &Account) -> Result<Account> {
        self.check()?;
        self.inner.save(account).await
    }

    async fn save_all(&self, accounts: &[Account]) -> Result<Vec<Account>> {
        self.check()?;
        self.inner.save_all(accounts).await
    }

    async fn create(&self, fields: NewAccount) -> Result<Account> {
        self.inner.create(fields).await
    }
}
