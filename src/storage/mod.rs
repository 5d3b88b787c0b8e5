mod memory;
mod repository;

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::{Account, AccountNumber, NewAccount};

pub use memory::*;
pub use repository::*;

/// SQL migration for initial schema
pub const MIGRATION_001_INITIAL: &str = include_str!("migrations/001_initial.sql");

/// Persistence collaborator consumed by the ledger.
/// Implementations decide how records are held; the ledger only fetches and saves.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch an account by its number.
    async fn find_by_account_number(&self, account_number: AccountNumber)
    -> Result<Option<Account>>;

    /// Persist the mutable fields of an existing account.
    async fn save(&self, account: &Account) -> Result<Account>;

    /// Persist several existing accounts as one unit: either all are written or none.
    async fn save_all(&self, accounts: &[Account]) -> Result<Vec<Account>>;

    /// Create a new account with a zero balance.
    async fn create(&self, fields: NewAccount) -> Result<Account>;
}
