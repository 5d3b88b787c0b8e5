use std::collections::HashMap;

use anyhow::{Result, bail};
use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{Account, AccountNumber, NewAccount};

use super::RecordStore;

/// Process-local record store. Useful for tests and for embedding the ledger
/// without a database.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    accounts: RwLock<HashMap<AccountNumber, Account>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored accounts.
    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.accounts.read().await.is_empty()
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn find_by_account_number(
        &self,
        account_number: AccountNumber,
    ) -> Result<Option<Account>> {
        Ok(self.accounts.read().await.get(&account_number).cloned())
    }

    async fn save(&self, account: &Account) -> Result<Account> {
        let mut accounts = self.accounts.write().await;
        match accounts.get_mut(&account.account_number) {
            Some(stored) => {
                stored.balance = account.balance;
                stored.updated_at = account.updated_at;
                Ok(stored.clone())
            }
            None => bail!("Account {} does not exist", account.account_number),
        }
    }

    async fn save_all(&self, accounts: &[Account]) -> Result<Vec<Account>> {
        let mut stored = self.accounts.write().await;

        // Validate every record before touching any of them
        for account in accounts {
            if !stored.contains_key(&account.account_number) {
                bail!("Account {} does not exist", account.account_number);
            }
        }

        let mut saved = Vec::with_capacity(accounts.len());
        for account in accounts {
            if let Some(entry) = stored.get_mut(&account.account_number) {
                entry.balance = account.balance;
                entry.updated_at = account.updated_at;
                saved.push(entry.clone());
            }
        }
        Ok(saved)
    }

    async fn create(&self, fields: NewAccount) -> Result<Account> {
        let mut accounts = self.accounts.write().await;

        if accounts.contains_key(&fields.account_number) {
            bail!("Account {} already exists", fields.account_number);
        }
        if accounts.values().any(|a| a.email == fields.email) {
            bail!("Email already registered: {}", fields.email);
        }

        let account = Account::open(fields);
        accounts.insert(account.account_number, account.clone());
        Ok(account)
    }
}
