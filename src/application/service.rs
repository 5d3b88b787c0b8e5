use anyhow::anyhow;

use crate::domain::{
    Account, AccountNumber, Amount, AmountError, CANONICAL_CURRENCY, CurrencyConverter,
    NewAccount, validate_amount,
};
use crate::storage::{RecordStore, Repository};

use super::{AccountLocks, LedgerError};

/// Application service providing the ledger operations.
/// Amounts arrive in any supported currency and are normalized to canonical
/// units before they touch a stored balance.
pub struct LedgerService<S = Repository> {
    store: S,
    converter: CurrencyConverter,
    locks: AccountLocks,
}

/// Result of a transfer: both accounts as committed.
#[derive(Debug, Clone)]
pub struct TransferResult {
    pub withdrawal: Account,
    pub deposit: Account,
}

impl LedgerService<Repository> {
    /// Initialize (create if missing, then migrate) a SQLite database at the given path.
    pub async fn init(
        database_path: &str,
        converter: CurrencyConverter,
    ) -> Result<Self, LedgerError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        Ok(Self::new(repo, converter))
    }

    /// Connect to an existing SQLite database.
    pub async fn connect(
        database_path: &str,
        converter: CurrencyConverter,
    ) -> Result<Self, LedgerError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::connect(&db_url).await?;
        Ok(Self::new(repo, converter))
    }
}

impl<S: RecordStore> LedgerService<S> {
    /// Create a new ledger service over the given record store.
    pub fn new(store: S, converter: CurrencyConverter) -> Self {
        Self {
            store,
            converter,
            locks: AccountLocks::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn converter(&self) -> &CurrencyConverter {
        &self.converter
    }

    // ========================
    // Account operations
    // ========================

    /// Open a new account with a zero balance.
    #[tracing::instrument(skip(self, new_account), fields(account_number = new_account.account_number))]
    pub async fn open_account(&self, new_account: NewAccount) -> Result<Account, LedgerError> {
        let account_number = new_account.account_number;
        let _guard = self.locks.lock(account_number).await;

        if self
            .store
            .find_by_account_number(account_number)
            .await?
            .is_some()
        {
            return Err(LedgerError::AccountAlreadyExists(account_number));
        }

        let account = self.store.create(new_account).await?;
        tracing::info!(account_number, "Account opened");
        Ok(account)
    }

    /// Get an account by number.
    pub async fn get_account(&self, account_number: AccountNumber) -> Result<Account, LedgerError> {
        self.store
            .find_by_account_number(account_number)
            .await?
            .ok_or(LedgerError::AccountNotFound(account_number))
    }

    /// Get an account's balance converted into `currency` (canonical when `None`).
    #[tracing::instrument(skip(self))]
    pub async fn get_balance_in(
        &self,
        account_number: AccountNumber,
        currency: Option<&str>,
    ) -> Result<Amount, LedgerError> {
        let account = self.get_account(account_number).await?;
        let currency = currency.unwrap_or(CANONICAL_CURRENCY);
        Ok(self.converter.from_canonical(currency, account.balance)?)
    }

    // ========================
    // Balance mutations
    // ========================

    /// Credit `amount` of `currency` to an account.
    #[tracing::instrument(skip(self))]
    pub async fn deposit(
        &self,
        account_number: AccountNumber,
        amount: Amount,
        currency: Option<&str>,
    ) -> Result<Account, LedgerError> {
        let canonical = self.to_canonical(amount, currency)?;

        let _guard = self.locks.lock(account_number).await;
        let account = self.get_account(account_number).await?;
        let credited = Self::credit(&account, canonical)?;
        let account = self.store.save(&credited).await?;

        tracing::info!(
            account_number,
            canonical,
            balance = account.balance,
            "Deposit committed"
        );
        Ok(account)
    }

    /// Debit `amount` of `currency` from an account. Rejected in full when the
    /// balance would go negative.
    #[tracing::instrument(skip(self))]
    pub async fn withdraw(
        &self,
        account_number: AccountNumber,
        amount: Amount,
        currency: Option<&str>,
    ) -> Result<Account, LedgerError> {
        let canonical = self.to_canonical(amount, currency)?;

        let _guard = self.locks.lock(account_number).await;
        let account = self.get_account(account_number).await?;
        let debited = Self::debit(&account, canonical)?;
        let account = self.store.save(&debited).await?;

        tracing::info!(
            account_number,
            canonical,
            balance = account.balance,
            "Withdrawal committed"
        );
        Ok(account)
    }

    /// Move `amount` of `currency` between two accounts. Both balances are
    /// committed together or not at all.
    #[tracing::instrument(skip(self))]
    pub async fn transfer(
        &self,
        from: AccountNumber,
        to: AccountNumber,
        amount: Amount,
        currency: Option<&str>,
    ) -> Result<TransferResult, LedgerError> {
        self.execute_transfer(from, to, amount, currency)
            .await
            .map_err(|source| LedgerError::TransferFailed {
                from,
                to,
                source: Box::new(source),
            })
    }

    /// Drop lock entries for accounts no operation is currently touching.
    pub async fn prune_locks(&self) {
        self.locks.prune().await;
    }

    async fn execute_transfer(
        &self,
        from: AccountNumber,
        to: AccountNumber,
        amount: Amount,
        currency: Option<&str>,
    ) -> Result<TransferResult, LedgerError> {
        let canonical = self.to_canonical(amount, currency)?;

        let _guard = self.locks.lock_all(&[from, to]).await;
        // Withdrawal leg first, so an overdraft is reported before a missing destination
        let source = self.get_account(from).await?;
        let debited = Self::debit(&source, canonical)?;
        let destination = self.get_account(to).await?;

        if from == to {
            // Funds were checked; nothing moves
            return Ok(TransferResult {
                withdrawal: source.clone(),
                deposit: source,
            });
        }

        let credited = Self::credit(&destination, canonical)?;
        let saved = self.store.save_all(&[debited, credited]).await?;
        let [withdrawal, deposit]: [Account; 2] = saved
            .try_into()
            .map_err(|saved: Vec<Account>| {
                anyhow!("Store returned {} records for a two-account transfer", saved.len())
            })?;

        tracing::info!(
            from,
            to,
            canonical,
            from_balance = withdrawal.balance,
            to_balance = deposit.balance,
            "Transfer committed"
        );
        Ok(TransferResult {
            withdrawal,
            deposit,
        })
    }

    fn to_canonical(&self, amount: Amount, currency: Option<&str>) -> Result<Amount, LedgerError> {
        let amount = validate_amount(amount)?;
        let currency = currency.unwrap_or(CANONICAL_CURRENCY);
        // A tiny injected rate can push the converted amount out of range
        let canonical = validate_amount(self.converter.to_canonical(currency, amount)?)?;
        tracing::debug!(currency, amount, canonical, "Converted to canonical units");
        Ok(canonical)
    }

    fn credit(account: &Account, canonical: Amount) -> Result<Account, LedgerError> {
        account.credited(canonical).ok_or_else(|| {
            tracing::warn!(
                account_number = account.account_number,
                balance = account.balance,
                canonical,
                "Credit would overflow the balance"
            );
            LedgerError::InvalidAmount(AmountError::NotFinite)
        })
    }

    fn debit(account: &Account, canonical: Amount) -> Result<Account, LedgerError> {
        account.debited(canonical).ok_or_else(|| {
            tracing::warn!(
                account_number = account.account_number,
                balance = account.balance,
                required = canonical,
                "Insufficient funds"
            );
            LedgerError::InsufficientFunds {
                account_number: account.account_number,
                balance: account.balance,
                required: canonical,
            }
        })
    }
}
