use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqliteConnection, SqlitePool};

use crate::domain::{Account, AccountNumber, NewAccount};

use super::{MIGRATION_001_INITIAL, RecordStore};

/// SQLite-backed record store for accounts.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given URL.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Initialize a database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    fn row_to_account(row: &sqlx::sqlite::SqliteRow) -> Result<Account> {
        let created_at_str: String = row.get("created_at");
        let updated_at_str: String = row.get("updated_at");

        Ok(Account {
            account_number: row.get("account_number"),
            first_name: row.get("first_name"),
            last_name: row.get("last_name"),
            email: row.get("email"),
            balance: row.get("balance"),
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .context("Invalid created_at timestamp")?
                .with_timezone(&Utc),
            updated_at: DateTime::parse_from_rfc3339(&updated_at_str)
                .context("Invalid updated_at timestamp")?
                .with_timezone(&Utc),
        })
    }

    async fn fetch(&self, account_number: AccountNumber) -> Result<Option<Account>> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .context("Failed to acquire connection")?;
        Self::fetch_with(&mut *conn, account_number).await
    }

    async fn fetch_with(
        conn: &mut SqliteConnection,
        account_number: AccountNumber,
    ) -> Result<Option<Account>> {
        let row = sqlx::query(
            r#"
            SELECT account_number, first_name, last_name, email, balance, created_at, updated_at
            FROM accounts
            WHERE account_number = ?
            "#,
        )
        .bind(account_number)
        .fetch_optional(&mut *conn)
        .await
        .context("Failed to fetch account")?;

        row.as_ref().map(Self::row_to_account).transpose()
    }

    /// Write the balance of each account, then read every row back, all on one
    /// connection inside the caller's transaction.
    async fn update_balances(
        conn: &mut SqliteConnection,
        accounts: &[Account],
    ) -> Result<Vec<Account>> {
        for account in accounts {
            let result = sqlx::query(UPDATE_BALANCE)
                .bind(account.balance)
                .bind(account.updated_at.to_rfc3339())
                .bind(account.account_number)
                .execute(&mut *conn)
                .await
                .context("Failed to save account")?;

            if result.rows_affected() != 1 {
                bail!("Account {} does not exist", account.account_number);
            }
        }

        let mut saved = Vec::with_capacity(accounts.len());
        for account in accounts {
            let row = Self::fetch_with(conn, account.account_number)
                .await?
                .with_context(|| {
                    format!("Account {} vanished during save", account.account_number)
                })?;
            saved.push(row);
        }
        Ok(saved)
    }
}

const UPDATE_BALANCE: &str = r#"
    UPDATE accounts
    SET balance = ?, updated_at = ?
    WHERE account_number = ?
"#;

#[async_trait]
impl RecordStore for Repository {
    async fn find_by_account_number(
        &self,
        account_number: AccountNumber,
    ) -> Result<Option<Account>> {
        self.fetch(account_number).await
    }

    async fn save(&self, account: &Account) -> Result<Account> {
        let mut saved = self.save_all(std::slice::from_ref(account)).await?;
        saved.pop().context("Save returned no record")
    }

    async fn save_all(&self, accounts: &[Account]) -> Result<Vec<Account>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;

        // Dropping the transaction on error rolls back earlier updates
        let saved = Self::update_balances(&mut *tx, accounts).await?;

        tx.commit().await.context("Failed to commit transaction")?;
        Ok(saved)
    }

    async fn create(&self, fields: NewAccount) -> Result<Account> {
        let account = Account::open(fields);

        sqlx::query(
            r#"
            INSERT INTO accounts (account_number, first_name, last_name, email, balance, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(account.account_number)
        .bind(&account.first_name)
        .bind(&account.last_name)
        .bind(&account.email)
        .bind(account.balance)
        .bind(account.created_at.to_rfc3339())
        .bind(account.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to create account")?;

        Ok(account)
    }
}
