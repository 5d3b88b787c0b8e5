use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Amount;

/// Unique, immutable key of an account. The only lookup key the ledger uses.
pub type AccountNumber = i64;

/// Fields supplied when an account is opened. Identity fields are opaque to the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAccount {
    pub account_number: AccountNumber,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl NewAccount {
    pub fn new(
        account_number: AccountNumber,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            account_number,
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
        }
    }
}

/// An account record as held by the record store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub account_number: AccountNumber,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Canonical units, never negative.
    pub balance: Amount,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Open an account with a zero balance.
    pub fn open(fields: NewAccount) -> Self {
        let now = Utc::now();
        Self {
            account_number: fields.account_number,
            first_name: fields.first_name,
            last_name: fields.last_name,
            email: fields.email,
            balance: 0.0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Return a copy carrying `balance`, stamped with the current time.
    pub fn with_balance(&self, balance: Amount) -> Self {
        Self {
            balance,
            updated_at: Utc::now(),
            ..self.clone()
        }
    }

    /// Balance after crediting `amount` canonical units, or `None` if the sum
    /// is no longer a finite number.
    pub fn credited(&self, amount: Amount) -> Option<Self> {
        let balance = self.balance + amount;
        if balance.is_finite() {
            Some(self.with_balance(balance))
        } else {
            None
        }
    }

    /// Balance after debiting `amount` canonical units, or `None` if it would go negative.
    pub fn debited(&self, amount: Amount) -> Option<Self> {
        let balance = self.balance - amount;
        if balance < 0.0 {
            None
        } else {
            Some(self.with_balance(balance))
        }
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
