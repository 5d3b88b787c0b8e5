use std::fmt;

use thiserror::Error;

use crate::domain::{AccountNumber, Amount, AmountError, CurrencyError};

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Invalid currency: {0}")]
    InvalidCurrency(#[from] CurrencyError),

    #[error("Invalid amount: {0}")]
    InvalidAmount(#[from] AmountError),

    #[error("Account not found: {0}")]
    AccountNotFound(AccountNumber),

    #[error("Account already exists: {0}")]
    AccountAlreadyExists(AccountNumber),

    #[error("Insufficient funds in account {account_number}: balance {balance}, required {required}")]
    InsufficientFunds {
        account_number: AccountNumber,
        balance: Amount,
        required: Amount,
    },

    #[error("Transfer from {from} to {to} failed: {source}")]
    TransferFailed {
        from: AccountNumber,
        to: AccountNumber,
        #[source]
        source: Box<LedgerError>,
    },

    #[error("Store error: {0}")]
    Store(#[from] anyhow::Error),
}

/// Coarse classification of a [`LedgerError`], for callers that branch on kind only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerErrorKind {
    InvalidCurrency,
    InvalidAmount,
    AccountNotFound,
    AccountAlreadyExists,
    InsufficientFunds,
    TransferFailed,
    Store,
}

/// The public ledger operations, used to render legacy error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerOperation {
    OpenAccount,
    Deposit,
    Withdraw,
    Transfer,
    GetAccount,
    GetBalanceIn,
}

impl fmt::Display for LedgerOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LedgerOperation::OpenAccount => "open_account",
            LedgerOperation::Deposit => "deposit",
            LedgerOperation::Withdraw => "withdraw",
            LedgerOperation::Transfer => "transfer",
            LedgerOperation::GetAccount => "get_account",
            LedgerOperation::GetBalanceIn => "get_balance_in",
        };
        write!(f, "{}", name)
    }
}

impl LedgerError {
    pub fn kind(&self) -> LedgerErrorKind {
        match self {
            LedgerError::InvalidCurrency(_) => LedgerErrorKind::InvalidCurrency,
            LedgerError::InvalidAmount(_) => LedgerErrorKind::InvalidAmount,
            LedgerError::AccountNotFound(_) => LedgerErrorKind::AccountNotFound,
            LedgerError::AccountAlreadyExists(_) => LedgerErrorKind::AccountAlreadyExists,
            LedgerError::InsufficientFunds { .. } => LedgerErrorKind::InsufficientFunds,
            LedgerError::TransferFailed { .. } => LedgerErrorKind::TransferFailed,
            LedgerError::Store(_) => LedgerErrorKind::Store,
        }
    }

    /// The innermost ledger error, looking through `TransferFailed`.
    pub fn root_cause(&self) -> &LedgerError {
        match self {
            LedgerError::TransferFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Flattened message as reported by the older API, which collapsed every
    /// mutation failure into one generic message per operation.
    pub fn legacy_message(&self, operation: LedgerOperation) -> String {
        match operation {
            LedgerOperation::Deposit => "User could not deposit".to_string(),
            LedgerOperation::Withdraw => "User could not withdraw".to_string(),
            LedgerOperation::Transfer => "User could not transfer".to_string(),
            LedgerOperation::GetAccount => "User not found".to_string(),
            LedgerOperation::OpenAccount | LedgerOperation::GetBalanceIn => self.to_string(),
        }
    }
}
