use std::fmt;

/// Monetary amounts are plain floating-point values. Stored balances are in
/// canonical units; caller-supplied amounts are in whatever currency they name.
/// No rounding is applied anywhere in the ledger.
pub type Amount = f64;

/// Format an amount with two decimals for display.
/// Example: 20.0 -> "20.00", 8231.4 -> "8231.40"
pub fn format_amount(amount: Amount) -> String {
    format!("{:.2}", amount)
}

/// Parse user text into an amount.
/// Example: "50" -> 50.0, "12.5" -> 12.5, "4115.7" -> 4115.7
pub fn parse_amount(input: &str) -> Result<Amount, ParseAmountError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ParseAmountError::Empty);
    }

    let amount: Amount = input
        .parse()
        .map_err(|_| ParseAmountError::InvalidFormat(input.to_string()))?;

    if !amount.is_finite() {
        return Err(ParseAmountError::InvalidFormat(input.to_string()));
    }

    Ok(amount)
}

/// Check that an amount can be moved through the ledger: finite and strictly positive.
pub fn validate_amount(amount: Amount) -> Result<Amount, AmountError> {
    if !amount.is_finite() {
        return Err(AmountError::NotFinite);
    }
    if amount <= 0.0 {
        return Err(AmountError::NotPositive(amount));
    }
    Ok(amount)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseAmountError {
    Empty,
    InvalidFormat(String),
}

impl fmt::Display for ParseAmountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseAmountError::Empty => write!(f, "amount is empty"),
            ParseAmountError::InvalidFormat(input) => write!(f, "invalid amount: {}", input),
        }
    }
}

impl std::error::Error for ParseAmountError {}

#[derive(Debug, Clone, PartialEq)]
pub enum AmountError {
    NotFinite,
    NotPositive(Amount),
}

impl fmt::Display for AmountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AmountError::NotFinite => write!(f, "amount must be a finite number"),
            AmountError::NotPositive(amount) => {
                write!(f, "amount must be positive, got {}", amount)
            }
        }
    }
}

impl std::error::Error for AmountError {}
