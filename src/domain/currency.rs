use std::collections::HashMap;
use std::fmt;

use super::Amount;

/// The unit every balance is stored in.
pub const CANONICAL_CURRENCY: &str = "USD";

/// Built-in exchange rates, expressed as units of foreign currency per 1 canonical unit.
/// The long names are aliases kept for callers of the older API.
pub const DEFAULT_RATES: &[(&str, f64)] = &[
    ("USD", 1.0),
    ("NGN", 411.57),
    ("JPY", 109.47),
    ("CNY", 6.46),
    ("naira", 411.57),
    ("yen", 109.47),
    ("yuan", 6.46),
];

/// Long names of the older API and the codes they stand for. A rate override
/// on either name applies to both.
const ALIASES: &[(&str, &str)] = &[("naira", "NGN"), ("yen", "JPY"), ("yuan", "CNY")];

/// Case-insensitive mapping from currency name to exchange rate.
/// Immutable once built; hand a new table to a new converter to change rates.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    rates: HashMap<String, f64>,
}

impl RateTable {
    /// Build a table from `(name, rate)` pairs. Rates must be finite and positive,
    /// and the canonical currency must be present at rate 1.
    pub fn new<I, S>(pairs: I) -> Result<Self, RateError>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let mut rates = HashMap::new();
        for (name, rate) in pairs {
            let key = normalize(name.as_ref()).ok_or(RateError::EmptyName)?;
            if !rate.is_finite() || rate <= 0.0 {
                return Err(RateError::InvalidRate { currency: key, rate });
            }
            rates.insert(key, rate);
        }

        match rates.get(&normalize_unchecked(CANONICAL_CURRENCY)) {
            Some(rate) if *rate == 1.0 => Ok(Self { rates }),
            _ => Err(RateError::MissingCanonical),
        }
    }

    /// Parse an override list such as `"NGN=411.57, JPY=109.47"`.
    /// The result is not validated against the canonical currency; merge it onto
    /// a complete table with [`RateTable::merge`].
    pub fn parse(input: &str) -> Result<Vec<(String, f64)>, RateError> {
        input
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                let (name, rate) = entry
                    .split_once('=')
                    .ok_or_else(|| RateError::InvalidEntry(entry.to_string()))?;
                let rate: f64 = rate
                    .trim()
                    .parse()
                    .map_err(|_| RateError::InvalidEntry(entry.to_string()))?;
                Ok((name.trim().to_string(), rate))
            })
            .collect()
    }

    /// Overlay `overrides` on this table, producing a new validated table.
    /// Overriding a code also overrides its long-name alias when this table has
    /// one, and the other way round.
    pub fn merge<I, S>(&self, overrides: I) -> Result<Self, RateError>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let mut pairs: Vec<(String, f64)> = self
            .rates
            .iter()
            .map(|(name, rate)| (name.clone(), *rate))
            .collect();
        for (name, rate) in overrides {
            let name = name.as_ref();
            let partner = normalize(name)
                .and_then(|key| alias_partner(&key))
                .filter(|partner| self.rates.contains_key(partner));
            if let Some(partner) = partner {
                pairs.push((partner, rate));
            }
            pairs.push((name.to_string(), rate));
        }
        Self::new(pairs)
    }

    /// Look up the rate for a currency name, ignoring case and surrounding whitespace.
    pub fn rate(&self, currency: &str) -> Option<f64> {
        normalize(currency).and_then(|key| self.rates.get(&key).copied())
    }

    /// All known currency names, sorted.
    pub fn currencies(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.rates.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for RateTable {
    fn default() -> Self {
        Self {
            rates: DEFAULT_RATES
                .iter()
                .map(|(name, rate)| (normalize_unchecked(name), *rate))
                .collect(),
        }
    }
}

fn normalize(name: &str) -> Option<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

fn normalize_unchecked(name: &str) -> String {
    name.trim().to_lowercase()
}

fn alias_partner(key: &str) -> Option<String> {
    ALIASES.iter().find_map(|(alias, code)| {
        let code = normalize_unchecked(code);
        if key == *alias {
            Some(code)
        } else if key == code {
            Some(alias.to_string())
        } else {
            None
        }
    })
}

/// Converts amounts between a named currency and the canonical unit.
#[derive(Debug, Clone, Default)]
pub struct CurrencyConverter {
    rates: RateTable,
}

impl CurrencyConverter {
    pub fn new(rates: RateTable) -> Self {
        Self { rates }
    }

    pub fn rates(&self) -> &RateTable {
        &self.rates
    }

    pub fn supports(&self, currency: &str) -> bool {
        self.rates.rate(currency).is_some()
    }

    /// Convert `amount` in `currency` to canonical units (`amount / rate`).
    pub fn to_canonical(&self, currency: &str, amount: Amount) -> Result<Amount, CurrencyError> {
        Ok(amount / self.lookup(currency)?)
    }

    /// Convert a canonical amount into `currency` (`amount * rate`).
    pub fn from_canonical(&self, currency: &str, amount: Amount) -> Result<Amount, CurrencyError> {
        Ok(amount * self.lookup(currency)?)
    }

    fn lookup(&self, currency: &str) -> Result<f64, CurrencyError> {
        if currency.trim().is_empty() {
            return Err(CurrencyError::Missing);
        }
        self.rates
            .rate(currency)
            .ok_or_else(|| CurrencyError::Unknown(currency.to_string()))
    }
}

/// A currency name that cannot be converted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CurrencyError {
    Missing,
    Unknown(String),
}

impl fmt::Display for CurrencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CurrencyError::Missing => write!(f, "currency required"),
            CurrencyError::Unknown(name) => write!(f, "currency does not exist: {}", name),
        }
    }
}

impl std::error::Error for CurrencyError {}

#[derive(Debug, Clone, PartialEq)]
pub enum RateError {
    EmptyName,
    InvalidRate { currency: String, rate: f64 },
    InvalidEntry(String),
    MissingCanonical,
}

impl fmt::Display for RateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateError::EmptyName => write!(f, "currency name is empty"),
            RateError::InvalidRate { currency, rate } => {
                write!(f, "rate for {} must be positive, got {}", currency, rate)
            }
            RateError::InvalidEntry(entry) => {
                write!(f, "invalid rate entry '{}', expected NAME=RATE", entry)
            }
            RateError::MissingCanonical => {
                write!(f, "rate table must map {} to 1", CANONICAL_CURRENCY)
            }
        }
    }
}

impl std::error::Error for RateError {}
