use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Currency codes understood by the import-cost engine.
///
/// Covers the warehouse currencies (EUR, USD, GBP, CNY), the supplier
/// currencies and MGA, which is the base of the reference rate table.
///
/// # Examples
///
/// ```
/// use import_cost::core::currency::CurrencyCode;
///
/// let eur: CurrencyCode = "eur".parse().unwrap();
/// assert_eq!(eur, CurrencyCode::Eur);
/// assert_eq!(eur.to_string(), "EUR");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CurrencyCode {
    Usd,
    Eur,
    Gbp,
    Cny,
    Mga,
}

impl CurrencyCode {
    pub const ALL: [CurrencyCode; 5] = [
        CurrencyCode::Usd,
        CurrencyCode::Eur,
        CurrencyCode::Gbp,
        CurrencyCode::Cny,
        CurrencyCode::Mga,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CurrencyCode::Usd => "USD",
            CurrencyCode::Eur => "EUR",
            CurrencyCode::Gbp => "GBP",
            CurrencyCode::Cny => "CNY",
            CurrencyCode::Mga => "MGA",
        }
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CurrencyCode {
    type Err = FxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CurrencyCode::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| FxError::UnknownCurrency(s.to_string()))
    }
}

/// Errors arising from exchange-rate operations.
#[derive(Debug, Error)]
pub enum FxError {
    #[error("no exchange rate available for {0}")]
    RateNotFound(CurrencyCode),
    #[error("exchange rate must be positive, got {rate} for {currency}")]
    InvalidRate {
        currency: CurrencyCode,
        rate: Decimal,
    },
    #[error("rate table has no entry for its base currency {0}")]
    MissingBase(CurrencyCode),
    #[error("unknown currency code '{0}'")]
    UnknownCurrency(String),
    #[error("conversion from {from} to {to} is out of range")]
    OutOfRange { from: CurrencyCode, to: CurrencyCode },
}

/// Base-relative exchange rate table.
///
/// Every entry is expressed against one fixed base currency: `rates[C]` is
/// the number of `C` units per one base unit. Converting from `A` to `B`
/// therefore multiplies by `rates[B] / rates[A]`.
///
/// # Examples
///
/// ```
/// use import_cost::core::currency::{CurrencyCode, ExchangeRateTable};
/// use rust_decimal_macros::dec;
///
/// let mut rates = ExchangeRateTable::new(CurrencyCode::Mga);
/// rates.set_rate(CurrencyCode::Mga, dec!(1)).unwrap();
/// rates.set_rate(CurrencyCode::Eur, dec!(0.0002)).unwrap();
///
/// let factor = rates
///     .conversion_factor(CurrencyCode::Eur, CurrencyCode::Mga)
///     .unwrap();
/// assert_eq!(factor, dec!(5000));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRateTable {
    /// The currency every rate is expressed against.
    #[serde(rename = "base")]
    pub base_currency: CurrencyCode,
    rates: BTreeMap<CurrencyCode, Decimal>,
}

impl ExchangeRateTable {
    /// Create an empty table for the given base currency.
    pub fn new(base_currency: CurrencyCode) -> Self {
        Self {
            base_currency,
            rates: BTreeMap::new(),
        }
    }

    /// Build a table from a raw mapping, validating every entry.
    ///
    /// The mapping must contain the base currency.
    pub fn from_rates(
        base_currency: CurrencyCode,
        rates: impl IntoIterator<Item = (CurrencyCode, Decimal)>,
    ) -> Result<Self, FxError> {
        let mut table = Self::new(base_currency);
        for (currency, rate) in rates {
            table.set_rate(currency, rate)?;
        }
        table.validate()?;
        Ok(table)
    }

    /// Set the rate for `currency`: units of `currency` per one base unit.
    pub fn set_rate(&mut self, currency: CurrencyCode, rate: Decimal) -> Result<(), FxError> {
        if rate <= Decimal::ZERO {
            return Err(FxError::InvalidRate { currency, rate });
        }
        self.rates.insert(currency, rate);
        Ok(())
    }

    /// Check the table invariants. Tables read through serde are not
    /// validated until this is called.
    pub fn validate(&self) -> Result<(), FxError> {
        if !self.rates.contains_key(&self.base_currency) {
            return Err(FxError::MissingBase(self.base_currency));
        }
        for (&currency, &rate) in &self.rates {
            if rate <= Decimal::ZERO {
                return Err(FxError::InvalidRate { currency, rate });
            }
        }
        Ok(())
    }

    /// Rate of `currency` against the base.
    pub fn rate(&self, currency: CurrencyCode) -> Result<Decimal, FxError> {
        self.rates
            .get(&currency)
            .copied()
            .ok_or(FxError::RateNotFound(currency))
    }

    /// Factor that converts an amount in `from` into `to`.
    ///
    /// Both currencies must be present even when they are identical; in that
    /// case the factor is exactly one.
    pub fn conversion_factor(
        &self,
        from: CurrencyCode,
        to: CurrencyCode,
    ) -> Result<Decimal, FxError> {
        let from_rate = self.rate(from)?;
        let to_rate = self.rate(to)?;
        if from == to {
            return Ok(Decimal::ONE);
        }
        to_rate
            .checked_div(from_rate)
            .ok_or(FxError::OutOfRange { from, to })
    }

    /// Convert an amount from one currency to another.
    pub fn convert(
        &self,
        amount: Decimal,
        from: CurrencyCode,
        to: CurrencyCode,
    ) -> Result<Decimal, FxError> {
        amount
            .checked_mul(self.conversion_factor(from, to)?)
            .ok_or(FxError::OutOfRange { from, to })
    }
}
