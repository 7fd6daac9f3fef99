//! Adapter from the flat named-key settings store into a validated
//! [`CalculationConfig`].
//!
//! The store holds one decimal per key:
//!
//! | key                        | meaning                                   |
//! |----------------------------|-------------------------------------------|
//! | `transport_<warehouse>_rate` | per-kg transport rate, e.g. `transport_france_rate` |
//! | `commission_<lo>_<hi>`     | commission percent for prices in `[lo, hi)` |
//! | `commission_<lo>_plus`     | commission percent for prices `>= lo`     |
//! | `processing_fee`           | flat processing fee                       |
//! | `tax_rate`                 | tax percent on the supplier price         |

use crate::core::warehouse::Warehouse;
use crate::tariff::commission::{CommissionBracket, CommissionSchedule, ScheduleError};
use crate::tariff::config::CalculationConfig;
use log::debug;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

const PROCESSING_FEE_KEY: &str = "processing_fee";
const TAX_RATE_KEY: &str = "tax_rate";
const COMMISSION_PREFIX: &str = "commission_";

/// Errors raised while turning stored settings into a config.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing setting '{0}'")]
    MissingKey(String),
    #[error("malformed setting key '{0}'")]
    InvalidKey(String),
    #[error("setting '{key}' has invalid value {value}")]
    InvalidValue { key: String, value: Decimal },
    #[error("commission brackets leave a gap or overlap at {0}")]
    BracketGap(Decimal),
    #[error("invalid commission schedule: {0}")]
    InvalidBrackets(#[from] ScheduleError),
}

/// A bracket as read from its key, before contiguity is checked.
struct RawBracket {
    lower: Decimal,
    upper: Option<Decimal>,
    rate: Decimal,
}

impl CalculationConfig {
    /// Parse named settings into a config.
    ///
    /// `processing_fee`, `tax_rate`, at least one transport rate and a
    /// complete commission schedule are required; nothing is defaulted.
    /// Unrecognised keys are skipped.
    ///
    /// # Examples
    ///
    /// ```
    /// use import_cost::core::warehouse::Warehouse;
    /// use import_cost::tariff::config::CalculationConfig;
    /// use rust_decimal_macros::dec;
    /// use std::collections::HashMap;
    ///
    /// let settings = HashMap::from([
    ///     ("transport_france_rate".to_string(), dec!(15)),
    ///     ("commission_0_10".to_string(), dec!(25)),
    ///     ("commission_10_plus".to_string(), dec!(35)),
    ///     ("processing_fee".to_string(), dec!(2)),
    ///     ("tax_rate".to_string(), dec!(3.5)),
    /// ]);
    ///
    /// let config = CalculationConfig::from_settings(&settings).unwrap();
    /// assert_eq!(config.transport_rate(Warehouse::France), Some(dec!(15)));
    /// assert_eq!(config.commission.rate_for(dec!(10)), Some(dec!(35)));
    /// ```
    pub fn from_settings(settings: &HashMap<String, Decimal>) -> Result<Self, ConfigError> {
        let mut transport_rate_per_kg = BTreeMap::new();
        let mut raw_brackets = Vec::new();

        for (key, &value) in settings {
            if let Some(warehouse) = transport_key(key) {
                non_negative(key, value)?;
                transport_rate_per_kg.insert(warehouse, value);
            } else if let Some(range) = key.strip_prefix(COMMISSION_PREFIX) {
                non_negative(key, value)?;
                raw_brackets.push(parse_bracket(key, range, value)?);
            } else if key != PROCESSING_FEE_KEY && key != TAX_RATE_KEY {
                debug!("ignoring unrecognised setting '{}'", key);
            }
        }

        if transport_rate_per_kg.is_empty() {
            return Err(ConfigError::MissingKey("transport_<warehouse>_rate".to_string()));
        }

        let processing_fee = required(settings, PROCESSING_FEE_KEY)?;
        let tax_rate_percent = required(settings, TAX_RATE_KEY)?;

        Ok(Self {
            transport_rate_per_kg,
            commission: build_schedule(raw_brackets)?,
            processing_fee,
            tax_rate_percent,
        })
    }

    /// The inverse of [`CalculationConfig::from_settings`].
    pub fn to_settings(&self) -> HashMap<String, Decimal> {
        let mut settings = HashMap::new();
        for (warehouse, rate) in &self.transport_rate_per_kg {
            settings.insert(format!("transport_{}_rate", warehouse.as_str()), *rate);
        }
        let mut lower = Decimal::ZERO;
        for bracket in self.commission.brackets() {
            match bracket.upper_bound {
                Some(upper) => {
                    settings.insert(format!("commission_{}_{}", lower, upper), bracket.rate_percent);
                    lower = upper;
                }
                None => {
                    settings.insert(format!("commission_{}_plus", lower), bracket.rate_percent);
                }
            }
        }
        settings.insert(PROCESSING_FEE_KEY.to_string(), self.processing_fee);
        settings.insert(TAX_RATE_KEY.to_string(), self.tax_rate_percent);
        settings
    }
}

fn transport_key(key: &str) -> Option<Warehouse> {
    let name = key.strip_prefix("transport_")?.strip_suffix("_rate")?;
    name.parse().ok()
}

fn parse_bracket(key: &str, range: &str, rate: Decimal) -> Result<RawBracket, ConfigError> {
    let invalid = || ConfigError::InvalidKey(key.to_string());
    let (lower, upper) = range.split_once('_').ok_or_else(invalid)?;
    let lower: Decimal = lower.parse().map_err(|_| invalid())?;
    let upper = match upper {
        "plus" => None,
        bound => Some(bound.parse::<Decimal>().map_err(|_| invalid())?),
    };
    Ok(RawBracket { lower, upper, rate })
}

fn build_schedule(mut raw: Vec<RawBracket>) -> Result<CommissionSchedule, ConfigError> {
    if raw.is_empty() {
        return Err(ConfigError::MissingKey(format!("{}<lo>_<hi>", COMMISSION_PREFIX)));
    }
    raw.sort_by(|a, b| a.lower.cmp(&b.lower));

    // Each bracket must start where the previous one stopped.
    let mut expected_lower = Some(Decimal::ZERO);
    for bracket in &raw {
        if expected_lower != Some(bracket.lower) {
            return Err(ConfigError::BracketGap(bracket.lower));
        }
        expected_lower = bracket.upper;
    }

    let brackets = raw
        .into_iter()
        .map(|b| CommissionBracket {
            upper_bound: b.upper,
            rate_percent: b.rate,
        })
        .collect();
    Ok(CommissionSchedule::new(brackets)?)
}

fn required(settings: &HashMap<String, Decimal>, key: &str) -> Result<Decimal, ConfigError> {
    let value = settings
        .get(key)
        .copied()
        .ok_or_else(|| ConfigError::MissingKey(key.to_string()))?;
    non_negative(key, value)?;
    Ok(value)
}

fn non_negative(key: &str, value: Decimal) -> Result<(), ConfigError> {
    if value < Decimal::ZERO {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value,
        });
    }
    Ok(())
}
