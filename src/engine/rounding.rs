use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::warehouse::ParseEnumError;

/// How the converted total is rounded to whole target-currency units.
///
/// Halves round away from zero. Totals are never negative, so this is the
/// usual "round half up".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundingPolicy {
    /// Round to the nearest unit.
    #[default]
    Simple,
    /// Compatibility mode reproducing historical quotes: round to the
    /// nearest unit, then to the nearest hundred units.
    Legacy,
}

impl RoundingPolicy {
    /// Apply the policy. The result always has no fractional part.
    ///
    /// # Examples
    ///
    /// ```
    /// use import_cost::engine::rounding::RoundingPolicy;
    /// use rust_decimal_macros::dec;
    ///
    /// assert_eq!(RoundingPolicy::Simple.apply(dec!(165619.0476)), dec!(165619));
    /// assert_eq!(RoundingPolicy::Legacy.apply(dec!(165619.0476)), dec!(165600));
    /// ```
    pub fn apply(&self, raw: Decimal) -> Decimal {
        let units = round_units(raw);
        match self {
            RoundingPolicy::Simple => units,
            RoundingPolicy::Legacy => {
                let hundreds = round_units(units / Decimal::ONE_HUNDRED);
                hundreds * Decimal::ONE_HUNDRED
            }
        }
    }
}

fn round_units(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

impl fmt::Display for RoundingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoundingPolicy::Simple => write!(f, "simple"),
            RoundingPolicy::Legacy => write!(f, "legacy"),
        }
    }
}

impl FromStr for RoundingPolicy {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simple" => Ok(RoundingPolicy::Simple),
            "legacy" => Ok(RoundingPolicy::Legacy),
            _ => Err(ParseEnumError {
                kind: "rounding policy",
                value: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_simple_rounds_half_up() {
        assert_eq!(RoundingPolicy::Simple.apply(dec!(34.5)), dec!(35));
        assert_eq!(RoundingPolicy::Simple.apply(dec!(34.49)), dec!(34));
        assert_eq!(RoundingPolicy::Simple.apply(dec!(173900)), dec!(173900));
    }

    #[test]
    fn test_legacy_rounds_to_hundreds() {
        assert_eq!(RoundingPolicy::Legacy.apply(dec!(173949.6)), dec!(173900));
        // 173949.5 -> 173950 -> 1739.5 -> 1740
        assert_eq!(RoundingPolicy::Legacy.apply(dec!(173949.5)), dec!(174000));
        assert_eq!(RoundingPolicy::Legacy.apply(dec!(49.4)), Decimal::ZERO);
    }

    #[test]
    fn test_legacy_is_idempotent() {
        let once = RoundingPolicy::Legacy.apply(dec!(165619.0476));
        assert_eq!(RoundingPolicy::Legacy.apply(once), once);
    }

    #[test]
    fn test_default_is_simple() {
        assert_eq!(RoundingPolicy::default(), RoundingPolicy::Simple);
    }

    #[test]
    fn test_parse() {
        assert_eq!("LEGACY".parse::<RoundingPolicy>().unwrap(), RoundingPolicy::Legacy);
        assert!("bankers".parse::<RoundingPolicy>().is_err());
    }
}
