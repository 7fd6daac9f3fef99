//! Side-by-side evaluation of the two rounding policies.
//!
//! Used to audit how far historical (legacy) quotes drift from plain
//! rounding for a given shipment.

use crate::core::currency::{CurrencyCode, ExchangeRateTable};
use crate::core::shipment::CalculationInput;
use crate::engine::calculator::{CalculationError, CalculationResult, ImportCostCalculator};
use crate::engine::rounding::RoundingPolicy;
use crate::tariff::config::CalculationConfig;
use serde::{Deserialize, Serialize};

/// One shipment computed under both rounding policies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundingComparison {
    pub simple: CalculationResult,
    pub legacy: CalculationResult,
    /// `legacy.total - simple.total`.
    pub difference: i64,
    /// Difference relative to the simple total, in percent.
    pub difference_percent: f64,
}

impl RoundingComparison {
    pub fn diverges(&self) -> bool {
        self.difference != 0
    }
}

/// Compute `input` under both policies. With `normalize`, the supplier
/// price is restated into the warehouse currency first.
pub fn compare_rounding(
    input: &CalculationInput,
    config: &CalculationConfig,
    rates: &ExchangeRateTable,
    target: CurrencyCode,
    normalize: bool,
) -> Result<RoundingComparison, CalculationError> {
    let calculate = if normalize {
        ImportCostCalculator::calculate_normalized
    } else {
        ImportCostCalculator::calculate
    };
    let simple = calculate(input, config, rates, target, RoundingPolicy::Simple)?;
    let legacy = calculate(input, config, rates, target, RoundingPolicy::Legacy)?;

    let difference = legacy.total - simple.total;
    let difference_percent = if simple.total == 0 {
        0.0
    } else {
        difference as f64 * 100.0 / simple.total as f64
    };

    Ok(RoundingComparison {
        simple,
        legacy,
        difference,
        difference_percent,
    })
}

impl std::fmt::Display for RoundingComparison {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ccy = self.simple.target_currency;
        writeln!(f, "=== Rounding Comparison ===")?;
        if let Some(reference) = &self.simple.reference {
            writeln!(f, "Reference:  {}", reference)?;
        }
        writeln!(f, "Raw total:  {} {}", self.simple.total_raw.round_dp(4), ccy)?;
        writeln!(f, "Simple:     {} {}", self.simple.total, ccy)?;
        writeln!(f, "Legacy:     {} {}", self.legacy.total, ccy)?;
        writeln!(
            f,
            "Difference: {} {} ({:.3}%)",
            self.difference, ccy, self.difference_percent
        )
    }
}
