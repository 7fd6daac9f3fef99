use crate::core::warehouse::Warehouse;
use crate::tariff::commission::CommissionSchedule;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Persisted tariff parameters for the landed-cost calculation.
///
/// All amounts are stated in the natural currency of the warehouse the
/// goods ship from. The schedule is validated when the config is loaded
/// (see [`CalculationConfig::from_settings`]), not on every calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationConfig {
    /// Transport cost per kilogram for each warehouse.
    pub transport_rate_per_kg: BTreeMap<Warehouse, Decimal>,
    /// Tiered commission on the supplier price.
    pub commission: CommissionSchedule,
    /// Flat processing fee.
    pub processing_fee: Decimal,
    /// Tax applied to the supplier price, in percent.
    pub tax_rate_percent: Decimal,
}

impl CalculationConfig {
    pub fn transport_rate(&self, warehouse: Warehouse) -> Option<Decimal> {
        self.transport_rate_per_kg.get(&warehouse).copied()
    }
}

impl Default for CalculationConfig {
    /// Reference tariff: commission tiers 25/35/38/30/25%, a processing fee
    /// of 2 and 3.5% tax.
    fn default() -> Self {
        Self {
            transport_rate_per_kg: BTreeMap::from([
                (Warehouse::France, dec!(15)),
                (Warehouse::Usa, dec!(20)),
                (Warehouse::Uk, dec!(18)),
                (Warehouse::China, dec!(12)),
            ]),
            commission: CommissionSchedule::default(),
            processing_fee: dec!(2),
            tax_rate_percent: dec!(3.5),
        }
    }
}

impl fmt::Display for CalculationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Tariff ===")?;
        writeln!(f, "Transport (per kg):")?;
        for (warehouse, rate) in &self.transport_rate_per_kg {
            writeln!(f, "  {:<8} {} {}", warehouse, rate, warehouse.currency())?;
        }
        writeln!(f, "Commission:")?;
        write!(f, "{}", self.commission)?;
        writeln!(f, "Processing fee: {}", self.processing_fee)?;
        writeln!(f, "Tax rate:       {}%", self.tax_rate_percent)
    }
}
