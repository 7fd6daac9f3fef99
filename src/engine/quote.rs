use crate::core::currency::{CurrencyCode, ExchangeRateTable};
use crate::core::shipment::CalculationInput;
use crate::engine::calculator::{CalculationError, CalculationResult, ImportCostCalculator};
use crate::engine::rounding::RoundingPolicy;
use crate::tariff::config::CalculationConfig;
use chrono::{DateTime, Utc};
use log::info;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum QuoteError {
    #[error("quote has no lines")]
    Empty,
    #[error("line {index}: {source}")]
    Line {
        index: usize,
        #[source]
        source: CalculationError,
    },
    #[error("grand total out of range after line {index}")]
    TotalOverflow { index: usize },
}

/// Options shared by every line of a quote.
#[derive(Debug, Clone, Copy)]
pub struct QuoteOptions {
    pub target: CurrencyCode,
    pub rounding: RoundingPolicy,
    /// Convert each supplier price into its warehouse currency first.
    pub normalize: bool,
}

impl Default for QuoteOptions {
    fn default() -> Self {
        Self {
            target: CurrencyCode::Mga,
            rounding: RoundingPolicy::default(),
            normalize: false,
        }
    }
}

/// A priced multi-line quote (devis).
///
/// Every line is computed against the same config and rate snapshot.
/// The quote is all-or-nothing: a single failing line fails the whole
/// quote.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    id: Uuid,
    created_at: DateTime<Utc>,
    target_currency: CurrencyCode,
    rounding: RoundingPolicy,
    lines: Vec<CalculationResult>,
    /// Sum of the rounded line totals.
    grand_total: i64,
    /// Sum of the unrounded line totals.
    grand_total_raw: Decimal,
}

impl Quote {
    pub fn build(
        lines: &[CalculationInput],
        config: &CalculationConfig,
        rates: &ExchangeRateTable,
        options: QuoteOptions,
    ) -> Result<Self, QuoteError> {
        if lines.is_empty() {
            return Err(QuoteError::Empty);
        }

        let calculate = if options.normalize {
            ImportCostCalculator::calculate_normalized
        } else {
            ImportCostCalculator::calculate
        };

        let mut results = Vec::with_capacity(lines.len());
        let mut grand_total = 0i64;
        let mut grand_total_raw = Decimal::ZERO;
        for (index, line) in lines.iter().enumerate() {
            let result = calculate(line, config, rates, options.target, options.rounding)
                .map_err(|source| QuoteError::Line { index, source })?;
            grand_total = grand_total
                .checked_add(result.total)
                .ok_or(QuoteError::TotalOverflow { index })?;
            grand_total_raw = grand_total_raw
                .checked_add(result.total_raw)
                .ok_or(QuoteError::TotalOverflow { index })?;
            results.push(result);
        }

        let quote = Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            target_currency: options.target,
            rounding: options.rounding,
            lines: results,
            grand_total,
            grand_total_raw,
        };
        info!(
            "quote {}: {} lines, {} {}",
            quote.id,
            quote.lines.len(),
            quote.grand_total,
            quote.target_currency
        );
        Ok(quote)
    }

    // --- Accessors ---

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn target_currency(&self) -> CurrencyCode {
        self.target_currency
    }

    pub fn rounding(&self) -> RoundingPolicy {
        self.rounding
    }

    pub fn lines(&self) -> &[CalculationResult] {
        &self.lines
    }

    pub fn grand_total(&self) -> i64 {
        self.grand_total
    }

    pub fn grand_total_raw(&self) -> Decimal {
        self.grand_total_raw
    }
}

impl std::fmt::Display for Quote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Quote {} ===", self.id)?;
        writeln!(f, "Created:  {}", self.created_at.format("%Y-%m-%d %H:%M:%S UTC"))?;
        writeln!(f, "Rounding: {}", self.rounding)?;
        for (i, line) in self.lines.iter().enumerate() {
            writeln!(
                f,
                "  #{:<3} {:<20} {:>8} {:<4} {:>14} {}",
                i + 1,
                line.reference.as_deref().unwrap_or("-"),
                line.subtotal.round_dp(2),
                line.warehouse_currency,
                line.total,
                self.target_currency
            )?;
        }
        writeln!(f, "Grand total: {} {}", self.grand_total, self.target_currency)
    }
}
