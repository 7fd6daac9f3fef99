use crate::core::currency::{CurrencyCode, ExchangeRateTable, FxError};
use crate::core::shipment::{CalculationInput, InputError};
use crate::core::warehouse::{TransportMode, Warehouse};
use crate::engine::rounding::RoundingPolicy;
use crate::tariff::config::CalculationConfig;
use log::{debug, warn};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a landed cost could not be computed.
#[derive(Debug, Error)]
pub enum CalculationError {
    /// Caller-supplied parameters violate a precondition.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InputError),
    /// A currency the calculation needs is absent from the rate table.
    #[error("missing exchange rate for {0}")]
    MissingExchangeRate(CurrencyCode),
    /// The tariff or rate table is malformed.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    /// An intermediate amount left the representable range.
    #[error("{0} out of range")]
    Overflow(&'static str),
}

impl From<FxError> for CalculationError {
    fn from(err: FxError) -> Self {
        match err {
            FxError::RateNotFound(currency) => CalculationError::MissingExchangeRate(currency),
            other => CalculationError::InvalidConfig(other.to_string()),
        }
    }
}

/// A percentage charge on the supplier price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatedCharge {
    pub amount: Decimal,
    pub rate_percent: Decimal,
}

/// The additive terms of the landed cost, all in the warehouse currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItems {
    pub supplier_price: Decimal,
    pub transport_cost: Decimal,
    pub commission: RatedCharge,
    pub processing_fee: Decimal,
    pub tax: RatedCharge,
}

impl LineItems {
    /// Sum of all terms, or `None` if it overflows.
    pub fn sum(&self) -> Option<Decimal> {
        self.supplier_price
            .checked_add(self.transport_cost)?
            .checked_add(self.commission.amount)?
            .checked_add(self.processing_fee)?
            .checked_add(self.tax.amount)
    }
}

/// How a supplier price was restated before the calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceNormalization {
    pub original_price: Decimal,
    pub original_currency: CurrencyCode,
    pub factor: Decimal,
}

/// Itemized landed cost for one shipment line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    pub warehouse: Warehouse,
    pub transport_mode: TransportMode,
    /// Currency every line item and the subtotal are stated in.
    pub warehouse_currency: CurrencyCode,
    /// Currency the caller declared for the supplier price.
    pub supplier_currency: CurrencyCode,
    pub target_currency: CurrencyCode,
    pub rounding: RoundingPolicy,
    pub line_items: LineItems,
    pub subtotal: Decimal,
    /// `rates[target] / rates[warehouse_currency]`.
    pub conversion_factor: Decimal,
    /// Converted subtotal before rounding.
    pub total_raw: Decimal,
    pub total: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalization: Option<PriceNormalization>,
}

/// The landed-cost calculator.
///
/// Stateless: every call reads only its arguments, so it can be shared
/// freely across threads.
pub struct ImportCostCalculator;

impl ImportCostCalculator {
    /// Compute the landed cost of one shipment line.
    ///
    /// The supplier price is taken to be stated in the warehouse currency
    /// already; all five terms are summed in that currency and converted
    /// once. If `input.supplier_currency()` differs, the result still
    /// records both currencies and a warning is logged. Use
    /// [`ImportCostCalculator::calculate_normalized`] to convert the price
    /// first.
    ///
    /// # Algorithm
    ///
    /// 1. `transport = weight * transport_rate[warehouse]` (weight only,
    ///    also for sea freight).
    /// 2. `commission = price * rate / 100`, rate from the first bracket
    ///    whose upper bound exceeds the price.
    /// 3. Flat processing fee.
    /// 4. `tax = price * tax_rate / 100`.
    /// 5. `subtotal` = sum of the above and the price.
    /// 6. `factor = rates[target] / rates[warehouse_currency]`.
    /// 7. `total = policy(subtotal * factor)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use import_cost::prelude::*;
    /// use rust_decimal_macros::dec;
    ///
    /// let input = CalculationInput::new(
    ///     dec!(8), dec!(1.5), TransportMode::Air, Warehouse::France, CurrencyCode::Eur,
    /// );
    /// let rates = ExchangeRateTable::from_rates(
    ///     CurrencyCode::Mga,
    ///     [(CurrencyCode::Mga, dec!(1)), (CurrencyCode::Eur, dec!(0.0002))],
    /// ).unwrap();
    ///
    /// let result = ImportCostCalculator::calculate(
    ///     &input,
    ///     &CalculationConfig::default(),
    ///     &rates,
    ///     CurrencyCode::Mga,
    ///     RoundingPolicy::Simple,
    /// ).unwrap();
    ///
    /// assert_eq!(result.subtotal, dec!(34.78));
    /// assert_eq!(result.total, 173_900);
    /// ```
    pub fn calculate(
        input: &CalculationInput,
        config: &CalculationConfig,
        rates: &ExchangeRateTable,
        target: CurrencyCode,
        policy: RoundingPolicy,
    ) -> Result<CalculationResult, CalculationError> {
        input.validate()?;

        let warehouse = input.warehouse();
        let warehouse_currency = warehouse.currency();
        if input.supplier_currency() != warehouse_currency {
            warn!(
                "supplier price in {} summed as {} for {} warehouse",
                input.supplier_currency(),
                warehouse_currency,
                warehouse
            );
        }

        let price = input.supplier_price();
        let transport_rate = config.transport_rate(warehouse).ok_or_else(|| {
            CalculationError::InvalidConfig(format!("no transport rate for {}", warehouse))
        })?;
        let commission_rate = config.commission.rate_for(price).ok_or_else(|| {
            CalculationError::InvalidConfig(format!("no commission bracket matches price {}", price))
        })?;

        let line_items = LineItems {
            supplier_price: price,
            transport_cost: input
                .weight()
                .checked_mul(transport_rate)
                .ok_or(CalculationError::Overflow("transport cost"))?,
            commission: RatedCharge {
                amount: percent_of(price, commission_rate)
                    .ok_or(CalculationError::Overflow("commission"))?,
                rate_percent: commission_rate,
            },
            processing_fee: config.processing_fee,
            tax: RatedCharge {
                amount: percent_of(price, config.tax_rate_percent)
                    .ok_or(CalculationError::Overflow("tax"))?,
                rate_percent: config.tax_rate_percent,
            },
        };
        let subtotal = line_items
            .sum()
            .ok_or(CalculationError::Overflow("subtotal"))?;

        let conversion_factor = rates.conversion_factor(warehouse_currency, target)?;
        let total_raw = subtotal
            .checked_mul(conversion_factor)
            .ok_or(CalculationError::Overflow("converted total"))?;
        // Totals are reported as whole units of the target currency.
        let total = policy
            .apply(total_raw)
            .to_i64()
            .ok_or(CalculationError::Overflow("rounded total"))?;

        debug!(
            "{} {} via {}: subtotal {} {}, x{} -> {} {} ({})",
            input.reference().unwrap_or("-"),
            warehouse,
            input.transport_mode(),
            subtotal,
            warehouse_currency,
            conversion_factor,
            total,
            target,
            policy
        );

        Ok(CalculationResult {
            reference: input.reference().map(str::to_string),
            warehouse,
            transport_mode: input.transport_mode(),
            warehouse_currency,
            supplier_currency: input.supplier_currency(),
            target_currency: target,
            rounding: policy,
            line_items,
            subtotal,
            conversion_factor,
            total_raw,
            total,
            normalization: None,
        })
    }

    /// Like [`ImportCostCalculator::calculate`], but first converts the
    /// supplier price from its own currency into the warehouse currency.
    ///
    /// The commission bracket is chosen on the converted price. Fails with
    /// [`CalculationError::MissingExchangeRate`] when the supplier currency
    /// has no rate.
    pub fn calculate_normalized(
        input: &CalculationInput,
        config: &CalculationConfig,
        rates: &ExchangeRateTable,
        target: CurrencyCode,
        policy: RoundingPolicy,
    ) -> Result<CalculationResult, CalculationError> {
        input.validate()?;

        let warehouse_currency = input.warehouse().currency();
        let factor = rates.conversion_factor(input.supplier_currency(), warehouse_currency)?;
        let price = input
            .supplier_price()
            .checked_mul(factor)
            .ok_or(CalculationError::Overflow("normalized price"))?;
        let restated = input.repriced(price, warehouse_currency);

        let mut result = Self::calculate(&restated, config, rates, target, policy)?;
        result.normalization = Some(PriceNormalization {
            original_price: input.supplier_price(),
            original_currency: input.supplier_currency(),
            factor,
        });
        Ok(result)
    }
}

fn percent_of(amount: Decimal, rate_percent: Decimal) -> Option<Decimal> {
    amount
        .checked_mul(rate_percent)?
        .checked_div(Decimal::ONE_HUNDRED)
}

impl std::fmt::Display for CalculationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ccy = self.warehouse_currency;
        writeln!(f, "=== Landed Cost ===")?;
        if let Some(reference) = &self.reference {
            writeln!(f, "Reference:      {}", reference)?;
        }
        writeln!(f, "Route:          {} ({})", self.warehouse, self.transport_mode)?;
        if let Some(n) = &self.normalization {
            writeln!(
                f,
                "Supplier price: {} {} (x{})",
                n.original_price, n.original_currency, n.factor
            )?;
        }
        let items = &self.line_items;
        writeln!(f, "Price:          {} {}", items.supplier_price, ccy)?;
        writeln!(f, "Transport:      {} {}", items.transport_cost, ccy)?;
        writeln!(
            f,
            "Commission:     {} {} ({}%)",
            items.commission.amount, ccy, items.commission.rate_percent
        )?;
        writeln!(f, "Processing fee: {} {}", items.processing_fee, ccy)?;
        writeln!(f, "Tax:            {} {} ({}%)", items.tax.amount, ccy, items.tax.rate_percent)?;
        writeln!(f, "Subtotal:       {} {}", self.subtotal, ccy)?;
        writeln!(f, "Factor:         {} {}/{}", self.conversion_factor, self.target_currency, ccy)?;
        writeln!(f, "Total:          {} {} [{}]", self.total, self.target_currency, self.rounding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn rates() -> ExchangeRateTable {
        ExchangeRateTable::from_rates(
            CurrencyCode::Mga,
            [
                (CurrencyCode::Mga, dec!(1)),
                (CurrencyCode::Eur, dec!(0.0002)),
                (CurrencyCode::Usd, dec!(0.00025)),
                (CurrencyCode::Cny, dec!(0.0016)),
            ],
        )
        .unwrap()
    }

    fn france_air(price: Decimal, weight: Decimal) -> CalculationInput {
        CalculationInput::new(
            price,
            weight,
            TransportMode::Air,
            Warehouse::France,
            CurrencyCode::Eur,
        )
    }

    fn run(input: &CalculationInput) -> Result<CalculationResult, CalculationError> {
        ImportCostCalculator::calculate(
            input,
            &CalculationConfig::default(),
            &rates(),
            CurrencyCode::Mga,
            RoundingPolicy::Simple,
        )
    }

    #[test]
    fn test_reference_breakdown() {
        let result = run(&france_air(dec!(8), dec!(1.5))).unwrap();
        let items = &result.line_items;
        assert_eq!(items.transport_cost, dec!(22.5));
        assert_eq!(items.commission.amount, dec!(2));
        assert_eq!(items.commission.rate_percent, dec!(25));
        assert_eq!(items.processing_fee, dec!(2));
        assert_eq!(items.tax.amount, dec!(0.28));
        assert_eq!(result.subtotal, dec!(34.78));
        assert_eq!(result.conversion_factor, dec!(5000));
        assert_eq!(result.total, 173_900);
        assert_eq!(result.warehouse_currency, CurrencyCode::Eur);
    }

    #[test]
    fn test_high_price_uses_top_bracket() {
        let result = run(&france_air(dec!(250), dec!(2))).unwrap();
        assert_eq!(result.line_items.commission.rate_percent, dec!(25));
        assert_eq!(result.line_items.commission.amount, dec!(62.5));
    }

    #[test]
    fn test_sea_priced_by_weight_only() {
        let input = CalculationInput::new(
            dec!(50),
            dec!(10),
            TransportMode::Sea,
            Warehouse::China,
            CurrencyCode::Cny,
        )
        .with_volume(dec!(3));
        let result = run(&input).unwrap();
        assert_eq!(result.line_items.transport_cost, dec!(120));
    }

    #[test]
    fn test_sea_without_volume_fails() {
        let input = CalculationInput::new(
            dec!(50),
            dec!(10),
            TransportMode::Sea,
            Warehouse::China,
            CurrencyCode::Cny,
        );
        assert!(matches!(
            run(&input),
            Err(CalculationError::InvalidInput(InputError::MissingVolume))
        ));
    }

    #[test]
    fn test_missing_warehouse_rate() {
        let input = CalculationInput::new(
            dec!(20),
            dec!(1),
            TransportMode::Air,
            Warehouse::Uk,
            CurrencyCode::Gbp,
        );
        assert!(matches!(
            run(&input),
            Err(CalculationError::MissingExchangeRate(CurrencyCode::Gbp))
        ));
    }

    #[test]
    fn test_missing_target_rate() {
        let result = ImportCostCalculator::calculate(
            &france_air(dec!(8), dec!(1)),
            &CalculationConfig::default(),
            &rates(),
            CurrencyCode::Gbp,
            RoundingPolicy::Simple,
        );
        assert!(matches!(
            result,
            Err(CalculationError::MissingExchangeRate(CurrencyCode::Gbp))
        ));
    }

    #[test]
    fn test_missing_transport_rate_is_config_error() {
        let mut config = CalculationConfig::default();
        config.transport_rate_per_kg.remove(&Warehouse::France);
        let result = ImportCostCalculator::calculate(
            &france_air(dec!(8), dec!(1)),
            &config,
            &rates(),
            CurrencyCode::Mga,
            RoundingPolicy::Simple,
        );
        assert!(matches!(result, Err(CalculationError::InvalidConfig(_))));
    }

    #[test]
    fn test_unmatched_bracket_is_config_error() {
        let mut config = CalculationConfig::default();
        config.commission = serde_json::from_str(r#"[{ "upper_bound": "10", "rate_percent": "25" }]"#)
            .unwrap();
        let result = ImportCostCalculator::calculate(
            &france_air(dec!(50), dec!(1)),
            &config,
            &rates(),
            CurrencyCode::Mga,
            RoundingPolicy::Simple,
        );
        assert!(matches!(result, Err(CalculationError::InvalidConfig(_))));
    }

    #[test]
    fn test_target_equals_warehouse_currency() {
        let result = ImportCostCalculator::calculate(
            &france_air(dec!(8), dec!(1.5)),
            &CalculationConfig::default(),
            &rates(),
            CurrencyCode::Eur,
            RoundingPolicy::Simple,
        )
        .unwrap();
        assert_eq!(result.conversion_factor, Decimal::ONE);
        assert_eq!(result.total, 35);
    }

    #[test]
    fn test_mixed_currency_summed_as_is() {
        let input = CalculationInput::new(
            dec!(8),
            dec!(1.5),
            TransportMode::Air,
            Warehouse::France,
            CurrencyCode::Usd,
        );
        let result = run(&input).unwrap();
        assert_eq!(result.subtotal, dec!(34.78));
        assert_eq!(result.supplier_currency, CurrencyCode::Usd);
        assert_eq!(result.warehouse_currency, CurrencyCode::Eur);
        assert!(result.normalization.is_none());
    }

    #[test]
    fn test_normalized_converts_price_first() {
        // 10 USD = 8 EUR at these rates.
        let input = CalculationInput::new(
            dec!(10),
            dec!(1.5),
            TransportMode::Air,
            Warehouse::France,
            CurrencyCode::Usd,
        );
        let result = ImportCostCalculator::calculate_normalized(
            &input,
            &CalculationConfig::default(),
            &rates(),
            CurrencyCode::Mga,
            RoundingPolicy::Simple,
        )
        .unwrap();
        assert_eq!(result.line_items.supplier_price, dec!(8));
        assert_eq!(result.line_items.commission.rate_percent, dec!(25));
        assert_eq!(result.subtotal, dec!(34.78));
        assert_eq!(result.supplier_currency, CurrencyCode::Eur);
        let normalization = result.normalization.unwrap();
        assert_eq!(normalization.original_price, dec!(10));
        assert_eq!(normalization.original_currency, CurrencyCode::Usd);
    }

    #[test]
    fn test_normalized_requires_supplier_rate() {
        let input = CalculationInput::new(
            dec!(10),
            dec!(1),
            TransportMode::Air,
            Warehouse::France,
            CurrencyCode::Gbp,
        );
        let result = ImportCostCalculator::calculate_normalized(
            &input,
            &CalculationConfig::default(),
            &rates(),
            CurrencyCode::Mga,
            RoundingPolicy::Simple,
        );
        assert!(matches!(
            result,
            Err(CalculationError::MissingExchangeRate(CurrencyCode::Gbp))
        ));
    }

    #[test]
    fn test_huge_weight_overflows_without_panic() {
        let input = france_air(dec!(8), Decimal::MAX / dec!(10));
        assert!(matches!(
            run(&input),
            Err(CalculationError::Overflow("transport cost"))
        ));
    }

    #[test]
    fn test_extreme_rate_ratio_overflows_without_panic() {
        let rates = ExchangeRateTable::from_rates(
            CurrencyCode::Mga,
            [
                (CurrencyCode::Mga, dec!(1)),
                (CurrencyCode::Eur, Decimal::new(1, 28)),
            ],
        )
        .unwrap();
        let result = ImportCostCalculator::calculate(
            &france_air(dec!(8), dec!(1.5)),
            &CalculationConfig::default(),
            &rates,
            CurrencyCode::Mga,
            RoundingPolicy::Simple,
        );
        assert!(matches!(
            result,
            Err(CalculationError::Overflow("converted total"))
        ));
    }

    #[test]
    fn test_total_beyond_i64_is_rejected() {
        // Fits in a Decimal, not in an i64 once converted to MGA.
        let input = france_air(dec!(8), Decimal::from(10i64.pow(18)));
        assert!(matches!(
            run(&input),
            Err(CalculationError::Overflow("rounded total"))
        ));
    }

    #[test]
    fn test_normalized_price_overflow() {
        let rates = ExchangeRateTable::from_rates(
            CurrencyCode::Mga,
            [
                (CurrencyCode::Mga, dec!(1)),
                (CurrencyCode::Eur, dec!(1000)),
                (CurrencyCode::Usd, dec!(0.001)),
            ],
        )
        .unwrap();
        let input = CalculationInput::new(
            Decimal::MAX / dec!(100),
            dec!(1),
            TransportMode::Air,
            Warehouse::France,
            CurrencyCode::Usd,
        );
        let result = ImportCostCalculator::calculate_normalized(
            &input,
            &CalculationConfig::default(),
            &rates,
            CurrencyCode::Mga,
            RoundingPolicy::Simple,
        );
        assert!(matches!(
            result,
            Err(CalculationError::Overflow("normalized price"))
        ));
    }

    #[test]
    fn test_display_mentions_total() {
        let result = run(&france_air(dec!(8), dec!(1.5)).with_reference("mug")).unwrap();
        let text = result.to_string();
        assert!(text.contains("Reference:      mug"));
        assert!(text.contains("173900 MGA [simple]"));
    }
}
