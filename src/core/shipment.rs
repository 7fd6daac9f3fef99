use crate::core::currency::CurrencyCode;
use crate::core::warehouse::{TransportMode, Warehouse};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A precondition violated by caller-supplied shipment parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("price must be positive, got {0}")]
    NonPositivePrice(Decimal),
    #[error("weight must not be negative, got {0}")]
    NegativeWeight(Decimal),
    #[error("volume required for sea transport")]
    MissingVolume,
    #[error("volume must be positive for sea transport, got {0}")]
    NonPositiveVolume(Decimal),
}

/// Product and shipment parameters for one landed-cost calculation.
///
/// Construction never fails so that a malformed request can still be
/// carried around and reported; [`CalculationInput::validate`] checks the
/// preconditions and is run by the calculator before any arithmetic.
///
/// # Examples
///
/// ```
/// use import_cost::core::currency::CurrencyCode;
/// use import_cost::core::shipment::CalculationInput;
/// use import_cost::core::warehouse::{TransportMode, Warehouse};
/// use rust_decimal_macros::dec;
///
/// let input = CalculationInput::new(
///     dec!(8),
///     dec!(1.5),
///     TransportMode::Air,
///     Warehouse::France,
///     CurrencyCode::Eur,
/// );
///
/// assert!(input.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationInput {
    /// Price in the supplier's currency.
    supplier_price: Decimal,
    /// Kilograms.
    weight: Decimal,
    /// Cubic meters. Only read for sea shipments.
    #[serde(default)]
    volume: Option<Decimal>,
    transport_mode: TransportMode,
    warehouse: Warehouse,
    supplier_currency: CurrencyCode,
    /// Optional product name or SKU.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reference: Option<String>,
}

impl CalculationInput {
    pub fn new(
        supplier_price: Decimal,
        weight: Decimal,
        transport_mode: TransportMode,
        warehouse: Warehouse,
        supplier_currency: CurrencyCode,
    ) -> Self {
        Self {
            supplier_price,
            weight,
            volume: None,
            transport_mode,
            warehouse,
            supplier_currency,
            reference: None,
        }
    }

    /// Set the shipment volume in cubic meters.
    pub fn with_volume(mut self, volume: Decimal) -> Self {
        self.volume = Some(volume);
        self
    }

    /// Set a reference string.
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    /// Same shipment with the price restated, used when normalizing the
    /// supplier price into another currency.
    pub(crate) fn repriced(&self, supplier_price: Decimal, currency: CurrencyCode) -> Self {
        Self {
            supplier_price,
            supplier_currency: currency,
            ..self.clone()
        }
    }

    /// Check the caller-side preconditions.
    pub fn validate(&self) -> Result<(), InputError> {
        if self.supplier_price <= Decimal::ZERO {
            return Err(InputError::NonPositivePrice(self.supplier_price));
        }
        if self.weight < Decimal::ZERO {
            return Err(InputError::NegativeWeight(self.weight));
        }
        if self.transport_mode == TransportMode::Sea {
            match self.volume {
                None => return Err(InputError::MissingVolume),
                Some(v) if v <= Decimal::ZERO => return Err(InputError::NonPositiveVolume(v)),
                Some(_) => {}
            }
        }
        Ok(())
    }

    // --- Accessors ---

    pub fn supplier_price(&self) -> Decimal {
        self.supplier_price
    }

    pub fn weight(&self) -> Decimal {
        self.weight
    }

    pub fn volume(&self) -> Option<Decimal> {
        self.volume
    }

    pub fn transport_mode(&self) -> TransportMode {
        self.transport_mode
    }

    pub fn warehouse(&self) -> Warehouse {
        self.warehouse
    }

    pub fn supplier_currency(&self) -> CurrencyCode {
        self.supplier_currency
    }

    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }
}
