//! # import-cost
//!
//! Landed-cost engine for imported goods.
//!
//! Given a supplier price, a shipment (weight, optional volume, transport
//! mode, warehouse) and a tariff, this engine computes an itemized landed
//! cost and converts it into the buyer's currency with a base-relative
//! exchange-rate table.
//!
//! ## Architecture
//!
//! - **core** — Foundational types: currencies and rate tables, warehouses, shipment inputs
//! - **tariff** — Commission tiers, transport rates, fees, settings loader
//! - **engine** — The calculator, rounding policies and multi-line quotes
//! - **simulation** — Scenario generation and rounding-policy comparison

pub mod core;
pub mod engine;
pub mod simulation;
pub mod tariff;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::core::currency::{CurrencyCode, ExchangeRateTable};
    pub use crate::core::shipment::CalculationInput;
    pub use crate::core::warehouse::{TransportMode, Warehouse};
    pub use crate::engine::calculator::{CalculationError, CalculationResult, ImportCostCalculator};
    pub use crate::engine::quote::{Quote, QuoteOptions};
    pub use crate::engine::rounding::RoundingPolicy;
    pub use crate::tariff::config::CalculationConfig;
}
