//! Random shipment generation.
//!
//! Produces valid calculation inputs for benchmarks, property tests and
//! the CLI `generate` command.

use crate::core::shipment::CalculationInput;
use crate::core::warehouse::{TransportMode, Warehouse};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Configuration for generating a batch of shipments.
#[derive(Debug, Clone)]
pub struct ScenarioConfig {
    /// Number of shipments to generate.
    pub count: usize,
    /// Minimum supplier price. Must be positive.
    pub min_price: Decimal,
    /// Maximum supplier price.
    pub max_price: Decimal,
    /// Maximum weight in kilograms.
    pub max_weight: Decimal,
    /// Maximum volume in cubic meters for sea shipments.
    pub max_volume: Decimal,
    pub modes: Vec<TransportMode>,
    pub warehouses: Vec<Warehouse>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            count: 20,
            min_price: Decimal::ONE,
            max_price: Decimal::from(500),
            max_weight: Decimal::from(30),
            max_volume: Decimal::from(2),
            modes: vec![TransportMode::Air, TransportMode::Sea],
            warehouses: Warehouse::ALL.to_vec(),
        }
    }
}

/// Generate shipments with a thread-local RNG.
pub fn generate_shipments(config: &ScenarioConfig) -> Vec<CalculationInput> {
    generate_with(config, &mut rand::thread_rng())
}

/// Generate a reproducible batch from a seed.
pub fn generate_shipments_seeded(config: &ScenarioConfig, seed: u64) -> Vec<CalculationInput> {
    generate_with(config, &mut StdRng::seed_from_u64(seed))
}

fn generate_with<R: Rng>(config: &ScenarioConfig, rng: &mut R) -> Vec<CalculationInput> {
    if config.modes.is_empty() || config.warehouses.is_empty() {
        return Vec::new();
    }

    let min_price = config.min_price.to_f64().unwrap_or(1.0).max(0.01);
    let max_price = config.max_price.to_f64().unwrap_or(500.0).max(min_price + 0.01);
    let max_weight = config.max_weight.to_f64().unwrap_or(30.0).max(0.01);
    let max_volume = config.max_volume.to_f64().unwrap_or(2.0).max(0.02);

    (0..config.count)
        .map(|i| {
            let warehouse = config.warehouses[rng.gen_range(0..config.warehouses.len())];
            let mode = config.modes[rng.gen_range(0..config.modes.len())];
            let price = two_places(rng.gen_range(min_price..max_price)).max(Decimal::new(1, 2));
            let weight = two_places(rng.gen_range(0.0..max_weight));

            let mut input =
                CalculationInput::new(price, weight, mode, warehouse, warehouse.currency())
                    .with_reference(format!("SKU-{:04}", i));
            if mode == TransportMode::Sea {
                let volume = two_places(rng.gen_range(0.01..max_volume)).max(Decimal::new(1, 2));
                input = input.with_volume(volume);
            }
            input
        })
        .collect()
}

fn two_places(value: f64) -> Decimal {
    Decimal::from_f64_retain(value)
        .unwrap_or(Decimal::ONE)
        .round_dp(2)
}
