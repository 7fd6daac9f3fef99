//! Basic landed-cost example.
//!
//! Prices a single shipment, then a small multi-line quote, and shows how
//! the legacy rounding policy differs from plain rounding.

use import_cost::prelude::*;
use import_cost::simulation::comparison::compare_rounding;
use rust_decimal_macros::dec;

fn main() {
    println!("╔══════════════════════════════════════════╗");
    println!("║    import-cost: Basic Quote Example      ║");
    println!("╚══════════════════════════════════════════╝\n");

    let config = CalculationConfig::default();
    let rates = ExchangeRateTable::from_rates(
        CurrencyCode::Mga,
        [
            (CurrencyCode::Mga, dec!(1)),
            (CurrencyCode::Eur, dec!(0.00021)),
            (CurrencyCode::Usd, dec!(0.00023)),
            (CurrencyCode::Cny, dec!(0.0016)),
        ],
    )
    .expect("reference rates are valid");

    // --- Scenario 1: Single shipment ---
    println!("━━━ Scenario 1: One shipment from France ━━━\n");

    let mug = CalculationInput::new(
        dec!(8),
        dec!(1.5),
        TransportMode::Air,
        Warehouse::France,
        CurrencyCode::Eur,
    )
    .with_reference("ceramic mug");

    let result = ImportCostCalculator::calculate(
        &mug,
        &config,
        &rates,
        CurrencyCode::Mga,
        RoundingPolicy::Simple,
    )
    .expect("mug shipment is valid");
    println!("{}", result);

    // --- Scenario 2: Rounding policies ---
    println!("━━━ Scenario 2: Simple vs legacy rounding ━━━\n");

    let cmp = compare_rounding(&mug, &config, &rates, CurrencyCode::Mga, false)
        .expect("mug shipment is valid");
    println!("{}", cmp);

    // --- Scenario 3: Multi-line quote ---
    println!("━━━ Scenario 3: Quote across warehouses ━━━\n");

    let lines = vec![
        mug,
        CalculationInput::new(
            dec!(120),
            dec!(12),
            TransportMode::Sea,
            Warehouse::China,
            CurrencyCode::Cny,
        )
        .with_volume(dec!(0.4))
        .with_reference("desk lamp"),
        CalculationInput::new(
            dec!(250),
            dec!(3),
            TransportMode::Air,
            Warehouse::Usa,
            CurrencyCode::Usd,
        )
        .with_reference("headphones"),
    ];

    match Quote::build(&lines, &config, &rates, QuoteOptions::default()) {
        Ok(quote) => println!("{}", quote),
        Err(e) => eprintln!("quote failed: {}", e),
    }
}
