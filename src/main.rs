//! import-cost CLI
//!
//! Compute landed costs from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Price a set of shipments into MGA
//! import-cost quote --input shipments.json --rates rates.json
//!
//! # Use stored tariff settings, legacy rounding, JSON output
//! import-cost quote --input shipments.json --rates rates.json \
//!     --config settings.json --rounding legacy --format json
//!
//! # Compare the two rounding policies line by line
//! import-cost compare --input shipments.json --rates rates.json
//!
//! # Generate random shipments for testing
//! import-cost generate --count 50
//! ```

use import_cost::core::currency::{CurrencyCode, ExchangeRateTable};
use import_cost::core::shipment::CalculationInput;
use import_cost::engine::quote::{Quote, QuoteOptions};
use import_cost::engine::rounding::RoundingPolicy;
use import_cost::simulation::comparison::compare_rounding;
use import_cost::simulation::scenarios::{generate_shipments, generate_shipments_seeded, ScenarioConfig};
use import_cost::tariff::config::CalculationConfig;
use log::debug;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::fs;
use std::process;

fn print_usage() {
    eprintln!(
        r#"import-cost — landed-cost calculation for imported goods

USAGE:
    import-cost <COMMAND> [OPTIONS]

COMMANDS:
    quote       Price shipments into a target currency
    compare     Show simple vs legacy rounding for each shipment
    brackets    Print the tariff (transport rates, commission tiers, fees)
    generate    Generate random shipments (for testing)
    help        Show this message

OPTIONS (quote, compare):
    --input <FILE>      Path to JSON shipments file
    --rates <FILE>      Path to JSON exchange-rate table
    --config <FILE>     Path to JSON tariff settings (default: reference tariff)
    --target <CCY>      Target currency (default: MGA)
    --rounding <MODE>   simple (default) or legacy  [quote only]
    --normalize         Convert supplier prices into warehouse currency first
    --format <FORMAT>   Output format: text (default) or json

OPTIONS (brackets):
    --config <FILE>     Path to JSON tariff settings

OPTIONS (generate):
    --count <N>         Number of shipments (default: 20)
    --seed <N>          Seed for reproducible output
    --output <FILE>     Write to file instead of stdout

EXAMPLES:
    import-cost quote --input shipments.json --rates rates.json
    import-cost quote --input shipments.json --rates rates.json --target EUR --format json
    import-cost compare --input shipments.json --rates rates.json --config settings.json
    import-cost generate --count 100 --seed 42 --output shipments.json"#
    );
}

#[derive(serde::Deserialize, serde::Serialize)]
struct ShipmentsFile {
    shipments: Vec<CalculationInput>,
}

struct CalcArgs {
    input: String,
    rates: String,
    config: Option<String>,
    target: CurrencyCode,
    rounding: RoundingPolicy,
    normalize: bool,
    format: String,
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

fn next_value(args: &[String], i: usize, flag: &str, what: &str) -> String {
    args.get(i)
        .cloned()
        .unwrap_or_else(|| fail(format!("{} requires {}", flag, what)))
}

fn parse_calc_args(args: &[String]) -> CalcArgs {
    let mut input = None;
    let mut rates = None;
    let mut config = None;
    let mut target = CurrencyCode::Mga;
    let mut rounding = RoundingPolicy::default();
    let mut normalize = false;
    let mut format = "text".to_string();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => {
                i += 1;
                input = Some(next_value(args, i, "--input", "a file path"));
            }
            "--rates" => {
                i += 1;
                rates = Some(next_value(args, i, "--rates", "a file path"));
            }
            "--config" => {
                i += 1;
                config = Some(next_value(args, i, "--config", "a file path"));
            }
            "--target" => {
                i += 1;
                target = next_value(args, i, "--target", "a currency code")
                    .parse()
                    .unwrap_or_else(|e| fail(e));
            }
            "--rounding" => {
                i += 1;
                rounding = next_value(args, i, "--rounding", "'simple' or 'legacy'")
                    .parse()
                    .unwrap_or_else(|e| fail(e));
            }
            "--normalize" => normalize = true,
            "--format" => {
                i += 1;
                format = next_value(args, i, "--format", "'text' or 'json'");
            }
            other => fail(format!("unknown option: {}", other)),
        }
        i += 1;
    }

    CalcArgs {
        input: input.unwrap_or_else(|| fail("--input <FILE> is required")),
        rates: rates.unwrap_or_else(|| fail("--rates <FILE> is required")),
        config,
        target,
        rounding,
        normalize,
        format,
    }
}

fn read_file(path: &str) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| fail(format!("reading '{}': {}", path, e)))
}

fn load_shipments(path: &str) -> Vec<CalculationInput> {
    let file: ShipmentsFile = serde_json::from_str(&read_file(path)).unwrap_or_else(|e| {
        eprintln!("Error parsing shipments: {}", e);
        eprintln!("Expected format:");
        eprintln!(
            r#"{{
  "shipments": [
    {{ "supplier_price": "8", "weight": "1.5", "transport_mode": "air",
       "warehouse": "france", "supplier_currency": "EUR" }}
  ]
}}"#
        );
        process::exit(1);
    });
    file.shipments
}

fn load_rates(path: &str) -> ExchangeRateTable {
    let table: ExchangeRateTable = serde_json::from_str(&read_file(path)).unwrap_or_else(|e| {
        eprintln!("Error parsing rates: {}", e);
        eprintln!("Expected format:");
        eprintln!(r#"{{ "base": "MGA", "rates": {{ "MGA": "1", "EUR": "0.0002" }} }}"#);
        process::exit(1);
    });
    table.validate().unwrap_or_else(|e| fail(e));
    table
}

fn load_config(path: Option<&str>) -> CalculationConfig {
    let Some(path) = path else {
        debug!("no --config given, using reference tariff");
        return CalculationConfig::default();
    };
    let settings: HashMap<String, Decimal> = serde_json::from_str(&read_file(path))
        .unwrap_or_else(|e| fail(format!("parsing settings '{}': {}", path, e)));
    CalculationConfig::from_settings(&settings).unwrap_or_else(|e| fail(e))
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| fail(e))
}

fn cmd_quote(args: &[String]) {
    let args = parse_calc_args(args);
    let shipments = load_shipments(&args.input);
    let rates = load_rates(&args.rates);
    let config = load_config(args.config.as_deref());

    let options = QuoteOptions {
        target: args.target,
        rounding: args.rounding,
        normalize: args.normalize,
    };
    let quote = Quote::build(&shipments, &config, &rates, options).unwrap_or_else(|e| fail(e));

    if args.format == "json" {
        println!("{}", to_json(&quote));
    } else {
        for line in quote.lines() {
            println!("{}", line);
        }
        println!("{}", quote);
    }
}

fn cmd_compare(args: &[String]) {
    let args = parse_calc_args(args);
    let shipments = load_shipments(&args.input);
    let rates = load_rates(&args.rates);
    let config = load_config(args.config.as_deref());

    let mut comparisons = Vec::with_capacity(shipments.len());
    for (index, shipment) in shipments.iter().enumerate() {
        let cmp = compare_rounding(shipment, &config, &rates, args.target, args.normalize)
            .unwrap_or_else(|e| fail(format!("line {}: {}", index, e)));
        comparisons.push(cmp);
    }

    if args.format == "json" {
        println!("{}", to_json(&comparisons));
    } else {
        for cmp in &comparisons {
            println!("{}", cmp);
        }
        let diverging = comparisons.iter().filter(|c| c.diverges()).count();
        println!("{} of {} lines differ between policies", diverging, comparisons.len());
    }
}

fn cmd_brackets(args: &[String]) {
    let mut config_path = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                config_path = Some(next_value(args, i, "--config", "a file path"));
            }
            other => fail(format!("unknown option: {}", other)),
        }
        i += 1;
    }
    print!("{}", load_config(config_path.as_deref()));
}

fn cmd_generate(args: &[String]) {
    let mut count = 20usize;
    let mut seed: Option<u64> = None;
    let mut output_path: Option<String> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--count" => {
                i += 1;
                count = next_value(args, i, "--count", "a number")
                    .parse()
                    .unwrap_or_else(|_| fail("--count requires a number"));
            }
            "--seed" => {
                i += 1;
                seed = Some(
                    next_value(args, i, "--seed", "a number")
                        .parse()
                        .unwrap_or_else(|_| fail("--seed requires a number")),
                );
            }
            "--output" => {
                i += 1;
                output_path = Some(next_value(args, i, "--output", "a file path"));
            }
            other => fail(format!("unknown option: {}", other)),
        }
        i += 1;
    }

    let config = ScenarioConfig {
        count,
        ..Default::default()
    };
    let shipments = match seed {
        Some(seed) => generate_shipments_seeded(&config, seed),
        None => generate_shipments(&config),
    };
    let json = to_json(&ShipmentsFile { shipments });

    if let Some(path) = output_path {
        fs::write(&path, &json).unwrap_or_else(|e| fail(format!("writing '{}': {}", path, e)));
        eprintln!("Generated {} shipments → {}", count, path);
    } else {
        println!("{}", json);
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "quote" => cmd_quote(rest),
        "compare" => cmd_compare(rest),
        "brackets" => cmd_brackets(rest),
        "generate" => cmd_generate(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
