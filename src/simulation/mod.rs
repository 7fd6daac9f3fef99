//! Scenario generation and rounding-policy comparison.

pub mod comparison;
pub mod scenarios;
