//! Landed-cost calculation, rounding policies and multi-line quotes.

pub mod calculator;
pub mod quote;
pub mod rounding;
