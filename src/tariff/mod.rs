//! Tariff configuration: commission tiers, per-warehouse transport rates,
//! fees, and the loader for the named-key settings store.

pub mod commission;
pub mod config;
pub mod settings;
