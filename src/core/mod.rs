//! Foundational types: currencies and rate tables, warehouses, shipment inputs.

pub mod currency;
pub mod shipment;
pub mod warehouse;
