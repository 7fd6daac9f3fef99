use crate::core::currency::CurrencyCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Originating shipment location.
///
/// Each warehouse prices its transport, processing fee and commission in
/// its own natural currency.
///
/// # Examples
///
/// ```
/// use import_cost::core::currency::CurrencyCode;
/// use import_cost::core::warehouse::Warehouse;
///
/// assert_eq!(Warehouse::France.currency(), CurrencyCode::Eur);
/// assert_eq!(Warehouse::Uk.currency(), CurrencyCode::Gbp);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Warehouse {
    France,
    Usa,
    Uk,
    China,
}

impl Warehouse {
    pub const ALL: [Warehouse; 4] = [
        Warehouse::France,
        Warehouse::Usa,
        Warehouse::Uk,
        Warehouse::China,
    ];

    /// The currency this warehouse's charges are stated in.
    pub fn currency(&self) -> CurrencyCode {
        match self {
            Warehouse::France => CurrencyCode::Eur,
            Warehouse::Usa => CurrencyCode::Usd,
            Warehouse::Uk => CurrencyCode::Gbp,
            Warehouse::China => CurrencyCode::Cny,
        }
    }

    /// Lower-case name, as used in settings keys (`transport_france_rate`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Warehouse::France => "france",
            Warehouse::Usa => "usa",
            Warehouse::Uk => "uk",
            Warehouse::China => "china",
        }
    }
}

impl fmt::Display for Warehouse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str().to_uppercase())
    }
}

#[derive(Debug, Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl FromStr for Warehouse {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Warehouse::ALL
            .into_iter()
            .find(|w| w.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseEnumError {
                kind: "warehouse",
                value: s.to_string(),
            })
    }
}

/// How the goods travel from the warehouse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    Air,
    Sea,
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportMode::Air => write!(f, "AIR"),
            TransportMode::Sea => write!(f, "SEA"),
        }
    }
}

impl FromStr for TransportMode {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "air" => Ok(TransportMode::Air),
            "sea" => Ok(TransportMode::Sea),
            _ => Err(ParseEnumError {
                kind: "transport mode",
                value: s.to_string(),
            }),
        }
    }
}
