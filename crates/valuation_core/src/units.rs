//! Power unit conversion.
//!
//! Load figures are entered in either megawatts or gigawatts. Every
//! calculator works in MW internally, so all load inputs pass through
//! [`to_mw`] before any arithmetic.

use crate::types::input::{deserialize_tag, LenientTag};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Unit of a power (load) figure.
///
/// Deserialisation is lenient: `"GW"` (any case) selects gigawatts and any
/// other tag, including a missing one, falls back to megawatts.
///
/// # Examples
/// ```
/// use valuation_core::units::PowerUnit;
///
/// let unit: PowerUnit = serde_json::from_str("\"GW\"").unwrap();
/// assert_eq!(unit, PowerUnit::GW);
/// let unit: PowerUnit = serde_json::from_str("\"kW\"").unwrap();
/// assert_eq!(unit, PowerUnit::MW);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum PowerUnit {
    /// Megawatts
    #[default]
    MW,
    /// Gigawatts
    GW,
}

impl PowerUnit {
    /// Returns the unit symbol.
    pub fn symbol(&self) -> &'static str {
        match self {
            PowerUnit::MW => "MW",
            PowerUnit::GW => "GW",
        }
    }

    /// Number of MW in one unit.
    #[inline]
    pub fn mw_factor(&self) -> f64 {
        match self {
            PowerUnit::MW => 1.0,
            PowerUnit::GW => 1000.0,
        }
    }
}

impl LenientTag for PowerUnit {
    fn from_tag(tag: &str) -> Self {
        if tag.trim().eq_ignore_ascii_case("GW") {
            PowerUnit::GW
        } else {
            PowerUnit::MW
        }
    }
}

impl<'de> Deserialize<'de> for PowerUnit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_tag(deserializer)
    }
}

impl fmt::Display for PowerUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Converts a load value to megawatts.
///
/// GW values are multiplied by 1000; MW values are returned unchanged.
///
/// # Examples
/// ```
/// use valuation_core::units::{to_mw, PowerUnit};
///
/// assert_eq!(to_mw(0.3, PowerUnit::GW), 300.0);
/// assert_eq!(to_mw(300.0, PowerUnit::MW), 300.0);
/// ```
#[inline]
pub fn to_mw(value: f64, unit: PowerUnit) -> f64 {
    value * unit.mw_factor()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gw_to_mw() {
        assert_eq!(to_mw(2.0, PowerUnit::GW), 2000.0);
    }

    #[test]
    fn test_mw_unchanged() {
        assert_eq!(to_mw(137.5, PowerUnit::MW), 137.5);
    }

    #[test]
    fn test_missing_unit_defaults_to_mw() {
        let unit: PowerUnit = serde_json::from_str("null").unwrap();
        assert_eq!(unit, PowerUnit::MW);
    }

    #[test]
    fn test_unit_serialises_as_symbol() {
        assert_eq!(serde_json::to_string(&PowerUnit::GW).unwrap(), "\"GW\"");
        assert_eq!(PowerUnit::MW.to_string(), "MW");
    }
}
