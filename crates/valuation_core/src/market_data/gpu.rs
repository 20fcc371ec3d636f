//! GPU unit-price and hourly-rate tables.
//!
//! Both tables share one key space. A fixed set of default GPU types is
//! always present; user-defined types can be added and removed at runtime
//! through [`GpuMarket`], which keeps the two tables in step.
//!
//! Default hourly rates are derived from public contract figures:
//! - accelerator rates: `$500M / 661,169,760 GPU-hours` times a per-type multiplier
//! - hyperscale bulk rate: `$1.94B / 365 / 76,000 GPUs / 24`
//! - Vera Rubin: hyperscale bulk rate times 1.75

use crate::types::error::ValuationError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Hours in a (non-leap) year.
pub const HOURS_PER_YEAR: f64 = 8760.0;

/// Keys of the built-in GPU types.
pub mod keys {
    /// Hyperscale bulk GB300, priced for large hyperscaler deployments.
    pub const HYPERSCALE_BULK_GB300: &str = "hyperscaleBulkGB300";
    /// Hyperscale bulk Vera Rubin NVL144.
    pub const VERA_RUBIN_NVL144: &str = "veraRubinNVL144";
    /// NVIDIA GB300.
    pub const GB300: &str = "gb300";
    /// NVIDIA B200.
    pub const B200: &str = "b200";
    /// NVIDIA B300.
    pub const B300: &str = "b300";
    /// AMD MI350X.
    pub const MI350X: &str = "mi350x";
}

/// GPU types that cannot be removed from the market tables.
pub const DEFAULT_GPU_KEYS: [&str; 6] = [
    keys::HYPERSCALE_BULK_GB300,
    keys::VERA_RUBIN_NVL144,
    keys::GB300,
    keys::B200,
    keys::B300,
    keys::MI350X,
];

const HYPERSCALE_BULK_PRICE: f64 = 76_315.78;
const VERA_RUBIN_PRICE_MULTIPLIER: f64 = 1.5;

const BASE_ANNUAL_REVENUE: f64 = 500_000_000.0;
const BASE_YEARLY_GPU_HOURS: f64 = 661_169_760.0;
const HYPERSCALER_ANNUAL_REVENUE: f64 = 1_940_000_000.0;
const HYPERSCALER_GPU_COUNT: f64 = 76_000.0;
const VERA_RUBIN_RATE_MULTIPLIER: f64 = 1.75;

/// Base hourly rate for accelerator leasing, before the per-type multiplier.
fn base_hourly_rate() -> f64 {
    BASE_ANNUAL_REVENUE / BASE_YEARLY_GPU_HOURS
}

/// Hourly rate implied by the reference hyperscaler contract.
pub fn hyperscaler_base_rate() -> f64 {
    HYPERSCALER_ANNUAL_REVENUE / 365.0 / HYPERSCALER_GPU_COUNT / 24.0
}

/// Returns the human-readable name for a GPU key.
///
/// Built-in types have fixed names; any other key is split before each
/// capital letter and upper-cased.
///
/// # Examples
/// ```
/// use valuation_core::market_data::display_name;
///
/// assert_eq!(display_name("hyperscaleBulkGB300"), "Hyperscale Bulk GB300");
/// assert_eq!(display_name("mi350x"), "MI350X");
/// assert_eq!(display_name("h200Nvl"), "H200 NVL");
/// ```
pub fn display_name(key: &str) -> String {
    match key {
        keys::HYPERSCALE_BULK_GB300 => "Hyperscale Bulk GB300".to_string(),
        keys::VERA_RUBIN_NVL144 => "Hyperscale Bulk Vera Rubin NVL144".to_string(),
        keys::GB300 => "GB300".to_string(),
        keys::B200 => "B200".to_string(),
        keys::B300 => "B300".to_string(),
        keys::MI350X => "MI350X".to_string(),
        other => {
            let mut spaced = String::with_capacity(other.len() + 4);
            for c in other.chars() {
                if c.is_ascii_uppercase() {
                    spaced.push(' ');
                }
                spaced.push(c);
            }
            spaced.trim().to_uppercase()
        }
    }
}

/// A GPU-type keyed table of numbers (unit prices in $, or hourly rates in $/hr).
///
/// Lookups of missing keys yield 0 so that a count for an unpriced type adds
/// nothing to a cost or revenue sum.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GpuTable(BTreeMap<String, f64>);

impl GpuTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Default unit prices ($ per GPU).
    pub fn default_prices() -> Self {
        [
            (keys::HYPERSCALE_BULK_GB300, HYPERSCALE_BULK_PRICE),
            (
                keys::VERA_RUBIN_NVL144,
                HYPERSCALE_BULK_PRICE * VERA_RUBIN_PRICE_MULTIPLIER,
            ),
            (keys::GB300, 80_000.0),
            (keys::B200, 45_952.38),
            (keys::B300, 61_117.21),
            (keys::MI350X, 42_788.92),
        ]
        .into_iter()
        .collect()
    }

    /// Default hourly lease rates ($ per GPU-hour).
    pub fn default_hourly_rates() -> Self {
        let base = base_hourly_rate();
        let hyperscale = hyperscaler_base_rate();
        [
            (keys::B200, base * 3.08),
            (keys::B300, base * 3.85),
            (keys::GB300, base * 5.11),
            (keys::MI350X, base * 2.91),
            (keys::HYPERSCALE_BULK_GB300, hyperscale),
            (
                keys::VERA_RUBIN_NVL144,
                hyperscale * VERA_RUBIN_RATE_MULTIPLIER,
            ),
        ]
        .into_iter()
        .collect()
    }

    /// Value for `key`, or 0 when absent or not finite.
    #[inline]
    pub fn price(&self, key: &str) -> f64 {
        self.0
            .get(key)
            .copied()
            .filter(|v| v.is_finite())
            .unwrap_or(0.0)
    }

    /// Raw entry for `key`.
    #[inline]
    pub fn get(&self, key: &str) -> Option<f64> {
        self.0.get(key).copied()
    }

    /// Whether `key` is present.
    #[inline]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Inserts or replaces an entry.
    pub fn insert(&mut self, key: impl Into<String>, value: f64) {
        self.0.insert(key.into(), value);
    }

    /// Removes an entry, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<f64> {
        self.0.remove(key)
    }

    /// Keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for GpuTable {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Price and hourly-rate tables edited together.
///
/// # Examples
/// ```
/// use valuation_core::market_data::GpuMarket;
///
/// let mut market = GpuMarket::default();
/// market.add_gpu_type("h200", 30_000.0, 2.1).unwrap();
/// assert_eq!(market.hourly_rates.price("h200"), 2.1);
/// assert!(market.remove_gpu_type("b200").is_err());
/// market.remove_gpu_type("h200").unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GpuMarket {
    /// Unit prices in $ per GPU.
    pub prices: GpuTable,
    /// Lease rates in $ per GPU-hour.
    pub hourly_rates: GpuTable,
}

impl Default for GpuMarket {
    fn default() -> Self {
        Self {
            prices: GpuTable::default_prices(),
            hourly_rates: GpuTable::default_hourly_rates(),
        }
    }
}

impl GpuMarket {
    /// Creates a market from explicit tables.
    ///
    /// Default GPU types missing from either table are filled in with their
    /// default values, so calculators can always price the built-in types.
    pub fn new(prices: GpuTable, hourly_rates: GpuTable) -> Self {
        let mut market = Self {
            prices,
            hourly_rates,
        };
        let defaults = Self::default();
        for key in DEFAULT_GPU_KEYS {
            if !market.prices.contains(key) {
                market.prices.insert(key, defaults.prices.price(key));
            }
            if !market.hourly_rates.contains(key) {
                market
                    .hourly_rates
                    .insert(key, defaults.hourly_rates.price(key));
            }
        }
        market
    }

    /// Whether `key` names a built-in GPU type.
    pub fn is_default_type(key: &str) -> bool {
        DEFAULT_GPU_KEYS.contains(&key)
    }

    /// Adds a user-defined GPU type to both tables.
    ///
    /// # Errors
    ///
    /// - `InvalidGpuKey` if the key is empty or contains whitespace
    /// - `DuplicateGpuType` if the key already exists
    pub fn add_gpu_type(
        &mut self,
        key: &str,
        price: f64,
        hourly_rate: f64,
    ) -> Result<(), ValuationError> {
        validate_key(key)?;
        if self.prices.contains(key) || self.hourly_rates.contains(key) {
            return Err(ValuationError::DuplicateGpuType(key.to_string()));
        }
        self.prices.insert(key, price);
        self.hourly_rates.insert(key, hourly_rate);
        Ok(())
    }

    /// Removes a user-defined GPU type from both tables.
    ///
    /// # Errors
    ///
    /// - `ProtectedGpuType` for a built-in type
    /// - `UnknownGpuType` if the key is absent
    pub fn remove_gpu_type(&mut self, key: &str) -> Result<(), ValuationError> {
        if Self::is_default_type(key) {
            return Err(ValuationError::ProtectedGpuType(key.to_string()));
        }
        let had_price = self.prices.remove(key).is_some();
        let had_rate = self.hourly_rates.remove(key).is_some();
        if had_price || had_rate {
            Ok(())
        } else {
            Err(ValuationError::UnknownGpuType(key.to_string()))
        }
    }

    /// Sets the unit price of an existing GPU type.
    ///
    /// Blank input (NaN) is committed as 0.
    pub fn set_price(&mut self, key: &str, price: f64) -> Result<(), ValuationError> {
        if !self.prices.contains(key) {
            return Err(ValuationError::UnknownGpuType(key.to_string()));
        }
        self.prices
            .insert(key, if price.is_finite() { price } else { 0.0 });
        Ok(())
    }

    /// Sets the hourly rate of an existing GPU type.
    ///
    /// Blank input (NaN) is committed as 0.
    pub fn set_hourly_rate(&mut self, key: &str, rate: f64) -> Result<(), ValuationError> {
        if !self.hourly_rates.contains(key) {
            return Err(ValuationError::UnknownGpuType(key.to_string()));
        }
        self.hourly_rates
            .insert(key, if rate.is_finite() { rate } else { 0.0 });
        Ok(())
    }
}

fn validate_key(key: &str) -> Result<(), ValuationError> {
    if key.is_empty() {
        return Err(ValuationError::InvalidGpuKey {
            key: key.to_string(),
            reason: "key must not be empty",
        });
    }
    if key.chars().any(char::is_whitespace) {
        return Err(ValuationError::InvalidGpuKey {
            key: key.to_string(),
            reason: "key must not contain whitespace",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_prices() {
        let prices = GpuTable::default_prices();
        assert_eq!(prices.len(), 6);
        assert_eq!(prices.price(keys::B200), 45_952.38);
        assert_relative_eq!(prices.price(keys::VERA_RUBIN_NVL144), 114_473.67);
    }

    #[test]
    fn test_default_hourly_rates() {
        let rates = GpuTable::default_hourly_rates();
        assert_relative_eq!(rates.price(keys::B200), 2.3292, epsilon = 1e-4);
        assert_relative_eq!(
            rates.price(keys::HYPERSCALE_BULK_GB300),
            2.9140,
            epsilon = 1e-4
        );
        assert_relative_eq!(
            rates.price(keys::VERA_RUBIN_NVL144),
            rates.price(keys::HYPERSCALE_BULK_GB300) * 1.75
        );
    }

    #[test]
    fn test_missing_key_prices_as_zero() {
        assert_eq!(GpuTable::new().price("h100"), 0.0);
    }

    #[test]
    fn test_add_duplicate_rejected() {
        let mut market = GpuMarket::default();
        let err = market.add_gpu_type("gb300", 1.0, 1.0).unwrap_err();
        assert_eq!(err, ValuationError::DuplicateGpuType("gb300".to_string()));
    }

    #[test]
    fn test_add_invalid_key_rejected() {
        let mut market = GpuMarket::default();
        assert!(matches!(
            market.add_gpu_type("h 200", 1.0, 1.0),
            Err(ValuationError::InvalidGpuKey { .. })
        ));
        assert!(matches!(
            market.add_gpu_type("", 1.0, 1.0),
            Err(ValuationError::InvalidGpuKey { .. })
        ));
    }

    #[test]
    fn test_remove_unknown() {
        let mut market = GpuMarket::default();
        assert_eq!(
            market.remove_gpu_type("h100"),
            Err(ValuationError::UnknownGpuType("h100".to_string()))
        );
    }

    #[test]
    fn test_set_price_blank_commits_zero() {
        let mut market = GpuMarket::default();
        market.set_price(keys::B300, f64::NAN).unwrap();
        assert_eq!(market.prices.get(keys::B300), Some(0.0));
        assert!(market.set_hourly_rate("h100", 1.0).is_err());
    }

    #[test]
    fn test_new_fills_missing_defaults() {
        let prices: GpuTable = [("b200", 50_000.0)].into_iter().collect();
        let market = GpuMarket::new(prices, GpuTable::new());
        assert_eq!(market.prices.price(keys::B200), 50_000.0);
        assert_eq!(market.prices.price(keys::GB300), 80_000.0);
        assert_eq!(market.hourly_rates.len(), 6);
    }

    #[test]
    fn test_display_name_custom_key() {
        assert_eq!(display_name("customChip"), "CUSTOM CHIP");
    }
}
