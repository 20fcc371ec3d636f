//! Market data consumed by the site calculators.
//!
//! # Components
//!
//! - [`gpu`]: GPU unit-price and hourly-rate tables ([`GpuTable`], [`GpuMarket`])
//!
//! # Example
//!
//! ```
//! use valuation_core::market_data::{GpuMarket, keys};
//!
//! let market = GpuMarket::default();
//! assert_eq!(market.prices.price(keys::GB300), 80_000.0);
//! ```

pub mod gpu;

pub use gpu::{display_name, keys, GpuMarket, GpuTable, DEFAULT_GPU_KEYS, HOURS_PER_YEAR};
