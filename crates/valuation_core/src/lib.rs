//! # valuation_core: Foundation for the IREN Valuation Engine
//!
//! ## Layer 1 (Foundation) Role
//!
//! valuation_core is the bottom layer of the valuation workspace, providing:
//! - Power unit conversion between MW and GW (`units`)
//! - Fixed-payment loan amortisation with monthly simulation (`math::amortisation`)
//! - GPU unit price and hourly-rate tables (`market_data::gpu`)
//! - Blank-tolerant numeric input handling (`types::input`)
//! - Identifier and error types (`types::ids`, `types::error`)
//! - Display formatting for $M / $B figures (`format`)
//! - The narrative calculation trace shared by every site calculator (`trace`)
//!
//! ## Dependency Principle
//!
//! Layer 1 has no dependencies on other valuation_* crates. External
//! dependencies are limited to:
//! - thiserror: Structured error types
//! - serde: Snapshot (de)serialisation of tables and identifiers
//!
//! ## Usage Examples
//!
//! ```rust
//! use valuation_core::math::amortisation::yearly_schedule;
//! use valuation_core::units::{to_mw, PowerUnit};
//!
//! assert_eq!(to_mw(1.5, PowerUnit::GW), 1500.0);
//!
//! let schedule = yearly_schedule(100.0, 7.0, 5);
//! assert_eq!(schedule.years().len(), 5);
//! assert!(schedule.final_balance().abs() < 1e-9);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod format;
pub mod market_data;
pub mod math;
pub mod trace;
pub mod types;
pub mod units;
