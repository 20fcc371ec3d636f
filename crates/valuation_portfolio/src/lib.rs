//! # valuation_portfolio: Portfolio Valuation for the IREN Valuation Engine
//!
//! ## Layer 3 (Application) Role
//!
//! valuation_portfolio combines site results into a company valuation:
//! - Tax, market-cap and share-price roll-up (`aggregator`)
//! - Immutable portfolio state with pure update functions (`state`)
//! - Preset and custom scenarios (`scenarios`)
//! - The reference portfolio of announced sites (`reference`)
//! - JSON configuration snapshots (`snapshot`)
//!
//! ## Usage Examples
//!
//! ```rust
//! use valuation_portfolio::{valuate, PortfolioState};
//! use valuation_core::format::format_price;
//!
//! let state = PortfolioState::reference();
//! let valuation = valuate(&state);
//! assert_eq!(format_price(valuation.share_price), "$157.60");
//!
//! let canada = state
//!     .with_scenario_selected(Some("canada".into()))
//!     .unwrap();
//! assert_eq!(valuate(&canada).sites.len(), 2);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod aggregator;
pub mod error;
pub mod reference;
pub mod scenarios;
pub mod snapshot;
pub mod state;

pub use aggregator::{valuate, CorporateParams, PortfolioValuation, ShareParams, SiteContribution};
pub use error::PortfolioError;
pub use scenarios::{Scenario, DEFAULT_SCENARIO};
pub use snapshot::{ConfigSnapshot, SnapshotError};
pub use state::PortfolioState;
