//! # valuation_models: Site Models and Profit Calculators
//!
//! ## Layer 2 (Models) Role
//!
//! valuation_models turns a site's parameter record into a [`SiteResult`]:
//! - Load sizing shared by every site type (`load`)
//! - One calculator per commercial site type (`calculators`):
//!   Colocation, Hyperscaler IaaS and IREN Cloud
//! - The [`Site`] record and the closed [`SiteParameters`] sum type (`site`)
//! - Explicit derivations a caller may apply after editing a site (`derivations`)
//!
//! Every calculator is a pure function of the parameter record and the
//! [`GpuMarket`](valuation_core::market_data::GpuMarket): blank inputs are
//! coerced, divisors guarded, and the narrative trace is emitted in a fixed
//! order.
//!
//! ## Usage Examples
//!
//! ```rust
//! use valuation_core::market_data::GpuMarket;
//! use valuation_models::{ColocationParams, Site, SiteParameters};
//!
//! let site = Site::new(
//!     "sweetwater-1",
//!     "Sweetwater 1",
//!     SiteParameters::Colocation(ColocationParams::default()),
//! );
//! let result = site.evaluate(&GpuMarket::default());
//! assert!(result.net_profit > 0.0);
//! assert_eq!(result.steps[0], "Total Load: 100.00 MW");
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod calculators;
pub mod derivations;
pub mod load;
pub mod result;
pub mod site;

pub use calculators::{
    ColocationParams, ContractImprovement, CoolingTier, DcType, HardwareMode, HyperscalerParams,
    ImprovementMode, IrenCloudParams, SiteCalculator,
};
pub use load::{LoadInput, LoadInputMode, ResolvedLoad};
pub use result::SiteResult;
pub use site::{Site, SiteParameters, SiteType};
