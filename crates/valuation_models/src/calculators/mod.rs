//! Per-site-type profit calculators.
//!
//! Each site type owns a parameter record and implements [`SiteCalculator`].
//! The three calculators share the load resolution in [`crate::load`] and
//! the amortisation engine in `valuation_core`, composed rather than
//! inherited.
//!
//! - [`ColocationParams`]: Leased power capacity, revenue per MW
//! - [`HyperscalerParams`]: Multi-year hyperscaler contract with financed hardware
//! - [`IrenCloudParams`]: Self-operated GPU cloud

mod colocation;
mod hyperscaler;
mod iren_cloud;

pub use colocation::ColocationParams;
pub use hyperscaler::{
    clamp_improved_percentage, ContractImprovement, HardwareMode, HyperscalerParams,
    ImprovementMode, IMPROVED_PERCENTAGE_MAX, IMPROVED_PERCENTAGE_MIN, NEBIUS_BASE_REVENUE,
};
pub use iren_cloud::{CoolingTier, DcType, IrenCloudParams};

use crate::result::SiteResult;
use valuation_core::format::fixed;
use valuation_core::market_data::GpuMarket;
use valuation_core::math::AmortisationSchedule;
use valuation_core::trace::CalcTrace;

/// Horizon of the positive-cashflow projection, in years.
pub const CASHFLOW_HORIZON_YEARS: f64 = 20.0;

/// GPU replacement cycles within the cashflow horizon.
pub const REPLACEMENT_CYCLES: f64 = 4.0;

/// A site parameter record that can be evaluated.
///
/// Implementations are pure: identical inputs yield identical results.
pub trait SiteCalculator {
    /// Computes the site's annual figures, payback and calculation trace.
    fn evaluate(&self, market: &GpuMarket) -> SiteResult;
}

/// Fraction of the horizon with positive cashflow, scaled to years.
///
/// Returns 0 when the denominator is not positive.
pub(crate) fn payback_years(cashflow: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        cashflow / denominator * CASHFLOW_HORIZON_YEARS
    } else {
        0.0
    }
}

/// Writes one line per amortisation year.
pub(crate) fn record_schedule(trace: &mut CalcTrace, schedule: &AmortisationSchedule) {
    for year in schedule.years() {
        trace.push(format!(
            "Year {} - Start Balance: ${}M, Interest: ${}M, Principal: ${}M",
            year.year,
            fixed(year.start_balance, 2),
            fixed(year.interest_paid, 2),
            fixed(year.principal_paid, 2)
        ));
    }
}
