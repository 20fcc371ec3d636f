//! Colocation: power capacity leased to a tenant at a fixed rate per MW.
//!
//! There is no GPU or debt modelling. The only capex is the data centre,
//! depreciated over its lifetime and paid once within the 20-year horizon.

use super::{payback_years, SiteCalculator, CASHFLOW_HORIZON_YEARS};
use crate::load::LoadInput;
use crate::result::SiteResult;
use serde::{Deserialize, Serialize};
use valuation_core::format::{fixed, plain};
use valuation_core::market_data::GpuMarket;
use valuation_core::trace::{CalcTrace, POSITIVE_CASHFLOW_HEADING};
use valuation_core::types::input::{blank, lenient_f64, Coerce};

/// Colocation site parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColocationParams {
    /// Load sizing.
    #[serde(flatten)]
    pub load: LoadInput,
    /// Lease revenue ($M per MW-year of IT load).
    #[serde(rename = "revenuePerMW", default = "blank", deserialize_with = "lenient_f64")]
    pub revenue_per_mw: f64,
    /// Build cost ($M per MW of IT load).
    #[serde(rename = "dcCostPerMW", default = "blank", deserialize_with = "lenient_f64")]
    pub dc_cost_per_mw: f64,
    /// Data centre depreciation life (years).
    #[serde(default = "blank", deserialize_with = "lenient_f64")]
    pub dc_lifetime: f64,
}

impl Default for ColocationParams {
    fn default() -> Self {
        Self {
            load: LoadInput::default(),
            revenue_per_mw: 1.83,
            dc_cost_per_mw: 15.0,
            dc_lifetime: 20.0,
        }
    }
}

impl SiteCalculator for ColocationParams {
    fn evaluate(&self, _market: &GpuMarket) -> SiteResult {
        let mut trace = CalcTrace::new();

        let load = self.load.resolve();
        load.record(&mut trace, true);
        let it_load = load.it_load_mw;

        let revenue_per_mw = self.revenue_per_mw.or_zero();
        let revenue = it_load * revenue_per_mw;
        trace.push(format!(
            "Revenue: {} MW × ${}M/MW-yr = ${}M/yr",
            fixed(it_load, 2),
            plain(revenue_per_mw),
            fixed(revenue, 2)
        ));

        let dc_cost_per_mw = self.dc_cost_per_mw.or_zero();
        let dc_cost = it_load * dc_cost_per_mw;
        trace.push(format!(
            "DC Cost: {} MW × ${}M/MW = ${}M",
            fixed(it_load, 2),
            plain(dc_cost_per_mw),
            fixed(dc_cost, 2)
        ));

        let dc_lifetime = self.dc_lifetime.or_default(1.0);
        let dc_depreciation = dc_cost / dc_lifetime;
        trace.push(format!(
            "DC Depreciation: ${}M / {} yrs = ${}M/yr",
            fixed(dc_cost, 2),
            plain(dc_lifetime),
            fixed(dc_depreciation, 2)
        ));

        let net_profit = revenue - dc_depreciation;
        trace.push(format!(
            "Earnings before Tax, SG&A: ${}M - ${}M = ${}M/yr",
            fixed(revenue, 2),
            fixed(dc_depreciation, 2),
            fixed(net_profit, 2)
        ));

        trace.section(POSITIVE_CASHFLOW_HEADING);
        let revenue_20yr = revenue * CASHFLOW_HORIZON_YEARS;
        trace.push(format!(
            "20-Year Revenue: ${}M/yr × 20 = ${}M",
            fixed(revenue, 2),
            fixed(revenue_20yr, 2)
        ));

        let cashflow_20yr = revenue_20yr - dc_cost;
        trace.push(format!(
            "20-Year Net Cashflow: ${}M - ${}M = ${}M",
            fixed(revenue_20yr, 2),
            fixed(dc_cost, 2),
            fixed(cashflow_20yr, 2)
        ));

        let payback = payback_years(cashflow_20yr, revenue_20yr);
        trace.push(format!(
            "Positive Cashflow: (${}M / ${}M) × 20 = {} out of 20 years",
            fixed(cashflow_20yr, 2),
            fixed(revenue_20yr, 2),
            fixed(payback, 1)
        ));

        SiteResult::new(
            net_profit,
            revenue,
            trace.into_steps(),
            payback,
            cashflow_20yr,
            it_load,
        )
    }
}
