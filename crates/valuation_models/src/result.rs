//! Per-site calculation output.

use serde::{Deserialize, Serialize};
use valuation_core::types::input::Coerce;

/// Result of evaluating one site.
///
/// Produced fresh by every evaluation and never cached. Money figures are in
/// $M; `it_load` is in MW. Every numeric field is finite.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteResult {
    /// Annual earnings before tax and SG&A ($M/yr).
    pub net_profit: f64,
    /// Annual revenue ($M/yr).
    pub revenue: f64,
    /// Ordered narrative of every intermediate quantity.
    pub steps: Vec<String>,
    /// Years out of 20 with positive cumulative cashflow.
    pub payback_years: f64,
    /// Projected 20-year net cashflow ($M).
    pub total_cashflow_20yr: f64,
    /// IT load under the active sizing mode (MW).
    pub it_load: f64,
}

impl SiteResult {
    /// Builds a result, replacing any non-finite figure with 0.
    pub fn new(
        net_profit: f64,
        revenue: f64,
        steps: Vec<String>,
        payback_years: f64,
        total_cashflow_20yr: f64,
        it_load: f64,
    ) -> Self {
        Self {
            net_profit: net_profit.or_zero(),
            revenue: revenue.or_zero(),
            steps,
            payback_years: payback_years.or_zero(),
            total_cashflow_20yr: total_cashflow_20yr.or_zero(),
            it_load: it_load.or_zero(),
        }
    }

    /// The all-zero result of a disabled site.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Whether the site contributes nothing.
    pub fn is_zero(&self) -> bool {
        self.net_profit == 0.0 && self.revenue == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_finite_replaced() {
        let result = SiteResult::new(f64::NAN, f64::INFINITY, vec![], 1.0, 2.0, 3.0);
        assert_eq!(result.net_profit, 0.0);
        assert_eq!(result.revenue, 0.0);
        assert_eq!(result.payback_years, 1.0);
    }

    #[test]
    fn test_serialised_field_names() {
        let json = serde_json::to_value(SiteResult::zero()).unwrap();
        assert!(json.get("netProfit").is_some());
        assert!(json.get("totalCashflow20yr").is_some());
        assert!(json.get("itLoad").is_some());
    }
}
