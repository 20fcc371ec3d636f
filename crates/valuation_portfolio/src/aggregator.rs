//! Portfolio roll-up: taxes, market capitalisation and share price.
//!
//! The aggregator sums the annual figures of the active sites, deducts SG&A
//! and the abated corporate tax, and capitalises the result at the P/E ratio:
//!
//! ```text
//! preTax       = Σ netProfit − sga
//! corporateTax = preTax × taxRate
//! taxes        = corporateTax − corporateTax × abatementRate
//! marketCap    = (preTax − taxes) × P/E
//! sharePrice   = marketCap / fullyDilutedShares
//! ```

use crate::state::PortfolioState;
use serde::{Deserialize, Serialize};
use valuation_core::format::{fixed, format_price, format_shares, format_value, plain};
use valuation_core::types::input::{lenient_f64, Coerce};
use valuation_core::types::SiteId;
use valuation_models::SiteResult;

/// Share-count and multiple inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShareParams {
    /// Use `direct_shares` instead of the diluted current count.
    pub use_direct_shares: bool,
    /// Fully diluted share count entered directly (millions).
    #[serde(deserialize_with = "lenient_f64")]
    pub direct_shares: f64,
    /// Current share count (millions).
    #[serde(deserialize_with = "lenient_f64")]
    pub current_shares: f64,
    /// Expected dilution (%).
    #[serde(deserialize_with = "lenient_f64")]
    pub dilution_percentage: f64,
    /// Price/earnings multiple.
    #[serde(deserialize_with = "lenient_f64")]
    pub pe_ratio: f64,
}

impl Default for ShareParams {
    fn default() -> Self {
        Self {
            use_direct_shares: false,
            direct_shares: 0.0,
            current_shares: 409.126,
            dilution_percentage: 15.0,
            pe_ratio: 40.0,
        }
    }
}

impl ShareParams {
    /// Fully diluted share count (millions); blank inputs count as 0.
    pub fn fully_diluted_shares(&self) -> f64 {
        if self.use_direct_shares {
            self.direct_shares.or_zero()
        } else {
            self.current_shares.or_zero() * (1.0 + self.dilution_percentage.or_zero() / 100.0)
        }
    }
}

/// Corporate cost and tax inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CorporateParams {
    /// Statutory corporate tax rate (%).
    #[serde(deserialize_with = "lenient_f64")]
    pub corporate_tax_rate: f64,
    /// Share of corporate tax abated (%).
    #[serde(deserialize_with = "lenient_f64")]
    pub tax_abatement_rate: f64,
    /// Annual SG&A expense ($M).
    #[serde(deserialize_with = "lenient_f64")]
    pub sga_expense: f64,
}

impl Default for CorporateParams {
    fn default() -> Self {
        Self {
            corporate_tax_rate: 21.0,
            tax_abatement_rate: 85.0,
            sga_expense: 136.9,
        }
    }
}

/// One active site's share of the portfolio.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteContribution {
    /// Site identifier.
    pub id: SiteId,
    /// Display name.
    pub name: String,
    /// Annual revenue ($M/yr).
    pub revenue: f64,
    /// Annual net profit ($M/yr).
    pub net_profit: f64,
    /// Payback heuristic (years, 0 when undefined).
    pub payback_years: f64,
}

impl SiteContribution {
    /// Builds a contribution from a site result.
    pub fn new(id: SiteId, name: impl Into<String>, result: &SiteResult) -> Self {
        Self {
            id,
            name: name.into(),
            revenue: result.revenue,
            net_profit: result.net_profit,
            payback_years: result.payback_years,
        }
    }
}

/// Portfolio-level valuation.
///
/// All monetary figures are $M; shares are millions.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioValuation {
    /// Σ revenue over active sites.
    pub total_revenue: f64,
    /// Σ net profit over active sites (earnings before tax and SG&A).
    pub total_net_profit: f64,
    /// SG&A deducted before tax.
    pub sga_expense: f64,
    /// Earnings after SG&A.
    pub pre_tax_profit: f64,
    /// Tax rate (%) applied.
    pub corporate_tax_rate: f64,
    /// Abatement rate (%) applied.
    pub tax_abatement_rate: f64,
    /// Gross corporate tax.
    pub corporate_tax: f64,
    /// Abated portion of the corporate tax.
    pub tax_abatement: f64,
    /// Net taxes payable.
    pub taxes: f64,
    /// Earnings after tax.
    pub net_profit_after_tax: f64,
    /// P/E multiple applied.
    pub pe_ratio: f64,
    /// Market capitalisation.
    pub market_cap: f64,
    /// Fully diluted share count.
    pub fully_diluted_shares: f64,
    /// Price per share ($), 0 without shares.
    pub share_price: f64,
    /// Per-site breakdown in portfolio order.
    pub sites: Vec<SiteContribution>,
}

impl PortfolioValuation {
    /// Rolls up the active sites' contributions.
    ///
    /// # Examples
    /// ```
    /// use valuation_portfolio::{CorporateParams, PortfolioValuation, ShareParams};
    ///
    /// let valuation =
    ///     PortfolioValuation::aggregate(Vec::new(), &CorporateParams::default(), &ShareParams::default());
    /// assert_eq!(valuation.total_revenue, 0.0);
    /// assert!(valuation.market_cap < 0.0);
    /// ```
    pub fn aggregate(
        sites: Vec<SiteContribution>,
        corporate: &CorporateParams,
        shares: &ShareParams,
    ) -> Self {
        let total_revenue: f64 = sites.iter().map(|s| s.revenue.or_zero()).sum();
        let total_net_profit: f64 = sites.iter().map(|s| s.net_profit.or_zero()).sum();

        let sga_expense = corporate.sga_expense.or_zero();
        let corporate_tax_rate = corporate.corporate_tax_rate.or_zero();
        let tax_abatement_rate = corporate.tax_abatement_rate.or_zero();

        let pre_tax_profit = total_net_profit - sga_expense;
        let corporate_tax = pre_tax_profit * corporate_tax_rate / 100.0;
        let tax_abatement = corporate_tax * tax_abatement_rate / 100.0;
        let taxes = corporate_tax - tax_abatement;
        let net_profit_after_tax = pre_tax_profit - taxes;

        let pe_ratio = shares.pe_ratio.or_zero();
        let market_cap = net_profit_after_tax * pe_ratio;
        let fully_diluted_shares = shares.fully_diluted_shares();
        let share_price = if fully_diluted_shares > 0.0 {
            (market_cap / fully_diluted_shares).or_zero()
        } else {
            0.0
        };

        Self {
            total_revenue,
            total_net_profit,
            sga_expense,
            pre_tax_profit,
            corporate_tax_rate,
            tax_abatement_rate,
            corporate_tax,
            tax_abatement,
            taxes,
            net_profit_after_tax,
            pe_ratio,
            market_cap,
            fully_diluted_shares,
            share_price,
            sites,
        }
    }

    /// Narrative of the roll-up: revenue and earnings splits, then the tax,
    /// market-cap and share-price formulas.
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.sites.len() * 2 + 12);

        lines.push("Annual Revenue Split:".to_string());
        for site in &self.sites {
            lines.push(format!("{}: {}", site.name, format_value(site.revenue, "$", "/yr")));
        }
        lines.push(format!(
            "Total Annual Revenue = {}",
            format_value(self.total_revenue, "$", "/yr")
        ));

        lines.push("Earnings before Tax, SG&A Split:".to_string());
        for site in &self.sites {
            lines.push(format!(
                "{}: {}",
                site.name,
                format_value(site.net_profit, "$", "/yr")
            ));
        }
        lines.push(format!(
            "Total Earnings before Tax, SG&A = {}",
            format_value(self.total_net_profit, "$", "/yr")
        ));

        lines.push(format!(
            "Pre-Tax Profit = {} - {} SG&A = {}",
            format_value(self.total_net_profit, "$", ""),
            format_value(self.sga_expense, "$", ""),
            format_value(self.pre_tax_profit, "$", "")
        ));
        lines.push(format!(
            "Corporate Tax = ${}M × {}% = ${}M",
            fixed(self.pre_tax_profit, 2),
            plain(self.corporate_tax_rate),
            fixed(self.corporate_tax, 2)
        ));
        lines.push(format!(
            "Tax Abatement = ${}M × {}% = ${}M",
            fixed(self.corporate_tax, 2),
            plain(self.tax_abatement_rate),
            fixed(self.tax_abatement, 2)
        ));
        lines.push(format!(
            "Net Taxes = ${}M - ${}M = ${}M",
            fixed(self.corporate_tax, 2),
            fixed(self.tax_abatement, 2),
            fixed(self.taxes, 2)
        ));
        lines.push(format!(
            "Net Profit after Tax = {} - {} = {}",
            format_value(self.pre_tax_profit, "$", ""),
            format_value(self.taxes, "$", ""),
            format_value(self.net_profit_after_tax, "$", "")
        ));
        lines.push(format!(
            "Market Cap = Net Profit after Tax × P/E Ratio = {} × {} = {}",
            format_value(self.net_profit_after_tax, "$", ""),
            plain(self.pe_ratio),
            format_value(self.market_cap, "$", "")
        ));
        lines.push(format!(
            "Share Price = Market Cap / Fully Diluted Shares = {} / {} = {}",
            format_value(self.market_cap, "$", ""),
            format_shares(self.fully_diluted_shares),
            format_price(self.share_price)
        ));
        lines
    }
}

/// Evaluates every active site of `state` and rolls the results up.
///
/// Nothing is cached: each call recomputes all site results.
pub fn valuate(state: &PortfolioState) -> PortfolioValuation {
    let market = state.market();
    let contributions = state
        .active_sites()
        .map(|site| {
            let result = site.evaluate(market);
            tracing::trace!(site = %site.id, net_profit = result.net_profit, "site valued");
            SiteContribution::new(site.id.clone(), site.name.clone(), &result)
        })
        .collect();
    PortfolioValuation::aggregate(contributions, state.corporate_params(), state.share_params())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn contribution(name: &str, revenue: f64, net_profit: f64) -> SiteContribution {
        SiteContribution {
            id: SiteId::new(name),
            name: name.to_string(),
            revenue,
            net_profit,
            payback_years: 0.0,
        }
    }

    #[test]
    fn test_tax_chain() {
        let corporate = CorporateParams {
            sga_expense: 0.0,
            ..CorporateParams::default()
        };
        let valuation = PortfolioValuation::aggregate(
            vec![contribution("a", 500.0, 100.0)],
            &corporate,
            &ShareParams::default(),
        );
        assert_relative_eq!(valuation.pre_tax_profit, 100.0);
        assert_relative_eq!(valuation.corporate_tax, 21.0);
        assert_relative_eq!(valuation.tax_abatement, 17.85, epsilon = 1e-12);
        assert_relative_eq!(valuation.taxes, 3.15, epsilon = 1e-12);
        assert_relative_eq!(valuation.net_profit_after_tax, 96.85, epsilon = 1e-12);
    }

    #[test]
    fn test_sums_and_market_cap() {
        let corporate = CorporateParams {
            corporate_tax_rate: 0.0,
            tax_abatement_rate: 0.0,
            sga_expense: 50.0,
        };
        let shares = ShareParams {
            use_direct_shares: true,
            direct_shares: 100.0,
            pe_ratio: 10.0,
            ..ShareParams::default()
        };
        let valuation = PortfolioValuation::aggregate(
            vec![contribution("a", 500.0, 100.0), contribution("b", 300.0, 50.0)],
            &corporate,
            &shares,
        );
        assert_eq!(valuation.total_revenue, 800.0);
        assert_eq!(valuation.total_net_profit, 150.0);
        assert_eq!(valuation.market_cap, 1000.0);
        assert_eq!(valuation.share_price, 10.0);
    }

    #[test]
    fn test_zero_shares_gives_zero_price() {
        let shares = ShareParams {
            use_direct_shares: true,
            direct_shares: 0.0,
            ..ShareParams::default()
        };
        let valuation = PortfolioValuation::aggregate(
            vec![contribution("a", 500.0, 400.0)],
            &CorporateParams::default(),
            &shares,
        );
        assert!(valuation.market_cap > 0.0);
        assert_eq!(valuation.share_price, 0.0);
    }

    #[test]
    fn test_blank_inputs_are_zero() {
        let corporate = CorporateParams {
            corporate_tax_rate: f64::NAN,
            tax_abatement_rate: f64::NAN,
            sga_expense: f64::NAN,
        };
        let shares = ShareParams {
            current_shares: f64::NAN,
            dilution_percentage: f64::NAN,
            pe_ratio: f64::NAN,
            ..ShareParams::default()
        };
        let valuation =
            PortfolioValuation::aggregate(vec![contribution("a", 1.0, 1.0)], &corporate, &shares);
        assert_eq!(valuation.taxes, 0.0);
        assert_eq!(valuation.market_cap, 0.0);
        assert_eq!(valuation.share_price, 0.0);
    }

    #[test]
    fn test_diluted_shares() {
        assert_relative_eq!(
            ShareParams::default().fully_diluted_shares(),
            470.4949,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_summary_lines() {
        let valuation = PortfolioValuation::aggregate(
            vec![
                contribution("Prince George", 500.0, 217.4158),
                contribution("Horizon 1-4", 1940.0, 193.8085),
            ],
            &CorporateParams::default(),
            &ShareParams::default(),
        );
        let lines = valuation.summary_lines();
        assert_eq!(lines[0], "Annual Revenue Split:");
        assert_eq!(lines[1], "Prince George: $500M/yr");
        assert_eq!(lines[2], "Horizon 1-4: $1.94B/yr");
        assert_eq!(lines[3], "Total Annual Revenue = $2.44B/yr");
        assert_eq!(lines[5], "Prince George: $217M/yr");
        assert_eq!(lines[7], "Total Earnings before Tax, SG&A = $411M/yr");
        assert!(lines
            .last()
            .is_some_and(|l| l.starts_with("Share Price = Market Cap / Fully Diluted Shares")));
    }

    mod proptests {
        use super::contribution;
        use crate::aggregator::{CorporateParams, PortfolioValuation, ShareParams};
        use proptest::prelude::*;

        fn profit_strategy() -> impl Strategy<Value = f64> {
            -5_000.0..5_000.0
        }

        fn rate_strategy() -> impl Strategy<Value = f64> {
            0.0..100.0
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(500))]

            #[test]
            fn test_tax_chain_identities(
                profits in prop::collection::vec(profit_strategy(), 0..8),
                sga in 0.0..500.0,
                tax_rate in rate_strategy(),
                abatement_rate in rate_strategy(),
            ) {
                let sites: Vec<_> = profits
                    .iter()
                    .enumerate()
                    .map(|(i, p)| contribution(&format!("site-{i}"), p.abs(), *p))
                    .collect();
                let corporate = CorporateParams {
                    corporate_tax_rate: tax_rate,
                    tax_abatement_rate: abatement_rate,
                    sga_expense: sga,
                };
                let v = PortfolioValuation::aggregate(sites, &corporate, &ShareParams::default());

                let total: f64 = profits.iter().sum();
                prop_assert!((v.total_net_profit - total).abs() < 1e-9);
                prop_assert!((v.pre_tax_profit - (total - sga)).abs() < 1e-9);
                prop_assert!((v.taxes - (v.corporate_tax - v.tax_abatement)).abs() < 1e-9);
                prop_assert!(
                    (v.net_profit_after_tax - (v.pre_tax_profit - v.taxes)).abs() < 1e-9
                );
                // abatement never exceeds the tax it reduces
                prop_assert!(v.tax_abatement.abs() <= v.corporate_tax.abs() + 1e-12);
                prop_assert!(v.share_price.is_finite());
            }

            #[test]
            fn test_fully_diluted_shares_never_below_current(
                current in 0.0..10_000.0,
                dilution in 0.0..200.0,
            ) {
                let shares = ShareParams {
                    use_direct_shares: false,
                    current_shares: current,
                    dilution_percentage: dilution,
                    ..ShareParams::default()
                };
                let diluted = shares.fully_diluted_shares();
                prop_assert!(diluted >= current);
                prop_assert!((diluted - current * (1.0 + dilution / 100.0)).abs() < 1e-9);
            }

            #[test]
            fn test_share_price_is_market_cap_per_share(
                profit in 1.0..5_000.0,
                pe in 1.0..80.0,
                current in 1.0..2_000.0,
            ) {
                let shares = ShareParams {
                    current_shares: current,
                    pe_ratio: pe,
                    ..ShareParams::default()
                };
                let v = PortfolioValuation::aggregate(
                    vec![contribution("a", profit, profit)],
                    &CorporateParams::default(),
                    &shares,
                );
                prop_assert!((v.market_cap - v.net_profit_after_tax * pe).abs() < 1e-6);
                prop_assert!(
                    (v.share_price * v.fully_diluted_shares - v.market_cap).abs()
                        < 1e-6 * v.market_cap.abs().max(1.0)
                );
            }
        }
    }
}
