//! Explicit derivations applied after a site is edited.
//!
//! Sites may opt in to two conveniences:
//! - `autoscale_gpus`: GPU counts follow the IT load when the load changes
//! - `auto_calculate_revenue`: topline revenue follows GPU counts and hourly rates
//!
//! Nothing here runs implicitly. The portfolio state calls [`apply`] after
//! every write that can affect a derived field.

use crate::calculators::{CoolingTier, DcType, HyperscalerParams, IrenCloudParams};
use crate::site::SiteParameters;
use std::collections::BTreeMap;
use valuation_core::market_data::{keys, GpuMarket, GpuTable, HOURS_PER_YEAR};
use valuation_core::types::input::Coerce;

/// Annual revenue ($M) of a GPU fleet leased at the table's hourly rates.
///
/// The dollar figure is rounded to the nearest dollar before conversion.
///
/// # Examples
/// ```
/// use valuation_core::market_data::GpuTable;
/// use valuation_models::derivations::auto_revenue_musd;
///
/// let rates: GpuTable = [("b200", 2.0)].into_iter().collect();
/// assert_eq!(auto_revenue_musd([("b200", 1000.0)], &rates), 17.52);
/// ```
pub fn auto_revenue_musd<'a>(
    counts: impl IntoIterator<Item = (&'a str, f64)>,
    hourly_rates: &GpuTable,
) -> f64 {
    let dollars: f64 = counts
        .into_iter()
        .map(|(key, count)| count.or_zero() * hourly_rates.price(key) * HOURS_PER_YEAR)
        .sum();
    dollars.round() / 1_000_000.0
}

/// Scales GPU counts by the ratio of new to old IT load, rounding to whole GPUs.
///
/// Counts are returned unchanged when the old load is zero or either load is
/// not finite.
pub fn scale_count(count: f64, from_it_mw: f64, to_it_mw: f64) -> f64 {
    if from_it_mw == 0.0 || !from_it_mw.is_finite() || !to_it_mw.is_finite() {
        return count;
    }
    (count.or_zero() * to_it_mw / from_it_mw).round()
}

/// Scales every count in a map. See [`scale_count`].
pub fn scale_gpu_counts(
    counts: &BTreeMap<String, f64>,
    from_it_mw: f64,
    to_it_mw: f64,
) -> BTreeMap<String, f64> {
    counts
        .iter()
        .map(|(key, count)| (key.clone(), scale_count(*count, from_it_mw, to_it_mw)))
        .collect()
}

/// Suggested data centre build cost ($M per MW). Retrofits carry no
/// suggestion.
pub fn suggested_dc_cost_per_mw(dc_type: DcType, tier: CoolingTier) -> f64 {
    match dc_type {
        DcType::Retrofit => 0.0,
        DcType::New => tier.suggested_dc_cost_per_mw(),
    }
}

/// Re-applies the site's enabled derivations.
///
/// `previous_it_load_mw` is the IT load before the edit; pass `None` when the
/// load did not change.
pub fn apply(params: &mut SiteParameters, market: &GpuMarket, previous_it_load_mw: Option<f64>) {
    match params {
        SiteParameters::Colocation(_) => {}
        SiteParameters::Hyperscaler(p) => apply_hyperscaler(p, market, previous_it_load_mw),
        SiteParameters::IrenCloud(p) => apply_iren_cloud(p, market, previous_it_load_mw),
    }
}

fn apply_hyperscaler(p: &mut HyperscalerParams, market: &GpuMarket, previous: Option<f64>) {
    if p.autoscale_gpus {
        if let Some(from) = previous {
            let to = p.load.it_load_mw();
            p.direct_gpu_count = scale_count(p.direct_gpu_count, from, to);
            p.vera_rubin_gpu_count = scale_count(p.vera_rubin_gpu_count, from, to);
            tracing::debug!(from_mw = from, to_mw = to, "hyperscaler GPU counts rescaled");
        }
    }
    if p.auto_calculate_revenue {
        let annual = auto_revenue_musd(
            [
                (keys::HYPERSCALE_BULK_GB300, p.direct_gpu_count),
                (keys::VERA_RUBIN_NVL144, p.vera_rubin_gpu_count),
            ],
            &market.hourly_rates,
        );
        // topline covers the whole contract
        p.topline_revenue = annual * p.contract_years.or_default(1.0);
    }
}

fn apply_iren_cloud(p: &mut IrenCloudParams, market: &GpuMarket, previous: Option<f64>) {
    if p.autoscale_gpus {
        if let Some(from) = previous {
            let to = p.load.it_load_mw();
            p.gpus = scale_gpu_counts(&p.gpus, from, to);
            tracing::debug!(from_mw = from, to_mw = to, "IREN Cloud GPU counts rescaled");
        }
    }
    if p.auto_calculate_revenue {
        p.topline_revenue = auto_revenue_musd(
            p.gpus.iter().map(|(k, v)| (k.as_str(), *v)),
            &market.hourly_rates,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load::LoadInput;
    use approx::assert_relative_eq;
    use valuation_core::units::PowerUnit;

    #[test]
    fn test_auto_revenue_rounds_to_dollar() {
        let rates: GpuTable = [("x", 0.1234567)].into_iter().collect();
        // 0.1234567 * 8760 = 1081.480692 -> 1081 dollars
        assert_eq!(auto_revenue_musd([("x", 1.0)], &rates), 0.001081);
    }

    #[test]
    fn test_auto_revenue_ignores_unknown_types() {
        let market = GpuMarket::default();
        assert_eq!(auto_revenue_musd([("h100", 5000.0)], &market.hourly_rates), 0.0);
    }

    #[test]
    fn test_scale_counts() {
        let counts: BTreeMap<String, f64> =
            [("b200".to_string(), 1000.0), ("b300".to_string(), 333.0)]
                .into_iter()
                .collect();
        let scaled = scale_gpu_counts(&counts, 100.0, 150.0);
        assert_eq!(scaled["b200"], 1500.0);
        assert_eq!(scaled["b300"], 500.0);
        assert_eq!(scale_gpu_counts(&counts, 0.0, 150.0), counts);
    }

    #[test]
    fn test_suggested_cost() {
        assert_eq!(suggested_dc_cost_per_mw(DcType::Retrofit, CoolingTier::T3Liquid), 0.0);
        assert_eq!(suggested_dc_cost_per_mw(DcType::New, CoolingTier::T2Air), 2.0);
    }

    #[test]
    fn test_apply_iren_cloud_both_derivations() {
        let market = GpuMarket::default();
        let mut params = IrenCloudParams {
            load: LoadInput::direct(200.0, PowerUnit::MW),
            autoscale_gpus: true,
            auto_calculate_revenue: true,
            ..IrenCloudParams::default()
        };
        params.gpus.insert(keys::B200.to_string(), 1000.0);
        let mut site = SiteParameters::IrenCloud(params);

        apply(&mut site, &market, Some(100.0));

        let SiteParameters::IrenCloud(p) = site else {
            panic!("variant changed");
        };
        assert_eq!(p.gpus[keys::B200], 2000.0);
        let expected =
            (2000.0 * market.hourly_rates.price(keys::B200) * HOURS_PER_YEAR).round() / 1e6;
        assert_relative_eq!(p.topline_revenue, expected);
    }

    #[test]
    fn test_apply_hyperscaler_revenue_covers_contract() {
        let market = GpuMarket::default();
        let params = HyperscalerParams {
            direct_gpu_count: 76_000.0,
            contract_years: 5.0,
            auto_calculate_revenue: true,
            ..HyperscalerParams::default()
        };
        let mut site = SiteParameters::Hyperscaler(params);
        apply(&mut site, &market, None);
        let SiteParameters::Hyperscaler(p) = site else {
            panic!("variant changed");
        };
        // the reference contract: $1.94B a year for 76k GPUs
        assert_relative_eq!(p.topline_revenue, 1940.0 * 5.0, epsilon = 1e-6);
    }

    #[test]
    fn test_apply_without_flags_is_noop() {
        let market = GpuMarket::default();
        let original = SiteParameters::IrenCloud(IrenCloudParams::default());
        let mut site = original.clone();
        apply(&mut site, &market, Some(10.0));
        assert_eq!(site, original);
    }
}
