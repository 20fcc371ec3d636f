//! The reference portfolio: IREN's announced sites with public-data inputs.
//!
//! All sites start enabled except Sweetwater 2; scenarios decide which of them
//! are active.

use valuation_core::market_data::keys;
use valuation_core::units::PowerUnit;
use valuation_models::{
    ColocationParams, ContractImprovement, HardwareMode, HyperscalerParams, ImprovementMode,
    IrenCloudParams, LoadInput, Site, SiteParameters,
};

/// Identifiers of the reference sites.
pub mod site_ids {
    /// Prince George, British Columbia (IREN Cloud).
    pub const PRINCE_GEORGE: &str = "prince-george";
    /// Mackenzie and Canal Flats, British Columbia (IREN Cloud).
    pub const MACKENZIE: &str = "mackenzie-canal";
    /// Childress Horizons 1-4 (hyperscaler contract).
    pub const HORIZON_1_4: &str = "horizon-1-4";
    /// Childress Horizons 5-8.
    pub const HORIZON_5_8: &str = "horizon-5-8";
    /// Childress Horizons 9-10.
    pub const HORIZON_9_10: &str = "horizon-9-10";
    /// Sweetwater 1 leased as colocation.
    pub const SWEETWATER_1: &str = "sweetwater-1";
    /// 300 MW of Sweetwater 1 leased to a hyperscaler.
    pub const SW1_HYPERSCALER: &str = "sw1-hyperscaler";
    /// Sweetwater 2 (colocation).
    pub const SWEETWATER_2: &str = "sweetwater-2";
}

const HORIZON_GPU_COUNT: f64 = 90_000.0;
const HORIZON_IMPROVED_PERCENTAGE: f64 = 87.9;

fn canada_fleet(scale: f64) -> IrenCloudParams {
    let gpus = [
        (keys::B300, 9_500.0),
        (keys::B200, 9_600.0),
        (keys::MI350X, 1_100.0),
        (keys::GB300, 1_200.0),
    ]
    .into_iter()
    .map(|(key, count)| (key.to_string(), count * scale))
    .collect();
    IrenCloudParams {
        gpus,
        ..IrenCloudParams::default()
    }
}

fn nebius_improvement() -> ContractImprovement {
    ContractImprovement {
        contract_gap_enabled: true,
        improvement_mode: ImprovementMode::Percentage,
        improved_contracts_percentage: HORIZON_IMPROVED_PERCENTAGE,
        ..ContractImprovement::default()
    }
}

fn horizon_expansion(load: LoadInput, dc_cost_per_mw: f64) -> HyperscalerParams {
    HyperscalerParams {
        load,
        topline_revenue: 11_650.0,
        hardware_mode: HardwareMode::Gpus,
        direct_gpu_count: HORIZON_GPU_COUNT,
        dc_cost_per_mw,
        improvement: nebius_improvement(),
        ..HyperscalerParams::default()
    }
}

/// Builds the reference sites in display order.
pub fn reference_sites() -> Vec<Site> {
    use site_ids::*;

    vec![
        Site::new(
            PRINCE_GEORGE,
            "Prince George",
            SiteParameters::IrenCloud(IrenCloudParams {
                load: LoadInput::total(100.0, PowerUnit::MW, 1.5),
                topline_revenue: 500.0,
                gpu_paid_off_percent: 25.0,
                ..canada_fleet(1.0)
            }),
        ),
        Site::new(
            MACKENZIE,
            "Mackenzie + Canal Flats",
            SiteParameters::IrenCloud(IrenCloudParams {
                load: LoadInput::total(200.0, PowerUnit::MW, 1.5),
                topline_revenue: 1_000.0,
                ..canada_fleet(2.0)
            }),
        ),
        Site::new(
            HORIZON_1_4,
            "Horizon 1-4",
            SiteParameters::Hyperscaler(HyperscalerParams {
                load: LoadInput::total(300.0, PowerUnit::MW, 1.5),
                topline_revenue: 9_700.0,
                total_hardware_cost: 5_800.0,
                ..HyperscalerParams::default()
            }),
        ),
        Site::new(
            HORIZON_5_8,
            "Horizon 5-8",
            SiteParameters::Hyperscaler(horizon_expansion(
                LoadInput::total(375.0, PowerUnit::MW, 1.5),
                15.0,
            )),
        ),
        Site::new(
            HORIZON_9_10,
            "Horizon 9-10",
            SiteParameters::Hyperscaler(HyperscalerParams {
                load: LoadInput::total(150.0, PowerUnit::MW, 1.5),
                topline_revenue: 4_850.0,
                total_hardware_cost: 2_900.0,
                ..HyperscalerParams::default()
            }),
        ),
        Site::new(
            SWEETWATER_1,
            "Sweetwater 1",
            SiteParameters::Colocation(ColocationParams {
                load: LoadInput::total(1_400.0, PowerUnit::MW, 1.5),
                ..ColocationParams::default()
            }),
        ),
        Site::new(
            SW1_HYPERSCALER,
            "SW1: 300MW Hyperscaler",
            SiteParameters::Hyperscaler(horizon_expansion(
                LoadInput::direct(300.0, PowerUnit::MW),
                12.5,
            )),
        ),
        Site::new(
            SWEETWATER_2,
            "Sweetwater 2",
            SiteParameters::Colocation(ColocationParams {
                load: LoadInput::total(600.0, PowerUnit::MW, 1.5),
                ..ColocationParams::default()
            }),
        )
        .enabled(false),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::collections::BTreeSet;
    use valuation_core::market_data::GpuMarket;

    #[test]
    fn test_ids_are_unique() {
        let sites = reference_sites();
        let ids: BTreeSet<_> = sites.iter().map(|s| s.id.clone()).collect();
        assert_eq!(ids.len(), sites.len());
    }

    #[test]
    fn test_sweetwater_2_starts_disabled() {
        let sites = reference_sites();
        let disabled: Vec<_> = sites.iter().filter(|s| !s.enabled).collect();
        assert_eq!(disabled.len(), 1);
        assert_eq!(disabled[0].id.as_str(), site_ids::SWEETWATER_2);
    }

    #[test]
    fn test_sw1_hyperscaler_matches_horizon_5_8() {
        let market = GpuMarket::default();
        let sites = reference_sites();
        let find = |id: &str| {
            sites
                .iter()
                .find(|s| s.id.as_str() == id)
                .map(|s| s.evaluate(&market))
                .unwrap_or_default()
        };
        let h58 = find(site_ids::HORIZON_5_8);
        let sw1 = find(site_ids::SW1_HYPERSCALER);
        assert_relative_eq!(h58.revenue, 2753.028, epsilon = 1e-6);
        assert_relative_eq!(h58.net_profit, sw1.net_profit, epsilon = 1e-9);
    }
}
