//! Preset scenarios.
//!
//! - `canada`: the British Columbia IREN Cloud sites
//! - `canada-h14`: Canada plus Horizon 1-4
//! - `2027-h110-colo`: all Horizons with Sweetwater 1 as colocation
//! - `2027-h110-hyperscaler`: all Horizons with the SW1 hyperscaler lease
//! - `2026-h18-sw1`: Horizons 1-8 with the SW1 hyperscaler lease

use super::Scenario;
use crate::reference::site_ids::*;
use valuation_core::types::{ScenarioId, SiteId};

/// Scenario selected in a fresh portfolio.
pub const DEFAULT_SCENARIO: &str = "2026-h18-sw1";

const CANADA_SHARES: f64 = 352.7;
const CURRENT_SHARES: f64 = 409.126;

fn scenario(
    id: &str,
    name: &str,
    site_ids: &[&str],
    pe_ratio: f64,
    dilution_percentage: f64,
    current_shares: f64,
) -> Scenario {
    Scenario {
        id: ScenarioId::new(id),
        name: name.to_string(),
        site_ids: site_ids.iter().map(|s| SiteId::new(*s)).collect(),
        pe_ratio,
        dilution_percentage,
        current_shares,
    }
}

/// All preset scenarios in display order.
pub fn presets() -> Vec<Scenario> {
    vec![
        scenario(
            "canada",
            "Canada",
            &[PRINCE_GEORGE, MACKENZIE],
            50.0,
            0.0,
            CANADA_SHARES,
        ),
        scenario(
            "canada-h14",
            "Canada + Horizon 1-4",
            &[PRINCE_GEORGE, MACKENZIE, HORIZON_1_4],
            50.0,
            0.0,
            CANADA_SHARES,
        ),
        scenario(
            "2027-h110-colo",
            "2027: Horizon 1-10 + Sweetwater Colocation",
            &[
                PRINCE_GEORGE,
                MACKENZIE,
                HORIZON_1_4,
                HORIZON_5_8,
                HORIZON_9_10,
                SWEETWATER_1,
            ],
            30.0,
            15.0,
            CURRENT_SHARES,
        ),
        scenario(
            "2027-h110-hyperscaler",
            "2027: Horizon 1-10 + SW1 Hyperscaler",
            &[
                PRINCE_GEORGE,
                MACKENZIE,
                HORIZON_1_4,
                HORIZON_5_8,
                HORIZON_9_10,
                SW1_HYPERSCALER,
            ],
            30.0,
            60.0,
            CURRENT_SHARES,
        ),
        scenario(
            DEFAULT_SCENARIO,
            "2026: Horizon 1-8 + SW1 Hyperscaler",
            &[
                PRINCE_GEORGE,
                MACKENZIE,
                HORIZON_1_4,
                HORIZON_5_8,
                SW1_HYPERSCALER,
            ],
            40.0,
            15.0,
            CURRENT_SHARES,
        ),
    ]
}

/// Looks up a preset by ID.
pub fn preset(id: &str) -> Option<Scenario> {
    presets().into_iter().find(|s| s.id.as_str() == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_five_presets_with_default() {
        let all = presets();
        assert_eq!(all.len(), 5);
        assert!(preset(DEFAULT_SCENARIO).is_some());
        assert!(preset("missing").is_none());
    }

    #[test]
    fn test_default_scenario_sites() {
        let default = preset(DEFAULT_SCENARIO).expect("default preset");
        assert_eq!(default.site_ids.len(), 5);
        assert!(default.includes(&SiteId::new(SW1_HYPERSCALER)));
        assert!(!default.includes(&SiteId::new(SWEETWATER_1)));
        assert_eq!(default.pe_ratio, 40.0);
        assert_eq!(default.dilution_percentage, 15.0);
    }

    #[test]
    fn test_canada_share_assumptions() {
        let canada = preset("canada").expect("canada preset");
        let shares = canada.share_params();
        assert_eq!(shares.pe_ratio, 50.0);
        assert_eq!(shares.fully_diluted_shares(), 352.7);
    }

    #[test]
    fn test_hyperscaler_2027_dilution() {
        let scenario =
            preset("2027-h110-hyperscaler").expect("2027 preset");
        assert_eq!(scenario.dilution_percentage, 60.0);
        assert_eq!(scenario.site_ids.len(), 6);
    }
}
