//! Scenario selection.
//!
//! A scenario names the subset of sites that are active together and the
//! share assumptions that go with them. Five presets ship with the engine;
//! custom scenarios are saved on the portfolio state.

mod presets;

pub use presets::{preset, presets, DEFAULT_SCENARIO};

use crate::aggregator::ShareParams;
use serde::{Deserialize, Serialize};
use valuation_core::types::input::lenient_f64;
use valuation_core::types::{ScenarioId, SiteId};

/// A named selection of sites with share assumptions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    /// Scenario identifier.
    pub id: ScenarioId,
    /// Display name.
    pub name: String,
    /// Sites active under this scenario.
    #[serde(default)]
    pub site_ids: Vec<SiteId>,
    /// Price/earnings multiple.
    #[serde(deserialize_with = "lenient_f64")]
    pub pe_ratio: f64,
    /// Expected dilution (%).
    #[serde(deserialize_with = "lenient_f64")]
    pub dilution_percentage: f64,
    /// Current share count (millions).
    #[serde(deserialize_with = "lenient_f64")]
    pub current_shares: f64,
}

impl Scenario {
    /// Whether `site` is part of this scenario.
    pub fn includes(&self, site: &SiteId) -> bool {
        self.site_ids.contains(site)
    }

    /// Share parameters implied by the scenario (diluted current shares).
    pub fn share_params(&self) -> ShareParams {
        ShareParams {
            use_direct_shares: false,
            direct_shares: 0.0,
            current_shares: self.current_shares,
            dilution_percentage: self.dilution_percentage,
            pe_ratio: self.pe_ratio,
        }
    }
}

/// Finds a scenario by ID, custom scenarios first, then presets.
pub fn find_scenario(custom: &[Scenario], id: &ScenarioId) -> Option<Scenario> {
    custom
        .iter()
        .find(|s| &s.id == id)
        .cloned()
        .or_else(|| preset(id.as_str()))
}
