//! JSON configuration snapshots.
//!
//! A snapshot is the persisted form of a [`PortfolioState`]:
//!
//! ```json
//! {
//!   "gpuPrices": {"b200": 45952.38},
//!   "gpuHourlyRates": {"b200": 2.33},
//!   "shareParams": {"currentShares": 409.126, "dilutionPercentage": 15, "peRatio": 40},
//!   "sites": [{"id": "...", "name": "...", "type": "IREN Cloud", "enabled": true, "data": {}}],
//!   "selectedScenario": "2026-h18-sw1",
//!   "customScenarios": []
//! }
//! ```
//!
//! Number fields are read leniently; a blank field is coerced when the site
//! is evaluated. `corporateParams` is optional and defaults when absent.

use crate::aggregator::{CorporateParams, ShareParams};
use crate::error::PortfolioError;
use crate::scenarios::{find_scenario, Scenario};
use crate::state::PortfolioState;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use valuation_core::market_data::{GpuMarket, GpuTable};
use valuation_core::types::ScenarioId;
use valuation_models::Site;

/// Errors raised reading or writing a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// File could not be read or written.
    #[error("Snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The document is not a valid snapshot.
    #[error("Invalid snapshot: {0}")]
    Parse(#[from] serde_json::Error),

    /// The snapshot could not be serialised.
    #[error("Failed to serialise snapshot: {0}")]
    Serialise(#[source] serde_json::Error),

    /// `selectedScenario` names neither a preset nor a custom scenario.
    #[error("Unknown scenario in snapshot: {0}")]
    UnknownScenario(String),

    /// The sites do not form a valid portfolio.
    #[error(transparent)]
    Portfolio(#[from] PortfolioError),
}

/// Persisted portfolio configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigSnapshot {
    /// GPU unit prices ($).
    #[serde(default = "GpuTable::default_prices")]
    pub gpu_prices: GpuTable,
    /// GPU hourly rates ($/hr).
    #[serde(default = "GpuTable::default_hourly_rates")]
    pub gpu_hourly_rates: GpuTable,
    /// Share-count and multiple inputs.
    #[serde(default)]
    pub share_params: ShareParams,
    /// Sites in display order.
    #[serde(default)]
    pub sites: Vec<Site>,
    /// Selected scenario ID.
    #[serde(default)]
    pub selected_scenario: Option<ScenarioId>,
    /// User-saved scenarios.
    #[serde(default)]
    pub custom_scenarios: Vec<Scenario>,
    /// Corporate cost and tax inputs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corporate_params: Option<CorporateParams>,
}

impl ConfigSnapshot {
    /// Parses a snapshot document.
    ///
    /// # Errors
    ///
    /// Returns `Parse` if the JSON is malformed or a site record is invalid.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Renders the snapshot as indented JSON.
    ///
    /// # Errors
    ///
    /// Returns `Serialise` on serialisation failure.
    pub fn to_json_pretty(&self) -> Result<String, SnapshotError> {
        serde_json::to_string_pretty(self).map_err(SnapshotError::Serialise)
    }

    /// Reads a snapshot file.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be read, or `Parse` if it is invalid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let snapshot = Self::from_json(&json)?;
        tracing::debug!(path = %path.display(), sites = snapshot.sites.len(), "snapshot loaded");
        Ok(snapshot)
    }

    /// Writes the snapshot to a file.
    ///
    /// # Errors
    ///
    /// Returns `Serialise` or `Io` on failure.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
        let path = path.as_ref();
        fs::write(path, self.to_json_pretty()?)?;
        tracing::debug!(path = %path.display(), "snapshot saved");
        Ok(())
    }

    /// Builds the portfolio state described by the snapshot.
    ///
    /// Default GPU types missing from the tables are restored. The share
    /// parameters are taken as stored, not from the selected scenario.
    ///
    /// # Errors
    ///
    /// - `Portfolio` if two sites share an ID
    /// - `UnknownScenario` if the selected scenario does not exist
    pub fn into_state(self) -> Result<PortfolioState, SnapshotError> {
        if let Some(id) = &self.selected_scenario {
            if find_scenario(&self.custom_scenarios, id).is_none() {
                return Err(SnapshotError::UnknownScenario(id.to_string()));
            }
        }
        let market = GpuMarket::new(self.gpu_prices, self.gpu_hourly_rates);
        let state = PortfolioState::new(market, self.sites)?;
        Ok(state.with_parts(
            self.share_params,
            self.corporate_params.unwrap_or_default(),
            self.selected_scenario,
            self.custom_scenarios,
        ))
    }
}

impl From<&PortfolioState> for ConfigSnapshot {
    fn from(state: &PortfolioState) -> Self {
        Self {
            gpu_prices: state.market().prices.clone(),
            gpu_hourly_rates: state.market().hourly_rates.clone(),
            share_params: state.share_params().clone(),
            sites: state.sites().to_vec(),
            selected_scenario: state.selected_scenario().cloned(),
            custom_scenarios: state.custom_scenarios().to_vec(),
            corporate_params: Some(state.corporate_params().clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use valuation_core::types::SiteId;
    use valuation_models::{SiteParameters, SiteType};

    const LEGACY: &str = r#"{
        "gpuPrices": {"b200": 50000},
        "shareParams": {"currentShares": "352.7", "dilutionPercentage": "", "peRatio": 50},
        "sites": [
            {
                "id": "sweetwater-1",
                "name": "Sweetwater 1",
                "type": "Colocation",
                "enabled": true,
                "data": {"totalLoadValue": 1400, "totalLoadUnit": "MW", "pue": 1.5,
                         "revenuePerMW": 1.83, "dcCostPerMW": 15, "dcLifetime": 20}
            },
            {
                "id": "horizon-1-4",
                "name": "Horizon 1-4",
                "type": "Hyperscaler Tenant",
                "data": {"toplineRevenue": 9700}
            }
        ],
        "selectedScenario": null,
        "customScenarios": []
    }"#;

    #[test]
    fn test_legacy_document_parses() {
        let snapshot = ConfigSnapshot::from_json(LEGACY).expect("parse");
        assert_eq!(snapshot.sites.len(), 2);
        assert_eq!(snapshot.sites[1].site_type(), SiteType::HyperscalerIaas);
        assert!(snapshot.sites[1].enabled);
        assert_eq!(snapshot.share_params.current_shares, 352.7);
        assert!(snapshot.share_params.dilution_percentage.is_nan());
        assert!(snapshot.corporate_params.is_none());

        let SiteParameters::Colocation(colo) = &snapshot.sites[0].params else {
            panic!("colocation expected");
        };
        assert_eq!(colo.load.size_value, 1400.0);
    }

    #[test]
    fn test_into_state_restores_default_gpu_types() {
        let state = ConfigSnapshot::from_json(LEGACY)
            .and_then(ConfigSnapshot::into_state)
            .expect("state");
        assert_eq!(state.market().prices.price("b200"), 50_000.0);
        assert!(state.market().prices.contains("gb300"));
        assert_eq!(state.corporate_params(), &CorporateParams::default());
    }

    #[test]
    fn test_unknown_scenario_rejected() {
        let mut snapshot = ConfigSnapshot::from_json(LEGACY).expect("parse");
        snapshot.selected_scenario = Some(ScenarioId::new("2031-moon"));
        assert!(matches!(
            snapshot.into_state(),
            Err(SnapshotError::UnknownScenario(id)) if id == "2031-moon"
        ));
    }

    #[test]
    fn test_duplicate_site_rejected() {
        let mut snapshot = ConfigSnapshot::from_json(LEGACY).expect("parse");
        snapshot.sites[1].id = SiteId::new("sweetwater-1");
        assert!(matches!(
            snapshot.into_state(),
            Err(SnapshotError::Portfolio(PortfolioError::DuplicateSite(_)))
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            ConfigSnapshot::from_json("{\"sites\": 3}"),
            Err(SnapshotError::Parse(_))
        ));
    }
}
