//! Immutable portfolio state.
//!
//! [`PortfolioState`] holds everything a valuation depends on. Each update
//! consumes nothing and returns a fresh state, so a caller can keep the
//! previous value for undo or comparison. Derivations enabled on a site
//! (auto revenue, GPU autoscale) are re-applied by the update that affects
//! them, never later.

use crate::aggregator::{CorporateParams, ShareParams};
use crate::error::PortfolioError;
use crate::reference::reference_sites;
use crate::scenarios::{find_scenario, Scenario, DEFAULT_SCENARIO};
use valuation_core::market_data::GpuMarket;
use valuation_core::types::{ScenarioId, SiteId};
use valuation_models::{derivations, Site, SiteParameters, SiteResult};

/// The complete valuation input.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioState {
    market: GpuMarket,
    sites: Vec<Site>,
    share_params: ShareParams,
    corporate: CorporateParams,
    selected_scenario: Option<ScenarioId>,
    custom_scenarios: Vec<Scenario>,
}

impl Default for PortfolioState {
    /// The reference portfolio under the default scenario.
    fn default() -> Self {
        Self::reference()
    }
}

impl PortfolioState {
    /// Creates a state with no scenario selected and default share and
    /// corporate parameters.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateSite` if two sites share an ID.
    pub fn new(market: GpuMarket, sites: Vec<Site>) -> Result<Self, PortfolioError> {
        for (index, site) in sites.iter().enumerate() {
            if sites[..index].iter().any(|other| other.id == site.id) {
                return Err(PortfolioError::DuplicateSite(site.id.to_string()));
            }
        }
        Ok(Self {
            market,
            sites,
            share_params: ShareParams::default(),
            corporate: CorporateParams::default(),
            selected_scenario: None,
            custom_scenarios: Vec::new(),
        })
    }

    /// The reference portfolio with the default scenario selected.
    pub fn reference() -> Self {
        let sites = reference_sites();
        let scenario = find_scenario(&[], &ScenarioId::new(DEFAULT_SCENARIO));
        Self {
            market: GpuMarket::default(),
            sites,
            share_params: scenario
                .as_ref()
                .map(Scenario::share_params)
                .unwrap_or_default(),
            corporate: CorporateParams::default(),
            selected_scenario: scenario.map(|s| s.id),
            custom_scenarios: Vec::new(),
        }
    }

    /// GPU price and hourly-rate tables.
    pub fn market(&self) -> &GpuMarket {
        &self.market
    }

    /// All sites in display order.
    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    /// Looks up a site.
    pub fn site(&self, id: &SiteId) -> Option<&Site> {
        self.sites.iter().find(|s| &s.id == id)
    }

    /// Share parameters.
    pub fn share_params(&self) -> &ShareParams {
        &self.share_params
    }

    /// Corporate cost and tax parameters.
    pub fn corporate_params(&self) -> &CorporateParams {
        &self.corporate
    }

    /// ID of the selected scenario, if any.
    pub fn selected_scenario(&self) -> Option<&ScenarioId> {
        self.selected_scenario.as_ref()
    }

    /// User-saved scenarios.
    pub fn custom_scenarios(&self) -> &[Scenario] {
        &self.custom_scenarios
    }

    /// The selected scenario, resolved against custom scenarios then presets.
    pub fn scenario(&self) -> Option<Scenario> {
        self.selected_scenario
            .as_ref()
            .and_then(|id| find_scenario(&self.custom_scenarios, id))
    }

    /// Sites contributing to the valuation: enabled, and part of the selected
    /// scenario when one is selected.
    pub fn active_sites(&self) -> impl Iterator<Item = &Site> {
        let scenario = self.scenario();
        self.sites.iter().filter(move |site| {
            site.enabled
                && scenario
                    .as_ref()
                    .map_or(true, |scenario| scenario.includes(&site.id))
        })
    }

    /// Whether a site is active. See [`active_sites`](Self::active_sites).
    pub fn is_active(&self, id: &SiteId) -> bool {
        self.active_sites().any(|site| &site.id == id)
    }

    /// Evaluates one site regardless of scenario membership.
    ///
    /// # Errors
    ///
    /// Returns `SiteNotFound` for an unknown ID.
    pub fn evaluate_site(&self, id: &SiteId) -> Result<SiteResult, PortfolioError> {
        self.site(id)
            .map(|site| site.evaluate(&self.market))
            .ok_or_else(|| PortfolioError::SiteNotFound(id.to_string()))
    }

    /// Adds a site, applying its enabled derivations.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateSite` if the ID is taken.
    pub fn with_site_added(&self, mut site: Site) -> Result<Self, PortfolioError> {
        if self.site(&site.id).is_some() {
            return Err(PortfolioError::DuplicateSite(site.id.to_string()));
        }
        derivations::apply(&mut site.params, &self.market, None);
        tracing::debug!(site = %site.id, site_type = %site.site_type(), "site added");
        let mut next = self.clone();
        next.sites.push(site);
        Ok(next)
    }

    /// Removes a site.
    ///
    /// # Errors
    ///
    /// Returns `SiteNotFound` for an unknown ID.
    pub fn with_site_removed(&self, id: &SiteId) -> Result<Self, PortfolioError> {
        let index = self.index_of(id)?;
        let mut next = self.clone();
        next.sites.remove(index);
        tracing::debug!(site = %id, "site removed");
        Ok(next)
    }

    /// Flips a site's enabled flag.
    ///
    /// # Errors
    ///
    /// Returns `SiteNotFound` for an unknown ID.
    pub fn with_site_toggled(&self, id: &SiteId) -> Result<Self, PortfolioError> {
        let index = self.index_of(id)?;
        let mut next = self.clone();
        let site = &mut next.sites[index];
        site.enabled = !site.enabled;
        tracing::debug!(site = %id, enabled = site.enabled, "site toggled");
        Ok(next)
    }

    /// Renames a site.
    ///
    /// # Errors
    ///
    /// Returns `SiteNotFound` for an unknown ID.
    pub fn with_site_renamed(
        &self,
        id: &SiteId,
        name: impl Into<String>,
    ) -> Result<Self, PortfolioError> {
        let index = self.index_of(id)?;
        let mut next = self.clone();
        next.sites[index].name = name.into();
        Ok(next)
    }

    /// Replaces a site's parameters, then re-applies its derivations. GPU
    /// counts are rescaled only when the IT load changed.
    ///
    /// # Errors
    ///
    /// - `SiteNotFound` for an unknown ID
    /// - `SiteTypeMismatch` if `params` belong to another site type
    pub fn with_site_updated(
        &self,
        id: &SiteId,
        mut params: SiteParameters,
    ) -> Result<Self, PortfolioError> {
        let index = self.index_of(id)?;
        let current = &self.sites[index];
        if current.site_type() != params.site_type() {
            return Err(PortfolioError::SiteTypeMismatch {
                id: id.to_string(),
                expected: current.site_type(),
                actual: params.site_type(),
            });
        }

        let previous_it_load = current.params.load().it_load_mw();
        let changed_load =
            (params.load().it_load_mw() != previous_it_load).then_some(previous_it_load);
        derivations::apply(&mut params, &self.market, changed_load);

        let mut next = self.clone();
        next.sites[index].params = params;
        tracing::debug!(site = %id, "site updated");
        Ok(next)
    }

    /// Adds a user-defined GPU type to both market tables.
    ///
    /// # Errors
    ///
    /// Returns `Market` if the key is invalid or already present.
    pub fn with_gpu_type_added(
        &self,
        key: &str,
        price: f64,
        hourly_rate: f64,
    ) -> Result<Self, PortfolioError> {
        let mut next = self.clone();
        next.market.add_gpu_type(key, price, hourly_rate)?;
        tracing::debug!(gpu_type = key, "GPU type added");
        Ok(next.rederived())
    }

    /// Removes a user-defined GPU type from both tables and from every IREN
    /// Cloud fleet.
    ///
    /// # Errors
    ///
    /// Returns `Market` for a default or unknown type.
    pub fn with_gpu_type_removed(&self, key: &str) -> Result<Self, PortfolioError> {
        let mut next = self.clone();
        next.market.remove_gpu_type(key)?;
        for site in &mut next.sites {
            if let SiteParameters::IrenCloud(params) = &mut site.params {
                params.gpus.remove(key);
            }
        }
        tracing::debug!(gpu_type = key, "GPU type removed");
        Ok(next.rederived())
    }

    /// Sets a GPU unit price.
    ///
    /// # Errors
    ///
    /// Returns `Market` for an unknown type.
    pub fn with_gpu_price(&self, key: &str, price: f64) -> Result<Self, PortfolioError> {
        let mut next = self.clone();
        next.market.set_price(key, price)?;
        Ok(next)
    }

    /// Sets a GPU hourly rate and refreshes auto-calculated revenue.
    ///
    /// # Errors
    ///
    /// Returns `Market` for an unknown type.
    pub fn with_gpu_hourly_rate(&self, key: &str, rate: f64) -> Result<Self, PortfolioError> {
        let mut next = self.clone();
        next.market.set_hourly_rate(key, rate)?;
        Ok(next.rederived())
    }

    /// Replaces the share parameters.
    pub fn with_share_params(&self, share_params: ShareParams) -> Self {
        let mut next = self.clone();
        next.share_params = share_params;
        next
    }

    /// Replaces the corporate parameters.
    pub fn with_corporate_params(&self, corporate: CorporateParams) -> Self {
        let mut next = self.clone();
        next.corporate = corporate;
        next
    }

    /// Selects a scenario and adopts its share assumptions. `None` clears the
    /// selection, activating every enabled site; share parameters are kept.
    ///
    /// # Errors
    ///
    /// Returns `ScenarioNotFound` if the ID is neither custom nor a preset.
    pub fn with_scenario_selected(&self, id: Option<ScenarioId>) -> Result<Self, PortfolioError> {
        let mut next = self.clone();
        match id {
            None => next.selected_scenario = None,
            Some(id) => {
                let scenario = find_scenario(&self.custom_scenarios, &id)
                    .ok_or_else(|| PortfolioError::ScenarioNotFound(id.to_string()))?;
                next.share_params = scenario.share_params();
                next.selected_scenario = Some(scenario.id);
            }
        }
        tracing::debug!(scenario = ?next.selected_scenario, "scenario selected");
        Ok(next)
    }

    /// Saves a custom scenario, replacing one with the same ID. A custom
    /// scenario shadows a preset of the same ID.
    pub fn with_custom_scenario_saved(&self, scenario: Scenario) -> Self {
        let mut next = self.clone();
        match next.custom_scenarios.iter_mut().find(|s| s.id == scenario.id) {
            Some(existing) => *existing = scenario,
            None => next.custom_scenarios.push(scenario),
        }
        next
    }

    pub(crate) fn with_parts(
        mut self,
        share_params: ShareParams,
        corporate: CorporateParams,
        selected_scenario: Option<ScenarioId>,
        custom_scenarios: Vec<Scenario>,
    ) -> Self {
        self.share_params = share_params;
        self.corporate = corporate;
        self.selected_scenario = selected_scenario;
        self.custom_scenarios = custom_scenarios;
        self
    }

    fn index_of(&self, id: &SiteId) -> Result<usize, PortfolioError> {
        self.sites
            .iter()
            .position(|s| &s.id == id)
            .ok_or_else(|| PortfolioError::SiteNotFound(id.to_string()))
    }

    fn rederived(mut self) -> Self {
        for site in &mut self.sites {
            derivations::apply(&mut site.params, &self.market, None);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::site_ids;
    use valuation_core::market_data::keys;
    use valuation_core::types::ValuationError;
    use valuation_core::units::PowerUnit;
    use valuation_models::{ColocationParams, IrenCloudParams, LoadInput, SiteType};

    fn id(s: &str) -> SiteId {
        SiteId::new(s)
    }

    fn cloud_site(params: IrenCloudParams) -> Site {
        Site::new("cloud", "Cloud", SiteParameters::IrenCloud(params))
    }

    #[test]
    fn test_reference_state_selects_default_scenario() {
        let state = PortfolioState::reference();
        assert_eq!(
            state.selected_scenario().map(|s| s.as_str()),
            Some(DEFAULT_SCENARIO)
        );
        assert_eq!(state.active_sites().count(), 5);
        assert!(!state.is_active(&id(site_ids::SWEETWATER_1)));
    }

    #[test]
    fn test_no_scenario_activates_all_enabled() {
        let state = PortfolioState::reference()
            .with_scenario_selected(None)
            .expect("clear scenario");
        // every site but Sweetwater 2
        assert_eq!(state.active_sites().count(), state.sites().len() - 1);
    }

    #[test]
    fn test_updates_leave_original_untouched() {
        let original = PortfolioState::reference();
        let toggled = original
            .with_site_toggled(&id(site_ids::HORIZON_1_4))
            .expect("toggle");
        assert!(original.is_active(&id(site_ids::HORIZON_1_4)));
        assert!(!toggled.is_active(&id(site_ids::HORIZON_1_4)));
    }

    #[test]
    fn test_duplicate_and_missing_sites() {
        let state = PortfolioState::reference();
        let duplicate = Site::with_defaults(site_ids::HORIZON_1_4, "Again", SiteType::Colocation);
        assert_eq!(
            state.with_site_added(duplicate),
            Err(PortfolioError::DuplicateSite(site_ids::HORIZON_1_4.to_string()))
        );
        assert!(matches!(
            state.with_site_removed(&id("nowhere")),
            Err(PortfolioError::SiteNotFound(_))
        ));
    }

    #[test]
    fn test_new_rejects_duplicate_ids() {
        let site = Site::with_defaults("a", "A", SiteType::Colocation);
        let result = PortfolioState::new(GpuMarket::default(), vec![site.clone(), site]);
        assert_eq!(result, Err(PortfolioError::DuplicateSite("a".to_string())));
    }

    #[test]
    fn test_site_type_is_fixed() {
        let state = PortfolioState::reference();
        let err = state
            .with_site_updated(
                &id(site_ids::SWEETWATER_1),
                SiteParameters::IrenCloud(IrenCloudParams::default()),
            )
            .expect_err("type change must fail");
        assert_eq!(
            err,
            PortfolioError::SiteTypeMismatch {
                id: site_ids::SWEETWATER_1.to_string(),
                expected: SiteType::Colocation,
                actual: SiteType::IrenCloud,
            }
        );
    }

    #[test]
    fn test_autoscale_follows_load_change() {
        let params = IrenCloudParams {
            load: LoadInput::direct(100.0, PowerUnit::MW),
            gpus: [(keys::B200.to_string(), 1000.0)].into_iter().collect(),
            autoscale_gpus: true,
            auto_calculate_revenue: true,
            ..IrenCloudParams::default()
        };
        let state = PortfolioState::new(GpuMarket::default(), Vec::new())
            .and_then(|s| s.with_site_added(cloud_site(params.clone())))
            .expect("add site");

        let mut bigger = params;
        bigger.load = LoadInput::direct(150.0, PowerUnit::MW);
        let state = state
            .with_site_updated(&id("cloud"), SiteParameters::IrenCloud(bigger))
            .expect("update");

        let Some(SiteParameters::IrenCloud(p)) = state.site(&id("cloud")).map(|s| &s.params) else {
            panic!("IREN Cloud site expected");
        };
        assert_eq!(p.gpus[keys::B200], 1500.0);
        assert!(p.topline_revenue > 0.0);
    }

    #[test]
    fn test_hourly_rate_refreshes_auto_revenue() {
        let params = IrenCloudParams {
            gpus: [(keys::B200.to_string(), 1000.0)].into_iter().collect(),
            auto_calculate_revenue: true,
            ..IrenCloudParams::default()
        };
        let state = PortfolioState::new(GpuMarket::default(), Vec::new())
            .and_then(|s| s.with_site_added(cloud_site(params)))
            .and_then(|s| s.with_gpu_hourly_rate(keys::B200, 2.0))
            .expect("state");
        let Some(SiteParameters::IrenCloud(p)) = state.site(&id("cloud")).map(|s| &s.params) else {
            panic!("IREN Cloud site expected");
        };
        assert_eq!(p.topline_revenue, 17.52);
    }

    #[test]
    fn test_gpu_type_lifecycle() {
        let state = PortfolioState::reference()
            .with_gpu_type_added("h200", 30_000.0, 2.5)
            .expect("add");
        assert_eq!(state.market().prices.price("h200"), 30_000.0);
        let state = state.with_gpu_type_removed("h200").expect("remove");
        assert!(!state.market().prices.contains("h200"));
        assert_eq!(
            state.with_gpu_type_removed(keys::B200),
            Err(PortfolioError::Market(ValuationError::ProtectedGpuType(
                keys::B200.to_string()
            )))
        );
    }

    #[test]
    fn test_scenario_selection_adopts_shares() {
        let state = PortfolioState::reference()
            .with_scenario_selected(Some(ScenarioId::new("canada")))
            .expect("select");
        assert_eq!(state.share_params().pe_ratio, 50.0);
        assert_eq!(state.active_sites().count(), 2);
        assert!(matches!(
            state.with_scenario_selected(Some(ScenarioId::new("mars"))),
            Err(PortfolioError::ScenarioNotFound(_))
        ));
    }

    #[test]
    fn test_custom_scenario_saved_and_selected() {
        let custom = Scenario {
            id: ScenarioId::new("sweetwater-only"),
            name: "Sweetwater only".to_string(),
            site_ids: vec![id(site_ids::SWEETWATER_1)],
            pe_ratio: 25.0,
            dilution_percentage: 0.0,
            current_shares: 300.0,
        };
        let state = PortfolioState::reference()
            .with_custom_scenario_saved(custom.clone())
            .with_custom_scenario_saved(Scenario {
                pe_ratio: 20.0,
                ..custom
            })
            .with_scenario_selected(Some(ScenarioId::new("sweetwater-only")))
            .expect("select custom");
        assert_eq!(state.custom_scenarios().len(), 1);
        assert_eq!(state.share_params().pe_ratio, 20.0);
        let active: Vec<_> = state.active_sites().map(|s| s.id.as_str()).collect();
        assert_eq!(active, vec![site_ids::SWEETWATER_1]);
    }

    #[test]
    fn test_rename_keeps_parameters() {
        let state = PortfolioState::reference();
        let renamed = state
            .with_site_renamed(&id(site_ids::SWEETWATER_1), "SW1 Colo")
            .expect("rename");
        let before = state.site(&id(site_ids::SWEETWATER_1)).expect("site");
        let after = renamed.site(&id(site_ids::SWEETWATER_1)).expect("site");
        assert_eq!(after.name, "SW1 Colo");
        assert_eq!(after.params, before.params);
    }

    #[test]
    fn test_evaluate_site_ignores_scenario() {
        let state = PortfolioState::reference();
        let result = state
            .evaluate_site(&id(site_ids::SWEETWATER_1))
            .expect("site exists");
        assert!(result.revenue > 0.0);

        let added = state
            .with_site_added(Site::new(
                "colo",
                "Colo",
                SiteParameters::Colocation(ColocationParams::default()),
            ))
            .expect("add");
        assert!(!added.is_active(&id("colo")));
    }
}
