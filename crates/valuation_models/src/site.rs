//! Site records.
//!
//! A [`Site`] couples an identity and an enabled flag with a closed set of
//! parameter variants, one per commercial site type. The variant is fixed
//! when the site is created; type-specific defaults are supplied only then.

use crate::calculators::{ColocationParams, HyperscalerParams, IrenCloudParams, SiteCalculator};
use crate::load::LoadInput;
use crate::result::SiteResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use valuation_core::market_data::GpuMarket;
use valuation_core::types::SiteId;

/// Commercial type of a site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SiteType {
    /// Leased power capacity.
    #[serde(rename = "Colocation")]
    Colocation,
    /// Hyperscaler GPU capacity contract.
    #[serde(rename = "Hyperscaler IaaS")]
    HyperscalerIaas,
    /// Self-operated GPU cloud.
    #[serde(rename = "IREN Cloud")]
    IrenCloud,
}

impl SiteType {
    /// All site types in display order.
    pub const ALL: [SiteType; 3] = [
        SiteType::Colocation,
        SiteType::HyperscalerIaas,
        SiteType::IrenCloud,
    ];

    /// Display and snapshot name.
    pub fn name(&self) -> &'static str {
        match self {
            SiteType::Colocation => "Colocation",
            SiteType::HyperscalerIaas => "Hyperscaler IaaS",
            SiteType::IrenCloud => "IREN Cloud",
        }
    }
}

impl fmt::Display for SiteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parameter record of a site, tagged by site type.
///
/// Serialised as `{"type": "<site type name>", "data": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum SiteParameters {
    /// Colocation parameters.
    #[serde(rename = "Colocation")]
    Colocation(ColocationParams),
    /// Hyperscaler IaaS parameters.
    #[serde(rename = "Hyperscaler IaaS", alias = "Hyperscaler Tenant")]
    Hyperscaler(HyperscalerParams),
    /// IREN Cloud parameters.
    #[serde(rename = "IREN Cloud")]
    IrenCloud(IrenCloudParams),
}

impl SiteParameters {
    /// Creation defaults for a site type.
    pub fn default_for(site_type: SiteType) -> Self {
        match site_type {
            SiteType::Colocation => SiteParameters::Colocation(ColocationParams::default()),
            SiteType::HyperscalerIaas => SiteParameters::Hyperscaler(HyperscalerParams::default()),
            SiteType::IrenCloud => SiteParameters::IrenCloud(IrenCloudParams::default()),
        }
    }

    /// The variant's site type.
    pub fn site_type(&self) -> SiteType {
        match self {
            SiteParameters::Colocation(_) => SiteType::Colocation,
            SiteParameters::Hyperscaler(_) => SiteType::HyperscalerIaas,
            SiteParameters::IrenCloud(_) => SiteType::IrenCloud,
        }
    }

    /// The load input shared by every variant.
    pub fn load(&self) -> &LoadInput {
        match self {
            SiteParameters::Colocation(params) => &params.load,
            SiteParameters::Hyperscaler(params) => &params.load,
            SiteParameters::IrenCloud(params) => &params.load,
        }
    }
}

impl SiteCalculator for SiteParameters {
    fn evaluate(&self, market: &GpuMarket) -> SiteResult {
        match self {
            SiteParameters::Colocation(params) => params.evaluate(market),
            SiteParameters::Hyperscaler(params) => params.evaluate(market),
            SiteParameters::IrenCloud(params) => params.evaluate(market),
        }
    }
}

fn enabled_by_default() -> bool {
    true
}

/// A site in the portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    /// Unique identifier.
    pub id: SiteId,
    /// Display name.
    pub name: String,
    /// Disabled sites contribute nothing but keep their parameters.
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    /// Type-tagged parameters.
    #[serde(flatten)]
    pub params: SiteParameters,
}

impl Site {
    /// Creates an enabled site.
    pub fn new(id: impl Into<SiteId>, name: impl Into<String>, params: SiteParameters) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            enabled: true,
            params,
        }
    }

    /// Creates an enabled site with the type's creation defaults.
    pub fn with_defaults(
        id: impl Into<SiteId>,
        name: impl Into<String>,
        site_type: SiteType,
    ) -> Self {
        Self::new(id, name, SiteParameters::default_for(site_type))
    }

    /// Builder-style enabled flag.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Site type, fixed at creation.
    pub fn site_type(&self) -> SiteType {
        self.params.site_type()
    }

    /// Evaluates the site. Disabled sites yield the all-zero result
    /// whatever their parameters.
    pub fn evaluate(&self, market: &GpuMarket) -> SiteResult {
        if !self.enabled {
            tracing::trace!(site = %self.id, "site disabled, contributing zero");
            return SiteResult::zero();
        }
        let result = self.params.evaluate(market);
        tracing::trace!(
            site = %self.id,
            site_type = %self.site_type(),
            net_profit = result.net_profit,
            revenue = result.revenue,
            "site evaluated"
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_site_is_zero() {
        let site = Site::with_defaults("s1", "Sweetwater 2", SiteType::Colocation).enabled(false);
        let result = site.evaluate(&GpuMarket::default());
        assert_eq!(result, SiteResult::zero());
        assert!(result.steps.is_empty());
    }

    #[test]
    fn test_default_for_matches_type() {
        for site_type in SiteType::ALL {
            assert_eq!(SiteParameters::default_for(site_type).site_type(), site_type);
        }
    }

    #[test]
    fn test_site_json_shape() {
        let site = Site::with_defaults("pg", "Prince George", SiteType::IrenCloud);
        let json = serde_json::to_value(&site).unwrap();
        assert_eq!(json["id"], "pg");
        assert_eq!(json["type"], "IREN Cloud");
        assert_eq!(json["enabled"], true);
        assert_eq!(json["data"]["toplineRevenue"], 500.0);
        assert_eq!(json["data"]["dcType"], "retrofit");
    }

    #[test]
    fn test_site_from_snapshot_json() {
        let json = r#"{
            "id": "sweetwater-2",
            "name": "Sweetwater 2",
            "type": "Colocation",
            "enabled": false,
            "accordionOpen": true,
            "data": {"totalLoadValue": 600, "totalLoadUnit": "MW", "pue": 1.5,
                     "revenuePerMW": 1.83, "dcCostPerMW": 15, "dcLifetime": 20}
        }"#;
        let site: Site = serde_json::from_str(json).unwrap();
        assert_eq!(site.site_type(), SiteType::Colocation);
        assert!(!site.enabled);
    }

    #[test]
    fn test_legacy_hyperscaler_type_name() {
        let json = r#"{"id": "h", "name": "H", "type": "Hyperscaler Tenant", "data": {}}"#;
        let site: Site = serde_json::from_str(json).unwrap();
        assert_eq!(site.site_type(), SiteType::HyperscalerIaas);
        assert!(site.enabled);
    }

    #[test]
    fn test_site_type_display() {
        assert_eq!(SiteType::HyperscalerIaas.to_string(), "Hyperscaler IaaS");
    }
}
