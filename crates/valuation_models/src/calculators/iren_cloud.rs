//! IREN Cloud: GPUs owned and operated by IREN, sold as cloud capacity.
//!
//! Revenue and EBITDA are annual. The GPU fleet is bought with debt (no
//! prepayment), depreciated over its useful life and replaced four times in
//! the 20-year horizon. The data centre is either a retrofit of an existing
//! site or a new build priced per cooling tier.

use super::{
    payback_years, record_schedule, SiteCalculator, CASHFLOW_HORIZON_YEARS, REPLACEMENT_CYCLES,
};
use crate::load::LoadInput;
use crate::result::SiteResult;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use valuation_core::format::{fixed, plain};
use valuation_core::market_data::{keys, GpuMarket};
use valuation_core::math::amortisation::yearly_schedule;
use valuation_core::trace::{CalcTrace, POSITIVE_CASHFLOW_HEADING};
use valuation_core::types::input::{
    blank, deserialize_tag, lenient_counts, lenient_f64, whole_years, Coerce, LenientTag,
};

/// Default depreciation life of a retrofitted data centre (years).
const RETROFIT_DC_LIFETIME: f64 = 20.0;

/// Data centre build type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DcType {
    /// Existing facility converted for GPUs.
    Retrofit,
    /// Purpose-built facility.
    #[default]
    New,
}

impl LenientTag for DcType {
    fn from_tag(tag: &str) -> Self {
        if tag.trim().eq_ignore_ascii_case("retrofit") {
            DcType::Retrofit
        } else {
            DcType::New
        }
    }
}

impl<'de> Deserialize<'de> for DcType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_tag(deserializer)
    }
}

/// Cooling tier of a new-build data centre.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum CoolingTier {
    /// Tier 3, liquid cooled.
    #[default]
    #[serde(rename = "t3-liquid")]
    T3Liquid,
    /// Tier 2, liquid cooled.
    #[serde(rename = "t2-liquid")]
    T2Liquid,
    /// Tier 2, air cooled.
    #[serde(rename = "t2-air")]
    T2Air,
}

impl CoolingTier {
    /// Suggested build cost for the tier ($M per MW).
    pub fn suggested_dc_cost_per_mw(&self) -> f64 {
        match self {
            CoolingTier::T3Liquid => 15.0,
            CoolingTier::T2Liquid => 8.0,
            CoolingTier::T2Air => 2.0,
        }
    }

    /// Tag used in snapshots.
    pub fn tag(&self) -> &'static str {
        match self {
            CoolingTier::T3Liquid => "t3-liquid",
            CoolingTier::T2Liquid => "t2-liquid",
            CoolingTier::T2Air => "t2-air",
        }
    }
}

impl LenientTag for CoolingTier {
    fn from_tag(tag: &str) -> Self {
        match tag.trim() {
            "t2-liquid" => CoolingTier::T2Liquid,
            "t2-air" => CoolingTier::T2Air,
            _ => CoolingTier::T3Liquid,
        }
    }
}

impl<'de> Deserialize<'de> for CoolingTier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_tag(deserializer)
    }
}

/// IREN Cloud site parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IrenCloudParams {
    /// Load sizing.
    #[serde(flatten)]
    pub load: LoadInput,
    /// Annual revenue ($M/yr).
    #[serde(default = "blank", deserialize_with = "lenient_f64")]
    pub topline_revenue: f64,
    /// EBITDA margin (%).
    #[serde(default = "blank", deserialize_with = "lenient_f64")]
    pub ebitda_margin: f64,
    /// GPU counts keyed by market GPU type.
    #[serde(default, deserialize_with = "lenient_counts")]
    pub gpus: BTreeMap<String, f64>,
    /// Share of the GPU fleet already paid off (%).
    #[serde(default = "blank", deserialize_with = "lenient_f64")]
    pub gpu_paid_off_percent: f64,
    /// GPU depreciation life (years).
    #[serde(default = "blank", deserialize_with = "lenient_f64")]
    pub gpu_useful_life: f64,
    /// Retrofit or new build.
    #[serde(default)]
    pub dc_type: DcType,
    /// Cooling tier of a new build.
    #[serde(default)]
    pub new_dc_type: CoolingTier,
    /// Retrofit cost ($M per MW of IT load).
    #[serde(
        rename = "retrofitCapexPerMW",
        default = "blank",
        deserialize_with = "lenient_f64"
    )]
    pub retrofit_capex_per_mw: f64,
    /// New-build cost ($M per MW of IT load).
    #[serde(rename = "dcCostPerMW", default = "blank", deserialize_with = "lenient_f64")]
    pub dc_cost_per_mw: f64,
    /// Data centre depreciation life (years).
    #[serde(default = "blank", deserialize_with = "lenient_f64")]
    pub dc_lifetime: f64,
    /// Annual interest rate on GPU debt (%).
    #[serde(default = "blank", deserialize_with = "lenient_f64")]
    pub interest_rate: f64,
    /// Debt term (years).
    #[serde(default = "blank", deserialize_with = "lenient_f64")]
    pub debt_years: f64,
    /// GPU residual value at end of life (% of cost).
    #[serde(default = "blank", deserialize_with = "lenient_f64")]
    pub residual_value: f64,
    /// Recompute topline from GPU counts and hourly rates after edits.
    #[serde(default)]
    pub auto_calculate_revenue: bool,
    /// Rescale GPU counts with the IT load after edits.
    #[serde(default)]
    pub autoscale_gpus: bool,
}

impl Default for IrenCloudParams {
    fn default() -> Self {
        let gpus = [keys::B300, keys::B200, keys::MI350X, keys::GB300]
            .into_iter()
            .map(|k| (k.to_string(), 0.0))
            .collect();
        Self {
            load: LoadInput::default(),
            topline_revenue: 500.0,
            ebitda_margin: 85.0,
            gpus,
            gpu_paid_off_percent: 0.0,
            gpu_useful_life: 5.0,
            dc_type: DcType::Retrofit,
            new_dc_type: CoolingTier::T3Liquid,
            retrofit_capex_per_mw: 0.0,
            dc_cost_per_mw: 0.0,
            dc_lifetime: RETROFIT_DC_LIFETIME,
            interest_rate: 7.0,
            debt_years: 5.0,
            residual_value: 0.0,
            auto_calculate_revenue: false,
            autoscale_gpus: false,
        }
    }
}

impl IrenCloudParams {
    /// Selects a new-build cooling tier and applies its suggested build cost.
    pub fn select_cooling_tier(&mut self, tier: CoolingTier) {
        self.new_dc_type = tier;
        self.dc_cost_per_mw = tier.suggested_dc_cost_per_mw();
    }

    /// Undiscounted fleet cost ($M), before the paid-off share.
    pub fn raw_gpu_cost(&self, market: &GpuMarket) -> f64 {
        self.gpus
            .iter()
            .map(|(key, count)| count.or_zero() * market.prices.price(key) / 1_000_000.0)
            .sum()
    }
}

impl SiteCalculator for IrenCloudParams {
    fn evaluate(&self, market: &GpuMarket) -> SiteResult {
        let mut trace = CalcTrace::new();

        let revenue = self.topline_revenue.or_zero();
        trace.push(format!("Revenue: ${}M", fixed(revenue, 2)));

        let margin = self.ebitda_margin.or_zero();
        let ebitda = revenue * (margin / 100.0);
        trace.push(format!(
            "EBITDA: ${}M × {}% = ${}M",
            fixed(revenue, 2),
            plain(margin),
            fixed(ebitda, 2)
        ));

        let raw_gpu_cost = self.raw_gpu_cost(market);
        let paid_off = self.gpu_paid_off_percent.nullish_or(0.0);
        let gpu_cost = raw_gpu_cost * (1.0 - paid_off / 100.0);
        if paid_off > 0.0 {
            trace.push(format!(
                "Total GPU Cost: ${}M × (1 - {}%) = ${}M",
                fixed(raw_gpu_cost, 2),
                plain(paid_off),
                fixed(gpu_cost, 2)
            ));
        } else {
            trace.push(format!("Total GPU Cost: ${}M", fixed(gpu_cost, 2)));
        }

        let useful_life = self.gpu_useful_life.or_default(1.0);
        let gpu_depreciation = gpu_cost / useful_life;
        trace.push(format!(
            "GPU Depreciation: ${}M / {} yrs = ${}M/yr",
            fixed(gpu_cost, 2),
            plain(useful_life),
            fixed(gpu_depreciation, 2)
        ));

        let load = self.load.resolve();
        load.record(&mut trace, true);
        let it_load = load.it_load_mw;

        let (dc_cost, dc_depreciation) = match self.dc_type {
            DcType::Retrofit => {
                let capex_per_mw = self.retrofit_capex_per_mw.or_zero();
                let lifetime = self.dc_lifetime.or_default(RETROFIT_DC_LIFETIME);
                let cost = it_load * capex_per_mw;
                let depreciation = cost / lifetime;
                trace.push(format!(
                    "Retrofit Capex: {} MW × ${}M/MW = ${}M",
                    fixed(it_load, 2),
                    plain(capex_per_mw),
                    fixed(cost, 2)
                ));
                trace.push(format!(
                    "DC Depreciation (Retrofit): ${}M / {} yrs = ${}M/yr",
                    fixed(cost, 2),
                    plain(lifetime),
                    fixed(depreciation, 2)
                ));
                (cost, depreciation)
            }
            DcType::New => {
                let cost_per_mw = self.dc_cost_per_mw.or_zero();
                let lifetime = self.dc_lifetime.or_default(1.0);
                let cost = it_load * cost_per_mw;
                let depreciation = cost / lifetime;
                trace.push(format!(
                    "DC Cost: {} MW × ${}M/MW = ${}M",
                    fixed(it_load, 2),
                    plain(cost_per_mw),
                    fixed(cost, 2)
                ));
                trace.push(format!(
                    "DC Depreciation: ${}M / {} yrs = ${}M/yr",
                    fixed(cost, 2),
                    plain(lifetime),
                    fixed(depreciation, 2)
                ));
                (cost, depreciation)
            }
        };

        trace.push(format!("Initial Debt: ${}M", fixed(gpu_cost, 2)));

        let debt_years = whole_years(self.debt_years);
        let schedule = yearly_schedule(gpu_cost, self.interest_rate.or_zero(), debt_years);
        trace.push(format!(
            "Monthly Payment (Amortized): ${}M/month",
            fixed(schedule.monthly_payment(), 2)
        ));
        trace.push(format!(
            "Annual Payment: ${}M/yr",
            fixed(schedule.annual_payment(), 2)
        ));
        record_schedule(&mut trace, &schedule);

        let total_interest = schedule.total_interest();
        let interest_per_year = schedule.average_interest_per_year();
        trace.push(format!(
            "Average Interest/yr: ${}M / {} yrs = ${}M/yr",
            fixed(total_interest, 2),
            debt_years,
            fixed(interest_per_year, 2)
        ));

        let residual_percent = self.residual_value.or_zero();
        let residual_value = gpu_cost * (residual_percent / 100.0);
        trace.push(format!(
            "GPU Residual Value: ${}M × {}% = ${}M",
            fixed(gpu_cost, 2),
            plain(residual_percent),
            fixed(residual_value, 2)
        ));

        let residual_per_year = residual_value / useful_life;
        trace.push(format!(
            "GPU Residual Value/yr: ${}M / {} yrs = ${}M/yr",
            fixed(residual_value, 2),
            plain(useful_life),
            fixed(residual_per_year, 2)
        ));

        let net_profit =
            ebitda - gpu_depreciation - dc_depreciation - interest_per_year + residual_per_year;
        trace.push(format!(
            "Earnings before Tax, SG&A: ${}M - ${}M - ${}M - ${}M + ${}M = ${}M/yr",
            fixed(ebitda, 2),
            fixed(gpu_depreciation, 2),
            fixed(dc_depreciation, 2),
            fixed(interest_per_year, 2),
            fixed(residual_per_year, 2),
            fixed(net_profit, 2)
        ));

        trace.section(POSITIVE_CASHFLOW_HEADING);

        let ebitda_20yr = ebitda * CASHFLOW_HORIZON_YEARS;
        trace.push(format!(
            "20-Year EBITDA: ${}M/yr × 20 = ${}M",
            fixed(ebitda, 2),
            fixed(ebitda_20yr, 2)
        ));

        let gpu_cost_20yr = gpu_cost * REPLACEMENT_CYCLES;
        trace.push(format!(
            "20-Year GPU Cost: ${}M × 4 = ${}M",
            fixed(gpu_cost, 2),
            fixed(gpu_cost_20yr, 2)
        ));

        trace.push(format!("20-Year DC Cost: ${}M ", fixed(dc_cost, 2)));

        let interest_20yr = total_interest * REPLACEMENT_CYCLES;
        trace.push(format!(
            "20-Year Interest: ${}M × 4 = ${}M",
            fixed(total_interest, 2),
            fixed(interest_20yr, 2)
        ));

        let residual_20yr = residual_value * REPLACEMENT_CYCLES;
        trace.push(format!(
            "20-Year Residual Value: ${}M × 4 = ${}M",
            fixed(residual_value, 2),
            fixed(residual_20yr, 2)
        ));

        let cashflow_20yr = ebitda_20yr - gpu_cost_20yr - dc_cost - interest_20yr + residual_20yr;
        trace.push(format!(
            "20-Year Net Cashflow: ${}M - ${}M - ${}M - ${}M + ${}M = ${}M",
            fixed(ebitda_20yr, 2),
            fixed(gpu_cost_20yr, 2),
            fixed(dc_cost, 2),
            fixed(interest_20yr, 2),
            fixed(residual_20yr, 2),
            fixed(cashflow_20yr, 2)
        ));

        let payback = payback_years(cashflow_20yr, ebitda_20yr);
        trace.push(format!(
            "Positive Cashflow: (${}M / ${}M) × 20 = {} out of 20 years",
            fixed(cashflow_20yr, 2),
            fixed(ebitda_20yr, 2),
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

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use valuation_core::units::PowerUnit;

    fn prince_george() -> IrenCloudParams {
        let gpus = [
            (keys::B300, 9500.0),
            (keys::B200, 9600.0),
            (keys::MI350X, 1100.0),
            (keys::GB300, 1200.0),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
        IrenCloudParams {
            gpus,
            gpu_paid_off_percent: 25.0,
            ..IrenCloudParams::default()
        }
    }

    #[test]
    fn test_prince_george_figures() {
        let result = prince_george().evaluate(&GpuMarket::default());
        assert_relative_eq!(result.revenue, 500.0);
        assert_relative_eq!(result.net_profit, 217.42, epsilon = 0.01);
        assert_relative_eq!(result.it_load, 100.0 / 1.5);
    }

    #[test]
    fn test_paid_off_line() {
        let steps = prince_george().evaluate(&GpuMarket::default()).steps;
        assert!(steps[2].starts_with("Total GPU Cost: $"));
        assert!(steps[2].contains(" × (1 - 25%) = $"));
        assert_eq!(steps[4], "Total Load: 100.00 MW");
        assert_eq!(steps[6], "Retrofit Capex: 66.67 MW × $0M/MW = $0.00M");
        assert_eq!(steps[7], "DC Depreciation (Retrofit): $0.00M / 20 yrs = $0.00M/yr");
    }

    #[test]
    fn test_blank_paid_off_keeps_full_cost() {
        let mut params = prince_george();
        params.gpu_paid_off_percent = f64::NAN;
        let market = GpuMarket::default();
        let steps = params.evaluate(&market).steps;
        assert_eq!(
            steps[2],
            format!("Total GPU Cost: ${}M", fixed(params.raw_gpu_cost(&market), 2))
        );
    }

    #[test]
    fn test_retrofit_lifetime_defaults_to_twenty() {
        let params = IrenCloudParams {
            load: LoadInput::direct(100.0, PowerUnit::MW),
            retrofit_capex_per_mw: 2.0,
            dc_lifetime: f64::NAN,
            topline_revenue: 0.0,
            ..IrenCloudParams::default()
        };
        let result = params.evaluate(&GpuMarket::default());
        assert_relative_eq!(result.net_profit, -10.0);
    }

    #[test]
    fn test_new_build_uses_dc_cost() {
        let mut params = IrenCloudParams {
            load: LoadInput::direct(10.0, PowerUnit::MW),
            dc_type: DcType::New,
            topline_revenue: 0.0,
            dc_lifetime: 10.0,
            ..IrenCloudParams::default()
        };
        params.select_cooling_tier(CoolingTier::T2Liquid);
        assert_eq!(params.dc_cost_per_mw, 8.0);
        let result = params.evaluate(&GpuMarket::default());
        assert_relative_eq!(result.net_profit, -8.0);
        assert!(result.steps.contains(&"DC Cost: 10.00 MW × $8M/MW = $80.00M".to_string()));
    }

    #[test]
    fn test_unpriced_gpu_type_costs_nothing() {
        let mut params = IrenCloudParams::default();
        params.gpus.insert("h100".to_string(), 1000.0);
        assert_eq!(params.raw_gpu_cost(&GpuMarket::default()), 0.0);
    }

    #[test]
    fn test_cooling_tier_tags() {
        let tier: CoolingTier = serde_json::from_str("\"t2-air\"").unwrap();
        assert_eq!(tier, CoolingTier::T2Air);
        assert_eq!(serde_json::to_string(&CoolingTier::T2Liquid).unwrap(), "\"t2-liquid\"");
        assert_eq!(CoolingTier::T3Liquid.tag(), "t3-liquid");
    }

    #[test]
    fn test_missing_dc_type_is_new_build() {
        let params: IrenCloudParams = serde_json::from_str(r#"{"dcCostPerMW": 15}"#).unwrap();
        assert_eq!(params.dc_type, DcType::New);
    }
}
