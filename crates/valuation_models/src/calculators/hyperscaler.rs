//! Hyperscaler IaaS: a fixed-term GPU capacity contract with a hyperscaler.
//!
//! Contract revenue and EBITDA cover the whole term and are spread evenly
//! per year. Hardware is depreciated over the contract and financed with
//! debt net of the customer's prepayment. An optional contract-improvement
//! block models renegotiating the topline, either as a direct uplift or as a
//! share of the Nebius reference contract prorated by GPU count.
//!
//! The 20-year projection repeats the contract four times; data centre capex
//! is paid once.

use super::{payback_years, record_schedule, SiteCalculator, REPLACEMENT_CYCLES};
use crate::load::LoadInput;
use crate::result::SiteResult;
use serde::{Deserialize, Deserializer, Serialize};
use valuation_core::format::{fixed, grouped, plain};
use valuation_core::market_data::{keys, GpuMarket};
use valuation_core::math::amortisation::yearly_schedule;
use valuation_core::trace::{CalcTrace, IMPROVED_CONTRACT_HEADING, POSITIVE_CASHFLOW_HEADING};
use valuation_core::types::input::{
    blank, deserialize_tag, lenient_f64, lenient_opt_f64, whole_years, Coerce, LenientTag,
};

/// Nebius–Microsoft contract topline ($M) used as the percentage-mode reference.
pub const NEBIUS_BASE_REVENUE: f64 = 17_400.0;

/// GPU count of the Nebius reference contract.
const NEBIUS_GPU_COUNT: f64 = 100_000.0;

/// Lowest believable share of the reference contract (IREN–Microsoft ratio), %.
pub const IMPROVED_PERCENTAGE_MIN: f64 = 73.35;

/// Highest share of the reference contract, %.
pub const IMPROVED_PERCENTAGE_MAX: f64 = 100.0;

/// Years over which a renegotiated uplift is spread, whatever the contract term.
const IMPROVEMENT_SPREAD_YEARS: f64 = 5.0;

/// Clamps a committed improved-contracts percentage into
/// [`IMPROVED_PERCENTAGE_MIN`, `IMPROVED_PERCENTAGE_MAX`].
///
/// Blank input commits the lower bound.
///
/// # Examples
/// ```
/// use valuation_models::calculators::clamp_improved_percentage;
///
/// assert_eq!(clamp_improved_percentage(50.0), 73.35);
/// assert_eq!(clamp_improved_percentage(150.0), 100.0);
/// assert_eq!(clamp_improved_percentage(87.9), 87.9);
/// ```
pub fn clamp_improved_percentage(value: f64) -> f64 {
    value
        .nullish_or(IMPROVED_PERCENTAGE_MIN)
        .clamp(IMPROVED_PERCENTAGE_MIN, IMPROVED_PERCENTAGE_MAX)
}

/// How the hardware cost is entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HardwareMode {
    /// A single total ($M).
    #[default]
    Total,
    /// GPU counts priced from the market table.
    Gpus,
}

impl LenientTag for HardwareMode {
    fn from_tag(tag: &str) -> Self {
        if tag.trim().eq_ignore_ascii_case("gpus") {
            HardwareMode::Gpus
        } else {
            HardwareMode::Total
        }
    }
}

impl<'de> Deserialize<'de> for HardwareMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_tag(deserializer)
    }
}

/// How a renegotiated topline is specified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImprovementMode {
    /// Percentage uplift on the base contract revenue.
    #[default]
    Direct,
    /// Share of the Nebius reference contract, prorated by GPU count.
    Percentage,
}

impl LenientTag for ImprovementMode {
    fn from_tag(tag: &str) -> Self {
        if tag.trim().eq_ignore_ascii_case("percentage") {
            ImprovementMode::Percentage
        } else {
            ImprovementMode::Direct
        }
    }
}

impl<'de> Deserialize<'de> for ImprovementMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_tag(deserializer)
    }
}

/// Optional contract renegotiation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractImprovement {
    /// Whether the improvement applies.
    #[serde(default)]
    pub contract_gap_enabled: bool,
    /// Uplift specification.
    #[serde(default)]
    pub improvement_mode: ImprovementMode,
    /// Direct mode: uplift on base revenue (%).
    #[serde(default = "blank", deserialize_with = "lenient_f64")]
    pub direct_improvement: f64,
    /// Percentage mode: share of the reference contract (%), kept within
    /// [73.35, 100].
    #[serde(default = "blank", deserialize_with = "lenient_f64")]
    pub improved_contracts_percentage: f64,
    /// Historical hyperscale hourly rate the current rate is compared with.
    /// Without it the rate ratio is 1.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_opt_f64"
    )]
    pub baseline_hourly_rate: Option<f64>,
}

impl Default for ContractImprovement {
    fn default() -> Self {
        Self {
            contract_gap_enabled: false,
            improvement_mode: ImprovementMode::Direct,
            direct_improvement: 0.0,
            improved_contracts_percentage: IMPROVED_PERCENTAGE_MIN,
            baseline_hourly_rate: None,
        }
    }
}

impl ContractImprovement {
    /// Commits a new improved-contracts percentage, clamped to its band.
    pub fn set_improved_contracts_percentage(&mut self, value: f64) {
        let clamped = clamp_improved_percentage(value);
        if clamped != value {
            tracing::debug!(
                requested = value,
                committed = clamped,
                "improved contracts percentage clamped"
            );
        }
        self.improved_contracts_percentage = clamped;
    }

    /// Ratio of the current hyperscale hourly rate to the baseline.
    pub fn hourly_rate_ratio(&self, current_rate: f64) -> f64 {
        match self.baseline_hourly_rate {
            Some(baseline) if baseline > 0.0 && current_rate.is_finite() => current_rate / baseline,
            _ => 1.0,
        }
    }
}

/// Hyperscaler IaaS site parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HyperscalerParams {
    /// Load sizing.
    #[serde(flatten)]
    pub load: LoadInput,
    /// Base contract revenue over the whole term ($M).
    #[serde(default = "blank", deserialize_with = "lenient_f64")]
    pub topline_revenue: f64,
    /// Contract term (years).
    #[serde(default = "blank", deserialize_with = "lenient_f64")]
    pub contract_years: f64,
    /// EBITDA margin (%).
    #[serde(default = "blank", deserialize_with = "lenient_f64")]
    pub ebitda_margin: f64,
    /// How the hardware cost is entered.
    #[serde(default)]
    pub hardware_mode: HardwareMode,
    /// Total hardware cost ($M), used in total mode.
    #[serde(default = "blank", deserialize_with = "lenient_f64")]
    pub total_hardware_cost: f64,
    /// Hyperscale bulk GB300 count, priced in GPU mode.
    #[serde(default = "blank", deserialize_with = "lenient_f64")]
    pub direct_gpu_count: f64,
    /// Hyperscale bulk Vera Rubin NVL144 count, priced in GPU mode.
    #[serde(default = "blank", deserialize_with = "lenient_f64")]
    pub vera_rubin_gpu_count: f64,
    /// Build cost ($M per MW of IT load).
    #[serde(rename = "dcCostPerMW", default = "blank", deserialize_with = "lenient_f64")]
    pub dc_cost_per_mw: f64,
    /// Data centre depreciation life (years).
    #[serde(default = "blank", deserialize_with = "lenient_f64")]
    pub dc_lifetime: f64,
    /// Customer prepayment as a share of topline (%).
    #[serde(default = "blank", deserialize_with = "lenient_f64")]
    pub prepayment_percent: f64,
    /// Annual interest rate on hardware debt (%).
    #[serde(default = "blank", deserialize_with = "lenient_f64")]
    pub interest_rate: f64,
    /// Debt term (years).
    #[serde(default = "blank", deserialize_with = "lenient_f64")]
    pub debt_years: f64,
    /// Hardware residual value at contract end (% of cost).
    #[serde(default = "blank", deserialize_with = "lenient_f64")]
    pub residual_value: f64,
    /// Contract renegotiation.
    #[serde(flatten)]
    pub improvement: ContractImprovement,
    /// Recompute topline from GPU counts and hourly rates after edits.
    #[serde(default)]
    pub auto_calculate_revenue: bool,
    /// Rescale GPU counts with the IT load after edits.
    #[serde(default)]
    pub autoscale_gpus: bool,
}

impl Default for HyperscalerParams {
    fn default() -> Self {
        Self {
            load: LoadInput::default(),
            topline_revenue: 1000.0,
            contract_years: 5.0,
            ebitda_margin: 85.0,
            hardware_mode: HardwareMode::Total,
            total_hardware_cost: 1000.0,
            direct_gpu_count: 0.0,
            vera_rubin_gpu_count: 0.0,
            dc_cost_per_mw: 15.0,
            dc_lifetime: 20.0,
            prepayment_percent: 20.0,
            interest_rate: 7.0,
            debt_years: 5.0,
            residual_value: 0.0,
            improvement: ContractImprovement::default(),
            auto_calculate_revenue: false,
            autoscale_gpus: false,
        }
    }
}

impl HyperscalerParams {
    /// Hardware cost ($M) under the active hardware mode, recording the GPU
    /// pricing lines in GPU mode.
    fn hardware_cost(&self, market: &GpuMarket, trace: &mut CalcTrace) -> f64 {
        match self.hardware_mode {
            HardwareMode::Total => self.total_hardware_cost.or_zero(),
            HardwareMode::Gpus => {
                let bulk_count = self.direct_gpu_count.or_zero();
                let rubin_count = self.vera_rubin_gpu_count.or_zero();
                let bulk_price = market.prices.price(keys::HYPERSCALE_BULK_GB300);
                let rubin_price = market.prices.price(keys::VERA_RUBIN_NVL144);
                let bulk_cost = bulk_count * bulk_price / 1_000_000.0;
                let rubin_cost = rubin_count * rubin_price / 1_000_000.0;
                let total = bulk_cost + rubin_cost;

                if bulk_count > 0.0 {
                    trace.push(format!(
                        "Hyperscale Bulk GB300: {} GPUs × ${} = ${}M",
                        grouped(bulk_count),
                        grouped(bulk_price),
                        fixed(bulk_cost, 2)
                    ));
                }
                if rubin_count > 0.0 {
                    trace.push(format!(
                        "Hyperscale Bulk Vera Rubin NVL144: {} GPUs × ${} = ${}M",
                        grouped(rubin_count),
                        grouped(rubin_price),
                        fixed(rubin_cost, 2)
                    ));
                }
                trace.push(format!("Total Hardware Cost: ${}M", fixed(total, 2)));
                total
            }
        }
    }

    /// Renegotiated topline ($M) under the active improvement mode.
    fn improved_revenue(&self, revenue: f64, market: &GpuMarket, trace: &mut CalcTrace) -> f64 {
        match self.improvement.improvement_mode {
            ImprovementMode::Percentage => {
                let gpu_count = self.direct_gpu_count.or_zero();
                let ratio = self
                    .improvement
                    .hourly_rate_ratio(market.hourly_rates.price(keys::HYPERSCALE_BULK_GB300));
                let prorated = (gpu_count / NEBIUS_GPU_COUNT) * NEBIUS_BASE_REVENUE * ratio;
                trace.push(format!(
                    "Nebius Topline Scaled by GPU Count: ({} / 100k) × ${}M × {} = ${}M",
                    plain(gpu_count),
                    plain(NEBIUS_BASE_REVENUE),
                    fixed(ratio, 4),
                    fixed(prorated, 2)
                ));

                let percentage =
                    clamp_improved_percentage(self.improvement.improved_contracts_percentage);
                let new_revenue = prorated * (percentage / 100.0);
                trace.push(format!(
                    "New Negotiated Topline: ${}M × {}% = ${}M",
                    fixed(prorated, 2),
                    plain(percentage),
                    fixed(new_revenue, 2)
                ));
                new_revenue
            }
            ImprovementMode::Direct => {
                let uplift = self.improvement.direct_improvement.or_zero();
                let new_revenue = revenue * (1.0 + uplift / 100.0);
                trace.push(format!(
                    "New Negotiated Topline: ${}M × (1 + {}%) = ${}M",
                    fixed(revenue, 2),
                    plain(uplift),
                    fixed(new_revenue, 2)
                ));
                new_revenue
            }
        }
    }
}

impl SiteCalculator for HyperscalerParams {
    fn evaluate(&self, market: &GpuMarket) -> SiteResult {
        let mut trace = CalcTrace::new();

        let revenue = self.topline_revenue.or_zero();
        trace.push(format!("Base Contract Revenue: ${}M", fixed(revenue, 2)));

        let margin = self.ebitda_margin.or_zero();
        let ebitda = revenue * (margin / 100.0);
        trace.push(format!(
            "EBITDA: ${}M × {}% = ${}M",
            fixed(revenue, 2),
            plain(margin),
            fixed(ebitda, 2)
        ));

        let contract_years = self.contract_years.or_default(1.0);
        let ebitda_per_year = ebitda / contract_years;
        trace.push(format!(
            "EBITDA/yr: ${}M / {} yrs = ${}M/yr",
            fixed(ebitda, 2),
            plain(contract_years),
            fixed(ebitda_per_year, 2)
        ));

        let hardware_cost = self.hardware_cost(market, &mut trace);
        let gpu_depreciation = hardware_cost / contract_years;
        trace.push(format!(
            "GPU Depreciation: ${}M / {} yrs = ${}M/yr",
            fixed(hardware_cost, 2),
            plain(contract_years),
            fixed(gpu_depreciation, 2)
        ));

        let load = self.load.resolve();
        load.record(&mut trace, false);
        let it_load = load.it_load_mw;

        let dc_cost_per_mw = self.dc_cost_per_mw.or_zero();
        let dc_lifetime = self.dc_lifetime.or_default(1.0);
        let dc_cost = it_load * dc_cost_per_mw;
        let dc_depreciation = dc_cost / dc_lifetime;
        trace.push(format!(
            "DC Depreciation: ({} MW × ${}M/MW) / {} yrs = ${}M/yr",
            fixed(it_load, 2),
            plain(dc_cost_per_mw),
            plain(dc_lifetime),
            fixed(dc_depreciation, 2)
        ));

        let prepayment_percent = self.prepayment_percent.or_zero();
        let prepayment = revenue * (prepayment_percent / 100.0);
        trace.push(format!(
            "Prepayment: ${}M × {}% = ${}M",
            fixed(revenue, 2),
            plain(prepayment_percent),
            fixed(prepayment, 2)
        ));

        let initial_debt = hardware_cost - prepayment;
        trace.push(format!(
            "Initial Debt: ${}M - ${}M = ${}M",
            fixed(hardware_cost, 2),
            fixed(prepayment, 2),
            fixed(initial_debt, 2)
        ));

        let debt_years = whole_years(self.debt_years);
        let schedule = yearly_schedule(initial_debt, self.interest_rate.or_zero(), debt_years);
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
        trace.push(format!("Total Interest: ${}M", fixed(total_interest, 2)));

        let interest_per_year = schedule.average_interest_per_year();
        trace.push(format!(
            "Average Interest/yr: ${}M / {} yrs = ${}M/yr",
            fixed(total_interest, 2),
            debt_years,
            fixed(interest_per_year, 2)
        ));

        let residual_percent = self.residual_value.or_zero();
        let residual_value = hardware_cost * (residual_percent / 100.0);
        trace.push(format!(
            "GPU Residual Value: ${}M × {}% = ${}M",
            fixed(hardware_cost, 2),
            plain(residual_percent),
            fixed(residual_value, 2)
        ));

        let residual_per_year = residual_value / contract_years;
        trace.push(format!(
            "GPU Residual Value/yr: ${}M / {} yrs = ${}M/yr",
            fixed(residual_value, 2),
            plain(contract_years),
            fixed(residual_per_year, 2)
        ));

        let base_net_profit =
            ebitda_per_year - gpu_depreciation - dc_depreciation - interest_per_year + residual_per_year;
        trace.push(format!(
            "Base Earnings before Tax, SG&A: ${}M - ${}M - ${}M - ${}M + ${}M = ${}M/yr",
            fixed(ebitda_per_year, 2),
            fixed(gpu_depreciation, 2),
            fixed(dc_depreciation, 2),
            fixed(interest_per_year, 2),
            fixed(residual_per_year, 2),
            fixed(base_net_profit, 2)
        ));

        let mut net_profit = base_net_profit;
        let mut total_revenue = revenue;
        let mut additional_profit_per_year = 0.0;

        if self.improvement.contract_gap_enabled {
            trace.spacer();
            trace.push(IMPROVED_CONTRACT_HEADING);

            let new_revenue = self.improved_revenue(revenue, market, &mut trace);

            let additional_profit_total = new_revenue - revenue;
            trace.push(format!(
                "Additional Profit (5yrs): New Negotiated Topline - Base Contract Revenue = ${}M - ${}M = ${}M",
                fixed(new_revenue, 2),
                fixed(revenue, 2),
                fixed(additional_profit_total, 2)
            ));

            additional_profit_per_year = additional_profit_total / IMPROVEMENT_SPREAD_YEARS;
            trace.push(format!(
                "Additional Profit: Additional Profit (5yrs) / 5 = ${}M / 5 = ${}M/yr",
                fixed(additional_profit_total, 2),
                fixed(additional_profit_per_year, 2)
            ));

            net_profit = base_net_profit + additional_profit_per_year;
            trace.push(format!(
                "Earnings before Tax, SG&A: Base Earnings before Tax, SG&A + Additional Profit = ${}M/yr + ${}M/yr = ${}M/yr",
                fixed(base_net_profit, 2),
                fixed(additional_profit_per_year, 2),
                fixed(net_profit, 2)
            ));

            total_revenue = revenue + additional_profit_total;
            trace.push(format!(
                "Revenue: Base Contract Revenue + Additional Profit (5yrs) = ${}M + ${}M = ${}M",
                fixed(revenue, 2),
                fixed(additional_profit_total, 2),
                fixed(total_revenue, 2)
            ));
        }

        let annual_revenue = total_revenue / contract_years;

        trace.section(POSITIVE_CASHFLOW_HEADING);

        let ebitda_20yr = ebitda * REPLACEMENT_CYCLES;
        trace.push(format!(
            "20-Year EBITDA: ${}M × 4 = ${}M",
            fixed(ebitda, 2),
            fixed(ebitda_20yr, 2)
        ));

        let gpu_cost_20yr = hardware_cost * REPLACEMENT_CYCLES;
        trace.push(format!(
            "20-Year GPU Cost: ${}M × 4 = ${}M",
            fixed(hardware_cost, 2),
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

        let additional_profit_total = additional_profit_per_year * IMPROVEMENT_SPREAD_YEARS;
        let additional_profit_20yr = additional_profit_total * REPLACEMENT_CYCLES;
        if additional_profit_20yr > 0.0 {
            trace.push(format!(
                "20-Year Additional Profit: ${}M × 4 = ${}M",
                fixed(additional_profit_total, 2),
                fixed(additional_profit_20yr, 2)
            ));
        }

        let cashflow_20yr = ebitda_20yr - gpu_cost_20yr - dc_cost - interest_20yr + residual_20yr
            + additional_profit_20yr;
        let total_ebitda_20yr = ebitda_20yr + additional_profit_20yr;

        if additional_profit_20yr > 0.0 {
            trace.push(format!(
                "20-Year Net Cashflow: ${}M - ${}M - ${}M - ${}M + ${}M + ${}M = ${}M",
                fixed(ebitda_20yr, 2),
                fixed(gpu_cost_20yr, 2),
                fixed(dc_cost, 2),
                fixed(interest_20yr, 2),
                fixed(residual_20yr, 2),
                fixed(additional_profit_20yr, 2),
                fixed(cashflow_20yr, 2)
            ));
            trace.push(format!(
                "20-Year Total EBITDA: ${}M + ${}M = ${}M",
                fixed(ebitda_20yr, 2),
                fixed(additional_profit_20yr, 2),
                fixed(total_ebitda_20yr, 2)
            ));
        } else {
            trace.push(format!(
                "20-Year Net Cashflow: ${}M - ${}M - ${}M - ${}M + ${}M = ${}M",
                fixed(ebitda_20yr, 2),
                fixed(gpu_cost_20yr, 2),
                fixed(dc_cost, 2),
                fixed(interest_20yr, 2),
                fixed(residual_20yr, 2),
                fixed(cashflow_20yr, 2)
            ));
        }

        let payback = payback_years(cashflow_20yr, total_ebitda_20yr);
        trace.push(format!(
            "Positive Cashflow: (${}M / ${}M) × 20 = {} out of 20 years",
            fixed(cashflow_20yr, 2),
            fixed(total_ebitda_20yr, 2),
            fixed(payback, 1)
        ));

        SiteResult::new(
            net_profit,
            annual_revenue,
            trace.into_steps(),
            payback,
            cashflow_20yr,
            it_load,
        )
    }
}
