//! Load sizing shared by every site type.
//!
//! A site's IT load is entered either directly or as a total facility load
//! divided by PUE. Exactly one mode is active; derived quantities always come
//! from the active mode and never mix the two field sets.

use serde::{Deserialize, Deserializer, Serialize};
use valuation_core::format::{fixed, plain};
use valuation_core::trace::CalcTrace;
use valuation_core::types::input::{blank, deserialize_tag, lenient_f64, Coerce, LenientTag};
use valuation_core::units::{to_mw, PowerUnit};

/// Which load fields drive the IT load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadInputMode {
    /// Total facility load divided by PUE.
    #[default]
    Total,
    /// IT load entered directly.
    Direct,
}

impl LenientTag for LoadInputMode {
    fn from_tag(tag: &str) -> Self {
        if tag.trim().eq_ignore_ascii_case("direct") {
            LoadInputMode::Direct
        } else {
            LoadInputMode::Total
        }
    }
}

impl<'de> Deserialize<'de> for LoadInputMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_tag(deserializer)
    }
}

/// Load sizing fields.
///
/// Colocation snapshots name the total-load fields `totalLoadValue` /
/// `totalLoadUnit`; both spellings are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadInput {
    /// Active sizing mode.
    #[serde(default)]
    pub load_input_mode: LoadInputMode,
    /// Total facility load, in `size_unit`.
    #[serde(
        alias = "totalLoadValue",
        default = "blank",
        deserialize_with = "lenient_f64"
    )]
    pub size_value: f64,
    /// Unit of `size_value`.
    #[serde(alias = "totalLoadUnit", default)]
    pub size_unit: PowerUnit,
    /// Power usage effectiveness (total / IT).
    #[serde(default = "blank", deserialize_with = "lenient_f64")]
    pub pue: f64,
    /// Directly entered IT load, in `it_load_unit`.
    #[serde(default = "blank", deserialize_with = "lenient_f64")]
    pub it_load: f64,
    /// Unit of `it_load`.
    #[serde(default)]
    pub it_load_unit: PowerUnit,
}

impl Default for LoadInput {
    fn default() -> Self {
        Self::total(100.0, PowerUnit::MW, 1.5)
    }
}

impl LoadInput {
    /// Total-load sizing.
    pub fn total(size_value: f64, size_unit: PowerUnit, pue: f64) -> Self {
        Self {
            load_input_mode: LoadInputMode::Total,
            size_value,
            size_unit,
            pue,
            it_load: 0.0,
            it_load_unit: PowerUnit::MW,
        }
    }

    /// Direct IT-load sizing. PUE is kept at 1.5 for when the mode is switched back.
    pub fn direct(it_load: f64, it_load_unit: PowerUnit) -> Self {
        Self {
            load_input_mode: LoadInputMode::Direct,
            size_value: 0.0,
            size_unit: PowerUnit::MW,
            pue: 1.5,
            it_load,
            it_load_unit,
        }
    }

    /// Resolves the active mode to MW figures.
    pub fn resolve(&self) -> ResolvedLoad {
        match self.load_input_mode {
            LoadInputMode::Direct => ResolvedLoad {
                total_mw: None,
                pue: 1.0,
                it_load_mw: to_mw(self.it_load.or_zero(), self.it_load_unit),
            },
            LoadInputMode::Total => {
                let total_mw = to_mw(self.size_value.or_zero(), self.size_unit);
                let pue = self.pue.or_default(1.0);
                ResolvedLoad {
                    total_mw: Some(total_mw),
                    pue,
                    it_load_mw: total_mw / pue,
                }
            }
        }
    }

    /// IT load in MW under the active mode.
    #[inline]
    pub fn it_load_mw(&self) -> f64 {
        self.resolve().it_load_mw
    }

    /// Rescales the active mode's load so that the IT load becomes `it_load_mw`.
    pub fn set_it_load_mw(&mut self, it_load_mw: f64) {
        match self.load_input_mode {
            LoadInputMode::Direct => {
                self.it_load = it_load_mw / self.it_load_unit.mw_factor();
            }
            LoadInputMode::Total => {
                let pue = self.pue.or_default(1.0);
                self.size_value = it_load_mw * pue / self.size_unit.mw_factor();
            }
        }
    }
}

/// Load figures after unit conversion and PUE division.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedLoad {
    /// Total facility load in MW, present in total mode only.
    pub total_mw: Option<f64>,
    /// PUE used for the division (1 in direct mode).
    pub pue: f64,
    /// IT load in MW.
    pub it_load_mw: f64,
}

impl ResolvedLoad {
    /// Records the load lines.
    ///
    /// Direct mode writes a single `IT Load` line. Total mode writes the PUE
    /// division, preceded by a `Total Load` line when `echo_total` is set.
    pub fn record(&self, trace: &mut CalcTrace, echo_total: bool) {
        match self.total_mw {
            None => trace.push(format!("IT Load: {} MW", fixed(self.it_load_mw, 2))),
            Some(total_mw) => {
                if echo_total {
                    trace.push(format!("Total Load: {} MW", fixed(total_mw, 2)));
                }
                trace.push(format!(
                    "IT Load: {} MW / {} = {} MW",
                    fixed(total_mw, 2),
                    plain(self.pue),
                    fixed(self.it_load_mw, 2)
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_total_mode_divides_by_pue() {
        let load = LoadInput::total(375.0, PowerUnit::MW, 1.5);
        assert_relative_eq!(load.it_load_mw(), 250.0);
    }

    #[test]
    fn test_direct_mode_ignores_total_fields() {
        let mut load = LoadInput::direct(0.3, PowerUnit::GW);
        load.size_value = 9999.0;
        load.pue = 7.0;
        assert_relative_eq!(load.it_load_mw(), 300.0);
    }

    #[test]
    fn test_blank_pue_defaults_to_one() {
        let load = LoadInput::total(120.0, PowerUnit::MW, f64::NAN);
        let resolved = load.resolve();
        assert_eq!(resolved.pue, 1.0);
        assert_eq!(resolved.it_load_mw, 120.0);
    }

    #[test]
    fn test_set_it_load_round_trip() {
        let mut load = LoadInput::total(1.0, PowerUnit::GW, 1.25);
        load.set_it_load_mw(400.0);
        assert_relative_eq!(load.size_value, 0.5);
        assert_relative_eq!(load.it_load_mw(), 400.0);
    }

    #[test]
    fn test_colocation_aliases() {
        let load: LoadInput = serde_json::from_str(
            r#"{"totalLoadValue": 1400, "totalLoadUnit": "MW", "pue": 1.5}"#,
        )
        .unwrap();
        assert_eq!(load.load_input_mode, LoadInputMode::Total);
        assert_relative_eq!(load.it_load_mw(), 1400.0 / 1.5);
    }

    #[test]
    fn test_record_lines() {
        let mut trace = CalcTrace::new();
        LoadInput::total(100.0, PowerUnit::MW, 1.5)
            .resolve()
            .record(&mut trace, true);
        LoadInput::direct(200.0, PowerUnit::MW)
            .resolve()
            .record(&mut trace, true);
        assert_eq!(
            trace.into_steps(),
            vec![
                "Total Load: 100.00 MW",
                "IT Load: 100.00 MW / 1.5 = 66.67 MW",
                "IT Load: 200.00 MW",
            ]
        );
    }
}
