//! Scenarios command implementation

use std::io::Write;
use std::path::Path;

use super::load_state;
use crate::Result;
use valuation_core::format::format_shares;
use valuation_portfolio::scenarios::presets;
use valuation_portfolio::Scenario;

/// Run the scenarios command
pub fn run(snapshot: Option<&Path>, out: &mut impl Write) -> Result<()> {
    let state = load_state(snapshot)?;
    let selected = state.selected_scenario();

    let mut write_group = |title: &str, scenarios: &[Scenario]| -> Result<()> {
        writeln!(out, "{}:", title)?;
        for scenario in scenarios {
            let marker = if Some(&scenario.id) == selected { "*" } else { " " };
            let diluted = scenario.share_params().fully_diluted_shares();
            writeln!(
                out,
                "{} {:<24} {:<45} P/E {:<4} shares {}",
                marker,
                scenario.id.as_str(),
                scenario.name,
                scenario.pe_ratio,
                format_shares(diluted)
            )?;
        }
        Ok(())
    };

    write_group("Presets", &presets())?;
    if !state.custom_scenarios().is_empty() {
        write_group("Custom", state.custom_scenarios())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lists_presets_with_default_marked() {
        let mut buffer = Vec::new();
        run(None, &mut buffer).unwrap();
        let output = String::from_utf8(buffer).unwrap();
        assert!(output.starts_with("Presets:\n"));
        assert_eq!(output.lines().count(), 6);
        assert!(output.lines().any(|l| l.starts_with("* 2026-h18-sw1")));
        assert!(!output.contains("Custom:"));
    }
}
