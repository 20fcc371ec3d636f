//! Site command implementation
//!
//! Prints one site's full calculation trace, whether or not the site is
//! active under the selected scenario.

use std::io::Write;
use std::path::Path;

use super::load_state;
use crate::Result;
use valuation_core::format::{format_payback_years, format_value};
use valuation_core::types::SiteId;

/// Run the site command
pub fn run(id: &str, snapshot: Option<&Path>, out: &mut impl Write) -> Result<()> {
    let state = load_state(snapshot)?;
    let id = SiteId::new(id);
    let result = state.evaluate_site(&id)?;
    let site = state.site(&id).map(|s| (s.name.as_str(), s.site_type()));

    if let Some((name, site_type)) = site {
        writeln!(out, "{} ({})", name, site_type)?;
    }
    if !state.is_active(&id) {
        writeln!(out, "(inactive under the selected scenario)")?;
    }
    for step in &result.steps {
        writeln!(out, "{}", step)?;
    }
    writeln!(out)?;
    writeln!(out, "Net Profit: {}", format_value(result.net_profit, "$", "/yr"))?;
    writeln!(out, "Revenue:    {}", format_value(result.revenue, "$", "/yr"))?;
    writeln!(out, "Payback:    {}", format_payback_years(result.payback_years))?;
    Ok(())
}
