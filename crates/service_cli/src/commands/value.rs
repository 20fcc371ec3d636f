//! Value command implementation
//!
//! Values the portfolio and renders the summary and per-site breakdown.

use std::io::Write;
use std::path::PathBuf;
use tracing::info;

use super::{load_state, select_scenario};
use crate::config::OutputFormat;
use crate::Result;
use valuation_core::format::{format_payback_years, format_price, format_shares, format_value};
use valuation_portfolio::{valuate, PortfolioState, PortfolioValuation};

/// Options of the value command after merging config and flags.
#[derive(Debug, Clone, Default)]
pub struct ValueOptions {
    /// Snapshot to value; the reference portfolio when `None`.
    pub snapshot: Option<PathBuf>,
    /// Scenario to select.
    pub scenario: Option<String>,
    /// Output format.
    pub format: OutputFormat,
    /// Append each active site's trace (table format only).
    pub show_steps: bool,
}

/// Run the value command
pub fn run(options: &ValueOptions, out: &mut impl Write) -> Result<()> {
    let state = load_state(options.snapshot.as_deref())?;
    let state = select_scenario(state, options.scenario.as_deref())?;
    let valuation = valuate(&state);
    info!(
        "Valued {} active sites under scenario {}",
        valuation.sites.len(),
        state
            .selected_scenario()
            .map(|s| s.as_str())
            .unwrap_or("(none)")
    );

    match options.format {
        OutputFormat::Table => write_table(&state, &valuation, options.show_steps, out),
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &valuation)?;
            writeln!(out)?;
            Ok(())
        }
        OutputFormat::Csv => write_csv(&valuation, out),
    }
}

fn write_table(
    state: &PortfolioState,
    valuation: &PortfolioValuation,
    show_steps: bool,
    out: &mut impl Write,
) -> Result<()> {
    writeln!(out, "Valuation Summary")?;
    writeln!(out, "  Share Price:          {}", format_price(valuation.share_price))?;
    writeln!(out, "  Market Cap:           {}", format_value(valuation.market_cap, "$", ""))?;
    writeln!(
        out,
        "  Fully Diluted Shares: {}",
        format_shares(valuation.fully_diluted_shares)
    )?;
    writeln!(
        out,
        "  Annual Revenue:       {}",
        format_value(valuation.total_revenue, "$", "/yr")
    )?;
    writeln!(
        out,
        "  Earnings before Tax:  {}",
        format_value(valuation.total_net_profit, "$", "/yr")
    )?;

    writeln!(out)?;
    writeln!(out, "┌──────────────────────────────┬──────────────┬──────────────┬────────────┐")?;
    writeln!(out, "│ Site                         │ Revenue      │ Earnings     │ Payback    │")?;
    writeln!(out, "├──────────────────────────────┼──────────────┼──────────────┼────────────┤")?;
    for site in &valuation.sites {
        writeln!(
            out,
            "│ {:<28} │ {:<12} │ {:<12} │ {:<10} │",
            site.name,
            format_value(site.revenue, "$", "/yr"),
            format_value(site.net_profit, "$", "/yr"),
            format_payback_years(site.payback_years)
        )?;
    }
    writeln!(out, "└──────────────────────────────┴──────────────┴──────────────┴────────────┘")?;

    writeln!(out)?;
    for line in valuation.summary_lines() {
        writeln!(out, "{}", line)?;
    }

    if show_steps {
        for site in state.active_sites() {
            writeln!(out)?;
            writeln!(out, "=== {} ({}) ===", site.name, site.site_type())?;
            for step in site.evaluate(state.market()).steps {
                writeln!(out, "{}", step)?;
            }
        }
    }
    Ok(())
}

fn write_csv(valuation: &PortfolioValuation, out: &mut impl Write) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(["id", "name", "revenue_musd", "net_profit_musd", "payback_years"])?;
    for site in &valuation.sites {
        writer.write_record([
            site.id.as_str(),
            site.name.as_str(),
            &site.revenue.to_string(),
            &site.net_profit.to_string(),
            &site.payback_years.to_string(),
        ])?;
    }
    writer.write_record([
        "total",
        "Total",
        &valuation.total_revenue.to_string(),
        &valuation.total_net_profit.to_string(),
        "",
    ])?;
    writer.flush()?;
    Ok(())
}
