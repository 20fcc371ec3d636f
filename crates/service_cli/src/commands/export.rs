//! Export command implementation
//!
//! Writes the reference portfolio as a JSON snapshot that `value --snapshot`
//! can read back after editing.

use std::path::Path;
use tracing::info;

use super::select_scenario;
use crate::Result;
use valuation_portfolio::{ConfigSnapshot, PortfolioState};

/// Run the export command
pub fn run(output: &Path, scenario: Option<&str>) -> Result<()> {
    let state = select_scenario(PortfolioState::reference(), scenario)?;
    ConfigSnapshot::from(&state).save(output)?;
    info!("Snapshot written to {}", output.display());
    Ok(())
}
