//! CLI command implementations
//!
//! Each submodule implements a specific CLI command. Commands write to the
//! supplied writer so they can be exercised without a terminal.

pub mod export;
pub mod scenarios;
pub mod site;
pub mod value;

pub use value::ValueOptions;

use crate::{CliError, Result};
use std::path::Path;
use tracing::info;
use valuation_core::types::ScenarioId;
use valuation_portfolio::{ConfigSnapshot, PortfolioState};

/// Loads the snapshot at `path`, or the reference portfolio when `None`.
pub fn load_state(path: Option<&Path>) -> Result<PortfolioState> {
    match path {
        Some(path) => {
            if !path.exists() {
                return Err(CliError::FileNotFound(path.display().to_string()));
            }
            info!("Loading snapshot {}", path.display());
            Ok(ConfigSnapshot::load(path)?.into_state()?)
        }
        None => Ok(PortfolioState::reference()),
    }
}

/// Selects `scenario` when given.
pub fn select_scenario(state: PortfolioState, scenario: Option<&str>) -> Result<PortfolioState> {
    match scenario {
        Some(id) => Ok(state.with_scenario_selected(Some(ScenarioId::new(id)))?),
        None => Ok(state),
    }
}
