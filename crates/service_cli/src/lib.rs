//! irenval - command-line valuation of IREN data-centre portfolios
//!
//! # Commands
//!
//! - `irenval value` - Value the portfolio and print the summary
//! - `irenval site --id <ID>` - Print one site's calculation trace
//! - `irenval scenarios` - List preset and custom scenarios
//! - `irenval export --output <FILE>` - Write the reference portfolio as a snapshot
//!
//! # Architecture
//!
//! As the service layer, this crate only loads inputs, drives
//! `valuation_portfolio` and renders results. It holds no valuation logic.

pub mod commands;
pub mod config;
pub mod error;

pub use error::{CliError, Result};
