//! Calendar worklog CLI library.
//!
//! This crate provides the CLI interface for the worklog reporter.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands, ReportArgs};
pub use config::Config;
