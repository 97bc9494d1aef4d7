//! CLI subcommand implementations.

pub mod calendars;
pub mod report;
