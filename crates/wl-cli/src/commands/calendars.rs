//! Calendars command for listing the calendars a token can read.
//!
//! The names printed here are what `wl report --calendar` matches against.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::{Context, Result};
use serde::Serialize;
use wl_core::{CalendarDirectory, CalendarEntry};

use super::report::open_source;
use crate::Config;

// ========== Human-Readable Output ==========

/// Format calendars for human-readable output.
pub fn format_calendars(entries: &[CalendarEntry]) -> String {
    let mut output = String::new();

    if entries.is_empty() {
        writeln!(output, "No calendars visible to this access token.").unwrap();
        return output;
    }

    let width = entries
        .iter()
        .map(|entry| entry.summary.chars().count())
        .max()
        .unwrap_or(0)
        .max("Name".len());

    writeln!(output, "{:<width$}  ID", "Name").unwrap();
    for entry in entries {
        writeln!(output, "{:<width$}  {}", entry.summary, entry.id).unwrap();
    }

    output
}

// ========== JSON Output ==========

#[derive(Debug, Serialize)]
pub struct JsonCalendars<'a> {
    pub calendars: &'a [CalendarEntry],
}

/// Format calendars as JSON.
pub fn format_calendars_json(entries: &[CalendarEntry]) -> Result<String> {
    Ok(serde_json::to_string_pretty(&JsonCalendars { calendars: entries })?)
}

// ========== Public Interface ==========

/// Runs the calendars command.
pub fn run<W: Write>(writer: &mut W, json: bool, config: &Config) -> Result<()> {
    let source = open_source(config)?;
    let entries = source
        .list_calendars()
        .context("failed to list calendars")?;
    tracing::debug!(count = entries.len(), "listed calendars");

    if json {
        writeln!(writer, "{}", format_calendars_json(&entries)?)?;
    } else {
        write!(writer, "{}", format_calendars(&entries))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;

    use super::*;

    fn entry(id: &str, summary: &str) -> CalendarEntry {
        CalendarEntry {
            id: id.to_string(),
            summary: summary.to_string(),
        }
    }

    #[test]
    fn test_format_calendars_aligns_names() {
        let output = format_calendars(&[
            entry("me@example.com", "Personal"),
            entry("acme@group.calendar.google.com", "ACME"),
        ]);
        assert_eq!(
            output,
            "Name      ID\n\
             Personal  me@example.com\n\
             ACME      acme@group.calendar.google.com\n"
        );
    }

    #[test]
    fn test_format_calendars_empty() {
        let output = format_calendars(&[]);
        assert!(output.contains("No calendars"));
    }

    #[test]
    fn test_format_calendars_json() {
        let output = format_calendars_json(&[entry("me@example.com", "Personal")]).unwrap();
        assert_snapshot!(output, @r#"
        {
          "calendars": [
            {
              "id": "me@example.com",
              "summary": "Personal"
            }
          ]
        }
        "#);
    }

    #[test]
    fn test_run_requires_access_token() {
        let mut output = Vec::new();
        let err = run(&mut output, false, &Config::default()).unwrap_err();
        assert!(err.to_string().contains("access token"));
        assert!(output.is_empty());
    }
}
