//! Report command for generating worklog and billing reports.
//!
//! This module implements `wl report` with human-readable and JSON output.

use std::io::Write;

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, FixedOffset, Local, SecondsFormat};
use serde::Serialize;
use wl_core::{Report, ReportRequest, WorklogError};
use wl_gcal::{BlockingClient, Client};

use crate::Config;
use crate::cli::ReportArgs;

// ========== Text Output ==========

fn format_instant(instant: &DateTime<FixedOffset>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// Formats the human-readable report.
///
/// One tab-separated line per day, then the period totals and, when a rate
/// was supplied, the price rounded to two decimals.
pub fn format_report(report: &Report) -> String {
    let mut lines = Vec::with_capacity(report.worklog.days.len() + 6);

    lines.push(format!(
        "Listing work done on {} project from {} to {}",
        report.calendar,
        format_instant(&report.range.start),
        format_instant(&report.range.end)
    ));
    lines.push("Date\t\tHours\tDescription".to_string());

    for day in &report.worklog.days {
        lines.push(format!(
            "{}\t{}\t{}",
            day.day.format("%Y-%m-%d"),
            day.hours,
            day.description
        ));
    }

    let totals = &report.worklog.totals;
    lines.push(format!(
        "Total workhour sum for given period:\t\t{} hours",
        totals.total_hours
    ));
    lines.push(format!(
        "Total active days for given period:\t\t{} days",
        totals.workdays
    ));
    if let Some(billing) = &report.billing {
        lines.push(format!(
            "Total price for given period:\t\t{:.2}",
            billing.price
        ));
    }

    let mut output = lines.join("\n");
    output.push('\n');
    output
}

// ========== JSON Output ==========

/// JSON report structure.
#[derive(Debug, Serialize)]
pub struct JsonReport {
    pub calendar: String,
    pub calendar_id: String,
    pub timezone: String,
    pub period: JsonPeriod,
    pub days: Vec<JsonDay>,
    pub totals: JsonTotals,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing: Option<JsonBilling>,
}

#[derive(Debug, Serialize)]
pub struct JsonPeriod {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Serialize)]
pub struct JsonDay {
    pub date: String,
    pub hours: u32,
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct JsonTotals {
    pub hours: u64,
    pub workdays: usize,
}

#[derive(Debug, Serialize)]
pub struct JsonBilling {
    pub rate: f64,
    /// Rounded to cents.
    pub price: f64,
}

/// Formats the report as JSON.
pub fn format_report_json(report: &Report, timezone: &str) -> Result<String> {
    let json = JsonReport {
        calendar: report.calendar.clone(),
        calendar_id: report.calendar_id.clone(),
        timezone: timezone.to_string(),
        period: JsonPeriod {
            start: format_instant(&report.range.start),
            end: format_instant(&report.range.end),
        },
        days: report
            .worklog
            .days
            .iter()
            .map(|day| JsonDay {
                date: day.day.format("%Y-%m-%d").to_string(),
                hours: day.hours,
                description: day.description.clone(),
            })
            .collect(),
        totals: JsonTotals {
            hours: report.worklog.totals.total_hours,
            workdays: report.worklog.totals.workdays,
        },
        billing: report.billing.map(|billing| JsonBilling {
            rate: billing.rate.value(),
            price: (billing.price * 100.0).round() / 100.0,
        }),
    };

    Ok(serde_json::to_string_pretty(&json)?)
}

// ========== Public Interface ==========

/// Builds the request from arguments, falling back to configuration.
pub fn build_request(args: &ReportArgs, config: &Config) -> ReportRequest {
    ReportRequest {
        calendar: args.calendar.clone(),
        start: args.start.clone(),
        end: args.end.clone(),
        hourly_rate: args.rate.or(config.hourly_rate),
        anomaly_policy: args.on_anomaly.unwrap_or(config.on_anomaly),
    }
}

/// Opens a blocking Google Calendar client from configuration.
pub fn open_source(config: &Config) -> Result<BlockingClient> {
    let token = config.require_access_token()?;
    let client = Client::with_options(token, &config.api_base_url, config.request_timeout())
        .context("failed to create Google Calendar client")?;
    BlockingClient::new(client).context("failed to create Google Calendar client")
}

/// Runs the report command.
pub fn run<W: Write>(writer: &mut W, args: &ReportArgs, config: &Config) -> Result<()> {
    let request = build_request(args, config);
    let source = open_source(config)?;

    let report = wl_core::aggregate(&source, &request, Local::now(), &Local)
        .map_err(|err| match err {
            WorklogError::CalendarNotFound { name, available } => {
                let available = if available.is_empty() {
                    "none".to_string()
                } else {
                    available.join(", ")
                };
                anyhow!(
                    "calendar {name:?} not found (available: {available}); \
                     run 'wl calendars' to list names"
                )
            }
            other => anyhow::Error::new(other).context("failed to build worklog"),
        })?;

    if report.stats.anomalies > 0 {
        tracing::warn!(
            count = report.stats.anomalies,
            policy = %request.anomaly_policy,
            "events ended before they started"
        );
    }

    if args.json {
        let timezone = iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string());
        writeln!(writer, "{}", format_report_json(&report, &timezone)?)?;
    } else {
        write!(writer, "{}", format_report(&report))?;
    }

    Ok(())
}
