//! Pricing a worklog at an hourly rate.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::WorklogError;
use crate::worklog::PeriodTotals;

/// A finite, non-negative hourly rate.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct HourlyRate(f64);

impl HourlyRate {
    /// Creates a rate after validation.
    pub fn new(value: f64) -> Result<Self, WorklogError> {
        if value.is_finite() && value >= 0.0 {
            Ok(Self(value))
        } else {
            Err(WorklogError::InvalidRate {
                value: value.to_string(),
            })
        }
    }

    pub const fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for HourlyRate {
    type Error = WorklogError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<HourlyRate> for f64 {
    fn from(rate: HourlyRate) -> Self {
        rate.0
    }
}

impl FromStr for HourlyRate {
    type Err = WorklogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: f64 = s.trim().parse().map_err(|_| WorklogError::InvalidRate {
            value: s.to_string(),
        })?;
        Self::new(value)
    }
}

impl fmt::Display for HourlyRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Price of a period at a given rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Billing {
    pub rate: HourlyRate,
    /// Unrounded `total_hours * rate`; round only for display.
    pub price: f64,
}

/// Prices the period, or returns `None` when no rate was supplied.
#[allow(clippy::cast_precision_loss)]
pub fn price(totals: &PeriodTotals, rate: Option<HourlyRate>) -> Option<Billing> {
    rate.map(|rate| Billing {
        rate,
        price: totals.total_hours as f64 * rate.value(),
    })
}
