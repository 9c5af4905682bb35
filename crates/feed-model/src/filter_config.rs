//! Per-run filter configuration.

use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::record::ColumnRef;

/// How the trustee identity column is compared against the allowed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityMode {
    /// Parse as a number and test membership; unparseable values fail.
    Numeric,
    /// Compare trimmed text.
    String,
    /// Compare trimmed text; blank or absent always passes.
    Mixed,
}

impl fmt::Display for IdentityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IdentityMode::Numeric => "numeric",
            IdentityMode::String => "string",
            IdentityMode::Mixed => "mixed",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRule {
    pub mode: IdentityMode,
    pub allowed: BTreeSet<String>,
}

impl IdentityRule {
    pub fn new<I, S>(mode: IdentityMode, allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            mode,
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }
}

/// Which payment dates survive the date filter. Blank dates always pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateMode {
    BeforeToday,
    TodayAndBefore,
    TodayIncluded,
    BeforeDate(NaiveDate),
    OnOrBeforeDate(NaiveDate),
}

impl DateMode {
    /// Returns whether `date` passes, given the run date.
    pub fn admits(self, date: NaiveDate, today: NaiveDate) -> bool {
        match self {
            DateMode::BeforeToday => date < today,
            DateMode::TodayAndBefore | DateMode::TodayIncluded => date <= today,
            DateMode::BeforeDate(limit) => date < limit,
            DateMode::OnOrBeforeDate(limit) => date <= limit,
        }
    }

    pub fn describe(self) -> String {
        match self {
            DateMode::BeforeToday => "前日以前".to_string(),
            DateMode::TodayAndBefore | DateMode::TodayIncluded => "当日以前".to_string(),
            DateMode::BeforeDate(limit) => format!("{}より前", limit.format("%Y/%m/%d")),
            DateMode::OnOrBeforeDate(limit) => format!("{}以前", limit.format("%Y/%m/%d")),
        }
    }
}

/// Thresholds for the five common contract filters.
///
/// Built once per pipeline invocation and not mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    pub identity: IdentityRule,
    pub date_mode: DateMode,
    pub excluded_categories: BTreeSet<String>,
    pub required_phone_column: ColumnRef,
    pub excluded_amounts: Vec<f64>,
}

impl FilterConfig {
    pub fn excludes_amount(&self, amount: f64) -> bool {
        self.excluded_amounts.iter().any(|excluded| *excluded == amount)
    }
}
