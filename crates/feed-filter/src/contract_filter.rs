//! Name-addressed contract filters.
//!
//! [`ContractFilter`] is the template every entity filter follows: the five
//! common predicates run first in a fixed order, then the entity hook adds
//! whatever extra rules that entity needs. The five predicates are also
//! exposed as free functions so a caller can compose them individually.

use std::collections::BTreeSet;

use anyhow::Result;
use chrono::NaiveDate;
use polars::prelude::DataFrame;
use tracing::{debug, info};

use feed_ingest::filter_rows;
use feed_model::contract_list::header;
use feed_model::{ColumnRef, DateMode, FilterConfig, IdentityRule};

use crate::predicate::Predicate;
use crate::report::{FilterReport, StageCount};

pub const IDENTITY_LABEL: &str = "委託先法人ID";
pub const DATE_LABEL: &str = "入金予定日";
pub const CATEGORY_LABEL: &str = "回収ランク";
pub const PHONE_LABEL: &str = "電話番号必須";
pub const AMOUNT_LABEL: &str = "入金予定金額";

/// Per-invocation state threaded through every stage.
#[derive(Debug, Clone)]
pub struct FilterRun {
    /// Run date, fixed once so every stage compares against the same day.
    pub today: NaiveDate,
    pub report: Option<FilterReport>,
}

impl FilterRun {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            report: None,
        }
    }

    pub fn with_report(today: NaiveDate) -> Self {
        Self {
            today,
            report: Some(FilterReport::new()),
        }
    }

    pub fn into_report(self) -> Option<FilterReport> {
        self.report
    }
}

/// Applies one predicate and records the stage.
///
/// A predicate whose column is missing leaves `df` unchanged.
pub fn apply_predicate(
    df: &mut DataFrame,
    predicate: &Predicate,
    label: &str,
    run: &mut FilterRun,
) -> Result<()> {
    let before = df.height();
    let applied = match predicate.keep_mask(df, run.today) {
        Some(keep) => {
            filter_rows(df, &keep)?;
            true
        }
        None => {
            debug!(stage = label, column = %predicate.column(), "column missing, stage skipped");
            false
        }
    };
    let after = df.height();
    let condition = predicate.describe();
    info!(
        stage = label,
        before,
        after,
        excluded = before - after,
        condition = %condition,
        "filter applied"
    );
    if let Some(report) = run.report.as_mut() {
        report.record(StageCount {
            label: label.to_string(),
            condition,
            before,
            after,
            applied,
        });
    }
    Ok(())
}

pub fn identity_filter(df: &mut DataFrame, rule: &IdentityRule, run: &mut FilterRun) -> Result<()> {
    let predicate = Predicate::Identity {
        column: ColumnRef::name(header::TRUSTEE_ID),
        rule: rule.clone(),
    };
    apply_predicate(df, &predicate, IDENTITY_LABEL, run)
}

pub fn date_filter(df: &mut DataFrame, mode: DateMode, run: &mut FilterRun) -> Result<()> {
    let predicate = Predicate::Date {
        column: ColumnRef::name(header::PAYMENT_DATE),
        mode,
    };
    apply_predicate(df, &predicate, DATE_LABEL, run)
}

pub fn category_filter(
    df: &mut DataFrame,
    categories: &BTreeSet<String>,
    run: &mut FilterRun,
) -> Result<()> {
    let predicate = Predicate::ExcludeCategories {
        column: ColumnRef::name(header::COLLECTION_RANK),
        categories: categories.clone(),
    };
    apply_predicate(df, &predicate, CATEGORY_LABEL, run)
}

pub fn phone_filter(df: &mut DataFrame, column: &ColumnRef, run: &mut FilterRun) -> Result<()> {
    let predicate = Predicate::RequirePhone {
        column: column.clone(),
    };
    apply_predicate(df, &predicate, PHONE_LABEL, run)
}

pub fn amount_filter(df: &mut DataFrame, amounts: &[f64], run: &mut FilterRun) -> Result<()> {
    let predicate = Predicate::ExcludeAmounts {
        column: ColumnRef::name(header::PAYMENT_AMOUNT),
        amounts: amounts.to_vec(),
    };
    apply_predicate(df, &predicate, AMOUNT_LABEL, run)
}

/// The five common predicates for `config`, in application order.
pub fn common_predicates(config: &FilterConfig) -> Vec<(&'static str, Predicate)> {
    vec![
        (
            IDENTITY_LABEL,
            Predicate::Identity {
                column: ColumnRef::name(header::TRUSTEE_ID),
                rule: config.identity.clone(),
            },
        ),
        (
            DATE_LABEL,
            Predicate::Date {
                column: ColumnRef::name(header::PAYMENT_DATE),
                mode: config.date_mode,
            },
        ),
        (
            CATEGORY_LABEL,
            Predicate::ExcludeCategories {
                column: ColumnRef::name(header::COLLECTION_RANK),
                categories: config.excluded_categories.clone(),
            },
        ),
        (
            PHONE_LABEL,
            Predicate::RequirePhone {
                column: config.required_phone_column.clone(),
            },
        ),
        (
            AMOUNT_LABEL,
            Predicate::ExcludeAmounts {
                column: ColumnRef::name(header::PAYMENT_AMOUNT),
                amounts: config.excluded_amounts.clone(),
            },
        ),
    ]
}

/// Runs the five common predicates in their fixed order: identity, date,
/// category, phone presence, amount.
pub fn apply_common_filters(
    config: &FilterConfig,
    df: &mut DataFrame,
    run: &mut FilterRun,
) -> Result<()> {
    identity_filter(df, &config.identity, run)?;
    date_filter(df, config.date_mode, run)?;
    category_filter(df, &config.excluded_categories, run)?;
    phone_filter(df, &config.required_phone_column, run)?;
    amount_filter(df, &config.excluded_amounts, run)?;
    Ok(())
}

/// A contract filter for one entity and role.
///
/// Implementors supply their configuration and, optionally, extra rules
/// through [`ContractFilter::apply_entity_filters`]. The common stage is the
/// free function [`apply_common_filters`], so its order is the same for
/// every entity.
///
/// # Example
///
/// ```ignore
/// let filter = registry.create("mirail", "contract", &FilterOverrides::default())?;
/// let mut run = FilterRun::with_report(today);
/// filter.apply_all_filters(&mut df, &mut run)?;
/// ```
pub trait ContractFilter: Send + Sync {
    /// Entity name this filter belongs to (e.g., "mirail").
    fn entity(&self) -> &'static str;

    fn config(&self) -> &FilterConfig;

    /// Entity-only rules, run after the common filters. Defaults to none.
    fn apply_entity_filters(&self, _df: &mut DataFrame, _run: &mut FilterRun) -> Result<()> {
        Ok(())
    }

    fn apply_all_filters(&self, df: &mut DataFrame, run: &mut FilterRun) -> Result<()> {
        let initial = df.height();
        apply_common_filters(self.config(), df, run)?;
        self.apply_entity_filters(df, run)?;
        info!(
            entity = self.entity(),
            initial,
            remaining = df.height(),
            "contract filters complete"
        );
        Ok(())
    }
}
