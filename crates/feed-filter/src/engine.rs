//! Position-addressed filter engine.
//!
//! The engine runs an ordered list of [`EngineStep`]s against a contract list
//! whose columns are addressed by index. Every step is backed by the same
//! [`Predicate`] core as the name-addressed filters; what the engine adds is
//! caller-controlled ordering and an [`EngineReport`] that records, for every
//! step, what was excluded and why.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use feed_ingest::{column_values, filter_rows};
use feed_model::contract_list::{self, PhoneTarget};
use feed_model::{ColumnRef, DateMode, IdentityMode, IdentityRule};

use crate::entities::mirail::{DEBT_EXCLUSION_LABEL, SUPPRESSED_CLIENT_CODES, SUPPRESSED_DEBT_AMOUNTS};
use crate::normalize::{amount_label, is_missing, parse_amount, parse_date};
use crate::predicate::Predicate;

const DEFAULT_TOP_N: usize = 3;

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

fn default_identity_mode() -> IdentityMode {
    IdentityMode::Mixed
}

/// One engine stage: a log label plus the filter it applies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineStep {
    pub label: String,
    pub filter: StepKind,
}

impl EngineStep {
    pub fn new(label: impl Into<String>, filter: StepKind) -> Self {
        Self {
            label: label.into(),
            filter,
        }
    }

    /// Label used in the `フィルタ後` line.
    pub fn result_label(&self) -> String {
        match &self.filter {
            StepKind::TrusteeId { allowed, .. } => {
                let values: Vec<&str> = allowed
                    .iter()
                    .map(|value| if value.is_empty() { "空白" } else { value.as_str() })
                    .collect();
                format!("{}（{}）", self.label, values.join(","))
            }
            StepKind::Arrears { min_amount, .. } => {
                format!("{}（{}円以上）", self.label, amount_label(*min_amount))
            }
            _ => self.label.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepKind {
    TrusteeId {
        column: usize,
        #[serde(default = "default_identity_mode")]
        mode: IdentityMode,
        allowed: Vec<String>,
    },
    PaymentDate {
        column: usize,
        mode: DateMode,
        #[serde(default = "default_top_n")]
        top_n: usize,
    },
    CollectionRank {
        column: usize,
        excluded: Vec<String>,
    },
    MobilePhone {
        column: usize,
        #[serde(default)]
        strict: bool,
    },
    PaymentAmount {
        column: usize,
        excluded: Vec<f64>,
    },
    Arrears {
        column: usize,
        min_amount: f64,
    },
    SpecialDebt {
        client_column: usize,
        amount_column: usize,
        client_codes: Vec<f64>,
        amounts: Vec<f64>,
    },
}

impl StepKind {
    pub fn predicate(&self) -> Predicate {
        match self {
            StepKind::TrusteeId {
                column,
                mode,
                allowed,
            } => Predicate::Identity {
                column: ColumnRef::Index(*column),
                rule: IdentityRule::new(*mode, allowed.iter().cloned()),
            },
            StepKind::PaymentDate { column, mode, .. } => Predicate::Date {
                column: ColumnRef::Index(*column),
                mode: *mode,
            },
            StepKind::CollectionRank { column, excluded } => Predicate::ExcludeCategories {
                column: ColumnRef::Index(*column),
                categories: excluded.iter().cloned().collect(),
            },
            StepKind::MobilePhone { column, strict } => {
                if *strict {
                    Predicate::StrictMobile {
                        column: ColumnRef::Index(*column),
                    }
                } else {
                    Predicate::RequirePhone {
                        column: ColumnRef::Index(*column),
                    }
                }
            }
            StepKind::PaymentAmount { column, excluded } => Predicate::ExcludeAmounts {
                column: ColumnRef::Index(*column),
                amounts: excluded.clone(),
            },
            StepKind::Arrears { column, min_amount } => Predicate::MinimumAmount {
                column: ColumnRef::Index(*column),
                min: *min_amount,
            },
            StepKind::SpecialDebt {
                client_column,
                amount_column,
                client_codes,
                amounts,
            } => Predicate::Suppression {
                code_column: ColumnRef::Index(*client_column),
                amount_column: ColumnRef::Index(*amount_column),
                codes: client_codes.clone(),
                amounts: amounts.clone(),
            },
        }
    }

    /// Summarises the rows about to be dropped (`keep[i] == false`).
    fn exclusion_detail(&self, df: &DataFrame, keep: &[bool]) -> Option<ExclusionDetail> {
        let excluded_values = |column: usize| -> Vec<String> {
            column_values(df, &ColumnRef::Index(column))
                .unwrap_or_default()
                .into_iter()
                .zip(keep)
                .filter(|(_, kept)| !**kept)
                .map(|(value, _)| value)
                .collect()
        };
        if keep.iter().all(|kept| *kept) {
            return None;
        }
        let detail = match self {
            StepKind::TrusteeId { column, .. } => ExclusionDetail::Counts(count_labels(
                excluded_values(*column).iter().map(|value| identity_label(value)),
            )),
            StepKind::PaymentDate { column, top_n, .. } => {
                let values = excluded_values(*column);
                let total = values.len();
                let mut counts = count_labels(values.iter().map(|value| match parse_date(value) {
                    Some(date) => date.format("%Y/%m/%d").to_string(),
                    None => value.trim().to_string(),
                }));
                counts.truncate(*top_n);
                let shown: usize = counts.iter().map(|(_, count)| count).sum();
                ExclusionDetail::TopDates {
                    top_n: *top_n,
                    dates: counts,
                    remaining: total - shown,
                }
            }
            StepKind::CollectionRank { column, .. } => ExclusionDetail::Counts(count_labels(
                excluded_values(*column)
                    .iter()
                    .map(|value| value.trim().to_string()),
            )),
            StepKind::MobilePhone { column, .. } => {
                let values = excluded_values(*column);
                let blank = values.iter().filter(|value| is_missing(value)).count();
                ExclusionDetail::Phone {
                    blank,
                    other: values.len() - blank,
                }
            }
            StepKind::PaymentAmount { column, .. } | StepKind::Arrears { column, .. } => {
                ExclusionDetail::Counts(count_labels(
                    excluded_values(*column).iter().map(|value| amount_key(value)),
                ))
            }
            StepKind::SpecialDebt {
                client_column,
                amount_column,
                ..
            } => {
                let codes = excluded_values(*client_column);
                let amounts = excluded_values(*amount_column);
                ExclusionDetail::Counts(count_labels(codes.iter().zip(&amounts).map(
                    |(code, amount)| {
                        let code = parse_amount(code)
                            .map(amount_label)
                            .unwrap_or_else(|| code.trim().to_string());
                        let amount = parse_amount(amount)
                            .map(amount_label)
                            .unwrap_or_else(|| amount.trim().to_string());
                        format!("CD={code}, {amount}円")
                    },
                )))
            }
        };
        Some(detail)
    }
}

fn identity_label(value: &str) -> String {
    if is_missing(value) {
        return "空白".to_string();
    }
    match parse_amount(value) {
        Some(number) if number.fract() == 0.0 => amount_label(number),
        _ => value.trim().to_string(),
    }
}

fn amount_key(value: &str) -> String {
    match parse_amount(value) {
        Some(amount) => format!("{}円", amount_label(amount)),
        None if is_missing(value) => "空白".to_string(),
        None => value.trim().to_string(),
    }
}

/// Counts labels, most frequent first, ties by label.
fn count_labels(labels: impl Iterator<Item = String>) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for label in labels {
        *counts.entry(label).or_default() += 1;
    }
    let mut counts: Vec<(String, usize)> = counts.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counts
}

fn render_counts(counts: &[(String, usize)]) -> String {
    let entries: Vec<String> = counts
        .iter()
        .map(|(label, count)| format!("{label}: {count}件"))
        .collect();
    format!("{{{}}}", entries.join(", "))
}

/// What a step excluded, grouped for logging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ExclusionDetail {
    Counts(Vec<(String, usize)>),
    Phone {
        blank: usize,
        other: usize,
    },
    TopDates {
        top_n: usize,
        dates: Vec<(String, usize)>,
        remaining: usize,
    },
}

impl ExclusionDetail {
    pub fn lines(&self, label: &str) -> Vec<String> {
        match self {
            ExclusionDetail::Counts(counts) => {
                vec![format!("{label}除外詳細: {}", render_counts(counts))]
            }
            ExclusionDetail::Phone { blank, other } => vec![format!(
                "{label}除外詳細: {{空白/NaN: {blank}件, 固定電話等: {other}件}}"
            )],
            ExclusionDetail::TopDates {
                top_n,
                dates,
                remaining,
            } => {
                let mut lines = vec![format!(
                    "{label}除外詳細（上位{top_n}件）: {}",
                    render_counts(dates)
                )];
                if *remaining > 0 {
                    lines.push(format!("  ※他{remaining}件の日付も除外"));
                }
                lines
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepOutcome {
    pub label: String,
    pub result_label: String,
    pub before: usize,
    pub after: usize,
    /// False when a column the step needs was missing.
    pub applied: bool,
    pub detail: Option<ExclusionDetail>,
}

impl StepOutcome {
    pub fn excluded(&self) -> usize {
        self.before.saturating_sub(self.after)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineReport {
    pub initial: usize,
    pub steps: Vec<StepOutcome>,
    pub final_count: usize,
}

impl EngineReport {
    pub fn counts(&self) -> Vec<(usize, usize)> {
        self.steps
            .iter()
            .map(|step| (step.before, step.after))
            .collect()
    }

    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![format!("元データ読み込み: {}件", self.initial)];
        for step in &self.steps {
            if let Some(detail) = &step.detail {
                lines.extend(detail.lines(&step.label));
            }
            lines.push(format!(
                "{}フィルタ後: {}件 (除外: {}件)",
                step.result_label,
                step.after,
                step.excluded()
            ));
        }
        lines.push(format!("最終処理結果: {}件", self.final_count));
        lines
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterEngine {
    steps: Vec<EngineStep>,
}

impl FilterEngine {
    pub fn new(steps: Vec<EngineStep>) -> Self {
        Self { steps }
    }

    /// Parses a JSON array of steps.
    pub fn from_json(json: &str) -> Result<Self> {
        let steps: Vec<EngineStep> =
            serde_json::from_str(json).context("parse filter engine steps")?;
        Ok(Self::new(steps))
    }

    /// Mirail unified autocall ordering for one phone target.
    pub fn mirail_autocall(target: PhoneTarget, without_10k: bool) -> Self {
        Self::new(mirail_autocall_steps(target, without_10k))
    }

    pub fn steps(&self) -> &[EngineStep] {
        &self.steps
    }

    /// Applies every step in order, shrinking `df` in place.
    pub fn apply(&self, df: &mut DataFrame, today: NaiveDate) -> Result<EngineReport> {
        let initial = df.height();
        info!(rows = initial, "元データ読み込み");
        let mut steps = Vec::with_capacity(self.steps.len());
        for step in &self.steps {
            let before = df.height();
            let predicate = step.filter.predicate();
            let (applied, detail) = match predicate.keep_mask(df, today) {
                Some(keep) => {
                    let detail = step.filter.exclusion_detail(df, &keep);
                    filter_rows(df, &keep)
                        .with_context(|| format!("apply filter step {}", step.label))?;
                    (true, detail)
                }
                None => {
                    debug!(step = %step.label, column = %predicate.column(), "column missing, step skipped");
                    (false, None)
                }
            };
            let after = df.height();
            if let Some(detail) = &detail {
                for line in detail.lines(&step.label) {
                    info!(step = %step.label, "{line}");
                }
            }
            info!(
                step = %step.label,
                before,
                after,
                excluded = before - after,
                "filter step applied"
            );
            steps.push(StepOutcome {
                label: step.label.clone(),
                result_label: step.result_label(),
                before,
                after,
                applied,
                detail,
            });
        }
        let final_count = df.height();
        info!(rows = final_count, "最終処理結果");
        Ok(EngineReport {
            initial,
            steps,
            final_count,
        })
    }
}

/// Steps for the Mirail autocall lists.
///
/// `without_10k` appends the client-code and balance suppression that drops
/// fixed-fee 10,000 and 11,000 yen balances.
pub fn mirail_autocall_steps(target: PhoneTarget, without_10k: bool) -> Vec<EngineStep> {
    let mut steps = vec![
        EngineStep::new(
            "委託先法人ID",
            StepKind::TrusteeId {
                column: contract_list::TRUSTEE_ID,
                mode: IdentityMode::Mixed,
                allowed: vec![String::new(), "5".to_string()],
            },
        ),
        EngineStep::new(
            "入金予定日",
            StepKind::PaymentDate {
                column: contract_list::PAYMENT_DATE,
                mode: DateMode::BeforeToday,
                top_n: DEFAULT_TOP_N,
            },
        ),
        EngineStep::new(
            "回収ランク",
            StepKind::CollectionRank {
                column: contract_list::COLLECTION_RANK,
                excluded: vec!["弁護士介入".to_string()],
            },
        ),
        EngineStep::new(
            "滞納残債",
            StepKind::Arrears {
                column: contract_list::DEBT_AMOUNT,
                min_amount: 1.0,
            },
        ),
        EngineStep::new(
            format!("{}電話", target.label()),
            StepKind::MobilePhone {
                column: target.mobile_index(),
                strict: false,
            },
        ),
        EngineStep::new(
            "除外金額",
            StepKind::PaymentAmount {
                column: contract_list::PAYMENT_AMOUNT,
                excluded: vec![2.0, 3.0, 5.0, 12.0],
            },
        ),
    ];
    if without_10k {
        steps.push(EngineStep::new(
            DEBT_EXCLUSION_LABEL,
            StepKind::SpecialDebt {
                client_column: contract_list::CLIENT_CD,
                amount_column: contract_list::DEBT_AMOUNT,
                client_codes: SUPPRESSED_CLIENT_CODES.to_vec(),
                amounts: SUPPRESSED_DEBT_AMOUNTS.to_vec(),
            },
        ));
    }
    steps
}
