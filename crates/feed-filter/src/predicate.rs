//! The predicate core shared by the entity filters and the positional engine.
//!
//! A [`Predicate`] evaluates to a keep-mask over the rows of a frame. When a
//! column it needs does not exist the mask is `None` and callers leave the
//! frame untouched.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use chrono::NaiveDate;
use polars::prelude::DataFrame;
use regex::Regex;

use feed_ingest::column_values;
use feed_model::{ColumnRef, DateMode, IdentityRule, Record};

use crate::normalize::{amount_in, amount_label, is_missing, matches_identity, parse_amount, parse_date};

static STRICT_MOBILE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(090|080|070)-\d{4}-\d{4}$").expect("Invalid mobile number regex")
});

/// True when `value` is a hyphenated 090/080/070 mobile number.
pub fn is_strict_mobile(value: &str) -> bool {
    STRICT_MOBILE_REGEX.is_match(value.trim())
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Keep rows whose identity code satisfies the rule.
    Identity { column: ColumnRef, rule: IdentityRule },
    /// Keep rows whose date satisfies the mode, or whose date is absent.
    Date { column: ColumnRef, mode: DateMode },
    /// Drop rows whose category is listed.
    ExcludeCategories {
        column: ColumnRef,
        categories: BTreeSet<String>,
    },
    /// Keep rows with a phone number present.
    RequirePhone { column: ColumnRef },
    /// Drop rows whose amount is listed; absent amounts pass.
    ExcludeAmounts { column: ColumnRef, amounts: Vec<f64> },
    /// Keep rows whose amount is at least `min` and not negative.
    MinimumAmount { column: ColumnRef, min: f64 },
    /// Keep rows holding a strictly formatted mobile number.
    StrictMobile { column: ColumnRef },
    /// Keep rows whose trimmed value equals `value`.
    Equals { column: ColumnRef, value: String },
    /// Drop rows where the code is listed AND the amount is listed.
    Suppression {
        code_column: ColumnRef,
        amount_column: ColumnRef,
        codes: Vec<f64>,
        amounts: Vec<f64>,
    },
}

impl Predicate {
    /// The column a single-column predicate reads.
    pub fn column(&self) -> &ColumnRef {
        match self {
            Predicate::Identity { column, .. }
            | Predicate::Date { column, .. }
            | Predicate::ExcludeCategories { column, .. }
            | Predicate::RequirePhone { column }
            | Predicate::ExcludeAmounts { column, .. }
            | Predicate::MinimumAmount { column, .. }
            | Predicate::StrictMobile { column }
            | Predicate::Equals { column, .. } => column,
            Predicate::Suppression { code_column, .. } => code_column,
        }
    }

    /// Decides one record, reading the same columns the keep-mask reads.
    ///
    /// A record lacking a required column passes, matching the frame-level
    /// no-op.
    pub fn admits(&self, record: &Record, today: NaiveDate) -> bool {
        match self {
            Predicate::Suppression {
                code_column,
                amount_column,
                codes,
                amounts,
            } => match (record.get_ref(code_column), record.get_ref(amount_column)) {
                (Some(code), Some(amount)) => Self::admits_pair(code, amount, codes, amounts),
                _ => true,
            },
            _ => record
                .get_ref(self.column())
                .is_none_or(|value| self.admits_value(value, today)),
        }
    }

    /// Decides one cell of a single-column predicate.
    fn admits_value(&self, value: &str, today: NaiveDate) -> bool {
        match self {
            Predicate::Identity { rule, .. } => matches_identity(rule, Some(value)),
            Predicate::Date { mode, .. } => match parse_date(value) {
                Some(date) => mode.admits(date, today),
                None => true,
            },
            Predicate::ExcludeCategories { categories, .. } => {
                !categories.contains(value.trim())
            }
            Predicate::RequirePhone { .. } => !is_missing(value),
            Predicate::ExcludeAmounts { amounts, .. } => match parse_amount(value) {
                Some(amount) => !amount_in(amount, amounts),
                None => true,
            },
            Predicate::MinimumAmount { min, .. } => match parse_amount(value) {
                Some(amount) => amount >= 0.0 && amount >= *min,
                None => false,
            },
            Predicate::StrictMobile { .. } => is_strict_mobile(value),
            Predicate::Equals { value: expected, .. } => value.trim() == expected.as_str(),
            // Two-cell predicate; callers route it through admits_pair.
            Predicate::Suppression { .. } => true,
        }
    }

    pub fn admits_pair(code: &str, amount: &str, codes: &[f64], amounts: &[f64]) -> bool {
        let code_hit = parse_amount(code).is_some_and(|code| amount_in(code, codes));
        let amount_hit = parse_amount(amount).is_some_and(|amount| amount_in(amount, amounts));
        !(code_hit && amount_hit)
    }

    /// Builds the keep-mask for `df`, or `None` when a required column is absent.
    pub fn keep_mask(&self, df: &DataFrame, today: NaiveDate) -> Option<Vec<bool>> {
        match self {
            Predicate::Suppression {
                code_column,
                amount_column,
                codes,
                amounts,
            } => {
                let code_values = column_values(df, code_column)?;
                let amount_values = column_values(df, amount_column)?;
                Some(
                    code_values
                        .iter()
                        .zip(&amount_values)
                        .map(|(code, amount)| Self::admits_pair(code, amount, codes, amounts))
                        .collect(),
                )
            }
            _ => {
                let values = column_values(df, self.column())?;
                Some(
                    values
                        .iter()
                        .map(|value| self.admits_value(value, today))
                        .collect(),
                )
            }
        }
    }

    /// Human-readable condition for logs.
    pub fn describe(&self) -> String {
        match self {
            Predicate::Identity { rule, .. } => {
                let values: Vec<&str> = rule.allowed.iter().map(String::as_str).collect();
                format!("タイプ: {}, 値: [{}]", rule.mode, values.join(","))
            }
            Predicate::Date { mode, .. } => format!("モード: {}", mode.describe()),
            Predicate::ExcludeCategories { categories, .. } => {
                let values: Vec<&str> = categories.iter().map(String::as_str).collect();
                format!("除外: [{}]", values.join(","))
            }
            Predicate::RequirePhone { column } => format!("列: {column}"),
            Predicate::ExcludeAmounts { amounts, .. } => {
                format!("除外: [{}]", join_amounts(amounts))
            }
            Predicate::MinimumAmount { min, .. } => format!("{}円以上", amount_label(*min)),
            Predicate::StrictMobile { column } => format!("列: {column}, 形式: 0X0-XXXX-XXXX"),
            Predicate::Equals { column, value } => format!("{column} = {value}"),
            Predicate::Suppression {
                code_column,
                amount_column,
                codes,
                amounts,
            } => format!(
                "{code_column} ∈ [{}] かつ {amount_column} ∈ [{}] を除外",
                join_amounts(codes),
                join_amounts(amounts)
            ),
        }
    }
}

fn join_amounts(amounts: &[f64]) -> String {
    amounts
        .iter()
        .map(|amount| amount_label(*amount))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use feed_ingest::string_frame;
    use feed_model::IdentityMode;

    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
    }

    fn test_df(columns: Vec<(&str, Vec<&str>)>) -> DataFrame {
        string_frame(
            columns
                .into_iter()
                .map(|(name, values)| {
                    (
                        name.to_string(),
                        values.into_iter().map(String::from).collect(),
                    )
                })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn amount_exclusion_keeps_absent_and_unlisted() {
        let df = test_df(vec![("入金予定金額", vec!["2", "3", "4", ""])]);
        let predicate = Predicate::ExcludeAmounts {
            column: ColumnRef::name("入金予定金額"),
            amounts: vec![2.0, 3.0, 5.0],
        };
        assert_eq!(
            predicate.keep_mask(&df, today()),
            Some(vec![false, false, true, true])
        );
    }

    #[test]
    fn missing_column_yields_no_mask() {
        let df = test_df(vec![("other", vec!["x"])]);
        let predicate = Predicate::RequirePhone {
            column: ColumnRef::name("TEL携帯"),
        };
        assert_eq!(predicate.keep_mask(&df, today()), None);
        let positional = Predicate::RequirePhone {
            column: ColumnRef::index(27),
        };
        assert_eq!(positional.keep_mask(&df, today()), None);
    }

    #[test]
    fn blank_date_passes_every_mode() {
        let limit = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        for mode in [
            DateMode::BeforeToday,
            DateMode::TodayAndBefore,
            DateMode::TodayIncluded,
            DateMode::BeforeDate(limit),
            DateMode::OnOrBeforeDate(limit),
        ] {
            let predicate = Predicate::Date {
                column: ColumnRef::name("入金予定日"),
                mode,
            };
            assert!(predicate.admits_value("", today()), "{mode:?}");
            assert!(predicate.admits_value("未定", today()), "{mode:?}");
        }
    }

    #[test]
    fn phone_presence_rejects_null_markers() {
        let predicate = Predicate::RequirePhone {
            column: ColumnRef::name("TEL携帯"),
        };
        assert!(predicate.admits_value("090-1234-5678", today()));
        assert!(!predicate.admits_value("  ", today()));
        assert!(!predicate.admits_value("nan", today()));
        assert!(!predicate.admits_value("NaN", today()));
    }

    #[test]
    fn suppression_requires_both_conditions() {
        let codes = [1.0, 4.0];
        let amounts = [10000.0, 11000.0];
        assert!(!Predicate::admits_pair("1", "10,000", &codes, &amounts));
        assert!(!Predicate::admits_pair("4", "11000", &codes, &amounts));
        assert!(Predicate::admits_pair("2", "10000", &codes, &amounts));
        assert!(Predicate::admits_pair("1", "9999", &codes, &amounts));
        assert!(Predicate::admits_pair("", "10000", &codes, &amounts));
    }

    #[test]
    fn minimum_amount_excludes_blank_and_negative() {
        let predicate = Predicate::MinimumAmount {
            column: ColumnRef::index(71),
            min: 1.0,
        };
        assert!(predicate.admits_value("1", today()));
        assert!(predicate.admits_value("12,500", today()));
        assert!(!predicate.admits_value("0", today()));
        assert!(!predicate.admits_value("-100", today()));
        assert!(!predicate.admits_value("", today()));
        assert!(!predicate.admits_value("nan", today()));
        assert!(!predicate.admits_value("不明", today()));
    }

    #[test]
    fn strict_mobile_requires_hyphenated_mobile_prefix() {
        assert!(is_strict_mobile("090-1234-5678"));
        assert!(is_strict_mobile("070-0000-1111"));
        assert!(!is_strict_mobile("09012345678"));
        assert!(!is_strict_mobile("03-1234-5678"));
        assert!(!is_strict_mobile("050-1234-5678"));
    }

    #[test]
    fn identity_description_lists_values() {
        let predicate = Predicate::Identity {
            column: ColumnRef::name("委託先法人ID"),
            rule: IdentityRule::new(IdentityMode::Mixed, ["", "5"]),
        };
        assert_eq!(predicate.describe(), "タイプ: mixed, 値: [,5]");
    }

    #[test]
    fn record_suppression_reads_both_columns() {
        let predicate = Predicate::Suppression {
            code_column: ColumnRef::name("クライアントCD"),
            amount_column: ColumnRef::name("滞納残債"),
            codes: vec![1.0, 4.0],
            amounts: vec![10000.0, 11000.0],
        };
        let suppressed = Record::from_pairs([("クライアントCD", "1"), ("滞納残債", "10,000")]);
        let other_code = Record::from_pairs([("クライアントCD", "2"), ("滞納残債", "10000")]);
        let no_amount = Record::from_pairs([("クライアントCD", "1")]);
        assert!(!predicate.admits(&suppressed, today()));
        assert!(predicate.admits(&other_code, today()));
        assert!(predicate.admits(&no_amount, today()));
    }

    #[test]
    fn record_verdict_matches_keep_mask() {
        let df = test_df(vec![
            ("TEL携帯", vec!["090-1", "", "nan"]),
            ("クライアントCD", vec!["4", "4", "3"]),
            ("滞納残債", vec!["11000", "5", "11000"]),
        ]);
        let predicates = [
            Predicate::RequirePhone {
                column: ColumnRef::name("TEL携帯"),
            },
            Predicate::Suppression {
                code_column: ColumnRef::name("クライアントCD"),
                amount_column: ColumnRef::name("滞納残債"),
                codes: vec![1.0, 4.0],
                amounts: vec![10000.0, 11000.0],
            },
        ];
        let rows = feed_ingest::records(&df);
        for predicate in &predicates {
            let mask = predicate.keep_mask(&df, today()).unwrap();
            let per_record: Vec<bool> = rows
                .iter()
                .map(|record| predicate.admits(record, today()))
                .collect();
            assert_eq!(per_record, mask, "{predicate:?}");
        }
    }
}
