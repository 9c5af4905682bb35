//! Negotiation history rows generated from autocall result exports.

use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use polars::prelude::DataFrame;
use tracing::info;

use feed_filter::normalize::is_missing;
use feed_ingest::{column_values, filter_rows, has_column, set_string_column, string_column};
use feed_model::{ColumnRef, FeedError};

use crate::mapper::Mapper;
use crate::rules::{DefaultTable, RuleTable};
use crate::transforms::HISTORY_NOTE;

pub const HISTORY_COLUMNS: [&str; 10] = [
    "管理番号",
    "交渉日時",
    "担当",
    "相手",
    "手段",
    "回収ランク",
    "結果",
    "入金予定日",
    "予定金額",
    "交渉備考",
];

pub const HISTORY_LABEL: &str = "オートコール履歴";

const LAST_CALL_DATE: &str = "最終架電日";
const CALL_RESULT: &str = "架電結果";
/// Calls that reached the person are not logged as negotiations.
const CONNECTED: &str = "通話済";

/// The person an autocall batch targeted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HistoryTarget {
    Contract,
    Guarantor,
    Contact,
    Workplace,
}

impl HistoryTarget {
    pub const ALL: [HistoryTarget; 4] = [
        HistoryTarget::Contract,
        HistoryTarget::Guarantor,
        HistoryTarget::Contact,
        HistoryTarget::Workplace,
    ];

    pub fn label(self) -> &'static str {
        match self {
            HistoryTarget::Contract => "契約者",
            HistoryTarget::Guarantor => "保証人",
            HistoryTarget::Contact => "連絡人",
            HistoryTarget::Workplace => "勤務先",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HistoryTarget::Contract => "contract",
            HistoryTarget::Guarantor => "guarantor",
            HistoryTarget::Contact => "contact",
            HistoryTarget::Workplace => "workplace",
        }
    }
}

impl fmt::Display for HistoryTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HistoryTarget {
    type Err = FeedError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "contract" | "契約者" => Ok(HistoryTarget::Contract),
            "guarantor" | "保証人" => Ok(HistoryTarget::Guarantor),
            "contact" | "emergency_contact" | "連絡人" => Ok(HistoryTarget::Contact),
            "workplace" | "勤務先" => Ok(HistoryTarget::Workplace),
            other => Err(FeedError::InvalidConfig(format!(
                "unknown history target: {other} (expected contract, guarantor, contact or workplace)"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AutocallHistoryMapper {
    target: HistoryTarget,
    rules: RuleTable,
    defaults: DefaultTable,
}

impl AutocallHistoryMapper {
    pub fn new(target: HistoryTarget) -> Self {
        Self {
            target,
            rules: RuleTable::from_layout(&HISTORY_COLUMNS)
                .copy("管理番号", "管理番号")
                .copy("交渉日時", LAST_CALL_DATE)
                .constant("相手", target.label())
                .constant("手段", "架電")
                .constant("結果", "その他")
                .transform("交渉備考", HISTORY_NOTE),
            defaults: DefaultTable::new(),
        }
    }

    pub fn target(&self) -> HistoryTarget {
        self.target
    }
}

/// Fills blank cells with the nearest value above; leading blanks stay blank.
pub fn forward_fill(values: &mut [String]) {
    let mut last: Option<String> = None;
    for value in values.iter_mut() {
        if is_missing(value) {
            if let Some(previous) = &last {
                value.clone_from(previous);
            }
        } else {
            last = Some(value.clone());
        }
    }
}

impl Mapper for AutocallHistoryMapper {
    fn name(&self) -> &'static str {
        match self.target {
            HistoryTarget::Contract => "autocall_history_contract",
            HistoryTarget::Guarantor => "autocall_history_guarantor",
            HistoryTarget::Contact => "autocall_history_contact",
            HistoryTarget::Workplace => "autocall_history_workplace",
        }
    }

    fn output_label(&self) -> String {
        HISTORY_LABEL.to_string()
    }

    fn rules(&self) -> &RuleTable {
        &self.rules
    }

    fn defaults(&self) -> &DefaultTable {
        &self.defaults
    }

    /// Forward-fills the last call date, then drops connected calls.
    fn prepare(&self, mut input: DataFrame) -> Result<DataFrame> {
        let before = input.height();
        if has_column(&input, &ColumnRef::name(LAST_CALL_DATE)) {
            let mut dates = string_column(&input, LAST_CALL_DATE)?;
            forward_fill(&mut dates);
            set_string_column(&mut input, LAST_CALL_DATE, dates)?;
        }
        if let Some(results) = column_values(&input, &ColumnRef::name(CALL_RESULT)) {
            let keep: Vec<bool> = results
                .iter()
                .map(|result| result.trim() != CONNECTED)
                .collect();
            filter_rows(&mut input, &keep)?;
        }
        info!(
            history_target = self.target.as_str(),
            before,
            after = input.height(),
            "history rows prepared"
        );
        Ok(input)
    }
}
