//! The 28-column dialer template shared by every autocall family.

use feed_model::contract_list::{self, PhoneTarget, header};
use feed_model::{ColumnRef, Record};

use crate::mapper::Mapper;
use crate::rules::{DefaultTable, RuleTable};

pub const DIALER_COLUMNS: [&str; 28] = [
    "電話番号",
    "架電番号",
    "入居ステータス",
    "滞納ステータス",
    "管理番号",
    "契約者名（カナ）",
    "物件名",
    "クライアント",
    "残債",
    "連番",
    "架電日",
    "架電月",
    "架電番号カウント",
    "通話秒数",
    "ステータス",
    "架電結果",
    "督促状況",
    "商品種別",
    "約束日",
    "入金日",
    "約束金額（税込）",
    "入金金額（税込）",
    "連絡",
    "氏名",
    "履歴数",
    "架電備考",
    "担当者",
    "最終更新日",
];

pub const PHONE: &str = "電話番号";
pub const DIAL_NUMBER: &str = "架電番号";
pub const DUNNING_STATUS: &str = "督促状況";
pub const CLIENT: &str = "クライアント";
pub const BALANCE: &str = "残債";

/// Dialer rules reading the contract list by header name.
pub fn dialer_rules(phone_column: &str) -> RuleTable {
    RuleTable::from_layout(&DIALER_COLUMNS)
        .copy(PHONE, phone_column)
        .copy(DIAL_NUMBER, phone_column)
        .copy("入居ステータス", header::RESIDENCE_STATUS)
        .copy("滞納ステータス", header::DELINQUENT_STATUS)
        .copy("管理番号", header::MANAGEMENT_NO)
        .copy("契約者名（カナ）", header::CONTRACT_KANA)
        .copy("物件名", header::PROPERTY_NAME)
        .copy(CLIENT, header::CLIENT_NAME)
        .copy(BALANCE, header::DEBT_AMOUNT)
}

pub fn dialer_defaults() -> DefaultTable {
    DefaultTable::new().with(DUNNING_STATUS, "TEL")
}

/// Dialer rules reading the contract list by position.
pub fn positional_dialer_rules(target: PhoneTarget) -> RuleTable {
    let phone = ColumnRef::Index(target.mobile_index());
    RuleTable::from_layout(&DIALER_COLUMNS)
        .copy(PHONE, phone.clone())
        .copy(DIAL_NUMBER, phone)
        .copy("入居ステータス", contract_list::RESIDENCE_STATUS)
        .copy("滞納ステータス", contract_list::DELINQUENT_STATUS)
        .copy("管理番号", contract_list::MANAGEMENT_NO)
        .copy("契約者名（カナ）", contract_list::CONTRACT_KANA)
        .copy("物件名", contract_list::PROPERTY_NAME)
        .copy(CLIENT, contract_list::CLIENT_NAME)
        .copy(BALANCE, contract_list::DEBT_AMOUNT)
}

/// Copies the phone number into the dial number when present.
pub(crate) fn mirror_dial_number(output: &mut Record) {
    if let Some(phone) = output.get(PHONE).filter(|phone| !phone.trim().is_empty()) {
        let phone = phone.to_string();
        output.set(DIAL_NUMBER, phone);
    }
}

/// Output of the positional autocall engine: plain copies, nothing else.
#[derive(Debug, Clone)]
pub struct PositionalDialerMapper {
    target: PhoneTarget,
    rules: RuleTable,
    defaults: DefaultTable,
}

impl PositionalDialerMapper {
    pub fn new(target: PhoneTarget) -> Self {
        Self {
            target,
            rules: positional_dialer_rules(target),
            defaults: DefaultTable::new(),
        }
    }
}

impl Mapper for PositionalDialerMapper {
    fn name(&self) -> &'static str {
        "positional_dialer"
    }

    fn output_label(&self) -> String {
        format!("ミライル_{}", self.target.label())
    }

    fn rules(&self) -> &RuleTable {
        &self.rules
    }

    fn defaults(&self) -> &DefaultTable {
        &self.defaults
    }
}
