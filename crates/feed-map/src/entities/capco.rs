//! Capco registration and balance-update templates.

use feed_model::Record;

use crate::entities::registration::{
    HOME_PHONE, REGISTRATION_COLUMNS, strip_phone_punctuation, truncate_amount_fields,
};
use crate::mapper::{Mapper, MapperContext};
use crate::rules::{DefaultTable, RuleTable};
use crate::transforms::{CAPCO_MOBILE, DEBT_DIFFERENCE};

/// Capco's trustee id in the registration template.
pub const CAPCO_TRUSTEE_ID: &str = "7";

/// Same-named columns copied straight from the Capco export.
const DIRECT_COPIES: [&str; 28] = [
    "契約者氏名",
    "契約者カナ",
    "契約者生年月日",
    "契約者TEL自宅",
    "契約者現住所郵便番号",
    "契約者現住所1",
    "契約者現住所2",
    "契約者現住所3",
    "物件名",
    "部屋番号",
    "物件住所郵便番号",
    "物件住所1",
    "物件住所2",
    "物件住所3",
    "入居ステータス",
    "滞納ステータス",
    "受託状況",
    "月額賃料",
    "管理費",
    "共益費",
    "水道代",
    "駐車場代",
    "その他費用1",
    "その他費用2",
    "敷金",
    "礼金",
    "契約者勤務先名",
    "契約者勤務先TEL",
];

#[derive(Debug, Clone)]
pub struct CapcoRegistrationMapper {
    rules: RuleTable,
    defaults: DefaultTable,
}

impl CapcoRegistrationMapper {
    pub fn new() -> Self {
        let mut rules = RuleTable::from_layout(&REGISTRATION_COLUMNS)
            .copy("引継番号", "契約番号")
            .copy("管理会社", "管理会社名")
            .transform("契約者TEL携帯", CAPCO_MOBILE)
            .constant("委託先法人ID", CAPCO_TRUSTEE_ID)
            .constant("登録フラグ", "1");
        for field in DIRECT_COPIES {
            rules = rules.copy(field, field);
        }
        Self {
            rules,
            defaults: DefaultTable::new().with("管理前滞納額", "0"),
        }
    }
}

impl Default for CapcoRegistrationMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl Mapper for CapcoRegistrationMapper {
    fn name(&self) -> &'static str {
        "capco_registration"
    }

    fn output_label(&self) -> String {
        "カプコ_新規登録".to_string()
    }

    fn rules(&self) -> &RuleTable {
        &self.rules
    }

    fn defaults(&self) -> &DefaultTable {
        &self.defaults
    }

    /// Strips punctuation from the home phone and truncates amounts to yen.
    fn apply_custom_rules(&self, output: &mut Record, _input: &Record) {
        strip_phone_punctuation(output, HOME_PHONE);
        truncate_amount_fields(output);
    }
}

pub const DEBT_UPDATE_COLUMNS: [&str; 8] = [
    "契約番号",
    "現在残債",
    "更新後残債",
    "差分金額",
    "更新理由",
    "更新日",
    "更新担当者",
    "処理ステータス",
];

/// Balance updates stamped with the run timestamp.
#[derive(Debug, Clone)]
pub struct CapcoDebtUpdateMapper {
    updated_at: String,
    rules: RuleTable,
    defaults: DefaultTable,
}

impl CapcoDebtUpdateMapper {
    pub fn new(context: &MapperContext) -> Self {
        let updated_at = context.run_timestamp();
        Self {
            rules: RuleTable::from_layout(&DEBT_UPDATE_COLUMNS)
                .copy("契約番号", "契約番号")
                .copy("現在残債", "現在残債")
                .copy("更新後残債", "更新後残債")
                .transform("差分金額", DEBT_DIFFERENCE)
                .copy("更新理由", "更新理由")
                .constant("更新日", updated_at.clone())
                .constant("処理ステータス", "完了"),
            defaults: DefaultTable::new(),
            updated_at,
        }
    }

    pub fn updated_at(&self) -> &str {
        &self.updated_at
    }
}

impl Mapper for CapcoDebtUpdateMapper {
    fn name(&self) -> &'static str {
        "capco_debt_update"
    }

    fn output_label(&self) -> String {
        "カプコ_残債更新".to_string()
    }

    fn rules(&self) -> &RuleTable {
        &self.rules
    }

    fn defaults(&self) -> &DefaultTable {
        &self.defaults
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn registration_layout_has_three_blank_columns_before_flag() {
        let mapper = CapcoRegistrationMapper::new();
        let headers = mapper.rules().headers();
        assert_eq!(headers.len(), 111);
        assert_eq!(headers[107..], ["__blank_1", "__blank_2", "__blank_3", "登録フラグ"]);
    }

    #[test]
    fn registration_cleans_phones_and_amounts() {
        let input = Record::from_pairs([
            ("契約番号", "C-001"),
            ("契約者：電話番号", "娘080-6868-0817"),
            ("契約者TEL自宅", "(03) 1234-5678"),
            ("月額賃料", "65000.9"),
            ("敷金", "不明"),
        ]);
        let output = CapcoRegistrationMapper::new().map_one(&input);
        assert_eq!(output.get("引継番号"), Some("C-001"));
        assert_eq!(output.get("契約者TEL携帯"), Some("080-6868-0817"));
        assert_eq!(output.get("契約者TEL自宅"), Some("0312345678"));
        assert_eq!(output.get("月額賃料"), Some("65000"));
        assert_eq!(output.get("敷金"), Some("不明"));
        assert_eq!(output.get("管理前滞納額"), Some("0"));
        assert_eq!(output.get("委託先法人ID"), Some("7"));
        assert_eq!(output.get("登録フラグ"), Some("1"));
        assert_eq!(output.len(), 111);
    }

    #[test]
    fn debt_update_uses_context_timestamp() {
        let run_at = NaiveDate::from_ymd_opt(2024, 6, 10)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        let mapper = CapcoDebtUpdateMapper::new(&MapperContext::new(run_at));
        let input = Record::from_pairs([
            ("契約番号", "C-9"),
            ("現在残債", "12000"),
            ("更新後残債", "10000"),
            ("更新理由", "入金"),
        ]);
        let output = mapper.map_one(&input);
        assert_eq!(
            output.iter().collect::<Vec<_>>(),
            vec![
                ("契約番号", "C-9"),
                ("現在残債", "12000"),
                ("更新後残債", "10000"),
                ("差分金額", "-2000"),
                ("更新理由", "入金"),
                ("更新日", "2024-06-10 09:30:00"),
                ("更新担当者", ""),
                ("処理ステータス", "完了"),
            ]
        );
    }
}
