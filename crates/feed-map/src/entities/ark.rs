//! Ark registration and late-payment templates.

use std::fmt;
use std::str::FromStr;

use feed_model::{FeedError, Record};

use crate::entities::registration::{
    HOME_PHONE, MOBILE_PHONE, REGISTRATION_COLUMNS, strip_phone_punctuation,
    truncate_amount_fields,
};
use crate::mapper::{Mapper, MapperContext};
use crate::rules::{DefaultTable, RuleTable};
use crate::transforms::{ARK_ARREARS_DIFFERENCE, ARK_MANAGEMENT_COMPANY};

/// Ark's trustee id in the registration template.
pub const ARK_TRUSTEE_ID: &str = "5";

/// Branch an Ark registration batch comes from. Its code fills 更新契約手数料.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ArkRegion {
    #[default]
    Tokyo,
    Osaka,
    Hokkaido,
    KitaKanto,
}

impl ArkRegion {
    pub const ALL: [ArkRegion; 4] = [
        ArkRegion::Tokyo,
        ArkRegion::Osaka,
        ArkRegion::Hokkaido,
        ArkRegion::KitaKanto,
    ];

    pub fn code(self) -> u8 {
        match self {
            ArkRegion::Tokyo => 1,
            ArkRegion::Osaka => 2,
            ArkRegion::Hokkaido => 3,
            ArkRegion::KitaKanto => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ArkRegion::Tokyo => "東京",
            ArkRegion::Osaka => "大阪",
            ArkRegion::Hokkaido => "北海道",
            ArkRegion::KitaKanto => "北関東",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ArkRegion::Tokyo => "tokyo",
            ArkRegion::Osaka => "osaka",
            ArkRegion::Hokkaido => "hokkaido",
            ArkRegion::KitaKanto => "kita_kanto",
        }
    }
}

impl fmt::Display for ArkRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArkRegion {
    type Err = FeedError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        ArkRegion::ALL
            .into_iter()
            .find(|region| {
                value == region.code().to_string()
                    || value.eq_ignore_ascii_case(region.as_str())
                    || value == region.label()
            })
            .ok_or_else(|| {
                FeedError::InvalidConfig(format!(
                    "unknown ark region: {value} (expected a code from 1 to 4 or a region name)"
                ))
            })
    }
}

/// Same-named columns copied straight from the Ark report.
const DIRECT_COPIES: [&str; 28] = [
    "契約者氏名",
    "契約者カナ",
    "契約者生年月日",
    "契約者TEL自宅",
    "契約者TEL携帯",
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
    "クライアントCD",
];

#[derive(Debug, Clone)]
pub struct ArkRegistrationMapper {
    region: ArkRegion,
    rules: RuleTable,
    defaults: DefaultTable,
}

impl ArkRegistrationMapper {
    pub fn new(region: ArkRegion) -> Self {
        let mut rules = RuleTable::from_layout(&REGISTRATION_COLUMNS)
            .copy("引継番号", "契約番号")
            .transform("管理会社", ARK_MANAGEMENT_COMPANY)
            .constant("委託先法人ID", ARK_TRUSTEE_ID)
            .constant("更新契約手数料", region.code().to_string())
            .constant("登録フラグ", "1");
        for field in DIRECT_COPIES {
            rules = rules.copy(field, field);
        }
        Self {
            region,
            rules,
            defaults: DefaultTable::new().with("管理前滞納額", "0"),
        }
    }

    pub fn region(&self) -> ArkRegion {
        self.region
    }
}

impl Mapper for ArkRegistrationMapper {
    fn name(&self) -> &'static str {
        "ark_registration"
    }

    fn output_label(&self) -> String {
        format!("アーク_新規登録_{}", self.region.label())
    }

    fn rules(&self) -> &RuleTable {
        &self.rules
    }

    fn defaults(&self) -> &DefaultTable {
        &self.defaults
    }

    fn apply_custom_rules(&self, output: &mut Record, _input: &Record) {
        strip_phone_punctuation(output, HOME_PHONE);
        strip_phone_punctuation(output, MOBILE_PHONE);
        truncate_amount_fields(output);
    }
}

pub const LATE_PAYMENT_COLUMNS: [&str; 7] = [
    "管理番号",
    "引継番号",
    "滞納残債",
    "クライアントCD",
    "管理前滞納額",
    "更新日",
    "更新担当者",
];

/// Arrears updates stamped with the run timestamp.
#[derive(Debug, Clone)]
pub struct ArkLatePaymentMapper {
    rules: RuleTable,
    defaults: DefaultTable,
}

impl ArkLatePaymentMapper {
    pub fn new(context: &MapperContext) -> Self {
        Self {
            rules: RuleTable::from_layout(&LATE_PAYMENT_COLUMNS)
                .copy("管理番号", "管理番号")
                .copy("引継番号", "引継番号")
                .copy("滞納残債", "滞納残債")
                .copy("クライアントCD", "クライアントCD")
                .transform("管理前滞納額", ARK_ARREARS_DIFFERENCE)
                .constant("更新日", context.run_timestamp()),
            defaults: DefaultTable::new(),
        }
    }
}

impl Mapper for ArkLatePaymentMapper {
    fn name(&self) -> &'static str {
        "ark_late_payment"
    }

    fn output_label(&self) -> String {
        "アーク_残債更新".to_string()
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
    fn regions_parse_from_code_name_or_label() {
        assert_eq!("2".parse::<ArkRegion>().unwrap(), ArkRegion::Osaka);
        assert_eq!("Kita_Kanto".parse::<ArkRegion>().unwrap(), ArkRegion::KitaKanto);
        assert_eq!("北海道".parse::<ArkRegion>().unwrap(), ArkRegion::Hokkaido);
        let err = "5".parse::<ArkRegion>().unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn registration_fixes_trustee_and_region_fee() {
        let input = Record::from_pairs([
            ("契約番号", "A-100"),
            ("取引先", " 北斗管理 "),
            ("契約者TEL自宅", "(011) 234-5678"),
            ("契約者TEL携帯", "090 1234 5678"),
            ("月額賃料", "58000.5"),
            ("委託先法人ID", "9"),
        ]);
        let output = ArkRegistrationMapper::new(ArkRegion::Hokkaido).map_one(&input);
        insta::assert_snapshot!(
            output
                .iter()
                .filter(|(_, value)| !value.is_empty())
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("\n"),
            @r"
        引継番号=A-100
        契約者TEL自宅=0112345678
        契約者TEL携帯=09012345678
        月額賃料=58000
        管理前滞納額=0
        更新契約手数料=3
        管理会社=北斗管理
        委託先法人ID=5
        登録フラグ=1
        "
        );
        assert_eq!(output.len(), 111);
    }

    #[test]
    fn late_payment_stamps_run_and_computes_arrears() {
        let run_at = NaiveDate::from_ymd_opt(2024, 6, 10)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        let mapper = ArkLatePaymentMapper::new(&MapperContext::new(run_at));
        let input = Record::from_pairs([
            ("管理番号", "M-1"),
            ("引継番号", "A-100"),
            ("滞納残債", "20000"),
            ("クライアントCD", "3"),
            ("新残債", "20000"),
            ("旧残債", "18000"),
        ]);
        assert_eq!(
            mapper.map_one(&input).iter().collect::<Vec<_>>(),
            vec![
                ("管理番号", "M-1"),
                ("引継番号", "A-100"),
                ("滞納残債", "20000"),
                ("クライアントCD", "3"),
                ("管理前滞納額", "2000"),
                ("更新日", "2024-06-10 09:30:00"),
                ("更新担当者", ""),
            ]
        );
    }
}
