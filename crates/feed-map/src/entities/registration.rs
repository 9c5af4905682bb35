//! The 111-column registration template shared by the Capco and Ark imports.

use feed_model::Record;

use crate::transforms::truncate_amount;

/// 107 named columns, three header-less columns, then the registration flag.
pub const REGISTRATION_COLUMNS: [&str; 111] = [
    "引継番号",
    "契約者氏名",
    "契約者カナ",
    "契約者生年月日",
    "契約者TEL自宅",
    "契約者TEL携帯",
    "契約者現住所郵便番号",
    "契約者現住所1",
    "契約者現住所2",
    "契約者現住所3",
    "引継情報",
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
    "回収口座金融機関CD",
    "回収口座金融機関名",
    "回収口座支店CD",
    "回収口座支店名",
    "回収口座種類",
    "回収口座番号",
    "回収口座名義",
    "契約種類",
    "管理受託日",
    "契約確認日",
    "退去済手数料",
    "入居中滞納手数料",
    "入居中正常手数料",
    "管理前滞納額",
    "更新契約手数料",
    "退去手続き（実費）",
    "初回振替月",
    "保証開始日",
    "クライアントCD",
    "パートナーCD",
    "契約者勤務先名",
    "契約者勤務先カナ",
    "契約者勤務先TEL",
    "勤務先業種",
    "契約者勤務先郵便番号",
    "契約者勤務先住所1",
    "契約者勤務先住所2",
    "契約者勤務先住所3",
    "保証人１氏名",
    "保証人１カナ",
    "保証人１契約者との関係",
    "保証人１生年月日",
    "保証人１郵便番号",
    "保証人１住所1",
    "保証人１住所2",
    "保証人１住所3",
    "保証人１TEL自宅",
    "保証人１TEL携帯",
    "保証人２氏名",
    "保証人２カナ",
    "保証人２契約者との関係",
    "保証人２生年月日",
    "保証人２郵便番号",
    "保証人２住所1",
    "保証人２住所2",
    "保証人２住所3",
    "保証人２TEL自宅",
    "保証人２TEL携帯",
    "緊急連絡人１氏名",
    "緊急連絡人１カナ",
    "緊急連絡人１契約者との関係",
    "緊急連絡人１郵便番号",
    "緊急連絡人１現住所1",
    "緊急連絡人１現住所2",
    "緊急連絡人１現住所3",
    "緊急連絡人１TEL自宅",
    "緊急連絡人１TEL携帯",
    "緊急連絡人２氏名",
    "緊急連絡人２カナ",
    "緊急連絡人２契約者との関係",
    "緊急連絡人２郵便番号",
    "緊急連絡人２現住所1",
    "緊急連絡人２現住所2",
    "緊急連絡人２現住所3",
    "緊急連絡人２TEL自宅",
    "緊急連絡人２TEL携帯",
    "保証入金日",
    "保証入金者",
    "引落銀行CD",
    "引落銀行名",
    "引落支店CD",
    "引落支店名",
    "引落預金種別",
    "引落口座番号",
    "引落口座名義",
    "解約日",
    "管理会社",
    "委託先法人ID",
    "",
    "",
    "",
    "登録フラグ",
];

pub const HOME_PHONE: &str = "契約者TEL自宅";
pub const MOBILE_PHONE: &str = "契約者TEL携帯";

pub const AMOUNT_FIELDS: [&str; 9] = [
    "月額賃料",
    "管理費",
    "共益費",
    "水道代",
    "駐車場代",
    "その他費用1",
    "その他費用2",
    "敷金",
    "礼金",
];

/// Drops hyphens, spaces and parentheses from a phone field.
pub fn strip_phone_punctuation(output: &mut Record, field: &str) {
    if let Some(phone) = output.get_non_empty(field) {
        let cleaned: String = phone
            .trim()
            .chars()
            .filter(|ch| !matches!(ch, '-' | ' ' | '(' | ')'))
            .collect();
        output.set(field, cleaned);
    }
}

/// Truncates every parseable amount field to whole yen; others are kept.
pub fn truncate_amount_fields(output: &mut Record) {
    for field in AMOUNT_FIELDS {
        if let Some(amount) = output.get_non_empty(field).and_then(truncate_amount) {
            output.set(field, amount);
        }
    }
}
