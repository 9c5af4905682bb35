//! Per-entity mappers.

pub mod ark;
pub mod capco;
pub mod dialer;
pub mod faith;
pub mod history;
pub mod mirail;
pub mod plaza;
pub mod registration;

pub use ark::{ArkLatePaymentMapper, ArkRegion, ArkRegistrationMapper};
pub use capco::{CapcoDebtUpdateMapper, CapcoRegistrationMapper};
pub use dialer::{DIALER_COLUMNS, PositionalDialerMapper};
pub use faith::FaithMapper;
pub use history::{AutocallHistoryMapper, HistoryTarget};
pub use mirail::MirailMapper;
pub use plaza::PlazaMapper;

#[cfg(test)]
mod tests {
    use feed_model::{PhoneTarget, Record};

    use crate::mapper::Mapper;

    use super::*;

    fn contract_row(phone_column: &str, phone: &str) -> Record {
        Record::from_pairs([
            ("管理番号", "M-1"),
            ("入居ステータス", "入居中"),
            ("滞納ステータス", "滞納"),
            ("契約者カナ", "ヤマダ　タロウ"),
            (phone_column, phone),
            ("滞納残債", "12000"),
            ("物件名", "メゾン"),
            ("クライアント名", "大家A"),
            ("委託先法人ID", "2"),
        ])
    }

    #[test]
    fn mirail_hyphenates_bare_mobiles() {
        let mapper = MirailMapper::new(PhoneTarget::Guarantor);
        let output = mapper.map_one(&contract_row("TEL携帯.1", "09012345678"));
        assert_eq!(output.len(), 28);
        assert_eq!(output.get("電話番号"), Some("090-1234-5678"));
        assert_eq!(output.get("架電番号"), Some("090-1234-5678"));
        assert_eq!(output.get("督促状況"), Some("TEL"));
        assert_eq!(output.get("クライアント"), Some("大家A"));
        assert_eq!(output.get("残債"), Some("12000"));
        assert_eq!(output.get("契約者名（カナ）"), Some("ヤマダ　タロウ"));
    }

    #[test]
    fn plaza_contact_reads_emergency_mobile_and_groups_balance() {
        let mapper = PlazaMapper::new(PhoneTarget::EmergencyContact);
        let output = mapper.map_one(&contract_row("緊急連絡人１のTEL（携帯）", "080-1111-2222"));
        assert_eq!(output.get("電話番号"), Some("080-1111-2222"));
        assert_eq!(output.get("架電番号"), Some("080-1111-2222"));
        assert_eq!(output.get("残債"), Some("12,000"));
        assert_eq!(mapper.output_label(), "プラザ_緊急連絡人");
    }

    #[test]
    fn faith_blanks_balance_and_derives_client() {
        let mapper = FaithMapper::new(PhoneTarget::Contract);
        let output = mapper.map_one(&contract_row("TEL携帯", "070-0000-1111"));
        assert_eq!(output.get("クライアント"), Some("フェイス2"));
        assert_eq!(output.get("残債"), Some(""));
        assert_eq!(output.get("架電番号"), Some("070-0000-1111"));
    }

    #[test]
    fn faith_bad_trustee_id_falls_back_to_blank_client() {
        let mut row = contract_row("TEL携帯", "070-0000-1111");
        row.set("委託先法人ID", "不明");
        let output = FaithMapper::new(PhoneTarget::Contract).map_one(&row);
        assert_eq!(output.get("クライアント"), Some(""));
    }

    #[test]
    fn history_rows_carry_constants_and_note() {
        let mapper = AutocallHistoryMapper::new(HistoryTarget::Contract);
        let input = Record::from_pairs([
            ("管理番号", "M-7"),
            ("最終架電日", "2024-06-01 10:00"),
            ("架電番号", "09011112222"),
            ("残債", "5,000"),
            ("架電結果", "不在"),
        ]);
        let output = mapper.map_one(&input);
        insta::assert_snapshot!(
            output
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("\n"),
            @r"
        管理番号=M-7
        交渉日時=2024-06-01 10:00
        担当=
        相手=契約者
        手段=架電
        回収ランク=
        結果=その他
        入金予定日=
        予定金額=
        交渉備考=架電番号09011112222オートコール　残債5,000円
        "
        );
    }
}
