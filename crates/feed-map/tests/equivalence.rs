use chrono::NaiveDate;
use polars::prelude::DataFrame;
use proptest::prelude::*;
use proptest::sample::select;

use feed_ingest::{record_at, string_frame};
use feed_map::{ArkRegion, MapperContext, MapperRegistry};

/// Every input column any built-in mapper reads.
const INPUT_COLUMNS: &[&str] = &[
    "管理番号",
    "入居ステータス",
    "滞納ステータス",
    "契約者カナ",
    "TEL携帯",
    "TEL携帯.1",
    "TEL携帯.2",
    "緊急連絡人１のTEL（携帯）",
    "滞納残債",
    "物件名",
    "クライアント名",
    "委託先法人ID",
    "契約番号",
    "契約者：電話番号",
    "契約者TEL自宅",
    "月額賃料",
    "敷金",
    "管理会社名",
    "現在残債",
    "更新後残債",
    "更新理由",
    "最終架電日",
    "架電結果",
    "架電番号",
    "残債",
    "契約者TEL携帯",
    "取引先",
    "新残債",
    "旧残債",
    "引継番号",
    "クライアントCD",
];

fn context() -> MapperContext {
    MapperContext::new(
        NaiveDate::from_ymd_opt(2024, 6, 10)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap(),
    )
}

fn arb_cell() -> impl Strategy<Value = String> {
    select(vec![
        "",
        "nan",
        "09012345678",
        "090-1234-5678",
        "未080 5787 5364",
        "(03) 1234-5678",
        "12,000",
        "10000.5",
        "3",
        "不明",
        "通話済",
    ])
    .prop_map(String::from)
}

fn arb_rows() -> impl Strategy<Value = Vec<Vec<String>>> {
    prop::collection::vec(
        prop::collection::vec(arb_cell(), INPUT_COLUMNS.len()),
        1..6,
    )
}

fn frame(rows: &[Vec<String>]) -> DataFrame {
    let columns = INPUT_COLUMNS
        .iter()
        .enumerate()
        .map(|(col, name)| {
            (
                (*name).to_string(),
                rows.iter().map(|row| row[col].clone()).collect(),
            )
        })
        .collect();
    string_frame(columns).unwrap()
}

proptest! {
    #[test]
    fn single_and_batch_mapping_agree(rows in arb_rows()) {
        let registry = MapperRegistry::with_defaults();
        let input = frame(&rows);
        for registration in registry.registrations() {
            let (entity, role) = registration.split_once('/').unwrap();
            let mapper = registry.create(entity, role, &context()).unwrap();
            let batch = mapper.map_many(&input).unwrap();
            prop_assert_eq!(batch.height(), input.height());
            for row in 0..input.height() {
                let single = mapper.map_one(&record_at(&input, row));
                prop_assert_eq!(&single, &record_at(&batch, row), "{}", registration);
            }
        }
    }
}

#[test]
fn empty_input_keeps_template_headers() {
    let registry = MapperRegistry::with_defaults();
    let mapper = registry.create("capco", "registration", &context()).unwrap();
    let output = mapper.map_many(&frame(&[])).unwrap();
    assert_eq!(output.height(), 0);
    assert_eq!(output.width(), 111);
}

#[test]
fn ark_region_reaches_every_batch_row() {
    let registry = MapperRegistry::with_defaults();
    let context = context().with_region(ArkRegion::KitaKanto);
    let mapper = registry.create("ark", "registration", &context).unwrap();
    let rows = vec![vec!["".to_string(); INPUT_COLUMNS.len()]; 3];
    let output = mapper.map_many(&frame(&rows)).unwrap();
    assert_eq!(output.width(), 111);
    for row in 0..output.height() {
        let record = record_at(&output, row);
        assert_eq!(record.get("更新契約手数料"), Some("4"));
        assert_eq!(record.get("委託先法人ID"), Some("5"));
    }
}
