//! Integration tests for the feed pipelines.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tempfile::TempDir;

use feed_cli::pipeline::{
    AutocallRequest, FeedRequest, RunOptions, run_autocall, run_feed, run_history,
};
use feed_cli::summary::render_summary;
use feed_filter::FilterRegistry;
use feed_ingest::{read_csv, string_column};
use feed_map::{ArkRegion, HistoryTarget, MapperRegistry};
use feed_model::{FeedError, PhoneTarget};

fn options(dir: &TempDir, dry_run: bool) -> RunOptions {
    RunOptions {
        run_at: NaiveDate::from_ymd_opt(2024, 6, 10)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap(),
        output_dir: dir.path().join("out"),
        dry_run,
    }
}

fn write_input(dir: &TempDir, name: &str, rows: &[&[&str]]) -> PathBuf {
    let body: Vec<String> = rows.iter().map(|row| row.join(",")).collect();
    let path = dir.path().join(name);
    fs::write(&path, body.join("\n")).unwrap();
    path
}

fn faith_input(dir: &TempDir) -> PathBuf {
    write_input(
        dir,
        "faith.csv",
        &[
            &["管理番号", "委託先法人ID", "入金予定日", "回収ランク", "TEL携帯", "入金予定金額", "契約者カナ", "滞納残債"],
            &["blank-phone", "1", "2024-06-01", "通常", "", "10000", "ア", "1000"],
            &["lawyer", "2", "", "弁護士介入", "090-1111-2222", "", "イ", "2000"],
            &["ok-1", "3", "2024/06/09", "通常", "090-3333-4444", "8000", "ウ", "3000"],
            &["ok-2", "4", "", "", "080-5555-6666", "1", "エ", "4000"],
            &["bad-id", "9", "2024-05-31", "通常", "070-7777-8888", "", "オ", "5000"],
        ],
    )
}

fn request(entity: &str, role: &str) -> FeedRequest {
    FeedRequest {
        entity: entity.to_string(),
        role: role.to_string(),
        ..FeedRequest::default()
    }
}

fn configuration_error(error: &anyhow::Error) -> bool {
    error.chain().any(|cause| {
        cause
            .downcast_ref::<FeedError>()
            .is_some_and(FeedError::is_configuration)
    })
}

fn column(path: &Path, name: &str) -> Vec<String> {
    string_column(&read_csv(path).unwrap(), name).unwrap()
}

#[test]
fn faith_run_filters_maps_and_writes() {
    let dir = TempDir::new().unwrap();
    let input = faith_input(&dir);
    let summary = run_feed(
        &input,
        &request("faith", "contract"),
        &FilterRegistry::with_defaults(),
        &MapperRegistry::with_defaults(),
        &options(&dir, false),
    )
    .unwrap();

    assert_eq!(summary.label, "フェイス_契約者");
    assert_eq!(summary.input_rows, 5);
    assert_eq!(summary.output_rows, 2);
    assert_eq!(summary.output_columns, 28);
    let counts: Vec<(usize, usize)> = summary
        .stages
        .iter()
        .map(|stage| (stage.before, stage.after))
        .collect();
    assert_eq!(counts, vec![(5, 4), (4, 4), (4, 3), (3, 2), (2, 2)]);
    assert!(summary.written);
    assert!(summary.output_path.ends_with("out/0610フェイス_契約者.csv"));

    let output = &summary.output_path;
    assert_eq!(column(output, "管理番号"), vec!["ok-1", "ok-2"]);
    assert_eq!(column(output, "クライアント"), vec!["フェイス3", "フェイス4"]);
    assert_eq!(column(output, "架電番号"), vec!["090-3333-4444", "080-5555-6666"]);
    assert_eq!(column(output, "残債"), vec!["", ""]);
    assert_eq!(column(output, "督促状況"), vec!["TEL", "TEL"]);
}

#[test]
fn dry_run_reports_without_writing() {
    let dir = TempDir::new().unwrap();
    let input = faith_input(&dir);
    let summary = run_feed(
        &input,
        &request("faith", "contract"),
        &FilterRegistry::with_defaults(),
        &MapperRegistry::with_defaults(),
        &options(&dir, true),
    )
    .unwrap();
    assert_eq!(summary.output_rows, 2);
    assert!(!summary.written);
    assert!(!summary.output_path.exists());
    assert!(!dir.path().join("out").exists());
}

#[test]
fn unknown_pair_fails_before_reading_input() {
    let dir = TempDir::new().unwrap();
    let error = run_feed(
        &dir.path().join("missing.csv"),
        &request("acme", "contract"),
        &FilterRegistry::with_defaults(),
        &MapperRegistry::with_defaults(),
        &options(&dir, false),
    )
    .unwrap_err();
    assert!(configuration_error(&error));
    assert!(error.to_string().contains("acme/contract"));
}

#[test]
fn missing_input_is_not_a_configuration_error() {
    let dir = TempDir::new().unwrap();
    let error = run_feed(
        &dir.path().join("missing.csv"),
        &request("mirail", "contract"),
        &FilterRegistry::with_defaults(),
        &MapperRegistry::with_defaults(),
        &options(&dir, false),
    )
    .unwrap_err();
    assert!(!configuration_error(&error));
}

#[test]
fn filter_only_entity_writes_filtered_rows_as_read() {
    let dir = TempDir::new().unwrap();
    let input = write_input(
        &dir,
        "sms.csv",
        &[
            &["管理番号", "委託先法人ID", "TEL携帯", "備考"],
            &["A", "1", "090-1234-5678", "x"],
            &["B", "2", "", "y"],
            &["C", "7", "080-1234-5678", "z"],
        ],
    );
    let summary = run_feed(
        &input,
        &request("faith_sms", "contract"),
        &FilterRegistry::with_defaults(),
        &MapperRegistry::with_defaults(),
        &options(&dir, false),
    )
    .unwrap();
    assert_eq!(summary.label, "faith_sms_contract");
    assert_eq!(summary.output_columns, 4);
    assert_eq!(column(&summary.output_path, "管理番号"), vec!["A"]);
    assert_eq!(column(&summary.output_path, "備考"), vec!["x"]);
}

#[test]
fn capco_registration_has_no_filter_stages() {
    let dir = TempDir::new().unwrap();
    let input = write_input(
        &dir,
        "capco.csv",
        &[
            &["契約番号", "契約者：電話番号", "契約者TEL自宅"],
            &["K-1", "本人090 1234 5678", "(03) 1234-5678"],
        ],
    );
    let summary = run_feed(
        &input,
        &request("capco", "registration"),
        &FilterRegistry::with_defaults(),
        &MapperRegistry::with_defaults(),
        &options(&dir, false),
    )
    .unwrap();
    assert!(summary.stages.is_empty());
    assert_eq!(summary.output_columns, 111);
    assert!(summary.output_path.ends_with("0610カプコ_新規登録.csv"));
    let output = &summary.output_path;
    assert_eq!(column(output, "引継番号"), vec!["K-1"]);
    assert_eq!(column(output, "契約者TEL携帯"), vec!["090-1234-5678"]);
    assert_eq!(column(output, "契約者TEL自宅"), vec!["0312345678"]);
    assert_eq!(column(output, "委託先法人ID"), vec!["7"]);
}

#[test]
fn ark_registration_writes_region_code() {
    let dir = TempDir::new().unwrap();
    let input = write_input(
        &dir,
        "ark.csv",
        &[
            &["契約番号", "取引先", "契約者TEL携帯", "月額賃料"],
            &["A-7", "北斗管理", "090-2222-3333", "48000.7"],
        ],
    );
    let request = FeedRequest {
        region: ArkRegion::Osaka,
        ..request("ark", "registration")
    };
    let summary = run_feed(
        &input,
        &request,
        &FilterRegistry::with_defaults(),
        &MapperRegistry::with_defaults(),
        &options(&dir, false),
    )
    .unwrap();
    assert!(summary.stages.is_empty());
    assert!(summary.output_path.ends_with("0610アーク_新規登録_大阪.csv"));
    let output = &summary.output_path;
    assert_eq!(column(output, "引継番号"), vec!["A-7"]);
    assert_eq!(column(output, "管理会社"), vec!["北斗管理"]);
    assert_eq!(column(output, "契約者TEL携帯"), vec!["09022223333"]);
    assert_eq!(column(output, "月額賃料"), vec!["48000"]);
    assert_eq!(column(output, "更新契約手数料"), vec!["2"]);
    assert_eq!(column(output, "委託先法人ID"), vec!["5"]);
}

fn positional_input(dir: &TempDir) -> PathBuf {
    let mut header: Vec<String> = (0..120).map(|idx| format!("c{idx}")).collect();
    header[0] = "管理番号".to_string();
    let row = |management: &str, arrears: &str, mobile: &str| {
        let mut cells = vec![String::new(); 120];
        cells[0] = management.to_string();
        cells[21] = "カナ".to_string();
        cells[27] = mobile.to_string();
        cells[71] = arrears.to_string();
        cells[98] = "大家".to_string();
        cells.join(",")
    };
    let body = [
        header.join(","),
        row("A1", "5000", "090-1111-2222"),
        row("B1", "0", "090-3333-4444"),
        row("C1", "7000", ""),
    ];
    let path = dir.path().join("contracts.csv");
    fs::write(&path, body.join("\n")).unwrap();
    path
}

#[test]
fn autocall_runs_engine_then_positional_mapping() {
    let dir = TempDir::new().unwrap();
    let input = positional_input(&dir);
    let request = AutocallRequest {
        target: PhoneTarget::Contract,
        without_10k: false,
        steps_file: None,
    };
    let summary = run_autocall(&input, &request, &options(&dir, false)).unwrap();
    assert_eq!(summary.label, "ミライル_with10k_契約者");
    assert_eq!(summary.stages.len(), 6);
    assert_eq!(summary.output_rows, 1);
    insta::assert_snapshot!(summary.report_lines.join("\n"), @r"
    元データ読み込み: 3件
    委託先法人ID（空白,5）フィルタ後: 3件 (除外: 0件)
    入金予定日フィルタ後: 3件 (除外: 0件)
    回収ランクフィルタ後: 3件 (除外: 0件)
    滞納残債除外詳細: {0円: 1件}
    滞納残債（1円以上）フィルタ後: 2件 (除外: 1件)
    契約者電話除外詳細: {空白/NaN: 1件, 固定電話等: 0件}
    契約者電話フィルタ後: 1件 (除外: 1件)
    除外金額フィルタ後: 1件 (除外: 0件)
    最終処理結果: 1件
    ");
    let output = &summary.output_path;
    assert!(output.ends_with("0610ミライル_with10k_契約者.csv"));
    assert_eq!(column(output, "管理番号"), vec!["A1"]);
    assert_eq!(column(output, "電話番号"), vec!["090-1111-2222"]);
    assert_eq!(column(output, "架電番号"), vec!["090-1111-2222"]);
    assert_eq!(column(output, "クライアント"), vec!["大家"]);
    assert_eq!(column(output, "残債"), vec!["5000"]);
}

#[test]
fn printed_summary_includes_exclusion_details() {
    let dir = TempDir::new().unwrap();
    let input = positional_input(&dir);
    let request = AutocallRequest {
        target: PhoneTarget::Contract,
        without_10k: false,
        steps_file: None,
    };
    let summary = run_autocall(&input, &request, &options(&dir, true)).unwrap();
    let rendered = render_summary(&summary);
    assert!(rendered.starts_with("Output: ミライル_with10k_契約者"));
    assert!(rendered.contains("Filter log:"));
    assert!(rendered.contains("  滞納残債除外詳細: {0円: 1件}"));
    assert!(rendered.contains("  契約者電話除外詳細: {空白/NaN: 1件, 固定電話等: 0件}"));
    assert!(rendered.contains("  最終処理結果: 1件"));
    assert!(rendered.ends_with("not written"));
}

#[test]
fn printed_summary_lists_name_addressed_stages() {
    let dir = TempDir::new().unwrap();
    let input = faith_input(&dir);
    let summary = run_feed(
        &input,
        &request("faith", "contract"),
        &FilterRegistry::with_defaults(),
        &MapperRegistry::with_defaults(),
        &options(&dir, true),
    )
    .unwrap();
    let rendered = render_summary(&summary);
    assert!(rendered.contains("  元データ読み込み: 5件"));
    assert!(rendered.contains("  回収ランクフィルタ後: 3件 (除外: 1件)"));
}

#[test]
fn unreadable_steps_file_is_a_configuration_error() {
    let dir = TempDir::new().unwrap();
    let input = positional_input(&dir);
    let steps = dir.path().join("steps.json");
    fs::write(&steps, "{not json").unwrap();
    let request = AutocallRequest {
        target: PhoneTarget::Guarantor,
        without_10k: true,
        steps_file: Some(steps),
    };
    let error = run_autocall(&input, &request, &options(&dir, false)).unwrap_err();
    assert!(configuration_error(&error));
    assert!(!dir.path().join("out").exists());
}

#[test]
fn history_forward_fills_and_drops_connected_calls() {
    let dir = TempDir::new().unwrap();
    let input = write_input(
        &dir,
        "results.csv",
        &[
            &["管理番号", "最終架電日", "架電番号", "残債", "架電結果"],
            &["1", "2024-06-09 10:00", "09011112222", "5000", "通話済"],
            &["2", "", "08011112222", "6000", "不在"],
            &["3", "2024-06-09 11:00", "07011112222", "7000", "話中"],
        ],
    );
    let summary = run_history(&input, HistoryTarget::Guarantor, &options(&dir, false)).unwrap();
    assert_eq!(summary.input_rows, 3);
    assert_eq!(summary.output_rows, 2);
    assert_eq!(summary.output_columns, 10);
    let output = &summary.output_path;
    assert!(output.ends_with("0610オートコール履歴.csv"));
    assert_eq!(column(output, "管理番号"), vec!["2", "3"]);
    assert_eq!(
        column(output, "交渉日時"),
        vec!["2024-06-09 10:00", "2024-06-09 11:00"]
    );
    assert_eq!(column(output, "相手"), vec!["保証人", "保証人"]);
    assert_eq!(
        column(output, "交渉備考"),
        vec![
            "架電番号08011112222オートコール　残債6000円",
            "架電番号07011112222オートコール　残債7000円"
        ]
    );
}
