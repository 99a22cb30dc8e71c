use std::fs;
use std::path::Path;

use calamine::{Data, Reader, Xlsx, open_workbook};
use chrono::{NaiveDate, NaiveDateTime};
use salekit_io_csv::{SalesRecord, SpecSalesColumns, load_dataset};
use salekit_io_xlsx::{EnumCellValue, SpecCell, XlsxWriteError};
use salekit_report::{
    L_SHEET_NAMES, ReportError, SpecPipelineOptions, SpecReportOptions, build, compute_kpis,
    compute_rollups, run_at,
};

const C_HEADER: &str = "index,Order ID,Date,Status,Fulfilment,Sales Channel,Category,Size,Qty,Amount,ship-city,ship-state,B2B";

fn derive_timestamp() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 16)
        .and_then(|date| date.and_hms_opt(9, 30, 0))
        .expect("timestamp")
}

fn write_csv(dir: &Path, l_rows: &[&str]) -> std::path::PathBuf {
    let path_file = dir.join("sales.csv");
    let mut text = String::from(C_HEADER);
    for row in l_rows {
        text.push('\n');
        text.push_str(row);
    }
    text.push('\n');
    fs::write(&path_file, text).expect("write csv");
    path_file
}

fn derive_sample_rows() -> Vec<&'static str> {
    vec![
        "0,405-1,04-30-22,Cancelled,Merchant,Amazon.in,Set,S,0,647.62,MUMBAI,MAHARASHTRA,False",
        "1,171-2,04-30-22,Shipped - Delivered to Buyer,Merchant,Amazon.in,kurta,3XL,1,406,BENGALURU,KARNATAKA,False",
        "2,404-3,04-30-22,Shipped,Amazon,Amazon.in,kurta,XL,1,329,NAVI MUMBAI,MAHARASHTRA,True",
        "3,403-4,04-29-22,Cancelled,Merchant,Amazon.in,Western Dress,L,0,753.33,PUDUCHERRY,PUDUCHERRY,False",
        "4,407-5,04-29-22,Shipped,Amazon,Amazon.in,Top,3XL,1,574,CHENNAI,TAMIL NADU,False",
        "5,404-6,not-a-date,Shipped,Amazon,Amazon.in,Set,M,2,,MUMBAI,MAHARASHTRA,False",
        "6,408-7,04-28-22,Pending,Amazon,Amazon.in,Set,M,1,824,MUMBAI,MAHARASHTRA,False,unexpected",
    ]
}

fn read_range(path: &Path, sheet: &str) -> calamine::Range<Data> {
    let mut xlsx: Xlsx<_> = open_workbook(path).expect("open workbook");
    xlsx.worksheet_range(sheet).expect("sheet range")
}

#[test]
fn run_writes_ten_sheets_with_expected_values() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path_csv = write_csv(tmp.path(), &derive_sample_rows());

    let output = run_at(
        &path_csv,
        tmp.path(),
        &SpecPipelineOptions::default(),
        derive_timestamp(),
    )
    .expect("run");

    assert_eq!(
        output.path_file_out,
        tmp.path().join("Sales_Dashboard_2026-10-16_09-30-00.xlsx")
    );
    assert_eq!(output.n_records, 6);
    assert_eq!(output.report_xlsx.sheets.len(), 10);
    assert_eq!(
        output
            .report_xlsx
            .sheets
            .iter()
            .filter(|sheet| sheet.if_has_chart)
            .count(),
        7
    );

    let mut xlsx: Xlsx<_> = open_workbook(&output.path_file_out).expect("open workbook");
    let l_names: Vec<String> = L_SHEET_NAMES.iter().map(|name| name.to_string()).collect();
    assert_eq!(xlsx.sheet_names(), l_names);

    let range = xlsx.worksheet_range("Category Analysis").expect("category");
    assert_eq!(range.get_value((0, 0)), Some(&Data::String("Category".to_string())));
    // Ranked by revenue, highest first.
    assert_eq!(
        range.get_value((1, 0)),
        Some(&Data::String("Western Dress".to_string()))
    );
    assert_eq!(range.get_value((1, 2)), Some(&Data::Float(753.33)));
    assert_eq!(range.get_value((1, 3)), Some(&Data::Float(1.0)));
    assert_eq!(range.height(), 5);

    let range = read_range(&output.path_file_out, "Size Analysis");
    // Zero-quantity rows are left out; ties keep first appearance.
    assert_eq!(range.get_value((1, 0)), Some(&Data::String("3XL".to_string())));
    assert_eq!(range.get_value((1, 1)), Some(&Data::Float(2.0)));

    let range = read_range(&output.path_file_out, "Sales Trend");
    assert_eq!(range.get_value((0, 0)), Some(&Data::String("Date".to_string())));
    // Undated records are left out; days ascend.
    assert_eq!(range.height(), 3);
    match range.get_value((1, 1)) {
        Some(Data::Float(revenue)) => assert!((revenue - 1327.33).abs() < 1e-6),
        other => panic!("unexpected trend revenue {other:?}"),
    }
}

#[test]
fn run_fails_when_output_directory_is_missing() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path_csv = write_csv(tmp.path(), &derive_sample_rows());
    let path_dir_out = tmp.path().join("does-not-exist");

    let err = run_at(
        &path_csv,
        &path_dir_out,
        &SpecPipelineOptions::default(),
        derive_timestamp(),
    )
    .expect_err("missing directory");
    assert!(matches!(
        err,
        ReportError::Write(XlsxWriteError::DestinationNotFound(_))
    ));
    assert!(!path_dir_out.exists());
}

#[test]
fn run_fails_on_missing_input() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let err = run_at(
        &tmp.path().join("missing.csv"),
        tmp.path(),
        &SpecPipelineOptions::default(),
        derive_timestamp(),
    )
    .expect_err("missing input");
    assert!(matches!(err, ReportError::Load(_)));
    assert!(err.to_string().starts_with("load stage failed"));
}

#[test]
fn header_only_input_writes_empty_ten_sheet_report() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path_csv = write_csv(tmp.path(), &[]);

    let output = run_at(
        &path_csv,
        tmp.path(),
        &SpecPipelineOptions::default(),
        derive_timestamp(),
    )
    .expect("run");
    assert_eq!(output.n_records, 0);
    assert_eq!(output.report_xlsx.sheets.len(), 10);
    for sheet in output.report_xlsx.sheets.iter().skip(3) {
        assert_eq!(sheet.n_rows, 1, "{}", sheet.sheet_name);
        assert!(sheet.if_has_chart);
    }

    let range = read_range(&output.path_file_out, "Order Status");
    assert_eq!(range.height(), 1);
}

#[test]
fn unparseable_dates_give_header_only_trend_with_chart() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path_csv = write_csv(
        tmp.path(),
        &[
            "0,1,2022/04/30,Shipped,Amazon,Amazon.in,Set,S,1,100,MUMBAI,MAHARASHTRA,False",
            "1,2,yesterday,Shipped,Amazon,Amazon.in,Set,S,1,100,MUMBAI,MAHARASHTRA,False",
        ],
    );
    let dataset = load_dataset(&path_csv, &Default::default()).expect("load");
    let workbook = build(&dataset, &SpecReportOptions::default());

    let sheet = workbook.sheet("Sales Trend").expect("trend");
    assert_eq!(sheet.n_rows(), 1);
    let chart = sheet.chart.as_ref().expect("chart");
    assert!(chart.range_values.is_empty());
    assert!(chart.title.ends_with("(no data)"));

    let output = run_at(
        &path_csv,
        tmp.path(),
        &SpecPipelineOptions::default(),
        derive_timestamp(),
    )
    .expect("run");
    assert!(output.path_file_out.exists());
}

#[test]
fn three_record_scenario_matches_rollup_and_kpi() {
    let records = vec![
        SalesRecord {
            category: Some("A".to_string()),
            amount: Some(100.0),
            ..Default::default()
        },
        SalesRecord {
            category: Some("A".to_string()),
            amount: Some(200.0),
            ..Default::default()
        },
        SalesRecord {
            category: Some("B".to_string()),
            amount: None,
            ..Default::default()
        },
    ];
    let dataset = salekit_io_csv::Dataset::from_records(records, &SpecSalesColumns::default())
        .expect("dataset");
    let workbook = build(&dataset, &SpecReportOptions::default());

    let sheet = workbook.sheet("Category Analysis").expect("category");
    assert_eq!(sheet.cell(1, 0).and_then(SpecCell::as_text), Some("A"));
    assert_eq!(sheet.cell(1, 2).and_then(SpecCell::as_number), Some(300.0));
    assert_eq!(sheet.cell(1, 3).and_then(SpecCell::as_number), Some(2.0));
    assert_eq!(sheet.cell(2, 0).and_then(SpecCell::as_text), Some("B"));
    assert_eq!(sheet.cell(2, 2).and_then(SpecCell::as_number), Some(0.0));
    assert_eq!(sheet.cell(2, 3).and_then(SpecCell::as_number), Some(1.0));

    let summary = workbook.sheet("Executive Summary").expect("summary");
    assert_eq!(summary.cell(5, 1).map(|c| c.value.clone()), Some(EnumCellValue::Number(300.0)));
}

#[test]
fn grouped_sums_match_scalar_kpis() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path_csv = write_csv(tmp.path(), &derive_sample_rows());
    let dataset = load_dataset(&path_csv, &Default::default()).expect("load");
    let options = SpecReportOptions::default();

    let kpis = compute_kpis(&dataset, &options);
    let rollups = compute_rollups(&dataset, &options);

    let approx = |a: f64, b: f64| (a - b).abs() < 1e-9;
    assert!(approx(rollups.category.total_amount(), kpis.revenue_total));
    assert!(approx(rollups.fulfilment.total_amount(), kpis.revenue_total));
    assert!(approx(rollups.segment.total_amount(), kpis.revenue_total));
    assert!(approx(rollups.category.total_qty(), kpis.qty_total));
    assert_eq!(rollups.category.total_records(), kpis.n_orders);
    assert_eq!(rollups.city.total_records(), kpis.n_orders);
    assert_eq!(rollups.fulfilment.total_records(), kpis.n_orders);
}

#[test]
fn repeated_builds_are_identical() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path_csv = write_csv(tmp.path(), &derive_sample_rows());
    let options = SpecPipelineOptions::default();

    let dataset_a = load_dataset(&path_csv, &options.load).expect("load");
    let dataset_b = load_dataset(&path_csv, &options.load).expect("load");
    assert_eq!(
        build(&dataset_a, &options.report),
        build(&dataset_b, &options.report)
    );
}

#[test]
fn status_rates_count_each_marker_independently() {
    let records: Vec<SalesRecord> = ["Cancelled Order", "Shipped - Delivered", "Pending"]
        .iter()
        .map(|status| SalesRecord {
            status: Some(status.to_string()),
            ..Default::default()
        })
        .collect();
    let dataset = salekit_io_csv::Dataset::from_records(records, &SpecSalesColumns::default())
        .expect("dataset");
    let kpis = compute_kpis(&dataset, &SpecReportOptions::default());
    assert!((kpis.rate_cancelled - 1.0 / 3.0).abs() < 1e-12);
    assert!((kpis.rate_shipped - 1.0 / 3.0).abs() < 1e-12);

    let workbook = build(&dataset, &SpecReportOptions::default());
    let dashboard = workbook.sheet("Visual Dashboard").expect("dashboard");
    assert_eq!(
        dashboard.cell(7, 3).and_then(SpecCell::as_number),
        Some(kpis.rate_cancelled)
    );
}
