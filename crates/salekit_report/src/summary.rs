//! Executive summary, metric-card dashboard and data-quality sheets.

use salekit_io_csv::Dataset;
use salekit_io_xlsx::{EnumCardColor, EnumStyleKey, SpecCell, SpecSheet};

use crate::conf::{
    C_LABEL_NO_DATA, C_SHEET_DASHBOARD, C_SHEET_QUALITY, C_SHEET_SUMMARY, C_STATUS_CLEAN,
    C_STATUS_CRITICAL, C_STATUS_HAS_DUPLICATES, C_STATUS_HAS_MISSING, C_TITLE_DASHBOARD,
    C_TITLE_QUALITY, C_TITLE_SUMMARY, L_CLEANING_ACTIONS, L_RECOMMENDATIONS,
};
use crate::spec::{EnumMeasure, SpecReportOptions, SpecRollupSet, SpecSalesKpis};
use crate::util::{derive_key_label, format_period, format_thousands};

const N_HEIGHT_TITLE: f64 = 30.0;

fn set_title(sheet: &mut SpecSheet, title: &str, col_idx_end: usize) {
    sheet.set_merged_cell(0, 0, 0, col_idx_end, SpecCell::text(title).with_style(EnumStyleKey::Title));
    sheet.set_row_height(0, N_HEIGHT_TITLE);
}

fn set_section(sheet: &mut SpecSheet, row_idx: usize, label: &str, col_idx_end: usize) {
    sheet.set_merged_cell(
        row_idx,
        row_idx,
        0,
        col_idx_end,
        SpecCell::text(label).with_style(EnumStyleKey::Section),
    );
}

////////////////////////////////////////////////////////////////////////////////
// #region ExecutiveSummary

/// Five insight rows parameterized by live values.
///
/// Insights name real keys only; the missing-key group stays on the tables.
pub fn derive_insights(
    kpis: &SpecSalesKpis,
    rollups: &SpecRollupSet,
    options: &SpecReportOptions,
) -> [(String, String); 5] {
    let c_symbol = &options.currency_symbol;
    let c_category = rollups
        .category
        .max_keyed_by_measure(EnumMeasure::Quantity)
        .map_or(C_LABEL_NO_DATA.to_string(), |group| {
            format!(
                "{} ({} units)",
                derive_key_label(group.key.as_deref()),
                format_thousands(group.qty_sum, 0)
            )
        });
    let c_state = rollups
        .state
        .max_keyed_by_measure(EnumMeasure::Revenue)
        .map_or(C_LABEL_NO_DATA.to_string(), |group| {
            format!(
                "{} ({c_symbol}{})",
                derive_key_label(group.key.as_deref()),
                format_thousands(group.amount_sum, 2)
            )
        });
    let c_city = rollups
        .city
        .max_keyed_by_measure(EnumMeasure::Orders)
        .map_or(C_LABEL_NO_DATA.to_string(), |group| {
            format!(
                "{} ({} orders)",
                derive_key_label(group.key.as_deref()),
                format_thousands(group.n_records as f64, 0)
            )
        });
    let c_size = rollups
        .size
        .max_keyed_by_measure(EnumMeasure::Quantity)
        .map_or(C_LABEL_NO_DATA.to_string(), |group| {
            format!(
                "{} ({} units)",
                derive_key_label(group.key.as_deref()),
                format_thousands(group.qty_sum, 0)
            )
        });
    let c_cancel = if kpis.n_orders == 0 {
        C_LABEL_NO_DATA.to_string()
    } else {
        format!("{:.2}% (Needs Attention)", kpis.rate_cancelled * 100.0)
    };

    [
        ("1. Best Selling Category".to_string(), c_category),
        ("2. Top State by Revenue".to_string(), c_state),
        ("3. Top City by Orders".to_string(), c_city),
        ("4. Most Popular Size".to_string(), c_size),
        ("5. Cancellation Rate".to_string(), c_cancel),
    ]
}

/// Build the `Executive Summary` sheet.
pub fn build_summary_sheet(
    kpis: &SpecSalesKpis,
    rollups: &SpecRollupSet,
    options: &SpecReportOptions,
) -> SpecSheet {
    let mut sheet = SpecSheet::new(C_SHEET_SUMMARY);
    set_title(&mut sheet, C_TITLE_SUMMARY, 5);

    let label = |text: &str| SpecCell::text(text).with_style(EnumStyleKey::Label);

    let mut row_idx = 3;
    set_section(&mut sheet, row_idx, "KEY FINDINGS", 5);
    let cell_aov = match kpis.amount_mean {
        Some(mean) => SpecCell::number(mean).with_style(EnumStyleKey::Currency),
        None => SpecCell::text(C_LABEL_NO_DATA),
    };
    let l_findings = [
        (
            "Total Orders Analyzed".to_string(),
            SpecCell::number(kpis.n_orders as f64).with_style(EnumStyleKey::Integer),
        ),
        (
            "Total Revenue Generated".to_string(),
            SpecCell::number(kpis.revenue_total).with_style(EnumStyleKey::Currency),
        ),
        (
            "Analysis Period".to_string(),
            SpecCell::text(format_period(kpis.period)),
        ),
        ("Average Order Value".to_string(), cell_aov),
        (
            format!("{} Fulfillment", options.fulfilment_highlight),
            SpecCell::number(kpis.share_fulfilment_highlight).with_style(EnumStyleKey::Percent),
        ),
    ];
    for (c_label, cell_value) in l_findings {
        row_idx += 1;
        sheet.set_cell(row_idx, 0, label(&c_label));
        sheet.set_cell(row_idx, 1, cell_value);
    }

    row_idx += 2;
    set_section(&mut sheet, row_idx, "TOP INSIGHTS", 5);
    for (c_label, c_value) in derive_insights(kpis, rollups, options) {
        row_idx += 1;
        sheet.set_cell(row_idx, 0, label(&c_label));
        sheet.set_cell(row_idx, 1, SpecCell::text(c_value));
    }

    row_idx += 2;
    set_section(&mut sheet, row_idx, "CRITICAL RECOMMENDATIONS", 5);
    for (c_priority, c_text) in L_RECOMMENDATIONS {
        row_idx += 1;
        sheet.set_cell(row_idx, 0, SpecCell::text(c_priority).with_style(EnumStyleKey::Text));
        sheet.set_cell(row_idx, 1, SpecCell::text(c_text).with_style(EnumStyleKey::Text));
    }

    sheet.set_column_width(0, 35.0);
    sheet.set_column_width(1, 50.0);
    sheet
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Dashboard

/// Build the `Visual Dashboard` sheet: a period band and a 3x2 grid of cards.
pub fn build_dashboard_sheet(kpis: &SpecSalesKpis) -> SpecSheet {
    let mut sheet = SpecSheet::new(C_SHEET_DASHBOARD);
    set_title(&mut sheet, C_TITLE_DASHBOARD, 9);
    sheet.set_merged_cell(
        1,
        1,
        0,
        9,
        SpecCell::text(format!("Period: {}", format_period(kpis.period)))
            .with_style(EnumStyleKey::SubHeader),
    );

    let cell_aov = match kpis.amount_mean {
        Some(mean) => SpecCell::number(mean).with_style(EnumStyleKey::Currency),
        None => SpecCell::text(C_LABEL_NO_DATA),
    };
    let l_cards = [
        (
            3,
            0,
            EnumCardColor::Blue,
            "TOTAL ORDERS",
            SpecCell::number(kpis.n_orders as f64).with_style(EnumStyleKey::Integer),
        ),
        (
            3,
            3,
            EnumCardColor::Green,
            "TOTAL REVENUE",
            SpecCell::number(kpis.revenue_total).with_style(EnumStyleKey::Currency),
        ),
        (3, 6, EnumCardColor::Purple, "AVG ORDER VALUE", cell_aov),
        (
            6,
            0,
            EnumCardColor::Teal,
            "QUANTITY SOLD",
            SpecCell::number(kpis.qty_total).with_style(EnumStyleKey::Integer),
        ),
        (
            6,
            3,
            EnumCardColor::Red,
            "CANCELLATION RATE",
            SpecCell::number(kpis.rate_cancelled).with_style(EnumStyleKey::Percent),
        ),
        (
            6,
            6,
            EnumCardColor::Green,
            "DELIVERY SUCCESS",
            SpecCell::number(kpis.rate_shipped).with_style(EnumStyleKey::Percent),
        ),
    ];

    for (row_idx, col_idx, enum_color, c_title, cell_value) in l_cards {
        sheet.set_merged_cell(
            row_idx,
            row_idx,
            col_idx,
            col_idx + 1,
            SpecCell::text(c_title).with_style(EnumStyleKey::CardHeader(enum_color)),
        );
        // Card colours first, number format on top.
        let mut cell_value = cell_value;
        cell_value
            .styles
            .insert(0, EnumStyleKey::CardValue(enum_color).as_str().to_string());
        sheet.set_merged_cell(row_idx + 1, row_idx + 1, col_idx, col_idx + 1, cell_value);
    }

    for col_idx in [0, 1, 3, 4, 6, 7] {
        sheet.set_column_width(col_idx, 18.0);
    }
    for col_idx in [2, 5] {
        sheet.set_column_width(col_idx, 2.0);
    }
    for (row_idx, height) in [(3, 25.0), (4, 40.0), (6, 25.0), (7, 40.0)] {
        sheet.set_row_height(row_idx, height);
    }
    sheet
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region DataQuality

/// `Clean` / `Has Missing` / `Critical` for one column.
pub fn classify_missing(n_missing: usize, pct_missing: f64, pct_critical: f64) -> &'static str {
    if n_missing == 0 {
        C_STATUS_CLEAN
    } else if pct_missing >= pct_critical {
        C_STATUS_CRITICAL
    } else {
        C_STATUS_HAS_MISSING
    }
}

fn derive_status_style(status: &str) -> EnumStyleKey {
    match status {
        C_STATUS_CLEAN => EnumStyleKey::StatusClean,
        C_STATUS_CRITICAL => EnumStyleKey::StatusCritical,
        _ => EnumStyleKey::StatusWarning,
    }
}

/// Build the `Data Quality` sheet.
pub fn build_quality_sheet(dataset: &Dataset, options: &SpecReportOptions) -> SpecSheet {
    let mut sheet = SpecSheet::new(C_SHEET_QUALITY);
    set_title(&mut sheet, C_TITLE_QUALITY, 4);
    let label = |text: &str| SpecCell::text(text).with_style(EnumStyleKey::Label);

    let mut row_idx = 2;
    set_section(&mut sheet, row_idx, "DATASET OVERVIEW", 4);
    let n_size_mb = dataset.estimated_size_bytes() as f64 / (1024.0 * 1024.0);
    let l_overview = [
        (
            "Total Records",
            SpecCell::number(dataset.n_records() as f64).with_style(EnumStyleKey::Integer),
        ),
        (
            "Total Columns",
            SpecCell::number(dataset.n_columns() as f64).with_style(EnumStyleKey::Integer),
        ),
        ("Date Range", SpecCell::text(format_period(dataset.derive_period()))),
        ("Memory Usage", SpecCell::text(format!("{n_size_mb:.2} MB"))),
    ];
    for (c_label, cell_value) in l_overview {
        row_idx += 1;
        sheet.set_cell(row_idx, 0, label(c_label));
        sheet.set_cell(row_idx, 1, cell_value);
    }

    row_idx += 3;
    set_section(&mut sheet, row_idx, "MISSING VALUES ANALYSIS", 4);
    row_idx += 1;
    for (col_idx, c_header) in ["Column", "Missing Count", "Missing %", "Data Type", "Status"]
        .into_iter()
        .enumerate()
    {
        sheet.set_cell(
            row_idx,
            col_idx,
            SpecCell::text(c_header).with_style(EnumStyleKey::SubHeader),
        );
    }
    for profile in dataset.derive_column_profiles() {
        row_idx += 1;
        let c_status = classify_missing(
            profile.n_missing,
            profile.pct_missing,
            options.pct_missing_critical,
        );
        sheet.set_cell(row_idx, 0, SpecCell::text(profile.name));
        sheet.set_cell(
            row_idx,
            1,
            SpecCell::number(profile.n_missing as f64).with_style(EnumStyleKey::Integer),
        );
        sheet.set_cell(
            row_idx,
            2,
            SpecCell::number(profile.pct_missing / 100.0).with_style(EnumStyleKey::Percent),
        );
        sheet.set_cell(row_idx, 3, SpecCell::text(profile.dtype_label));
        sheet.set_cell(
            row_idx,
            4,
            SpecCell::text(c_status).with_style(derive_status_style(c_status)),
        );
    }

    row_idx += 3;
    set_section(&mut sheet, row_idx, "DATA CLEANING ACTIONS PERFORMED", 4);
    for c_action in L_CLEANING_ACTIONS {
        row_idx += 1;
        sheet.set_merged_cell(row_idx, row_idx, 0, 4, SpecCell::text(c_action));
    }

    row_idx += 3;
    set_section(&mut sheet, row_idx, "DUPLICATE RECORDS CHECK", 4);
    row_idx += 1;
    let n_duplicates = dataset.n_duplicates();
    let (c_status, style_status) = if n_duplicates == 0 {
        (C_STATUS_CLEAN, EnumStyleKey::StatusClean)
    } else {
        (C_STATUS_HAS_DUPLICATES, EnumStyleKey::StatusCritical)
    };
    sheet.set_cell(row_idx, 0, label("Total Duplicate Records"));
    sheet.set_cell(
        row_idx,
        1,
        SpecCell::number(n_duplicates as f64).with_style(EnumStyleKey::Integer),
    );
    sheet.set_cell(row_idx, 2, SpecCell::text(c_status).with_style(style_status));

    for (col_idx, width) in [(0, 30.0), (1, 15.0), (2, 15.0), (3, 20.0), (4, 15.0)] {
        sheet.set_column_width(col_idx, width);
    }
    sheet
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
