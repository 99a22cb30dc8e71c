//! Pure report assembly: dataset in, ten-sheet workbook out.

use log::info;
use salekit_io_csv::Dataset;
use salekit_io_xlsx::{EnumStyleKey, SpecCell, SpecSheet, SpecTableRegion, SpecWorkbook};

use crate::aggregate::{compute_kpis, compute_rollups};
use crate::chart::attach_charts;
use crate::conf::{
    C_SHEET_CATEGORY, C_SHEET_FULFILMENT, C_SHEET_GEOGRAPHY, C_SHEET_SEGMENT, C_SHEET_SIZE,
    C_SHEET_STATUS, C_SHEET_TREND,
};
use crate::spec::{SpecGroup, SpecReportOptions, SpecRollup, SpecRollupSet, SpecSalesKpis};
use crate::summary::{build_dashboard_sheet, build_quality_sheet, build_summary_sheet};
use crate::util::{derive_key_label, derive_segment_label};

////////////////////////////////////////////////////////////////////////////////
// #region CellHelpers

fn cell_key(key: Option<&str>) -> SpecCell {
    SpecCell::text(derive_key_label(key)).with_style(EnumStyleKey::Text)
}

fn cell_count(n: usize) -> SpecCell {
    SpecCell::number(n as f64).with_style(EnumStyleKey::Integer)
}

fn cell_qty(qty: f64) -> SpecCell {
    SpecCell::number(qty).with_style(EnumStyleKey::Integer)
}

fn cell_money(amount: f64) -> SpecCell {
    SpecCell::number(amount).with_style(EnumStyleKey::Currency)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region TableSheets

/// Header row plus one row per group, in roll-up order.
///
/// The sheet always carries a table region, possibly with zero data rows.
pub fn build_table_sheet<K>(
    name: &str,
    l_headers: &[&str],
    rollup: &SpecRollup<K>,
    derive_row: impl Fn(&SpecGroup<K>) -> Vec<SpecCell>,
) -> SpecSheet {
    let mut sheet = SpecSheet::new(name);
    for (col_idx, c_header) in l_headers.iter().enumerate() {
        sheet.set_cell(
            0,
            col_idx,
            SpecCell::text(*c_header).with_style(EnumStyleKey::Header),
        );
    }
    for (n_idx, group) in rollup.groups.iter().enumerate() {
        for (col_idx, cell) in derive_row(group).into_iter().enumerate() {
            sheet.set_cell(n_idx + 1, col_idx, cell);
        }
    }
    sheet.row_freeze = Some(1);
    sheet.table = Some(SpecTableRegion {
        row_header: 0,
        n_rows_data: rollup.len(),
        n_cols: l_headers.len(),
    });
    sheet
}

fn build_rollup_sheets(kpis: &SpecSalesKpis, rollups: &SpecRollupSet) -> Vec<SpecSheet> {
    let n_orders = kpis.n_orders;
    vec![
        build_table_sheet(
            C_SHEET_CATEGORY,
            &["Category", "Quantity", "Revenue", "Orders"],
            &rollups.category,
            |group| {
                vec![
                    cell_key(group.key.as_deref()),
                    cell_qty(group.qty_sum),
                    cell_money(group.amount_sum),
                    cell_count(group.n_records),
                ]
            },
        ),
        build_table_sheet(
            C_SHEET_GEOGRAPHY,
            &["State", "Orders", "Revenue"],
            &rollups.state,
            |group| {
                vec![
                    cell_key(group.key.as_deref()),
                    cell_count(group.n_records),
                    cell_money(group.amount_sum),
                ]
            },
        ),
        build_table_sheet(
            C_SHEET_STATUS,
            &["Order Status", "Count", "Percentage"],
            &rollups.status,
            |group| {
                let pct = if n_orders == 0 {
                    0.0
                } else {
                    group.n_records as f64 / n_orders as f64
                };
                vec![
                    cell_key(group.key.as_deref()),
                    cell_count(group.n_records),
                    SpecCell::number(pct).with_style(EnumStyleKey::Percent),
                ]
            },
        ),
        build_table_sheet(
            C_SHEET_SIZE,
            &["Size", "Quantity Sold"],
            &rollups.size,
            |group| vec![cell_key(group.key.as_deref()), cell_qty(group.qty_sum)],
        ),
        build_table_sheet(
            C_SHEET_TREND,
            &["Date", "Revenue", "Orders"],
            &rollups.daily,
            |group| {
                vec![
                    group.key.map_or_else(SpecCell::blank, |date| {
                        SpecCell::date(date).with_style(EnumStyleKey::Date)
                    }),
                    cell_money(group.amount_sum),
                    cell_count(group.n_records),
                ]
            },
        ),
        build_table_sheet(
            C_SHEET_FULFILMENT,
            &["Fulfillment Method", "Orders", "Revenue"],
            &rollups.fulfilment,
            |group| {
                vec![
                    cell_key(group.key.as_deref()),
                    cell_count(group.n_records),
                    cell_money(group.amount_sum),
                ]
            },
        ),
        build_table_sheet(
            C_SHEET_SEGMENT,
            &["Customer Type", "Orders", "Total Revenue", "Avg Order Value"],
            &rollups.segment,
            |group| {
                vec![
                    SpecCell::text(derive_segment_label(group.key)).with_style(EnumStyleKey::Text),
                    cell_count(group.n_records),
                    cell_money(group.amount_sum),
                    SpecCell::number_or_blank(group.amount_mean()).with_style(EnumStyleKey::Currency),
                ]
            },
        ),
    ]
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Entry

/// Assemble the ten sheets from precomputed metrics. Charts are not attached.
pub fn build_report(
    dataset: &Dataset,
    kpis: &SpecSalesKpis,
    rollups: &SpecRollupSet,
    options: &SpecReportOptions,
) -> SpecWorkbook {
    let mut sheets = vec![
        build_summary_sheet(kpis, rollups, options),
        build_dashboard_sheet(kpis),
        build_quality_sheet(dataset, options),
    ];
    sheets.extend(build_rollup_sheets(kpis, rollups));
    SpecWorkbook { sheets }
}

/// Aggregate `dataset`, build every sheet and attach the charts.
///
/// Deterministic: equal inputs give equal workbooks.
pub fn build(dataset: &Dataset, options: &SpecReportOptions) -> SpecWorkbook {
    let kpis = compute_kpis(dataset, options);
    info!(
        "kpis: orders={} revenue={:.2} cancelled={:.4} shipped={:.4}",
        kpis.n_orders, kpis.revenue_total, kpis.rate_cancelled, kpis.rate_shipped
    );
    let rollups = compute_rollups(dataset, options);

    let mut workbook = build_report(dataset, &kpis, &rollups, options);
    attach_charts(&mut workbook, options);
    info!("built {} sheet(s)", workbook.sheets.len());
    workbook
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
