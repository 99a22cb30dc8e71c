//! Chart attachment for the table sheets.

use log::{debug, warn};
use salekit_io_xlsx::{SpecChart, SpecSheet, SpecWorkbook};

use crate::conf::{C_SUFFIX_NO_DATA, SpecChartPlan, derive_chart_plans};
use crate::spec::SpecReportOptions;

/// Bind `plan` to the table region of `sheet`.
///
/// Returns `None` when the sheet has no table region. Row bounds come from the
/// region, so the series always covers exactly the rows that were written.
pub fn derive_chart(sheet: &SpecSheet, plan: &SpecChartPlan) -> Option<SpecChart> {
    let region = sheet.table?;
    let mut title = plan.title.clone();
    if region.n_rows_data == 0 {
        title.push_str(C_SUFFIX_NO_DATA);
    }
    Some(SpecChart {
        kind: plan.kind,
        title,
        name_x_axis: plan.name_x_axis.clone(),
        name_y_axis: plan.name_y_axis.clone(),
        range_values: region.data_range(plan.col_values),
        range_categories: plan.col_categories.map(|col_idx| region.data_range(col_idx)),
        cell_series_name: Some((region.row_header, plan.col_values)),
        if_show_percent: plan.if_show_percent,
        anchor: plan.anchor,
        style: plan.style,
        width: plan.width,
        height: plan.height,
    })
}

/// Attach one chart to each table sheet of `workbook`.
pub fn attach_charts(workbook: &mut SpecWorkbook, options: &SpecReportOptions) {
    for plan in derive_chart_plans(options) {
        let Some(sheet) = workbook.sheet_mut(plan.sheet_name) else {
            warn!("no sheet {:?} for chart {:?}", plan.sheet_name, plan.title);
            continue;
        };
        match derive_chart(sheet, &plan) {
            Some(chart) => {
                debug!(
                    "chart {:?} on {:?}: {} row(s)",
                    chart.title,
                    plan.sheet_name,
                    chart.range_values.n_rows()
                );
                sheet.chart = Some(chart);
            }
            None => warn!("sheet {:?} has no table; chart skipped", plan.sheet_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use salekit_io_xlsx::{EnumChartKind, SpecTableRegion};

    use super::*;
    use crate::conf::C_SHEET_STATUS;

    fn derive_plan() -> SpecChartPlan {
        derive_chart_plans(&SpecReportOptions::default())
            .into_iter()
            .find(|plan| plan.sheet_name == C_SHEET_STATUS)
            .expect("status plan")
    }

    #[test]
    fn test_chart_is_bound_to_table_rows() {
        let mut sheet = SpecSheet::new(C_SHEET_STATUS);
        sheet.table = Some(SpecTableRegion {
            row_header: 0,
            n_rows_data: 5,
            n_cols: 3,
        });
        let chart = derive_chart(&sheet, &derive_plan()).expect("chart");

        assert_eq!(chart.kind, EnumChartKind::Pie);
        assert!(chart.if_show_percent);
        assert_eq!(chart.range_values.row_start_inclusive, 1);
        assert_eq!(chart.range_values.row_end_exclusive, 6);
        assert_eq!(chart.range_values.col_start_inclusive, 1);
        assert_eq!(chart.range_categories.map(|r| r.col_start_inclusive), Some(0));
        assert_eq!(chart.cell_series_name, Some((0, 1)));
        assert_eq!(chart.title, "Order Status Distribution");
    }

    #[test]
    fn test_empty_table_gets_no_data_title() {
        let mut sheet = SpecSheet::new(C_SHEET_STATUS);
        sheet.table = Some(SpecTableRegion {
            row_header: 0,
            n_rows_data: 0,
            n_cols: 3,
        });
        let chart = derive_chart(&sheet, &derive_plan()).expect("chart");
        assert!(chart.range_values.is_empty());
        assert_eq!(chart.title, "Order Status Distribution (no data)");
    }

    #[test]
    fn test_sheet_without_table_gets_no_chart() {
        let sheet = SpecSheet::new(C_SHEET_STATUS);
        assert!(derive_chart(&sheet, &derive_plan()).is_none());
    }
}
