//! Report constants: sheet names, static texts and chart presets.

use salekit_io_xlsx::{
    EnumChartKind, EnumStyleKey, SpecCellFormat, SpecStyleTable, derive_default_report_styles,
};

use crate::spec::SpecReportOptions;

pub const C_SHEET_SUMMARY: &str = "Executive Summary";
pub const C_SHEET_DASHBOARD: &str = "Visual Dashboard";
pub const C_SHEET_QUALITY: &str = "Data Quality";
pub const C_SHEET_CATEGORY: &str = "Category Analysis";
pub const C_SHEET_GEOGRAPHY: &str = "Geography Analysis";
pub const C_SHEET_STATUS: &str = "Order Status";
pub const C_SHEET_SIZE: &str = "Size Analysis";
pub const C_SHEET_TREND: &str = "Sales Trend";
pub const C_SHEET_FULFILMENT: &str = "Fulfillment";
pub const C_SHEET_SEGMENT: &str = "B2B vs B2C";

/// Sheet names in workbook order.
pub const L_SHEET_NAMES: [&str; 10] = [
    C_SHEET_SUMMARY,
    C_SHEET_DASHBOARD,
    C_SHEET_QUALITY,
    C_SHEET_CATEGORY,
    C_SHEET_GEOGRAPHY,
    C_SHEET_STATUS,
    C_SHEET_SIZE,
    C_SHEET_TREND,
    C_SHEET_FULFILMENT,
    C_SHEET_SEGMENT,
];

pub const C_TITLE_SUMMARY: &str = "SALES ANALYSIS - EXECUTIVE SUMMARY";
pub const C_TITLE_DASHBOARD: &str = "SALES ANALYSIS - DASHBOARD";
pub const C_TITLE_QUALITY: &str = "DATA QUALITY & CLEANING REPORT";

/// Label of the group holding records whose key is missing.
pub const C_LABEL_MISSING: &str = "(missing)";
/// Placeholder for values that cannot be derived from an empty dataset.
pub const C_LABEL_NO_DATA: &str = "No data";
/// Suffix appended to chart titles bound to an empty table.
pub const C_SUFFIX_NO_DATA: &str = " (no data)";

pub const C_LABEL_B2B: &str = "B2B";
pub const C_LABEL_B2C: &str = "B2C";

pub const C_STATUS_CLEAN: &str = "Clean";
pub const C_STATUS_HAS_MISSING: &str = "Has Missing";
pub const C_STATUS_CRITICAL: &str = "Critical";
pub const C_STATUS_HAS_DUPLICATES: &str = "Has Duplicates";

/// `(priority label, recommendation)` rows of the executive summary.
pub const L_RECOMMENDATIONS: [(&str, &str); 4] = [
    (
        "→ Priority 1",
        "Reduce cancellation rate from 14.22% to <8% (₹4.9M opportunity)",
    ),
    (
        "→ Priority 2",
        "Optimize inventory for M, L, XL sizes (77% of sales)",
    ),
    (
        "→ Priority 3",
        "Expand B2B segment from 0.68% to 5% (₹4M+ potential)",
    ),
    (
        "→ Priority 4",
        "Strengthen top 5 states (account for 57% of revenue)",
    ),
];

pub const L_CLEANING_ACTIONS: [&str; 6] = [
    "1. Converted Date column to calendar dates (unparseable values set missing)",
    "2. Converted Amount to numeric, handling non-numeric values",
    "3. Converted Quantity to numeric format",
    "4. Decoded non-UTF-8 input as Windows-1252",
    "5. Skipped malformed rows during data loading",
    "6. All monetary values standardized to INR currency",
];

/// Chart geometry and labels for one table sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecChartPlan {
    pub sheet_name: &'static str,
    pub kind: EnumChartKind,
    pub title: String,
    pub name_x_axis: Option<String>,
    pub name_y_axis: Option<String>,
    pub col_values: usize,
    pub col_categories: Option<usize>,
    pub if_show_percent: bool,
    pub anchor: (usize, usize),
    pub style: u8,
    pub width: u32,
    pub height: u32,
}

/// Chart presets for every table sheet, in workbook order.
pub fn derive_chart_plans(options: &SpecReportOptions) -> Vec<SpecChartPlan> {
    let c_revenue_axis = format!("Revenue ({})", options.currency_symbol);
    let plan = |sheet_name: &'static str, kind: EnumChartKind, title: String| SpecChartPlan {
        sheet_name,
        kind,
        title,
        name_x_axis: None,
        name_y_axis: None,
        col_values: 1,
        col_categories: Some(0),
        if_show_percent: false,
        anchor: (1, 4),
        style: 10,
        width: 480,
        height: 288,
    };

    vec![
        SpecChartPlan {
            name_x_axis: Some("Category".to_string()),
            name_y_axis: Some(c_revenue_axis.clone()),
            col_values: 2,
            anchor: (1, 5),
            width: 756,
            height: 454,
            ..plan(
                C_SHEET_CATEGORY,
                EnumChartKind::Column,
                "Revenue by Product Category".to_string(),
            )
        },
        SpecChartPlan {
            // Horizontal bars: x is the value axis.
            name_x_axis: Some(c_revenue_axis.clone()),
            name_y_axis: Some("State".to_string()),
            col_values: 2,
            style: 12,
            width: 756,
            height: 567,
            ..plan(
                C_SHEET_GEOGRAPHY,
                EnumChartKind::Bar,
                format!("Top {} States by Revenue", options.n_top_states),
            )
        },
        SpecChartPlan {
            if_show_percent: true,
            ..plan(
                C_SHEET_STATUS,
                EnumChartKind::Pie,
                "Order Status Distribution".to_string(),
            )
        },
        SpecChartPlan {
            name_x_axis: Some("Size".to_string()),
            name_y_axis: Some("Quantity".to_string()),
            anchor: (1, 3),
            style: 11,
            width: 680,
            height: 454,
            ..plan(
                C_SHEET_SIZE,
                EnumChartKind::Column,
                "Quantity Sold by Size".to_string(),
            )
        },
        SpecChartPlan {
            name_x_axis: Some("Date".to_string()),
            name_y_axis: Some(c_revenue_axis),
            style: 13,
            width: 945,
            height: 454,
            ..plan(
                C_SHEET_TREND,
                EnumChartKind::Line,
                "Daily Revenue Trend".to_string(),
            )
        },
        SpecChartPlan {
            if_show_percent: true,
            ..plan(
                C_SHEET_FULFILMENT,
                EnumChartKind::Pie,
                "Orders by Fulfillment Method".to_string(),
            )
        },
        SpecChartPlan {
            name_y_axis: Some("Number of Orders".to_string()),
            anchor: (1, 5),
            ..plan(
                C_SHEET_SEGMENT,
                EnumChartKind::Column,
                "B2B vs B2C - Orders Comparison".to_string(),
            )
        },
    ]
}

/// Default style table with the currency format bound to `options.currency_symbol`.
pub fn derive_report_styles(options: &SpecReportOptions) -> SpecStyleTable {
    let mut dict_fmt = derive_default_report_styles();
    dict_fmt.insert(
        EnumStyleKey::Currency.as_str().to_string(),
        SpecCellFormat {
            num_format: Some(format!("\"{}\"#,##0.00", options.currency_symbol)),
            ..Default::default()
        },
    );
    dict_fmt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chart_plans_cover_every_table_sheet_once() {
        let l_plans = derive_chart_plans(&SpecReportOptions::default());
        let l_names: Vec<&str> = l_plans.iter().map(|plan| plan.sheet_name).collect();
        assert_eq!(l_names, L_SHEET_NAMES[3..].to_vec());
        assert_eq!(l_plans[1].title, "Top 15 States by Revenue");
        assert!(l_plans.iter().filter(|p| p.if_show_percent).count() == 2);
    }

    #[test]
    fn test_report_styles_follow_currency_symbol() {
        let options = SpecReportOptions {
            currency_symbol: "$".to_string(),
            ..Default::default()
        };
        let dict_fmt = derive_report_styles(&options);
        assert_eq!(
            dict_fmt["currency"].num_format.as_deref(),
            Some("\"$\"#,##0.00")
        );
    }
}
