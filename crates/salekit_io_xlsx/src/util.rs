//! Stateless helper utilities used by the XLSX writer kernel.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::conf::{N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX, TUP_EXCEL_ILLEGAL};
use crate::spec::{
    EnumCellValue, SpecAutofitCellsPolicy, SpecCellRange, SpecSheet, XlsxWriteError,
};

////////////////////////////////////////////////////////////////////////////////
// #region CellValueConversion

/// Normalize one cell value before it reaches the worksheet.
///
/// Missing values and non-finite numbers become blanks; everything else passes through.
pub fn convert_cell_value(value: &EnumCellValue) -> EnumCellValue {
    match value {
        EnumCellValue::Number(n) if !n.is_finite() => EnumCellValue::None,
        _ => value.clone(),
    }
}

/// Days since the Excel 1900 epoch (`1899-12-30`), as used by serial dates.
pub fn derive_excel_serial_date(date: NaiveDate) -> f64 {
    let date_epoch = NaiveDate::from_ymd_opt(1899, 12, 30).unwrap_or(NaiveDate::MIN);
    (date - date_epoch).num_days() as f64
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetNormalization

/// Replace invalid chars and trim to valid Excel sheet name.
pub fn sanitize_sheet_name(name: &str, replace_to: &str) -> String {
    let mut c_name = name.to_string();
    for c_illegal in TUP_EXCEL_ILLEGAL {
        c_name = c_name.replace(c_illegal, replace_to);
    }
    c_name = c_name.trim().to_string();
    if c_name.is_empty() {
        c_name = "Sheet".to_string();
    }

    c_name.chars().take(N_LEN_EXCEL_SHEET_NAME_MAX).collect()
}

/// Reject sheets whose grid exceeds Excel worksheet limits.
pub fn validate_sheet_bounds(sheet: &SpecSheet) -> Result<(), XlsxWriteError> {
    if sheet.rows.len() > N_NROWS_EXCEL_MAX {
        return Err(XlsxWriteError::IndexOverflow(format!(
            "sheet {:?} has {} rows; Excel limit is {N_NROWS_EXCEL_MAX}",
            sheet.name,
            sheet.rows.len()
        )));
    }
    let n_cols_max = sheet.rows.iter().map(Vec::len).max().unwrap_or(0);
    if n_cols_max > N_NCOLS_EXCEL_MAX {
        return Err(XlsxWriteError::IndexOverflow(format!(
            "sheet {:?} has {n_cols_max} columns; Excel limit is {N_NCOLS_EXCEL_MAX}",
            sheet.name
        )));
    }
    Ok(())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ChartRanges

/// Inclusive `(row_first, col_first, row_last, col_last)` bounds for a chart series.
///
/// A series bound to zero data rows is pointed at the single row starting the
/// range instead. That row is blank below a header-only table, so the chart
/// renders empty rather than failing range validation.
pub fn plan_chart_range(range: &SpecCellRange) -> (usize, usize, usize, usize) {
    let n_col_last = usize::max(range.col_start_inclusive, range.col_end_exclusive.saturating_sub(1));
    if range.n_rows() == 0 {
        return (
            range.row_start_inclusive,
            range.col_start_inclusive,
            range.row_start_inclusive,
            n_col_last,
        );
    }
    (
        range.row_start_inclusive,
        range.col_start_inclusive,
        range.row_end_exclusive - 1,
        n_col_last,
    )
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Autofit

/// Estimate displayed width units for one cell value.
pub fn estimate_width_len(value: &EnumCellValue) -> usize {
    match value {
        EnumCellValue::None => 0,
        EnumCellValue::String(s) => estimate_unicode_string_width(s),
        EnumCellValue::Number(n) => {
            if n.fract() == 0.0 {
                // Thousands separators add one char per three digits.
                let n_digits = format!("{:.0}", n.abs()).len();
                n_digits + (n_digits.saturating_sub(1)) / 3 + usize::from(*n < 0.0)
            } else {
                format!("{n:.2}").len() + 2
            }
        }
        EnumCellValue::Date(_) => 10,
    }
}

fn estimate_unicode_string_width(s: &str) -> usize {
    let n_ascii = s.chars().filter(|chr| chr.is_ascii()).count();
    let n_non_ascii = s.chars().count().saturating_sub(n_ascii);
    n_ascii + (n_non_ascii as f64 * 1.6).round() as usize
}

/// Plan column widths for the sheet's table region.
///
/// Each width is the wider of the header and body cells plus padding, clamped to
/// the policy bounds. Returns an empty plan when the sheet has no table.
pub fn plan_autofit_column_widths(
    sheet: &SpecSheet,
    policy: &SpecAutofitCellsPolicy,
) -> BTreeMap<usize, f64> {
    let mut dict_widths = BTreeMap::new();
    let Some(region) = sheet.table else {
        return dict_widths;
    };
    if region.n_cols == 0 {
        return dict_widths;
    }

    let n_min = usize::max(1, policy.width_cell_min);
    let n_max = usize::min(255, usize::max(n_min, policy.width_cell_max));

    for n_idx_col in 0..region.n_cols {
        let n_width_header = sheet
            .cell(region.row_header, n_idx_col)
            .map_or(0, |cell| estimate_width_len(&cell.value));
        let n_width_body = (0..region.n_rows_data)
            .filter_map(|n_offset| sheet.cell(region.row_header + 1 + n_offset, n_idx_col))
            .map(|cell| estimate_width_len(&cell.value))
            .max()
            .unwrap_or(0);

        let n_width_recorded = usize::max(n_width_header, n_width_body);
        let n_width_final = usize::min(
            n_max,
            usize::max(n_min, n_width_recorded + policy.width_cell_padding),
        );
        dict_widths.insert(n_idx_col, n_width_final as f64);
    }

    dict_widths
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region IndexCasts

pub(crate) fn cast_row_num(value: usize) -> Result<u32, XlsxWriteError> {
    u32::try_from(value).map_err(|_| XlsxWriteError::IndexOverflow(format!("row index {value}")))
}

pub(crate) fn cast_col_num(value: usize) -> Result<u16, XlsxWriteError> {
    u16::try_from(value)
        .map_err(|_| XlsxWriteError::IndexOverflow(format!("column index {value}")))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
