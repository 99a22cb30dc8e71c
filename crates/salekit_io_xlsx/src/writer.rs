//! XLSX writer kernel that serializes a [`SpecWorkbook`] into one file.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use rust_xlsxwriter::{
    Chart, ChartDataLabel, ChartType, Format, FormatAlign, FormatBorder, Workbook, Worksheet,
};

use crate::conf::{N_LEN_EXCEL_SHEET_NAME_MAX, SpecStyleTable};
use crate::spec::{
    EnumCellValue, EnumChartKind, SpecCell, SpecCellFormat, SpecChart, SpecSheet,
    SpecSheetWritten, SpecWorkbook, SpecXlsxReport, SpecXlsxWriteOptions, XlsxWriteError,
};
use crate::util::{
    cast_col_num, cast_row_num, convert_cell_value, derive_excel_serial_date,
    plan_autofit_column_widths, plan_chart_range, sanitize_sheet_name, validate_sheet_bounds,
};

/// Stateful workbook writer.
///
/// Sheets are buffered in memory; nothing touches the destination until
/// [`Self::close`] serializes the whole workbook in one step.
pub struct XlsxWriter {
    path_file_out: PathBuf,
    workbook: Workbook,
    styles: SpecStyleTable,
    write_options: SpecXlsxWriteOptions,
    dict_formats_cached: BTreeMap<Vec<String>, Format>,
    set_sheet_names_existing: BTreeSet<String>,
    report: SpecXlsxReport,
    if_closed: bool,
}

impl XlsxWriter {
    /// Create writer bound to output path, style table and write options.
    pub fn new(
        path_file_out: PathBuf,
        styles: SpecStyleTable,
        write_options: SpecXlsxWriteOptions,
    ) -> Self {
        Self {
            path_file_out,
            workbook: Workbook::new(),
            styles,
            write_options,
            dict_formats_cached: BTreeMap::new(),
            set_sheet_names_existing: BTreeSet::new(),
            report: SpecXlsxReport::default(),
            if_closed: false,
        }
    }

    /// Return snapshot of the write report so far.
    pub fn report(&self) -> SpecXlsxReport {
        self.report.clone()
    }

    /// Serialize the workbook and move it into place. Idempotent.
    ///
    /// The bytes go to a hidden sibling file first and are renamed over the
    /// destination, so an existing file is replaced whole or not at all.
    pub fn close(&mut self) -> Result<(), XlsxWriteError> {
        if self.if_closed {
            return Ok(());
        }

        let path_dir_out = derive_output_directory(&self.path_file_out);
        if !path_dir_out.is_dir() {
            return Err(XlsxWriteError::DestinationNotFound(path_dir_out));
        }
        let Some(c_file_name) = self.path_file_out.file_name() else {
            return Err(XlsxWriteError::InvalidDestination(self.path_file_out.clone()));
        };

        let v_bytes = self.workbook.save_to_buffer()?;
        let path_file_tmp =
            path_dir_out.join(format!(".{}.tmp", c_file_name.to_string_lossy()));

        if let Err(err) = fs::write(&path_file_tmp, &v_bytes) {
            let _ = fs::remove_file(&path_file_tmp);
            return Err(XlsxWriteError::Io {
                path: path_file_tmp,
                source: err,
            });
        }
        if let Err(err) = fs::rename(&path_file_tmp, &self.path_file_out) {
            let _ = fs::remove_file(&path_file_tmp);
            return Err(XlsxWriteError::Io {
                path: self.path_file_out.clone(),
                source: err,
            });
        }

        debug!(
            "wrote {} bytes to {}",
            v_bytes.len(),
            self.path_file_out.display()
        );
        self.if_closed = true;
        Ok(())
    }

    /// Write every sheet of `workbook` in order.
    pub fn write_workbook(&mut self, workbook: &SpecWorkbook) -> Result<(), XlsxWriteError> {
        for sheet in &workbook.sheets {
            self.write_sheet(sheet)?;
        }
        Ok(())
    }

    /// Write one sheet, including merges, layout and its chart.
    pub fn write_sheet(&mut self, sheet: &SpecSheet) -> Result<(), XlsxWriteError> {
        if self.if_closed {
            return Err(XlsxWriteError::Closed);
        }
        validate_sheet_bounds(sheet)?;

        let sheet_name_unique = self.derive_unique_sheet_name(&sanitize_sheet_name(&sheet.name, "_"));
        if sheet_name_unique != sheet.name {
            self.report.warn(format!(
                "Sheet {:?} renamed to {sheet_name_unique:?}.",
                sheet.name
            ));
        }

        // Resolve every format up front; the worksheet borrow below is exclusive.
        let mut l_fmt_rows: Vec<Vec<Format>> = Vec::with_capacity(sheet.rows.len());
        for row in &sheet.rows {
            let mut l_fmt_row = Vec::with_capacity(row.len());
            for cell in row {
                l_fmt_row.push(self.derive_cell_format(&cell.styles));
            }
            l_fmt_rows.push(l_fmt_row);
        }

        let policy_autofit = self.write_options.autofit.clone();

        let worksheet = self.workbook.add_worksheet();
        worksheet.set_name(&sheet_name_unique)?;

        let mut dict_widths = plan_autofit_column_widths(sheet, &policy_autofit);
        dict_widths.extend(sheet.column_widths.iter().map(|(k, v)| (*k, *v)));
        for (col_idx, width) in &dict_widths {
            worksheet.set_column_width(cast_col_num(*col_idx)?, *width)?;
        }
        for (row_idx, height) in &sheet.row_heights {
            worksheet.set_row_height(cast_row_num(*row_idx)?, *height)?;
        }

        for merge in &sheet.merges {
            let fmt_anchor = l_fmt_rows
                .get(merge.row_idx_start)
                .and_then(|row| row.get(merge.col_idx_start))
                .cloned()
                .unwrap_or_else(Format::new);
            worksheet.merge_range(
                cast_row_num(merge.row_idx_start)?,
                cast_col_num(merge.col_idx_start)?,
                cast_row_num(merge.row_idx_end)?,
                cast_col_num(merge.col_idx_end)?,
                "",
                &fmt_anchor,
            )?;
        }

        for (row_idx, row) in sheet.rows.iter().enumerate() {
            for (col_idx, cell) in row.iter().enumerate() {
                if sheet
                    .merges
                    .iter()
                    .any(|merge| merge.covers_non_anchor(row_idx, col_idx))
                {
                    continue;
                }
                let value = convert_cell_value(&cell.value);
                write_cell_with_format(
                    worksheet,
                    row_idx,
                    col_idx,
                    &value,
                    cell,
                    &l_fmt_rows[row_idx][col_idx],
                )?;
            }
        }

        if let Some(n_row_freeze) = sheet.row_freeze {
            worksheet.set_freeze_panes(cast_row_num(n_row_freeze)?, 0)?;
        }

        if let Some(chart) = &sheet.chart {
            write_chart(worksheet, &sheet_name_unique, chart)?;
        }

        self.report.sheets.push(SpecSheetWritten {
            sheet_name: sheet_name_unique,
            n_rows: sheet.rows.len(),
            if_has_chart: sheet.chart.is_some(),
        });
        Ok(())
    }

    fn derive_cell_format(&mut self, styles: &[String]) -> Format {
        if let Some(format) = self.dict_formats_cached.get(styles) {
            return format.clone();
        }

        let mut fmt_spec = self.write_options.base_format_patch.clone();
        for c_style in styles {
            match self.styles.get(c_style) {
                Some(fmt_patch) => fmt_spec = fmt_spec.merge(fmt_patch),
                None => {
                    warn!("unknown style {c_style:?}; ignored");
                    self.report.warn(format!("Unknown style {c_style:?} ignored."));
                }
            }
        }

        let format = derive_rust_xlsx_format(&fmt_spec);
        self.dict_formats_cached
            .insert(styles.to_vec(), format.clone());
        format
    }

    fn derive_unique_sheet_name(&mut self, name: &str) -> String {
        if !self.set_sheet_names_existing.contains(name) {
            self.set_sheet_names_existing.insert(name.to_string());
            return name.to_string();
        }

        let base_name: String = name
            .chars()
            .take(usize::max(1, N_LEN_EXCEL_SHEET_NAME_MAX - 3))
            .collect();

        let mut n_idx = 2usize;
        loop {
            let candidate: String = format!("{base_name}__{n_idx}")
                .chars()
                .take(N_LEN_EXCEL_SHEET_NAME_MAX)
                .collect();
            if !self.set_sheet_names_existing.contains(&candidate) {
                self.set_sheet_names_existing.insert(candidate.clone());
                return candidate;
            }
            n_idx += 1;
        }
    }
}

/// Serialize `workbook` to `path_file_out` with the given style table.
pub fn save_workbook(
    workbook: &SpecWorkbook,
    path_file_out: &Path,
    styles: SpecStyleTable,
    write_options: SpecXlsxWriteOptions,
) -> Result<SpecXlsxReport, XlsxWriteError> {
    let mut writer = XlsxWriter::new(path_file_out.to_path_buf(), styles, write_options);
    writer.write_workbook(workbook)?;
    writer.close()?;
    Ok(writer.report())
}

fn derive_output_directory(path_file_out: &Path) -> PathBuf {
    match path_file_out.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn write_cell_with_format(
    worksheet: &mut Worksheet,
    row_idx: usize,
    col_idx: usize,
    value: &EnumCellValue,
    cell: &SpecCell,
    format: &Format,
) -> Result<(), XlsxWriteError> {
    let n_row = cast_row_num(row_idx)?;
    let n_col = cast_col_num(col_idx)?;
    match value {
        EnumCellValue::None => {
            if !cell.styles.is_empty() {
                worksheet.write_blank(n_row, n_col, format)?;
            }
        }
        EnumCellValue::String(val) => {
            worksheet.write_string_with_format(n_row, n_col, val, format)?;
        }
        EnumCellValue::Number(val) => {
            worksheet.write_number_with_format(n_row, n_col, *val, format)?;
        }
        EnumCellValue::Date(val) => {
            worksheet.write_number_with_format(
                n_row,
                n_col,
                derive_excel_serial_date(*val),
                format,
            )?;
        }
    }
    Ok(())
}

fn write_chart(
    worksheet: &mut Worksheet,
    sheet_name: &str,
    spec: &SpecChart,
) -> Result<(), XlsxWriteError> {
    let mut chart = Chart::new(match spec.kind {
        EnumChartKind::Column => ChartType::Column,
        EnumChartKind::Bar => ChartType::Bar,
        EnumChartKind::Pie => ChartType::Pie,
        EnumChartKind::Line => ChartType::Line,
    });

    chart.title().set_name(spec.title.as_str());
    if spec.kind != EnumChartKind::Pie {
        if let Some(c_name) = &spec.name_x_axis {
            chart.x_axis().set_name(c_name.as_str());
        }
        if let Some(c_name) = &spec.name_y_axis {
            chart.y_axis().set_name(c_name.as_str());
        }
    }
    chart.set_style(spec.style);
    chart.set_width(spec.width);
    chart.set_height(spec.height);

    let (n_row_first, n_col_first, n_row_last, n_col_last) = plan_chart_range(&spec.range_values);
    let series = chart.add_series();
    series.set_values((
        sheet_name,
        cast_row_num(n_row_first)?,
        cast_col_num(n_col_first)?,
        cast_row_num(n_row_last)?,
        cast_col_num(n_col_last)?,
    ));
    if let Some(range_categories) = &spec.range_categories {
        let (n_row_first, n_col_first, n_row_last, n_col_last) =
            plan_chart_range(range_categories);
        series.set_categories((
            sheet_name,
            cast_row_num(n_row_first)?,
            cast_col_num(n_col_first)?,
            cast_row_num(n_row_last)?,
            cast_col_num(n_col_last)?,
        ));
    }
    if let Some((row_idx, col_idx)) = spec.cell_series_name {
        series.set_name((sheet_name, cast_row_num(row_idx)?, cast_col_num(col_idx)?));
    }
    if spec.if_show_percent {
        let mut data_label = ChartDataLabel::new();
        data_label.show_percentage();
        series.set_data_label(&data_label);
    }

    worksheet.insert_chart(
        cast_row_num(spec.anchor.0)?,
        cast_col_num(spec.anchor.1)?,
        &chart,
    )?;
    Ok(())
}

fn derive_rust_xlsx_format(spec: &SpecCellFormat) -> Format {
    let mut format = Format::new();

    if let Some(val) = &spec.font_name {
        format = format.set_font_name(val.clone());
    }
    if let Some(val) = spec.font_size {
        format = format.set_font_size(val as f64);
    }
    if spec.bold.unwrap_or(false) {
        format = format.set_bold();
    }

    if let Some(align) = spec.align.as_deref().and_then(derive_format_align) {
        format = format.set_align(align);
    }
    if let Some(align) = spec.valign.as_deref().and_then(derive_format_align) {
        format = format.set_align(align);
    }

    if let Some(val) = &spec.num_format {
        format = format.set_num_format(val.clone());
    }
    if let Some(val) = &spec.bg_color {
        format = format.set_background_color(val.as_str());
    }
    if let Some(val) = &spec.font_color {
        format = format.set_font_color(val.as_str());
    }
    if let Some(val) = spec.border {
        format = format.set_border(derive_format_border(val));
    }

    format
}

fn derive_format_border(border: i64) -> FormatBorder {
    match border {
        1 => FormatBorder::Thin,
        2 => FormatBorder::Medium,
        3 => FormatBorder::Dashed,
        4 => FormatBorder::Dotted,
        5 => FormatBorder::Thick,
        6 => FormatBorder::Double,
        _ => FormatBorder::None,
    }
}

fn derive_format_align(align: &str) -> Option<FormatAlign> {
    let value = align.trim().to_ascii_lowercase();
    match value.as_str() {
        "general" => Some(FormatAlign::General),
        "left" => Some(FormatAlign::Left),
        "center" => Some(FormatAlign::Center),
        "right" => Some(FormatAlign::Right),
        "center_across" => Some(FormatAlign::CenterAcross),
        "top" => Some(FormatAlign::Top),
        "bottom" => Some(FormatAlign::Bottom),
        "vcenter" | "vertical_center" => Some(FormatAlign::VerticalCenter),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use calamine::{Data, Reader, Xlsx, open_workbook};

    use super::*;
    use crate::conf::derive_default_report_styles;
    use crate::spec::{SpecCellRange, SpecTableRegion};

    fn derive_table_sheet(name: &str, l_rows: &[(&str, f64)]) -> SpecSheet {
        let mut sheet = SpecSheet::new(name);
        sheet.set_cell(0, 0, SpecCell::text("Key").with_style("header"));
        sheet.set_cell(0, 1, SpecCell::text("Value").with_style("header"));
        for (n_idx, (c_key, n_val)) in l_rows.iter().enumerate() {
            sheet.set_cell(n_idx + 1, 0, SpecCell::text(*c_key));
            sheet.set_cell(n_idx + 1, 1, SpecCell::number(*n_val).with_style("decimal"));
        }
        let region = SpecTableRegion {
            row_header: 0,
            n_rows_data: l_rows.len(),
            n_cols: 2,
        };
        sheet.table = Some(region);
        sheet.chart = Some(SpecChart {
            kind: EnumChartKind::Pie,
            title: "Share".to_string(),
            name_x_axis: None,
            name_y_axis: None,
            range_values: region.data_range(1),
            range_categories: Some(region.data_range(0)),
            cell_series_name: Some((0, 1)),
            if_show_percent: true,
            anchor: (1, 4),
            style: 10,
            width: 480,
            height: 288,
        });
        sheet
    }

    #[test]
    fn test_save_workbook_round_trips_values_and_merges() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path_file_out = tmp.path().join("out.xlsx");

        let mut sheet_title = SpecSheet::new("Summary");
        sheet_title.set_merged_cell(0, 0, 0, 3, SpecCell::text("TITLE").with_style("title"));
        sheet_title.set_cell(1, 0, SpecCell::text("Orders").with_style("label"));
        sheet_title.set_cell(1, 1, SpecCell::number(3.0).with_style("integer"));

        let workbook = SpecWorkbook {
            sheets: vec![
                sheet_title,
                derive_table_sheet("Status", &[("Shipped", 2.0), ("Pending", 1.0)]),
            ],
        };

        let report = save_workbook(
            &workbook,
            &path_file_out,
            derive_default_report_styles(),
            SpecXlsxWriteOptions::default(),
        )
        .expect("save");
        assert_eq!(report.sheets.len(), 2);
        assert!(report.sheets[1].if_has_chart);
        assert!(report.warnings.is_empty());

        let mut xlsx: Xlsx<_> = open_workbook(&path_file_out).expect("open");
        assert_eq!(xlsx.sheet_names(), vec!["Summary".to_string(), "Status".to_string()]);
        let range = xlsx.worksheet_range("Summary").expect("range");
        assert_eq!(range.get_value((0, 0)), Some(&Data::String("TITLE".to_string())));
        assert_eq!(range.get_value((1, 1)), Some(&Data::Float(3.0)));
    }

    #[test]
    fn test_chart_over_header_only_table_still_saves() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path_file_out = tmp.path().join("empty.xlsx");
        let workbook = SpecWorkbook {
            sheets: vec![derive_table_sheet("Empty", &[])],
        };

        let report = save_workbook(
            &workbook,
            &path_file_out,
            derive_default_report_styles(),
            SpecXlsxWriteOptions::default(),
        )
        .expect("save");
        assert_eq!(report.sheets[0].n_rows, 1);
        assert!(path_file_out.exists());
    }

    #[test]
    fn test_close_fails_when_directory_is_missing() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path_file_out = tmp.path().join("missing").join("out.xlsx");
        let workbook = SpecWorkbook {
            sheets: vec![SpecSheet::new("Only")],
        };

        let err = save_workbook(
            &workbook,
            &path_file_out,
            derive_default_report_styles(),
            SpecXlsxWriteOptions::default(),
        )
        .expect_err("missing directory");
        assert!(matches!(err, XlsxWriteError::DestinationNotFound(_)));
        assert!(!path_file_out.exists());
    }

    #[test]
    fn test_duplicate_and_unknown_styles_are_reported() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let mut writer = XlsxWriter::new(
            tmp.path().join("dup.xlsx"),
            derive_default_report_styles(),
            SpecXlsxWriteOptions::default(),
        );

        let mut sheet = SpecSheet::new("Same");
        sheet.set_cell(0, 0, SpecCell::text("x").with_style("no_such_style"));
        writer.write_sheet(&sheet).expect("first");
        writer.write_sheet(&sheet).expect("second");
        writer.close().expect("close");
        writer.close().expect("close is idempotent");

        let report = writer.report();
        assert_eq!(report.sheets[1].sheet_name, "Same__2");
        assert!(report.warnings.iter().any(|w| w.contains("no_such_style")));
        assert!(matches!(writer.write_sheet(&sheet), Err(XlsxWriteError::Closed)));
    }

    fn list_tmp_siblings(path_dir: &Path) -> Vec<String> {
        fs::read_dir(path_dir)
            .expect("read dir")
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|name| name.ends_with(".tmp"))
            .collect()
    }

    #[test]
    fn test_missing_and_non_finite_values_are_written_blank() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path_file_out = tmp.path().join("blank.xlsx");
        let mut sheet = derive_table_sheet("Values", &[("NaN", f64::NAN), ("Inf", f64::INFINITY)]);
        sheet.set_cell(3, 1, SpecCell::new(EnumCellValue::None).with_style("decimal"));
        sheet.set_cell(3, 0, SpecCell::text("Missing"));
        let workbook = SpecWorkbook {
            sheets: vec![sheet],
        };

        save_workbook(
            &workbook,
            &path_file_out,
            derive_default_report_styles(),
            SpecXlsxWriteOptions::default(),
        )
        .expect("save");

        let mut xlsx: Xlsx<_> = open_workbook(&path_file_out).expect("open");
        let range = xlsx.worksheet_range("Values").expect("range");
        for n_row in 1..=3 {
            assert!(
                matches!(range.get_value((n_row, 1)), None | Some(Data::Empty)),
                "row {n_row}: {:?}",
                range.get_value((n_row, 1))
            );
        }
        assert_eq!(range.get_value((3, 0)), Some(&Data::String("Missing".to_string())));
    }

    #[test]
    fn test_second_save_replaces_first_and_leaves_no_tmp_file() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path_file_out = tmp.path().join("twice.xlsx");

        for n_value in [1.0, 2.0] {
            let workbook = SpecWorkbook {
                sheets: vec![derive_table_sheet("Status", &[("Shipped", n_value)])],
            };
            save_workbook(
                &workbook,
                &path_file_out,
                derive_default_report_styles(),
                SpecXlsxWriteOptions::default(),
            )
            .expect("save");
        }

        let mut xlsx: Xlsx<_> = open_workbook(&path_file_out).expect("open");
        let range = xlsx.worksheet_range("Status").expect("range");
        assert_eq!(range.get_value((1, 1)), Some(&Data::Float(2.0)));
        assert!(list_tmp_siblings(tmp.path()).is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_close_into_read_only_directory_fails_without_tmp_file() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().expect("tempdir");
        let path_dir_out = tmp.path().join("locked");
        fs::create_dir(&path_dir_out).expect("create dir");
        fs::set_permissions(&path_dir_out, fs::Permissions::from_mode(0o555)).expect("chmod");

        // Privileged users ignore directory permissions.
        let path_file_check = path_dir_out.join("check");
        if fs::write(&path_file_check, b"").is_ok() {
            let _ = fs::remove_file(&path_file_check);
            fs::set_permissions(&path_dir_out, fs::Permissions::from_mode(0o755)).expect("chmod");
            return;
        }

        let path_file_out = path_dir_out.join("out.xlsx");
        let workbook = SpecWorkbook {
            sheets: vec![derive_table_sheet("Status", &[("Shipped", 1.0)])],
        };
        let result = save_workbook(
            &workbook,
            &path_file_out,
            derive_default_report_styles(),
            SpecXlsxWriteOptions::default(),
        );
        let l_tmp = list_tmp_siblings(&path_dir_out);
        fs::set_permissions(&path_dir_out, fs::Permissions::from_mode(0o755)).expect("chmod");

        assert!(matches!(result, Err(XlsxWriteError::Io { .. })));
        assert!(l_tmp.is_empty());
        assert!(!path_file_out.exists());
    }

    #[test]
    fn test_chart_range_columns_are_plain_indices() {
        let range = SpecCellRange::column(1, 1, 3);
        assert_eq!(plan_chart_range(&range), (1, 1, 3, 1));
    }
}
