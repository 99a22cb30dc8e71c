//! Shared XLSX models: styles, cells, sheets, charts, errors.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

////////////////////////////////////////////////////////////////////////////////
// #region CellFormatSpecification

/// Cell format; every field is an optional patch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SpecCellFormat {
    /// Font family name.
    pub font_name: Option<String>,
    /// Font size in points.
    pub font_size: Option<i64>,
    /// Bold style.
    pub bold: Option<bool>,

    /// Horizontal alignment.
    pub align: Option<String>,
    /// Vertical alignment.
    pub valign: Option<String>,
    /// Border style for all sides.
    pub border: Option<i64>,

    /// Number format code.
    pub num_format: Option<String>,
    /// Background fill color.
    pub bg_color: Option<String>,
    /// Font color.
    pub font_color: Option<String>,
}

impl SpecCellFormat {
    /// Return a new format by overlaying `patch` onto `self`.
    pub fn with_(&self, patch: SpecCellFormat) -> SpecCellFormat {
        self.merge(&patch)
    }

    /// Merge two formats with right-side non-`None` overwrite semantics.
    pub fn merge(&self, other: &SpecCellFormat) -> SpecCellFormat {
        SpecCellFormat {
            font_name: other.font_name.clone().or_else(|| self.font_name.clone()),
            font_size: other.font_size.or(self.font_size),
            bold: other.bold.or(self.bold),
            align: other.align.clone().or_else(|| self.align.clone()),
            valign: other.valign.clone().or_else(|| self.valign.clone()),
            border: other.border.or(self.border),
            num_format: other.num_format.clone().or_else(|| self.num_format.clone()),
            bg_color: other.bg_color.clone().or_else(|| self.bg_color.clone()),
            font_color: other.font_color.clone().or_else(|| self.font_color.clone()),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CellSpecification

/// Typed cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumCellValue {
    /// Missing/blank value.
    None,
    /// Text value.
    String(String),
    /// Numeric value.
    Number(f64),
    /// Calendar date, written as an Excel serial date.
    Date(NaiveDate),
}

/// One grid cell: a value plus an ordered stack of style names.
///
/// Styles are resolved against the writer's style table and merged left to
/// right, so `["card_value_green", "currency"]` is the green card look with a
/// currency number format.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecCell {
    pub value: EnumCellValue,
    pub styles: Vec<String>,
}

impl SpecCell {
    pub fn new(value: EnumCellValue) -> Self {
        Self {
            value,
            styles: Vec::new(),
        }
    }

    pub fn blank() -> Self {
        Self::new(EnumCellValue::None)
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::new(EnumCellValue::String(value.into()))
    }

    pub fn number(value: f64) -> Self {
        Self::new(EnumCellValue::Number(value))
    }

    pub fn date(value: NaiveDate) -> Self {
        Self::new(EnumCellValue::Date(value))
    }

    /// Number cell, or blank when `value` is `None`.
    pub fn number_or_blank(value: Option<f64>) -> Self {
        value.map_or_else(Self::blank, Self::number)
    }

    /// Append one style name to the style stack.
    pub fn with_style(mut self, style: impl AsRef<str>) -> Self {
        self.styles.push(style.as_ref().to_string());
        self
    }

    /// Text content, if this is a text cell.
    pub fn as_text(&self) -> Option<&str> {
        match &self.value {
            EnumCellValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric content, if this is a number cell.
    pub fn as_number(&self) -> Option<f64> {
        match self.value {
            EnumCellValue::Number(n) => Some(n),
            _ => None,
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetSpecification

/// Inclusive/exclusive rectangular range inside one sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecCellRange {
    /// Inclusive row start.
    pub row_start_inclusive: usize,
    /// Exclusive row end.
    pub row_end_exclusive: usize,
    /// Inclusive column start.
    pub col_start_inclusive: usize,
    /// Exclusive column end.
    pub col_end_exclusive: usize,
}

impl SpecCellRange {
    /// Single-column range covering `n_rows` rows from `row_start`.
    pub fn column(col_idx: usize, row_start: usize, n_rows: usize) -> Self {
        Self {
            row_start_inclusive: row_start,
            row_end_exclusive: row_start + n_rows,
            col_start_inclusive: col_idx,
            col_end_exclusive: col_idx + 1,
        }
    }

    pub fn n_rows(&self) -> usize {
        self.row_end_exclusive
            .saturating_sub(self.row_start_inclusive)
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows() == 0 || self.col_end_exclusive <= self.col_start_inclusive
    }
}

/// Merge region; the anchor is the top-left cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecSheetMerge {
    /// Start row index (inclusive).
    pub row_idx_start: usize,
    /// End row index (inclusive).
    pub row_idx_end: usize,
    /// Start column index (inclusive).
    pub col_idx_start: usize,
    /// End column index (inclusive).
    pub col_idx_end: usize,
}

impl SpecSheetMerge {
    /// Whether `(row, col)` is covered by this merge but is not its anchor.
    pub fn covers_non_anchor(&self, row_idx: usize, col_idx: usize) -> bool {
        (self.row_idx_start..=self.row_idx_end).contains(&row_idx)
            && (self.col_idx_start..=self.col_idx_end).contains(&col_idx)
            && (row_idx, col_idx) != (self.row_idx_start, self.col_idx_start)
    }
}

/// Header row plus data rows of one tabular block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecTableRegion {
    /// Row index of the header row.
    pub row_header: usize,
    /// Number of data rows directly below the header.
    pub n_rows_data: usize,
    /// Number of columns, starting at column 0.
    pub n_cols: usize,
}

impl SpecTableRegion {
    /// Data rows of column `col_idx` (possibly empty).
    pub fn data_range(&self, col_idx: usize) -> SpecCellRange {
        SpecCellRange::column(col_idx, self.row_header + 1, self.n_rows_data)
    }
}

/// Chart kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumChartKind {
    /// Vertical bars.
    Column,
    /// Horizontal bars.
    Bar,
    Pie,
    Line,
}

/// Declarative chart bound to cells of its owning sheet by coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecChart {
    pub kind: EnumChartKind,
    pub title: String,
    /// Category-axis title (ignored for pie charts).
    pub name_x_axis: Option<String>,
    /// Value-axis title (ignored for pie charts).
    pub name_y_axis: Option<String>,
    /// Series values.
    pub range_values: SpecCellRange,
    /// Series categories.
    pub range_categories: Option<SpecCellRange>,
    /// Cell holding the series name, usually the value column header.
    pub cell_series_name: Option<(usize, usize)>,
    /// Show percentage data labels.
    pub if_show_percent: bool,
    /// Top-left anchor cell `(row, col)`.
    pub anchor: (usize, usize),
    /// Built-in Excel chart style id (1..=48).
    pub style: u8,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Named, ordered grid of typed cells with layout metadata and an optional chart.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecSheet {
    pub name: String,
    pub rows: Vec<Vec<SpecCell>>,
    pub merges: Vec<SpecSheetMerge>,
    pub column_widths: BTreeMap<usize, f64>,
    pub row_heights: BTreeMap<usize, f64>,
    /// Rows above this index stay visible while scrolling.
    pub row_freeze: Option<usize>,
    pub table: Option<SpecTableRegion>,
    pub chart: Option<SpecChart>,
}

impl SpecSheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: Vec::new(),
            merges: Vec::new(),
            column_widths: BTreeMap::new(),
            row_heights: BTreeMap::new(),
            row_freeze: None,
            table: None,
            chart: None,
        }
    }

    /// Number of materialized rows (trailing blank rows included).
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Put `cell` at `(row_idx, col_idx)`, growing the grid with blanks.
    pub fn set_cell(&mut self, row_idx: usize, col_idx: usize, cell: SpecCell) {
        if self.rows.len() <= row_idx {
            self.rows.resize_with(row_idx + 1, Vec::new);
        }
        let row = &mut self.rows[row_idx];
        if row.len() <= col_idx {
            row.resize_with(col_idx + 1, SpecCell::blank);
        }
        row[col_idx] = cell;
    }

    pub fn cell(&self, row_idx: usize, col_idx: usize) -> Option<&SpecCell> {
        self.rows.get(row_idx).and_then(|row| row.get(col_idx))
    }

    /// Put `cell` at the anchor and merge it across the inclusive span.
    ///
    /// Single-cell spans are written without a merge.
    pub fn set_merged_cell(
        &mut self,
        row_idx_start: usize,
        row_idx_end: usize,
        col_idx_start: usize,
        col_idx_end: usize,
        cell: SpecCell,
    ) {
        let styles = cell.styles.clone();
        self.set_cell(row_idx_start, col_idx_start, cell);
        for row_idx in row_idx_start..=row_idx_end {
            for col_idx in col_idx_start..=col_idx_end {
                if (row_idx, col_idx) == (row_idx_start, col_idx_start) {
                    continue;
                }
                let mut cell_covered = SpecCell::blank();
                cell_covered.styles = styles.clone();
                self.set_cell(row_idx, col_idx, cell_covered);
            }
        }
        if row_idx_end > row_idx_start || col_idx_end > col_idx_start {
            self.merges.push(SpecSheetMerge {
                row_idx_start,
                row_idx_end,
                col_idx_start,
                col_idx_end,
            });
        }
    }

    pub fn set_column_width(&mut self, col_idx: usize, width: f64) {
        self.column_widths.insert(col_idx, width);
    }

    pub fn set_row_height(&mut self, row_idx: usize, height: f64) {
        self.row_heights.insert(row_idx, height);
    }
}

/// Ordered collection of sheets serialized as one workbook.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecWorkbook {
    pub sheets: Vec<SpecSheet>,
}

impl SpecWorkbook {
    pub fn sheet(&self, name: &str) -> Option<&SpecSheet> {
        self.sheets.iter().find(|sheet| sheet.name == name)
    }

    pub fn sheet_mut(&mut self, name: &str) -> Option<&mut SpecSheet> {
        self.sheets.iter_mut().find(|sheet| sheet.name == name)
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|sheet| sheet.name.as_str()).collect()
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region WriteOptions

/// Autofit policy for table columns; widths are inferred from header and body cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecAutofitCellsPolicy {
    /// Minimum final width.
    pub width_cell_min: usize,
    /// Maximum final width.
    pub width_cell_max: usize,
    /// Width padding added after inference.
    pub width_cell_padding: usize,
}

impl Default for SpecAutofitCellsPolicy {
    fn default() -> Self {
        Self {
            width_cell_min: 8,
            width_cell_max: 60,
            width_cell_padding: 2,
        }
    }
}

/// Writer-wide formatting defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecXlsxWriteOptions {
    /// Base patch applied beneath every cell's style stack.
    pub base_format_patch: SpecCellFormat,
    /// Width inference for table columns without an explicit width.
    pub autofit: SpecAutofitCellsPolicy,
}

impl Default for SpecXlsxWriteOptions {
    fn default() -> Self {
        Self {
            base_format_patch: SpecCellFormat {
                font_name: Some("Calibri".to_string()),
                font_size: Some(11),
                ..Default::default()
            },
            autofit: SpecAutofitCellsPolicy::default(),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ReportSpecification

/// One sheet emitted to the workbook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecSheetWritten {
    /// Actual unique sheet name in workbook.
    pub sheet_name: String,
    /// Number of grid rows written.
    pub n_rows: usize,
    /// Whether a chart was inserted.
    pub if_has_chart: bool,
}

/// Per-workbook write report.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecXlsxReport {
    /// Sheets produced by the write call.
    pub sheets: Vec<SpecSheetWritten>,
    /// Non-fatal warnings.
    pub warnings: Vec<String>,
}

impl SpecXlsxReport {
    /// Add a warning message.
    pub fn warn(&mut self, msg: impl AsRef<str>) {
        self.warnings.push(msg.as_ref().to_string());
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Fatal workbook write failures.
#[derive(Error, Debug)]
pub enum XlsxWriteError {
    #[error("XLSX write error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Output directory does not exist: {0}")]
    DestinationNotFound(PathBuf),

    #[error("Output path has no file name: {0}")]
    InvalidDestination(PathBuf),

    #[error("Index overflow: {0}")]
    IndexOverflow(String),

    #[error("Cannot write after close().")]
    Closed,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
