//! `salekit_io_xlsx`:
//! Declarative workbook model and its XLSX serializer.
//!
//! - `conf`   : Excel limits and the default report style table
//! - `spec`   : cells, sheets, charts, options and errors
//! - `util`   : pure helpers (value conversion, chart ranges, autofit)
//! - `writer` : `rust_xlsxwriter`-backed writer kernel
pub mod conf;
pub mod spec;
pub mod util;
pub mod writer;

pub use conf::{
    EnumCardColor, EnumStyleKey, N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX,
    N_NROWS_EXCEL_MAX, SpecStyleTable, TUP_EXCEL_ILLEGAL, derive_default_report_styles,
};
pub use spec::{
    EnumCellValue, EnumChartKind, SpecAutofitCellsPolicy, SpecCell,
    SpecCellFormat, SpecCellRange, SpecChart, SpecSheet, SpecSheetMerge, SpecSheetWritten,
    SpecTableRegion, SpecWorkbook, SpecXlsxReport, SpecXlsxWriteOptions,
    XlsxWriteError,
};
pub use util::{
    convert_cell_value, derive_excel_serial_date, plan_autofit_column_widths,
    plan_chart_range, sanitize_sheet_name,
};
pub use writer::{XlsxWriter, save_workbook};
