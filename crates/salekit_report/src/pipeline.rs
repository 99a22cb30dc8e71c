//! End-to-end run: load → aggregate → build → charts → write.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use log::{info, warn};
use salekit_io_csv::load_dataset;
use salekit_io_xlsx::{SpecXlsxReport, save_workbook};

use crate::build::build;
use crate::conf::derive_report_styles;
use crate::spec::{ReportError, SpecPipelineOptions};

/// Prefix of generated workbook file names.
pub const C_FILE_PREFIX: &str = "Sales_Dashboard";

/// Outcome of one successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecRunOutput {
    pub path_file_out: PathBuf,
    pub n_records: usize,
    pub report_xlsx: SpecXlsxReport,
}

/// `Sales_Dashboard_<YYYY-MM-DD_HH-MM-SS>.xlsx`
pub fn derive_output_file_name(timestamp: NaiveDateTime) -> String {
    format!(
        "{C_FILE_PREFIX}_{}.xlsx",
        timestamp.format("%Y-%m-%d_%H-%M-%S")
    )
}

/// Run the pipeline with the current local time as the file timestamp.
pub fn run(
    path_file_in: &Path,
    path_dir_out: &Path,
    options: &SpecPipelineOptions,
) -> Result<SpecRunOutput, ReportError> {
    run_at(path_file_in, path_dir_out, options, Local::now().naive_local())
}

/// Run the pipeline, naming the output after `timestamp`.
pub fn run_at(
    path_file_in: &Path,
    path_dir_out: &Path,
    options: &SpecPipelineOptions,
    timestamp: NaiveDateTime,
) -> Result<SpecRunOutput, ReportError> {
    info!("stage load: {}", path_file_in.display());
    let dataset = load_dataset(path_file_in, &options.load)?;
    info!(
        "loaded {} record(s), {} column(s), {} duplicate(s)",
        dataset.n_records(),
        dataset.n_columns(),
        dataset.n_duplicates()
    );

    info!("stage build");
    let workbook = build(&dataset, &options.report);

    let path_file_out = path_dir_out.join(derive_output_file_name(timestamp));
    info!("stage write: {}", path_file_out.display());
    let report_xlsx = save_workbook(
        &workbook,
        &path_file_out,
        derive_report_styles(&options.report),
        options.write.clone(),
    )?;
    for warning in &report_xlsx.warnings {
        warn!("{warning}");
    }
    info!("wrote {} sheet(s) to {}", report_xlsx.sheets.len(), path_file_out.display());

    Ok(SpecRunOutput {
        path_file_out,
        n_records: dataset.n_records(),
        report_xlsx,
    })
}
