//! `salekit_report`:
//! Sales metrics and dashboard workbook assembly.
//!
//! - `conf`      : sheet names, static texts, chart presets, styles
//! - `spec`      : options, KPI/roll-up models, errors
//! - `aggregate` : scalar KPIs and grouped roll-ups
//! - `summary`   : executive summary, dashboard and data-quality sheets
//! - `build`     : table sheets and the pure `build` entry point
//! - `chart`     : chart descriptors bound to table regions
//! - `pipeline`  : load → build → write orchestration
//! - `util`      : text formatting helpers

pub mod aggregate;
pub mod build;
pub mod chart;
pub mod conf;
pub mod pipeline;
pub mod spec;
pub mod summary;
mod util;

pub use aggregate::{compute_kpis, compute_rollups, group_records, rank_rollup};
pub use build::{build, build_report};
pub use chart::attach_charts;
pub use conf::{L_SHEET_NAMES, derive_report_styles};
pub use pipeline::{SpecRunOutput, derive_output_file_name, run, run_at};
pub use spec::{
    EnumMeasure, ReportError, SpecGroup, SpecPipelineOptions, SpecReportOptions, SpecRollup,
    SpecRollupSet, SpecSalesKpis,
};
