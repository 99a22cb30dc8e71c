//! Report models: options, KPIs, roll-ups and errors.

use chrono::NaiveDate;
use salekit_io_csv::{LoadError, SpecLoadOptions};
use salekit_io_xlsx::{SpecXlsxWriteOptions, XlsxWriteError};
use thiserror::Error;

////////////////////////////////////////////////////////////////////////////////
// #region Options

/// Aggregation and layout options.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecReportOptions {
    /// Rows kept on the geography sheet.
    pub n_top_states: usize,
    /// Rows kept on the order-status sheet.
    pub n_top_statuses: usize,
    /// Rows kept on the size sheet.
    pub n_top_sizes: usize,
    /// Substring marking a cancelled order (case-sensitive).
    pub status_cancelled: String,
    /// Substring marking a shipped order (case-sensitive).
    pub status_shipped: String,
    /// Fulfillment channel whose share is reported on the summary.
    pub fulfilment_highlight: String,
    pub currency_symbol: String,
    /// Missing share (percent) from which a column is `Critical`.
    pub pct_missing_critical: f64,
}

impl Default for SpecReportOptions {
    fn default() -> Self {
        Self {
            n_top_states: 15,
            n_top_statuses: 8,
            n_top_sizes: 12,
            status_cancelled: "Cancelled".to_string(),
            status_shipped: "Shipped".to_string(),
            fulfilment_highlight: "Amazon".to_string(),
            currency_symbol: "₹".to_string(),
            pct_missing_critical: 10.0,
        }
    }
}

/// Options for one end-to-end run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecPipelineOptions {
    pub load: SpecLoadOptions,
    pub report: SpecReportOptions,
    pub write: SpecXlsxWriteOptions,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Metrics

/// Scalar KPIs over the whole dataset.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecSalesKpis {
    /// Record count, missing amounts included.
    pub n_orders: usize,
    /// Sum of present amounts.
    pub revenue_total: f64,
    /// Mean of present amounts; `None` when no amount is present.
    pub amount_mean: Option<f64>,
    pub qty_total: f64,
    /// Share of records whose status contains the cancelled marker.
    pub rate_cancelled: f64,
    /// Share of records whose status contains the shipped marker.
    pub rate_shipped: f64,
    /// Share of records fulfilled by the highlighted channel.
    pub share_fulfilment_highlight: f64,
    /// Earliest and latest parsed order date.
    pub period: Option<(NaiveDate, NaiveDate)>,
}

/// Measure used to rank groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumMeasure {
    Revenue,
    Orders,
    Quantity,
}

/// One group of a roll-up; `key` is `None` for records missing the key.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecGroup<K> {
    pub key: Option<K>,
    pub n_records: usize,
    /// Sum of present amounts.
    pub amount_sum: f64,
    /// Number of present amounts.
    pub n_amounts: usize,
    /// Sum of present quantities.
    pub qty_sum: f64,
}

impl<K> SpecGroup<K> {
    pub fn new(key: Option<K>) -> Self {
        Self {
            key,
            n_records: 0,
            amount_sum: 0.0,
            n_amounts: 0,
            qty_sum: 0.0,
        }
    }

    pub fn amount_mean(&self) -> Option<f64> {
        (self.n_amounts > 0).then(|| self.amount_sum / self.n_amounts as f64)
    }

    pub fn measure(&self, measure: EnumMeasure) -> f64 {
        match measure {
            EnumMeasure::Revenue => self.amount_sum,
            EnumMeasure::Orders => self.n_records as f64,
            EnumMeasure::Quantity => self.qty_sum,
        }
    }
}

/// Ordered groups of one roll-up.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecRollup<K> {
    pub groups: Vec<SpecGroup<K>>,
}

impl<K> Default for SpecRollup<K> {
    fn default() -> Self {
        Self { groups: Vec::new() }
    }
}

impl<K> SpecRollup<K> {
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn total_records(&self) -> usize {
        self.groups.iter().map(|group| group.n_records).sum()
    }

    pub fn total_amount(&self) -> f64 {
        self.groups.iter().map(|group| group.amount_sum).sum()
    }

    pub fn total_qty(&self) -> f64 {
        self.groups.iter().map(|group| group.qty_sum).sum()
    }

    /// First keyed group with the largest `measure`; the missing-key group never wins.
    pub fn max_keyed_by_measure(&self, measure: EnumMeasure) -> Option<&SpecGroup<K>> {
        self.groups
            .iter()
            .filter(|group| group.key.is_some())
            .fold(None, |best, group| match best {
                Some(best) if best.measure(measure) >= group.measure(measure) => Some(best),
                _ => Some(group),
            })
    }
}

/// Every roll-up the report renders.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecRollupSet {
    /// By category, revenue descending.
    pub category: SpecRollup<String>,
    /// By state, revenue descending, top-N.
    pub state: SpecRollup<String>,
    /// By city, orders descending.
    pub city: SpecRollup<String>,
    /// By size over records with positive quantity, quantity descending, top-N.
    pub size: SpecRollup<String>,
    /// By status, orders descending, top-N.
    pub status: SpecRollup<String>,
    /// By fulfillment channel, orders descending.
    pub fulfilment: SpecRollup<String>,
    /// By business-segment flag, orders descending.
    pub segment: SpecRollup<bool>,
    /// By day, date ascending; undated records excluded.
    pub daily: SpecRollup<NaiveDate>,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Fatal pipeline failures, tagged with the failing stage.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("load stage failed: {0}")]
    Load(#[from] LoadError),

    #[error("write stage failed: {0}")]
    Write(#[from] XlsxWriteError),
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
