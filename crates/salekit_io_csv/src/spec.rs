//! Load models: column mapping, options, record type and errors.

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

use crate::conf::{
    C_COL_AMOUNT, C_COL_B2B, C_COL_CATEGORY, C_COL_DATE, C_COL_FULFILMENT, C_COL_ORDER_ID,
    C_COL_QTY, C_COL_SHIP_CITY, C_COL_SHIP_STATE, C_COL_SIZE, C_COL_STATUS, C_DATE_FORMAT_DEFAULT,
};

////////////////////////////////////////////////////////////////////////////////
// #region ColumnMapping

/// How a source column is coerced while loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumColumnKind {
    /// Kept as trimmed text.
    Text,
    /// Parsed with the configured date format.
    Date,
    /// Parsed as a finite `f64`.
    Float,
    /// Parsed as a boolean flag (`true/false`, `1/0`).
    Flag,
}

/// Header names of the recognized sales columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecSalesColumns {
    pub order_id: String,
    pub date: String,
    pub status: String,
    pub fulfilment: String,
    pub category: String,
    pub size: String,
    pub qty: String,
    pub amount: String,
    pub ship_city: String,
    pub ship_state: String,
    pub b2b: String,
}

impl Default for SpecSalesColumns {
    fn default() -> Self {
        Self {
            order_id: C_COL_ORDER_ID.to_string(),
            date: C_COL_DATE.to_string(),
            status: C_COL_STATUS.to_string(),
            fulfilment: C_COL_FULFILMENT.to_string(),
            category: C_COL_CATEGORY.to_string(),
            size: C_COL_SIZE.to_string(),
            qty: C_COL_QTY.to_string(),
            amount: C_COL_AMOUNT.to_string(),
            ship_city: C_COL_SHIP_CITY.to_string(),
            ship_state: C_COL_SHIP_STATE.to_string(),
            b2b: C_COL_B2B.to_string(),
        }
    }
}

impl SpecSalesColumns {
    /// Required headers in canonical record order.
    pub fn required(&self) -> [&str; 11] {
        [
            self.order_id.as_str(),
            self.date.as_str(),
            self.status.as_str(),
            self.fulfilment.as_str(),
            self.category.as_str(),
            self.size.as_str(),
            self.qty.as_str(),
            self.amount.as_str(),
            self.ship_city.as_str(),
            self.ship_state.as_str(),
            self.b2b.as_str(),
        ]
    }

    /// Coercion applied to the column named `name`; unrecognized columns are text.
    pub fn derive_column_kind(&self, name: &str) -> EnumColumnKind {
        if name == self.date {
            EnumColumnKind::Date
        } else if name == self.qty || name == self.amount {
            EnumColumnKind::Float
        } else if name == self.b2b {
            EnumColumnKind::Flag
        } else {
            EnumColumnKind::Text
        }
    }
}

/// Input options for `load_dataset`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecLoadOptions {
    /// Recognized column names.
    pub columns: SpecSalesColumns,
    /// `chrono` format string for the date column.
    pub date_format: String,
    /// Field delimiter byte.
    pub delimiter: u8,
}

impl Default for SpecLoadOptions {
    fn default() -> Self {
        Self {
            columns: SpecSalesColumns::default(),
            date_format: C_DATE_FORMAT_DEFAULT.to_string(),
            delimiter: b',',
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Record

/// One cleaned sales-order line. Every attribute may be missing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SalesRecord {
    pub order_id: Option<String>,
    pub date: Option<NaiveDate>,
    pub status: Option<String>,
    pub fulfilment: Option<String>,
    pub category: Option<String>,
    pub size: Option<String>,
    pub qty: Option<f64>,
    pub amount: Option<f64>,
    pub ship_city: Option<String>,
    pub ship_state: Option<String>,
    /// `true` for business-to-business orders.
    pub b2b: Option<bool>,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Fatal load failures; per-row and per-value problems never end up here.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Input has no header row.")]
    EmptyInput,

    #[error("Missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Frame error: {0}")]
    Frame(#[from] polars::prelude::PolarsError),
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
