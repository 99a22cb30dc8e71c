//! Cleaned, immutable sales dataset plus its column-typed frame.

use std::collections::HashSet;

use chrono::NaiveDate;
use log::debug;
use polars::prelude::{Column, DataFrame, DataType};

use crate::report::ReportLoad;
use crate::spec::{LoadError, SalesRecord, SpecSalesColumns};

/// Values of one coerced source column.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumFrameValues {
    Text(Vec<Option<String>>),
    Date(Vec<Option<NaiveDate>>),
    Float(Vec<Option<f64>>),
    Flag(Vec<Option<bool>>),
}

impl EnumFrameValues {
    fn into_column(self, name: &str) -> Result<Column, LoadError> {
        let column = match self {
            Self::Text(values) => Column::new(name.into(), values),
            Self::Float(values) => Column::new(name.into(), values),
            Self::Flag(values) => Column::new(name.into(), values),
            Self::Date(values) => {
                let l_days: Vec<Option<i32>> = values
                    .into_iter()
                    .map(|date| date.map(derive_epoch_days))
                    .collect();
                Column::new(name.into(), l_days).cast(&DataType::Date)?
            }
        };
        Ok(column)
    }
}

/// Missing-value profile of one source column.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecColumnProfile {
    pub name: String,
    pub n_missing: usize,
    /// Missing share in percent, `0.0` for an empty dataset.
    pub pct_missing: f64,
    /// Short type label (`text`, `float`, `date`, `bool`).
    pub dtype_label: String,
}

/// Ordered, read-only collection of cleaned records.
///
/// `frame` holds every source column, including the ones that are not part of
/// [`SalesRecord`], so column inventories see the whole input.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<SalesRecord>,
    frame: DataFrame,
    n_duplicates: usize,
    report: ReportLoad,
}

impl Dataset {
    /// Assemble a dataset from records and named frame columns.
    pub fn new(
        records: Vec<SalesRecord>,
        l_columns: Vec<(String, EnumFrameValues)>,
        n_duplicates: usize,
        report: ReportLoad,
    ) -> Result<Self, LoadError> {
        let l_frame_columns = l_columns
            .into_iter()
            .map(|(name, values)| values.into_column(&name))
            .collect::<Result<Vec<_>, _>>()?;
        let frame = DataFrame::new(l_frame_columns)?;
        debug!(
            "dataset frame: {} rows x {} columns",
            frame.height(),
            frame.width()
        );
        Ok(Self {
            records,
            frame,
            n_duplicates,
            report,
        })
    }

    /// Build a dataset from already-cleaned records, with only the recognized columns.
    pub fn from_records(
        records: Vec<SalesRecord>,
        columns: &SpecSalesColumns,
    ) -> Result<Self, LoadError> {
        let n_duplicates = count_duplicate_records(&records);
        let text = |f: fn(&SalesRecord) -> &Option<String>| {
            EnumFrameValues::Text(records.iter().map(|r| f(r).clone()).collect())
        };
        let l_columns = vec![
            (columns.order_id.clone(), text(|r| &r.order_id)),
            (
                columns.date.clone(),
                EnumFrameValues::Date(records.iter().map(|r| r.date).collect()),
            ),
            (columns.status.clone(), text(|r| &r.status)),
            (columns.fulfilment.clone(), text(|r| &r.fulfilment)),
            (columns.category.clone(), text(|r| &r.category)),
            (columns.size.clone(), text(|r| &r.size)),
            (
                columns.qty.clone(),
                EnumFrameValues::Float(records.iter().map(|r| r.qty).collect()),
            ),
            (
                columns.amount.clone(),
                EnumFrameValues::Float(records.iter().map(|r| r.amount).collect()),
            ),
            (columns.ship_city.clone(), text(|r| &r.ship_city)),
            (columns.ship_state.clone(), text(|r| &r.ship_state)),
            (
                columns.b2b.clone(),
                EnumFrameValues::Flag(records.iter().map(|r| r.b2b).collect()),
            ),
        ];
        let report = ReportLoad {
            cnt_read: records.len() as u64,
            cnt_kept: records.len() as u64,
            cnt_duplicates: n_duplicates as u64,
            ..Default::default()
        };
        Self::new(records, l_columns, n_duplicates, report)
    }

    pub fn records(&self) -> &[SalesRecord] {
        &self.records
    }

    pub fn n_records(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// Number of source columns (recognized and pass-through).
    pub fn n_columns(&self) -> usize {
        self.frame.width()
    }

    pub fn n_duplicates(&self) -> usize {
        self.n_duplicates
    }

    pub fn report(&self) -> &ReportLoad {
        &self.report
    }

    /// Estimated in-memory size of the frame, in bytes.
    pub fn estimated_size_bytes(&self) -> usize {
        self.frame.estimated_size()
    }

    /// Earliest and latest parsed order date.
    pub fn derive_period(&self) -> Option<(NaiveDate, NaiveDate)> {
        let mut it_dates = self.records.iter().filter_map(|record| record.date);
        let first = it_dates.next()?;
        Some(it_dates.fold((first, first), |(lo, hi), date| {
            (lo.min(date), hi.max(date))
        }))
    }

    /// Missing-value profile of every source column, in header order.
    pub fn derive_column_profiles(&self) -> Vec<SpecColumnProfile> {
        let n_rows = self.frame.height();
        self.frame
            .get_columns()
            .iter()
            .map(|column| {
                let n_missing = column.null_count();
                let pct_missing = if n_rows == 0 {
                    0.0
                } else {
                    n_missing as f64 / n_rows as f64 * 100.0
                };
                SpecColumnProfile {
                    name: column.name().as_str().to_string(),
                    n_missing,
                    pct_missing,
                    dtype_label: derive_dtype_label(column.dtype()),
                }
            })
            .collect()
    }
}

fn derive_dtype_label(dtype: &DataType) -> String {
    match dtype {
        DataType::String => "text".to_string(),
        DataType::Float64 => "float".to_string(),
        DataType::Date => "date".to_string(),
        DataType::Boolean => "bool".to_string(),
        other => format!("{other:?}").to_lowercase(),
    }
}

fn derive_epoch_days(date: NaiveDate) -> i32 {
    let date_epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or(NaiveDate::MIN);
    (date - date_epoch).num_days() as i32
}

/// Hashable identity of one record; floats compare by bit pattern.
#[derive(Debug, PartialEq, Eq, Hash)]
struct SpecRecordKey<'a> {
    l_text: [Option<&'a str>; 7],
    date: Option<NaiveDate>,
    qty: Option<u64>,
    amount: Option<u64>,
    b2b: Option<bool>,
}

impl<'a> SpecRecordKey<'a> {
    fn new(record: &'a SalesRecord) -> Self {
        Self {
            l_text: [
                record.order_id.as_deref(),
                record.status.as_deref(),
                record.fulfilment.as_deref(),
                record.category.as_deref(),
                record.size.as_deref(),
                record.ship_city.as_deref(),
                record.ship_state.as_deref(),
            ],
            date: record.date,
            qty: record.qty.map(f64::to_bits),
            amount: record.amount.map(f64::to_bits),
            b2b: record.b2b,
        }
    }
}

fn count_duplicate_records(records: &[SalesRecord]) -> usize {
    let mut set_seen: HashSet<SpecRecordKey<'_>> = HashSet::with_capacity(records.len());
    records
        .iter()
        .filter(|record| !set_seen.insert(SpecRecordKey::new(record)))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn derive_record(category: Option<&str>, amount: Option<f64>) -> SalesRecord {
        SalesRecord {
            category: category.map(str::to_string),
            amount,
            ..Default::default()
        }
    }

    #[test]
    fn test_from_records_profiles_missing_values() {
        let records = vec![
            derive_record(Some("Set"), Some(100.0)),
            derive_record(Some("Set"), None),
            derive_record(None, Some(5.0)),
            derive_record(Some("Top"), Some(20.0)),
        ];
        let dataset = Dataset::from_records(records, &SpecSalesColumns::default()).expect("dataset");

        assert_eq!(dataset.n_records(), 4);
        assert_eq!(dataset.n_columns(), 11);
        let l_profiles = dataset.derive_column_profiles();
        let profile_amount = l_profiles.iter().find(|p| p.name == "Amount").expect("amount");
        assert_eq!(profile_amount.n_missing, 1);
        assert_eq!(profile_amount.pct_missing, 25.0);
        assert_eq!(profile_amount.dtype_label, "float");
        let profile_date = l_profiles.iter().find(|p| p.name == "Date").expect("date");
        assert_eq!(profile_date.n_missing, 4);
        assert_eq!(profile_date.dtype_label, "date");
    }

    #[test]
    fn test_duplicates_are_counted_not_removed() {
        let records = vec![
            derive_record(Some("Set"), Some(1.0)),
            derive_record(Some("Set"), Some(1.0)),
            derive_record(Some("Set"), Some(1.0)),
        ];
        let dataset = Dataset::from_records(records, &SpecSalesColumns::default()).expect("dataset");
        assert_eq!(dataset.n_records(), 3);
        assert_eq!(dataset.n_duplicates(), 2);
    }

    #[test]
    fn test_duplicates_require_every_field_to_match() {
        let records = vec![
            derive_record(Some("Set"), Some(1.0)),
            derive_record(Some("Set"), Some(1.5)),
            derive_record(Some("Set"), None),
            derive_record(None, Some(1.0)),
            derive_record(Some("Set"), Some(1.0)),
        ];
        let dataset = Dataset::from_records(records, &SpecSalesColumns::default()).expect("dataset");
        assert_eq!(dataset.n_duplicates(), 1);
    }

    #[test]
    fn test_empty_dataset_has_schema_and_no_period() {
        let dataset = Dataset::from_records(Vec::new(), &SpecSalesColumns::default()).expect("dataset");
        assert!(dataset.is_empty());
        assert_eq!(dataset.n_columns(), 11);
        assert_eq!(dataset.derive_period(), None);
        assert!(dataset.derive_column_profiles().iter().all(|p| p.pct_missing == 0.0));
    }

    #[test]
    fn test_derive_period_spans_parsed_dates() {
        let d1 = NaiveDate::from_ymd_opt(2022, 4, 30).expect("date");
        let d2 = NaiveDate::from_ymd_opt(2022, 3, 31).expect("date");
        let records = vec![
            SalesRecord {
                date: Some(d1),
                ..Default::default()
            },
            SalesRecord::default(),
            SalesRecord {
                date: Some(d2),
                ..Default::default()
            },
        ];
        let dataset = Dataset::from_records(records, &SpecSalesColumns::default()).expect("dataset");
        assert_eq!(dataset.derive_period(), Some((d2, d1)));
    }
}
