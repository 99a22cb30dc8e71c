//! CSV loading and cleaning.

use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use log::{info, warn};

use crate::dataset::{Dataset, EnumFrameValues};
use crate::report::ReportLoadBuilder;
use crate::spec::{EnumColumnKind, LoadError, SalesRecord, SpecLoadOptions, SpecSalesColumns};
use crate::util::{decode_text, normalize_field, parse_date, parse_f64, parse_flag};

/// Read and clean the sales table at `path`.
pub fn load_dataset(path: &Path, options: &SpecLoadOptions) -> Result<Dataset, LoadError> {
    let v_bytes = fs::read(path).map_err(|err| LoadError::Io {
        path: path.to_path_buf(),
        source: err,
    })?;
    info!("loading {} ({} bytes)", path.display(), v_bytes.len());
    load_dataset_from_bytes(&v_bytes, options)
}

/// Clean an in-memory sales table.
///
/// Malformed rows and unparseable values are skipped or set missing and
/// counted in the dataset's [`crate::ReportLoad`]; only a missing header or
/// missing required columns fail.
pub fn load_dataset_from_bytes(
    bytes: &[u8],
    options: &SpecLoadOptions,
) -> Result<Dataset, LoadError> {
    let mut report = ReportLoadBuilder::default();

    let (text, if_fallback) = decode_text(bytes);
    if if_fallback {
        warn!("input is not valid UTF-8; decoded as Windows-1252");
        report.add_warning("Input decoded as Windows-1252.".to_string());
    }

    let mut reader = ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut record_raw = StringRecord::new();
    if !reader.read_record(&mut record_raw)? {
        return Err(LoadError::EmptyInput);
    }
    let l_headers = derive_unique_headers(&record_raw, &mut report);
    let plan = plan_columns(&l_headers, &options.columns)?;

    let n_cols = l_headers.len();
    let mut l_values: Vec<Vec<Option<String>>> = vec![Vec::new(); n_cols];
    let mut set_rows_seen: HashSet<Vec<Option<String>>> = HashSet::new();

    loop {
        match reader.read_record(&mut record_raw) {
            Ok(false) => break,
            Ok(true) => {}
            Err(err) => {
                if err.is_io_error() {
                    return Err(err.into());
                }
                report.add_read();
                report.add_skipped();
                report.add_warning(format!("Skipped unparseable row: {err}"));
                continue;
            }
        }
        report.add_read();

        if record_raw.len() > n_cols {
            let n_line = record_raw.position().map_or(0, |position| position.line());
            report.add_skipped();
            report.add_warning(format!(
                "Skipped line {n_line}: {} fields, expected {n_cols}.",
                record_raw.len()
            ));
            continue;
        }

        let l_row: Vec<Option<String>> = (0..n_cols)
            .map(|idx| {
                record_raw
                    .get(idx)
                    .and_then(normalize_field)
                    .map(str::to_string)
            })
            .collect();
        if !set_rows_seen.insert(l_row.clone()) {
            report.add_duplicate();
        }
        for (l_col_values, value) in l_values.iter_mut().zip(l_row) {
            l_col_values.push(value);
        }
        report.add_kept();
    }

    let mut l_typed: Vec<EnumFrameValues> = Vec::with_capacity(n_cols);
    for ((name, kind), l_raw) in l_headers.iter().zip(&plan.kinds).zip(l_values) {
        l_typed.push(coerce_column(name, *kind, l_raw, &options.date_format, &mut report));
    }

    let records = assemble_records(&l_typed, &plan);
    let l_columns: Vec<(String, EnumFrameValues)> = l_headers.into_iter().zip(l_typed).collect();
    let report = report.build();
    info!("{report}");
    for (name, n_coerced) in &report.dict_coerced_missing {
        info!("column {name:?}: {n_coerced} value(s) coerced to missing");
    }

    let n_duplicates = report.cnt_duplicates as usize;
    Dataset::new(records, l_columns, n_duplicates, report)
}

/// Per-column coercion kinds plus indices of the recognized columns.
struct SpecColumnPlan {
    kinds: Vec<EnumColumnKind>,
    idx_order_id: usize,
    idx_date: usize,
    idx_status: usize,
    idx_fulfilment: usize,
    idx_category: usize,
    idx_size: usize,
    idx_qty: usize,
    idx_amount: usize,
    idx_ship_city: usize,
    idx_ship_state: usize,
    idx_b2b: usize,
}

fn derive_unique_headers(record: &StringRecord, report: &mut ReportLoadBuilder) -> Vec<String> {
    let mut set_seen = BTreeSet::new();
    record
        .iter()
        .enumerate()
        .map(|(idx, raw)| {
            let mut name = raw.trim().to_string();
            if name.is_empty() {
                name = format!("column_{}", idx + 1);
            }
            if set_seen.contains(&name) {
                let base = name.clone();
                let mut n_idx = 2usize;
                while set_seen.contains(&format!("{base}__{n_idx}")) {
                    n_idx += 1;
                }
                name = format!("{base}__{n_idx}");
                report.add_warning(format!("Duplicate header {base:?} renamed to {name:?}."));
            }
            set_seen.insert(name.clone());
            name
        })
        .collect()
}

fn plan_columns(
    l_headers: &[String],
    columns: &SpecSalesColumns,
) -> Result<SpecColumnPlan, LoadError> {
    let find = |name: &str| l_headers.iter().position(|header| header == name);

    let l_missing: Vec<String> = columns
        .required()
        .iter()
        .filter(|name| find(name).is_none())
        .map(|name| name.to_string())
        .collect();
    if !l_missing.is_empty() {
        return Err(LoadError::MissingColumns(l_missing));
    }

    let idx = |name: &str| find(name).unwrap_or_default();
    Ok(SpecColumnPlan {
        kinds: l_headers
            .iter()
            .map(|header| columns.derive_column_kind(header))
            .collect(),
        idx_order_id: idx(&columns.order_id),
        idx_date: idx(&columns.date),
        idx_status: idx(&columns.status),
        idx_fulfilment: idx(&columns.fulfilment),
        idx_category: idx(&columns.category),
        idx_size: idx(&columns.size),
        idx_qty: idx(&columns.qty),
        idx_amount: idx(&columns.amount),
        idx_ship_city: idx(&columns.ship_city),
        idx_ship_state: idx(&columns.ship_state),
        idx_b2b: idx(&columns.b2b),
    })
}

fn coerce_column(
    name: &str,
    kind: EnumColumnKind,
    l_raw: Vec<Option<String>>,
    date_format: &str,
    report: &mut ReportLoadBuilder,
) -> EnumFrameValues {
    match kind {
        EnumColumnKind::Text => EnumFrameValues::Text(l_raw),
        EnumColumnKind::Date => EnumFrameValues::Date(coerce_values(name, &l_raw, report, |v| {
            parse_date(v, date_format)
        })),
        EnumColumnKind::Float => {
            EnumFrameValues::Float(coerce_values(name, &l_raw, report, parse_f64))
        }
        EnumColumnKind::Flag => {
            EnumFrameValues::Flag(coerce_values(name, &l_raw, report, parse_flag))
        }
    }
}

/// Parse present values; each present value that fails counts as coerced.
fn coerce_values<T>(
    name: &str,
    l_raw: &[Option<String>],
    report: &mut ReportLoadBuilder,
    parse: impl Fn(&str) -> Option<T>,
) -> Vec<Option<T>> {
    l_raw
        .iter()
        .map(|raw| {
            let value = parse(raw.as_deref()?);
            if value.is_none() {
                report.add_coerced(name);
            }
            value
        })
        .collect()
}

fn assemble_records(l_typed: &[EnumFrameValues], plan: &SpecColumnPlan) -> Vec<SalesRecord> {
    let n_rows = match l_typed.first() {
        Some(EnumFrameValues::Text(v)) => v.len(),
        Some(EnumFrameValues::Date(v)) => v.len(),
        Some(EnumFrameValues::Float(v)) => v.len(),
        Some(EnumFrameValues::Flag(v)) => v.len(),
        None => 0,
    };
    let text = |idx: usize, row: usize| match &l_typed[idx] {
        EnumFrameValues::Text(v) => v[row].clone(),
        _ => None,
    };
    let float = |idx: usize, row: usize| match &l_typed[idx] {
        EnumFrameValues::Float(v) => v[row],
        _ => None,
    };

    (0..n_rows)
        .map(|row| SalesRecord {
            order_id: text(plan.idx_order_id, row),
            date: match &l_typed[plan.idx_date] {
                EnumFrameValues::Date(v) => v[row],
                _ => None,
            },
            status: text(plan.idx_status, row),
            fulfilment: text(plan.idx_fulfilment, row),
            category: text(plan.idx_category, row),
            size: text(plan.idx_size, row),
            qty: float(plan.idx_qty, row),
            amount: float(plan.idx_amount, row),
            ship_city: text(plan.idx_ship_city, row),
            ship_state: text(plan.idx_ship_state, row),
            b2b: match &l_typed[plan.idx_b2b] {
                EnumFrameValues::Flag(v) => v[row],
                _ => None,
            },
        })
        .collect()
}
