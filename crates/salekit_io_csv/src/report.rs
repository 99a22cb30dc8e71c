//! Load report model and mutable report builder.

use std::collections::BTreeMap;
use std::fmt;

/// Aggregate counters and diagnostics for one `load_dataset` run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReportLoad {
    /// Data rows read after the header.
    pub cnt_read: u64,
    /// Rows kept as records.
    pub cnt_kept: u64,
    /// Rows skipped for structural problems.
    pub cnt_skipped: u64,
    /// Rows identical to an earlier row across every column.
    pub cnt_duplicates: u64,
    /// Per-column count of present values that failed coercion.
    pub dict_coerced_missing: BTreeMap<String, u64>,
    /// Non-fatal warnings collected while loading.
    pub warnings: Vec<String>,
}

impl ReportLoad {
    /// Total number of values coerced to missing.
    pub fn coerced_count(&self) -> u64 {
        self.dict_coerced_missing.values().sum()
    }

    /// Machine-readable counters.
    pub fn to_dict(&self) -> BTreeMap<String, u64> {
        let mut dict_counts = BTreeMap::new();
        dict_counts.insert("cnt_read".to_string(), self.cnt_read);
        dict_counts.insert("cnt_kept".to_string(), self.cnt_kept);
        dict_counts.insert("cnt_skipped".to_string(), self.cnt_skipped);
        dict_counts.insert("cnt_duplicates".to_string(), self.cnt_duplicates);
        dict_counts.insert("cnt_coerced".to_string(), self.coerced_count());
        dict_counts.insert("cnt_warnings".to_string(), self.warnings.len() as u64);
        dict_counts
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        let dict_counts = self.to_dict();
        format!(
            "{prefix} read={} kept={} skipped={} duplicates={} coerced={} warnings={}",
            dict_counts["cnt_read"],
            dict_counts["cnt_kept"],
            dict_counts["cnt_skipped"],
            dict_counts["cnt_duplicates"],
            dict_counts["cnt_coerced"],
            dict_counts["cnt_warnings"]
        )
    }
}

impl fmt::Display for ReportLoad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[LOAD]"))
    }
}

/// Mutable accumulator for load statistics.
#[derive(Debug, Default, Clone)]
pub struct ReportLoadBuilder {
    /// See [`ReportLoad::cnt_read`].
    pub cnt_read: u64,
    /// See [`ReportLoad::cnt_kept`].
    pub cnt_kept: u64,
    /// See [`ReportLoad::cnt_skipped`].
    pub cnt_skipped: u64,
    /// See [`ReportLoad::cnt_duplicates`].
    pub cnt_duplicates: u64,
    /// See [`ReportLoad::dict_coerced_missing`].
    pub dict_coerced_missing: BTreeMap<String, u64>,
    /// See [`ReportLoad::warnings`].
    pub warnings: Vec<String>,
}

impl ReportLoadBuilder {
    pub fn add_read(&mut self) {
        self.cnt_read += 1;
    }

    pub fn add_kept(&mut self) {
        self.cnt_kept += 1;
    }

    pub fn add_skipped(&mut self) {
        self.cnt_skipped += 1;
    }

    pub fn add_duplicate(&mut self) {
        self.cnt_duplicates += 1;
    }

    /// Count one present value of `column` that could not be coerced.
    pub fn add_coerced(&mut self, column: &str) {
        *self
            .dict_coerced_missing
            .entry(column.to_string())
            .or_insert(0) += 1;
    }

    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    /// Finalize builder into immutable report.
    pub fn build(self) -> ReportLoad {
        ReportLoad {
            cnt_read: self.cnt_read,
            cnt_kept: self.cnt_kept,
            cnt_skipped: self.cnt_skipped,
            cnt_duplicates: self.cnt_duplicates,
            dict_coerced_missing: self.dict_coerced_missing,
            warnings: self.warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_load_to_dict_and_format() {
        let mut builder = ReportLoadBuilder::default();
        for _ in 0..4 {
            builder.add_read();
        }
        builder.add_kept();
        builder.add_kept();
        builder.add_kept();
        builder.add_skipped();
        builder.add_duplicate();
        builder.add_coerced("Date");
        builder.add_coerced("Date");
        builder.add_coerced("Amount");
        builder.add_warning("w".to_string());
        let report = builder.build();

        assert_eq!(report.dict_coerced_missing["Date"], 2);
        assert_eq!(report.to_dict()["cnt_coerced"], 3);
        let txt = report.format("[LOAD]");
        assert_eq!(
            txt,
            "[LOAD] read=4 kept=3 skipped=1 duplicates=1 coerced=3 warnings=1"
        );
        assert_eq!(report.to_string(), txt);
    }
}
