//! Text formatting helpers shared by the sheet builders.

use chrono::NaiveDate;

use crate::conf::{C_LABEL_B2B, C_LABEL_B2C, C_LABEL_MISSING, C_LABEL_NO_DATA};

/// Format `x` with `,` thousands separators and `n_decimals` decimals.
pub fn format_thousands(x: f64, n_decimals: usize) -> String {
    let c_fixed = format!("{:.*}", n_decimals, x.abs());
    let (c_int, c_frac) = match c_fixed.split_once('.') {
        Some((c_int, c_frac)) => (c_int, Some(c_frac)),
        None => (c_fixed.as_str(), None),
    };

    let n_len = c_int.len();
    let mut out = String::with_capacity(n_len + n_len / 3 + n_decimals + 2);
    if x < 0.0 && c_fixed.chars().any(|chr| chr.is_ascii_digit() && chr != '0') {
        out.push('-');
    }
    for (idx, chr) in c_int.chars().enumerate() {
        if idx > 0 && (n_len - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(chr);
    }
    if let Some(c_frac) = c_frac {
        out.push('.');
        out.push_str(c_frac);
    }
    out
}

/// `"<first> to <last>"`, or the no-data label.
pub fn format_period(period: Option<(NaiveDate, NaiveDate)>) -> String {
    match period {
        Some((first, last)) => format!("{} to {}", first.format("%Y-%m-%d"), last.format("%Y-%m-%d")),
        None => C_LABEL_NO_DATA.to_string(),
    }
}

pub fn derive_key_label(key: Option<&str>) -> String {
    key.unwrap_or(C_LABEL_MISSING).to_string()
}

pub fn derive_segment_label(key: Option<bool>) -> String {
    match key {
        Some(true) => C_LABEL_B2B.to_string(),
        Some(false) => C_LABEL_B2C.to_string(),
        None => C_LABEL_MISSING.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0.0, 0), "0");
        assert_eq!(format_thousands(999.0, 0), "999");
        assert_eq!(format_thousands(1234.5, 2), "1,234.50");
        assert_eq!(format_thousands(78_592_678.3, 2), "78,592,678.30");
        assert_eq!(format_thousands(-1_000_000.0, 0), "-1,000,000");
        assert_eq!(format_thousands(-0.001, 2), "0.00");
    }

    #[test]
    fn test_labels() {
        let d1 = NaiveDate::from_ymd_opt(2022, 3, 31).expect("date");
        let d2 = NaiveDate::from_ymd_opt(2022, 6, 29).expect("date");
        assert_eq!(format_period(Some((d1, d2))), "2022-03-31 to 2022-06-29");
        assert_eq!(format_period(None), "No data");
        assert_eq!(derive_key_label(None), "(missing)");
        assert_eq!(derive_segment_label(Some(false)), "B2C");
    }
}
