//! Shared helpers for decoding and value coercion.

use std::borrow::Cow;

use chrono::NaiveDate;
use encoding_rs::WINDOWS_1252;

use crate::conf::{TUP_FLAG_FALSE, TUP_FLAG_TRUE, TUP_UTF8_BOM};

/// Decode raw file bytes to text.
///
/// Valid UTF-8 (with an optional BOM) is borrowed as-is. Anything else is
/// decoded as Windows-1252, which maps every byte. The flag is `true` when the
/// fallback was used.
pub fn decode_text(bytes: &[u8]) -> (Cow<'_, str>, bool) {
    let bytes = bytes.strip_prefix(&TUP_UTF8_BOM[..]).unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => (Cow::Borrowed(text), false),
        Err(_) => {
            let (text, _, _) = WINDOWS_1252.decode(bytes);
            (text, true)
        }
    }
}

/// Trimmed field text, or `None` when empty/whitespace-only.
pub fn normalize_field(raw: &str) -> Option<&str> {
    let value = raw.trim();
    (!value.is_empty()).then_some(value)
}

pub fn parse_date(value: &str, date_format: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, date_format).ok()
}

/// Finite `f64`, or `None`. `NaN` and infinities count as missing.
pub fn parse_f64(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|x| x.is_finite())
}

pub fn parse_flag(value: &str) -> Option<bool> {
    let value = value.to_ascii_lowercase();
    if TUP_FLAG_TRUE.contains(&value.as_str()) {
        Some(true)
    } else if TUP_FLAG_FALSE.contains(&value.as_str()) {
        Some(false)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_text_strips_bom_and_falls_back() {
        let (text, if_fallback) = decode_text(b"\xEF\xBB\xBFOrder ID,Date");
        assert_eq!(text, "Order ID,Date");
        assert!(!if_fallback);

        let (text, if_fallback) = decode_text(b"Caf\xE9");
        assert_eq!(text, "Café");
        assert!(if_fallback);
    }

    #[test]
    fn test_normalize_field_treats_blank_as_missing() {
        assert_eq!(normalize_field("  Set "), Some("Set"));
        assert_eq!(normalize_field("   "), None);
        assert_eq!(normalize_field(""), None);
    }

    #[test]
    fn test_parse_helpers() {
        assert_eq!(
            parse_date("04-30-22", "%m-%d-%y"),
            NaiveDate::from_ymd_opt(2022, 4, 30)
        );
        assert_eq!(parse_date("2022-04-30", "%m-%d-%y"), None);
        assert_eq!(parse_f64("647.62"), Some(647.62));
        assert_eq!(parse_f64("NaN"), None);
        assert_eq!(parse_f64("n/a"), None);
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("yes"), None);
    }
}
