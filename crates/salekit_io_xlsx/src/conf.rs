//! XLSX constants and default style-table factories.

use std::collections::BTreeMap;

use crate::spec::SpecCellFormat;

/// Excel worksheet maximum row count.
pub const N_NROWS_EXCEL_MAX: usize = 1_048_576;
/// Excel worksheet maximum column count.
pub const N_NCOLS_EXCEL_MAX: usize = 16_384;
/// Excel sheet name maximum length.
pub const N_LEN_EXCEL_SHEET_NAME_MAX: usize = 31;
/// Characters not allowed in sheet names.
pub const TUP_EXCEL_ILLEGAL: [&str; 7] = ["*", ":", "?", "/", "\\", "[", "]"];

/// Style table: style name -> format patch.
pub type SpecStyleTable = BTreeMap<String, SpecCellFormat>;

/// Metric-card colour family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumCardColor {
    Blue,
    Green,
    Purple,
    Teal,
    Red,
}

impl EnumCardColor {
    /// All card colours in table order.
    pub const ALL: [EnumCardColor; 5] = [
        EnumCardColor::Blue,
        EnumCardColor::Green,
        EnumCardColor::Purple,
        EnumCardColor::Teal,
        EnumCardColor::Red,
    ];

    /// `(header fill, value fill)` colours.
    fn derive_fill_colors(self) -> (&'static str, &'static str) {
        match self {
            Self::Blue => ("#4472C4", "#D9E1F2"),
            Self::Green => ("#00B050", "#E2EFD9"),
            Self::Purple => ("#9B59B6", "#E8DAEF"),
            Self::Teal => ("#17A2B8", "#D1ECF1"),
            Self::Red => ("#FF6B6B", "#F8D7DA"),
        }
    }
}

/// Canonical style keys of the default style table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumStyleKey {
    /// Sheet title band.
    Title,
    /// Full-width section band (e.g. `KEY FINDINGS`).
    Section,
    /// Table header cell.
    Header,
    /// Light header used for secondary tables.
    SubHeader,
    /// Bold label cell.
    Label,
    /// Plain text cell.
    Text,
    /// Integer number format patch.
    Integer,
    /// Two-decimal number format patch.
    Decimal,
    /// Currency number format patch.
    Currency,
    /// Percentage number format patch.
    Percent,
    /// Date number format patch.
    Date,
    /// Green status cell.
    StatusClean,
    /// Amber status cell.
    StatusWarning,
    /// Red status cell.
    StatusCritical,
    /// Metric-card header block.
    CardHeader(EnumCardColor),
    /// Metric-card value block.
    CardValue(EnumCardColor),
}

impl EnumStyleKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Section => "section",
            Self::Header => "header",
            Self::SubHeader => "subheader",
            Self::Label => "label",
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Decimal => "decimal",
            Self::Currency => "currency",
            Self::Percent => "percent",
            Self::Date => "date",
            Self::StatusClean => "status_clean",
            Self::StatusWarning => "status_warning",
            Self::StatusCritical => "status_critical",
            Self::CardHeader(EnumCardColor::Blue) => "card_header_blue",
            Self::CardHeader(EnumCardColor::Green) => "card_header_green",
            Self::CardHeader(EnumCardColor::Purple) => "card_header_purple",
            Self::CardHeader(EnumCardColor::Teal) => "card_header_teal",
            Self::CardHeader(EnumCardColor::Red) => "card_header_red",
            Self::CardValue(EnumCardColor::Blue) => "card_value_blue",
            Self::CardValue(EnumCardColor::Green) => "card_value_green",
            Self::CardValue(EnumCardColor::Purple) => "card_value_purple",
            Self::CardValue(EnumCardColor::Teal) => "card_value_teal",
            Self::CardValue(EnumCardColor::Red) => "card_value_red",
        }
    }
}

impl AsRef<str> for EnumStyleKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Build the default named style table used by report sheets.
///
/// Number-format entries (`integer`, `decimal`, `currency`, `percent`, `date`)
/// only carry `num_format` so they can be layered on top of any base style.
pub fn derive_default_report_styles() -> SpecStyleTable {
    let cfg_base_fmt_spec = SpecCellFormat {
        font_name: Some("Calibri".to_string()),
        font_size: Some(11),
        valign: Some("vcenter".to_string()),
        ..Default::default()
    };
    let cfg_band_fmt_spec = cfg_base_fmt_spec.with_(SpecCellFormat {
        bold: Some(true),
        font_color: Some("#FFFFFF".to_string()),
        align: Some("center".to_string()),
        ..Default::default()
    });

    let mut dict_fmt = SpecStyleTable::new();
    let mut insert = |key: EnumStyleKey, spec: SpecCellFormat| {
        dict_fmt.insert(key.as_str().to_string(), spec);
    };

    insert(EnumStyleKey::Text, cfg_base_fmt_spec.clone());
    insert(
        EnumStyleKey::Title,
        cfg_band_fmt_spec.with_(SpecCellFormat {
            font_size: Some(14),
            bg_color: Some("#2E5090".to_string()),
            ..Default::default()
        }),
    );
    insert(
        EnumStyleKey::Section,
        cfg_band_fmt_spec.with_(SpecCellFormat {
            bg_color: Some("#4472C4".to_string()),
            ..Default::default()
        }),
    );
    insert(
        EnumStyleKey::Header,
        cfg_band_fmt_spec.with_(SpecCellFormat {
            bg_color: Some("#4472C4".to_string()),
            border: Some(1),
            ..Default::default()
        }),
    );
    insert(
        EnumStyleKey::SubHeader,
        cfg_base_fmt_spec.with_(SpecCellFormat {
            bold: Some(true),
            bg_color: Some("#D9E1F2".to_string()),
            border: Some(1),
            ..Default::default()
        }),
    );
    insert(
        EnumStyleKey::Label,
        cfg_base_fmt_spec.with_(SpecCellFormat {
            bold: Some(true),
            ..Default::default()
        }),
    );

    let mut insert_num_format = |key: EnumStyleKey, num_format: &str| {
        dict_fmt.insert(
            key.as_str().to_string(),
            SpecCellFormat {
                num_format: Some(num_format.to_string()),
                ..Default::default()
            },
        );
    };
    insert_num_format(EnumStyleKey::Integer, "#,##0");
    insert_num_format(EnumStyleKey::Decimal, "#,##0.00");
    insert_num_format(EnumStyleKey::Currency, "\"₹\"#,##0.00");
    insert_num_format(EnumStyleKey::Percent, "0.00%");
    insert_num_format(EnumStyleKey::Date, "yyyy-mm-dd");

    for (key, c_font_color, c_bg_color) in [
        (EnumStyleKey::StatusClean, "#00B050", "#E2EFD9"),
        (EnumStyleKey::StatusWarning, "#FFA500", "#FFF3CD"),
        (EnumStyleKey::StatusCritical, "#FF6B6B", "#F8D7DA"),
    ] {
        dict_fmt.insert(
            key.as_str().to_string(),
            cfg_base_fmt_spec.with_(SpecCellFormat {
                bold: Some(true),
                font_color: Some(c_font_color.to_string()),
                bg_color: Some(c_bg_color.to_string()),
                ..Default::default()
            }),
        );
    }

    for enum_color in EnumCardColor::ALL {
        let (c_fill_header, c_fill_value) = enum_color.derive_fill_colors();
        dict_fmt.insert(
            EnumStyleKey::CardHeader(enum_color).as_str().to_string(),
            cfg_band_fmt_spec.with_(SpecCellFormat {
                bg_color: Some(c_fill_header.to_string()),
                border: Some(1),
                ..Default::default()
            }),
        );
        dict_fmt.insert(
            EnumStyleKey::CardValue(enum_color).as_str().to_string(),
            cfg_base_fmt_spec.with_(SpecCellFormat {
                bold: Some(true),
                font_size: Some(18),
                font_color: Some(c_fill_header.to_string()),
                bg_color: Some(c_fill_value.to_string()),
                align: Some("center".to_string()),
                border: Some(1),
                ..Default::default()
            }),
        );
    }

    dict_fmt
}
