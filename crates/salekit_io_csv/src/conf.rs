//! Loader constants: default column names, date format and flag spellings.

/// Default header of the order id column.
pub const C_COL_ORDER_ID: &str = "Order ID";
pub const C_COL_DATE: &str = "Date";
pub const C_COL_STATUS: &str = "Status";
pub const C_COL_FULFILMENT: &str = "Fulfilment";
pub const C_COL_CATEGORY: &str = "Category";
pub const C_COL_SIZE: &str = "Size";
pub const C_COL_QTY: &str = "Qty";
pub const C_COL_AMOUNT: &str = "Amount";
pub const C_COL_SHIP_CITY: &str = "ship-city";
pub const C_COL_SHIP_STATE: &str = "ship-state";
pub const C_COL_B2B: &str = "B2B";

/// Expected order-date format, e.g. `04-30-22`.
pub const C_DATE_FORMAT_DEFAULT: &str = "%m-%d-%y";

/// UTF-8 byte order mark.
pub const TUP_UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Lower-cased spellings accepted as `true` by the segment-flag parser.
pub const TUP_FLAG_TRUE: [&str; 2] = ["true", "1"];
/// Lower-cased spellings accepted as `false` by the segment-flag parser.
pub const TUP_FLAG_FALSE: [&str; 2] = ["false", "0"];
