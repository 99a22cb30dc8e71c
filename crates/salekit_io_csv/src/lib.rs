//! `salekit_io_csv`:
//! Sales-export loader and cleaner.
//!
//! - `conf`    : default column names and parse constants
//! - `spec`    : options, record type and errors
//! - `report`  : load report model
//! - `dataset` : immutable cleaned dataset and column profiles
//! - `load`    : CSV decoding, structural checks and coercion
//! - `util`    : shared helper functions

pub mod conf;
pub mod dataset;
pub mod load;
pub mod report;
pub mod spec;
mod util;

pub use dataset::{Dataset, EnumFrameValues, SpecColumnProfile};
pub use load::{load_dataset, load_dataset_from_bytes};
pub use report::{ReportLoad, ReportLoadBuilder};
pub use spec::{EnumColumnKind, LoadError, SalesRecord, SpecLoadOptions, SpecSalesColumns};
