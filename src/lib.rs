//! # Grocery Sales Loader
//!
//! Batch ETL for a retail sales workbook: read one sheet, normalize its column
//! names, clean and impute the known problem columns, then persist the result
//! as a CSV checkpoint and as a fully replaced relational table.
//!
//! ## Stages
//!
//! - **Loader** ([`spreadsheet`]): reads xlsx/xlsm/xlsb/xls/ods sheets, local or remote,
//!   turning null literals and empty cells into missing values
//! - **Normalizer** ([`normalize`]): canonical `snake_case` column names
//! - **Cleaner** ([`clean`]): category canonicalization, median and mode
//!   imputation, rounding and the critical-column filter
//! - **Sink** ([`sink`]): CSV export and a batched full-replace database load
//!   with a row-count check
//!
//! Every stage reports what it did as [`Event`]s to a [`Reporter`]; the library
//! itself never prints.
pub mod clean;
pub mod config;
pub mod error;
pub mod normalize;
pub mod pipeline;
pub mod report;
pub mod sink;
pub mod spreadsheet;
pub mod table;

pub use config::{DatabaseConfig, DatabaseTarget, PipelineConfig, SourceConfig};
pub use error::{PipelineError, Result};
pub use pipeline::{Pipeline, RunSummary};
pub use report::{Event, LogReporter, Reporter};
pub use table::{Column, ColumnType, Table, Value};
