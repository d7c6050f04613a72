//! # Run Events
//!
//! The pipeline never prints. Each stage describes what it did as an [`Event`]
//! and hands it to a [`Reporter`]; the binary renders them through the `log`
//! facade while tests simply collect them into a `Vec`.
use crate::table::ColumnType;
use log::{info, warn};

/// Point of the run at which a null profile was taken.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ProfilePoint {
    BeforeImputation,
    AfterCleaning,
}

/// Missing values of one column.
#[derive(Clone, Debug, PartialEq)]
pub struct NullCount {
    pub column: String,
    pub nulls: usize,
    pub percentage: f64,
}

/// Type and filled cells of one column.
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnSummary {
    pub column: String,
    pub kind: ColumnType,
    pub non_null: usize,
}

/// Something a stage did or noticed.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    SourceLoaded {
        path: String,
        sheet: String,
        rows: usize,
        columns: usize,
    },
    ColumnsNormalized {
        names: Vec<String>,
    },
    ColumnCollision {
        name: String,
        kept: String,
        dropped: String,
    },
    /// A cleaning step was skipped because its column is absent.
    ColumnMissing {
        step: &'static str,
        column: String,
    },
    CategoriesProfiled {
        column: String,
        distinct: Vec<String>,
        missing: usize,
    },
    CategoriesCanonicalized {
        column: String,
        distinct: Vec<String>,
        filled: usize,
        unrecognized: Vec<String>,
    },
    NullProfile {
        point: ProfilePoint,
        rows: usize,
        columns: Vec<NullCount>,
    },
    MedianImputed {
        column: String,
        median: f64,
        filled: usize,
    },
    ModeImputed {
        column: String,
        mode: String,
        filled: usize,
    },
    NothingToImpute {
        column: String,
    },
    /// Every value of the column is missing, so there is nothing to impute from.
    NoImputationBasis {
        column: String,
    },
    ValuesRounded {
        column: String,
        places: u32,
    },
    CriticalRowsDropped {
        dropped: usize,
        remaining: usize,
    },
    ColumnTypes {
        columns: Vec<ColumnSummary>,
    },
    CsvWritten {
        path: String,
        rows: usize,
    },
    CheckpointRead {
        path: String,
        rows: usize,
    },
    DatabaseConnected {
        target: String,
    },
    TableReplaced {
        table: String,
        rows: usize,
        batches: usize,
    },
    RowCountVerified {
        table: String,
        rows: i64,
    },
    VerificationMismatch {
        table: String,
        expected: usize,
        actual: i64,
    },
    ConnectionReleased {
        target: String,
    },
}

impl Event {
    /// Returns true for events an operator should look at.
    pub fn is_warning(&self) -> bool {
        match self {
            Event::ColumnCollision { .. } | Event::VerificationMismatch { .. } => true,
            Event::NoImputationBasis { .. } => true,
            Event::CategoriesCanonicalized { unrecognized, .. } => !unrecognized.is_empty(),
            Event::NullProfile { point, columns, .. } => {
                *point == ProfilePoint::AfterCleaning && !columns.is_empty()
            }
            _ => false,
        }
    }
}

/// Receiver of run events.
pub trait Reporter {
    fn report(&mut self, event: Event);
}

impl Reporter for Vec<Event> {
    fn report(&mut self, event: Event) {
        self.push(event);
    }
}

/// Renders events as log records.
#[derive(Default)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn report(&mut self, event: Event) {
        match event {
            Event::SourceLoaded { path, sheet, rows, columns } => {
                info!("Loaded {rows} rows and {columns} columns from '{path}' (sheet '{sheet}')")
            }
            Event::ColumnsNormalized { names } => info!("Normalized column names: {names:?}"),
            Event::ColumnCollision { name, kept, dropped } => {
                warn!("Columns '{dropped}' and '{kept}' both normalize to '{name}', keeping '{kept}'")
            }
            Event::ColumnMissing { step, column } => warn!("Column '{column}' not found, skipping {step}"),
            Event::CategoriesProfiled { column, distinct, missing } => {
                info!("'{column}' before standardization: {missing} missing, values {distinct:?}")
            }
            Event::CategoriesCanonicalized { column, distinct, filled, unrecognized } => {
                info!("'{column}' after standardization: values {distinct:?}, {filled} filled with 'Unknown'");
                if !unrecognized.is_empty() {
                    warn!("'{column}' kept unrecognized values {unrecognized:?}");
                }
            }
            Event::NullProfile { point, rows, columns } => {
                let label = match point {
                    ProfilePoint::BeforeImputation => "before imputation",
                    ProfilePoint::AfterCleaning => "after cleaning",
                };
                if columns.is_empty() {
                    info!("No missing values {label} ({rows} rows)");
                }
                for NullCount { column, nulls, percentage } in columns {
                    if point == ProfilePoint::AfterCleaning {
                        warn!("'{column}' still has {nulls} missing values ({percentage:.2}%), review required");
                    } else {
                        info!("'{column}' has {nulls} missing values ({percentage:.2}%) {label}");
                    }
                }
            }
            Event::MedianImputed { column, median, filled } => {
                info!("Imputed {filled} missing '{column}' values with median {median:.2}")
            }
            Event::ModeImputed { column, mode, filled } => {
                info!("Imputed {filled} missing '{column}' values with mode '{mode}'")
            }
            Event::NothingToImpute { column } => info!("'{column}' has no missing values to impute"),
            Event::NoImputationBasis { column } => {
                warn!("'{column}' has no values at all, missing values left in place")
            }
            Event::ValuesRounded { column, places } => info!("Rounded '{column}' to {places} decimal places"),
            Event::CriticalRowsDropped { dropped, remaining } => {
                if dropped > 0 {
                    info!("Dropped {dropped} rows with missing critical values, {remaining} rows remain")
                } else {
                    info!("No rows with missing critical values, {remaining} rows remain")
                }
            }
            Event::ColumnTypes { columns } => {
                for ColumnSummary { column, kind, non_null } in columns {
                    info!("  {column:<32} {:<10} {non_null} non-null", kind.as_str());
                }
            }
            Event::CsvWritten { path, rows } => info!("Saved {rows} cleaned rows to '{path}'"),
            Event::CheckpointRead { path, rows } => info!("Read {rows} rows from checkpoint '{path}'"),
            Event::DatabaseConnected { target } => info!("Connected to {target}"),
            Event::TableReplaced { table, rows, batches } => {
                info!("Replaced table '{table}' with {rows} rows in {batches} batches")
            }
            Event::RowCountVerified { table, rows } => info!("Row count of '{table}' verified: {rows}"),
            Event::VerificationMismatch { table, expected, actual } => {
                warn!("Row count mismatch on '{table}': expected {expected}, found {actual}")
            }
            Event::ConnectionReleased { target } => info!("Connection to {target} closed"),
        }
    }
}
