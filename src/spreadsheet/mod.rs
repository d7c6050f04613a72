//! # Spreadsheet Loading
//!
//! Reads one worksheet of an Excel (.xlsx, .xlsm, .xlsb, .xls) or OpenDocument
//! (.ods) workbook into a [`Table`]. The first row of the sheet is the header;
//! every other row becomes a record. Cells holding one of the configured null
//! literals, empty cells and error cells (such as `#N/A`) become missing values.
//!
//! Column types are inferred from the cells of each column before conversion, so
//! a numeric column whose values are all whole numbers is read as integers.
use crate::config::SourceConfig;
use crate::error::PipelineError;
use crate::spreadsheet::SpreadsheetError::{EmptySheet, FileNotFound, SheetNotFound};
use crate::table::{Column, ColumnType, Table, Value};
use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Data, DataType, Range, Reader, Sheets};
use chrono::{NaiveDate, NaiveDateTime};
use glob::Pattern;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Cursor};
use std::path::Path;
use thiserror::Error;

pub(crate) mod source;

/// Custom error types for spreadsheet operations.
#[derive(Error, Debug)]
pub enum SpreadsheetError {
    /// Local file does not exist
    #[error("File '{0}' not found")]
    FileNotFound(String),

    /// Corrupt file, unsupported format or unreadable sheet
    #[error("Invalid spreadsheet: {0}")]
    InvalidSpreadsheet(#[from] calamine::Error),

    /// Remote workbook could not be downloaded
    #[error("Read remote file '{url}' failed: {message}")]
    RemoteReadError { url: String, message: String },

    /// No sheet matches the requested name or pattern
    #[error("Sheet '{name}' not found, available sheets: {available:?}")]
    SheetNotFound { name: String, available: Vec<String> },

    /// Sheet exists but has not even a header row
    #[error("Sheet '{0}' is empty")]
    EmptySheet(String),
}

/// An opened workbook, local or downloaded.
pub enum Spreadsheet {
    /// Workbook read from the local file system, format detected by extension
    Local(Sheets<BufReader<File>>),
    /// Workbook held in memory, format detected by content
    Remote(Sheets<Cursor<Vec<u8>>>),
}

/// One worksheet and the cells of its used area.
pub struct Sheet {
    pub name: String,
    range: Range<Data>,
}

/// Shape of a sheet, as listed by the inspect command.
#[derive(Debug)]
pub struct SheetSummary {
    pub name: String,
    pub rows: usize,
    pub columns: Vec<Column>,
}

impl Spreadsheet {
    /// Opens a workbook from a local path or a remote URL.
    pub fn open(path: &str) -> Result<Spreadsheet, SpreadsheetError> {
        if source::is_remote_url(path) {
            let bytes = source::read_remote(path)?;
            Ok(Self::Remote(open_workbook_auto_from_rs(bytes)?))
        } else if Path::new(path).is_file() {
            Ok(Self::Local(open_workbook_auto(path)?))
        } else {
            Err(FileNotFound(path.to_owned()))
        }
    }

    /// Returns the names of all sheets in the workbook.
    pub fn sheet_names(&self) -> Vec<String> {
        match self {
            Self::Local(workbook) => workbook.sheet_names(),
            Self::Remote(workbook) => workbook.sheet_names(),
        }
    }

    /// Opens the sheet whose name equals the selector, or else the first one matching it as a glob pattern.
    pub fn open_sheet(&mut self, selector: &str) -> Result<Sheet, SpreadsheetError> {
        let name = select_sheet(&self.sheet_names(), selector)?;
        let range = match self {
            Self::Local(workbook) => workbook.worksheet_range(&name)?,
            Self::Remote(workbook) => workbook.worksheet_range(&name)?,
        };
        Ok(Sheet { name, range })
    }
}

fn select_sheet(names: &[String], selector: &str) -> Result<String, SpreadsheetError> {
    if let Some(name) = names.iter().find(|name| name.as_str() == selector) {
        return Ok(name.to_owned());
    }
    Pattern::new(selector)
        .ok()
        .and_then(|pattern| names.iter().find(|name| pattern.matches(name)))
        .map(|name| name.to_owned())
        .ok_or_else(|| SheetNotFound {
            name: selector.to_owned(),
            available: names.to_vec(),
        })
}

impl Sheet {
    /// Number of records below the header row, empty rows included.
    pub fn data_rows(&self) -> usize {
        self.range.height().saturating_sub(1)
    }

    /// Column titles from the first row; blank titles are named after their position.
    pub fn header(&self) -> Result<Vec<String>, SpreadsheetError> {
        let row = self.range.rows().next().ok_or_else(|| EmptySheet(self.name.to_owned()))?;
        Ok(row
            .iter()
            .enumerate()
            .map(|(index, cell)| {
                let title = cell.to_string();
                if title.trim().is_empty() {
                    format!("Unnamed: {index}")
                } else {
                    title
                }
            })
            .collect())
    }

    /// Infers the type of every column from all of its non-missing cells.
    pub fn analyze_columns(&self, nulls: &HashSet<&str>) -> Result<Vec<Column>, SpreadsheetError> {
        Ok(self
            .header()?
            .into_iter()
            .enumerate()
            .map(|(index, title)| {
                let kinds = self
                    .range
                    .rows()
                    .skip(1)
                    .map(|row| row.get(index).and_then(|cell| cell_kind(cell, nulls)));
                Column::new(title, ColumnType::detect(kinds))
            })
            .collect())
    }

    /// Converts the sheet into a table, one record per data row.
    pub fn into_table(self, nulls: &HashSet<&str>, skip_empty_rows: bool) -> Result<Table, SpreadsheetError> {
        let columns = self.analyze_columns(nulls)?;
        let mut table = Table::new(self.name.to_owned(), columns);
        for row in self.range.rows().skip(1) {
            if skip_empty_rows && row.iter().all(is_blank) {
                continue;
            }
            let record = table
                .columns
                .iter()
                .enumerate()
                .map(|(index, column)| {
                    row.get(index)
                        .map(|cell| to_value(cell, column.kind, nulls))
                        .unwrap_or_default()
                })
                .collect();
            table.rows.push(record);
        }
        Ok(table)
    }
}

fn is_blank(cell: &Data) -> bool {
    match cell {
        Data::Empty => true,
        Data::String(value) => value.trim().is_empty(),
        _ => false,
    }
}

/// Column type suggested by one cell; missing cells suggest nothing.
fn cell_kind(cell: &Data, nulls: &HashSet<&str>) -> Option<ColumnType> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(value) if nulls.contains(value.as_str()) => None,
        Data::Bool(_) => Some(ColumnType::Boolean),
        Data::Int(_) => Some(ColumnType::BigInt),
        Data::Float(value) if value.fract() == 0.0 => Some(ColumnType::BigInt),
        Data::Float(_) => Some(ColumnType::Double),
        Data::String(_) | Data::DurationIso(_) => Some(ColumnType::Varchar),
        Data::DateTime(value) if value.as_f64().fract() == 0.0 => Some(ColumnType::Date),
        Data::DateTime(_) => Some(ColumnType::Timestamp),
        Data::DateTimeIso(value) if value.contains('T') => Some(ColumnType::Timestamp),
        Data::DateTimeIso(_) => Some(ColumnType::Date),
    }
}

/// Converts one cell to a table value, coercing numbers to the column type.
fn to_value(cell: &Data, kind: ColumnType, nulls: &HashSet<&str>) -> Value {
    match cell {
        Data::Empty | Data::Error(_) => Value::Missing,
        Data::String(value) if nulls.contains(value.as_str()) => Value::Missing,
        Data::Bool(value) => Value::Boolean(*value),
        Data::Int(value) if kind == ColumnType::Double => Value::Float(*value as f64),
        Data::Int(value) => Value::Integer(*value),
        Data::Float(value) if kind == ColumnType::BigInt => Value::Integer(*value as i64),
        Data::Float(value) => Value::Float(*value),
        Data::String(value) | Data::DurationIso(value) => Value::Text(value.to_owned()),
        Data::DateTime(_) => match cell.as_datetime() {
            Some(datetime) if kind == ColumnType::Date => Value::Date(datetime.date()),
            Some(datetime) => Value::Timestamp(datetime),
            None => Value::Text(cell.to_string()),
        },
        Data::DateTimeIso(value) => parse_iso_datetime(value, kind),
    }
}

fn parse_iso_datetime(value: &str, kind: ColumnType) -> Value {
    if let Ok(datetime) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        if kind == ColumnType::Date {
            Value::Date(datetime.date())
        } else {
            Value::Timestamp(datetime)
        }
    } else if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        Value::Date(date)
    } else {
        Value::Text(value.to_owned())
    }
}

/// Reads the configured sheet into a table.
///
/// # Errors
///
/// Returns `SourceNotFound` if the local file does not exist and
/// `SourceReadError` for every other failure (bad sheet name, corrupt file).
pub fn load_table(source: &SourceConfig) -> Result<Table, PipelineError> {
    let nulls: HashSet<&str> = source.null_literals.iter().map(String::as_str).collect();
    let read = || -> Result<Table, SpreadsheetError> {
        let mut spreadsheet = Spreadsheet::open(&source.path)?;
        let sheet = spreadsheet.open_sheet(&source.sheet)?;
        sheet.into_table(&nulls, source.skip_empty_rows)
    };
    read().map_err(|error| to_pipeline_error(&source.path, error))
}

/// Lists every sheet of a workbook with its inferred columns.
pub fn describe_workbook(source: &SourceConfig) -> Result<Vec<SheetSummary>, PipelineError> {
    let nulls: HashSet<&str> = source.null_literals.iter().map(String::as_str).collect();
    let describe = || -> Result<Vec<SheetSummary>, SpreadsheetError> {
        let mut spreadsheet = Spreadsheet::open(&source.path)?;
        let mut summaries = Vec::new();
        for name in spreadsheet.sheet_names() {
            let sheet = spreadsheet.open_sheet(&name)?;
            let columns = if sheet.range.is_empty() {
                Vec::new()
            } else {
                sheet.analyze_columns(&nulls)?
            };
            summaries.push(SheetSummary {
                rows: sheet.data_rows(),
                name,
                columns,
            });
        }
        Ok(summaries)
    };
    describe().map_err(|error| to_pipeline_error(&source.path, error))
}

fn to_pipeline_error(path: &str, error: SpreadsheetError) -> PipelineError {
    match error {
        FileNotFound(missing) => PipelineError::SourceNotFound(missing),
        source => PipelineError::SourceReadError {
            path: path.to_owned(),
            source,
        },
    }
}
