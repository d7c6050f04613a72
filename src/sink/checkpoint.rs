use crate::table::{Table, Value};
use csv::ReaderBuilder;
use csv::WriterBuilder;
use std::path::Path;

/// Writes the table as a header row followed by one record per row.
/// Missing cells are written as empty fields. An existing file is overwritten.
pub fn write_csv<P: AsRef<Path>>(table: &Table, path: P) -> Result<(), csv::Error> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = WriterBuilder::new().from_path(path)?;
    writer.write_record(table.column_names())?;
    for row in &table.rows {
        writer.write_record(row.iter().map(|value| value.to_string()))?;
    }
    writer.flush()?;
    Ok(())
}

/// Reads a CSV checkpoint back into a table named after the file stem.
pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Table, csv::Error> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let header: Vec<String> = reader.headers()?.iter().map(str::to_owned).collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(record?.iter().map(Value::parse).collect());
    }
    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(Table::from_rows(name, &header, rows))
}
