use crate::spreadsheet::SpreadsheetError;
use std::io::Cursor;
use url::Url;

/// Downloads a remote workbook into memory.
/// Uses DuckDB's read_blob, which handles http, https, s3 and gs with the usual credential chain.
pub(crate) fn read_remote(file_name: &str) -> Result<Cursor<Vec<u8>>, SpreadsheetError> {
    use duckdb::Connection;

    let mapper = |error: duckdb::Error| SpreadsheetError::RemoteReadError {
        url: file_name.to_owned(),
        message: error.to_string(),
    };
    let connection = Connection::open_in_memory().map_err(mapper)?;
    let bytes: Vec<u8> = connection
        .query_row("SELECT content FROM read_blob(?)", [file_name], |row| row.get(0))
        .map_err(mapper)?;

    if bytes.is_empty() {
        Err(SpreadsheetError::RemoteReadError {
            url: file_name.to_owned(),
            message: "no data".to_owned(),
        })?
    }
    Ok(Cursor::new(bytes))
}

/// Checks if a file name represents a remote URL
pub(crate) fn is_remote_url(file_name: &str) -> bool {
    if let Ok(url) = Url::parse(file_name) {
        matches!(url.scheme(), "http" | "https" | "s3" | "gs")
    } else {
        false
    }
}
