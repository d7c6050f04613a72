use thiserror::Error;

/// Main error type for the loader.
/// Aggregates the failures of every pipeline stage; each variant is fatal and aborts the run.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Source file '{0}' not found")]
    SourceNotFound(String),

    #[error("Read source '{path}' failed: {source}")]
    SourceReadError {
        path: String,
        #[source]
        source: crate::spreadsheet::SpreadsheetError,
    },

    #[error("Column '{name}' produced by both '{kept}' and '{dropped}'")]
    ColumnCollision {
        name: String,
        kept: String,
        dropped: String,
    },

    #[error("Write CSV '{path}' failed: {source}")]
    SinkWriteError {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("Read CSV checkpoint '{path}' failed: {source}")]
    CheckpointReadError {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("Connect to {target} failed: {source}")]
    ConnectionError {
        target: String,
        #[source]
        source: duckdb::Error,
    },

    #[error("Load table '{table}' failed: {source}")]
    LoadError {
        table: String,
        #[source]
        source: duckdb::Error,
    },

    #[error("No database configured")]
    DatabaseNotConfigured,

    #[error("{0}")]
    Config(#[from] crate::config::ConfigError),
}

pub type Result<T, E = PipelineError> = std::result::Result<T, E>;

pub(crate) trait ResultMessage<T> {
    /// Tags a database failure with the table it happened on.
    fn for_table(self, table: &str) -> Result<T>;

    /// Tags a database failure with the target it happened on.
    fn for_target(self, target: &str) -> Result<T>;
}

impl<T> ResultMessage<T> for std::result::Result<T, duckdb::Error> {
    fn for_table(self, table: &str) -> Result<T> {
        self.map_err(|source| PipelineError::LoadError {
            table: table.to_owned(),
            source,
        })
    }

    fn for_target(self, target: &str) -> Result<T> {
        self.map_err(|source| PipelineError::ConnectionError {
            target: target.to_owned(),
            source,
        })
    }
}
