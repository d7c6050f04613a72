//! # Run Configuration
//!
//! Everything a run needs is gathered into one [`PipelineConfig`], built once at
//! the process boundary (TOML file plus command-line overrides) and then handed
//! read-only to every stage.
use crate::clean::CleaningPlan;
use regex::Regex;
use serde::Deserialize;
use std::fmt::Display;
use std::path::Path;
use std::path::PathBuf;
use thiserror::Error;

/// Literal cell contents treated as missing values by default.
pub const DEFAULT_NULL_LITERALS: [&str; 6] = ["#N/A", "N/A", "NA", "-", "", " "];

/// Rows per INSERT statement by default.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

const DEFAULT_MYSQL_PORT: u16 = 3306;

/// Errors related to loading and validating the configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Read config file '{path}' failed: {source}")]
    ReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse config file '{path}' failed: {source}")]
    ParseError {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid parameter '{name}': {message}")]
    InvalidParameter { name: String, message: String },
}

/// Complete configuration of one pipeline run.
#[derive(Clone, Debug, Deserialize)]
pub struct PipelineConfig {
    pub source: SourceConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    #[serde(default)]
    pub cleaning: CleaningPlan,
    /// Fail instead of overwriting when two columns normalize to the same name.
    #[serde(default)]
    pub strict_column_names: bool,
}

/// Where the spreadsheet comes from and how its cells are read.
#[derive(Clone, Debug, Deserialize)]
pub struct SourceConfig {
    /// Local path or remote URL (http, https, s3, gs)
    pub path: String,
    /// Sheet name, or a glob pattern matched against the sheet names
    pub sheet: String,
    #[serde(default = "default_null_literals")]
    pub null_literals: Vec<String>,
    #[serde(default = "default_true")]
    pub skip_empty_rows: bool,
}

#[derive(Clone, Debug, Deserialize)]
pub struct OutputConfig {
    pub csv_path: PathBuf,
}

/// Target table and connection of the database load.
#[derive(Clone, Debug, Deserialize)]
pub struct DatabaseConfig {
    pub table: String,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    pub target: DatabaseTarget,
}

/// Relational database receiving the cleaned table.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(tag = "engine")]
pub enum DatabaseTarget {
    /// MySQL server, attached through DuckDB's mysql extension
    #[serde(rename = "mysql")]
    MySql {
        host: String,
        #[serde(default = "default_mysql_port")]
        port: u16,
        user: String,
        #[serde(default)]
        password: String,
        database: String,
    },
    /// Local DuckDB database file
    #[serde(rename = "duckdb")]
    DuckDb { path: PathBuf },
}

fn default_null_literals() -> Vec<String> {
    DEFAULT_NULL_LITERALS.iter().map(|it| it.to_string()).collect()
}

fn default_true() -> bool {
    true
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_mysql_port() -> u16 {
    DEFAULT_MYSQL_PORT
}

impl SourceConfig {
    pub fn new(path: impl Into<String>, sheet: impl Into<String>) -> Self {
        SourceConfig {
            path: path.into(),
            sheet: sheet.into(),
            null_literals: default_null_literals(),
            skip_empty_rows: true,
        }
    }
}

impl DatabaseConfig {
    pub fn new(table: impl Into<String>, target: DatabaseTarget) -> Self {
        DatabaseConfig {
            table: table.into(),
            batch_size: DEFAULT_BATCH_SIZE,
            target,
        }
    }
}

impl Display for DatabaseTarget {
    /// Describes the target without its password.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatabaseTarget::MySql { host, port, user, database, .. } => {
                write!(f, "mysql://{user}@{host}:{port}/{database}")
            }
            DatabaseTarget::DuckDb { path } => write!(f, "duckdb:{}", path.display()),
        }
    }
}

impl PipelineConfig {
    /// Configuration with the default cleaning plan and no database load.
    pub fn new(source: SourceConfig, csv_path: impl Into<PathBuf>) -> Self {
        PipelineConfig {
            source,
            output: OutputConfig {
                csv_path: csv_path.into(),
            },
            database: None,
            cleaning: CleaningPlan::default(),
            strict_column_names: false,
        }
    }

    /// Reads, parses and validates a TOML configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.display().to_string(),
            source,
        })?;
        let config: PipelineConfig = toml::from_str(&content).map_err(|source| ConfigError::ParseError {
            path: path.display().to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the values serde cannot check on its own.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source.path.trim().is_empty() {
            Err(invalid("source.path", "must not be empty"))?
        }
        if self.source.sheet.trim().is_empty() {
            Err(invalid("source.sheet", "must not be empty"))?
        }
        if let Some(database) = &self.database {
            let pattern = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("Hardcode regex pattern");
            if !pattern.is_match(&database.table) {
                Err(invalid("database.table", &format!("'{}' is not a plain identifier", database.table)))?
            }
            if database.batch_size == 0 {
                Err(invalid("database.batch_size", "must be positive"))?
            }
        }
        Ok(())
    }
}

fn invalid(name: &str, message: &str) -> ConfigError {
    ConfigError::InvalidParameter {
        name: name.to_owned(),
        message: message.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [source]
        path = "data/BlinkIT Grocery Data.xlsx"
        sheet = "BlinkIT Grocery Data"

        [output]
        csv_path = "data/cleaned.csv"

        [database]
        table = "blinkit_capstone_table"

        [database.target]
        engine = "mysql"
        host = "127.0.0.1"
        user = "root"
        password = "secret"
        database = "blinkit_capstone_db"
    "#;

    #[test]
    fn parse_sample_with_defaults() {
        let config: PipelineConfig = toml::from_str(SAMPLE).unwrap();
        config.validate().unwrap();

        assert_eq!(config.source.null_literals, default_null_literals());
        assert!(config.source.skip_empty_rows);
        assert!(!config.strict_column_names);
        assert_eq!(config.cleaning, CleaningPlan::default());

        let database = config.database.unwrap();
        assert_eq!(database.batch_size, 1000);
        assert_eq!(
            database.target.to_string(),
            "mysql://root@127.0.0.1:3306/blinkit_capstone_db"
        );
    }

    #[test]
    fn parse_duckdb_target() {
        let config: DatabaseConfig = toml::from_str(
            r#"
            table = "sales"
            batch_size = 250
            target = { engine = "duckdb", path = "sales.duckdb" }
            "#,
        )
        .unwrap();
        assert_eq!(config.batch_size, 250);
        assert_eq!(
            config.target,
            DatabaseTarget::DuckDb {
                path: PathBuf::from("sales.duckdb")
            }
        );
    }

    #[test]
    fn reject_unsafe_table_name() {
        let mut config = PipelineConfig::new(SourceConfig::new("a.xlsx", "Sheet1"), "out.csv");
        config.database = Some(DatabaseConfig::new(
            "sales; drop table users",
            DatabaseTarget::DuckDb {
                path: PathBuf::from("x.duckdb"),
            },
        ));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidParameter { name, .. }) if name == "database.table"
        ));
    }

    #[test]
    fn reject_zero_batch_size() {
        let mut config = PipelineConfig::new(SourceConfig::new("a.xlsx", "Sheet1"), "out.csv");
        let mut database = DatabaseConfig::new(
            "sales",
            DatabaseTarget::DuckDb {
                path: PathBuf::from("x.duckdb"),
            },
        );
        database.batch_size = 0;
        config.database = Some(database);
        assert!(config.validate().is_err());
    }
}
