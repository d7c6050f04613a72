use crate::config::{DatabaseConfig, DatabaseTarget};
use crate::error::{Result, ResultMessage};
use crate::report::{Event, Reporter};
use crate::table::{ColumnType, Table, Value};
use duckdb::params_from_iter;
use duckdb::types::Value as SqlValue;
use duckdb::Connection;

/// Alias the MySQL database is attached under.
const ATTACHED: &str = "target";

/// Result of one database load.
#[derive(Clone, Debug, PartialEq)]
pub struct LoadOutcome {
    pub table: String,
    pub rows: usize,
    pub batches: usize,
    /// Row count read back from the database after the load
    pub verified_rows: i64,
}

/// An open connection to the target database.
struct Session {
    connection: Connection,
    target: String,
    /// Schema prefix for table names, set when the target is attached
    schema: Option<&'static str>,
}

impl Session {
    fn open(target: &DatabaseTarget) -> Result<Self> {
        let name = target.to_string();
        let session = match target {
            DatabaseTarget::DuckDb { path } => Session {
                connection: Connection::open(path).for_target(&name)?,
                target: name,
                schema: None,
            },
            DatabaseTarget::MySql { host, port, user, password, database } => {
                let connection = Connection::open_in_memory().for_target(&name)?;
                let dsn = format!("host={host} port={port} user={user} password={password} database={database}");
                connection
                    .execute_batch(&format!(
                        "INSTALL mysql; LOAD mysql; ATTACH {} AS {ATTACHED} (TYPE mysql);",
                        quote_literal(&dsn)
                    ))
                    .for_target(&name)?;
                Session {
                    connection,
                    target: name,
                    schema: Some(ATTACHED),
                }
            }
        };
        session.probe()?;
        Ok(session)
    }

    /// Runs a trivial query to prove the connection is usable.
    fn probe(&self) -> Result<()> {
        self.connection
            .query_row("SELECT 1", [], |row| row.get::<_, i32>(0))
            .for_target(&self.target)?;
        Ok(())
    }

    fn qualified(&self, table: &str) -> String {
        match self.schema {
            Some(schema) => format!("{schema}.{}", quote_identifier(table)),
            None => quote_identifier(table),
        }
    }

    /// Drops and recreates the table, then inserts every row in batches.
    /// Returns the number of INSERT statements executed.
    fn replace_table(&mut self, table: &Table, name: &str, batch_size: usize) -> Result<usize> {
        let qualified = self.qualified(name);
        let definitions: Vec<String> = table
            .columns
            .iter()
            .map(|column| format!("{} {}", quote_identifier(&column.name), column.kind.as_str()))
            .collect();
        let columns: Vec<String> = table.columns.iter().map(|column| quote_identifier(&column.name)).collect();
        let placeholders = format!("({})", vec!["?"; table.columns.len()].join(", "));

        let transaction = self.connection.transaction().for_table(name)?;
        transaction
            .execute_batch(&format!(
                "DROP TABLE IF EXISTS {qualified}; CREATE TABLE {qualified} ({});",
                definitions.join(", ")
            ))
            .for_table(name)?;

        let mut batches = 0;
        if !table.columns.is_empty() {
            for chunk in table.rows.chunks(batch_size.max(1)) {
                let sql = format!(
                    "INSERT INTO {qualified} ({}) VALUES {}",
                    columns.join(", "),
                    vec![placeholders.as_str(); chunk.len()].join(", ")
                );
                let params = chunk.iter().flat_map(|row| {
                    row.iter()
                        .zip(&table.columns)
                        .map(|(value, column)| to_sql_value(value, column.kind))
                });
                transaction.execute(&sql, params_from_iter(params)).for_table(name)?;
                batches += 1;
            }
        }
        transaction.commit().for_table(name)?;
        Ok(batches)
    }

    fn count_rows(&self, name: &str) -> Result<i64> {
        self.connection
            .query_row(&format!("SELECT COUNT(*) FROM {}", self.qualified(name)), [], |row| row.get(0))
            .for_table(name)
    }
}

/// Replaces the configured table with the rows of `table` and verifies the row count.
///
/// The connection is closed on every path once it has been opened, and a
/// [`Event::ConnectionReleased`] follows whether the load succeeded or not.
pub fn load_table(table: &Table, config: &DatabaseConfig, reporter: &mut dyn Reporter) -> Result<LoadOutcome> {
    let mut session = Session::open(&config.target)?;
    let target = session.target.to_owned();
    reporter.report(Event::DatabaseConnected { target: target.to_owned() });

    let outcome = load(&mut session, table, config, reporter);

    drop(session);
    reporter.report(Event::ConnectionReleased { target });
    outcome
}

fn load(session: &mut Session, table: &Table, config: &DatabaseConfig, reporter: &mut dyn Reporter) -> Result<LoadOutcome> {
    let batches = session.replace_table(table, &config.table, config.batch_size)?;
    reporter.report(Event::TableReplaced {
        table: config.table.to_owned(),
        rows: table.len(),
        batches,
    });

    let verified_rows = session.count_rows(&config.table)?;
    reporter.report(verification(&config.table, table.len(), verified_rows));

    Ok(LoadOutcome {
        table: config.table.to_owned(),
        rows: table.len(),
        batches,
        verified_rows,
    })
}

/// Compares the row count read back with the rows sent; a mismatch is only reported.
fn verification(table: &str, expected: usize, actual: i64) -> Event {
    if actual == expected as i64 {
        Event::RowCountVerified {
            table: table.to_owned(),
            rows: actual,
        }
    } else {
        Event::VerificationMismatch {
            table: table.to_owned(),
            expected,
            actual,
        }
    }
}

/// Converts a cell to the parameter bound for a column of the given type.
/// Dates and timestamps travel as text and are cast by the database.
fn to_sql_value(value: &Value, kind: ColumnType) -> SqlValue {
    match (kind, value) {
        (_, Value::Missing) => SqlValue::Null,
        (ColumnType::Boolean, Value::Boolean(value)) => SqlValue::Boolean(*value),
        (ColumnType::BigInt, Value::Integer(value)) => SqlValue::BigInt(*value),
        (ColumnType::Double, Value::Integer(value)) => SqlValue::Double(*value as f64),
        (ColumnType::Double, Value::Float(value)) => SqlValue::Double(*value),
        (_, other) => SqlValue::Text(other.to_string()),
    }
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn quote_literal(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;
    use chrono::NaiveDate;
    use std::path::PathBuf;

    fn duckdb_config(path: PathBuf, batch_size: usize) -> DatabaseConfig {
        let mut config = DatabaseConfig::new("sales", DatabaseTarget::DuckDb { path });
        config.batch_size = batch_size;
        config
    }

    fn sales(rows: usize) -> Table {
        Table::from_rows(
            "sales",
            &["item_identifier", "item_weight", "outlet_establishment_year", "opened_on"],
            (0..rows)
                .map(|index| {
                    vec![
                        Value::Text(format!("FD{index:05}")),
                        if index % 2 == 0 { Value::Float(9.3) } else { Value::Integer(12) },
                        Value::Integer(1985 + (index % 30) as i64),
                        Value::Date(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()),
                    ]
                })
                .collect(),
        )
    }

    #[test]
    fn load_in_batches_and_verify() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("sales.duckdb");
        let config = duckdb_config(path.to_owned(), 1000);
        let mut events: Vec<Event> = Vec::new();

        let outcome = load_table(&sales(2500), &config, &mut events).unwrap();
        assert_eq!(outcome.rows, 2500);
        assert_eq!(outcome.batches, 3);
        assert_eq!(outcome.verified_rows, 2500);
        assert!(events.contains(&Event::RowCountVerified {
            table: "sales".to_owned(),
            rows: 2500
        }));
        assert!(matches!(events.last(), Some(Event::ConnectionReleased { .. })));

        // A second load replaces instead of appending
        let outcome = load_table(&sales(10), &config, &mut events).unwrap();
        assert_eq!(outcome.batches, 1);
        assert_eq!(outcome.verified_rows, 10);

        let connection = Connection::open(&path).unwrap();
        let (weight, year, opened): (f64, i64, String) = connection
            .query_row(
                "SELECT item_weight, outlet_establishment_year, CAST(opened_on AS VARCHAR) FROM sales WHERE item_identifier = 'FD00001'",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .unwrap();
        assert_eq!(weight, 12.0);
        assert_eq!(year, 1986);
        assert_eq!(opened, "2020-01-01");
    }

    #[test]
    fn empty_table_creates_no_batches() {
        let directory = tempfile::tempdir().unwrap();
        let config = duckdb_config(directory.path().join("empty.duckdb"), 1000);
        let table = Table::new("sales", vec![Column::new("item_identifier", ColumnType::Varchar)]);
        let mut events: Vec<Event> = Vec::new();

        let outcome = load_table(&table, &config, &mut events).unwrap();
        assert_eq!(outcome.batches, 0);
        assert_eq!(outcome.verified_rows, 0);
    }

    #[test]
    fn unreachable_target_is_a_connection_error() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("missing").join("dir").join("sales.duckdb");
        let mut events: Vec<Event> = Vec::new();

        let error = load_table(&sales(1), &duckdb_config(path, 1000), &mut events).unwrap_err();
        assert!(matches!(error, crate::PipelineError::ConnectionError { .. }));
        assert!(events.is_empty());
    }

    #[test]
    fn failed_load_still_releases_connection() {
        let directory = tempfile::tempdir().unwrap();
        let config = duckdb_config(directory.path().join("broken.duckdb"), 1000);
        let table = Table::from_rows("sales", &["a", "a"], vec![vec![Value::Integer(1), Value::Integer(2)]]);
        let mut events: Vec<Event> = Vec::new();

        let error = load_table(&table, &config, &mut events).unwrap_err();
        assert!(matches!(error, crate::PipelineError::LoadError { ref table, .. } if table == "sales"));
        assert!(matches!(events.last(), Some(Event::ConnectionReleased { .. })));
    }

    #[test]
    fn row_count_comparison() {
        let verified = verification("sales", 2500, 2500);
        assert_eq!(
            verified,
            Event::RowCountVerified {
                table: "sales".to_owned(),
                rows: 2500
            }
        );
        assert!(!verified.is_warning());

        let mismatch = verification("sales", 2500, 2499);
        assert_eq!(
            mismatch,
            Event::VerificationMismatch {
                table: "sales".to_owned(),
                expected: 2500,
                actual: 2499
            }
        );
        assert!(mismatch.is_warning());
    }

    #[test]
    fn values_follow_column_type() {
        assert_eq!(to_sql_value(&Value::Integer(3), ColumnType::Double), SqlValue::Double(3.0));
        assert_eq!(to_sql_value(&Value::Integer(3), ColumnType::Varchar), SqlValue::Text("3".to_owned()));
        assert_eq!(to_sql_value(&Value::Missing, ColumnType::BigInt), SqlValue::Null);
        assert_eq!(
            to_sql_value(&Value::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()), ColumnType::Date),
            SqlValue::Text("2024-02-29".to_owned())
        );
        assert_eq!(quote_identifier("a\"b"), "\"a\"\"b\"");
    }
}
