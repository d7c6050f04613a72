//! # Pipeline
//!
//! Runs the stages in their fixed order: load the sheet, normalize column names,
//! clean, write the CSV checkpoint, then replace the database table. The first
//! fatal error aborts every later stage. A CSV checkpoint written before a
//! database failure is left in place so it can be reloaded with
//! [`Pipeline::load_checkpoint`].
use crate::clean::{clean, CleaningSummary};
use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::normalize::normalize_columns;
use crate::report::{Event, Reporter};
use crate::sink::{self, LoadOutcome};
use crate::spreadsheet;
use crate::table::Table;

/// What a complete run produced.
#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    pub rows_loaded: usize,
    pub rows_dropped: usize,
    pub rows_written: usize,
    /// Absent when the database stage was skipped
    pub database: Option<LoadOutcome>,
}

/// One configured run of the loader.
pub struct Pipeline<'a> {
    config: &'a PipelineConfig,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a PipelineConfig) -> Self {
        Pipeline { config }
    }

    /// Reads the source sheet and returns it normalized and cleaned.
    pub fn clean_table(&self, reporter: &mut dyn Reporter) -> Result<(Table, CleaningSummary)> {
        let source = &self.config.source;
        let mut table = spreadsheet::load_table(source)?;
        reporter.report(Event::SourceLoaded {
            path: source.path.to_owned(),
            sheet: table.name.to_owned(),
            rows: table.len(),
            columns: table.columns.len(),
        });

        let collisions = normalize_columns(&mut table);
        if self.config.strict_column_names {
            if let Some(collision) = collisions.into_iter().next() {
                Err(PipelineError::ColumnCollision {
                    name: collision.name,
                    kept: collision.kept,
                    dropped: collision.dropped,
                })?
            }
        } else {
            for collision in collisions {
                reporter.report(Event::ColumnCollision {
                    name: collision.name,
                    kept: collision.kept,
                    dropped: collision.dropped,
                });
            }
        }
        reporter.report(Event::ColumnsNormalized {
            names: table.column_names().into_iter().map(str::to_owned).collect(),
        });

        let summary = clean(&mut table, &self.config.cleaning, reporter);
        Ok((table, summary))
    }

    /// Runs every stage. With `skip_database` the run ends after the CSV checkpoint.
    pub fn run(&self, reporter: &mut dyn Reporter, skip_database: bool) -> Result<RunSummary> {
        let (table, cleaning) = self.clean_table(reporter)?;

        let csv_path = &self.config.output.csv_path;
        sink::write_csv(&table, csv_path).map_err(|source| PipelineError::SinkWriteError {
            path: csv_path.display().to_string(),
            source,
        })?;
        reporter.report(Event::CsvWritten {
            path: csv_path.display().to_string(),
            rows: table.len(),
        });

        let database = match (&self.config.database, skip_database) {
            (Some(database), false) => Some(sink::load_table(&table, database, reporter)?),
            _ => None,
        };

        Ok(RunSummary {
            rows_loaded: cleaning.rows_before,
            rows_dropped: cleaning.rows_dropped,
            rows_written: table.len(),
            database,
        })
    }

    /// Loads the CSV checkpoint of an earlier run into the database.
    pub fn load_checkpoint(&self, reporter: &mut dyn Reporter) -> Result<LoadOutcome> {
        let database = self.config.database.as_ref().ok_or(PipelineError::DatabaseNotConfigured)?;
        let csv_path = &self.config.output.csv_path;
        let table = sink::read_csv(csv_path).map_err(|source| PipelineError::CheckpointReadError {
            path: csv_path.display().to_string(),
            source,
        })?;
        reporter.report(Event::CheckpointRead {
            path: csv_path.display().to_string(),
            rows: table.len(),
        });
        sink::load_table(&table, database, reporter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourceConfig;

    #[test]
    fn missing_source_aborts_before_any_output() {
        let directory = tempfile::tempdir().unwrap();
        let csv_path = directory.path().join("cleaned.csv");
        let source = SourceConfig::new(directory.path().join("absent.xlsx").display().to_string(), "Sheet1");
        let config = PipelineConfig::new(source, &csv_path);
        let mut events: Vec<Event> = Vec::new();

        let error = Pipeline::new(&config).run(&mut events, false).unwrap_err();
        assert!(matches!(error, PipelineError::SourceNotFound(_)));
        assert!(events.is_empty());
        assert!(!csv_path.exists());
    }

    #[test]
    fn checkpoint_reload_requires_database() {
        let config = PipelineConfig::new(SourceConfig::new("a.xlsx", "Sheet1"), "cleaned.csv");
        let mut events: Vec<Event> = Vec::new();
        let error = Pipeline::new(&config).load_checkpoint(&mut events).unwrap_err();
        assert!(matches!(error, PipelineError::DatabaseNotConfigured));
    }
}
