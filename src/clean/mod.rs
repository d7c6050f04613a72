//! # Cleaning and Imputation
//!
//! Fixed, column-scoped passes over the normalized table:
//!
//! 1. canonical categories for the fat-content column
//! 2. median imputation for the numeric measurement columns
//! 3. mode imputation for the outlet size column
//! 4. rounding of the visibility column
//! 5. removal of rows still missing a critical column
//!
//! Every pass is skipped, with a notice, when its column is absent. The filter
//! runs last so rows are only dropped for missing values imputation could not
//! resolve. Nothing in here fails.
use crate::report::{ColumnSummary, Event, NullCount, ProfilePoint, Reporter};
use crate::table::Table;
use serde::Deserialize;

pub mod canonical;
pub mod filter;
pub mod impute;

use impute::Imputation;

/// Columns each cleaning pass applies to.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct CleaningPlan {
    pub fat_content_column: String,
    pub median_columns: Vec<String>,
    pub mode_columns: Vec<String>,
    pub rounded_columns: Vec<String>,
    pub rounding_places: u32,
    pub critical_columns: Vec<String>,
}

impl Default for CleaningPlan {
    fn default() -> Self {
        let strings = |names: &[&str]| names.iter().map(|name| name.to_string()).collect();
        CleaningPlan {
            fat_content_column: "item_fat_content".to_owned(),
            median_columns: strings(&["item_weight", "rating"]),
            mode_columns: strings(&["outlet_size"]),
            rounded_columns: strings(&["item_visibility"]),
            rounding_places: 6,
            critical_columns: strings(&[
                "item_identifier",
                "item_type",
                "outlet_establishment_year",
                "outlet_identifier",
                "outlet_location_type",
                "outlet_type",
            ]),
        }
    }
}

/// Row counts around the cleaning stage.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CleaningSummary {
    pub rows_before: usize,
    pub rows_dropped: usize,
}

/// Applies every pass of the plan to the table in place.
pub fn clean(table: &mut Table, plan: &CleaningPlan, reporter: &mut dyn Reporter) -> CleaningSummary {
    let rows_before = table.len();

    match table.position(&plan.fat_content_column) {
        Some(index) => {
            reporter.report(Event::CategoriesProfiled {
                column: plan.fat_content_column.to_owned(),
                distinct: canonical::distinct(table, index),
                missing: table.null_count(index),
            });
            let outcome = canonical::canonicalize(table, index);
            reporter.report(Event::CategoriesCanonicalized {
                column: plan.fat_content_column.to_owned(),
                distinct: canonical::distinct(table, index),
                filled: outcome.filled,
                unrecognized: outcome.unrecognized,
            });
        }
        None => missing_column(reporter, "standardization", &plan.fat_content_column),
    }

    reporter.report(null_profile(table, ProfilePoint::BeforeImputation));

    for name in &plan.median_columns {
        match table.position(name) {
            Some(index) => report_imputation(reporter, name, impute::fill_median(table, index), true),
            None => missing_column(reporter, "median imputation", name),
        }
    }

    for name in &plan.mode_columns {
        match table.position(name) {
            Some(index) => report_imputation(reporter, name, impute::fill_mode(table, index), false),
            None => missing_column(reporter, "mode imputation", name),
        }
    }

    for name in &plan.rounded_columns {
        match table.position(name) {
            Some(index) => {
                impute::round_column(table, index, plan.rounding_places);
                reporter.report(Event::ValuesRounded {
                    column: name.to_owned(),
                    places: plan.rounding_places,
                });
            }
            None => missing_column(reporter, "rounding", name),
        }
    }

    let mut critical = Vec::new();
    for name in &plan.critical_columns {
        match table.position(name) {
            Some(index) => critical.push(index),
            None => missing_column(reporter, "critical value check", name),
        }
    }
    let rows_dropped = filter::drop_incomplete_rows(table, &critical);
    reporter.report(Event::CriticalRowsDropped {
        dropped: rows_dropped,
        remaining: table.len(),
    });

    table.refresh_types();
    reporter.report(null_profile(table, ProfilePoint::AfterCleaning));
    reporter.report(column_types(table));

    CleaningSummary {
        rows_before,
        rows_dropped,
    }
}

fn missing_column(reporter: &mut dyn Reporter, step: &'static str, column: &str) {
    reporter.report(Event::ColumnMissing {
        step,
        column: column.to_owned(),
    });
}

fn report_imputation(reporter: &mut dyn Reporter, column: &str, imputation: Imputation, median: bool) {
    let column = column.to_owned();
    let event = match imputation {
        Imputation::Nothing => Event::NothingToImpute { column },
        Imputation::NoBasis => Event::NoImputationBasis { column },
        Imputation::Filled { value, filled } if median => Event::MedianImputed {
            column,
            median: value.as_f64().unwrap_or(f64::NAN),
            filled,
        },
        Imputation::Filled { value, filled } => Event::ModeImputed {
            column,
            mode: value.to_string(),
            filled,
        },
    };
    reporter.report(event);
}

/// Columns with missing values, with their share of the rows.
pub fn null_profile(table: &Table, point: ProfilePoint) -> Event {
    let rows = table.len();
    let columns = table
        .columns
        .iter()
        .enumerate()
        .map(|(index, column)| (column, table.null_count(index)))
        .filter(|(_, nulls)| *nulls > 0)
        .map(|(column, nulls)| NullCount {
            column: column.name.to_owned(),
            nulls,
            percentage: nulls as f64 * 100.0 / rows as f64,
        })
        .collect();
    Event::NullProfile { point, rows, columns }
}

fn column_types(table: &Table) -> Event {
    Event::ColumnTypes {
        columns: table
            .columns
            .iter()
            .enumerate()
            .map(|(index, column)| ColumnSummary {
                column: column.name.to_owned(),
                kind: column.kind,
                non_null: table.len() - table.null_count(index),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Event;
    use crate::table::{ColumnType, Value};

    const HEADER: [&str; 12] = [
        "item_identifier",
        "item_weight",
        "item_fat_content",
        "item_visibility",
        "item_type",
        "item_mrp",
        "outlet_identifier",
        "outlet_establishment_year",
        "outlet_size",
        "outlet_location_type",
        "outlet_type",
        "rating",
    ];

    fn record(
        identifier: Option<&str>,
        weight: Option<f64>,
        fat: Option<&str>,
        size: Option<&str>,
        year: Option<i64>,
        rating: Option<f64>,
    ) -> Vec<Value> {
        let text = |value: Option<&str>| value.map(Value::from).unwrap_or_default();
        let critical = |value: &str| identifier.map(|_| Value::from(value)).unwrap_or_default();
        vec![
            text(identifier),
            weight.map(Value::Float).unwrap_or_default(),
            text(fat),
            Value::Float(0.0160473),
            critical("Dairy"),
            Value::Float(249.8092),
            critical("OUT049"),
            year.map(Value::Integer).unwrap_or_default(),
            text(size),
            critical("Tier 1"),
            critical("Supermarket Type1"),
            rating.map(Value::Float).unwrap_or_default(),
        ]
    }

    #[test]
    fn three_row_scenario() {
        let mut table = Table::from_rows(
            "sales",
            &HEADER,
            vec![
                record(Some("FDA15"), Some(9.3), Some("Low Fat"), Some("Medium"), Some(1999), Some(4.1)),
                record(Some("DRC01"), Some(5.92), Some("Regular"), Some("Medium"), Some(2009), None),
                record(None, Some(17.5), Some("LF"), None, None, Some(3.8)),
            ],
        );
        let mut events: Vec<Event> = Vec::new();
        let summary = clean(&mut table, &CleaningPlan::default(), &mut events);

        assert_eq!(summary.rows_before, 3);
        assert_eq!(summary.rows_dropped, 1);
        assert_eq!(table.len(), 2);

        let rating = table.position("rating").unwrap();
        let imputed = table.rows[1][rating].as_f64().unwrap();
        assert!((imputed - 3.95).abs() < 1e-9);
        assert!(table.rows.iter().all(|row| row[0] != Value::Missing));

        let visibility = table.position("item_visibility").unwrap();
        assert_eq!(table.rows[0][visibility], Value::Float(0.016047));

        assert!(events.contains(&Event::CriticalRowsDropped {
            dropped: 1,
            remaining: 2
        }));
        assert!(events.iter().any(|event| matches!(
            event,
            Event::MedianImputed { column, filled: 1, .. } if column == "rating"
        )));
        assert!(events.iter().any(|event| matches!(
            event,
            Event::NothingToImpute { column } if column == "item_weight"
        )));
    }

    #[test]
    fn imputed_cells_equal_original_median() {
        let mut table = Table::from_rows(
            "sales",
            &HEADER,
            vec![
                record(Some("A"), Some(10.0), Some("LF"), Some("Small"), Some(1999), Some(2.0)),
                record(Some("B"), None, Some("reg"), None, Some(1999), None),
                record(Some("C"), Some(14.0), None, Some("High"), Some(2004), Some(5.0)),
                record(Some("D"), None, Some("low fat"), Some("High"), Some(2004), Some(4.0)),
            ],
        );
        let mut events: Vec<Event> = Vec::new();
        clean(&mut table, &CleaningPlan::default(), &mut events);

        let weight = table.position("item_weight").unwrap();
        let rating = table.position("rating").unwrap();
        let size = table.position("outlet_size").unwrap();
        let fat = table.position("item_fat_content").unwrap();
        assert_eq!(table.null_count(weight), 0);
        assert_eq!(table.null_count(rating), 0);
        assert_eq!(table.null_count(size), 0);
        assert_eq!(table.rows[1][weight], Value::Float(12.0));
        assert_eq!(table.rows[3][weight], Value::Float(12.0));
        assert_eq!(table.rows[1][rating], Value::Float(4.0));
        assert_eq!(table.rows[1][size], Value::from("High"));

        let categories: Vec<String> = table.values(fat).map(|value| value.to_string()).collect();
        assert_eq!(categories, vec!["Low Fat", "Regular", "Unknown", "Low Fat"]);
        assert_eq!(table.columns[weight].kind, ColumnType::Double);
    }

    #[test]
    fn absent_columns_are_reported_not_fatal() {
        let mut table = Table::from_rows("t", &["item_identifier"], vec![vec![Value::from("A")]]);
        let mut events: Vec<Event> = Vec::new();
        let summary = clean(&mut table, &CleaningPlan::default(), &mut events);

        assert_eq!(summary.rows_dropped, 0);
        assert_eq!(table.len(), 1);
        let skipped: Vec<&str> = events
            .iter()
            .filter_map(|event| match event {
                Event::ColumnMissing { column, .. } => Some(column.as_str()),
                _ => None,
            })
            .collect();
        assert!(skipped.contains(&"item_fat_content"));
        assert!(skipped.contains(&"rating"));
        assert!(skipped.contains(&"outlet_size"));
        assert!(skipped.contains(&"outlet_type"));
        assert!(!skipped.contains(&"item_identifier"));
    }

    #[test]
    fn residual_nulls_are_a_warning() {
        let mut table = Table::from_rows("t", &["note"], vec![vec![Value::Missing]]);
        let profile = null_profile(&table, ProfilePoint::AfterCleaning);
        assert!(profile.is_warning());

        table.rows[0][0] = Value::from("ok");
        let profile = null_profile(&table, ProfilePoint::AfterCleaning);
        assert!(!profile.is_warning());
    }
}
