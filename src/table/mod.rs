//! # Record Table
//!
//! The in-memory table that flows through the pipeline: an ordered list of typed
//! columns and the rows read from the source sheet. Rows are only ever removed,
//! never synthesized.
pub mod column;
pub mod value;

pub use column::{Column, ColumnType};
pub use value::Value;

/// Ordered rows of cells under named, typed columns.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    /// Table/sheet name
    pub name: String,
    /// Column definitions
    pub columns: Vec<Column>,
    /// Row cells, each row as wide as `columns`
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    /// Creates a table with the given columns and no rows.
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Table {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Builds a table from header names and rows, inferring column types from the cells.
    pub fn from_rows<S: AsRef<str>>(name: impl Into<String>, header: &[S], rows: Vec<Vec<Value>>) -> Self {
        let columns = header
            .iter()
            .map(|title| Column::new(title.as_ref(), ColumnType::Varchar))
            .collect();
        let mut table = Table {
            name: name.into(),
            columns,
            rows,
        };
        table.refresh_types();
        table
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the column with the given name.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|column| column.name.as_str()).collect()
    }

    /// Iterates over the cells of one column.
    pub fn values(&self, index: usize) -> impl Iterator<Item = &Value> + '_ {
        self.rows.iter().map(move |row| &row[index])
    }

    /// Iterates mutably over the cells of one column.
    pub fn values_mut(&mut self, index: usize) -> impl Iterator<Item = &mut Value> + '_ {
        self.rows.iter_mut().map(move |row| &mut row[index])
    }

    /// Number of missing cells in one column.
    pub fn null_count(&self, index: usize) -> usize {
        self.values(index).filter(|value| value.is_missing()).count()
    }

    /// Removes a column and its cells from every row.
    pub fn remove_column(&mut self, index: usize) -> Column {
        for row in self.rows.iter_mut() {
            row.remove(index);
        }
        self.columns.remove(index)
    }

    /// Keeps only rows accepted by the predicate and returns how many were removed.
    pub fn retain_rows<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(&[Value]) -> bool,
    {
        let before = self.rows.len();
        self.rows.retain(|row| predicate(row));
        before - self.rows.len()
    }

    /// Re-detects every column type from the cells it currently holds.
    pub fn refresh_types(&mut self) {
        for index in 0..self.columns.len() {
            let kind = ColumnType::detect(self.values(index).map(ColumnType::of));
            self.columns[index].kind = kind;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::from_rows(
            "sample",
            &["id", "weight"],
            vec![
                vec![Value::from("A"), Value::Float(1.5)],
                vec![Value::from("B"), Value::Missing],
                vec![Value::Missing, Value::Integer(3)],
            ],
        )
    }

    #[test]
    fn from_rows_infers_types() {
        let table = sample();
        assert_eq!(table.columns[0].kind, ColumnType::Varchar);
        assert_eq!(table.columns[1].kind, ColumnType::Double);
        assert_eq!(table.null_count(1), 1);
    }

    #[test]
    fn retain_and_remove() {
        let mut table = sample();
        let removed = table.retain_rows(|row| !row[0].is_missing());
        assert_eq!(removed, 1);
        assert_eq!(table.len(), 2);

        table.remove_column(0);
        assert_eq!(table.column_names(), vec!["weight"]);
        assert!(table.rows.iter().all(|row| row.len() == 1));
    }
}
