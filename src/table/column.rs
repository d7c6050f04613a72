use crate::table::value::Value;

/// Supported column data types of the record table.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ColumnType {
    /// Boolean values (true/false)
    Boolean,
    /// 64-bit signed integers
    BigInt,
    /// Double-precision floating point numbers
    Double,
    /// Variable-length strings
    Varchar,
    /// Date and time with microsecond precision
    Timestamp,
    /// Date without time component
    Date,
}

/// Represents a column of the record table with name and data type.
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    /// Column name (from header row, normalized later)
    pub name: String,
    /// Column data type
    pub kind: ColumnType,
}

impl Column {
    pub fn new(name: impl Into<String>, kind: ColumnType) -> Self {
        Column {
            name: name.into(),
            kind,
        }
    }
}

impl ColumnType {
    /// Returns the SQL type used when the column is created in a database table.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Boolean => "boolean",
            ColumnType::BigInt => "bigint",
            ColumnType::Double => "double",
            ColumnType::Varchar => "varchar",
            ColumnType::Timestamp => "timestamp",
            ColumnType::Date => "date",
        }
    }

    /// Infers the column type of a single value; missing values have none.
    pub(crate) fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Missing => None,
            Value::Boolean(_) => Some(ColumnType::Boolean),
            Value::Integer(_) => Some(ColumnType::BigInt),
            Value::Float(_) => Some(ColumnType::Double),
            Value::Text(_) => Some(ColumnType::Varchar),
            Value::Date(_) => Some(ColumnType::Date),
            Value::Timestamp(_) => Some(ColumnType::Timestamp),
        }
    }

    /// Detects the most specific common type from a collection of candidate types.
    /// Falls back to VARCHAR if types are inconsistent or empty.
    pub(crate) fn detect<I>(types: I) -> ColumnType
    where
        I: IntoIterator<Item = Option<ColumnType>>,
    {
        let types: Vec<ColumnType> = types.into_iter().flatten().collect();
        if types.is_empty() {
            ColumnType::Varchar
        } else if types.iter().all(|kind| kind.is_boolean()) {
            ColumnType::Boolean
        } else if types.iter().all(|kind| kind.is_int()) {
            ColumnType::BigInt
        } else if types.iter().all(|kind| kind.is_float()) {
            ColumnType::Double
        } else if types.iter().all(|kind| *kind == ColumnType::Date) {
            ColumnType::Date
        } else if types.iter().all(|kind| kind.is_datetime()) {
            ColumnType::Timestamp
        } else {
            ColumnType::Varchar
        }
    }

    /// Returns true if this column type represents boolean values.
    #[inline]
    pub fn is_boolean(&self) -> bool {
        matches!(self, ColumnType::Boolean)
    }

    /// Returns true if this column type represents integer values.
    #[inline]
    pub fn is_int(&self) -> bool {
        matches!(self, ColumnType::BigInt)
    }

    /// Returns true if this column type represents numeric values (integer or floating point).
    #[inline]
    pub fn is_float(&self) -> bool {
        matches!(self, ColumnType::BigInt | ColumnType::Double)
    }

    /// Returns true if this column type represents date/time related values.
    #[inline]
    pub fn is_datetime(&self) -> bool {
        matches!(self, ColumnType::Timestamp | ColumnType::Date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_prefers_specific_types() {
        let ints = [Some(ColumnType::BigInt), None, Some(ColumnType::BigInt)];
        assert_eq!(ColumnType::detect(ints), ColumnType::BigInt);

        let numbers = [Some(ColumnType::BigInt), Some(ColumnType::Double)];
        assert_eq!(ColumnType::detect(numbers), ColumnType::Double);

        let dates = [Some(ColumnType::Date), Some(ColumnType::Timestamp)];
        assert_eq!(ColumnType::detect(dates), ColumnType::Timestamp);

        let mixed = [Some(ColumnType::Double), Some(ColumnType::Varchar)];
        assert_eq!(ColumnType::detect(mixed), ColumnType::Varchar);

        assert_eq!(ColumnType::detect([None, None]), ColumnType::Varchar);
    }
}
