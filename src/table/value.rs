use chrono::NaiveDate;
use chrono::NaiveDateTime;
use std::fmt::Display;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single cell of the record table.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    #[default]
    Missing,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
}

impl Value {
    /// Returns true if the cell holds no value.
    #[inline]
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    /// Numeric view of the cell.
    /// Text is accepted when it parses as a number, so mixed columns still yield their numbers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(value) => Some(*value as f64),
            Value::Float(value) if value.is_finite() => Some(*value),
            Value::Text(value) => value.trim().parse::<f64>().ok().filter(|it| it.is_finite()),
            _ => None,
        }
    }

    /// Parses a textual cell (from a CSV checkpoint) back into the most specific value.
    /// Integers are only recognised in canonical form so identifiers like "007" stay text.
    pub fn parse(text: &str) -> Value {
        if text.is_empty() {
            return Value::Missing;
        }
        if let Ok(value) = text.parse::<i64>() {
            if value.to_string() == text {
                return Value::Integer(value);
            }
        }
        if let Ok(value) = text.parse::<f64>() {
            if value.is_finite() && !text.starts_with(['+', '.']) && text.contains('.') {
                return Value::Float(value);
            }
        }
        match text {
            "true" => return Value::Boolean(true),
            "false" => return Value::Boolean(false),
            _ => (),
        }
        if let Ok(date) = NaiveDate::parse_from_str(text, DATE_FORMAT) {
            return Value::Date(date);
        }
        if let Ok(timestamp) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f") {
            return Value::Timestamp(timestamp);
        }
        Value::Text(text.to_owned())
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Missing => Ok(()),
            Value::Boolean(value) => write!(f, "{value}"),
            Value::Integer(value) => write!(f, "{value}"),
            // Whole floats keep a trailing ".0" so they read back as floats
            Value::Float(value) if value.fract() == 0.0 => write!(f, "{value:.1}"),
            Value::Float(value) => write!(f, "{value}"),
            Value::Text(value) => f.write_str(value),
            Value::Date(value) => write!(f, "{}", value.format(DATE_FORMAT)),
            Value::Timestamp(value) => write!(f, "{}", value.format(TIMESTAMP_FORMAT)),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_owned())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}
