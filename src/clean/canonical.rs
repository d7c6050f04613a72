use crate::table::{Table, Value};

/// String form given to missing values before the lookup.
pub const NOT_A_VALUE: &str = "NAN";

/// Fill for anything still missing after the lookup.
pub const UNKNOWN: &str = "Unknown";

/// Upper-cased spellings and the canonical category they stand for.
const FAT_CONTENT_LOOKUP: [(&str, &str); 5] = [
    ("LOW FAT", "Low Fat"),
    ("LF", "Low Fat"),
    ("REGULAR", "Regular"),
    ("REG", "Regular"),
    (NOT_A_VALUE, UNKNOWN),
];

pub(crate) struct Canonicalized {
    pub(crate) filled: usize,
    pub(crate) unrecognized: Vec<String>,
}

/// Maps one upper-cased value through the lookup table; unmatched values pass through.
pub fn canonical_fat_content(value: &str) -> Option<&'static str> {
    FAT_CONTENT_LOOKUP
        .iter()
        .find(|(spelling, _)| *spelling == value)
        .map(|(_, canonical)| *canonical)
}

/// Rewrites a categorical column to its canonical categories.
///
/// Every value is first coerced to its upper-cased string form, with missing
/// values becoming [`NOT_A_VALUE`], then mapped through the lookup table.
pub(crate) fn canonicalize(table: &mut Table, index: usize) -> Canonicalized {
    let mut unrecognized: Vec<String> = Vec::new();
    for value in table.values_mut(index) {
        let text = match &*value {
            Value::Missing => NOT_A_VALUE.to_owned(),
            other => other.to_string().to_uppercase(),
        };
        *value = match canonical_fat_content(&text) {
            Some(canonical) => Value::Text(canonical.to_owned()),
            None => {
                if !unrecognized.contains(&text) {
                    unrecognized.push(text.to_owned());
                }
                Value::Text(text)
            }
        };
    }

    // Catch-all; the coercion above leaves nothing missing today
    let mut filled = 0;
    for value in table.values_mut(index).filter(|value| value.is_missing()) {
        *value = Value::Text(UNKNOWN.to_owned());
        filled += 1;
    }
    Canonicalized { filled, unrecognized }
}

/// Distinct values of a column in order of first appearance, missing values excluded.
pub(crate) fn distinct(table: &Table, index: usize) -> Vec<String> {
    let mut values: Vec<String> = Vec::new();
    for value in table.values(index).filter(|value| !value.is_missing()) {
        let text = value.to_string();
        if !values.contains(&text) {
            values.push(text);
        }
    }
    values
}
