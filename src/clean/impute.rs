use crate::table::{Table, Value};
use std::collections::HashMap;

/// What an imputation pass did to a column.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Imputation {
    /// No value was missing.
    Nothing,
    /// Every value was missing, so no substitute could be computed.
    NoBasis,
    /// `filled` cells were set to `value`.
    Filled { value: Value, filled: usize },
}

/// Median of the numeric values; the mean of the two middle values for an even count.
pub fn median<'a, I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = &'a Value>,
{
    let mut numbers: Vec<f64> = values.into_iter().filter_map(Value::as_f64).collect();
    if numbers.is_empty() {
        return None;
    }
    numbers.sort_by(f64::total_cmp);
    let middle = numbers.len() / 2;
    if numbers.len() % 2 == 0 {
        Some((numbers[middle - 1] + numbers[middle]) / 2.0)
    } else {
        Some(numbers[middle])
    }
}

/// Most frequent non-missing value; the first one encountered wins a tie.
pub fn mode<'a, I>(values: I) -> Option<Value>
where
    I: IntoIterator<Item = &'a Value>,
{
    // key -> (count, first position, value)
    let mut counts: HashMap<String, (usize, usize, &Value)> = HashMap::new();
    for (position, value) in values.into_iter().enumerate().filter(|(_, value)| !value.is_missing()) {
        counts
            .entry(value.to_string())
            .and_modify(|(count, _, _)| *count += 1)
            .or_insert((1, position, value));
    }
    counts
        .into_values()
        .max_by(|(count, first, _), (other_count, other_first, _)| {
            count.cmp(other_count).then(other_first.cmp(first))
        })
        .map(|(_, _, value)| value.to_owned())
}

/// Replaces every missing cell of the column with the median of its present values.
/// The median is computed once, before any cell is replaced.
pub(crate) fn fill_median(table: &mut Table, index: usize) -> Imputation {
    if table.null_count(index) == 0 {
        return Imputation::Nothing;
    }
    match median(table.values(index)) {
        Some(median) => fill(table, index, Value::Float(median)),
        None => Imputation::NoBasis,
    }
}

/// Replaces every missing cell of the column with its most frequent value.
pub(crate) fn fill_mode(table: &mut Table, index: usize) -> Imputation {
    if table.null_count(index) == 0 {
        return Imputation::Nothing;
    }
    match mode(table.values(index)) {
        Some(mode) => fill(table, index, mode),
        None => Imputation::NoBasis,
    }
}

fn fill(table: &mut Table, index: usize, substitute: Value) -> Imputation {
    let mut filled = 0;
    for value in table.values_mut(index).filter(|value| value.is_missing()) {
        *value = substitute.to_owned();
        filled += 1;
    }
    Imputation::Filled {
        value: substitute,
        filled,
    }
}

/// Rounds half away from zero to the given number of decimal places.
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

/// Rounds every floating-point cell of the column; integers are already exact.
pub(crate) fn round_column(table: &mut Table, index: usize, places: u32) {
    for value in table.values_mut(index) {
        if let Value::Float(number) = value {
            *number = round_to(*number, places);
        }
    }
}
