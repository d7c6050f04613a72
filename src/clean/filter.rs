use crate::table::Table;

/// Removes every row missing a value in any of the given columns.
/// Returns the number of removed rows.
pub(crate) fn drop_incomplete_rows(table: &mut Table, indexes: &[usize]) -> usize {
    if indexes.is_empty() {
        return 0;
    }
    table.retain_rows(|row| indexes.iter().all(|index| !row[*index].is_missing()))
}
