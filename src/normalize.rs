//! Column name normalization.
use crate::table::Table;

/// A source column lost because a later column normalized to the same name.
#[derive(Clone, Debug, PartialEq)]
pub struct Collision {
    /// The shared normalized name
    pub name: String,
    /// Original title of the column that was kept
    pub kept: String,
    /// Original title of the column that was dropped
    pub dropped: String,
}

/// Canonical form of a column name.
///
/// Trims surrounding whitespace, turns spaces, dots and slashes into underscores,
/// lower-cases, then strips everything that is neither alphanumeric nor an underscore.
pub fn normalize_name(name: &str) -> String {
    name.trim()
        .chars()
        .map(|character| match character {
            ' ' | '.' | '/' => '_',
            _ => character,
        })
        .flat_map(char::to_lowercase)
        .filter(|character| character.is_alphanumeric() || *character == '_')
        .collect()
}

/// Renames every column of the table to its canonical form.
///
/// A title with nothing left after normalization becomes `unnamed_{index}`.
/// When several columns end up with the same name, the last one wins and the
/// earlier ones are removed together with their cells; each removal is returned.
pub fn normalize_columns(table: &mut Table) -> Vec<Collision> {
    let originals: Vec<String> = table.columns.iter().map(|column| column.name.to_owned()).collect();
    let names: Vec<String> = originals
        .iter()
        .enumerate()
        .map(|(index, name)| match normalize_name(name) {
            normalized if normalized.is_empty() => format!("unnamed_{index}"),
            normalized => normalized,
        })
        .collect();

    let mut collisions = Vec::new();
    let mut shadowed = Vec::new();
    for (index, name) in names.iter().enumerate() {
        let last = names.iter().rposition(|other| other == name).filter(|last| *last != index);
        if let Some(last) = last {
            collisions.push(Collision {
                name: name.to_owned(),
                kept: originals[last].to_owned(),
                dropped: originals[index].to_owned(),
            });
            shadowed.push(index);
        }
    }

    for (column, name) in table.columns.iter_mut().zip(names) {
        column.name = name;
    }
    for index in shadowed.into_iter().rev() {
        table.remove_column(index);
    }
    collisions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Value;

    #[test]
    fn canonical_names() {
        assert_eq!(normalize_name("Item Identifier"), "item_identifier");
        assert_eq!(normalize_name("  Outlet Establishment Year "), "outlet_establishment_year");
        assert_eq!(normalize_name("Item.Fat Content"), "item_fat_content");
        assert_eq!(normalize_name("Sales/Rating"), "sales_rating");
        assert_eq!(normalize_name("Item MRP ($)"), "item_mrp_");
        assert_eq!(normalize_name("Rating"), "rating");
    }

    #[test]
    fn normalization_is_idempotent() {
        let names = [
            "Item Fat Content",
            "Outlet.Location/Type",
            " Total Sales (INR) ",
            "Größe",
            "item_weight",
            "A..B//C",
            "",
        ];
        for name in names {
            let once = normalize_name(name);
            assert_eq!(normalize_name(&once), once, "normalizing '{name}' twice");
        }
    }

    #[test]
    fn later_column_wins_on_collision() {
        let mut table = Table::from_rows(
            "sales",
            &["Item Type", "Rating", "item type"],
            vec![vec![Value::from("Dairy"), Value::Float(4.1), Value::from("Snacks")]],
        );
        let collisions = normalize_columns(&mut table);

        assert_eq!(table.column_names(), vec!["rating", "item_type"]);
        assert_eq!(table.rows[0], vec![Value::Float(4.1), Value::from("Snacks")]);
        assert_eq!(
            collisions,
            vec![Collision {
                name: "item_type".to_owned(),
                kept: "item type".to_owned(),
                dropped: "Item Type".to_owned(),
            }]
        );
    }

    #[test]
    fn symbol_only_titles_get_a_positional_name() {
        let mut table = Table::from_rows(
            "sales",
            &["Item Type", "$$$", "(%)"],
            vec![vec![Value::from("Dairy"), Value::Integer(1), Value::Integer(2)]],
        );
        let collisions = normalize_columns(&mut table);

        assert!(collisions.is_empty());
        assert_eq!(table.column_names(), vec!["item_type", "unnamed_1", "unnamed_2"]);
        assert_eq!(normalize_name("unnamed_1"), "unnamed_1");
    }
}
