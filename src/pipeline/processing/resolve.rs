//! Column resolution: find the source column for a canonical field in a table
//! whose naming convention is not known in advance.

use tracing::debug;

use super::coerce::{to_numeric, NumericColumn};
use crate::domain::CanonicalField;
use crate::table::{Column, RawTable};

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// First column matching one of `aliases`, tried in priority order.
///
/// For each alias an exact normalized match wins; otherwise the first column
/// (in table order) whose normalized name equals, starts with or contains the
/// alias is taken before moving on to the next alias.
pub fn find_column<'a>(table: &'a RawTable, aliases: &[&str]) -> Option<&'a Column> {
    let normalized: Vec<(String, &Column)> = table
        .columns()
        .iter()
        .map(|c| (normalize(&c.name), c))
        .collect();

    for alias in aliases {
        let alias = normalize(alias);
        if let Some((_, column)) = normalized.iter().find(|(name, _)| *name == alias) {
            return Some(column);
        }
        if let Some((_, column)) = normalized
            .iter()
            .find(|(name, _)| name == &alias || name.starts_with(&alias) || name.contains(&alias))
        {
            return Some(column);
        }
    }
    None
}

/// Resolve `field` to a numeric column. Unmatched fields are all-missing.
pub fn resolve(table: &RawTable, field: CanonicalField, aliases: &[&str]) -> NumericColumn {
    match find_column(table, aliases) {
        Some(column) => {
            debug!("Resolved {} from column '{}'", field, column.name);
            to_numeric(&column.cells)
        }
        None => {
            debug!("No source column for {}", field);
            vec![None; table.n_rows()]
        }
    }
}

/// Resolve `field` through its static alias list.
pub fn resolve_field(table: &RawTable, field: CanonicalField) -> NumericColumn {
    resolve(table, field, field.aliases())
}
