use std::collections::BTreeMap;

use super::model::{Field, ReviewTable};

// ---------------------------------------------------------------------------
// Filter predicate: one selected value per column
// ---------------------------------------------------------------------------

/// Equality constraints chained like the dashboard's selectboxes:
/// column → required value. A column absent from the map is unconstrained.
pub type RowFilter = BTreeMap<Field, String>;

/// Return indices of reviews that pass every constraint, in source order.
pub fn filtered_indices(table: &ReviewTable, filter: &RowFilter) -> Vec<usize> {
    table
        .records()
        .iter()
        .enumerate()
        .filter(|(_, r)| filter.iter().all(|(field, value)| r.get(*field) == value))
        .map(|(i, _)| i)
        .collect()
}

/// Build a new table with only the reviews passing `filter`.
pub fn apply(table: &ReviewTable, filter: &RowFilter) -> ReviewTable {
    if filter.is_empty() {
        return table.clone();
    }
    table.subset(&filtered_indices(table, filter))
}

/// Options for the next selectbox in a chain: distinct values of `field`
/// among the rows already passing `filter`, in first-seen order.
pub fn options_for(table: &ReviewTable, filter: &RowFilter, field: Field) -> Vec<String> {
    let mut narrowed = filter.clone();
    narrowed.remove(&field);
    apply(table, &narrowed).distinct_values(field)
}
