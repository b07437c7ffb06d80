//! Selected tables (multi-drag, highlight) and selected columns (relation
//! creation).

use crate::ident::{ColumnRef, TableKey};
use std::collections::BTreeSet;

const MAX_SELECTED_COLUMNS: usize = 2;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    tables: BTreeSet<TableKey>,
    columns: Vec<ColumnRef>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains_table(&self, key: &TableKey) -> bool {
        self.tables.contains(key)
    }

    pub fn selected_tables(&self) -> impl Iterator<Item = &TableKey> {
        self.tables.iter()
    }

    /// Flip membership of `key`. Returns whether it is selected afterwards.
    pub fn toggle_table(&mut self, key: &TableKey) -> bool {
        if self.tables.remove(key) {
            false
        } else {
            self.tables.insert(key.clone());
            true
        }
    }

    pub fn select_only(&mut self, key: &TableKey) {
        self.tables.clear();
        self.tables.insert(key.clone());
    }

    pub fn selected_columns(&self) -> &[ColumnRef] {
        &self.columns
    }

    pub fn is_column_selected(&self, col: &ColumnRef) -> bool {
        self.columns.contains(col)
    }

    /// Apply a column click.
    ///
    /// Clicking a selected column deselects it. A column replaces any earlier
    /// pick from the same table, and the oldest pick is evicted beyond two.
    /// When two columns from different tables end up selected they are
    /// returned as `(from, to)` and the selection is cleared.
    pub fn select_column(&mut self, col: &ColumnRef) -> Option<(ColumnRef, ColumnRef)> {
        if self.deselect_column(col) {
            return None;
        }
        self.columns.retain(|c| !c.same_table(col));
        self.columns.push(col.clone());
        if self.columns.len() > MAX_SELECTED_COLUMNS {
            self.columns.remove(0);
        }

        match self.columns.as_slice() {
            [first, second] if !first.same_table(second) => {
                let pair = (first.clone(), second.clone());
                self.columns.clear();
                Some(pair)
            }
            _ => None,
        }
    }

    pub fn deselect_column(&mut self, col: &ColumnRef) -> bool {
        let before = self.columns.len();
        self.columns.retain(|c| c != col);
        self.columns.len() != before
    }

    pub fn clear(&mut self) {
        self.tables.clear();
        self.columns.clear();
    }

    /// Status text for the pending column selection.
    pub fn hint(&self) -> Option<String> {
        let picked: Vec<String> = self
            .columns
            .iter()
            .map(|c| format!("{}.{}", c.table, c.column))
            .collect();
        match picked.len() {
            0 => None,
            1 => Some(format!(
                "Selected: {} (Select another column to create a relation)",
                picked[0]
            )),
            _ => Some(format!("Selected: {}", picked.join(" → "))),
        }
    }

    pub fn remove_table(&mut self, key: &TableKey) {
        self.tables.remove(key);
        self.columns.retain(|c| !c.is_in(key));
    }

    pub fn remove_schema(&mut self, schema: &str) {
        self.tables.retain(|k| !k.in_schema(schema));
        self.columns.retain(|c| c.schema != schema);
    }

    pub fn remove_column(&mut self, col: &ColumnRef) {
        self.columns.retain(|c| c != col);
    }

    pub fn rekey_table(&mut self, old: &TableKey, new: &TableKey) {
        if self.tables.remove(old) {
            self.tables.insert(new.clone());
        }
        for c in self.columns.iter_mut().filter(|c| c.is_in(old)) {
            c.table = new.table.clone();
        }
    }

    pub fn rekey_column(&mut self, old: &ColumnRef, new: &ColumnRef) {
        for c in self.columns.iter_mut().filter(|c| *c == old) {
            *c = new.clone();
        }
    }
}
