//! Which tables are currently shown.

use crate::ident::TableKey;
use crate::model::SchemaGraph;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Which neighbours to reveal around a focal table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Tables the focal table's relations point at
    Successors,
    /// Tables whose relations point at the focal table
    Predecessors,
}

impl Direction {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "to" | "successors" | "out" => Some(Self::Successors),
            "from" | "predecessors" | "in" => Some(Self::Predecessors),
            _ => None,
        }
    }
}

/// Visibility per known table. Keys never registered fall back to
/// `default_visible`.
#[derive(Debug, Clone, PartialEq)]
pub struct TableFilter {
    states: BTreeMap<TableKey, bool>,
    default_visible: bool,
}

impl TableFilter {
    pub fn new(default_visible: bool) -> Self {
        Self {
            states: BTreeMap::new(),
            default_visible,
        }
    }

    pub fn register(&mut self, key: TableKey, visible: bool) {
        self.states.insert(key, visible);
    }

    pub fn is_known(&self, key: &TableKey) -> bool {
        self.states.contains_key(key)
    }

    pub fn is_visible(&self, key: &TableKey) -> bool {
        self.states
            .get(key)
            .copied()
            .unwrap_or(self.default_visible)
    }

    pub fn known_keys(&self) -> impl Iterator<Item = &TableKey> {
        self.states.keys()
    }

    pub fn visible_keys(&self) -> Vec<TableKey> {
        self.states
            .iter()
            .filter(|(_, v)| **v)
            .map(|(k, _)| k.clone())
            .collect()
    }

    /// True when at least one known table is hidden.
    pub fn is_filtered(&self) -> bool {
        self.states.values().any(|v| !v)
    }

    /// Show exactly `keys`; keys that are not known are dropped.
    /// Returns the number of visible tables afterwards.
    pub fn filter_to_set<I>(&mut self, keys: I) -> usize
    where
        I: IntoIterator<Item = TableKey>,
    {
        let wanted: BTreeSet<TableKey> = keys.into_iter().collect();
        for key in wanted.iter().filter(|k| !self.states.contains_key(*k)) {
            debug!("filter ignores unknown table {key}");
        }
        let mut shown = 0;
        for (key, visible) in self.states.iter_mut() {
            *visible = wanted.contains(key);
            shown += usize::from(*visible);
        }
        shown
    }

    /// Add the focal table and its neighbours in `direction` to the visible set.
    pub fn expand(&mut self, graph: &SchemaGraph, key: &TableKey, direction: Direction) -> usize {
        let related = match direction {
            Direction::Successors => graph.relations_to(key),
            Direction::Predecessors => graph.relations_from(key),
        };
        let mut keys = self.visible_keys();
        keys.push(key.clone());
        keys.extend(related);
        self.filter_to_set(keys)
    }

    pub fn show_all(&mut self) {
        for visible in self.states.values_mut() {
            *visible = true;
        }
    }

    pub fn hide(&mut self, key: &TableKey) -> bool {
        match self.states.get_mut(key) {
            Some(visible) => {
                *visible = false;
                true
            }
            None => false,
        }
    }

    /// Known keys whose `schema.table` text contains `term`, ignoring case.
    pub fn matching(&self, term: &str) -> Vec<TableKey> {
        let term = term.to_lowercase();
        self.states
            .keys()
            .filter(|k| term.is_empty() || k.to_string().to_lowercase().contains(&term))
            .cloned()
            .collect()
    }

    pub fn remove(&mut self, key: &TableKey) {
        self.states.remove(key);
    }

    pub fn remove_schema(&mut self, schema: &str) {
        self.states.retain(|k, _| !k.in_schema(schema));
    }

    pub fn rekey_table(&mut self, old: &TableKey, new: &TableKey) {
        if let Some(v) = self.states.remove(old) {
            self.states.insert(new.clone(), v);
        }
    }

    pub fn rekey_schema(&mut self, old: &str, new: &str) {
        let moved: Vec<(TableKey, bool)> = self
            .states
            .iter()
            .filter(|(k, _)| k.in_schema(old))
            .map(|(k, v)| (k.clone(), *v))
            .collect();
        for (key, visible) in moved {
            self.states.remove(&key);
            self.states.insert(TableKey::new(new, key.table), visible);
        }
    }
}
