//! Schema graph: schemas → tables → columns, plus column-to-column relations.
//!
//! Relations are owned by the table on their `from` side. A reverse index
//! (target table → source tables) is kept in step with every mutation so that
//! rename and delete cascades only visit tables that actually reference the
//! affected entity.

use crate::error::{EditError, EditResult};
use crate::ident::{ColumnRef, EntityKind, TableKey};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

const TABLE_PREFIX: &str = "table";
const SCHEMA_PREFIX: &str = "schema";
const COLUMN_BASE: &str = "New Column";

/// A directed edge between two columns.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Relation {
    pub from: ColumnRef,
    pub to: ColumnRef,
}

impl Relation {
    pub fn new(from: ColumnRef, to: ColumnRef) -> Self {
        Self { from, to }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    relations: Vec<Relation>,
    visible: bool,
    columns_collapsed: bool,
}

impl Default for Table {
    fn default() -> Self {
        Self {
            columns: Vec::new(),
            relations: Vec::new(),
            visible: true,
            columns_collapsed: false,
        }
    }
}

impl Table {
    /// Column names in display order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Outgoing relations.
    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn columns_collapsed(&self) -> bool {
        self.columns_collapsed
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    tables: BTreeMap<String, Table>,
}

impl Schema {
    pub fn tables(&self) -> impl Iterator<Item = (&str, &Table)> {
        self.tables.iter().map(|(name, t)| (name.as_str(), t))
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// Counts shown in the status line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphStats {
    pub schemas: usize,
    pub tables: usize,
    pub columns: usize,
    pub relations: usize,
}

/// Target table → (source table → number of edges).
#[derive(Debug, Clone, Default, PartialEq)]
struct RelationIndex {
    incoming: BTreeMap<TableKey, BTreeMap<TableKey, usize>>,
}

impl RelationIndex {
    fn link(&mut self, rel: &Relation) {
        *self
            .incoming
            .entry(rel.to.table_key())
            .or_default()
            .entry(rel.from.table_key())
            .or_insert(0) += 1;
    }

    fn unlink(&mut self, rel: &Relation) {
        let target = rel.to.table_key();
        if let Some(sources) = self.incoming.get_mut(&target) {
            let source = rel.from.table_key();
            if let Some(count) = sources.get_mut(&source) {
                *count -= 1;
                if *count == 0 {
                    sources.remove(&source);
                }
            }
            if sources.is_empty() {
                self.incoming.remove(&target);
            }
        }
    }

    fn sources(&self, target: &TableKey) -> impl Iterator<Item = &TableKey> {
        self.incoming.get(target).into_iter().flat_map(|s| s.keys())
    }

    /// Targets (existing or dangling) that live in `schema`.
    fn targets_in_schema<'a>(&'a self, schema: &'a str) -> impl Iterator<Item = &'a TableKey> {
        self.incoming.keys().filter(move |k| k.schema == schema)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaGraph {
    schemas: BTreeMap<String, Schema>,
    index: RelationIndex,
}

impl SchemaGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    pub fn schemas(&self) -> impl Iterator<Item = (&str, &Schema)> {
        self.schemas.iter().map(|(name, s)| (name.as_str(), s))
    }

    pub fn schema(&self, name: &str) -> Option<&Schema> {
        self.schemas.get(name)
    }

    pub fn table(&self, key: &TableKey) -> Option<&Table> {
        self.schemas.get(&key.schema)?.tables.get(&key.table)
    }

    pub fn contains_table(&self, key: &TableKey) -> bool {
        self.table(key).is_some()
    }

    pub fn contains_column(&self, col: &ColumnRef) -> bool {
        self.table(&col.table_key())
            .is_some_and(|t| t.has_column(&col.column))
    }

    pub fn table_keys(&self) -> Vec<TableKey> {
        self.schemas
            .iter()
            .flat_map(|(s, schema)| schema.tables.keys().map(move |t| TableKey::new(s, t)))
            .collect()
    }

    pub fn tables(&self) -> impl Iterator<Item = (TableKey, &Table)> {
        self.schemas.iter().flat_map(|(s, schema)| {
            schema
                .tables
                .iter()
                .map(move |(t, table)| (TableKey::new(s, t), table))
        })
    }

    pub fn relations(&self) -> impl Iterator<Item = &Relation> {
        self.schemas
            .values()
            .flat_map(|s| s.tables.values())
            .flat_map(|t| t.relations.iter())
    }

    pub fn stats(&self) -> GraphStats {
        let mut stats = GraphStats {
            schemas: self.schemas.len(),
            ..GraphStats::default()
        };
        for schema in self.schemas.values() {
            stats.tables += schema.tables.len();
            for table in schema.tables.values() {
                stats.columns += table.columns.len();
                stats.relations += table.relations.len();
            }
        }
        stats
    }

    fn table_mut(&mut self, key: &TableKey) -> Option<&mut Table> {
        self.schemas
            .get_mut(&key.schema)?
            .tables
            .get_mut(&key.table)
    }

    fn require_table(&self, key: &TableKey) -> EditResult<&Table> {
        self.table(key)
            .ok_or_else(|| EditError::not_found(EntityKind::Table, key))
    }

    /// Create schema, table and column as needed. Returns true if the column
    /// was newly appended.
    pub fn ensure_column(&mut self, col: &ColumnRef) -> bool {
        let table = self
            .schemas
            .entry(col.schema.clone())
            .or_default()
            .tables
            .entry(col.table.clone())
            .or_default();
        if table.has_column(&col.column) {
            false
        } else {
            table.columns.push(col.column.clone());
            true
        }
    }

    pub fn set_table_visible(&mut self, key: &TableKey, visible: bool) -> EditResult<()> {
        let table = self
            .table_mut(key)
            .ok_or_else(|| EditError::not_found(EntityKind::Table, key))?;
        table.visible = visible;
        Ok(())
    }

    pub fn toggle_columns_collapsed(&mut self, key: &TableKey) -> EditResult<bool> {
        let table = self
            .table_mut(key)
            .ok_or_else(|| EditError::not_found(EntityKind::Table, key))?;
        table.columns_collapsed = !table.columns_collapsed;
        Ok(table.columns_collapsed)
    }

    /// Create an empty schema. `None` picks the first unused `schemaN`.
    pub fn add_schema(&mut self, name: Option<&str>) -> EditResult<String> {
        let name = match name {
            Some("") => return Err(EditError::EmptyName(EntityKind::Schema)),
            Some(n) if self.schemas.contains_key(n) => {
                return Err(EditError::conflict(EntityKind::Schema, n));
            }
            Some(n) => n.to_string(),
            None => numbered_name(SCHEMA_PREFIX, |n| self.schemas.contains_key(n)),
        };
        self.schemas.insert(name.clone(), Schema::default());
        Ok(name)
    }

    /// Create a table named with the first unused `tableN`.
    pub fn add_table(&mut self, schema: &str) -> EditResult<TableKey> {
        let tables = &mut self
            .schemas
            .get_mut(schema)
            .ok_or_else(|| EditError::not_found(EntityKind::Schema, schema))?
            .tables;
        let name = numbered_name(TABLE_PREFIX, |n| tables.contains_key(n));
        tables.insert(name.clone(), Table::default());
        Ok(TableKey::new(schema, name))
    }

    /// Append a column named `New Column`, `New Column 2`, ... (first unused).
    pub fn add_column(&mut self, key: &TableKey) -> EditResult<String> {
        let table = self
            .table_mut(key)
            .ok_or_else(|| EditError::not_found(EntityKind::Table, key))?;
        let name = if table.has_column(COLUMN_BASE) {
            (2..)
                .map(|i| format!("{COLUMN_BASE} {i}"))
                .find(|n| !table.has_column(n))
                .unwrap_or_default()
        } else {
            COLUMN_BASE.to_string()
        };
        table.columns.push(name.clone());
        Ok(name)
    }

    /// Insert `from → to` unless the identical edge already exists.
    /// Returns whether an edge was inserted.
    pub fn add_relation(&mut self, from: &ColumnRef, to: &ColumnRef) -> EditResult<bool> {
        let key = from.table_key();
        let table = self
            .table_mut(&key)
            .ok_or_else(|| EditError::not_found(EntityKind::Table, &key))?;
        if !table.has_column(&from.column) {
            return Err(EditError::not_found(EntityKind::Column, from));
        }
        let rel = Relation::new(from.clone(), to.clone());
        if table.relations.contains(&rel) {
            return Ok(false);
        }
        table.relations.push(rel.clone());
        self.index.link(&rel);
        debug!("added relation {from} -> {to}");
        Ok(true)
    }

    pub fn remove_relation(&mut self, from: &ColumnRef, to: &ColumnRef) -> EditResult<()> {
        let not_found = || EditError::not_found(EntityKind::Relation, format!("{from} -> {to}"));
        let table = self.table_mut(&from.table_key()).ok_or_else(not_found)?;
        let pos = table
            .relations
            .iter()
            .position(|r| r.from == *from && r.to == *to)
            .ok_or_else(not_found)?;
        let rel = table.relations.remove(pos);
        self.index.unlink(&rel);
        debug!("removed relation {from} -> {to}");
        Ok(())
    }

    /// Existing tables this table's relations point at.
    pub fn relations_to(&self, key: &TableKey) -> Vec<TableKey> {
        let Some(table) = self.table(key) else {
            return Vec::new();
        };
        let targets: BTreeSet<TableKey> = table
            .relations
            .iter()
            .map(|r| r.to.table_key())
            .filter(|k| self.contains_table(k))
            .collect();
        targets.into_iter().collect()
    }

    /// Existing tables whose relations point at this table.
    pub fn relations_from(&self, key: &TableKey) -> Vec<TableKey> {
        self.index
            .sources(key)
            .filter(|k| self.contains_table(k))
            .cloned()
            .collect()
    }

    /// Columns of `key` that take part in a relation as source or target,
    /// self-references included.
    pub fn related_columns(&self, key: &TableKey) -> BTreeSet<String> {
        let mut related = BTreeSet::new();
        if let Some(table) = self.table(key) {
            for r in &table.relations {
                related.insert(r.from.column.clone());
                if r.to.is_in(key) {
                    related.insert(r.to.column.clone());
                }
            }
        }
        for source in self.index.sources(key).filter(|s| *s != key) {
            if let Some(table) = self.table(source) {
                related.extend(
                    table
                        .relations
                        .iter()
                        .filter(|r| r.to.is_in(key))
                        .map(|r| r.to.column.clone()),
                );
            }
        }
        related
    }

    pub fn rename_schema(&mut self, old: &str, new: &str) -> EditResult<()> {
        if new.is_empty() {
            return Err(EditError::EmptyName(EntityKind::Schema));
        }
        if !self.schemas.contains_key(old) {
            return Err(EditError::not_found(EntityKind::Schema, old));
        }
        if old == new {
            return Ok(());
        }
        if self.schemas.contains_key(new) {
            return Err(EditError::conflict(EntityKind::Schema, new));
        }

        let mut owners: BTreeSet<TableKey> = self
            .index
            .targets_in_schema(old)
            .flat_map(|t| self.index.sources(t))
            .map(|k| rename_schema_of(k, old, new))
            .collect();

        if let Some(schema) = self.schemas.remove(old) {
            owners.extend(schema.tables.keys().map(|t| TableKey::new(new, t)));
            self.schemas.insert(new.to_string(), schema);
        }

        self.rewrite_relations(&owners, |rel| {
            let mut changed = false;
            for end in [&mut rel.from, &mut rel.to] {
                if end.schema == old {
                    end.schema = new.to_string();
                    changed = true;
                }
            }
            changed
        });
        debug!("renamed schema {old} -> {new}");
        Ok(())
    }

    pub fn rename_table(&mut self, key: &TableKey, new: &str) -> EditResult<TableKey> {
        if new.is_empty() {
            return Err(EditError::EmptyName(EntityKind::Table));
        }
        self.require_table(key)?;
        let new_key = TableKey::new(key.schema.clone(), new);
        if key.table == new {
            return Ok(new_key);
        }
        if self.contains_table(&new_key) {
            return Err(EditError::conflict(EntityKind::Table, &new_key));
        }

        let mut owners: BTreeSet<TableKey> = self
            .index
            .sources(key)
            .map(|k| if k == key { new_key.clone() } else { k.clone() })
            .collect();
        owners.insert(new_key.clone());

        let tables = &mut self
            .schemas
            .get_mut(&key.schema)
            .ok_or_else(|| EditError::not_found(EntityKind::Schema, &key.schema))?
            .tables;
        if let Some(table) = tables.remove(&key.table) {
            tables.insert(new.to_string(), table);
        }

        self.rewrite_relations(&owners, |rel| {
            let mut changed = false;
            for end in [&mut rel.from, &mut rel.to] {
                if end.is_in(key) {
                    end.table = new.to_string();
                    changed = true;
                }
            }
            changed
        });
        debug!("renamed table {key} -> {new_key}");
        Ok(new_key)
    }

    pub fn rename_column(&mut self, col: &ColumnRef, new: &str) -> EditResult<ColumnRef> {
        if new.is_empty() {
            return Err(EditError::EmptyName(EntityKind::Column));
        }
        let key = col.table_key();
        let table = self
            .table_mut(&key)
            .ok_or_else(|| EditError::not_found(EntityKind::Table, &key))?;
        let idx = table
            .column_index(&col.column)
            .ok_or_else(|| EditError::not_found(EntityKind::Column, col))?;
        let new_col = key.column(new);
        if col.column == new {
            return Ok(new_col);
        }
        if table.has_column(new) {
            return Err(EditError::conflict(EntityKind::Column, &new_col));
        }
        table.columns[idx] = new.to_string();

        let mut owners: BTreeSet<TableKey> = self.index.sources(&key).cloned().collect();
        owners.insert(key.clone());

        self.rewrite_relations(&owners, |rel| {
            let mut changed = false;
            for end in [&mut rel.from, &mut rel.to] {
                if end == col {
                    end.column = new.to_string();
                    changed = true;
                }
            }
            changed
        });
        debug!("renamed column {col} -> {new_col}");
        Ok(new_col)
    }

    pub fn delete_schema(&mut self, name: &str) -> EditResult<Vec<TableKey>> {
        let schema = self
            .schemas
            .remove(name)
            .ok_or_else(|| EditError::not_found(EntityKind::Schema, name))?;

        for rel in schema.tables.values().flat_map(|t| t.relations.iter()) {
            self.index.unlink(rel);
        }

        let owners: BTreeSet<TableKey> = self
            .index
            .targets_in_schema(name)
            .flat_map(|t| self.index.sources(t))
            .cloned()
            .collect();
        self.prune_relations(&owners, |rel| rel.to.schema == name);

        let removed: Vec<TableKey> = schema
            .tables
            .keys()
            .map(|t| TableKey::new(name, t))
            .collect();
        debug!("deleted schema {name} ({} tables)", removed.len());
        Ok(removed)
    }

    pub fn delete_table(&mut self, key: &TableKey) -> EditResult<()> {
        let table = self
            .schemas
            .get_mut(&key.schema)
            .and_then(|s| s.tables.remove(&key.table))
            .ok_or_else(|| EditError::not_found(EntityKind::Table, key))?;

        for rel in &table.relations {
            self.index.unlink(rel);
        }

        let owners: BTreeSet<TableKey> = self.index.sources(key).cloned().collect();
        self.prune_relations(&owners, |rel| rel.to.is_in(key));
        debug!("deleted table {key}");
        Ok(())
    }

    pub fn delete_column(&mut self, col: &ColumnRef) -> EditResult<()> {
        let key = col.table_key();
        let table = self
            .table_mut(&key)
            .ok_or_else(|| EditError::not_found(EntityKind::Table, &key))?;
        let idx = table
            .column_index(&col.column)
            .ok_or_else(|| EditError::not_found(EntityKind::Column, col))?;
        table.columns.remove(idx);

        let mut owners: BTreeSet<TableKey> = self.index.sources(&key).cloned().collect();
        owners.insert(key);
        self.prune_relations(&owners, |rel| rel.from == *col || rel.to == *col);
        debug!("deleted column {col}");
        Ok(())
    }

    /// Apply `rewrite` to every relation owned by `owners`, keeping the
    /// reverse index in step. Edges that become identical are collapsed.
    fn rewrite_relations<F>(&mut self, owners: &BTreeSet<TableKey>, mut rewrite: F)
    where
        F: FnMut(&mut Relation) -> bool,
    {
        let Self { schemas, index } = self;
        for owner in owners {
            let Some(table) = schemas
                .get_mut(&owner.schema)
                .and_then(|s| s.tables.get_mut(&owner.table))
            else {
                continue;
            };
            for rel in table.relations.iter_mut() {
                let before = rel.clone();
                if rewrite(rel) {
                    index.unlink(&before);
                    index.link(rel);
                }
            }
            let mut seen = BTreeSet::new();
            table.relations.retain(|rel| {
                if seen.insert(rel.clone()) {
                    true
                } else {
                    index.unlink(rel);
                    false
                }
            });
        }
    }

    /// Drop relations owned by `owners` that match `doomed`.
    fn prune_relations<F>(&mut self, owners: &BTreeSet<TableKey>, doomed: F) -> usize
    where
        F: Fn(&Relation) -> bool,
    {
        let Self { schemas, index } = self;
        let mut pruned = 0;
        for owner in owners {
            let Some(table) = schemas
                .get_mut(&owner.schema)
                .and_then(|s| s.tables.get_mut(&owner.table))
            else {
                continue;
            };
            table.relations.retain(|rel| {
                if doomed(rel) {
                    index.unlink(rel);
                    pruned += 1;
                    false
                } else {
                    true
                }
            });
        }
        if pruned > 0 {
            debug!("pruned {pruned} dangling relations");
        }
        pruned
    }
}

fn rename_schema_of(key: &TableKey, old: &str, new: &str) -> TableKey {
    if key.schema == old {
        TableKey::new(new, key.table.clone())
    } else {
        key.clone()
    }
}

/// First of `prefix1`, `prefix2`, ... for which `taken` is false.
fn numbered_name(prefix: &str, taken: impl Fn(&str) -> bool) -> String {
    (1..)
        .map(|i| format!("{prefix}{i}"))
        .find(|n| !taken(n))
        .unwrap_or_else(|| prefix.to_string())
}
