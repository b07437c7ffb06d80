//! Import: fold records into a schema graph, stored positions and per-table
//! visibility.

use crate::ident::{ColumnRef, TableKey};
use crate::model::SchemaGraph;
use crate::position::{Position, PositionStore};
use crate::record::{Record, parse_records};
use std::collections::BTreeMap;
use tracing::debug;

/// Result of an import.
#[derive(Debug, Clone)]
pub struct Document {
    pub graph: SchemaGraph,
    /// Only tables whose rows carried coordinates
    pub positions: PositionStore,
    /// Every imported table
    pub visibility: BTreeMap<TableKey, bool>,
    /// Relation rows whose target schema could not be resolved
    pub skipped_relations: usize,
}

pub struct Parser {
    records: Vec<Record>,
    visible_by_default: bool,
    min_z: i64,
}

impl Parser {
    pub fn new(input: &str) -> Self {
        Self {
            records: parse_records(input),
            visible_by_default: true,
            min_z: 3,
        }
    }

    pub fn with_defaults(mut self, visible_by_default: bool, min_z: i64) -> Self {
        self.visible_by_default = visible_by_default;
        self.min_z = min_z;
        self
    }

    pub fn parse(&self) -> Document {
        let mut graph = SchemaGraph::new();
        let mut positions = PositionStore::new(self.min_z);
        let mut seen_visibility: BTreeMap<TableKey, Option<bool>> = BTreeMap::new();

        for record in &self.records {
            graph.ensure_column(&record.column_ref());
            let key = record.table_key();

            let seen = seen_visibility.entry(key.clone()).or_default();
            if let Some(v) = record.visible {
                *seen = Some(seen.unwrap_or(false) || v);
            }

            if record.has_position() && !positions.contains(&key) {
                let pos = Position {
                    x: record.pos_x.unwrap_or(0.0),
                    y: record.pos_y.unwrap_or(0.0),
                    z: record.pos_z.unwrap_or(self.min_z),
                };
                positions.insert(key, pos);
            }
        }

        let mut visibility = BTreeMap::new();
        for (key, seen) in seen_visibility {
            let visible = seen.unwrap_or(self.visible_by_default);
            if graph.set_table_visible(&key, visible).is_ok() {
                visibility.insert(key, visible);
            }
        }

        let skipped_relations = self
            .records
            .iter()
            .filter(|r| !self.fold_relation(&mut graph, r))
            .count();

        Document {
            graph,
            positions,
            visibility,
            skipped_relations,
        }
    }

    /// Attach the relation carried by `record`, if any. Returns false when
    /// the row names a relation that cannot be attached.
    fn fold_relation(&self, graph: &mut SchemaGraph, record: &Record) -> bool {
        let Some((schema, table, column)) = record.relation_target() else {
            return true;
        };

        let schema = match schema {
            Some(s) => Some(s.to_string()),
            None => resolve_schema(graph, table),
        };
        let Some(schema) = schema else {
            debug!(
                "skipping relation from {}: no schema contains table {table}",
                record.column_ref()
            );
            return false;
        };

        let to = ColumnRef::new(schema, table, column);
        match graph.add_relation(&record.column_ref(), &to) {
            Ok(_) => true,
            Err(e) => {
                debug!("skipping relation to {to}: {e}");
                false
            }
        }
    }
}

/// First schema, in schema order, that holds a table called `table`.
fn resolve_schema(graph: &SchemaGraph, table: &str) -> Option<String> {
    graph
        .schemas()
        .find(|(_, s)| s.table(table).is_some())
        .map(|(name, _)| name.to_string())
}
