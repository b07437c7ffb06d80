//! Per-table canvas coordinates and stacking order.

use crate::ident::TableKey;
use crate::layout::placement::{PlacementConfig, circular_positions};
use crate::model::SchemaGraph;
use rand::Rng;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(self, delta: Point) -> Self {
        Self::new(self.x + delta.x, self.y + delta.y)
    }

    pub fn delta_to(self, other: Point) -> Self {
        Self::new(other.x - self.x, other.y - self.y)
    }
}

/// Top-left corner of a table box plus its stacking order (higher is on top).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: i64,
}

impl Position {
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Positions keyed by table, with a z ceiling that only grows until the
/// range is exhausted and the live z values get renumbered.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionStore {
    positions: HashMap<TableKey, Position>,
    ceiling: i64,
    min_z: i64,
}

impl PositionStore {
    pub fn new(min_z: i64) -> Self {
        Self {
            positions: HashMap::new(),
            ceiling: min_z,
            min_z,
        }
    }

    pub fn min_z(&self) -> i64 {
        self.min_z
    }

    pub fn get(&self, key: &TableKey) -> Option<&Position> {
        self.positions.get(key)
    }

    pub fn contains(&self, key: &TableKey) -> bool {
        self.positions.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &TableKey> {
        self.positions.keys()
    }

    /// Store a position as-is; the ceiling is raised above its z.
    pub fn insert(&mut self, key: TableKey, pos: Position) {
        self.ceiling = self.ceiling.max(pos.z.saturating_add(1));
        self.positions.insert(key, pos);
    }

    /// Store `point` under a fresh top z.
    pub fn place(&mut self, key: TableKey, point: Point) -> i64 {
        let z = self.next_z();
        self.positions.insert(
            key,
            Position {
                x: point.x,
                y: point.y,
                z,
            },
        );
        z
    }

    fn max_z(&self) -> Option<i64> {
        self.positions.values().map(|p| p.z).max()
    }

    /// Hand out a z strictly above every live z and every z handed out before.
    /// Once the range is exhausted the live z values are renumbered first.
    pub fn next_z(&mut self) -> i64 {
        if self.ceiling == i64::MAX || self.max_z().is_some_and(|z| z >= i64::MAX - 1) {
            self.compact();
        }
        let above_live = self.max_z().map_or(self.min_z, |z| z + 1);
        let z = self.ceiling.max(above_live);
        self.ceiling = z + 1;
        z
    }

    /// Renumber live z values to `min_z..` keeping their stacking order.
    fn compact(&mut self) {
        let mut order: Vec<(i64, TableKey)> = self
            .positions
            .iter()
            .map(|(k, p)| (p.z, k.clone()))
            .collect();
        order.sort();
        let mut next = self.min_z;
        for (_, key) in order {
            if let Some(pos) = self.positions.get_mut(&key) {
                pos.z = next;
            }
            next += 1;
        }
        debug!("z range exhausted, renumbered {} tables", self.positions.len());
        self.ceiling = next;
    }

    /// Raise `key` above every other table. Returns its z afterwards.
    pub fn bring_to_top(&mut self, key: &TableKey) -> Option<i64> {
        let current = self.positions.get(key)?.z;
        let others_max = self
            .positions
            .iter()
            .filter(|(k, _)| *k != key)
            .map(|(_, p)| p.z)
            .max();
        if others_max.is_none_or(|m| current > m) {
            return Some(current);
        }
        let z = self.next_z();
        if let Some(pos) = self.positions.get_mut(key) {
            pos.z = z;
        }
        Some(z)
    }

    /// Move without any bounds checking. Returns false for unknown keys.
    pub fn move_to(&mut self, key: &TableKey, point: Point) -> bool {
        match self.positions.get_mut(key) {
            Some(pos) => {
                pos.x = point.x;
                pos.y = point.y;
                true
            }
            None => false,
        }
    }

    /// Copy of the current top-left corners of `keys`, for a drag start.
    pub fn snapshot<'a>(
        &self,
        keys: impl IntoIterator<Item = &'a TableKey>,
    ) -> Vec<(TableKey, Point)> {
        keys.into_iter()
            .filter_map(|k| self.positions.get(k).map(|p| (k.clone(), p.point())))
            .collect()
    }

    /// Set every snapshotted table to its start point plus `delta`.
    pub fn translate_group(&mut self, snapshot: &[(TableKey, Point)], delta: Point) {
        for (key, start) in snapshot {
            self.move_to(key, start.offset(delta));
        }
    }

    /// Give every table without a stored position one on a jittered circle
    /// around its schema's center. Returns how many tables were placed.
    pub fn initialize_layout<R: Rng>(
        &mut self,
        graph: &SchemaGraph,
        config: &PlacementConfig,
        rng: &mut R,
    ) -> usize {
        let placed = circular_positions(graph, |k| self.contains(k), config, rng);
        let count = placed.len();
        for (key, point) in placed {
            self.place(key, point);
        }
        count
    }

    pub fn remove(&mut self, key: &TableKey) -> Option<Position> {
        self.positions.remove(key)
    }

    pub fn remove_schema(&mut self, schema: &str) {
        self.positions.retain(|k, _| !k.in_schema(schema));
    }

    pub fn rekey_table(&mut self, old: &TableKey, new: &TableKey) {
        if let Some(pos) = self.positions.remove(old) {
            self.positions.insert(new.clone(), pos);
        }
    }

    pub fn rekey_schema(&mut self, old: &str, new: &str) {
        let moved: Vec<TableKey> = self
            .positions
            .keys()
            .filter(|k| k.in_schema(old))
            .cloned()
            .collect();
        for key in moved {
            if let Some(pos) = self.positions.remove(&key) {
                self.positions.insert(TableKey::new(new, key.table), pos);
            }
        }
    }
}
