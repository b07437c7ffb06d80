//! Pointer drag of one table, a group of selected tables, or a whole schema.

use crate::ident::TableKey;
use crate::position::{Point, PositionStore};

/// What the pointer went down on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragTarget {
    Table(TableKey),
    Schema(String),
}

/// An active drag. Positions are always recomputed as snapshot plus the
/// cumulative pointer delta, so intermediate moves never accumulate error.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    target: DragTarget,
    origin: Point,
    snapshot: Vec<(TableKey, Point)>,
    delta: Point,
}

impl DragSession {
    pub fn begin(target: DragTarget, origin: Point, snapshot: Vec<(TableKey, Point)>) -> Self {
        Self {
            target,
            origin,
            snapshot,
            delta: Point::default(),
        }
    }

    pub fn target(&self) -> &DragTarget {
        &self.target
    }

    pub fn delta(&self) -> Point {
        self.delta
    }

    /// Tables moved by this drag.
    pub fn keys(&self) -> impl Iterator<Item = &TableKey> {
        self.snapshot.iter().map(|(k, _)| k)
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.is_empty()
    }

    /// Move every dragged table to its start point offset by the distance
    /// from the drag origin to `pointer`.
    pub fn update(&mut self, pointer: Point, positions: &mut PositionStore) -> Point {
        self.delta = self.origin.delta_to(pointer);
        positions.translate_group(&self.snapshot, self.delta);
        self.delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;

    #[test]
    fn test_update_is_relative_to_origin() {
        let key = TableKey::new("S", "t");
        let mut store = PositionStore::new(3);
        store.insert(key.clone(), Position { x: 50.0, y: 50.0, z: 3 });

        let snapshot = store.snapshot([&key]);
        let mut drag = DragSession::begin(
            DragTarget::Table(key.clone()),
            Point::new(100.0, 100.0),
            snapshot,
        );

        drag.update(Point::new(110.0, 90.0), &mut store);
        drag.update(Point::new(130.0, 120.0), &mut store);

        assert_eq!(drag.delta(), Point::new(30.0, 20.0));
        assert_eq!(store.get(&key).unwrap().point(), Point::new(80.0, 70.0));
        assert_eq!(drag.keys().collect::<Vec<_>>(), [&key]);
    }
}
