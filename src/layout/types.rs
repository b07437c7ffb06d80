//! Data structures produced by the projector.

use crate::ident::TableKey;
use crate::model::Relation;
use crate::position::Point;

/// An axis-aligned box in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Smallest box covering both.
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect::new(
            x,
            y,
            self.right().max(other.right()) - x,
            self.bottom().max(other.bottom()) - y,
        )
    }

    /// Grow by `dx` on the left and right, `dy` on the top and bottom.
    pub fn expand(&self, dx: f64, dy: f64) -> Rect {
        Rect::new(
            self.x - dx,
            self.y - dy,
            self.width + dx * 2.0,
            self.height + dy * 2.0,
        )
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnPlan {
    pub name: String,
    pub selected: bool,
}

/// A visible table box.
#[derive(Debug, Clone, PartialEq)]
pub struct TablePlan {
    pub key: TableKey,
    pub rect: Rect,
    pub z: i64,
    pub selected: bool,
    pub collapsed: bool,
    /// Displayed columns, top to bottom
    pub columns: Vec<ColumnPlan>,
}

impl TablePlan {
    /// Display row of `column`, if it is shown.
    pub fn row_of(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == column)
    }
}

/// Bounding area drawn behind the visible tables of one schema.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaPlan {
    pub name: String,
    pub rect: Rect,
}

/// A relation line with the anchor of its delete affordance.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgePlan {
    pub relation: Relation,
    pub from: Point,
    pub to: Point,
    pub midpoint: Point,
}

/// Everything a painter needs for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPlan {
    pub schemas: Vec<SchemaPlan>,
    /// Paint order: ascending z, ties by key
    pub tables: Vec<TablePlan>,
    pub edges: Vec<EdgePlan>,
    pub width: f64,
    pub height: f64,
}

impl RenderPlan {
    pub fn table(&self, key: &TableKey) -> Option<&TablePlan> {
        self.tables.iter().find(|t| &t.key == key)
    }

    pub fn schema(&self, name: &str) -> Option<&SchemaPlan> {
        self.schemas.iter().find(|s| s.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_and_expand() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(20.0, 5.0, 10.0, 20.0);
        let u = a.union(&b);
        assert_eq!(u, Rect::new(0.0, 0.0, 30.0, 25.0));

        let e = u.expand(50.0, 60.0);
        assert_eq!(e, Rect::new(-50.0, -60.0, 130.0, 145.0));
        assert!(e.contains(Point::new(0.0, 0.0)));
        assert!(!e.contains(Point::new(200.0, 0.0)));
    }
}
