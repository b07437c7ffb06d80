//! Schema areas and canvas extent.

use super::types::{SchemaPlan, TablePlan};

/// One area per schema that has at least one visible table, in schema order.
pub fn schema_areas(tables: &[TablePlan], margin_x: f64, margin_y: f64) -> Vec<SchemaPlan> {
    let mut areas: Vec<SchemaPlan> = Vec::new();

    for table in tables {
        match areas.iter_mut().find(|a| a.name == table.key.schema) {
            Some(area) => area.rect = area.rect.union(&table.rect),
            None => areas.push(SchemaPlan {
                name: table.key.schema.clone(),
                rect: table.rect,
            }),
        }
    }

    for area in &mut areas {
        area.rect = area.rect.expand(margin_x, margin_y);
    }
    areas.sort_by(|a, b| a.name.cmp(&b.name));
    areas
}

/// Canvas size: at least the viewport, and large enough to show every
/// visible table plus `padding`.
pub fn canvas_extent(tables: &[TablePlan], viewport: (f64, f64), padding: f64) -> (f64, f64) {
    tables.iter().fold(viewport, |(w, h), t| {
        (w.max(t.rect.right() + padding), h.max(t.rect.bottom() + padding))
    })
}
