//! Initial table placement.

use crate::ident::TableKey;
use crate::model::SchemaGraph;
use crate::position::Point;
use rand::Rng;
use std::f64::consts::PI;

/// Parameters of the jittered circular layout.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementConfig {
    pub origin_x: f64,
    pub origin_y: f64,
    /// Horizontal distance between neighbouring schema centers
    pub schema_offset_x: f64,
    pub base_radius: f64,
    pub radius_jitter: f64,
    /// Upper bound of the random angle added to each table, in radians
    pub angle_jitter: f64,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            origin_x: 300.0,
            origin_y: 300.0,
            schema_offset_x: 600.0,
            base_radius: 200.0,
            radius_jitter: 50.0,
            angle_jitter: 0.5,
        }
    }
}

/// Compute a position for every table for which `placed` is false.
///
/// Tables of the schema at index `s` sit on a circle around
/// `(origin_x + s * schema_offset_x, origin_y)`. Each table's slot on the
/// circle comes from its index among all tables of the schema, so tables that
/// already have a position still reserve their slot.
pub fn circular_positions<R: Rng>(
    graph: &SchemaGraph,
    placed: impl Fn(&TableKey) -> bool,
    config: &PlacementConfig,
    rng: &mut R,
) -> Vec<(TableKey, Point)> {
    let mut out = Vec::new();

    for (schema_idx, (schema_name, schema)) in graph.schemas().enumerate() {
        let count = schema.len();
        let center_x = config.origin_x + schema_idx as f64 * config.schema_offset_x;

        for (idx, (table_name, _)) in schema.tables().enumerate() {
            let key = TableKey::new(schema_name, table_name);
            if placed(&key) {
                continue;
            }
            let radius = config.base_radius + rng.random::<f64>() * config.radius_jitter;
            let angle =
                2.0 * PI * idx as f64 / count as f64 + rng.random::<f64>() * config.angle_jitter;

            out.push((
                key,
                Point::new(
                    center_x + radius * angle.cos(),
                    config.origin_y + radius * angle.sin(),
                ),
            ));
        }
    }

    out
}
