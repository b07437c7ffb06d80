//! Relation line anchors.

use crate::measure::TextMetrics;
use crate::model::SchemaGraph;
use crate::position::Point;
use std::collections::HashMap;

use super::types::{EdgePlan, TablePlan};

/// Build an edge for every relation whose two tables are in `tables` and
/// whose two columns are displayed there.
///
/// Lines leave the source box on its right edge and enter the target box on
/// its left edge, each at the center of the column's row. Relations with a
/// dangling or hidden endpoint are skipped.
pub fn edge_plans(
    graph: &SchemaGraph,
    tables: &[TablePlan],
    metrics: &TextMetrics,
) -> Vec<EdgePlan> {
    let by_key: HashMap<_, _> = tables.iter().map(|t| (&t.key, t)).collect();

    graph
        .relations()
        .filter_map(|relation| {
            let from_table = by_key.get(&relation.from.table_key())?;
            let to_table = by_key.get(&relation.to.table_key())?;
            let from_row = from_table.row_of(&relation.from.column)?;
            let to_row = to_table.row_of(&relation.to.column)?;

            let from = Point::new(
                from_table.rect.right(),
                from_table.rect.y + metrics.row_center(from_row),
            );
            let to = Point::new(to_table.rect.x, to_table.rect.y + metrics.row_center(to_row));
            let midpoint = Point::new((from.x + to.x) / 2.0, (from.y + to.y) / 2.0);

            Some(EdgePlan {
                relation: relation.clone(),
                from,
                to,
                midpoint,
            })
        })
        .collect()
}
