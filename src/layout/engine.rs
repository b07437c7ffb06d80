//! Layout engine core implementation.

use crate::filter::TableFilter;
use crate::ident::TableKey;
use crate::measure::TextMetrics;
use crate::model::{SchemaGraph, Table};
use crate::position::{Point, PositionStore};
use crate::selection::Selection;

use super::anchors::edge_plans;
use super::bounds::{canvas_extent, schema_areas};
use super::types::{ColumnPlan, EdgePlan, Rect, RenderPlan, TablePlan};

/// Projector configuration and computation.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutEngine {
    pub(crate) metrics: TextMetrics,
    pub(crate) schema_margin_x: f64,
    pub(crate) schema_margin_y: f64,
    pub(crate) canvas_padding: f64,
    pub(crate) viewport_width: f64,
    pub(crate) viewport_height: f64,
    /// Used for tables that have no stored position
    pub(crate) default_position: Point,
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self {
            metrics: TextMetrics::default(),
            schema_margin_x: 50.0,
            schema_margin_y: 60.0,
            canvas_padding: 150.0,
            viewport_width: 1200.0,
            viewport_height: 800.0,
            default_position: Point::new(10.0, 10.0),
        }
    }
}

impl LayoutEngine {
    pub fn with_viewport(mut self, width: f64, height: f64) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    pub fn metrics(&self) -> &TextMetrics {
        &self.metrics
    }

    /// Compute the full render plan.
    pub fn project(
        &self,
        graph: &SchemaGraph,
        positions: &PositionStore,
        filter: &TableFilter,
        selection: &Selection,
    ) -> RenderPlan {
        let tables = self.project_tables(graph, positions, filter, selection);
        let edges = edge_plans(graph, &tables, &self.metrics);
        let schemas = schema_areas(&tables, self.schema_margin_x, self.schema_margin_y);
        let (width, height) = canvas_extent(
            &tables,
            (self.viewport_width, self.viewport_height),
            self.canvas_padding,
        );

        RenderPlan {
            schemas,
            tables,
            edges,
            width,
            height,
        }
    }

    /// Only the relation lines, for redraws while dragging.
    pub fn project_edges(
        &self,
        graph: &SchemaGraph,
        positions: &PositionStore,
        filter: &TableFilter,
        selection: &Selection,
    ) -> Vec<EdgePlan> {
        let tables = self.project_tables(graph, positions, filter, selection);
        edge_plans(graph, &tables, &self.metrics)
    }

    fn project_tables(
        &self,
        graph: &SchemaGraph,
        positions: &PositionStore,
        filter: &TableFilter,
        selection: &Selection,
    ) -> Vec<TablePlan> {
        let mut tables: Vec<TablePlan> = graph
            .tables()
            .filter(|(key, _)| filter.is_visible(key))
            .map(|(key, table)| self.table_plan(graph, positions, selection, key, table))
            .collect();

        tables.sort_by(|a, b| a.z.cmp(&b.z).then_with(|| a.key.cmp(&b.key)));
        tables
    }

    fn table_plan(
        &self,
        graph: &SchemaGraph,
        positions: &PositionStore,
        selection: &Selection,
        key: TableKey,
        table: &Table,
    ) -> TablePlan {
        let collapsed = table.columns_collapsed();
        let names: Vec<&String> = if collapsed {
            let related = graph.related_columns(&key);
            table
                .columns()
                .iter()
                .filter(|c| related.contains(c.as_str()))
                .collect()
        } else {
            table.columns().iter().collect()
        };

        let (width, height) = self.metrics.table_size(&key.table, &names);
        let (origin, z) = match positions.get(&key) {
            Some(pos) => (pos.point(), pos.z),
            None => (self.default_position, positions.min_z()),
        };

        let columns = names
            .into_iter()
            .map(|name| ColumnPlan {
                selected: selection.is_column_selected(&key.column(name.as_str())),
                name: name.clone(),
            })
            .collect();

        TablePlan {
            selected: selection.contains_table(&key),
            rect: Rect::new(origin.x, origin.y, width, height),
            z,
            collapsed,
            columns,
            key,
        }
    }
}
