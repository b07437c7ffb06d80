pub mod drag;
pub mod editor;
pub mod error;
pub mod filter;
pub mod ident;
pub mod layout;
pub mod measure;
pub mod model;
pub mod parser;
pub mod position;
pub mod record;
pub mod selection;
pub mod serializer;
pub mod svg;

use wasm_bindgen::prelude::*;

use drag::DragTarget;
use editor::{Editor, EditorConfig};
use filter::Direction;
use ident::{ColumnRef, EntityPath, TableKey};
use position::Point;
use svg::SvgRenderer;

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

/// Render an exported schema file straight to SVG
#[wasm_bindgen(js_name = "schemaToSvg")]
pub fn render_schema(source: &str, seed: Option<u32>) -> String {
    let mut editor = Editor::new(EditorConfig {
        seed: seed.map_or(0, u64::from),
        ..EditorConfig::default()
    });
    editor.load(source);
    SvgRenderer::new(editor.config().layout.metrics().clone()).render(&editor.render_plan())
}

/// Editor handle for the browser UI. Every method maps failures to a
/// `false` / `Err(String)` return; details go to the log.
#[wasm_bindgen]
pub struct SchemaEditor {
    inner: Editor,
    renderer: SvgRenderer,
}

#[wasm_bindgen]
impl SchemaEditor {
    #[wasm_bindgen(constructor)]
    pub fn new(
        seed: Option<u32>,
        viewport_width: Option<f64>,
        viewport_height: Option<f64>,
    ) -> Self {
        let defaults = EditorConfig::default();
        let layout = match (viewport_width, viewport_height) {
            (Some(w), Some(h)) => defaults.layout.clone().with_viewport(w, h),
            _ => defaults.layout.clone(),
        };
        let renderer = SvgRenderer::new(layout.metrics().clone());
        Self {
            inner: Editor::new(EditorConfig {
                seed: seed.map_or(0, u64::from),
                layout,
                ..defaults
            }),
            renderer,
        }
    }

    /// Replace the diagram with `text`; returns the status line.
    pub fn load(&mut self, text: &str) -> String {
        self.inner.load(text);
        self.inner.status()
    }

    #[wasm_bindgen(js_name = "exportText")]
    pub fn export_text(&self) -> String {
        self.inner.export_text()
    }

    #[wasm_bindgen(js_name = "renderSvg")]
    pub fn render_svg(&self) -> String {
        self.renderer.render(&self.inner.render_plan())
    }

    pub fn status(&self) -> String {
        self.inner.status()
    }

    #[wasm_bindgen(js_name = "selectionHint")]
    pub fn selection_hint(&self) -> Option<String> {
        self.inner.selection_hint()
    }

    /// Returns true when the click created a relation.
    #[wasm_bindgen(js_name = "clickColumn")]
    pub fn click_column(&mut self, schema: &str, table: &str, column: &str) -> bool {
        self.inner
            .click_column(&ColumnRef::new(schema, table, column))
            .is_some()
    }

    #[wasm_bindgen(js_name = "clickTable")]
    pub fn click_table(&mut self, schema: &str, table: &str, additive: bool) -> bool {
        self.inner.click_table(&TableKey::new(schema, table), additive)
    }

    #[wasm_bindgen(js_name = "clickBackground")]
    pub fn click_background(&mut self) {
        self.inner.click_background();
    }

    #[wasm_bindgen(js_name = "dragTableStart")]
    pub fn drag_table_start(&mut self, schema: &str, table: &str, x: f64, y: f64) -> bool {
        let target = DragTarget::Table(TableKey::new(schema, table));
        self.inner.drag_start(target, Point::new(x, y)).is_ok()
    }

    #[wasm_bindgen(js_name = "dragSchemaStart")]
    pub fn drag_schema_start(&mut self, schema: &str, x: f64, y: f64) -> bool {
        let target = DragTarget::Schema(schema.to_string());
        self.inner.drag_start(target, Point::new(x, y)).is_ok()
    }

    /// Returns the SVG while a drag is active.
    #[wasm_bindgen(js_name = "dragMove")]
    pub fn drag_move(&mut self, x: f64, y: f64) -> Option<String> {
        self.inner.drag_move(Point::new(x, y)).ok()?;
        Some(self.render_svg())
    }

    #[wasm_bindgen(js_name = "dragEnd")]
    pub fn drag_end(&mut self) -> Option<String> {
        let plan = self.inner.drag_end().ok()?;
        Some(self.renderer.render(&plan))
    }

    pub fn rename(
        &mut self,
        schema: &str,
        table: Option<String>,
        column: Option<String>,
        new_name: &str,
    ) -> Result<(), String> {
        let path = EntityPath::from_parts(schema, table.as_deref(), column.as_deref());
        self.inner
            .rename(&path, new_name)
            .map(|_| ())
            .map_err(|e| e.to_string())
    }

    pub fn delete(
        &mut self,
        schema: &str,
        table: Option<String>,
        column: Option<String>,
    ) -> Result<(), String> {
        let path = EntityPath::from_parts(schema, table.as_deref(), column.as_deref());
        self.inner.delete(&path).map_err(|e| e.to_string())
    }

    #[wasm_bindgen(js_name = "addSchema")]
    pub fn add_schema(&mut self) -> Result<String, String> {
        self.inner.add_schema().map_err(|e| e.to_string())
    }

    /// Returns the new table's `schema.table` key.
    #[wasm_bindgen(js_name = "addTable")]
    pub fn add_table(&mut self, schema: &str) -> Result<String, String> {
        self.inner
            .add_table(schema)
            .map(|k| k.to_string())
            .map_err(|e| e.to_string())
    }

    /// Returns the new column's name.
    #[wasm_bindgen(js_name = "addColumn")]
    pub fn add_column(&mut self, schema: &str, table: &str) -> Result<String, String> {
        self.inner
            .add_column(&TableKey::new(schema, table))
            .map(|c| c.column)
            .map_err(|e| e.to_string())
    }

    #[wasm_bindgen(js_name = "addRelation")]
    pub fn add_relation(
        &mut self,
        from_schema: &str,
        from_table: &str,
        from_column: &str,
        to_schema: &str,
        to_table: &str,
        to_column: &str,
    ) -> bool {
        let from = ColumnRef::new(from_schema, from_table, from_column);
        let to = ColumnRef::new(to_schema, to_table, to_column);
        self.inner.add_relation(&from, &to).unwrap_or(false)
    }

    #[wasm_bindgen(js_name = "removeRelation")]
    pub fn remove_relation(
        &mut self,
        from_schema: &str,
        from_table: &str,
        from_column: &str,
        to_schema: &str,
        to_table: &str,
        to_column: &str,
    ) -> bool {
        let from = ColumnRef::new(from_schema, from_table, from_column);
        let to = ColumnRef::new(to_schema, to_table, to_column);
        self.inner.remove_relation(&from, &to).is_ok()
    }

    /// Returns whether the table is collapsed afterwards.
    #[wasm_bindgen(js_name = "toggleColumns")]
    pub fn toggle_columns(&mut self, schema: &str, table: &str) -> bool {
        self.inner
            .toggle_columns_collapsed(&TableKey::new(schema, table))
            .unwrap_or(false)
    }

    /// Show exactly the given `schema.table` keys.
    #[wasm_bindgen(js_name = "setFilter")]
    pub fn set_filter(&mut self, keys: js_sys::Array) -> usize {
        let keys = keys
            .iter()
            .filter_map(|v| v.as_string())
            .filter_map(|s| TableKey::parse(&s));
        self.inner.set_filter(keys)
    }

    /// `direction` is `"to"` (successors) or `"from"` (predecessors).
    #[wasm_bindgen(js_name = "expandFilter")]
    pub fn expand_filter(
        &mut self,
        schema: &str,
        table: &str,
        direction: &str,
    ) -> Result<usize, String> {
        let direction = Direction::from_str(direction)
            .ok_or_else(|| format!("Invalid direction: {direction}"))?;
        Ok(self
            .inner
            .expand_filter(&TableKey::new(schema, table), direction))
    }

    #[wasm_bindgen(js_name = "resetFilter")]
    pub fn reset_filter(&mut self) {
        self.inner.reset_filter();
    }

    #[wasm_bindgen(js_name = "hideTable")]
    pub fn hide_table(&mut self, schema: &str, table: &str) -> bool {
        self.inner.hide_table(&TableKey::new(schema, table))
    }

    /// Matching `schema.table` keys.
    #[wasm_bindgen(js_name = "searchTables")]
    pub fn search_tables(&self, term: &str) -> js_sys::Array {
        self.inner
            .search_tables(term)
            .into_iter()
            .map(|k| JsValue::from(k.to_string()))
            .collect()
    }
}
