//! Interaction controller.
//!
//! [`Editor`] owns every piece of editor state (graph, positions,
//! visibility, selection, the active drag and the layout RNG) and is the only
//! place where they change. Each operation keeps the satellite stores in step
//! with the graph: a rename rekeys positions, visibility and selection, a
//! delete removes the entity from all of them.
//!
//! Failures are logged and returned; nothing here panics on bad input.

use crate::drag::{DragSession, DragTarget};
use crate::error::{EditError, EditResult};
use crate::filter::{Direction, TableFilter};
use crate::ident::{ColumnRef, EntityKind, EntityPath, TableKey};
use crate::layout::placement::PlacementConfig;
use crate::layout::{EdgePlan, LayoutEngine, RenderPlan};
use crate::model::{GraphStats, Relation, SchemaGraph};
use crate::parser::Parser;
use crate::position::{Point, PositionStore};
use crate::selection::Selection;
use crate::serializer::serialize;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct EditorConfig {
    /// Lowest z a table can get
    pub min_z: i64,
    /// Visibility of tables whose import rows carry no visibility field
    pub visible_by_default: bool,
    /// Treat renaming a table or column to an empty name as deleting it
    pub empty_rename_deletes: bool,
    /// Seed of the initial-layout RNG
    pub seed: u64,
    pub placement: PlacementConfig,
    pub layout: LayoutEngine,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            min_z: 3,
            visible_by_default: true,
            empty_rename_deletes: false,
            seed: 0,
            placement: PlacementConfig::default(),
            layout: LayoutEngine::default(),
        }
    }
}

pub struct Editor {
    config: EditorConfig,
    graph: SchemaGraph,
    positions: PositionStore,
    filter: TableFilter,
    selection: Selection,
    drag: Option<DragSession>,
    rng: StdRng,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Editor {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            graph: SchemaGraph::new(),
            positions: PositionStore::new(config.min_z),
            filter: TableFilter::new(config.visible_by_default),
            selection: Selection::new(),
            drag: None,
            rng: StdRng::seed_from_u64(config.seed),
            config,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn graph(&self) -> &SchemaGraph {
        &self.graph
    }

    pub fn positions(&self) -> &PositionStore {
        &self.positions
    }

    pub fn filter(&self) -> &TableFilter {
        &self.filter
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Replace all state with the contents of `text`.
    pub fn load(&mut self, text: &str) -> GraphStats {
        let doc = Parser::new(text)
            .with_defaults(self.config.visible_by_default, self.config.min_z)
            .parse();

        self.graph = doc.graph;
        self.positions = doc.positions;
        self.filter = TableFilter::new(self.config.visible_by_default);
        for (key, visible) in doc.visibility {
            self.filter.register(key, visible);
        }
        self.selection.clear();
        self.drag = None;

        let placed = self
            .positions
            .initialize_layout(&self.graph, &self.config.placement, &mut self.rng);

        let stats = self.graph.stats();
        info!(
            "loaded {} schemas, {} tables, {} columns, {} relations ({placed} tables auto-placed, {} relations skipped)",
            stats.schemas, stats.tables, stats.columns, stats.relations, doc.skipped_relations
        );
        stats
    }

    pub fn export_text(&self) -> String {
        let text = serialize(&self.graph, &self.positions, &self.filter);
        info!("exported {} tables", self.graph.stats().tables);
        text
    }

    pub fn render_plan(&self) -> RenderPlan {
        self.config
            .layout
            .project(&self.graph, &self.positions, &self.filter, &self.selection)
    }

    pub fn edges(&self) -> Vec<EdgePlan> {
        self.config
            .layout
            .project_edges(&self.graph, &self.positions, &self.filter, &self.selection)
    }

    pub fn status(&self) -> String {
        if self.graph.is_empty() {
            return "No data loaded".to_string();
        }
        let stats = self.graph.stats();
        format!(
            "{} schemas, {} tables, {} columns loaded",
            stats.schemas, stats.tables, stats.columns
        )
    }

    pub fn selection_hint(&self) -> Option<String> {
        self.selection.hint()
    }

    /// Column click. Returns the relation created when this click completed
    /// a pair of columns from different tables.
    pub fn click_column(&mut self, col: &ColumnRef) -> Option<Relation> {
        if !self.graph.contains_column(col) {
            warn!("click on unknown column {col}");
            return None;
        }
        let (from, to) = self.selection.select_column(col)?;
        match self.graph.add_relation(&from, &to) {
            Ok(true) => Some(Relation::new(from, to)),
            Ok(false) => {
                debug!("relation {from} -> {to} already exists");
                None
            }
            Err(e) => {
                warn!("add relation failed: {e}");
                None
            }
        }
    }

    /// Table click: `additive` toggles membership, otherwise the table becomes
    /// the only selected one. The table is raised either way.
    pub fn click_table(&mut self, key: &TableKey, additive: bool) -> bool {
        if !self.graph.contains_table(key) {
            warn!("click on unknown table {key}");
            return false;
        }
        if additive {
            self.selection.toggle_table(key);
        } else {
            self.selection.select_only(key);
        }
        self.raise(key);
        true
    }

    pub fn click_background(&mut self) {
        self.selection.clear();
    }

    fn raise(&mut self, key: &TableKey) {
        if !self.positions.contains(key) {
            let z = self.positions.place(key.clone(), self.config.layout.default_position);
            debug!("placed {key} at default position with z {z}");
        } else {
            self.positions.bring_to_top(key);
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Start dragging. A selected table drags the whole table selection with
    /// it; a schema drags all of its visible tables.
    pub fn drag_start(&mut self, target: DragTarget, pointer: Point) -> EditResult<()> {
        let keys: Vec<TableKey> = match &target {
            DragTarget::Table(key) => {
                if !self.graph.contains_table(key) {
                    return Err(logged(EditError::not_found(EntityKind::Table, key)));
                }
                self.raise(key);
                if self.selection.contains_table(key) {
                    self.selection.selected_tables().cloned().collect()
                } else {
                    vec![key.clone()]
                }
            }
            DragTarget::Schema(name) => {
                let schema = self
                    .graph
                    .schema(name)
                    .ok_or_else(|| logged(EditError::not_found(EntityKind::Schema, name)))?;
                schema
                    .tables()
                    .map(|(t, _)| TableKey::new(name.as_str(), t))
                    .filter(|k| self.filter.is_visible(k))
                    .collect()
            }
        };

        let snapshot = self.positions.snapshot(&keys);
        debug!("drag start on {target:?} moving {} tables", snapshot.len());
        self.drag = Some(DragSession::begin(target, pointer, snapshot));
        Ok(())
    }

    /// Move the dragged tables and return the recomputed relation lines.
    pub fn drag_move(&mut self, pointer: Point) -> EditResult<Vec<EdgePlan>> {
        let drag = self.drag.as_mut().ok_or(EditError::DragInactive)?;
        drag.update(pointer, &mut self.positions);
        Ok(self.edges())
    }

    /// Finish the drag and return a full plan, schema areas included.
    pub fn drag_end(&mut self) -> EditResult<RenderPlan> {
        let drag = self.drag.take().ok_or(EditError::DragInactive)?;
        debug!("drag end on {:?}, delta {:?}", drag.target(), drag.delta());
        Ok(self.render_plan())
    }

    /// The pointer left the surface mid-drag; keeps the last position.
    pub fn drag_cancel(&mut self) -> EditResult<RenderPlan> {
        self.drag_end()
    }

    /// Rename the entity at `path`. Returns its new path, or `None` when an
    /// empty name deleted it (see [`EditorConfig::empty_rename_deletes`]).
    pub fn rename(&mut self, path: &EntityPath, new: &str) -> EditResult<Option<EntityPath>> {
        let new = new.trim();
        if new.is_empty()
            && self.config.empty_rename_deletes
            && path.kind() != EntityKind::Schema
        {
            self.delete(path)?;
            return Ok(None);
        }

        let renamed = match path {
            EntityPath::Schema(old) => {
                self.graph.rename_schema(old, new).map_err(logged)?;
                self.positions.rekey_schema(old, new);
                self.filter.rekey_schema(old, new);
                self.selection.clear();
                EntityPath::Schema(new.to_string())
            }
            EntityPath::Table(key) => {
                let new_key = self.graph.rename_table(key, new).map_err(logged)?;
                self.positions.rekey_table(key, &new_key);
                self.filter.rekey_table(key, &new_key);
                self.selection.rekey_table(key, &new_key);
                EntityPath::Table(new_key)
            }
            EntityPath::Column(col) => {
                let new_col = self.graph.rename_column(col, new).map_err(logged)?;
                self.selection.rekey_column(col, &new_col);
                EntityPath::Column(new_col)
            }
        };
        Ok(Some(renamed))
    }

    /// Delete the entity at `path` along with every relation touching it.
    pub fn delete(&mut self, path: &EntityPath) -> EditResult<()> {
        match path {
            EntityPath::Schema(name) => {
                self.graph.delete_schema(name).map_err(logged)?;
                self.positions.remove_schema(name);
                self.filter.remove_schema(name);
                self.selection.remove_schema(name);
            }
            EntityPath::Table(key) => {
                self.graph.delete_table(key).map_err(logged)?;
                self.positions.remove(key);
                self.filter.remove(key);
                self.selection.remove_table(key);
            }
            EntityPath::Column(col) => {
                self.graph.delete_column(col).map_err(logged)?;
                self.selection.remove_column(col);
            }
        }
        self.drag = None;
        Ok(())
    }

    pub fn add_schema(&mut self) -> EditResult<String> {
        self.graph.add_schema(None).map_err(logged)
    }

    /// Add a table to `schema`, placed on the schema's circle and on top.
    pub fn add_table(&mut self, schema: &str) -> EditResult<TableKey> {
        let key = self.graph.add_table(schema).map_err(logged)?;
        self.filter.register(key.clone(), true);
        self.positions
            .initialize_layout(&self.graph, &self.config.placement, &mut self.rng);
        Ok(key)
    }

    pub fn add_column(&mut self, key: &TableKey) -> EditResult<ColumnRef> {
        let name = self.graph.add_column(key).map_err(logged)?;
        Ok(key.column(name))
    }

    pub fn add_relation(&mut self, from: &ColumnRef, to: &ColumnRef) -> EditResult<bool> {
        self.graph.add_relation(from, to).map_err(logged)
    }

    pub fn remove_relation(&mut self, from: &ColumnRef, to: &ColumnRef) -> EditResult<()> {
        self.graph.remove_relation(from, to).map_err(logged)
    }

    pub fn toggle_columns_collapsed(&mut self, key: &TableKey) -> EditResult<bool> {
        self.graph.toggle_columns_collapsed(key).map_err(logged)
    }

    pub fn set_filter<I>(&mut self, keys: I) -> usize
    where
        I: IntoIterator<Item = TableKey>,
    {
        self.filter.filter_to_set(keys)
    }

    pub fn expand_filter(&mut self, key: &TableKey, direction: Direction) -> usize {
        self.filter.expand(&self.graph, key, direction)
    }

    pub fn reset_filter(&mut self) {
        self.filter.show_all();
    }

    pub fn hide_table(&mut self, key: &TableKey) -> bool {
        let hidden = self.filter.hide(key);
        if !hidden {
            warn!("cannot hide unknown table {key}");
        }
        hidden
    }

    pub fn search_tables(&self, term: &str) -> Vec<TableKey> {
        self.filter.matching(term)
    }
}

fn logged(e: EditError) -> EditError {
    warn!("{e}");
    e
}
