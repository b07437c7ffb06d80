//! Projection of the editor state into a render plan.
//!
//! The projector is a pure function of the graph, the position store, the
//! visibility filter and the selection. Painters (the SVG renderer, the
//! browser UI) consume the plan and never write back into it.

mod anchors;
mod bounds;
mod engine;
pub mod placement;
mod types;

pub use engine::LayoutEngine;
pub use types::{ColumnPlan, EdgePlan, Rect, RenderPlan, SchemaPlan, TablePlan};
