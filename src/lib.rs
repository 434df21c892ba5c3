//! Laser height-profile viewer and measurement engine.
//!
//! The engine (`state`, `render`, `processing`) is free of any drawing
//! backend: it works in canvas coordinates and produces a
//! [`render::primitives::RenderScene`] that the egui widgets in `ui` paint.

pub mod data;
pub mod processing;
pub mod render;
pub mod sensor;
pub mod state;
pub mod ui;

pub use render::plot_interaction::PointerEvent;
pub use state::measurement::MeasureMode;
pub use state::profile::Scan;
pub use state::viewer_state::{ViewerOptions, ViewerState};
