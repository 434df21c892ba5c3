pub mod app_state;
pub mod measurement;
pub mod preferences;
pub mod profile;
pub mod sync;
pub mod theme;
pub mod viewer_state;
