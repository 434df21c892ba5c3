pub mod live_panel;
pub mod profile_panel;
pub mod settings_dialog;
pub mod slice_panel;
