pub mod plot_interaction;
pub mod primitives;
pub mod view_window;
