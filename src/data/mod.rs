pub mod datetime;
pub mod export;
pub mod loader;

pub use export::ExportError;
pub use loader::LoadError;
