pub mod geometry;
pub mod metrics;
pub mod surface;
