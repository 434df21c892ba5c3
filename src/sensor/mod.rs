pub mod capture;
pub mod client;

pub use client::SensorError;
