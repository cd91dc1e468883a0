//! Matching and geospatial search engine connecting public buyers with inclusive
//! suppliers: perimeters, supplier catalog, search, tender lifecycle and the
//! inclusive-potential analysis.

pub mod config;
pub mod error;
pub mod favorites;
pub mod maintenance;
pub mod perimeters;
pub mod potential;
pub mod reference;
pub mod repository;
pub mod search;
pub mod suppliers;
pub mod taxonomy;
pub mod telemetry;
pub mod tenders;
pub mod text;

#[cfg(test)]
pub(crate) mod fixtures;

pub use config::{AppConfig, MarketConfig};
pub use error::AppError;
