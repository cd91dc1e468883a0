//! Supplier catalog: the supplier entity, its activities, cached counters, search
//! document and the save path that keeps them consistent.

pub mod activity;
pub mod counters;
pub mod document;
pub mod domain;
pub mod geocoding;
pub mod repository;
pub mod service;

#[cfg(test)]
mod tests;

pub use activity::{ActivityError, GeoRange, SupplierActivity};
pub use document::SearchDocument;
pub use domain::{
    ClientReference, Offer, Supplier, SupplierCounters, SupplierId, SupplierTenderStats,
};
pub use geocoding::{CityCentroidGeocoder, Geocoder, GeocodingError};
pub use repository::{InMemorySupplierRepository, SupplierRepository};
pub use service::{CatalogError, SupplierCatalog, UniquenessConflict};
