//! Perimeter registry: country, regions, departments and cities with static containment
//! and great-circle distances.

pub mod domain;
pub mod geo;
pub mod reference;
pub mod registry;

pub use domain::{GeoPoint, Perimeter, PerimeterKind, COUNTRY_SLUG};
pub use geo::{distance_km, radius_query, Located};
pub use registry::{PerimeterError, PerimeterRegistry};
