use std::sync::Arc;

use crate::perimeters::{GeoPoint, PerimeterKind, PerimeterRegistry};

/// Outbound address-to-coordinates adapter.
pub trait Geocoder: Send + Sync {
    fn geocode(&self, address: &str, post_code: Option<&str>) -> Result<GeoPoint, GeocodingError>;
}

#[derive(Debug, thiserror::Error)]
pub enum GeocodingError {
    #[error("geocoding unavailable: {0}")]
    Unavailable(String),
    #[error("no match for address '{0}'")]
    NoMatch(String),
}

/// Resolves an address to the centre of the registered city owning its post code.
pub struct CityCentroidGeocoder {
    perimeters: Arc<PerimeterRegistry>,
}

impl CityCentroidGeocoder {
    pub fn new(perimeters: Arc<PerimeterRegistry>) -> Self {
        Self { perimeters }
    }
}

impl Geocoder for CityCentroidGeocoder {
    fn geocode(&self, address: &str, post_code: Option<&str>) -> Result<GeoPoint, GeocodingError> {
        let post_code = post_code.ok_or_else(|| GeocodingError::NoMatch(address.to_string()))?;
        self.perimeters
            .iter()
            .filter(|perimeter| perimeter.kind == PerimeterKind::City)
            .find(|city| city.has_post_code(post_code))
            .and_then(|city| city.coords)
            .ok_or_else(|| GeocodingError::NoMatch(address.to_string()))
    }
}
