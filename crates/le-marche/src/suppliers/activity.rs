use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::perimeters::{PerimeterKind, PerimeterRegistry};
use crate::taxonomy::{ServiceType, Taxonomy};

/// Geographic reach of one activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GeoRange {
    Country,
    Custom { radius_km: f64 },
    Zones { locations: Vec<String> },
}

impl GeoRange {
    pub fn label(&self) -> &'static str {
        match self {
            GeoRange::Country => "country",
            GeoRange::Custom { .. } => "custom",
            GeoRange::Zones { .. } => "zones",
        }
    }
}

/// One offer dimension of a supplier: a sector, what is sold, and where.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierActivity {
    pub sector: String,
    pub service_types: BTreeSet<ServiceType>,
    pub geo_range: GeoRange,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ActivityError {
    #[error("activity in sector '{0}' has no service type")]
    MissingServiceType(String),
    #[error("custom range needs a positive radius, got {0}")]
    InvalidRadius(f64),
    #[error("zones range needs at least one location")]
    EmptyZones,
    #[error("zones range cannot list the country perimeter")]
    CountryZone,
    #[error("unknown perimeter '{0}' in zones range")]
    UnknownLocation(String),
    #[error("unknown sector '{0}'")]
    UnknownSector(String),
}

impl SupplierActivity {
    /// Reject combinations the tagged range cannot express: CUSTOM without a radius,
    /// ZONES without (known) locations, ZONES naming the whole country.
    pub fn validate(
        &self,
        perimeters: &PerimeterRegistry,
        taxonomy: &Taxonomy,
    ) -> Result<(), ActivityError> {
        if taxonomy.sector(&self.sector).is_err() {
            return Err(ActivityError::UnknownSector(self.sector.clone()));
        }
        if self.service_types.is_empty() {
            return Err(ActivityError::MissingServiceType(self.sector.clone()));
        }
        match &self.geo_range {
            GeoRange::Country => Ok(()),
            GeoRange::Custom { radius_km } => {
                if radius_km.is_finite() && *radius_km > 0.0 {
                    Ok(())
                } else {
                    Err(ActivityError::InvalidRadius(*radius_km))
                }
            }
            GeoRange::Zones { locations } => {
                if locations.is_empty() {
                    return Err(ActivityError::EmptyZones);
                }
                for slug in locations {
                    let perimeter = perimeters
                        .get(slug)
                        .ok_or_else(|| ActivityError::UnknownLocation(slug.clone()))?;
                    if perimeter.kind == PerimeterKind::Country {
                        return Err(ActivityError::CountryZone);
                    }
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixtures() -> (PerimeterRegistry, Taxonomy) {
        let mut taxonomy = Taxonomy::new();
        taxonomy.add_sector(None, "Nettoyage").expect("sector");
        (PerimeterRegistry::with_reference_tables(), taxonomy)
    }

    fn activity(geo_range: GeoRange) -> SupplierActivity {
        SupplierActivity {
            sector: "nettoyage".to_string(),
            service_types: BTreeSet::from([ServiceType::Prest]),
            geo_range,
        }
    }

    #[test]
    fn accepts_well_formed_ranges() {
        let (perimeters, taxonomy) = fixtures();
        for range in [
            GeoRange::Country,
            GeoRange::Custom { radius_km: 25.0 },
            GeoRange::Zones {
                locations: vec!["isere".to_string()],
            },
        ] {
            assert_eq!(activity(range).validate(&perimeters, &taxonomy), Ok(()));
        }
    }

    #[test]
    fn rejects_invalid_combinations() {
        let (perimeters, taxonomy) = fixtures();
        let cases = [
            (
                GeoRange::Custom { radius_km: 0.0 },
                ActivityError::InvalidRadius(0.0),
            ),
            (
                GeoRange::Zones {
                    locations: Vec::new(),
                },
                ActivityError::EmptyZones,
            ),
            (
                GeoRange::Zones {
                    locations: vec!["france".to_string()],
                },
                ActivityError::CountryZone,
            ),
            (
                GeoRange::Zones {
                    locations: vec!["atlantis".to_string()],
                },
                ActivityError::UnknownLocation("atlantis".to_string()),
            ),
        ];
        for (range, expected) in cases {
            assert_eq!(activity(range).validate(&perimeters, &taxonomy), Err(expected));
        }

        let mut no_service = activity(GeoRange::Country);
        no_service.service_types.clear();
        assert_eq!(
            no_service.validate(&perimeters, &taxonomy),
            Err(ActivityError::MissingServiceType("nettoyage".to_string()))
        );
    }
}
