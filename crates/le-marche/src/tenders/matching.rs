use super::domain::Tender;
use crate::search::{NearFilter, SupplierQuery};

/// Supplier query selecting the candidates of a tender.
///
/// A nationwide tender collapses its geography to the single country perimeter.
/// A located tender with a distance searches around that city and ignores its
/// perimeter list.
pub fn tender_query(tender: &Tender, country_slug: &str) -> SupplierQuery {
    let mut query = SupplierQuery {
        sectors: tender.sectors.clone(),
        kinds: tender.kinds.clone(),
        service_types: tender.service_types.clone(),
        include_country_area: tender.include_country_area,
        ..SupplierQuery::default()
    };

    if tender.is_country_area {
        query.perimeters = vec![country_slug.to_string()];
        return query;
    }

    match (&tender.location, tender.distance_location_km) {
        (Some(location), Some(distance_km)) if distance_km > 0.0 => {
            query.near = Some(NearFilter {
                location: location.clone(),
                distance_km,
            });
        }
        _ => query.perimeters = tender.perimeters.clone(),
    }
    query
}
