use std::collections::BTreeMap;

use super::resolve::{ResolvedQuery, TextQuery};
use crate::perimeters::{distance_km, radius_query, Perimeter, PerimeterKind, PerimeterRegistry};
use crate::suppliers::{GeoRange, Supplier, SupplierActivity, SupplierId};
use crate::taxonomy::Territory;
use crate::text::fold;

/// Minimum trigram similarity for a text match.
pub const SIMILARITY_THRESHOLD: f32 = 0.2;

/// A supplier kept by the filter with the figures ranking needs.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'s> {
    pub supplier: &'s Supplier,
    /// Distance to the queried city, when the query is city-scoped.
    pub distance_km: Option<f64>,
    pub similarity: Option<f32>,
}

/// Pure predicate evaluation over a snapshot of suppliers.
pub struct FilterEngine<'a> {
    perimeters: &'a PerimeterRegistry,
}

impl<'a> FilterEngine<'a> {
    pub fn new(perimeters: &'a PerimeterRegistry) -> Self {
        Self { perimeters }
    }

    /// Live suppliers satisfying every predicate of the query, in input order.
    pub fn run<'s>(&self, suppliers: &'s [Supplier], query: &ResolvedQuery<'_>) -> Vec<Candidate<'s>> {
        let near = query.near.map(|near| match near.center {
            Some(center) => radius_query(center, near.radius_km, suppliers.iter())
                .into_iter()
                .map(|(supplier, distance)| (supplier.id, distance))
                .collect::<BTreeMap<SupplierId, f64>>(),
            None => BTreeMap::new(),
        });
        let city = query.scoped_city();

        suppliers
            .iter()
            .filter(|supplier| supplier.is_live())
            .filter(|supplier| match &near {
                Some(within) => {
                    within.contains_key(&supplier.id)
                        || (query.query.include_country_area
                            && supplier
                                .activities
                                .iter()
                                .any(|activity| activity.geo_range == GeoRange::Country))
                }
                None => true,
            })
            .filter(|supplier| self.matches_attributes(supplier, query))
            .filter(|supplier| self.matches_activities(supplier, query))
            .filter_map(|supplier| {
                let similarity = match &query.text {
                    Some(TextQuery::Identifier(digits)) => {
                        if !supplier.search.identifier_starts_with(digits) {
                            return None;
                        }
                        None
                    }
                    Some(TextQuery::Words(folded)) => {
                        let score = supplier.search.similarity(folded);
                        if score <= SIMILARITY_THRESHOLD {
                            return None;
                        }
                        Some(score)
                    }
                    None => None,
                };
                Some(Candidate {
                    supplier,
                    distance_km: city.and_then(|city| city_distance(supplier, city)),
                    similarity,
                })
            })
            .collect()
    }

    fn matches_attributes(&self, supplier: &Supplier, query: &ResolvedQuery<'_>) -> bool {
        let request = query.query;

        if !request.kinds.is_empty() && !request.kinds.contains(&supplier.kind) {
            return false;
        }
        if !request.territory.is_empty()
            && !request.territory.iter().any(|flag| match flag {
                Territory::Qpv => supplier.is_qpv,
                Territory::Zrr => supplier.is_zrr,
            })
        {
            return false;
        }
        if !request.networks.is_empty()
            && !request.networks.iter().any(|slug| supplier.networks.contains(slug))
        {
            return false;
        }
        if !request.labels.is_empty()
            && !request.labels.iter().any(|slug| supplier.labels.contains(slug))
        {
            return false;
        }
        if !request.legal_forms.is_empty()
            && !supplier
                .legal_form
                .is_some_and(|form| request.legal_forms.contains(&form))
        {
            return false;
        }
        if let Some(wanted) = request.has_client_references {
            if wanted != !supplier.client_references.is_empty() {
                return false;
            }
        }
        if let Some(wanted) = request.has_groups {
            if wanted != !supplier.groups.is_empty() {
                return false;
            }
        }
        if let Some(bucket) = request.ca {
            if !supplier.revenue().is_some_and(|revenue| bucket.contains(revenue)) {
                return false;
            }
        }
        if let Some(bucket) = request.employees {
            if !supplier.headcount().is_some_and(|count| bucket.contains(count)) {
                return false;
            }
        }
        if let Some(reference) = request
            .company_client_reference
            .as_deref()
            .map(fold)
            .filter(|reference| !reference.is_empty())
        {
            if !supplier
                .client_references
                .iter()
                .any(|client| fold(&client.name).contains(&reference))
            {
                return false;
            }
        }
        if !query.locations.is_empty()
            && !query
                .locations
                .iter()
                .any(|location| address_in(supplier, location))
        {
            return false;
        }
        true
    }

    /// At least one activity must satisfy sector, service type and geography together.
    fn matches_activities(&self, supplier: &Supplier, query: &ResolvedQuery<'_>) -> bool {
        if !query.query.has_activity_predicates() {
            return true;
        }
        supplier.activities.iter().any(|activity| {
            let sector_ok = query.sectors.is_empty() || query.sectors.contains(activity.sector.as_str());
            let service_ok = query.query.service_types.is_empty()
                || query
                    .query
                    .service_types
                    .iter()
                    .any(|service| activity.service_types.contains(service));
            let geo_ok = query.perimeters.is_empty()
                || query.perimeters.iter().any(|perimeter| {
                    address_in(supplier, perimeter)
                        || self.activity_covers(
                            activity,
                            supplier,
                            perimeter,
                            query.query.include_country_area,
                        )
                });
            sector_ok && service_ok && geo_ok
        })
    }

    /// Geo expansion of one activity against one perimeter.
    fn activity_covers(
        &self,
        activity: &SupplierActivity,
        supplier: &Supplier,
        perimeter: &Perimeter,
        include_country_area: bool,
    ) -> bool {
        match &activity.geo_range {
            GeoRange::Country => include_country_area,
            GeoRange::Custom { radius_km } => {
                let Some(origin) = supplier.coords else {
                    return false;
                };
                match perimeter.kind {
                    PerimeterKind::Country => true,
                    PerimeterKind::City => perimeter
                        .coords
                        .is_some_and(|point| distance_km(origin, point) <= *radius_km),
                    PerimeterKind::Department | PerimeterKind::Region => self
                        .perimeters
                        .cities_within(perimeter)
                        .filter_map(|city| city.coords)
                        .any(|point| distance_km(origin, point) <= *radius_km),
                }
            }
            GeoRange::Zones { locations } => locations.iter().any(|slug| {
                self.perimeters
                    .get(slug)
                    .is_some_and(|zone| zone.overlaps(perimeter))
            }),
        }
    }
}

/// The supplier's own address lies in the perimeter.
fn address_in(supplier: &Supplier, perimeter: &Perimeter) -> bool {
    match perimeter.kind {
        PerimeterKind::Country => true,
        PerimeterKind::Region => supplier.region.as_deref() == Some(perimeter.name.as_str()),
        PerimeterKind::Department => {
            supplier.department.is_some() && supplier.department == perimeter.department_code
        }
        PerimeterKind::City => supplier
            .post_code
            .as_deref()
            .is_some_and(|post_code| perimeter.has_post_code(post_code)),
    }
}

/// Zero inside the city, great-circle distance otherwise, unknown without coordinates.
fn city_distance(supplier: &Supplier, city: &Perimeter) -> Option<f64> {
    if supplier
        .post_code
        .as_deref()
        .is_some_and(|post_code| city.has_post_code(post_code))
    {
        return Some(0.0);
    }
    Some(distance_km(supplier.coords?, city.coords?))
}
