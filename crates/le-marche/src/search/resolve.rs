use std::collections::BTreeSet;

use super::query::SupplierQuery;
use crate::perimeters::{GeoPoint, Perimeter, PerimeterKind, PerimeterRegistry};
use crate::repository::RepositoryError;
use crate::taxonomy::Taxonomy;
use crate::text::{digits_only, fold};

/// Error raised by supplier search.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("unknown {kind} '{slug}'")]
    UnknownReferent { kind: &'static str, slug: String },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl SearchError {
    fn unknown(kind: &'static str, slug: &str) -> Self {
        SearchError::UnknownReferent {
            kind,
            slug: slug.to_string(),
        }
    }
}

/// Free-text part of a query after normalisation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextQuery {
    /// Digits only: SIRET or SIREN prefix, whitespace removed.
    Identifier(String),
    /// Folded words matched by trigram similarity.
    Words(String),
}

/// Radius constraint around a city point. A city without coordinates yields no match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedNear {
    pub center: Option<GeoPoint>,
    pub radius_km: f64,
}

/// A query whose slugs were all checked against the reference tables.
#[derive(Debug, Clone)]
pub struct ResolvedQuery<'a> {
    pub query: &'a SupplierQuery,
    pub sectors: BTreeSet<&'a str>,
    pub perimeters: Vec<&'a Perimeter>,
    pub locations: Vec<&'a Perimeter>,
    pub near: Option<ResolvedNear>,
    pub text: Option<TextQuery>,
}

impl<'a> ResolvedQuery<'a> {
    pub fn resolve(
        query: &'a SupplierQuery,
        perimeters: &'a PerimeterRegistry,
        taxonomy: &Taxonomy,
    ) -> Result<Self, SearchError> {
        let mut sectors = BTreeSet::new();
        for slug in &query.sectors {
            taxonomy
                .sector(slug)
                .map_err(|_| SearchError::unknown("sector", slug))?;
            sectors.insert(slug.as_str());
        }
        for slug in &query.labels {
            taxonomy
                .label(slug)
                .map_err(|_| SearchError::unknown("label", slug))?;
        }
        for slug in &query.networks {
            taxonomy
                .network(slug)
                .map_err(|_| SearchError::unknown("network", slug))?;
        }

        let lookup = move |slugs: &'a [String]| -> Result<Vec<&'a Perimeter>, SearchError> {
            slugs
                .iter()
                .map(|slug| {
                    perimeters
                        .lookup_by_slug(slug)
                        .map_err(|_| SearchError::unknown("perimeter", slug))
                })
                .collect()
        };
        let resolved_perimeters = lookup(&query.perimeters)?;
        let locations = lookup(&query.locations)?;

        let near = match &query.near {
            Some(near) => {
                let city = perimeters
                    .lookup_by_slug(&near.location)
                    .map_err(|_| SearchError::unknown("perimeter", &near.location))?;
                Some(ResolvedNear {
                    center: city.coords,
                    radius_km: near.distance_km,
                })
            }
            None => None,
        };

        let text = query.text().map(|text| match digits_only(text) {
            Some(digits) => TextQuery::Identifier(digits),
            None => TextQuery::Words(fold(text)),
        });

        Ok(Self {
            query,
            sectors,
            perimeters: resolved_perimeters,
            locations,
            near,
            text,
        })
    }

    /// The single city perimeter of a city-scoped query.
    pub fn scoped_city(&self) -> Option<&'a Perimeter> {
        match self.perimeters.as_slice() {
            [city] if city.kind == PerimeterKind::City => Some(*city),
            _ => None,
        }
    }

    pub fn is_text_search(&self) -> bool {
        matches!(self.text, Some(TextQuery::Words(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{perimeters, taxonomy};

    #[test]
    fn unknown_slugs_are_reported_with_their_table() {
        let registry = perimeters();
        let taxonomy = taxonomy();
        let query = SupplierQuery {
            perimeters: vec!["atlantide".to_string()],
            ..SupplierQuery::default()
        };

        match ResolvedQuery::resolve(&query, &registry, &taxonomy) {
            Err(SearchError::UnknownReferent { kind: "perimeter", slug }) => {
                assert_eq!(slug, "atlantide")
            }
            other => panic!("expected unknown perimeter, got {other:?}"),
        }
    }

    #[test]
    fn digit_queries_become_identifier_prefixes() {
        let registry = perimeters();
        let taxonomy = taxonomy();
        let query = SupplierQuery {
            q: Some("123 456 789".to_string()),
            perimeters: vec!["grenoble-38".to_string()],
            ..SupplierQuery::default()
        };

        let resolved = ResolvedQuery::resolve(&query, &registry, &taxonomy).expect("resolves");
        assert_eq!(
            resolved.text,
            Some(TextQuery::Identifier("123456789".to_string()))
        );
        assert!(!resolved.is_text_search());
        assert_eq!(resolved.scoped_city().map(|city| city.code.as_str()), Some("38185"));
    }
}
