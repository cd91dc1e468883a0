use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use super::filter::{Candidate, FilterEngine};
use super::query::SupplierQuery;
use super::ranking;
use super::resolve::{ResolvedQuery, SearchError};
use crate::perimeters::PerimeterRegistry;
use crate::suppliers::{Supplier, SupplierId, SupplierRepository};
use crate::taxonomy::{SupplierKind, Taxonomy};

/// Public listing entry for one supplier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplierSummary {
    pub id: SupplierId,
    pub slug: String,
    pub name: String,
    pub brand: Option<String>,
    pub kind: SupplierKind,
    pub city: Option<String>,
    pub department: Option<String>,
    pub region: Option<String>,
    pub logo_url: Option<String>,
    pub super_badge: bool,
    pub distance_km: Option<f64>,
}

impl SupplierSummary {
    fn from_candidate(candidate: &Candidate<'_>) -> Self {
        let supplier = candidate.supplier;
        Self {
            id: supplier.id,
            slug: supplier.slug.clone(),
            name: supplier.name.clone(),
            brand: supplier.brand.clone(),
            kind: supplier.kind,
            city: supplier.city.clone(),
            department: supplier.department.clone(),
            region: supplier.region.clone(),
            logo_url: supplier.logo_url.clone(),
            super_badge: supplier.counters.super_badge,
            distance_km: candidate.distance_km,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchPage {
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
    pub results: Vec<SupplierSummary>,
}

/// Read-only search over the live supplier snapshot.
pub struct SupplierSearch<R> {
    repository: Arc<R>,
    perimeters: Arc<PerimeterRegistry>,
    taxonomy: Arc<Taxonomy>,
    page_size: usize,
}

impl<R> SupplierSearch<R>
where
    R: SupplierRepository + 'static,
{
    pub fn new(
        repository: Arc<R>,
        perimeters: Arc<PerimeterRegistry>,
        taxonomy: Arc<Taxonomy>,
        page_size: usize,
    ) -> Self {
        Self {
            repository,
            perimeters,
            taxonomy,
            page_size: page_size.max(1),
        }
    }

    pub fn perimeters(&self) -> &Arc<PerimeterRegistry> {
        &self.perimeters
    }

    pub fn taxonomy(&self) -> &Arc<Taxonomy> {
        &self.taxonomy
    }

    /// Filtered, ranked and paginated results.
    pub fn search(&self, query: &SupplierQuery) -> Result<SearchPage, SearchError> {
        let resolved = ResolvedQuery::resolve(query, &self.perimeters, &self.taxonomy)?;
        let snapshot = self.repository.live()?;
        let mut candidates = FilterEngine::new(&self.perimeters).run(&snapshot, &resolved);
        ranking::rank(&mut candidates);

        let page = query.page.unwrap_or(1).max(1);
        let results: Vec<SupplierSummary> = candidates
            .iter()
            .skip((page - 1).saturating_mul(self.page_size))
            .take(self.page_size)
            .map(SupplierSummary::from_candidate)
            .collect();
        debug!(total = candidates.len(), page, "supplier search served");

        Ok(SearchPage {
            page,
            page_size: self.page_size,
            total: candidates.len(),
            results,
        })
    }

    /// Every matching supplier, unranked.
    pub fn candidates(&self, query: &SupplierQuery) -> Result<Vec<Supplier>, SearchError> {
        let resolved = ResolvedQuery::resolve(query, &self.perimeters, &self.taxonomy)?;
        let snapshot = self.repository.live()?;
        let matched = FilterEngine::new(&self.perimeters)
            .run(&snapshot, &resolved)
            .into_iter()
            .map(|candidate| candidate.supplier.clone())
            .collect();
        Ok(matched)
    }

    pub fn candidate_ids(&self, query: &SupplierQuery) -> Result<Vec<SupplierId>, SearchError> {
        Ok(self
            .candidates(query)?
            .into_iter()
            .map(|supplier| supplier.id)
            .collect())
    }

    /// The best `limit` suppliers of `among` that still match the query, in ranking order.
    pub fn top_among(
        &self,
        query: &SupplierQuery,
        among: &BTreeSet<SupplierId>,
        limit: usize,
    ) -> Result<Vec<SupplierSummary>, SearchError> {
        let resolved = ResolvedQuery::resolve(query, &self.perimeters, &self.taxonomy)?;
        let snapshot: Vec<Supplier> = self
            .repository
            .live()?
            .into_iter()
            .filter(|supplier| among.contains(&supplier.id))
            .collect();
        let mut candidates = FilterEngine::new(&self.perimeters).run(&snapshot, &resolved);
        ranking::rank(&mut candidates);
        Ok(candidates
            .iter()
            .take(limit)
            .map(SupplierSummary::from_candidate)
            .collect())
    }
}
