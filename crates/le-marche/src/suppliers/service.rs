use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::activity::ActivityError;
use super::counters;
use super::document::SearchDocument;
use super::domain::{Supplier, SupplierId, SupplierTenderStats};
use super::geocoding::Geocoder;
use super::repository::SupplierRepository;
use crate::perimeters::reference::{department_from_post_code, region_from_post_code};
use crate::perimeters::PerimeterRegistry;
use crate::repository::{HistoryRecord, RepositoryError};
use crate::taxonomy::Taxonomy;
use crate::text::{random_suffix, slugify, truncate_slug};

const SLUG_NAME_MAX_CHARS: usize = 40;

/// Owns the supplier save path: validation, brand uniqueness, geocoding, slug,
/// counters and search document.
pub struct SupplierCatalog<R, G> {
    repository: Arc<R>,
    geocoder: Arc<G>,
    perimeters: Arc<PerimeterRegistry>,
    taxonomy: Arc<Taxonomy>,
    completion_threshold: u8,
}

impl<R, G> SupplierCatalog<R, G>
where
    R: SupplierRepository + 'static,
    G: Geocoder + 'static,
{
    pub fn new(
        repository: Arc<R>,
        geocoder: Arc<G>,
        perimeters: Arc<PerimeterRegistry>,
        taxonomy: Arc<Taxonomy>,
        completion_threshold: u8,
    ) -> Self {
        Self {
            repository,
            geocoder,
            perimeters,
            taxonomy,
            completion_threshold,
        }
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    pub fn create(&self, mut supplier: Supplier) -> Result<Supplier, CatalogError> {
        self.validate(&supplier)?;
        supplier.id = SupplierId::default();

        let live = self.repository.live()?;
        self.check_brand(&supplier, &live)?;
        self.locate(&mut supplier, None);
        self.prepare(&mut supplier, &live);

        let base_slug = base_slug(&supplier);
        supplier.slug = base_slug.clone();
        let stored = match self.repository.insert(supplier.clone()) {
            Err(RepositoryError::Conflict) => {
                supplier.slug = format!("{base_slug}-{}", random_suffix());
                match self.repository.insert(supplier) {
                    Err(RepositoryError::Conflict) => {
                        return Err(UniquenessConflict::Slug(base_slug).into())
                    }
                    other => other?,
                }
            }
            other => other?,
        };

        info!(supplier = %stored.id, slug = %stored.slug, "supplier created");
        Ok(stored)
    }

    pub fn update(&self, mut supplier: Supplier) -> Result<Supplier, CatalogError> {
        let previous = self
            .repository
            .fetch(supplier.id)?
            .ok_or(RepositoryError::NotFound)?;
        self.validate(&supplier)?;

        let live = self.repository.live()?;
        self.check_brand(&supplier, &live)?;
        self.locate(&mut supplier, Some(&previous));
        supplier.slug = previous.slug.clone();
        self.prepare(&mut supplier, &live);

        let stored = self.repository.update(supplier)?;
        info!(supplier = %stored.id, live = stored.is_live(), "supplier updated");
        Ok(stored)
    }

    pub fn delete(&self, id: SupplierId) -> Result<Supplier, CatalogError> {
        let removed = self.repository.delete(id)?;
        info!(supplier = %id, "supplier deleted with its activities and references");
        Ok(removed)
    }

    pub fn get(&self, id: SupplierId) -> Result<Supplier, CatalogError> {
        let supplier = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(supplier)
    }

    pub fn live(&self) -> Result<Vec<Supplier>, CatalogError> {
        Ok(self.repository.live()?)
    }

    pub fn history(&self, id: SupplierId) -> Result<Vec<HistoryRecord>, CatalogError> {
        Ok(self.repository.history(id)?)
    }

    /// Store fresh tender interaction totals and recompute the counters they feed.
    pub fn apply_tender_stats(
        &self,
        id: SupplierId,
        stats: SupplierTenderStats,
    ) -> Result<Supplier, CatalogError> {
        let mut supplier = self.get(id)?;
        supplier.tender_stats = stats;
        let live = self.repository.live()?;
        self.prepare(&mut supplier, &live);
        Ok(self.repository.update(supplier)?)
    }

    fn validate(&self, supplier: &Supplier) -> Result<(), CatalogError> {
        if supplier.siret.len() != 14 || !supplier.siret.chars().all(|ch| ch.is_ascii_digit()) {
            return Err(CatalogError::Invalid(format!(
                "siret '{}' must hold 14 digits",
                supplier.siret
            )));
        }
        if supplier.name.trim().is_empty() {
            return Err(CatalogError::Invalid("name is required".to_string()));
        }
        for activity in &supplier.activities {
            activity.validate(&self.perimeters, &self.taxonomy)?;
        }
        Ok(())
    }

    /// No other live supplier may carry this brand, as brand or as name.
    /// Brands compare exactly, against both brands and names of other live suppliers.
    fn check_brand(&self, supplier: &Supplier, live: &[Supplier]) -> Result<(), CatalogError> {
        let Some(brand) = supplier.brand.as_deref().filter(|brand| !brand.is_empty()) else {
            return Ok(());
        };

        let taken = live
            .iter()
            .filter(|other| other.id != supplier.id)
            .any(|other| other.name == brand || other.brand.as_deref() == Some(brand));
        if taken {
            return Err(UniquenessConflict::Brand(brand.to_string()).into());
        }
        Ok(())
    }

    /// Department and region follow the post code; coordinates are geocoded when the
    /// address is new or moved. A geocoding failure leaves them empty.
    fn locate(&self, supplier: &mut Supplier, previous: Option<&Supplier>) {
        if let Some(post_code) = supplier.post_code.as_deref() {
            if let Some(department) = department_from_post_code(post_code) {
                supplier.region = region_from_post_code(post_code).map(str::to_string);
                supplier.department = Some(department);
            }
        }

        let moved = match previous {
            Some(previous) => {
                previous.address != supplier.address || previous.post_code != supplier.post_code
            }
            None => supplier.coords.is_none(),
        };
        if !moved {
            return;
        }
        let Some(address) = supplier.address.clone() else {
            return;
        };

        match self
            .geocoder
            .geocode(&address, supplier.post_code.as_deref())
        {
            Ok(point) => supplier.coords = Some(point),
            Err(err) => {
                warn!(siret = %supplier.siret, error = %err, "geocoding failed, coordinates left empty");
                supplier.coords = None;
            }
        }
    }

    fn prepare(&self, supplier: &mut Supplier, live: &[Supplier]) {
        let siblings = live
            .iter()
            .filter(|other| other.id != supplier.id && other.siren() == supplier.siren())
            .count() as u32;
        let etablissement_count = siblings + u32::from(supplier.is_live());

        supplier.counters =
            counters::recompute(supplier, etablissement_count, self.completion_threshold);
        supplier.search = SearchDocument::build(supplier, &self.taxonomy);
        supplier.updated_at = Utc::now();
    }
}

fn base_slug(supplier: &Supplier) -> String {
    let name = truncate_slug(&slugify(&supplier.name), SLUG_NAME_MAX_CHARS);
    match supplier.department.as_deref() {
        Some(department) => format!("{name}-{}", department.to_ascii_lowercase()),
        None => name,
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UniquenessConflict {
    #[error("brand '{0}' is already used by another live supplier")]
    Brand(String),
    #[error("slug '{0}' is still taken after disambiguation")]
    Slug(String),
}

/// Error raised by the supplier catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("invalid supplier: {0}")]
    Invalid(String),
    #[error(transparent)]
    Activity(#[from] ActivityError),
    #[error(transparent)]
    Uniqueness(#[from] UniquenessConflict),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
