use std::sync::Arc;

use crate::fixtures::{perimeters, taxonomy, FixedGeocoder, OfflineGeocoder};
use crate::perimeters::GeoPoint;
use crate::repository::{HistoryRecord, RepositoryError};
use crate::suppliers::{
    InMemorySupplierRepository, Supplier, SupplierCatalog, SupplierId, SupplierRepository,
};

pub(super) fn geocoding_catalog(
    point: GeoPoint,
) -> (
    SupplierCatalog<InMemorySupplierRepository, FixedGeocoder>,
    Arc<InMemorySupplierRepository>,
) {
    let repository = Arc::new(InMemorySupplierRepository::default());
    let catalog = SupplierCatalog::new(
        repository.clone(),
        Arc::new(FixedGeocoder(point)),
        Arc::new(perimeters()),
        Arc::new(taxonomy()),
        80,
    );
    (catalog, repository)
}

pub(super) fn unavailable_catalog() -> SupplierCatalog<UnavailableRepository, OfflineGeocoder> {
    SupplierCatalog::new(
        Arc::new(UnavailableRepository),
        Arc::new(OfflineGeocoder),
        Arc::new(perimeters()),
        Arc::new(taxonomy()),
        80,
    )
}

pub(super) struct UnavailableRepository;

impl SupplierRepository for UnavailableRepository {
    fn insert(&self, _supplier: Supplier) -> Result<Supplier, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _supplier: Supplier) -> Result<Supplier, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn delete(&self, _id: SupplierId) -> Result<Supplier, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: SupplierId) -> Result<Option<Supplier>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self) -> Result<Vec<Supplier>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn history(&self, _id: SupplierId) -> Result<Vec<HistoryRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}
