use std::sync::Arc;

use crate::config::PotentialLimits;
use crate::fixtures::{activity, catalog, create, perimeters, supplier_at, taxonomy, zones, Catalog, GRENOBLE};
use crate::potential::InclusivePotential;
use crate::search::SupplierSearch;
use crate::suppliers::{GeoRange, InMemorySupplierRepository};
use crate::taxonomy::SupplierKind;

pub(super) struct PotentialMarket {
    pub(super) catalog: Catalog,
    pub(super) potential: Arc<InclusivePotential<InMemorySupplierRepository>>,
}

/// `count` cleaning suppliers in Grenoble declaring `revenue`; every fifth one is an ESAT.
pub(super) fn cleaning_market(count: usize, revenue: Option<u64>) -> PotentialMarket {
    let (catalog, repository) = catalog();
    for index in 0..count {
        let kind = if index % 5 == 4 {
            SupplierKind::Esat
        } else {
            SupplierKind::Ei
        };
        let siret = format!("{:09}00011", index + 1);
        let mut supplier = supplier_at(&siret, &format!("Atelier {index}"), kind, "38000", Some(GRENOBLE));
        supplier.activities = vec![activity("nettoyage", zones(&["isere"]))];
        supplier.ca = revenue;
        supplier.employees_insertion_count = Some(4);
        create(&catalog, supplier);
    }
    let search = Arc::new(SupplierSearch::new(
        repository,
        Arc::new(perimeters()),
        Arc::new(taxonomy()),
        20,
    ));
    PotentialMarket {
        catalog,
        potential: Arc::new(InclusivePotential::new(search, PotentialLimits::default())),
    }
}

/// Nationwide cleaning supplier based in Paris.
pub(super) fn add_nationwide(market: &PotentialMarket, siret: &str) {
    let mut supplier = supplier_at(siret, "Propreté Nationale", SupplierKind::Ea, "75001", None);
    supplier.activities = vec![activity("nettoyage", GeoRange::Country)];
    create(&market.catalog, supplier);
}
