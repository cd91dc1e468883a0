//! Reference data shared by the unit tests.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::perimeters::{GeoPoint, Perimeter, PerimeterRegistry};
use crate::suppliers::{
    CatalogError, GeoRange, Geocoder, GeocodingError, InMemorySupplierRepository, Supplier,
    SupplierActivity, SupplierCatalog,
};
use crate::taxonomy::{ServiceType, SupplierKind, Taxonomy};

pub(crate) const GRENOBLE: GeoPoint = GeoPoint::new(45.1885, 5.7245);
pub(crate) const ECHIROLLES: GeoPoint = GeoPoint::new(45.1436, 5.7189);
pub(crate) const LYON: GeoPoint = GeoPoint::new(45.7640, 4.8357);
pub(crate) const PARIS: GeoPoint = GeoPoint::new(48.8566, 2.3522);
pub(crate) const MARSEILLE: GeoPoint = GeoPoint::new(43.2965, 5.3698);

fn post_codes(codes: &[&str]) -> Vec<String> {
    codes.iter().map(|code| code.to_string()).collect()
}

/// Reference tables plus a handful of cities with coordinates.
pub(crate) fn perimeters() -> PerimeterRegistry {
    let mut registry = PerimeterRegistry::with_reference_tables();
    let cities = [
        Perimeter::city("38185", "Grenoble", "38", "84", post_codes(&["38000", "38100"]), Some(GRENOBLE)),
        Perimeter::city("38151", "Échirolles", "38", "84", post_codes(&["38130"]), Some(ECHIROLLES)),
        Perimeter::city("69123", "Lyon", "69", "84", post_codes(&["69001", "69002", "69003"]), Some(LYON)),
        Perimeter::city("75056", "Paris", "75", "11", post_codes(&["75001", "75002"]), Some(PARIS)),
        Perimeter::city("13055", "Marseille", "13", "93", post_codes(&["13001", "13002"]), Some(MARSEILLE)),
    ];
    for city in cities {
        registry.insert(city).expect("fixture city");
    }
    registry
}

/// Two groups, their sectors, one label and one network.
pub(crate) fn taxonomy() -> Taxonomy {
    let mut taxonomy = Taxonomy::new();
    taxonomy.add_group("Services").expect("group");
    taxonomy.add_group("Bâtiment").expect("group");
    taxonomy.add_sector(Some("services"), "Nettoyage").expect("sector");
    taxonomy.add_sector(Some("services"), "Blanchisserie").expect("sector");
    taxonomy.add_sector(Some("services"), "Espaces verts").expect("sector");
    taxonomy.add_sector(Some("services"), "Autre").expect("sector");
    taxonomy.add_sector(Some("batiment"), "Menuiserie").expect("sector");
    taxonomy.add_label("Qualiopi").expect("label");
    taxonomy.add_network("Réseau Inclusion").expect("network");
    taxonomy
}

pub(crate) fn activity(sector: &str, geo_range: GeoRange) -> SupplierActivity {
    SupplierActivity {
        sector: sector.to_string(),
        service_types: BTreeSet::from([ServiceType::Prest]),
        geo_range,
    }
}

pub(crate) fn zones(locations: &[&str]) -> GeoRange {
    GeoRange::Zones {
        locations: locations.iter().map(|slug| slug.to_string()).collect(),
    }
}

/// Live supplier located at a post code, with coordinates already set.
pub(crate) fn supplier_at(
    siret: &str,
    name: &str,
    kind: SupplierKind,
    post_code: &str,
    coords: Option<GeoPoint>,
) -> Supplier {
    let mut supplier = Supplier::new(siret, name, kind);
    supplier.post_code = Some(post_code.to_string());
    supplier.coords = coords;
    supplier.contact_email = Some(format!("contact@{}.fr", crate::text::slugify(name)));
    supplier
}

/// Never resolves anything.
pub(crate) struct OfflineGeocoder;

impl Geocoder for OfflineGeocoder {
    fn geocode(&self, _address: &str, _post_code: Option<&str>) -> Result<GeoPoint, GeocodingError> {
        Err(GeocodingError::Unavailable("offline".to_string()))
    }
}

/// Resolves every address to the same point.
pub(crate) struct FixedGeocoder(pub(crate) GeoPoint);

impl Geocoder for FixedGeocoder {
    fn geocode(&self, _address: &str, _post_code: Option<&str>) -> Result<GeoPoint, GeocodingError> {
        Ok(self.0)
    }
}

pub(crate) type Catalog = SupplierCatalog<InMemorySupplierRepository, OfflineGeocoder>;

pub(crate) fn catalog() -> (Catalog, Arc<InMemorySupplierRepository>) {
    let repository = Arc::new(InMemorySupplierRepository::default());
    let catalog = SupplierCatalog::new(
        repository.clone(),
        Arc::new(OfflineGeocoder),
        Arc::new(perimeters()),
        Arc::new(taxonomy()),
        80,
    );
    (catalog, repository)
}

pub(crate) fn create(catalog: &Catalog, supplier: Supplier) -> Supplier {
    match catalog.create(supplier) {
        Ok(stored) => stored,
        Err(CatalogError::Uniqueness(conflict)) => panic!("fixture conflict: {conflict}"),
        Err(other) => panic!("fixture supplier rejected: {other}"),
    }
}
