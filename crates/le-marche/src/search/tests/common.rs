use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::fixtures::{
    activity, catalog, create, perimeters, supplier_at, taxonomy, zones, Catalog, ECHIROLLES,
    GRENOBLE, MARSEILLE, PARIS,
};
use crate::perimeters::GeoPoint;
use crate::search::SupplierSearch;
use crate::suppliers::{GeoRange, InMemorySupplierRepository, Supplier};
use crate::taxonomy::SupplierKind;

pub(super) const CHAMBERY: GeoPoint = GeoPoint::new(45.5646, 5.9178);

pub(super) fn search_over(
    repository: Arc<InMemorySupplierRepository>,
    page_size: usize,
) -> SupplierSearch<InMemorySupplierRepository> {
    SupplierSearch::new(
        repository,
        Arc::new(perimeters()),
        Arc::new(taxonomy()),
        page_size,
    )
}

/// Six suppliers around Grenoble, one per way of reaching (or missing) the city.
pub(super) struct GrenobleMarket {
    pub(super) catalog: Catalog,
    pub(super) search: SupplierSearch<InMemorySupplierRepository>,
    pub(super) own_address: Supplier,
    pub(super) region_zone: Supplier,
    pub(super) department_zone: Supplier,
    pub(super) radius_reaching: Supplier,
    pub(super) radius_short: Supplier,
    pub(super) unrelated: Supplier,
}

pub(super) fn grenoble_market() -> GrenobleMarket {
    let (catalog, repository) = catalog();

    let mut own_address = supplier_at("11111111100011", "Atelier Grenoblois", SupplierKind::Ei, "38000", Some(GRENOBLE));
    own_address.activities = vec![activity("nettoyage", zones(&["bouches-du-rhone"]))];

    let mut region_zone = supplier_at("22222222200011", "Régie Provence", SupplierKind::Aci, "13001", Some(MARSEILLE));
    region_zone.activities = vec![activity("nettoyage", zones(&["auvergne-rhone-alpes"]))];

    let mut department_zone = supplier_at("33333333300011", "Paris Propreté", SupplierKind::Ea, "75001", Some(PARIS));
    department_zone.activities = vec![activity("nettoyage", zones(&["isere"]))];

    let mut radius_reaching = supplier_at("44444444400011", "Échirolles Services", SupplierKind::Esat, "38130", Some(ECHIROLLES));
    radius_reaching.activities = vec![activity("nettoyage", GeoRange::Custom { radius_km: 10.0 })];

    let mut radius_short = supplier_at("55555555500011", "Savoie Nettoyage", SupplierKind::Ei, "73000", Some(CHAMBERY));
    radius_short.activities = vec![activity("nettoyage", GeoRange::Custom { radius_km: 5.0 })];

    let mut unrelated = supplier_at("66666666600011", "Marseille Entretien", SupplierKind::Ai, "13002", Some(MARSEILLE));
    unrelated.activities = vec![activity("nettoyage", zones(&["paris"]))];

    let own_address = create(&catalog, own_address);
    let region_zone = create(&catalog, region_zone);
    let department_zone = create(&catalog, department_zone);
    let radius_reaching = create(&catalog, radius_reaching);
    let radius_short = create(&catalog, radius_short);
    let unrelated = create(&catalog, unrelated);

    GrenobleMarket {
        catalog,
        search: search_over(repository, 20),
        own_address,
        region_zone,
        department_zone,
        radius_reaching,
        radius_short,
        unrelated,
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
