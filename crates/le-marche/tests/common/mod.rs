#![allow(dead_code)]

use std::collections::BTreeSet;
use std::sync::Arc;

use le_marche::config::MarketConfig;
use le_marche::perimeters::PerimeterRegistry;
use le_marche::potential::InclusivePotential;
use le_marche::reference::{import_perimeters, import_sectors};
use le_marche::search::SupplierSearch;
use le_marche::suppliers::{
    CityCentroidGeocoder, GeoRange, InMemorySupplierRepository, Supplier, SupplierActivity,
    SupplierCatalog,
};
use le_marche::taxonomy::{ServiceType, SupplierKind, Taxonomy};
use le_marche::tenders::{InMemoryTenderRepository, LogDispatchPublisher, TenderDraft, TenderService};

const PERIMETERS: &str = "\
kind,name,slug,code,department_code,region_code,post_codes,latitude,longitude
CITY,Grenoble,,38185,38,84,38000|38100,45.1885,5.7245
CITY,Échirolles,,38151,38,84,38130,45.1436,5.7189
CITY,Chamrousse,,38567,38,84,38410,45.1253,5.8760
CITY,Lyon,,69123,69,84,69001|69002,45.7640,4.8357
CITY,Paris,,75056,75,11,75001|75002,48.8566,2.3522
";

const SECTORS: &str = "\
group,name
Services,Nettoyage
Services,Blanchisserie
Services,Espaces verts
Restauration,Traiteur
";

pub type Catalog = SupplierCatalog<InMemorySupplierRepository, CityCentroidGeocoder>;
pub type Tenders =
    TenderService<InMemoryTenderRepository, InMemorySupplierRepository, LogDispatchPublisher>;

/// Catalog, search, tender and potential services over reference data loaded from CSV.
pub struct Market {
    pub catalog: Catalog,
    pub search: Arc<SupplierSearch<InMemorySupplierRepository>>,
    pub tenders: Tenders,
    pub potential: InclusivePotential<InMemorySupplierRepository>,
    pub config: MarketConfig,
}

pub fn market() -> Market {
    let (perimeters, _) = import_perimeters(
        &PerimeterRegistry::with_reference_tables(),
        PERIMETERS.as_bytes(),
    )
    .expect("perimeters load");
    let (taxonomy, _) = import_sectors(&Taxonomy::new(), SECTORS.as_bytes()).expect("sectors load");
    let perimeters = Arc::new(perimeters);
    let taxonomy = Arc::new(taxonomy);
    let config = MarketConfig::default();

    let repository = Arc::new(InMemorySupplierRepository::default());
    let catalog = SupplierCatalog::new(
        repository.clone(),
        Arc::new(CityCentroidGeocoder::new(perimeters.clone())),
        perimeters.clone(),
        taxonomy.clone(),
        config.super_badge_completion_threshold,
    );
    let search = Arc::new(SupplierSearch::new(
        repository,
        perimeters,
        taxonomy,
        config.search_page_size,
    ));
    let tenders = TenderService::new(
        Arc::new(InMemoryTenderRepository::default()),
        search.clone(),
        Arc::new(LogDispatchPublisher),
        Arc::new(Vec::new()),
        config.clone(),
    );
    let potential = InclusivePotential::new(search.clone(), config.potential);

    Market {
        catalog,
        search,
        tenders,
        potential,
        config,
    }
}

pub fn activity(sector: &str, geo_range: GeoRange) -> SupplierActivity {
    SupplierActivity {
        sector: sector.to_string(),
        service_types: BTreeSet::from([ServiceType::Prest]),
        geo_range,
    }
}

pub fn zones(slugs: &[&str]) -> GeoRange {
    GeoRange::Zones {
        locations: slugs.iter().map(|slug| slug.to_string()).collect(),
    }
}

/// Supplier with a street address in `post_code`; coordinates come from the geocoder.
pub fn supplier(
    siret: &str,
    name: &str,
    kind: SupplierKind,
    post_code: &str,
    activities: Vec<SupplierActivity>,
) -> Supplier {
    let mut supplier = Supplier::new(siret, name, kind);
    supplier.address = Some("1 place de la Mairie".to_string());
    supplier.post_code = Some(post_code.to_string());
    supplier.contact_email = Some(format!("contact@{siret}.fr"));
    supplier.activities = activities;
    supplier
}

pub fn draft(title: &str, sectors: &[&str], perimeters: &[&str]) -> TenderDraft {
    TenderDraft {
        title: title.to_string(),
        author: "acheteur@isere.fr".to_string(),
        sectors: sectors.iter().map(|slug| slug.to_string()).collect(),
        perimeters: perimeters.iter().map(|slug| slug.to_string()).collect(),
        location: None,
        distance_location_km: None,
        is_country_area: false,
        include_country_area: false,
        kinds: Vec::new(),
        service_types: Vec::new(),
        deadline: None,
        amount: None,
    }
}
