use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::config::MarketConfig;
use crate::fixtures::{activity, catalog, create, perimeters, supplier_at, taxonomy, zones, Catalog, ECHIROLLES, GRENOBLE, LYON};
use crate::search::SupplierSearch;
use crate::suppliers::{GeoRange, InMemorySupplierRepository, Supplier};
use crate::taxonomy::SupplierKind;
use crate::tenders::{
    DispatchError, DispatchPublisher, InMemoryTenderRepository, PartnerShareTender, Tender,
    TenderDispatched, TenderDraft, TenderService,
};

/// Keeps every published event for assertions.
#[derive(Default)]
pub(super) struct RecordingPublisher {
    pub(super) events: Mutex<Vec<TenderDispatched>>,
}

impl RecordingPublisher {
    pub(super) fn published(&self) -> Vec<TenderDispatched> {
        self.events.lock().expect("publisher lock").clone()
    }
}

impl DispatchPublisher for RecordingPublisher {
    fn publish(&self, event: TenderDispatched) -> Result<(), DispatchError> {
        self.events.lock().expect("publisher lock").push(event);
        Ok(())
    }
}

pub(super) type Service =
    TenderService<InMemoryTenderRepository, InMemorySupplierRepository, RecordingPublisher>;

/// Suppliers around Grenoble plus the tender service wired over them.
pub(super) struct TenderMarket {
    pub(super) catalog: Catalog,
    pub(super) service: Arc<Service>,
    pub(super) publisher: Arc<RecordingPublisher>,
    pub(super) grenoble: Supplier,
    pub(super) echirolles: Supplier,
    pub(super) lyon: Supplier,
    pub(super) unreachable: Supplier,
    pub(super) laundry: Supplier,
}

pub(super) fn tender_market() -> TenderMarket {
    let (catalog, repository) = catalog();

    let mut grenoble = supplier_at("11111111100011", "Atelier Grenoblois", SupplierKind::Ei, "38000", Some(GRENOBLE));
    grenoble.activities = vec![activity("nettoyage", zones(&["isere"]))];

    let mut echirolles = supplier_at("22222222200011", "Échirolles Services", SupplierKind::Esat, "38130", Some(ECHIROLLES));
    echirolles.activities = vec![activity("nettoyage", GeoRange::Custom { radius_km: 10.0 })];

    let mut lyon = supplier_at("33333333300011", "Lyon Propreté", SupplierKind::Aci, "69001", Some(LYON));
    lyon.activities = vec![activity("nettoyage", zones(&["rhone"]))];

    let mut unreachable = supplier_at("44444444400011", "Sans Courriel", SupplierKind::Ai, "38000", Some(GRENOBLE));
    unreachable.activities = vec![activity("nettoyage", zones(&["isere"]))];
    unreachable.contact_email = None;

    let mut laundry = supplier_at("55555555500011", "Blanchisserie du Drac", SupplierKind::Ea, "38000", Some(GRENOBLE));
    laundry.activities = vec![activity("blanchisserie", zones(&["isere"]))];

    let grenoble = create(&catalog, grenoble);
    let echirolles = create(&catalog, echirolles);
    let lyon = create(&catalog, lyon);
    let unreachable = create(&catalog, unreachable);
    let laundry = create(&catalog, laundry);

    let publisher = Arc::new(RecordingPublisher::default());
    let search = Arc::new(SupplierSearch::new(
        repository,
        Arc::new(perimeters()),
        Arc::new(taxonomy()),
        20,
    ));
    let partners = vec![
        PartnerShareTender {
            name: "Réseau Isère".to_string(),
            perimeters: vec!["isere".to_string()],
            amount_in: None,
            contact_emails: vec!["isere@partenaire.fr".to_string()],
        },
        PartnerShareTender {
            name: "Réseau Rhône".to_string(),
            perimeters: vec!["rhone".to_string()],
            amount_in: None,
            contact_emails: vec!["rhone@partenaire.fr".to_string()],
        },
    ];
    let service = Arc::new(TenderService::new(
        Arc::new(InMemoryTenderRepository::default()),
        search,
        publisher.clone(),
        Arc::new(partners),
        MarketConfig::default(),
    ));

    TenderMarket {
        catalog,
        service,
        publisher,
        grenoble,
        echirolles,
        lyon,
        unreachable,
        laundry,
    }
}

pub(super) fn cleaning_draft(perimeters: &[&str]) -> TenderDraft {
    TenderDraft {
        title: "Nettoyage des écoles".to_string(),
        author: "acheteur@grenoble.fr".to_string(),
        sectors: vec!["nettoyage".to_string()],
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

/// Create, submit and approve a draft.
pub(super) fn validated(service: &Service, draft: TenderDraft) -> Tender {
    let tender = service.create(draft).expect("created");
    service.submit(tender.id, Some("acheteur")).expect("submitted");
    service.approve(tender.id, Some("admin")).expect("approved")
}

/// 2024-03-04 is a Monday, 2024-03-09 a Saturday.
pub(super) fn march(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
