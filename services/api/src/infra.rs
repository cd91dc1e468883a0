use le_marche::config::MarketConfig;
use le_marche::error::AppError;
use le_marche::perimeters::{PerimeterKind, PerimeterRegistry};
use le_marche::potential::InclusivePotential;
use le_marche::reference::{import_perimeters_from_path, import_sectors_from_path};
use le_marche::search::SupplierSearch;
use le_marche::suppliers::{CityCentroidGeocoder, InMemorySupplierRepository, SupplierCatalog};
use le_marche::taxonomy::Taxonomy;
use le_marche::tenders::{
    InMemoryTenderRepository, LogDispatchPublisher, PartnerShareTender, TenderService,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type Suppliers = InMemorySupplierRepository;
pub(crate) type Catalog = SupplierCatalog<Suppliers, CityCentroidGeocoder>;
pub(crate) type Tenders = TenderService<InMemoryTenderRepository, Suppliers, LogDispatchPublisher>;

/// Every service of the process, wired over the in-memory stores.
pub(crate) struct Market {
    pub(crate) catalog: Arc<Catalog>,
    pub(crate) search: Arc<SupplierSearch<Suppliers>>,
    pub(crate) tenders: Arc<Tenders>,
    pub(crate) potential: Arc<InclusivePotential<Suppliers>>,
}

/// Optional reference files layered over the built-in department and region tables.
#[derive(Debug, Clone, Default)]
pub(crate) struct ReferenceSources {
    pub(crate) perimeters: Option<PathBuf>,
    pub(crate) sectors: Option<PathBuf>,
    pub(crate) partners: Option<PathBuf>,
}

pub(crate) fn build_market(
    config: &MarketConfig,
    sources: &ReferenceSources,
) -> Result<Market, AppError> {
    let mut perimeters = PerimeterRegistry::with_reference_tables();
    if let Some(path) = &sources.perimeters {
        let (loaded, summary) = import_perimeters_from_path(&perimeters, path)?;
        info!(path = %path.display(), inserted = summary.inserted, "perimeter file loaded");
        perimeters = loaded;
    }
    if perimeters.count(PerimeterKind::City) == 0 {
        warn!("no city perimeters loaded, radius searches will not match");
    }

    let taxonomy = match &sources.sectors {
        Some(path) => import_sectors_from_path(&Taxonomy::new(), path)?.0,
        None => {
            warn!("no sector file given, every sector lookup will fail");
            Taxonomy::new()
        }
    };

    let partners = match &sources.partners {
        Some(path) => load_partners(path)?,
        None => Vec::new(),
    };

    Ok(assemble(config, perimeters, taxonomy, partners))
}

pub(crate) fn assemble(
    config: &MarketConfig,
    perimeters: PerimeterRegistry,
    taxonomy: Taxonomy,
    partners: Vec<PartnerShareTender>,
) -> Market {
    let perimeters = Arc::new(perimeters);
    let taxonomy = Arc::new(taxonomy);
    let suppliers = Arc::new(Suppliers::default());

    let catalog = Arc::new(SupplierCatalog::new(
        suppliers.clone(),
        Arc::new(CityCentroidGeocoder::new(perimeters.clone())),
        perimeters.clone(),
        taxonomy.clone(),
        config.super_badge_completion_threshold,
    ));
    let search = Arc::new(SupplierSearch::new(
        suppliers,
        perimeters,
        taxonomy,
        config.search_page_size,
    ));
    let tenders = Arc::new(TenderService::new(
        Arc::new(InMemoryTenderRepository::default()),
        search.clone(),
        Arc::new(LogDispatchPublisher),
        Arc::new(partners),
        config.clone(),
    ));
    let potential = Arc::new(InclusivePotential::new(search.clone(), config.potential));

    Market {
        catalog,
        search,
        tenders,
        potential,
    }
}

fn load_partners(path: &Path) -> Result<Vec<PartnerShareTender>, AppError> {
    let raw = std::fs::read_to_string(path)?;
    let partners: Vec<PartnerShareTender> = serde_json::from_str(&raw)
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))?;
    info!(path = %path.display(), partners = partners.len(), "partner file loaded");
    Ok(partners)
}
