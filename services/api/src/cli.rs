use crate::infra::{build_market, ReferenceSources};
use crate::server;
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use le_marche::config::AppConfig;
use le_marche::error::AppError;
use le_marche::maintenance::{
    auto_reject_stale_drafts, rebuild_tender_counters, refresh_supplier_tender_stats,
    MaintenanceReport,
};
use le_marche::perimeters::{PerimeterKind, PerimeterRegistry};
use le_marche::reference::{import_perimeters_from_path, import_sectors_from_path};
use le_marche::taxonomy::Taxonomy;
use le_marche::telemetry;
use serde_json::json;
use std::path::PathBuf;
use tracing::warn;

#[derive(Parser, Debug)]
#[command(
    name = "le-marche",
    about = "Serve and maintain the inclusive procurement matching engine",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Run a batch maintenance task
    Maintenance {
        #[command(subcommand)]
        command: MaintenanceCommand,
    },
    /// Validate reference data files
    Reference {
        #[command(subcommand)]
        command: ReferenceCommand,
    },
}

#[derive(Subcommand, Debug)]
enum MaintenanceCommand {
    /// Recompute tender counters from their candidate rows
    RebuildTenderCounters(ReferenceArgs),
    /// Reject drafts left unanswered after a modification request
    RejectStaleDrafts(ReferenceArgs),
    /// Copy tender interaction totals onto suppliers
    RefreshSupplierStats(ReferenceArgs),
}

#[derive(Subcommand, Debug)]
enum ReferenceCommand {
    /// Load both files and report what they hold without serving anything
    Check(CheckArgs),
}

#[derive(Args, Debug, Default, Clone)]
pub(crate) struct ReferenceArgs {
    /// Perimeter CSV (kind,name,slug,code,department_code,region_code,post_codes,latitude,longitude)
    #[arg(long)]
    pub(crate) perimeters: Option<PathBuf>,
    /// Sector CSV (group,name)
    #[arg(long)]
    pub(crate) sectors: Option<PathBuf>,
    /// Partner JSON list receiving dispatched tenders
    #[arg(long)]
    pub(crate) partners: Option<PathBuf>,
}

impl From<ReferenceArgs> for ReferenceSources {
    fn from(args: ReferenceArgs) -> Self {
        Self {
            perimeters: args.perimeters,
            sectors: args.sectors,
            partners: args.partners,
        }
    }
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    #[command(flatten)]
    pub(crate) reference: ReferenceArgs,
}

#[derive(Args, Debug)]
struct CheckArgs {
    #[arg(long)]
    perimeters: PathBuf,
    #[arg(long)]
    sectors: PathBuf,
}

pub(crate) async fn run() -> Result<i32, AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    match command {
        Command::Serve(args) => server::run(config, args).await.map(|()| 0),
        Command::Maintenance { command } => run_maintenance(&config, command),
        Command::Reference {
            command: ReferenceCommand::Check(args),
        } => check_reference(args),
    }
}

fn run_maintenance(config: &AppConfig, command: MaintenanceCommand) -> Result<i32, AppError> {
    let report: MaintenanceReport = match command {
        MaintenanceCommand::RebuildTenderCounters(args) => {
            let market = build_market(&config.market, &args.into())?;
            rebuild_tender_counters(market.tenders.repository().as_ref())
        }
        MaintenanceCommand::RejectStaleDrafts(args) => {
            let market = build_market(&config.market, &args.into())?;
            auto_reject_stale_drafts(&market.tenders, Utc::now())
        }
        MaintenanceCommand::RefreshSupplierStats(args) => {
            let market = build_market(&config.market, &args.into())?;
            refresh_supplier_tender_stats(&market.tenders, &market.catalog)
        }
    };
    if let Some(err) = report.error() {
        warn!(error = %err, "maintenance task incomplete");
    }
    println!("{}", json!(report));
    Ok(report.exit_code)
}

fn check_reference(args: CheckArgs) -> Result<i32, AppError> {
    let (perimeters, perimeter_summary) =
        import_perimeters_from_path(&PerimeterRegistry::with_reference_tables(), &args.perimeters)?;
    let (taxonomy, sector_summary) = import_sectors_from_path(&Taxonomy::new(), &args.sectors)?;
    let payload = json!({
        "perimeters": {
            "inserted": perimeter_summary.inserted,
            "unchanged": perimeter_summary.unchanged,
            "regions": perimeters.count(PerimeterKind::Region),
            "departments": perimeters.count(PerimeterKind::Department),
            "cities": perimeters.count(PerimeterKind::City),
        },
        "sectors": {
            "inserted": sector_summary.inserted,
            "total": taxonomy.sector_count(),
        },
    });
    println!("{payload}");
    Ok(0)
}
