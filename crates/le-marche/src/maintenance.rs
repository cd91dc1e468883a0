//! Batch jobs run from the command line. Each job walks its rows independently:
//! a failing row is logged and counted, the others still go through.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::suppliers::{Geocoder, SupplierCatalog, SupplierRepository};
use crate::tenders::{DispatchPublisher, TenderRepository, TenderService};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MaintenanceTask {
    RebuildTenderCounters,
    RejectStaleDrafts,
    RefreshSupplierStats,
}

impl MaintenanceTask {
    pub const fn label(self) -> &'static str {
        match self {
            MaintenanceTask::RebuildTenderCounters => "rebuild-tender-counters",
            MaintenanceTask::RejectStaleDrafts => "reject-stale-drafts",
            MaintenanceTask::RefreshSupplierStats => "refresh-supplier-stats",
        }
    }
}

impl fmt::Display for MaintenanceTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Job outcome. Exit code 0 on success, 1 when some rows failed, 2 when the job could
/// not start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaintenanceReport {
    pub task: MaintenanceTask,
    pub processed: usize,
    pub failed: usize,
    pub exit_code: i32,
}

impl MaintenanceReport {
    fn finished(task: MaintenanceTask, processed: usize, failed: usize) -> Self {
        let report = Self {
            task,
            processed,
            failed,
            exit_code: if failed == 0 { 0 } else { 1 },
        };
        info!(task = %task, processed, failed, "maintenance task finished");
        report
    }

    fn fatal(task: MaintenanceTask, reason: &dyn fmt::Display) -> Self {
        error!(task = %task, error = %reason, "maintenance task aborted");
        Self {
            task,
            processed: 0,
            failed: 0,
            exit_code: 2,
        }
    }

    pub fn error(&self) -> Option<MaintenanceError> {
        match self.exit_code {
            0 => None,
            1 => Some(MaintenanceError::PartialAggregation {
                task: self.task,
                processed: self.processed,
                failed: self.failed,
            }),
            _ => Some(MaintenanceError::Precondition { task: self.task }),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MaintenanceError {
    #[error("{task}: {failed} of {} rows failed", .processed + .failed)]
    PartialAggregation {
        task: MaintenanceTask,
        processed: usize,
        failed: usize,
    },
    #[error("{task}: aborted before processing any row")]
    Precondition { task: MaintenanceTask },
}

/// Recompute every tender's counters from its candidate rows.
pub fn rebuild_tender_counters<R: TenderRepository>(repository: &R) -> MaintenanceReport {
    let task = MaintenanceTask::RebuildTenderCounters;
    let tenders = match repository.list() {
        Ok(tenders) => tenders,
        Err(err) => return MaintenanceReport::fatal(task, &err),
    };
    let (mut processed, mut failed) = (0, 0);
    for tender in tenders {
        match repository.rebuild_counters(tender.id) {
            Ok(_) => processed += 1,
            Err(err) => {
                warn!(tender_id = %tender.id, error = %err, "counter rebuild failed");
                failed += 1;
            }
        }
    }
    MaintenanceReport::finished(task, processed, failed)
}

/// Reject drafts left without an answer after a modification request.
pub fn auto_reject_stale_drafts<R, S, A>(
    service: &TenderService<R, S, A>,
    now: DateTime<Utc>,
) -> MaintenanceReport
where
    R: TenderRepository + 'static,
    S: SupplierRepository + 'static,
    A: DispatchPublisher + 'static,
{
    let task = MaintenanceTask::RejectStaleDrafts;
    let stale = match service.stale_drafts(now) {
        Ok(stale) => stale,
        Err(err) => return MaintenanceReport::fatal(task, &err),
    };
    let (mut processed, mut failed) = (0, 0);
    for id in stale {
        match service.auto_reject(id, now) {
            Ok(_) => processed += 1,
            Err(err) => {
                warn!(tender_id = %id, error = %err, "stale draft rejection failed");
                failed += 1;
            }
        }
    }
    MaintenanceReport::finished(task, processed, failed)
}

/// Copy interaction totals onto every live supplier, zeroing those without rows.
pub fn refresh_supplier_tender_stats<R, S, A, G>(
    tenders: &TenderService<R, S, A>,
    catalog: &SupplierCatalog<S, G>,
) -> MaintenanceReport
where
    R: TenderRepository + 'static,
    S: SupplierRepository + 'static,
    A: DispatchPublisher + 'static,
    G: Geocoder + 'static,
{
    let task = MaintenanceTask::RefreshSupplierStats;
    let (stats, suppliers) = match (tenders.supplier_tender_stats(), catalog.live()) {
        (Ok(stats), Ok(suppliers)) => (stats, suppliers),
        (Err(err), _) => return MaintenanceReport::fatal(task, &err),
        (_, Err(err)) => return MaintenanceReport::fatal(task, &err),
    };
    let (mut processed, mut failed) = (0, 0);
    for supplier in suppliers {
        let fresh = stats.get(&supplier.id).copied().unwrap_or_default();
        if fresh == supplier.tender_stats {
            processed += 1;
            continue;
        }
        match catalog.apply_tender_stats(supplier.id, fresh) {
            Ok(_) => processed += 1,
            Err(err) => {
                warn!(supplier_id = %supplier.id, error = %err, "supplier stats refresh failed");
                failed += 1;
            }
        }
    }
    MaintenanceReport::finished(task, processed, failed)
}
