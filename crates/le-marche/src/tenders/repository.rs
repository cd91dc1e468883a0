use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::domain::{InteractionKind, Tender, TenderCounters, TenderId, TenderSupplier};
use crate::repository::{lock, HistoryAction, HistoryRecord, RepositoryError};
use crate::suppliers::SupplierId;

/// Storage for tenders and their candidate rows.
///
/// Counters are only ever written by recomputing them from the rows inside the
/// same critical section as the row change.
pub trait TenderRepository: Send + Sync {
    /// Assigns the id. Fails with `Conflict` when the slug is taken.
    fn insert(&self, tender: Tender) -> Result<Tender, RepositoryError>;
    fn fetch(&self, id: TenderId) -> Result<Option<Tender>, RepositoryError>;
    fn list(&self) -> Result<Vec<Tender>, RepositoryError>;

    /// Run `apply` on a copy of the tender while holding the store lock and commit
    /// the copy only when `apply` succeeds.
    fn update_with<F, T, E>(&self, id: TenderId, apply: F) -> Result<(Tender, T), E>
    where
        F: FnOnce(&mut Tender) -> Result<T, E>,
        E: From<RepositoryError>;

    /// Persist the candidate set once. Later calls leave the frozen set untouched
    /// and return zero.
    fn insert_candidates(
        &self,
        id: TenderId,
        suppliers: &[SupplierId],
    ) -> Result<usize, RepositoryError>;
    fn rows(&self, id: TenderId) -> Result<Vec<TenderSupplier>, RepositoryError>;
    fn all_rows(&self) -> Result<Vec<TenderSupplier>, RepositoryError>;

    /// First-wins interaction write. Returns whether the row changed.
    fn record_interaction(
        &self,
        id: TenderId,
        supplier: SupplierId,
        kind: InteractionKind,
        at: DateTime<Utc>,
        feedback: Option<String>,
    ) -> Result<bool, RepositoryError>;
    fn rebuild_counters(&self, id: TenderId) -> Result<TenderCounters, RepositoryError>;
    fn history(&self, id: TenderId) -> Result<Vec<HistoryRecord>, RepositoryError>;
}

#[derive(Default)]
struct TenderState {
    next_id: u64,
    tenders: BTreeMap<TenderId, Tender>,
    rows: BTreeMap<(TenderId, SupplierId), TenderSupplier>,
    frozen: BTreeSet<TenderId>,
    history: Vec<HistoryRecord>,
}

impl TenderState {
    fn recount(&mut self, id: TenderId) -> Result<TenderCounters, RepositoryError> {
        let counters = TenderCounters::aggregate(
            self.rows
                .range((id, SupplierId(0))..=(id, SupplierId(u64::MAX)))
                .map(|(_, row)| row),
        );
        let tender = self.tenders.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        tender.counters = counters;
        Ok(counters)
    }
}

/// Process-local store used by the API host and the tests.
#[derive(Default, Clone)]
pub struct InMemoryTenderRepository {
    state: Arc<Mutex<TenderState>>,
}

impl TenderRepository for InMemoryTenderRepository {
    fn insert(&self, mut tender: Tender) -> Result<Tender, RepositoryError> {
        let mut state = lock(&self.state, "tender store")?;
        if state.tenders.values().any(|existing| existing.slug == tender.slug) {
            return Err(RepositoryError::Conflict);
        }
        state.next_id += 1;
        tender.id = TenderId(state.next_id);
        let record = HistoryRecord::capture(tender.id.0, HistoryAction::Created, &tender)?;
        state.history.push(record);
        state.tenders.insert(tender.id, tender.clone());
        Ok(tender)
    }

    fn fetch(&self, id: TenderId) -> Result<Option<Tender>, RepositoryError> {
        let state = lock(&self.state, "tender store")?;
        Ok(state.tenders.get(&id).cloned())
    }

    fn list(&self) -> Result<Vec<Tender>, RepositoryError> {
        let state = lock(&self.state, "tender store")?;
        Ok(state.tenders.values().cloned().collect())
    }

    fn update_with<F, T, E>(&self, id: TenderId, apply: F) -> Result<(Tender, T), E>
    where
        F: FnOnce(&mut Tender) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        let mut state = lock(&self.state, "tender store")?;
        let current = state.tenders.get(&id).ok_or(RepositoryError::NotFound)?;
        let mut working = current.clone();
        let outcome = apply(&mut working)?;
        if &working != current {
            let record = HistoryRecord::capture(id.0, HistoryAction::Updated, &working)?;
            state.history.push(record);
            state.tenders.insert(id, working.clone());
        }
        Ok((working, outcome))
    }

    fn insert_candidates(
        &self,
        id: TenderId,
        suppliers: &[SupplierId],
    ) -> Result<usize, RepositoryError> {
        let mut state = lock(&self.state, "tender store")?;
        if !state.tenders.contains_key(&id) {
            return Err(RepositoryError::NotFound);
        }
        if !state.frozen.insert(id) {
            return Ok(0);
        }
        let mut inserted = 0;
        for supplier in suppliers {
            if state
                .rows
                .insert((id, *supplier), TenderSupplier::new(id, *supplier))
                .is_none()
            {
                inserted += 1;
            }
        }
        state.recount(id)?;
        Ok(inserted)
    }

    fn rows(&self, id: TenderId) -> Result<Vec<TenderSupplier>, RepositoryError> {
        let state = lock(&self.state, "tender store")?;
        Ok(state
            .rows
            .values()
            .filter(|row| row.tender_id == id)
            .cloned()
            .collect())
    }

    fn all_rows(&self) -> Result<Vec<TenderSupplier>, RepositoryError> {
        let state = lock(&self.state, "tender store")?;
        Ok(state.rows.values().cloned().collect())
    }

    fn record_interaction(
        &self,
        id: TenderId,
        supplier: SupplierId,
        kind: InteractionKind,
        at: DateTime<Utc>,
        feedback: Option<String>,
    ) -> Result<bool, RepositoryError> {
        let mut state = lock(&self.state, "tender store")?;
        let row = state
            .rows
            .get_mut(&(id, supplier))
            .ok_or(RepositoryError::NotFound)?;
        if !row.record(kind, at, feedback) {
            return Ok(false);
        }
        state.recount(id)?;
        Ok(true)
    }

    fn rebuild_counters(&self, id: TenderId) -> Result<TenderCounters, RepositoryError> {
        let mut state = lock(&self.state, "tender store")?;
        state.recount(id)
    }

    fn history(&self, id: TenderId) -> Result<Vec<HistoryRecord>, RepositoryError> {
        let state = lock(&self.state, "tender store")?;
        Ok(state
            .history
            .iter()
            .filter(|record| record.entity_id == id.0)
            .cloned()
            .collect())
    }
}

/// Outbound hook notified once per tender dispatch (e-mail or CRM adapters).
pub trait DispatchPublisher: Send + Sync {
    fn publish(&self, event: TenderDispatched) -> Result<(), DispatchError>;
}

/// Dispatch event consumed by the notification adapters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenderDispatched {
    pub tender_id: TenderId,
    pub candidate_supplier_ids: Vec<SupplierId>,
    pub partner_email_lists: Vec<Vec<String>>,
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("dispatch transport unavailable: {0}")]
    Transport(String),
}

/// Publisher that only writes the event to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDispatchPublisher;

impl DispatchPublisher for LogDispatchPublisher {
    fn publish(&self, event: TenderDispatched) -> Result<(), DispatchError> {
        info!(
            tender_id = %event.tender_id,
            candidates = event.candidate_supplier_ids.len(),
            partners = event.partner_email_lists.len(),
            "tender dispatched"
        );
        Ok(())
    }
}
