use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::domain::{InteractionKind, Tender, TenderAction, TenderDraft, TenderId, TenderStatus, TenderSupplier};
use super::lifecycle::{InvalidTenderTransition, Transition};
use super::matching::tender_query;
use super::partners::{partner_email_lists, PartnerShareTender};
use super::reminders::{
    author_digest_due, interested_reminder_due, AuthorDigest, InterestedReminder, ReminderWindow,
};
use super::repository::{DispatchError, DispatchPublisher, TenderDispatched, TenderRepository};
use crate::config::MarketConfig;
use crate::repository::RepositoryError;
use crate::search::{SearchError, SupplierSearch};
use crate::suppliers::{SupplierId, SupplierRepository, SupplierTenderStats};
use crate::text::{random_suffix, slugify, truncate_slug};

const SLUG_TITLE_MAX_CHARS: usize = 50;

/// Drives tenders through their lifecycle and owns the matching pipeline.
pub struct TenderService<R, S, A> {
    repository: Arc<R>,
    search: Arc<SupplierSearch<S>>,
    publisher: Arc<A>,
    partners: Arc<Vec<PartnerShareTender>>,
    config: MarketConfig,
}

impl<R, S, A> TenderService<R, S, A>
where
    R: TenderRepository + 'static,
    S: SupplierRepository + 'static,
    A: DispatchPublisher + 'static,
{
    pub fn new(
        repository: Arc<R>,
        search: Arc<SupplierSearch<S>>,
        publisher: Arc<A>,
        partners: Arc<Vec<PartnerShareTender>>,
        config: MarketConfig,
    ) -> Self {
        Self {
            repository,
            search,
            publisher,
            partners,
            config,
        }
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    /// Store a new draft after checking every referenced slug.
    pub fn create(&self, draft: TenderDraft) -> Result<Tender, TenderServiceError> {
        if draft.title.trim().is_empty() {
            return Err(TenderServiceError::Invalid("title is required".to_string()));
        }
        if draft.distance_location_km.is_some_and(|km| km <= 0.0) {
            return Err(TenderServiceError::Invalid(
                "distance must be positive".to_string(),
            ));
        }

        let mut tender = Tender::from_draft(draft, Utc::now());
        self.check_referents(&tender)?;

        let base = truncate_slug(&slugify(&tender.title), SLUG_TITLE_MAX_CHARS);
        tender.slug = base.clone();
        let stored = match self.repository.insert(tender.clone()) {
            Err(RepositoryError::Conflict) => {
                tender.slug = format!("{base}-{}", random_suffix());
                self.repository.insert(tender)?
            }
            other => other?,
        };
        info!(tender_id = %stored.id, slug = %stored.slug, "tender created");
        Ok(stored)
    }

    pub fn get(&self, id: TenderId) -> Result<Tender, TenderServiceError> {
        Ok(self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?)
    }

    pub fn submit(&self, id: TenderId, actor: Option<&str>) -> Result<Tender, TenderServiceError> {
        self.transition(id, TenderAction::Submit, |tender, now| tender.submit(actor, now))
    }

    pub fn approve(&self, id: TenderId, actor: Option<&str>) -> Result<Tender, TenderServiceError> {
        self.transition(id, TenderAction::Approve, |tender, now| tender.approve(actor, now))
    }

    pub fn reject(&self, id: TenderId, actor: Option<&str>) -> Result<Tender, TenderServiceError> {
        self.transition(id, TenderAction::Reject, |tender, now| tender.reject(actor, now))
    }

    pub fn request_changes(
        &self,
        id: TenderId,
        actor: Option<&str>,
    ) -> Result<Tender, TenderServiceError> {
        self.transition(id, TenderAction::RequestChanges, |tender, now| {
            tender.request_changes(actor, now)
        })
    }

    /// Reject one draft left stale after a modification request.
    pub fn auto_reject(&self, id: TenderId, now: DateTime<Utc>) -> Result<Transition, TenderServiceError> {
        let days = self.config.stale_draft_days;
        let (_, outcome) = self
            .repository
            .update_with(id, |tender| -> Result<Transition, TenderServiceError> {
                Ok(tender.auto_reject(days, now)?)
            })?;
        if outcome.applied() {
            info!(tender_id = %id, "stale draft auto-rejected");
        }
        Ok(outcome)
    }

    /// Drafts whose modification request went unanswered for the configured delay.
    pub fn stale_drafts(&self, now: DateTime<Utc>) -> Result<Vec<TenderId>, TenderServiceError> {
        let days = self.config.stale_draft_days;
        Ok(self
            .repository
            .list()?
            .into_iter()
            .filter(|tender| tender.is_stale_draft(now, days))
            .map(|tender| tender.id)
            .collect())
    }

    /// Mark the tender sent, freeze its candidate set and notify the adapters.
    ///
    /// Repeating the call returns the frozen candidates without publishing again.
    pub fn dispatch(
        &self,
        id: TenderId,
        actor: Option<&str>,
    ) -> Result<TenderDispatched, TenderServiceError> {
        let tender = self.get(id)?;
        let candidates = self.match_candidates(&tender)?;

        let (tender, outcome) = self
            .repository
            .update_with(id, |tender| -> Result<Transition, TenderServiceError> {
                Ok(tender.mark_sent(actor, Utc::now())?)
            })?;
        if outcome.applied() {
            self.repository.insert_candidates(id, &candidates)?;
        }

        let event = TenderDispatched {
            tender_id: id,
            candidate_supplier_ids: self
                .repository
                .rows(id)?
                .into_iter()
                .map(|row| row.supplier_id)
                .collect(),
            partner_email_lists: partner_email_lists(
                &self.partners,
                &tender,
                self.search.perimeters(),
            ),
        };
        if outcome.applied() {
            self.publisher.publish(event.clone())?;
            info!(
                tender_id = %id,
                candidates = event.candidate_supplier_ids.len(),
                "tender sent"
            );
        } else {
            debug!(tender_id = %id, "tender already sent, candidate set unchanged");
        }
        Ok(event)
    }

    /// Live suppliers matching the tender and reachable by e-mail.
    pub fn match_candidates(&self, tender: &Tender) -> Result<Vec<SupplierId>, TenderServiceError> {
        let query = tender_query(tender, self.search.perimeters().country_slug());
        Ok(self
            .search
            .candidates(&query)?
            .into_iter()
            .filter(|supplier| supplier.has_contact_email())
            .map(|supplier| supplier.id)
            .collect())
    }

    /// Idempotent interaction ingestion. Returns whether anything changed.
    pub fn record_interaction(
        &self,
        id: TenderId,
        supplier: SupplierId,
        kind: InteractionKind,
        at: DateTime<Utc>,
        feedback: Option<String>,
    ) -> Result<bool, TenderServiceError> {
        let changed = self
            .repository
            .record_interaction(id, supplier, kind, at, feedback)?;
        debug!(tender_id = %id, supplier_id = %supplier, kind = kind.label(), changed, "interaction recorded");
        Ok(changed)
    }

    pub fn rows(&self, id: TenderId) -> Result<Vec<TenderSupplier>, TenderServiceError> {
        Ok(self.repository.rows(id)?)
    }

    /// Candidates of sent tenders whose contact click fell in the reminder window.
    pub fn interested_reminders(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<InterestedReminder>, TenderServiceError> {
        let Some(window) =
            ReminderWindow::looking_back(now, self.config.reminder_days_since_contact_click)
        else {
            return Ok(Vec::new());
        };
        let mut reminders = Vec::new();
        for tender in self.sent_tenders()? {
            for row in self.repository.rows(tender.id)? {
                if interested_reminder_due(&tender, &row, &window, now) {
                    reminders.push(InterestedReminder {
                        tender_id: tender.id,
                        supplier_id: row.supplier_id,
                    });
                }
            }
        }
        Ok(reminders)
    }

    /// Top suppliers for buyers whose tender drew no contact click since dispatch.
    /// Digests holding fewer than two suppliers are not sent.
    pub fn author_digests(&self, now: DateTime<Utc>) -> Result<Vec<AuthorDigest>, TenderServiceError> {
        let Some(window) = ReminderWindow::looking_back(now, self.config.digest_days_since_sent)
        else {
            return Ok(Vec::new());
        };
        let mut digests = Vec::new();
        for tender in self.sent_tenders()? {
            let rows = self.repository.rows(tender.id)?;
            if !author_digest_due(&tender, &rows, &window) {
                continue;
            }
            let among: BTreeSet<SupplierId> = rows.iter().map(|row| row.supplier_id).collect();
            let query = tender_query(&tender, self.search.perimeters().country_slug());
            let suppliers = self
                .search
                .top_among(&query, &among, self.config.digest_top_k)?;
            if suppliers.len() < 2 {
                continue;
            }
            digests.push(AuthorDigest {
                tender_id: tender.id,
                author: tender.author.clone(),
                suppliers,
            });
        }
        Ok(digests)
    }

    /// Interaction totals per supplier across every candidate row.
    pub fn supplier_tender_stats(
        &self,
    ) -> Result<BTreeMap<SupplierId, SupplierTenderStats>, TenderServiceError> {
        let mut stats: BTreeMap<SupplierId, SupplierTenderStats> = BTreeMap::new();
        for row in self.repository.all_rows()? {
            let entry = stats.entry(row.supplier_id).or_default();
            entry.tender_count += 1;
            entry.email_send_count += u32::from(row.email_send_date.is_some());
            entry.email_link_click_count += u32::from(row.email_link_click_date.is_some());
            entry.detail_display_count += u32::from(row.detail_display_date.is_some());
            entry.detail_contact_click_count += u32::from(row.detail_contact_click_date.is_some());
            entry.detail_not_interested_count +=
                u32::from(row.detail_not_interested_click_date.is_some());
        }
        Ok(stats)
    }

    fn sent_tenders(&self) -> Result<Vec<Tender>, RepositoryError> {
        Ok(self
            .repository
            .list()?
            .into_iter()
            .filter(|tender| tender.status == TenderStatus::Sent)
            .collect())
    }

    fn transition<F>(
        &self,
        id: TenderId,
        action: TenderAction,
        apply: F,
    ) -> Result<Tender, TenderServiceError>
    where
        F: FnOnce(&mut Tender, DateTime<Utc>) -> Result<Transition, InvalidTenderTransition>,
    {
        let now = Utc::now();
        let result = self
            .repository
            .update_with(id, |tender| -> Result<Transition, TenderServiceError> {
                Ok(apply(tender, now)?)
            });
        match result {
            Ok((tender, outcome)) => {
                info!(
                    tender_id = %id,
                    action = action.label(),
                    status = tender.status.label(),
                    applied = outcome.applied(),
                    "tender transition"
                );
                Ok(tender)
            }
            Err(err) => {
                warn!(tender_id = %id, action = action.label(), error = %err, "tender transition refused");
                Err(err)
            }
        }
    }

    fn check_referents(&self, tender: &Tender) -> Result<(), TenderServiceError> {
        let taxonomy = self.search.taxonomy();
        let perimeters = self.search.perimeters();
        for slug in &tender.sectors {
            if taxonomy.sector(slug).is_err() {
                return Err(unknown("sector", slug));
            }
        }
        for slug in tender.perimeters.iter().chain(tender.location.iter()) {
            if perimeters.get(slug).is_none() {
                return Err(unknown("perimeter", slug));
            }
        }
        Ok(())
    }
}

fn unknown(kind: &'static str, slug: &str) -> TenderServiceError {
    TenderServiceError::Search(SearchError::UnknownReferent {
        kind,
        slug: slug.to_string(),
    })
}

/// Error raised by the tender service.
#[derive(Debug, thiserror::Error)]
pub enum TenderServiceError {
    #[error("invalid tender: {0}")]
    Invalid(String),
    #[error(transparent)]
    Transition(#[from] InvalidTenderTransition),
    #[error(transparent)]
    Search(#[from] SearchError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}
