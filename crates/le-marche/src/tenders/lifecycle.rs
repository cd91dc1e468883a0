use chrono::{DateTime, Duration, Utc};

use super::domain::{Tender, TenderAction, TenderLogEntry, TenderStatus};

/// Outcome of a transition request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied,
    /// The tender already sits in the target state; nothing was written.
    AlreadyApplied,
}

impl Transition {
    pub fn applied(self) -> bool {
        matches!(self, Transition::Applied)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot {} a tender in status {}", .action.label(), .from.label())]
pub struct InvalidTenderTransition {
    pub from: TenderStatus,
    pub action: TenderAction,
}

impl Tender {
    /// DRAFT → PENDING_VALIDATION.
    pub fn submit(
        &mut self,
        actor: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Transition, InvalidTenderTransition> {
        let outcome = self.step(
            TenderAction::Submit,
            TenderStatus::Draft,
            TenderStatus::PendingValidation,
            actor,
            now,
        )?;
        if outcome.applied() {
            self.email_sent_for_modification = false;
        }
        Ok(outcome)
    }

    /// PENDING_VALIDATION → VALIDATED, stamping `validated_at`.
    pub fn approve(
        &mut self,
        actor: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Transition, InvalidTenderTransition> {
        let outcome = self.step(
            TenderAction::Approve,
            TenderStatus::PendingValidation,
            TenderStatus::Validated,
            actor,
            now,
        )?;
        if outcome.applied() {
            self.validated_at = Some(now);
        }
        Ok(outcome)
    }

    /// PENDING_VALIDATION → REJECTED.
    pub fn reject(
        &mut self,
        actor: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Transition, InvalidTenderTransition> {
        self.step(
            TenderAction::Reject,
            TenderStatus::PendingValidation,
            TenderStatus::Rejected,
            actor,
            now,
        )
    }

    /// VALIDATED → DRAFT with the author notified. The journal entry dates the request.
    pub fn request_changes(
        &mut self,
        actor: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Transition, InvalidTenderTransition> {
        if self.status == TenderStatus::Draft {
            if self.email_sent_for_modification {
                return Ok(Transition::AlreadyApplied);
            }
            return Err(InvalidTenderTransition {
                from: self.status,
                action: TenderAction::RequestChanges,
            });
        }
        let outcome = self.step(
            TenderAction::RequestChanges,
            TenderStatus::Validated,
            TenderStatus::Draft,
            actor,
            now,
        )?;
        self.email_sent_for_modification = true;
        Ok(outcome)
    }

    /// VALIDATED → SENT. `first_sent_at` is stamped once and never moved.
    pub fn mark_sent(
        &mut self,
        actor: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Transition, InvalidTenderTransition> {
        let outcome = self.step(
            TenderAction::Dispatch,
            TenderStatus::Validated,
            TenderStatus::Sent,
            actor,
            now,
        )?;
        if self.first_sent_at.is_none() {
            self.first_sent_at = Some(now);
        }
        Ok(outcome)
    }

    /// DRAFT left untouched `days` after a modification request → REJECTED.
    pub fn auto_reject(
        &mut self,
        days: i64,
        now: DateTime<Utc>,
    ) -> Result<Transition, InvalidTenderTransition> {
        if self.status == TenderStatus::Rejected {
            return Ok(Transition::AlreadyApplied);
        }
        if !self.is_stale_draft(now, days) {
            return Err(InvalidTenderTransition {
                from: self.status,
                action: TenderAction::AutoReject,
            });
        }
        self.step(
            TenderAction::AutoReject,
            TenderStatus::Draft,
            TenderStatus::Rejected,
            None,
            now,
        )
    }

    /// Draft whose last modification request is at least `days` old.
    pub fn is_stale_draft(&self, now: DateTime<Utc>, days: i64) -> bool {
        self.status == TenderStatus::Draft
            && self.email_sent_for_modification
            && self
                .modification_requested_at()
                .is_some_and(|requested| requested <= now - Duration::days(days))
    }

    fn step(
        &mut self,
        action: TenderAction,
        from: TenderStatus,
        to: TenderStatus,
        actor: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Transition, InvalidTenderTransition> {
        if self.status == to {
            return Ok(Transition::AlreadyApplied);
        }
        if self.status != from {
            return Err(InvalidTenderTransition {
                from: self.status,
                action,
            });
        }
        self.status = to;
        self.updated_at = now;
        self.logs.push(TenderLogEntry {
            action,
            at: now,
            actor: actor.map(str::to_string),
        });
        Ok(Transition::Applied)
    }
}
