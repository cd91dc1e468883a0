//! Tenders: the buyer need, its lifecycle, the matching pipeline that freezes its
//! candidate set, interaction tracking and reminder predicates.

pub mod domain;
pub mod lifecycle;
pub mod matching;
pub mod partners;
pub mod reminders;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    AmountRange, InteractionKind, Tender, TenderAction, TenderCounters, TenderDraft, TenderId,
    TenderLogEntry, TenderStatus, TenderSupplier,
};
pub use lifecycle::{InvalidTenderTransition, Transition};
pub use matching::tender_query;
pub use partners::{partner_email_lists, PartnerShareTender};
pub use reminders::{AuthorDigest, InterestedReminder, ReminderWindow};
pub use repository::{
    DispatchError, DispatchPublisher, InMemoryTenderRepository, LogDispatchPublisher,
    TenderDispatched, TenderRepository,
};
pub use router::tender_router;
pub use service::{TenderService, TenderServiceError};
