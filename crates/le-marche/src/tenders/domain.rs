use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::suppliers::SupplierId;
use crate::taxonomy::{ServiceType, SupplierKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct TenderId(pub u64);

impl fmt::Display for TenderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TenderStatus {
    Draft,
    PendingValidation,
    Validated,
    Sent,
    Rejected,
}

impl TenderStatus {
    pub const fn label(self) -> &'static str {
        match self {
            TenderStatus::Draft => "draft",
            TenderStatus::PendingValidation => "pending_validation",
            TenderStatus::Validated => "validated",
            TenderStatus::Sent => "sent",
            TenderStatus::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TenderAction {
    Submit,
    Approve,
    Reject,
    RequestChanges,
    Dispatch,
    AutoReject,
}

impl TenderAction {
    pub const fn label(self) -> &'static str {
        match self {
            TenderAction::Submit => "submit",
            TenderAction::Approve => "validate",
            TenderAction::Reject => "reject",
            TenderAction::RequestChanges => "send tender author modification request",
            TenderAction::Dispatch => "send",
            TenderAction::AutoReject => "auto reject after modification request",
        }
    }
}

/// Append-only journal entry written by every applied transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenderLogEntry {
    pub action: TenderAction,
    pub at: DateTime<Utc>,
    pub actor: Option<String>,
}

/// Budget bracket declared by the buyer, ordered from smallest to largest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AmountRange {
    #[serde(rename = "0-1K")]
    UpTo1k,
    #[serde(rename = "1-5K")]
    From1kTo5k,
    #[serde(rename = "5-10K")]
    From5kTo10k,
    #[serde(rename = "10-15K")]
    From10kTo15k,
    #[serde(rename = "15-100K")]
    From15kTo100k,
    #[serde(rename = "100-150K")]
    From100kTo150k,
    #[serde(rename = "150-250K")]
    From150kTo250k,
    #[serde(rename = "250-500K")]
    From250kTo500k,
    #[serde(rename = "500-750K")]
    From500kTo750k,
    #[serde(rename = "750K-1M")]
    From750kTo1m,
    #[serde(rename = "1M+")]
    Over1m,
}

impl AmountRange {
    /// Bracket holding an exact amount in euros.
    pub fn for_amount(euros: u64) -> Self {
        match euros {
            0..=999 => AmountRange::UpTo1k,
            1_000..=4_999 => AmountRange::From1kTo5k,
            5_000..=9_999 => AmountRange::From5kTo10k,
            10_000..=14_999 => AmountRange::From10kTo15k,
            15_000..=99_999 => AmountRange::From15kTo100k,
            100_000..=149_999 => AmountRange::From100kTo150k,
            150_000..=249_999 => AmountRange::From150kTo250k,
            250_000..=499_999 => AmountRange::From250kTo500k,
            500_000..=749_999 => AmountRange::From500kTo750k,
            750_000..=999_999 => AmountRange::From750kTo1m,
            _ => AmountRange::Over1m,
        }
    }
}

/// Buyer input for a new tender.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenderDraft {
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub sectors: Vec<String>,
    #[serde(default)]
    pub perimeters: Vec<String>,
    /// City used together with `distance_location_km`.
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub distance_location_km: Option<f64>,
    #[serde(default)]
    pub is_country_area: bool,
    #[serde(default)]
    pub include_country_area: bool,
    #[serde(default)]
    pub kinds: Vec<SupplierKind>,
    #[serde(default)]
    pub service_types: Vec<ServiceType>,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
    #[serde(default)]
    pub amount: Option<AmountRange>,
}

/// Denormalised interaction totals over a tender's candidate rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TenderCounters {
    pub siae_count: u32,
    pub siae_email_send_count: u32,
    pub siae_email_link_click_count: u32,
    pub siae_detail_display_count: u32,
    pub siae_detail_contact_click_count: u32,
    pub siae_detail_not_interested_click_count: u32,
    pub siae_email_link_click_or_detail_display_count: u32,
}

impl TenderCounters {
    /// The single aggregation every counter write goes through.
    pub fn aggregate<'a, I>(rows: I) -> Self
    where
        I: IntoIterator<Item = &'a TenderSupplier>,
    {
        let mut counters = Self::default();
        for row in rows {
            counters.siae_count += 1;
            counters.siae_email_send_count += u32::from(row.email_send_date.is_some());
            counters.siae_email_link_click_count += u32::from(row.email_link_click_date.is_some());
            counters.siae_detail_display_count += u32::from(row.detail_display_date.is_some());
            counters.siae_detail_contact_click_count +=
                u32::from(row.detail_contact_click_date.is_some());
            counters.siae_detail_not_interested_click_count +=
                u32::from(row.detail_not_interested_click_date.is_some());
            counters.siae_email_link_click_or_detail_display_count += u32::from(
                row.email_link_click_date.is_some() || row.detail_display_date.is_some(),
            );
        }
        counters
    }
}

/// A buyer need matched against suppliers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tender {
    pub id: TenderId,
    pub slug: String,
    pub title: String,
    pub author: String,
    pub sectors: Vec<String>,
    pub perimeters: Vec<String>,
    pub location: Option<String>,
    pub distance_location_km: Option<f64>,
    pub is_country_area: bool,
    pub include_country_area: bool,
    pub kinds: Vec<SupplierKind>,
    pub service_types: Vec<ServiceType>,
    pub deadline: Option<NaiveDate>,
    pub amount: Option<AmountRange>,
    pub status: TenderStatus,
    pub validated_at: Option<DateTime<Utc>>,
    pub first_sent_at: Option<DateTime<Utc>>,
    pub email_sent_for_modification: bool,
    pub logs: Vec<TenderLogEntry>,
    pub counters: TenderCounters,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tender {
    pub fn from_draft(draft: TenderDraft, now: DateTime<Utc>) -> Self {
        Self {
            id: TenderId::default(),
            slug: String::new(),
            title: draft.title.trim().to_string(),
            author: draft.author,
            sectors: draft.sectors,
            perimeters: draft.perimeters,
            location: draft.location,
            distance_location_km: draft.distance_location_km,
            is_country_area: draft.is_country_area,
            include_country_area: draft.include_country_area,
            kinds: draft.kinds,
            service_types: draft.service_types,
            deadline: draft.deadline,
            amount: draft.amount,
            status: TenderStatus::Draft,
            validated_at: None,
            first_sent_at: None,
            email_sent_for_modification: false,
            logs: Vec::new(),
            counters: TenderCounters::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Timestamp of the latest modification request, read from the journal.
    pub fn modification_requested_at(&self) -> Option<DateTime<Utc>> {
        self.logs
            .iter()
            .rev()
            .find(|entry| entry.action == TenderAction::RequestChanges)
            .map(|entry| entry.at)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    EmailSend,
    EmailLinkClick,
    DetailDisplay,
    DetailContactClick,
    DetailNotInterestedClick,
}

impl InteractionKind {
    pub const fn label(self) -> &'static str {
        match self {
            InteractionKind::EmailSend => "email_send",
            InteractionKind::EmailLinkClick => "email_link_click",
            InteractionKind::DetailDisplay => "detail_display",
            InteractionKind::DetailContactClick => "detail_contact_click",
            InteractionKind::DetailNotInterestedClick => "detail_not_interested_click",
        }
    }
}

/// Candidate row linking a tender to one supplier, with first-wins interaction dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenderSupplier {
    pub tender_id: TenderId,
    pub supplier_id: SupplierId,
    pub email_send_date: Option<DateTime<Utc>>,
    pub email_link_click_date: Option<DateTime<Utc>>,
    pub detail_display_date: Option<DateTime<Utc>>,
    pub detail_contact_click_date: Option<DateTime<Utc>>,
    pub detail_not_interested_click_date: Option<DateTime<Utc>>,
    pub not_interested_feedback: Option<String>,
}

impl TenderSupplier {
    pub fn new(tender_id: TenderId, supplier_id: SupplierId) -> Self {
        Self {
            tender_id,
            supplier_id,
            email_send_date: None,
            email_link_click_date: None,
            detail_display_date: None,
            detail_contact_click_date: None,
            detail_not_interested_click_date: None,
            not_interested_feedback: None,
        }
    }

    pub fn date(&self, kind: InteractionKind) -> Option<DateTime<Utc>> {
        match kind {
            InteractionKind::EmailSend => self.email_send_date,
            InteractionKind::EmailLinkClick => self.email_link_click_date,
            InteractionKind::DetailDisplay => self.detail_display_date,
            InteractionKind::DetailContactClick => self.detail_contact_click_date,
            InteractionKind::DetailNotInterestedClick => self.detail_not_interested_click_date,
        }
    }

    /// Set the date of `kind` only if it is still empty. Returns whether anything changed.
    pub fn record(
        &mut self,
        kind: InteractionKind,
        at: DateTime<Utc>,
        feedback: Option<String>,
    ) -> bool {
        let slot = match kind {
            InteractionKind::EmailSend => &mut self.email_send_date,
            InteractionKind::EmailLinkClick => &mut self.email_link_click_date,
            InteractionKind::DetailDisplay => &mut self.detail_display_date,
            InteractionKind::DetailContactClick => &mut self.detail_contact_click_date,
            InteractionKind::DetailNotInterestedClick => &mut self.detail_not_interested_click_date,
        };
        if slot.is_some() {
            return false;
        }
        *slot = Some(at);
        if kind == InteractionKind::DetailNotInterestedClick {
            self.not_interested_feedback = feedback.filter(|text| !text.trim().is_empty());
        }
        true
    }
}
