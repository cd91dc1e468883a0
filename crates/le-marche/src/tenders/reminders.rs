//! Pure reminder predicates. The host decides when to evaluate them and who to notify.

use chrono::{DateTime, Datelike, Duration, Utc, Weekday};
use serde::Serialize;

use super::domain::{Tender, TenderId, TenderSupplier};
use crate::search::SupplierSummary;
use crate::suppliers::SupplierId;

/// Half-open window `[start, end)` looking back a number of days from `now`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ReminderWindow {
    /// Window of the day that ended `days` days ago. Nothing is sent on weekends, so
    /// the Monday window also covers the Saturday and Sunday before it.
    pub fn looking_back(now: DateTime<Utc>, days: i64) -> Option<Self> {
        let weekday = now.weekday();
        if matches!(weekday, Weekday::Sat | Weekday::Sun) {
            return None;
        }
        let end = now - Duration::days(days);
        let mut start = now - Duration::days(days + 1);
        if weekday == Weekday::Mon {
            start -= Duration::days(2);
        }
        Some(Self { start, end })
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at < self.end
    }
}

/// "Still interested?" nudge for a supplier who asked for the buyer's contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterestedReminder {
    pub tender_id: TenderId,
    pub supplier_id: SupplierId,
}

/// Best matching suppliers mailed to a buyer whose tender drew no contact click yet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthorDigest {
    pub tender_id: TenderId,
    pub author: String,
    pub suppliers: Vec<SupplierSummary>,
}

/// The row's contact click fell in the window and the tender is still open.
pub fn interested_reminder_due(
    tender: &Tender,
    row: &TenderSupplier,
    window: &ReminderWindow,
    now: DateTime<Utc>,
) -> bool {
    let open = tender
        .deadline
        .map_or(true, |deadline| deadline >= now.date_naive());
    open && row
        .detail_contact_click_date
        .is_some_and(|clicked| window.contains(clicked))
}

/// The tender went out in the window and none of its candidates clicked "contact".
pub fn author_digest_due(tender: &Tender, rows: &[TenderSupplier], window: &ReminderWindow) -> bool {
    tender
        .first_sent_at
        .is_some_and(|sent| window.contains(sent))
        && rows
            .iter()
            .filter(|row| row.tender_id == tender.id)
            .all(|row| row.detail_contact_click_date.is_none())
}
