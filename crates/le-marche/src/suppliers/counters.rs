use std::collections::BTreeSet;

use super::domain::{Supplier, SupplierCounters, SupplierTenderStats};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CompletionField {
    Logo,
    ContactEmail,
    ContactPhone,
    ServiceTypes,
    GeoRange,
    Sectors,
    Description,
    Offers,
    ClientReferences,
    Revenue,
    InsertionEmployees,
    Labels,
    Cocontracting,
    Images,
    PermanentEmployees,
    Networks,
    YearConstitution,
}

/// Field, weight. A field scores when present or above its threshold.
const COMPLETION_GRID: [(CompletionField, u32); 17] = [
    (CompletionField::Logo, 5),
    (CompletionField::ContactEmail, 5),
    (CompletionField::ContactPhone, 5),
    (CompletionField::ServiceTypes, 5),
    (CompletionField::GeoRange, 5),
    (CompletionField::Sectors, 5),
    (CompletionField::Description, 4),
    (CompletionField::Offers, 4),
    (CompletionField::ClientReferences, 3),
    (CompletionField::Revenue, 3),
    (CompletionField::InsertionEmployees, 3),
    (CompletionField::Labels, 3),
    (CompletionField::Cocontracting, 2),
    (CompletionField::Images, 2),
    (CompletionField::PermanentEmployees, 2),
    (CompletionField::Networks, 1),
    (CompletionField::YearConstitution, 1),
];

fn filled(text: Option<&str>) -> bool {
    text.is_some_and(|value| !value.trim().is_empty())
}

fn field_scores(field: CompletionField, supplier: &Supplier, counters: &SupplierCounters) -> bool {
    match field {
        CompletionField::Logo => supplier.has_logo(),
        CompletionField::ContactEmail => supplier.has_contact_email(),
        CompletionField::ContactPhone => filled(supplier.contact_phone.as_deref()),
        CompletionField::ServiceTypes => supplier
            .activities
            .iter()
            .any(|activity| !activity.service_types.is_empty()),
        CompletionField::GeoRange => !supplier.activities.is_empty(),
        CompletionField::Sectors => counters.sector_count > 1,
        CompletionField::Description => supplier.has_description(),
        CompletionField::Offers => counters.offer_count > 1,
        CompletionField::ClientReferences => counters.client_reference_count > 2,
        CompletionField::Revenue => supplier.ca.is_some(),
        CompletionField::InsertionEmployees => {
            supplier.employees_insertion_count.unwrap_or(0) > 0
        }
        CompletionField::Labels => counters.label_count > 0,
        CompletionField::Cocontracting => supplier.is_cocontracting.is_some(),
        CompletionField::Images => counters.image_count > 2,
        CompletionField::PermanentEmployees => {
            supplier.employees_permanent_count.unwrap_or(0) > 2
        }
        CompletionField::Networks => counters.network_count > 2,
        CompletionField::YearConstitution => supplier.year_constitution.is_some(),
    }
}

/// Weighted completion percentage, rounded to the nearest integer.
pub fn completion_rate(supplier: &Supplier, counters: &SupplierCounters) -> u8 {
    let total: u32 = COMPLETION_GRID.iter().map(|(_, score)| score).sum();
    let earned: u32 = COMPLETION_GRID
        .iter()
        .filter(|(field, _)| field_scores(*field, supplier, counters))
        .map(|(_, score)| score)
        .sum();
    (f64::from(earned) * 100.0 / f64::from(total)).round() as u8
}

fn rate(part: u32, whole: u32) -> u32 {
    (f64::from(part) * 100.0 / f64::from(whole)).round() as u32
}

/// Linked, well filled in, and responsive to the tenders it received.
pub fn super_badge(
    counters: &SupplierCounters,
    stats: &SupplierTenderStats,
    completion_threshold: u8,
) -> bool {
    if counters.user_count < 1 || counters.completion_rate < completion_threshold {
        return false;
    }
    if stats.email_send_count == 0 {
        return false;
    }
    rate(stats.email_link_click_count, stats.email_send_count) >= 40
        || rate(stats.detail_contact_click_count, stats.email_send_count) >= 20
}

/// Full recomputation from the supplier's owned rows. `etablissement_count` comes from
/// the store since it spans suppliers.
pub fn recompute(
    supplier: &Supplier,
    etablissement_count: u32,
    completion_threshold: u8,
) -> SupplierCounters {
    let sectors: BTreeSet<&str> = supplier
        .activities
        .iter()
        .map(|activity| activity.sector.as_str())
        .collect();

    let mut counters = SupplierCounters {
        user_count: supplier.users.len() as u32,
        sector_count: sectors.len() as u32,
        network_count: supplier.networks.len() as u32,
        group_count: supplier.groups.len() as u32,
        offer_count: supplier.offers.len() as u32,
        client_reference_count: supplier.client_references.len() as u32,
        label_count: supplier.labels.len() as u32,
        image_count: supplier.images.len() as u32,
        etablissement_count,
        completion_rate: 0,
        super_badge: false,
    };
    counters.completion_rate = completion_rate(supplier, &counters);
    counters.super_badge = super_badge(&counters, &supplier.tender_stats, completion_threshold);
    counters
}
