use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::activity::SupplierActivity;
use super::document::SearchDocument;
use crate::perimeters::{GeoPoint, Located};
use crate::taxonomy::{LegalForm, SupplierKind};

/// Identifier assigned by the supplier store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct SupplierId(pub u64);

impl fmt::Display for SupplierId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offer {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientReference {
    pub name: String,
}

/// Cached aggregates recomputed on every save; never incremented in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SupplierCounters {
    pub user_count: u32,
    pub sector_count: u32,
    pub network_count: u32,
    pub group_count: u32,
    pub offer_count: u32,
    pub client_reference_count: u32,
    pub label_count: u32,
    pub image_count: u32,
    pub etablissement_count: u32,
    pub completion_rate: u8,
    pub super_badge: bool,
}

/// Interaction totals across every tender the supplier was a candidate of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SupplierTenderStats {
    pub tender_count: u32,
    pub email_send_count: u32,
    pub email_link_click_count: u32,
    pub detail_display_count: u32,
    pub detail_contact_click_count: u32,
    pub detail_not_interested_count: u32,
}

/// Inclusive supplier identified by its 14-digit SIRET.
///
/// `department` holds a department code and `region` a region name; both are derived
/// from `post_code` on save. Counters, slug and the search document are owned by the
/// catalog save path and overwritten there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supplier {
    #[serde(default)]
    pub id: SupplierId,
    pub siret: String,
    pub name: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub slug: String,
    pub kind: SupplierKind,
    #[serde(default)]
    pub legal_form: Option<LegalForm>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub post_code: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub coords: Option<GeoPoint>,
    pub is_active: bool,
    #[serde(default)]
    pub is_delisted: bool,
    #[serde(default)]
    pub is_qpv: bool,
    #[serde(default)]
    pub is_zrr: bool,
    #[serde(default)]
    pub is_cocontracting: Option<bool>,
    #[serde(default)]
    pub year_constitution: Option<u16>,
    #[serde(default)]
    pub ca: Option<u64>,
    #[serde(default)]
    pub registry_ca: Option<u64>,
    #[serde(default)]
    pub employees_insertion_count: Option<u32>,
    #[serde(default)]
    pub employees_permanent_count: Option<u32>,
    #[serde(default)]
    pub asp_etp_count: Option<f64>,
    #[serde(default)]
    pub registry_employees: Option<String>,
    #[serde(default)]
    pub activities: Vec<SupplierActivity>,
    #[serde(default)]
    pub offers: Vec<Offer>,
    #[serde(default)]
    pub client_references: Vec<ClientReference>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub labels: BTreeSet<String>,
    #[serde(default)]
    pub networks: BTreeSet<String>,
    #[serde(default)]
    pub groups: BTreeSet<String>,
    #[serde(default)]
    pub users: BTreeSet<String>,
    #[serde(default)]
    pub tender_stats: SupplierTenderStats,
    #[serde(default)]
    pub counters: SupplierCounters,
    #[serde(default)]
    pub search: SearchDocument,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Supplier {
    pub fn new(siret: &str, name: &str, kind: SupplierKind) -> Self {
        Self {
            id: SupplierId::default(),
            siret: siret.chars().filter(|ch| !ch.is_whitespace()).collect(),
            name: name.trim().to_string(),
            brand: None,
            slug: String::new(),
            kind,
            legal_form: None,
            description: None,
            logo_url: None,
            contact_email: None,
            contact_phone: None,
            address: None,
            city: None,
            post_code: None,
            department: None,
            region: None,
            coords: None,
            is_active: true,
            is_delisted: false,
            is_qpv: false,
            is_zrr: false,
            is_cocontracting: None,
            year_constitution: None,
            ca: None,
            registry_ca: None,
            employees_insertion_count: None,
            employees_permanent_count: None,
            asp_etp_count: None,
            registry_employees: None,
            activities: Vec::new(),
            offers: Vec::new(),
            client_references: Vec::new(),
            images: Vec::new(),
            labels: BTreeSet::new(),
            networks: BTreeSet::new(),
            groups: BTreeSet::new(),
            users: BTreeSet::new(),
            tender_stats: SupplierTenderStats::default(),
            counters: SupplierCounters::default(),
            search: SearchDocument::default(),
            updated_at: Utc::now(),
        }
    }

    pub fn is_live(&self) -> bool {
        self.is_active && !self.is_delisted
    }

    /// First nine digits of the SIRET.
    pub fn siren(&self) -> &str {
        self.siret.get(..9).unwrap_or(&self.siret)
    }

    pub fn display_name(&self) -> &str {
        match self.brand.as_deref() {
            Some(brand) if !brand.trim().is_empty() => brand,
            _ => &self.name,
        }
    }

    pub fn has_contact_email(&self) -> bool {
        self.contact_email
            .as_deref()
            .is_some_and(|email| !email.trim().is_empty())
    }

    pub fn has_description(&self) -> bool {
        self.description
            .as_deref()
            .is_some_and(|text| !text.trim().is_empty())
    }

    pub fn has_logo(&self) -> bool {
        self.logo_url
            .as_deref()
            .is_some_and(|url| !url.trim().is_empty())
    }

    /// Declared revenue, falling back to the registry figure when nothing (or zero) was
    /// declared.
    pub fn revenue(&self) -> Option<u64> {
        self.ca
            .filter(|ca| *ca > 0)
            .or(self.registry_ca.filter(|ca| *ca > 0))
    }

    /// Declared insertion plus permanent headcount, falling back to ASP ETP, then the
    /// registry bracket's lower bound.
    pub fn headcount(&self) -> Option<u32> {
        match (self.employees_insertion_count, self.employees_permanent_count) {
            (None, None) => {}
            (insertion, permanent) => return Some(insertion.unwrap_or(0) + permanent.unwrap_or(0)),
        }
        if let Some(etp) = self.asp_etp_count {
            return Some(etp.round().max(0.0) as u32);
        }
        self.registry_employees
            .as_deref()
            .and_then(registry_bracket_floor)
    }
}

/// Lower bound of an INSEE headcount bracket label such as "10 à 19 salariés".
fn registry_bracket_floor(label: &str) -> Option<u32> {
    let trimmed = label.trim();
    if trimmed.starts_with("0 salarié") || trimmed.starts_with("Unités non employeuses") {
        return Some(0);
    }
    trimmed
        .split(|ch: char| !ch.is_ascii_digit())
        .find(|part| !part.is_empty())
        .and_then(|digits| digits.parse().ok())
}

impl Located for Supplier {
    fn location(&self) -> Option<GeoPoint> {
        self.coords
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn liveness_requires_active_and_listed() {
        let mut supplier = Supplier::new("12345678900011", "Atelier", SupplierKind::Ei);
        assert!(supplier.is_live());
        supplier.is_delisted = true;
        assert!(!supplier.is_live());
        supplier.is_delisted = false;
        supplier.is_active = false;
        assert!(!supplier.is_live());
    }

    #[test]
    fn siren_and_display_name() {
        let mut supplier = Supplier::new("123 456 789 00011", "Atelier", SupplierKind::Ei);
        assert_eq!(supplier.siren(), "123456789");
        assert_eq!(supplier.display_name(), "Atelier");
        supplier.brand = Some("Brand".to_string());
        assert_eq!(supplier.display_name(), "Brand");
    }

    #[test]
    fn headcount_falls_back_through_sources() {
        let mut supplier = Supplier::new("12345678900011", "Atelier", SupplierKind::Aci);
        assert_eq!(supplier.headcount(), None);
        supplier.registry_employees = Some("50 à 99 salariés".to_string());
        assert_eq!(supplier.headcount(), Some(50));
        supplier.asp_etp_count = Some(12.6);
        assert_eq!(supplier.headcount(), Some(13));
        supplier.employees_insertion_count = Some(8);
        supplier.employees_permanent_count = Some(3);
        assert_eq!(supplier.headcount(), Some(11));
    }
}
