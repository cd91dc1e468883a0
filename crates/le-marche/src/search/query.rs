use serde::{Deserialize, Serialize};

use crate::taxonomy::{LegalForm, ServiceType, SupplierKind, Territory};

/// Structured supplier search request. Every field is optional; absent fields do not
/// constrain the result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupplierQuery {
    pub sectors: Vec<String>,
    /// Perimeter slugs expanded through activity geo ranges.
    pub perimeters: Vec<String>,
    /// Perimeter slugs matched strictly against the supplier's own address.
    pub locations: Vec<String>,
    pub kinds: Vec<SupplierKind>,
    pub service_types: Vec<ServiceType>,
    pub networks: Vec<String>,
    pub labels: Vec<String>,
    pub ca: Option<RevenueBucket>,
    pub employees: Option<EmployeesBucket>,
    pub legal_forms: Vec<LegalForm>,
    pub territory: Vec<Territory>,
    pub has_client_references: Option<bool>,
    pub has_groups: Option<bool>,
    pub q: Option<String>,
    pub company_client_reference: Option<String>,
    /// Also admit activities ranging over the whole country.
    pub include_country_area: bool,
    /// Suppliers whose own point lies within a distance of a city.
    pub near: Option<NearFilter>,
    /// One-based page number.
    pub page: Option<usize>,
}

impl SupplierQuery {
    pub fn has_activity_predicates(&self) -> bool {
        !self.sectors.is_empty() || !self.perimeters.is_empty() || !self.service_types.is_empty()
    }

    pub fn text(&self) -> Option<&str> {
        self.q
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearFilter {
    pub location: String,
    pub distance_km: f64,
}

/// Revenue buckets in euros; lower bound inclusive, upper bound exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RevenueBucket {
    #[serde(rename = "-100000")]
    UpTo100k,
    #[serde(rename = "100000-500000")]
    From100kTo500k,
    #[serde(rename = "500000-1000000")]
    From500kTo1m,
    #[serde(rename = "1000000-5000000")]
    From1mTo5m,
    #[serde(rename = "5000000-10000000")]
    From5mTo10m,
    #[serde(rename = "10000000-")]
    Over10m,
}

impl RevenueBucket {
    pub const fn bounds(self) -> (Option<u64>, Option<u64>) {
        match self {
            RevenueBucket::UpTo100k => (None, Some(100_000)),
            RevenueBucket::From100kTo500k => (Some(100_000), Some(500_000)),
            RevenueBucket::From500kTo1m => (Some(500_000), Some(1_000_000)),
            RevenueBucket::From1mTo5m => (Some(1_000_000), Some(5_000_000)),
            RevenueBucket::From5mTo10m => (Some(5_000_000), Some(10_000_000)),
            RevenueBucket::Over10m => (Some(10_000_000), None),
        }
    }

    pub fn contains(self, revenue: u64) -> bool {
        let (lower, upper) = self.bounds();
        lower.map_or(true, |lower| revenue >= lower) && upper.map_or(true, |upper| revenue < upper)
    }
}

/// Headcount buckets; both bounds inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmployeesBucket {
    #[serde(rename = "1-9")]
    From1To9,
    #[serde(rename = "10-49")]
    From10To49,
    #[serde(rename = "50-99")]
    From50To99,
    #[serde(rename = "100-249")]
    From100To249,
    #[serde(rename = "250-499")]
    From250To499,
    #[serde(rename = "500-")]
    Over500,
}

impl EmployeesBucket {
    pub const fn bounds(self) -> (u32, Option<u32>) {
        match self {
            EmployeesBucket::From1To9 => (1, Some(9)),
            EmployeesBucket::From10To49 => (10, Some(49)),
            EmployeesBucket::From50To99 => (50, Some(99)),
            EmployeesBucket::From100To249 => (100, Some(249)),
            EmployeesBucket::From250To499 => (250, Some(499)),
            EmployeesBucket::Over500 => (500, None),
        }
    }

    pub fn contains(self, headcount: u32) -> bool {
        let (lower, upper) = self.bounds();
        headcount >= lower && upper.map_or(true, |upper| headcount <= upper)
    }
}
