use serde::{Deserialize, Serialize};

use crate::text::slugify;

/// Administrative level of a perimeter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PerimeterKind {
    Country,
    Region,
    Department,
    City,
}

impl PerimeterKind {
    pub const fn label(self) -> &'static str {
        match self {
            PerimeterKind::Country => "country",
            PerimeterKind::Region => "region",
            PerimeterKind::Department => "department",
            PerimeterKind::City => "city",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "COUNTRY" => Some(Self::Country),
            "REGION" => Some(Self::Region),
            "DEPARTMENT" => Some(Self::Department),
            "CITY" => Some(Self::City),
            _ => None,
        }
    }
}

/// WGS84 coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Immutable geographic scope at one administrative level.
///
/// `code` is the INSEE code; region zones carry an `R` prefix (`R84`) so they never
/// collide with department codes. `region_code` is always the bare region code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Perimeter {
    pub name: String,
    pub slug: String,
    pub kind: PerimeterKind,
    pub code: String,
    pub department_code: Option<String>,
    pub region_code: Option<String>,
    #[serde(default)]
    pub post_codes: Vec<String>,
    pub coords: Option<GeoPoint>,
}

pub const COUNTRY_SLUG: &str = "france";

impl Perimeter {
    pub fn country() -> Self {
        Self {
            name: "France".to_string(),
            slug: COUNTRY_SLUG.to_string(),
            kind: PerimeterKind::Country,
            code: "FR".to_string(),
            department_code: None,
            region_code: None,
            post_codes: Vec::new(),
            coords: None,
        }
    }

    pub fn region(code: &str, name: &str) -> Self {
        Self {
            name: name.to_string(),
            slug: slugify(name),
            kind: PerimeterKind::Region,
            code: format!("R{code}"),
            department_code: None,
            region_code: Some(code.to_string()),
            post_codes: Vec::new(),
            coords: None,
        }
    }

    pub fn department(code: &str, name: &str, region_code: &str) -> Self {
        Self {
            name: name.to_string(),
            slug: slugify(name),
            kind: PerimeterKind::Department,
            code: code.to_string(),
            department_code: Some(code.to_string()),
            region_code: Some(region_code.to_string()),
            post_codes: Vec::new(),
            coords: None,
        }
    }

    pub fn city(
        code: &str,
        name: &str,
        department_code: &str,
        region_code: &str,
        post_codes: Vec<String>,
        coords: Option<GeoPoint>,
    ) -> Self {
        Self {
            name: name.to_string(),
            slug: slugify(&format!("{name} {department_code}")),
            kind: PerimeterKind::City,
            code: code.to_string(),
            department_code: Some(department_code.to_string()),
            region_code: Some(region_code.to_string()),
            post_codes,
            coords,
        }
    }

    /// Static containment: codes are compared, nothing is walked.
    pub fn contains(&self, child: &Perimeter) -> bool {
        if self.kind == child.kind {
            return self.code == child.code;
        }
        match (self.kind, child.kind) {
            (PerimeterKind::Country, _) => true,
            (PerimeterKind::Region, PerimeterKind::Department | PerimeterKind::City) => {
                self.region_code.is_some() && self.region_code == child.region_code
            }
            (PerimeterKind::Department, PerimeterKind::City) => {
                self.department_code.is_some() && self.department_code == child.department_code
            }
            _ => false,
        }
    }

    pub fn overlaps(&self, other: &Perimeter) -> bool {
        self.contains(other) || other.contains(self)
    }

    pub fn has_post_code(&self, post_code: &str) -> bool {
        self.post_codes.iter().any(|candidate| candidate == post_code)
    }
}
