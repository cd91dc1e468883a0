use std::collections::HashMap;

use super::domain::{Perimeter, PerimeterKind, COUNTRY_SLUG};
use super::geo::distance_km;
use super::reference::{department_region_code, DEPARTMENTS, REGIONS};

/// Errors raised by perimeter lookups and registration.
#[derive(Debug, thiserror::Error)]
pub enum PerimeterError {
    #[error("unknown perimeter '{0}'")]
    UnknownPerimeter(String),
    #[error("perimeter slug '{0}' already registered")]
    DuplicateSlug(String),
    #[error("perimeter '{slug}' is inconsistent: {reason}")]
    Inconsistent { slug: String, reason: String },
}

/// Process-wide, read-only after load. Share behind an `Arc`.
#[derive(Debug, Clone)]
pub struct PerimeterRegistry {
    perimeters: Vec<Perimeter>,
    by_slug: HashMap<String, usize>,
}

impl Default for PerimeterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PerimeterRegistry {
    /// Registry holding only the country perimeter.
    pub fn new() -> Self {
        let mut registry = Self {
            perimeters: Vec::new(),
            by_slug: HashMap::new(),
        };
        registry.push(Perimeter::country());
        registry
    }

    /// Country, regions and departments from the built-in reference tables. Cities are
    /// loaded separately.
    pub fn with_reference_tables() -> Self {
        let mut registry = Self::new();
        for (code, name, region_code) in DEPARTMENTS {
            registry.push(Perimeter::department(code, name, region_code));
        }
        for (code, name) in REGIONS {
            let mut region = Perimeter::region(code, name);
            if registry.by_slug.contains_key(&region.slug) {
                region.slug = format!("{}-region", region.slug);
            }
            registry.push(region);
        }
        registry
    }

    fn push(&mut self, perimeter: Perimeter) {
        self.by_slug
            .insert(perimeter.slug.clone(), self.perimeters.len());
        self.perimeters.push(perimeter);
    }

    /// Register a perimeter, enforcing the department to region table and slug
    /// uniqueness. A region whose slug collides gets a `-region` suffix.
    pub fn insert(&mut self, mut perimeter: Perimeter) -> Result<&Perimeter, PerimeterError> {
        self.check_consistency(&perimeter)?;

        if self.by_slug.contains_key(&perimeter.slug) {
            if perimeter.kind != PerimeterKind::Region {
                return Err(PerimeterError::DuplicateSlug(perimeter.slug));
            }
            perimeter.slug = format!("{}-region", perimeter.slug);
            if self.by_slug.contains_key(&perimeter.slug) {
                return Err(PerimeterError::DuplicateSlug(perimeter.slug));
            }
        }

        let index = self.perimeters.len();
        self.push(perimeter);
        Ok(&self.perimeters[index])
    }

    fn check_consistency(&self, perimeter: &Perimeter) -> Result<(), PerimeterError> {
        let inconsistent = |reason: &str| PerimeterError::Inconsistent {
            slug: perimeter.slug.clone(),
            reason: reason.to_string(),
        };

        match perimeter.kind {
            PerimeterKind::Country => Err(inconsistent("the country perimeter is built in")),
            PerimeterKind::Region => match perimeter.region_code {
                Some(_) => Ok(()),
                None => Err(inconsistent("region without region code")),
            },
            PerimeterKind::Department | PerimeterKind::City => {
                let department = perimeter
                    .department_code
                    .as_deref()
                    .ok_or_else(|| inconsistent("missing department code"))?;
                let region = perimeter
                    .region_code
                    .as_deref()
                    .ok_or_else(|| inconsistent("missing region code"))?;
                match department_region_code(department) {
                    Some(expected) if expected == region => Ok(()),
                    Some(_) => Err(inconsistent("region code does not match its department")),
                    None => Err(inconsistent("unknown department code")),
                }
            }
        }
    }

    pub fn lookup_by_slug(&self, slug: &str) -> Result<&Perimeter, PerimeterError> {
        self.by_slug
            .get(slug)
            .map(|index| &self.perimeters[*index])
            .ok_or_else(|| PerimeterError::UnknownPerimeter(slug.to_string()))
    }

    pub fn get(&self, slug: &str) -> Option<&Perimeter> {
        self.by_slug.get(slug).map(|index| &self.perimeters[*index])
    }

    pub fn country(&self) -> &Perimeter {
        // Index 0 is seeded by every constructor.
        &self.perimeters[0]
    }

    pub fn country_slug(&self) -> &str {
        COUNTRY_SLUG
    }

    pub fn contains(&self, parent: &str, child: &str) -> Result<bool, PerimeterError> {
        let parent = self.lookup_by_slug(parent)?;
        let child = self.lookup_by_slug(child)?;
        Ok(parent.contains(child))
    }

    /// Distance between two perimeters' points, `None` when either has no coordinates.
    pub fn distance(&self, a: &Perimeter, b: &Perimeter) -> Option<f64> {
        Some(distance_km(a.coords?, b.coords?))
    }

    /// Cities strictly inside `parent`.
    pub fn cities_within<'a>(
        &'a self,
        parent: &'a Perimeter,
    ) -> impl Iterator<Item = &'a Perimeter> + 'a {
        self.perimeters.iter().filter(move |perimeter| {
            perimeter.kind == PerimeterKind::City && parent.contains(perimeter)
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Perimeter> {
        self.perimeters.iter()
    }

    pub fn count(&self, kind: PerimeterKind) -> usize {
        self.perimeters
            .iter()
            .filter(|perimeter| perimeter.kind == kind)
            .count()
    }

    pub fn len(&self) -> usize {
        self.perimeters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.perimeters.is_empty()
    }
}
