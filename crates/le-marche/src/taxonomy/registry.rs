use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::text::{fold, slugify};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectorGroup {
    pub slug: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sector {
    pub slug: String,
    pub name: String,
    pub group: Option<String>,
}

impl Sector {
    pub fn is_other(&self) -> bool {
        fold(&self.name) == "autre"
    }
}

/// Simple slug/name reference entry (labels, networks, supplier groups).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedEntry {
    pub slug: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxonomyTable {
    SectorGroup,
    Sector,
    Label,
    Network,
}

impl TaxonomyTable {
    pub const fn label(self) -> &'static str {
        match self {
            TaxonomyTable::SectorGroup => "sector group",
            TaxonomyTable::Sector => "sector",
            TaxonomyTable::Label => "label",
            TaxonomyTable::Network => "network",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TaxonomyError {
    #[error("unknown {} '{slug}'", .table.label())]
    Unknown { table: TaxonomyTable, slug: String },
    #[error("{} slug '{slug}' already exists", .table.label())]
    Duplicate { table: TaxonomyTable, slug: String },
}

/// Sectors, labels and networks keyed by slug.
#[derive(Debug, Clone, Default)]
pub struct Taxonomy {
    groups: BTreeMap<String, SectorGroup>,
    sectors: BTreeMap<String, Sector>,
    labels: BTreeMap<String, NamedEntry>,
    networks: BTreeMap<String, NamedEntry>,
}

impl Taxonomy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_group(&mut self, name: &str) -> Result<&SectorGroup, TaxonomyError> {
        let slug = slugify(name);
        if self.groups.contains_key(&slug) {
            return Err(TaxonomyError::Duplicate {
                table: TaxonomyTable::SectorGroup,
                slug,
            });
        }
        let group = SectorGroup {
            slug: slug.clone(),
            name: name.trim().to_string(),
        };
        Ok(self.groups.entry(slug).or_insert(group))
    }

    /// Register a sector. An "Autre" sector takes its group's slug as suffix so every
    /// group can own one.
    pub fn add_sector(&mut self, group: Option<&str>, name: &str) -> Result<&Sector, TaxonomyError> {
        let group = match group {
            Some(slug) => Some(
                self.groups
                    .get(slug)
                    .map(|group| group.slug.clone())
                    .ok_or_else(|| TaxonomyError::Unknown {
                        table: TaxonomyTable::SectorGroup,
                        slug: slug.to_string(),
                    })?,
            ),
            None => None,
        };

        let mut slug = slugify(name);
        if slug == "autre" {
            if let Some(group) = &group {
                slug = format!("{slug}-{group}");
            }
        }
        if self.sectors.contains_key(&slug) {
            return Err(TaxonomyError::Duplicate {
                table: TaxonomyTable::Sector,
                slug,
            });
        }

        let sector = Sector {
            slug: slug.clone(),
            name: name.trim().to_string(),
            group,
        };
        Ok(self.sectors.entry(slug).or_insert(sector))
    }

    pub fn add_label(&mut self, name: &str) -> Result<&NamedEntry, TaxonomyError> {
        Self::add_named(&mut self.labels, TaxonomyTable::Label, name)
    }

    pub fn add_network(&mut self, name: &str) -> Result<&NamedEntry, TaxonomyError> {
        Self::add_named(&mut self.networks, TaxonomyTable::Network, name)
    }

    fn add_named<'a>(
        table: &'a mut BTreeMap<String, NamedEntry>,
        kind: TaxonomyTable,
        name: &str,
    ) -> Result<&'a NamedEntry, TaxonomyError> {
        let slug = slugify(name);
        if table.contains_key(&slug) {
            return Err(TaxonomyError::Duplicate { table: kind, slug });
        }
        let entry = NamedEntry {
            slug: slug.clone(),
            name: name.trim().to_string(),
        };
        Ok(table.entry(slug).or_insert(entry))
    }

    pub fn sector(&self, slug: &str) -> Result<&Sector, TaxonomyError> {
        self.sectors.get(slug).ok_or_else(|| TaxonomyError::Unknown {
            table: TaxonomyTable::Sector,
            slug: slug.to_string(),
        })
    }

    pub fn label(&self, slug: &str) -> Result<&NamedEntry, TaxonomyError> {
        self.labels.get(slug).ok_or_else(|| TaxonomyError::Unknown {
            table: TaxonomyTable::Label,
            slug: slug.to_string(),
        })
    }

    pub fn network(&self, slug: &str) -> Result<&NamedEntry, TaxonomyError> {
        self.networks.get(slug).ok_or_else(|| TaxonomyError::Unknown {
            table: TaxonomyTable::Network,
            slug: slug.to_string(),
        })
    }

    pub fn group(&self, slug: &str) -> Result<&SectorGroup, TaxonomyError> {
        self.groups.get(slug).ok_or_else(|| TaxonomyError::Unknown {
            table: TaxonomyTable::SectorGroup,
            slug: slug.to_string(),
        })
    }

    /// Sectors grouped by group name, "Autre" last within each group, ungrouped at the end.
    pub fn sectors_ordered(&self) -> Vec<&Sector> {
        let mut sectors: Vec<&Sector> = self.sectors.values().collect();
        sectors.sort_by(|a, b| {
            let group_a = a.group.as_deref().and_then(|slug| self.groups.get(slug));
            let group_b = b.group.as_deref().and_then(|slug| self.groups.get(slug));
            let group_key = |group: Option<&SectorGroup>| {
                (group.is_none(), group.map(|group| fold(&group.name)))
            };
            group_key(group_a)
                .cmp(&group_key(group_b))
                .then_with(|| a.is_other().cmp(&b.is_other()))
                .then_with(|| fold(&a.name).cmp(&fold(&b.name)))
        });
        sectors
    }

    pub fn sector_count(&self) -> usize {
        self.sectors.len()
    }
}
