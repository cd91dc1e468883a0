//! Bulk import of perimeter and sector reference data from CSV exports.
//!
//! An import either applies every row or none: rows are loaded into a copy of the
//! registry which replaces the original only once the whole file went through.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};
use tracing::{debug, info};

use crate::perimeters::{GeoPoint, Perimeter, PerimeterError, PerimeterKind, PerimeterRegistry};
use crate::taxonomy::{Taxonomy, TaxonomyError};
use crate::text::slugify;

#[derive(Debug, thiserror::Error)]
pub enum ReferenceError {
    #[error("reference data missing: {0}")]
    ReferenceDataMissing(&'static str),
    #[error("failed to open {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: {reason}")]
    Row { row: usize, reason: String },
    #[error("row {row}: {source}")]
    Perimeter {
        row: usize,
        #[source]
        source: PerimeterError,
    },
    #[error("row {row}: {source}")]
    Sector {
        row: usize,
        #[source]
        source: TaxonomyError,
    },
}

/// Rows applied and rows already present in the reference tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub inserted: usize,
    pub unchanged: usize,
}

#[derive(Debug, Deserialize)]
struct PerimeterRow {
    kind: String,
    name: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    slug: Option<String>,
    code: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    department_code: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    region_code: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    post_codes: Option<String>,
    #[serde(default)]
    latitude: Option<f64>,
    #[serde(default)]
    longitude: Option<f64>,
}

impl PerimeterRow {
    fn into_perimeter(self, row: usize) -> Result<Perimeter, ReferenceError> {
        let kind = PerimeterKind::parse(&self.kind).ok_or_else(|| ReferenceError::Row {
            row,
            reason: format!("unknown perimeter kind '{}'", self.kind),
        })?;
        if self.name.trim().is_empty() {
            return Err(ReferenceError::Row {
                row,
                reason: "name is required".to_string(),
            });
        }
        let mut perimeter = match kind {
            PerimeterKind::Country => Perimeter::country(),
            PerimeterKind::Region => Perimeter::region(&self.code, &self.name),
            PerimeterKind::Department => Perimeter {
                region_code: self.region_code.clone(),
                ..Perimeter::department(&self.code, &self.name, "")
            },
            PerimeterKind::City => Perimeter {
                department_code: self.department_code.clone(),
                region_code: self.region_code.clone(),
                ..Perimeter::city(
                    &self.code,
                    &self.name,
                    self.department_code.as_deref().unwrap_or_default(),
                    "",
                    Vec::new(),
                    None,
                )
            },
        };
        if let Some(slug) = self.slug {
            perimeter.slug = slugify(&slug);
        }
        perimeter.post_codes = self
            .post_codes
            .as_deref()
            .map(|codes| {
                codes
                    .split(|ch: char| ch == '|' || ch == ';' || ch.is_whitespace())
                    .filter(|code| !code.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        perimeter.coords = match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(GeoPoint::new(latitude, longitude)),
            (None, None) => None,
            _ => {
                return Err(ReferenceError::Row {
                    row,
                    reason: "latitude and longitude go together".to_string(),
                })
            }
        };
        Ok(perimeter)
    }
}

#[derive(Debug, Deserialize)]
struct SectorRow {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    group: Option<String>,
    name: String,
}

/// Load perimeters on top of `registry`. Regions and departments already known from the
/// built-in tables are left untouched; the country row is always built in.
pub fn import_perimeters<R: Read>(
    registry: &PerimeterRegistry,
    reader: R,
) -> Result<(PerimeterRegistry, ImportSummary), ReferenceError> {
    if registry.count(PerimeterKind::Department) == 0 {
        return Err(ReferenceError::ReferenceDataMissing("departments"));
    }
    let mut staged = registry.clone();
    let mut summary = ImportSummary::default();
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    for (index, record) in csv_reader.deserialize::<PerimeterRow>().enumerate() {
        // Header is row 1.
        let row = index + 2;
        let perimeter = record?.into_perimeter(row)?;
        if already_known(&staged, &perimeter) {
            summary.unchanged += 1;
            continue;
        }
        staged
            .insert(perimeter)
            .map_err(|source| ReferenceError::Perimeter { row, source })?;
        summary.inserted += 1;
    }

    info!(
        inserted = summary.inserted,
        unchanged = summary.unchanged,
        "perimeters imported"
    );
    Ok((staged, summary))
}

fn already_known(registry: &PerimeterRegistry, perimeter: &Perimeter) -> bool {
    match perimeter.kind {
        PerimeterKind::Country => true,
        PerimeterKind::Region | PerimeterKind::Department => registry
            .iter()
            .any(|known| known.kind == perimeter.kind && known.code == perimeter.code),
        PerimeterKind::City => false,
    }
}

/// Load sectors, creating their groups on first mention.
pub fn import_sectors<R: Read>(
    taxonomy: &Taxonomy,
    reader: R,
) -> Result<(Taxonomy, ImportSummary), ReferenceError> {
    let mut staged = taxonomy.clone();
    let mut summary = ImportSummary::default();
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    for (index, record) in csv_reader.deserialize::<SectorRow>().enumerate() {
        let row = index + 2;
        let record = record?;
        if record.name.is_empty() {
            return Err(ReferenceError::Row {
                row,
                reason: "sector name is required".to_string(),
            });
        }
        let group = match record.group.as_deref() {
            Some(name) => {
                let slug = slugify(name);
                if staged.group(&slug).is_err() {
                    staged
                        .add_group(name)
                        .map_err(|source| ReferenceError::Sector { row, source })?;
                    debug!(group = %slug, "sector group created");
                }
                Some(slug)
            }
            None => None,
        };
        staged
            .add_sector(group.as_deref(), &record.name)
            .map_err(|source| ReferenceError::Sector { row, source })?;
        summary.inserted += 1;
    }

    if staged.sector_count() == 0 {
        return Err(ReferenceError::ReferenceDataMissing("sectors"));
    }
    info!(inserted = summary.inserted, "sectors imported");
    Ok((staged, summary))
}

pub fn import_perimeters_from_path(
    registry: &PerimeterRegistry,
    path: &Path,
) -> Result<(PerimeterRegistry, ImportSummary), ReferenceError> {
    import_perimeters(registry, open(path)?)
}

pub fn import_sectors_from_path(
    taxonomy: &Taxonomy,
    path: &Path,
) -> Result<(Taxonomy, ImportSummary), ReferenceError> {
    import_sectors(taxonomy, open(path)?)
}

fn open(path: &Path) -> Result<File, ReferenceError> {
    File::open(path).map_err(|source| ReferenceError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PERIMETERS: &str = "\
kind,name,slug,code,department_code,region_code,post_codes,latitude,longitude
COUNTRY,France,france,FR,,,,,
REGION,Auvergne-Rhône-Alpes,,84,,84,,,
DEPARTMENT,Isère,,38,38,84,,,
CITY,Grenoble,,38185,38,84,38000|38100,45.1885,5.7245
CITY,Échirolles,,38151,38,84,38130,45.1436,5.7192
";

    #[test]
    fn perimeter_import_adds_cities_and_keeps_reference_tables() {
        let base = PerimeterRegistry::with_reference_tables();
        let (registry, summary) =
            import_perimeters(&base, PERIMETERS.as_bytes()).expect("import succeeds");
        assert_eq!(
            summary,
            ImportSummary {
                inserted: 2,
                unchanged: 3
            }
        );
        let grenoble = registry.lookup_by_slug("grenoble-38").expect("city");
        assert_eq!(grenoble.post_codes, vec!["38000", "38100"]);
        assert!(grenoble.coords.is_some());
        assert!(registry
            .contains("isere", "echirolles-38")
            .expect("known slugs"));
        assert_eq!(base.count(PerimeterKind::City), 0);
    }

    #[test]
    fn inconsistent_row_fails_the_whole_import() {
        let base = PerimeterRegistry::with_reference_tables();
        let csv = "\
kind,name,slug,code,department_code,region_code,post_codes,latitude,longitude
CITY,Grenoble,,38185,38,84,38000,45.1885,5.7245
CITY,Nulle Part,,99999,38,,,,
";
        match import_perimeters(&base, csv.as_bytes()) {
            Err(ReferenceError::Perimeter {
                row,
                source: PerimeterError::Inconsistent { .. },
            }) => assert_eq!(row, 3),
            other => panic!("expected inconsistent city, got {other:?}"),
        }

        let unknown_department = "\
kind,name,slug,code,department_code,region_code,post_codes,latitude,longitude
CITY,Ailleurs,,00001,00,84,,,
";
        match import_perimeters(&base, unknown_department.as_bytes()) {
            Err(ReferenceError::Perimeter { .. }) => {}
            other => panic!("expected unknown department, got {other:?}"),
        }
    }

    #[test]
    fn import_requires_the_reference_tables() {
        match import_perimeters(&PerimeterRegistry::new(), PERIMETERS.as_bytes()) {
            Err(ReferenceError::ReferenceDataMissing(table)) => assert_eq!(table, "departments"),
            other => panic!("expected missing reference data, got {other:?}"),
        }
    }

    #[test]
    fn sector_import_creates_groups() {
        let csv = "\
group,name
Services,Nettoyage
Services,Autre
Restauration,Traiteur
Restauration,Autre
";
        let (taxonomy, summary) = import_sectors(&Taxonomy::new(), csv.as_bytes()).expect("import");
        assert_eq!(summary.inserted, 4);
        assert!(taxonomy.sector("autre-services").is_ok());
        assert!(taxonomy.sector("autre-restauration").is_ok());
        assert_eq!(
            taxonomy.sector("traiteur").expect("sector").group.as_deref(),
            Some("restauration")
        );

        match import_sectors(&Taxonomy::new(), "group,name\n".as_bytes()) {
            Err(ReferenceError::ReferenceDataMissing(_)) => {}
            other => panic!("expected missing sectors, got {other:?}"),
        }
        match import_sectors(&taxonomy, "group,name\n,Traiteur\n".as_bytes()) {
            Err(ReferenceError::Sector { row: 2, .. }) => {}
            other => panic!("expected duplicate sector, got {other:?}"),
        }
    }
}
