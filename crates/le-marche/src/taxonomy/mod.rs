//! Sector taxonomy and the closed enumerations describing suppliers.

pub mod kinds;
pub mod registry;

pub use kinds::{KindFamily, LegalForm, ServiceType, SupplierKind, Territory};
pub use registry::{NamedEntry, Sector, SectorGroup, Taxonomy, TaxonomyError, TaxonomyTable};
