use serde::{Deserialize, Serialize};

use super::domain::Supplier;
use crate::taxonomy::Taxonomy;
use crate::text::{fold, word_similarity};

/// Folded shadow copy of a supplier's searchable text, rebuilt on every save.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchDocument {
    pub name: String,
    pub brand: String,
    pub siret: String,
    pub content: Vec<String>,
}

impl SearchDocument {
    pub fn build(supplier: &Supplier, taxonomy: &Taxonomy) -> Self {
        let mut content = Vec::new();
        if let Some(description) = supplier.description.as_deref() {
            content.push(fold(description));
        }
        for activity in &supplier.activities {
            if let Ok(sector) = taxonomy.sector(&activity.sector) {
                content.push(fold(&sector.name));
            }
        }
        for offer in &supplier.offers {
            content.push(fold(&offer.name));
        }
        for label in &supplier.labels {
            if let Ok(entry) = taxonomy.label(label) {
                content.push(fold(&entry.name));
            }
        }
        content.retain(|value| !value.is_empty());
        content.dedup();

        Self {
            name: fold(&supplier.name),
            brand: supplier.brand.as_deref().map(fold).unwrap_or_default(),
            siret: supplier.siret.clone(),
            content,
        }
    }

    /// Best trigram similarity of a folded query against every indexed field.
    pub fn similarity(&self, query: &str) -> f32 {
        std::iter::once(&self.name)
            .chain(std::iter::once(&self.brand))
            .chain(self.content.iter())
            .map(|field| word_similarity(query, field))
            .fold(0.0, f32::max)
    }

    pub fn identifier_starts_with(&self, digits: &str) -> bool {
        self.siret.starts_with(digits)
    }
}
