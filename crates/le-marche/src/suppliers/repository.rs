use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use super::domain::{Supplier, SupplierId};
use crate::repository::{lock, HistoryAction, HistoryRecord, RepositoryError};

/// Storage abstraction so the catalog and search can be exercised in isolation.
///
/// Each write is one critical section that also appends the history record.
pub trait SupplierRepository: Send + Sync {
    /// Assigns the id. Fails with `Conflict` when the slug is taken.
    fn insert(&self, supplier: Supplier) -> Result<Supplier, RepositoryError>;
    /// Fails with `Conflict` when the slug belongs to another supplier.
    fn update(&self, supplier: Supplier) -> Result<Supplier, RepositoryError>;
    /// Removes the supplier together with everything it owns.
    fn delete(&self, id: SupplierId) -> Result<Supplier, RepositoryError>;
    fn fetch(&self, id: SupplierId) -> Result<Option<Supplier>, RepositoryError>;
    /// Snapshot of every stored supplier, live or not.
    fn list(&self) -> Result<Vec<Supplier>, RepositoryError>;
    fn history(&self, id: SupplierId) -> Result<Vec<HistoryRecord>, RepositoryError>;

    fn live(&self) -> Result<Vec<Supplier>, RepositoryError> {
        Ok(self
            .list()?
            .into_iter()
            .filter(Supplier::is_live)
            .collect())
    }
}

#[derive(Default)]
struct SupplierState {
    next_id: u64,
    suppliers: BTreeMap<SupplierId, Supplier>,
    history: Vec<HistoryRecord>,
}

impl SupplierState {
    fn slug_taken(&self, slug: &str, except: Option<SupplierId>) -> bool {
        self.suppliers
            .values()
            .any(|existing| existing.slug == slug && Some(existing.id) != except)
    }
}

/// Process-local store used by the API host and the tests.
#[derive(Default, Clone)]
pub struct InMemorySupplierRepository {
    state: Arc<Mutex<SupplierState>>,
}

impl SupplierRepository for InMemorySupplierRepository {
    fn insert(&self, mut supplier: Supplier) -> Result<Supplier, RepositoryError> {
        let mut state = lock(&self.state, "supplier store")?;
        if state.slug_taken(&supplier.slug, None) {
            return Err(RepositoryError::Conflict);
        }
        state.next_id += 1;
        supplier.id = SupplierId(state.next_id);
        let record = HistoryRecord::capture(supplier.id.0, HistoryAction::Created, &supplier)?;
        state.history.push(record);
        state.suppliers.insert(supplier.id, supplier.clone());
        Ok(supplier)
    }

    fn update(&self, supplier: Supplier) -> Result<Supplier, RepositoryError> {
        let mut state = lock(&self.state, "supplier store")?;
        if !state.suppliers.contains_key(&supplier.id) {
            return Err(RepositoryError::NotFound);
        }
        if state.slug_taken(&supplier.slug, Some(supplier.id)) {
            return Err(RepositoryError::Conflict);
        }
        let record = HistoryRecord::capture(supplier.id.0, HistoryAction::Updated, &supplier)?;
        state.history.push(record);
        state.suppliers.insert(supplier.id, supplier.clone());
        Ok(supplier)
    }

    fn delete(&self, id: SupplierId) -> Result<Supplier, RepositoryError> {
        let mut state = lock(&self.state, "supplier store")?;
        let removed = state.suppliers.remove(&id).ok_or(RepositoryError::NotFound)?;
        let record = HistoryRecord::capture(id.0, HistoryAction::Deleted, &removed)?;
        state.history.push(record);
        Ok(removed)
    }

    fn fetch(&self, id: SupplierId) -> Result<Option<Supplier>, RepositoryError> {
        let state = lock(&self.state, "supplier store")?;
        Ok(state.suppliers.get(&id).cloned())
    }

    fn list(&self) -> Result<Vec<Supplier>, RepositoryError> {
        let state = lock(&self.state, "supplier store")?;
        Ok(state.suppliers.values().cloned().collect())
    }

    fn history(&self, id: SupplierId) -> Result<Vec<HistoryRecord>, RepositoryError> {
        let state = lock(&self.state, "supplier store")?;
        Ok(state
            .history
            .iter()
            .filter(|record| record.entity_id == id.0)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::SupplierKind;

    fn supplier(slug: &str) -> Supplier {
        let mut supplier = Supplier::new("12345678900011", "Atelier", SupplierKind::Ei);
        supplier.slug = slug.to_string();
        supplier
    }

    #[test]
    fn insert_assigns_ids_and_rejects_slug_conflicts() {
        let repository = InMemorySupplierRepository::default();
        let first = repository.insert(supplier("atelier-38")).expect("inserted");
        assert_eq!(first.id, SupplierId(1));
        match repository.insert(supplier("atelier-38")) {
            Err(RepositoryError::Conflict) => {}
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[test]
    fn writes_append_history_and_delete_cascades() {
        let repository = InMemorySupplierRepository::default();
        let mut stored = repository.insert(supplier("atelier-38")).expect("inserted");
        stored.description = Some("Nouvelle description".to_string());
        repository.update(stored.clone()).expect("updated");
        repository.delete(stored.id).expect("deleted");

        let actions: Vec<HistoryAction> = repository
            .history(stored.id)
            .expect("history")
            .into_iter()
            .map(|record| record.action)
            .collect();
        assert_eq!(
            actions,
            vec![
                HistoryAction::Created,
                HistoryAction::Updated,
                HistoryAction::Deleted
            ]
        );
        assert!(repository.fetch(stored.id).expect("fetch").is_none());
        match repository.update(stored) {
            Err(RepositoryError::NotFound) => {}
            other => panic!("expected not found, got {other:?}"),
        }
    }

    #[test]
    fn live_excludes_inactive_and_delisted() {
        let repository = InMemorySupplierRepository::default();
        repository.insert(supplier("a")).expect("inserted");
        let mut delisted = supplier("b");
        delisted.is_delisted = true;
        repository.insert(delisted).expect("inserted");
        let mut inactive = supplier("c");
        inactive.is_active = false;
        repository.insert(inactive).expect("inserted");

        let live = repository.live().expect("live");
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].slug, "a");
    }
}
