use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tracing::debug;

use super::domain::{FavoriteItem, FavoriteList, FavoriteListId};
use crate::repository::{lock, RepositoryError};
use crate::suppliers::SupplierId;
use crate::text::{random_suffix, slugify, truncate_slug};

const SLUG_NAME_MAX_CHARS: usize = 40;

/// Error raised by favorite list operations.
#[derive(Debug, thiserror::Error)]
pub enum FavoriteError {
    #[error("list name is required")]
    EmptyName,
    #[error("favorite list {0} not found")]
    ListNotFound(FavoriteListId),
    #[error("supplier {supplier} is already in the favorite list '{list}'")]
    AlreadyFavorited { supplier: SupplierId, list: String },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Buyer favorite lists. A supplier sits in at most one list per user; the check and
/// the insertion happen in the same critical section.
pub trait FavoriteStore: Send + Sync {
    fn create_list(&self, user: &str, name: &str, now: DateTime<Utc>) -> Result<FavoriteList, FavoriteError>;
    fn add(
        &self,
        user: &str,
        list: FavoriteListId,
        supplier: SupplierId,
        now: DateTime<Utc>,
    ) -> Result<FavoriteList, FavoriteError>;
    /// Returns whether the supplier was in the list.
    fn remove(
        &self,
        user: &str,
        list: FavoriteListId,
        supplier: SupplierId,
    ) -> Result<bool, FavoriteError>;
    fn delete_list(&self, user: &str, list: FavoriteListId) -> Result<FavoriteList, FavoriteError>;
    fn lists_for(&self, user: &str) -> Result<Vec<FavoriteList>, FavoriteError>;
}

#[derive(Default)]
struct FavoriteState {
    next_id: u64,
    lists: BTreeMap<FavoriteListId, FavoriteList>,
}

impl FavoriteState {
    /// Lists are only visible to their owner.
    fn owned_mut(&mut self, user: &str, id: FavoriteListId) -> Result<&mut FavoriteList, FavoriteError> {
        self.lists
            .get_mut(&id)
            .filter(|list| list.user == user)
            .ok_or(FavoriteError::ListNotFound(id))
    }
}

#[derive(Default, Clone)]
pub struct InMemoryFavoriteStore {
    state: Arc<Mutex<FavoriteState>>,
}

impl FavoriteStore for InMemoryFavoriteStore {
    fn create_list(&self, user: &str, name: &str, now: DateTime<Utc>) -> Result<FavoriteList, FavoriteError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(FavoriteError::EmptyName);
        }
        let mut state = lock(&self.state, "favorite store")?;
        state.next_id += 1;
        let list = FavoriteList {
            id: FavoriteListId(state.next_id),
            slug: format!(
                "{}-{}",
                truncate_slug(&slugify(name), SLUG_NAME_MAX_CHARS),
                random_suffix()
            ),
            name: name.to_string(),
            user: user.to_string(),
            items: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        state.lists.insert(list.id, list.clone());
        Ok(list)
    }

    fn add(
        &self,
        user: &str,
        list: FavoriteListId,
        supplier: SupplierId,
        now: DateTime<Utc>,
    ) -> Result<FavoriteList, FavoriteError> {
        let mut state = lock(&self.state, "favorite store")?;
        state.owned_mut(user, list)?;
        if let Some(holder) = state
            .lists
            .values()
            .find(|existing| existing.user == user && existing.contains(supplier))
        {
            return Err(FavoriteError::AlreadyFavorited {
                supplier,
                list: holder.name.clone(),
            });
        }
        let target = state.owned_mut(user, list)?;
        target.items.insert(
            0,
            FavoriteItem {
                supplier_id: supplier,
                added_at: now,
            },
        );
        target.updated_at = now;
        debug!(list_id = %list, supplier_id = %supplier, "supplier added to favorites");
        Ok(target.clone())
    }

    fn remove(
        &self,
        user: &str,
        list: FavoriteListId,
        supplier: SupplierId,
    ) -> Result<bool, FavoriteError> {
        let mut state = lock(&self.state, "favorite store")?;
        let target = state.owned_mut(user, list)?;
        let before = target.items.len();
        target.items.retain(|item| item.supplier_id != supplier);
        Ok(target.items.len() != before)
    }

    fn delete_list(&self, user: &str, list: FavoriteListId) -> Result<FavoriteList, FavoriteError> {
        let mut state = lock(&self.state, "favorite store")?;
        state.owned_mut(user, list)?;
        state
            .lists
            .remove(&list)
            .ok_or(FavoriteError::ListNotFound(list))
    }

    fn lists_for(&self, user: &str) -> Result<Vec<FavoriteList>, FavoriteError> {
        let state = lock(&self.state, "favorite store")?;
        Ok(state
            .lists
            .values()
            .filter(|list| list.user == user)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supplier_is_favorited_once_per_user() {
        let store = InMemoryFavoriteStore::default();
        let now = Utc::now();
        let cantines = store.create_list("acheteur", "Cantines", now).expect("list");
        let travaux = store.create_list("acheteur", "Travaux", now).expect("list");
        assert!(cantines.slug.starts_with("cantines-"));

        store
            .add("acheteur", cantines.id, SupplierId(7), now)
            .expect("added");
        match store.add("acheteur", travaux.id, SupplierId(7), now) {
            Err(FavoriteError::AlreadyFavorited { supplier, list }) => {
                assert_eq!(supplier, SupplierId(7));
                assert_eq!(list, "Cantines");
            }
            other => panic!("expected already favorited, got {other:?}"),
        }

        let other_user = store.create_list("autre", "Mes favoris", now).expect("list");
        store
            .add("autre", other_user.id, SupplierId(7), now)
            .expect("other users keep their own lists");
    }

    #[test]
    fn removal_frees_the_supplier_for_another_list() {
        let store = InMemoryFavoriteStore::default();
        let now = Utc::now();
        let first = store.create_list("acheteur", "Première", now).expect("list");
        let second = store.create_list("acheteur", "Seconde", now).expect("list");
        store.add("acheteur", first.id, SupplierId(3), now).expect("added");

        assert!(store.remove("acheteur", first.id, SupplierId(3)).expect("removed"));
        assert!(!store.remove("acheteur", first.id, SupplierId(3)).expect("no-op"));
        let second = store
            .add("acheteur", second.id, SupplierId(3), now)
            .expect("added");
        assert!(second.contains(SupplierId(3)));
    }

    #[test]
    fn lists_are_scoped_to_their_owner() {
        let store = InMemoryFavoriteStore::default();
        let now = Utc::now();
        let list = store.create_list("acheteur", "Cantines", now).expect("list");

        match store.add("intrus", list.id, SupplierId(1), now) {
            Err(FavoriteError::ListNotFound(id)) => assert_eq!(id, list.id),
            other => panic!("expected hidden list, got {other:?}"),
        }
        assert!(store.lists_for("intrus").expect("lists").is_empty());
        assert_eq!(store.lists_for("acheteur").expect("lists").len(), 1);

        store.delete_list("acheteur", list.id).expect("deleted");
        assert!(store.lists_for("acheteur").expect("lists").is_empty());
        match store.create_list("acheteur", "   ", now) {
            Err(FavoriteError::EmptyName) => {}
            other => panic!("expected empty name, got {other:?}"),
        }
    }
}
