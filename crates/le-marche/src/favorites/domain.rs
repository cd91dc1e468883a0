use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::suppliers::SupplierId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct FavoriteListId(pub u64);

impl fmt::Display for FavoriteListId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteItem {
    pub supplier_id: SupplierId,
    pub added_at: DateTime<Utc>,
}

/// Named set of suppliers owned by one buyer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteList {
    pub id: FavoriteListId,
    pub slug: String,
    pub name: String,
    pub user: String,
    /// Most recent first.
    pub items: Vec<FavoriteItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FavoriteList {
    pub fn contains(&self, supplier: SupplierId) -> bool {
        self.items.iter().any(|item| item.supplier_id == supplier)
    }
}
