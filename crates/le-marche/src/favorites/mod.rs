//! Buyer favorite lists.

pub mod domain;
pub mod repository;

pub use domain::{FavoriteItem, FavoriteList, FavoriteListId};
pub use repository::{FavoriteError, FavoriteStore, InMemoryFavoriteStore};
