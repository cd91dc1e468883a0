//! Supplier search: structured query, filter engine, ranking and pagination.

pub mod filter;
pub mod query;
pub mod ranking;
pub mod resolve;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use filter::{Candidate, FilterEngine, SIMILARITY_THRESHOLD};
pub use query::{EmployeesBucket, NearFilter, RevenueBucket, SupplierQuery};
pub use resolve::{ResolvedQuery, SearchError, TextQuery};
pub use router::search_router;
pub use service::{SearchPage, SupplierSearch, SupplierSummary};
