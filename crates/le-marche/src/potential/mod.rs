//! Inclusive potential: candidate-set aggregates turned into a procurement recommendation.

pub mod domain;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{PotentialQuery, PotentialReport, Recommendation, RecommendationKind};
pub use router::potential_router;
pub use service::InclusivePotential;
