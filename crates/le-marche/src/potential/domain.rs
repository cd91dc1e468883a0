use serde::{Deserialize, Serialize};

use crate::config::PotentialLimits;
use crate::perimeters::PerimeterKind;

/// Query of the inclusive-potential analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PotentialQuery {
    pub sector: String,
    #[serde(default)]
    pub perimeter: Option<String>,
    /// Buyer budget in euros.
    #[serde(default)]
    pub budget: Option<u64>,
}

/// Procurement lever suggested to the buyer, from weakest to strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    Aucun,
    Clause,
    Lot,
    Reservation,
}

impl RecommendationKind {
    /// Thresholds are strict: the count must exceed the limit.
    pub fn select(count: usize, eco_dependency: Option<u64>, limits: &PotentialLimits) -> Self {
        let count = count as u64;
        if count > u64::from(limits.reservation) {
            match eco_dependency {
                Some(eco) if eco < u64::from(limits.eco_dependency) => {
                    RecommendationKind::Reservation
                }
                _ => RecommendationKind::Lot,
            }
        } else if count > u64::from(limits.lot) {
            RecommendationKind::Lot
        } else if count > u64::from(limits.clause) {
            RecommendationKind::Clause
        } else {
            RecommendationKind::Aucun
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            RecommendationKind::Reservation => "Réservation totale",
            RecommendationKind::Lot => "Lot réservé",
            RecommendationKind::Clause => "Clause sociale d'exécution",
            RecommendationKind::Aucun => "Aucun potentiel inclusif identifié",
        }
    }

    pub const fn response(self) -> &'static str {
        match self {
            RecommendationKind::Reservation => {
                "Vous pouvez réserver l'ensemble de votre projet d'achat à des fournisseurs inclusifs !"
            }
            RecommendationKind::Lot => {
                "Vous pouvez allotir votre projet d'achat et en réserver certains lots !"
            }
            RecommendationKind::Clause => {
                "Vous pouvez intégrer une clause sociale d'exécution dans votre projet d'achat !"
            }
            RecommendationKind::Aucun => {
                "Le potentiel inclusif de votre projet d'achat est trop faible pour le moment."
            }
        }
    }

    fn conclusion(self) -> &'static str {
        match self {
            RecommendationKind::Reservation => {
                "L'offre inclusive est suffisante et bien dimensionnée : le marché peut être \
                 entièrement réservé (art. L.2113-12 et 13, L.3113-2-1) si le besoin est homogène."
            }
            RecommendationKind::Lot => {
                "L'offre inclusive ne peut pas couvrir seule l'ensemble du projet : allotissez-le \
                 et réservez un ou plusieurs lots à des fournisseurs inclusifs."
            }
            RecommendationKind::Clause => {
                "L'analyse économique montre un risque de dépendance : une clause sociale \
                 d'insertion (art. L.2112-2) permet d'agir sans modifier la procédure."
            }
            RecommendationKind::Aucun => {
                "Aucun dispositif inclusif n'est envisageable à ce stade : lancez un sourcing \
                 inversé pour vérifier la faisabilité du projet."
            }
        }
    }

    /// Explanation interpolated with the analysis figures.
    pub fn explain(self, count: usize, eco_dependency: u64, average_revenue: u64) -> String {
        if self == RecommendationKind::Aucun {
            return self.conclusion().to_string();
        }
        format!(
            "Après analyse, nous identifions {count} fournisseurs potentiels avec un taux de \
             dépendance économique moyen de {eco_dependency}% et un chiffre d'affaires moyen de \
             {average_revenue}€.\n\n{}",
            self.conclusion()
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub title: &'static str,
    pub response: &'static str,
    /// Absent when no candidate declares a revenue.
    pub explanation: Option<String>,
}

/// Aggregates over the candidate set of a sector and perimeter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PotentialReport {
    pub sector_name: String,
    pub perimeter_name: Option<String>,
    pub perimeter_kind: Option<PerimeterKind>,
    pub potential_siaes: usize,
    pub insertion_siaes: usize,
    pub handicap_siaes: usize,
    pub siaes_with_super_badge: usize,
    pub insertion_employees_total: f64,
    pub insertion_employees_average: Option<f64>,
    pub handicap_employees_total: u32,
    pub handicap_employees_average: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ca_average: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eco_dependency: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<Recommendation>,
}
