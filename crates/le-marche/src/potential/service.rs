use std::sync::Arc;

use tracing::debug;

use super::domain::{PotentialQuery, PotentialReport, Recommendation, RecommendationKind};
use crate::config::PotentialLimits;
use crate::search::{SearchError, SupplierQuery, SupplierSearch};
use crate::suppliers::{Supplier, SupplierRepository};
use crate::taxonomy::KindFamily;

/// Scores how much of a purchase the inclusive sector could take on.
pub struct InclusivePotential<R> {
    search: Arc<SupplierSearch<R>>,
    limits: PotentialLimits,
}

impl<R> InclusivePotential<R>
where
    R: SupplierRepository + 'static,
{
    pub fn new(search: Arc<SupplierSearch<R>>, limits: PotentialLimits) -> Self {
        Self { search, limits }
    }

    pub fn analyse(&self, query: &PotentialQuery) -> Result<PotentialReport, SearchError> {
        let sector = self
            .search
            .taxonomy()
            .sector(&query.sector)
            .map_err(|_| SearchError::UnknownReferent {
                kind: "sector",
                slug: query.sector.clone(),
            })?;
        let perimeter = match query.perimeter.as_deref() {
            Some(slug) => Some(self.search.perimeters().lookup_by_slug(slug).map_err(|_| {
                SearchError::UnknownReferent {
                    kind: "perimeter",
                    slug: slug.to_string(),
                }
            })?),
            None => None,
        };

        let candidates = self.search.candidates(&SupplierQuery {
            sectors: vec![query.sector.clone()],
            perimeters: query.perimeter.iter().cloned().collect(),
            include_country_area: true,
            ..SupplierQuery::default()
        })?;
        let tally = Tally::over(&candidates);

        let mut report = PotentialReport {
            sector_name: sector.name.clone(),
            perimeter_name: perimeter.map(|perimeter| perimeter.name.clone()),
            perimeter_kind: perimeter.map(|perimeter| perimeter.kind),
            potential_siaes: candidates.len(),
            insertion_siaes: tally.insertion,
            handicap_siaes: tally.handicap,
            siaes_with_super_badge: tally.super_badges,
            insertion_employees_total: tally.insertion_employees,
            insertion_employees_average: average(tally.insertion_employees, tally.insertion_reporting),
            handicap_employees_total: tally.handicap_employees,
            handicap_employees_average: average(
                f64::from(tally.handicap_employees),
                tally.handicap_reporting,
            ),
            ca_average: None,
            eco_dependency: None,
            recommendation: None,
        };

        if let Some(budget) = query.budget.filter(|budget| *budget > 0) {
            if tally.revenue_reporting > 0 {
                let average_revenue =
                    (tally.revenue_total as f64 / tally.revenue_reporting as f64).round() as u64;
                if average_revenue > 0 {
                    report.ca_average = Some(average_revenue);
                    report.eco_dependency =
                        Some((budget as f64 / average_revenue as f64 * 100.0).round() as u64);
                }
            }
            let kind =
                RecommendationKind::select(candidates.len(), report.eco_dependency, &self.limits);
            let explanation = match (report.eco_dependency, report.ca_average) {
                (Some(eco), Some(average)) => Some(kind.explain(candidates.len(), eco, average)),
                _ => None,
            };
            report.recommendation = Some(Recommendation {
                kind,
                title: kind.title(),
                response: kind.response(),
                explanation,
            });
        }

        debug!(
            sector = %query.sector,
            candidates = report.potential_siaes,
            eco_dependency = ?report.eco_dependency,
            "inclusive potential computed"
        );
        Ok(report)
    }
}

/// Single-pass accumulator over the candidate set.
#[derive(Debug, Default)]
struct Tally {
    insertion: usize,
    handicap: usize,
    super_badges: usize,
    insertion_employees: f64,
    insertion_reporting: usize,
    handicap_employees: u32,
    handicap_reporting: usize,
    revenue_total: u64,
    revenue_reporting: usize,
}

impl Tally {
    fn over(candidates: &[Supplier]) -> Self {
        let mut tally = Self::default();
        for supplier in candidates {
            match supplier.kind.family() {
                KindFamily::Insertion => {
                    tally.insertion += 1;
                    let employees = supplier
                        .asp_etp_count
                        .or(supplier.employees_insertion_count.map(f64::from));
                    if let Some(employees) = employees {
                        tally.insertion_employees += employees;
                        tally.insertion_reporting += 1;
                    }
                }
                KindFamily::Handicap => {
                    tally.handicap += 1;
                    if let Some(employees) = supplier.employees_insertion_count {
                        tally.handicap_employees += employees;
                        tally.handicap_reporting += 1;
                    }
                }
            }
            if supplier.counters.super_badge {
                tally.super_badges += 1;
            }
            if let Some(revenue) = supplier.revenue() {
                tally.revenue_total += revenue;
                tally.revenue_reporting += 1;
            }
        }
        tally
    }
}

fn average(total: f64, count: usize) -> Option<f64> {
    (count > 0).then(|| total / count as f64)
}
