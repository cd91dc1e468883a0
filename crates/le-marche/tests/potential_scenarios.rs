mod common;

use common::{activity, market, supplier, zones, Market};
use le_marche::potential::{PotentialQuery, RecommendationKind};
use le_marche::taxonomy::SupplierKind;

fn add_cleaner(market: &Market, index: usize) {
    let mut cleaner = supplier(
        &format!("9{:08}00011", index),
        &format!("Entretien Solidaire {index}"),
        SupplierKind::Ei,
        "38000",
        vec![activity("nettoyage", zones(&["isere"]))],
    );
    cleaner.ca = Some(200_000);
    market.catalog.create(cleaner).expect("supplier created");
}

fn tier(market: &Market, budget: u64) -> (RecommendationKind, Option<u64>) {
    let report = market
        .potential
        .analyse(&PotentialQuery {
            sector: "nettoyage".to_string(),
            perimeter: None,
            budget: Some(budget),
        })
        .expect("analysis succeeds");
    let kind = report
        .recommendation
        .map(|recommendation| recommendation.kind)
        .unwrap_or(RecommendationKind::Aucun);
    (kind, report.eco_dependency)
}

#[test]
fn large_pool_with_low_dependency_recommends_reservation() {
    let market = market();
    for index in 0..25 {
        add_cleaner(&market, index);
    }
    assert_eq!(tier(&market, 10_000), (RecommendationKind::Reservation, Some(5)));
    assert_eq!(tier(&market, 50_000), (RecommendationKind::Lot, Some(25)));
}

#[test]
fn growing_the_pool_never_lowers_the_tier() {
    let market = market();
    let mut previous = tier(&market, 10_000).0;
    for index in 0..25 {
        add_cleaner(&market, index);
        let current = tier(&market, 10_000).0;
        assert!(
            current >= previous,
            "{} suppliers lowered {previous:?} to {current:?}",
            index + 1
        );
        previous = current;
    }
    assert_eq!(previous, RecommendationKind::Reservation);
}
