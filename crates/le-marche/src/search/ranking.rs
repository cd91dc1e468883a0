use std::cmp::Ordering;

use super::filter::Candidate;
use crate::text::fold;

/// Total order over filtered candidates: similarity when text was searched, then city
/// distance (unknown last), then profile boosters, then folded name, then id.
pub fn compare(left: &Candidate<'_>, right: &Candidate<'_>) -> Ordering {
    let a = left.supplier;
    let b = right.supplier;

    by_similarity(left.similarity, right.similarity)
        .then_with(|| by_distance(left.distance_km, right.distance_km))
        .then_with(|| boosters(right).cmp(&boosters(left)))
        .then_with(|| fold(&a.name).cmp(&fold(&b.name)))
        .then_with(|| a.id.cmp(&b.id))
}

/// Sort candidates in place, best first.
pub fn rank(candidates: &mut [Candidate<'_>]) {
    candidates.sort_by(compare);
}

fn by_similarity(left: Option<f32>, right: Option<f32>) -> Ordering {
    match (left, right) {
        (Some(left), Some(right)) => right.total_cmp(&left),
        _ => Ordering::Equal,
    }
}

fn by_distance(left: Option<f64>, right: Option<f64>) -> Ordering {
    match (left, right) {
        (Some(left), Some(right)) => left.total_cmp(&right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// has offer, has description, has user, has logo.
fn boosters(candidate: &Candidate<'_>) -> [bool; 4] {
    let supplier = candidate.supplier;
    [
        !supplier.offers.is_empty(),
        supplier.has_description(),
        !supplier.users.is_empty(),
        supplier.has_logo(),
    ]
}
