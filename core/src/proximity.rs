use std::cmp::Ordering;

use crate::geo::{calculate_bounding_box, BoundingBox, GeoPoint, OwnerId};

/// Distance predicate evaluated by a point store.
///
/// A candidate qualifies when it falls inside `bbox`, is not owned by
/// `exclude_owner`, and lies strictly closer than `threshold_km` to `origin`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProximityQuery {
    pub origin: GeoPoint,
    pub bbox: BoundingBox,
    pub threshold_km: f64,
    pub exclude_owner: OwnerId,
}

impl ProximityQuery {
    /// Builds the query around `origin`, excluding the origin's owner.
    pub fn around(origin: GeoPoint, threshold_km: f64) -> Self {
        Self {
            origin,
            bbox: calculate_bounding_box(origin.latitude, origin.longitude, threshold_km),
            threshold_km,
            exclude_owner: origin.owner_id,
        }
    }

    /// Cheap range filter usable by an index on latitude/longitude.
    pub fn admits(&self, point: &GeoPoint) -> bool {
        point.owner_id != self.exclude_owner && self.bbox.contains_point(point)
    }

    pub fn distance_km(&self, point: &GeoPoint) -> f64 {
        self.origin.distance_km(point)
    }

    /// Returns the exact distance when `point` satisfies the full predicate.
    pub fn evaluate(&self, point: &GeoPoint) -> Option<f64> {
        if !self.admits(point) {
            return None;
        }
        let distance = self.distance_km(point);
        debug_assert!(distance.is_finite(), "distance must never be NaN");
        (distance.is_finite() && distance < self.threshold_km).then_some(distance)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate<T> {
    pub owner_id: OwnerId,
    pub distance_km: f64,
    pub item: T,
}

/// Filters `candidates` through `query` and returns the survivors ordered by
/// ascending distance, ties broken by ascending owner id.
pub fn scan_candidates<'a, T, I>(query: &ProximityQuery, candidates: I) -> Vec<ScoredCandidate<T>>
where
    I: IntoIterator<Item = (&'a GeoPoint, T)>,
{
    let mut scored: Vec<ScoredCandidate<T>> = candidates
        .into_iter()
        .filter_map(|(point, item)| {
            query.evaluate(point).map(|distance_km| ScoredCandidate {
                owner_id: point.owner_id,
                distance_km,
                item,
            })
        })
        .collect();
    sort_by_proximity(&mut scored);
    scored
}

pub fn sort_by_proximity<T>(scored: &mut [ScoredCandidate<T>]) {
    scored.sort_by(compare_proximity);
}

fn compare_proximity<T>(left: &ScoredCandidate<T>, right: &ScoredCandidate<T>) -> Ordering {
    left.distance_km
        .total_cmp(&right.distance_km)
        .then_with(|| left.owner_id.cmp(&right.owner_id))
}

#[cfg(test)]
mod tests;
