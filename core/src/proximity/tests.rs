use super::*;

fn point(owner_id: OwnerId, latitude: f64, longitude: f64) -> GeoPoint {
    GeoPoint::new(owner_id, latitude, longitude).expect("point must be valid")
}

fn fixture_points() -> Vec<GeoPoint> {
    vec![
        point(2, 50.0, 51.0),
        point(3, 50.5, 50.2),
        point(4, 49.5, 50.4),
        point(5, 49.7, 50.123_456),
        point(6, 49.9, 50.05),
    ]
}

#[test]
fn evaluate_excludes_origin_owner() {
    let origin = point(1, 50.0, 50.0);
    let query = ProximityQuery::around(origin, 100.0);
    assert_eq!(query.exclude_owner, 1);
    assert_eq!(query.evaluate(&origin), None);

    let twin = point(9, 50.0, 50.0);
    assert_eq!(query.evaluate(&twin), Some(0.0));
}

#[test]
fn evaluate_uses_strict_threshold() {
    let origin = point(1, 0.0, 0.0);
    let query = ProximityQuery::around(origin, 0.0);
    assert_eq!(query.evaluate(&point(2, 0.0, 0.0)), None);

    let target = point(3, 0.0, 1.0);
    let exact = origin.distance_km(&target);
    let query = ProximityQuery::around(origin, exact);
    assert_eq!(query.evaluate(&target), None);
    let query = ProximityQuery::around(origin, exact + 1e-6);
    assert!(query.evaluate(&target).is_some());
}

#[test]
fn scan_orders_by_distance() {
    let origin = point(1, 50.0, 50.0);
    let points = fixture_points();
    let query = ProximityQuery::around(origin, 100.0);

    let scored = scan_candidates(&query, points.iter().map(|p| (p, p.owner_id)));
    let owners: Vec<OwnerId> = scored.iter().map(|hit| hit.item).collect();
    assert_eq!(owners, vec![6, 5, 3, 4, 2]);
    assert!(scored
        .windows(2)
        .all(|pair| pair[0].distance_km <= pair[1].distance_km));
    assert!(scored.iter().all(|hit| hit.distance_km < 100.0));

    let query = ProximityQuery::around(origin, 50.0);
    let scored = scan_candidates(&query, points.iter().map(|p| (p, ())));
    assert_eq!(scored.len(), 2);
    assert!((scored[0].distance_km - 11.68).abs() < 0.005);
    assert!((scored[1].distance_km - 34.51).abs() < 0.005);
}

#[test]
fn scan_breaks_ties_by_owner_id() {
    let origin = point(1, 10.0, 10.0);
    let points = vec![point(8, 10.1, 10.0), point(3, 10.1, 10.0), point(5, 10.1, 10.0)];
    let query = ProximityQuery::around(origin, 50.0);

    let scored = scan_candidates(&query, points.iter().map(|p| (p, ())));
    let owners: Vec<OwnerId> = scored.iter().map(|hit| hit.owner_id).collect();
    assert_eq!(owners, vec![3, 5, 8]);
}

#[test]
fn scan_finds_neighbours_across_the_antimeridian() {
    let origin = point(1, 0.0, 179.9);
    let points = vec![point(2, 0.0, -179.9), point(3, 0.0, 179.0)];
    let query = ProximityQuery::around(origin, 50.0);

    let scored = scan_candidates(&query, points.iter().map(|p| (p, ())));
    assert_eq!(scored.len(), 1);
    assert_eq!(scored[0].owner_id, 2);
    assert!(scored[0].distance_km < 25.0);
}

#[test]
fn scan_finds_neighbours_over_the_pole() {
    let origin = point(1, 89.95, 0.0);
    let points = vec![point(2, 89.95, 180.0), point(3, 89.0, 90.0)];
    let query = ProximityQuery::around(origin, 20.0);

    let scored = scan_candidates(&query, points.iter().map(|p| (p, ())));
    assert_eq!(scored.len(), 1);
    assert_eq!(scored[0].owner_id, 2);
}
