use super::*;

const EPSILON: f64 = 1e-9;

fn approx_eq_tol(left: f64, right: f64, epsilon: f64) {
    assert!((left - right).abs() < epsilon, "expected {left} ~= {right}");
}

fn deterministic_unit(seed: u64) -> f64 {
    let mixed = seed
        .wrapping_mul(6_364_136_223_846_793_005)
        .wrapping_add(1_442_695_040_888_963_407);
    (mixed >> 11) as f64 / (1u64 << 53) as f64
}

/// Destination point reached from (lat, lon) after `distance_km` on `bearing_deg`.
fn destination(lat: f64, lon: f64, bearing_deg: f64, distance_km: f64) -> (f64, f64) {
    let lat1 = lat.to_radians();
    let lon1 = lon.to_radians();
    let bearing = bearing_deg.to_radians();
    let angular = distance_km / EARTH_RADIUS_KM;

    let lat2 = (lat1.sin() * angular.cos() + lat1.cos() * angular.sin() * bearing.cos()).asin();
    let lon2 = lon1
        + (bearing.sin() * angular.sin() * lat1.cos())
            .atan2(angular.cos() - lat1.sin() * lat2.sin());
    let mut lon2 = lon2.to_degrees();
    if lon2 > 180.0 {
        lon2 -= 360.0;
    } else if lon2 < -180.0 {
        lon2 += 360.0;
    }
    (lat2.to_degrees(), lon2)
}

#[test]
fn geo_point_quantizes_to_six_decimals() {
    let point = GeoPoint::new(7, 50.123_456_789, -3.000_000_4).expect("point must be valid");
    assert_eq!(point.owner_id, 7);
    approx_eq_tol(point.latitude, 50.123_457, EPSILON);
    approx_eq_tol(point.longitude, -3.0, EPSILON);
}

#[test]
fn geo_point_rejects_out_of_range_and_non_finite() {
    assert!(matches!(
        GeoPoint::new(1, 90.5, 0.0),
        Err(GeoError::LatitudeOutOfRange(_))
    ));
    assert!(matches!(
        GeoPoint::new(1, 0.0, -180.1),
        Err(GeoError::LongitudeOutOfRange(_))
    ));
    assert!(matches!(
        GeoPoint::new(1, f64::NAN, 0.0),
        Err(GeoError::NonFinite { .. })
    ));
    GeoPoint::new(1, -90.0, 180.0).expect("range limits are inclusive");
}

#[test]
fn distance_is_zero_for_identical_points() {
    for seed in 0..200u64 {
        let lat = deterministic_unit(seed) * 180.0 - 90.0;
        let lon = deterministic_unit(seed + 10_000) * 360.0 - 180.0;
        assert_eq!(haversine_distance_km(lat, lon, lat, lon), 0.0);
    }
}

#[test]
fn distance_is_symmetric() {
    for seed in 0..200u64 {
        let lat1 = deterministic_unit(seed) * 180.0 - 90.0;
        let lon1 = deterministic_unit(seed + 1) * 360.0 - 180.0;
        let lat2 = deterministic_unit(seed + 2) * 180.0 - 90.0;
        let lon2 = deterministic_unit(seed + 3) * 360.0 - 180.0;
        let forward = haversine_distance_km(lat1, lon1, lat2, lon2);
        let backward = haversine_distance_km(lat2, lon2, lat1, lon1);
        assert!(forward.is_finite());
        approx_eq_tol(forward, backward, 1e-9);
    }
}

#[test]
fn distance_matches_known_fixture_values() {
    let nearest = haversine_distance_km(50.0, 50.0, 49.9, 50.05);
    assert!((nearest - 11.68).abs() < 0.005, "got {nearest}");

    let second = haversine_distance_km(50.0, 50.0, 49.7, 50.123_456);
    assert!((second - 34.51).abs() < 0.005, "got {second}");

    let antipodal = haversine_distance_km(0.0, 0.0, 0.0, 180.0);
    approx_eq_tol(antipodal, PI * EARTH_RADIUS_KM, 1e-6);
}

#[test]
fn distance_never_nan_for_nearly_identical_points() {
    let value = haversine_distance_km(45.000_001, 7.000_001, 45.000_002, 7.000_001);
    assert!(value.is_finite());
    assert!(value < 0.001);
}

#[test]
fn bounding_box_contains_every_point_inside_the_circle() {
    for seed in 0..500u64 {
        let lat = deterministic_unit(seed * 5) * 160.0 - 80.0;
        let lon = deterministic_unit(seed * 5 + 1) * 360.0 - 180.0;
        let radius = 1.0 + deterministic_unit(seed * 5 + 2) * 99.0;
        let bearing = deterministic_unit(seed * 5 + 3) * 360.0;
        let fraction = deterministic_unit(seed * 5 + 4) * 0.999;

        let bbox = calculate_bounding_box(lat, lon, radius);
        let (plat, plon) = destination(lat, lon, bearing, radius * fraction);

        assert!(
            haversine_distance_km(lat, lon, plat, plon) < radius,
            "generated point must lie inside the circle"
        );
        assert!(
            bbox.contains(plat, plon),
            "box {bbox:?} misses ({plat}, {plon}) around ({lat}, {lon}) r={radius}"
        );
    }
}

#[test]
fn bounding_box_spans_at_least_the_circle_extent() {
    for seed in 0..200u64 {
        let lat = deterministic_unit(seed) * 160.0 - 80.0;
        let radius = 1.0 + deterministic_unit(seed + 77) * 99.0;
        let bbox = calculate_bounding_box(lat, 0.0, radius);
        let angular_deg = (radius / EARTH_RADIUS_KM).to_degrees();

        approx_eq_tol(bbox.lat_max - lat, angular_deg, 1e-9);
        approx_eq_tol(lat - bbox.lat_min, angular_deg, 1e-9);
        assert!(bbox.lon_max - bbox.lon_min >= 2.0 * angular_deg - 1e-9);
    }
}

#[test]
fn bounding_box_at_north_pole_covers_all_longitudes() {
    for lon in [-180.0, -42.5, 0.0, 120.0, 180.0] {
        let bbox = calculate_bounding_box(90.0, lon, 25.0);
        assert_eq!(bbox.lat_max, 90.0);
        assert_eq!(bbox.lon_min, -180.0);
        assert_eq!(bbox.lon_max, 180.0);
        assert!(bbox.lat_min < 90.0);
        assert!(bbox.contains(89.9, lon));
    }
}

#[test]
fn bounding_box_at_south_pole_clamps_latitude() {
    let bbox = calculate_bounding_box(-89.95, 10.0, 100.0);
    assert_eq!(bbox.lat_min, -90.0);
    assert_eq!(bbox.lon_min, -180.0);
    assert_eq!(bbox.lon_max, 180.0);
    assert!(bbox.contains(-89.5, -170.0));
}

#[test]
fn bounding_box_wraps_across_antimeridian_eastward() {
    let bbox = calculate_bounding_box(0.0, 179.9, 50.0);
    assert!(bbox.wraps_antimeridian());
    assert!(bbox.lon_max < 0.0);
    assert!(bbox.lon_max > -180.0 && bbox.lon_max < -179.0);
    assert!(bbox.lon_min > 179.0);
    assert!(bbox.contains(0.0, -179.9));
    assert!(bbox.contains(0.0, 179.95));
    assert!(!bbox.contains(0.0, 0.0));
}

#[test]
fn bounding_box_wraps_across_antimeridian_westward() {
    let bbox = calculate_bounding_box(10.0, -179.95, 80.0);
    assert!(bbox.wraps_antimeridian());
    assert!(bbox.lon_min > 179.0);
    assert!(bbox.contains(10.0, 179.8));
    assert!(bbox.contains(10.0, -179.5));
}

#[test]
fn bounding_box_handles_zero_and_invalid_radius() {
    let bbox = calculate_bounding_box(50.0, 50.0, 0.0);
    approx_eq_tol(bbox.lat_min, 50.0, EPSILON);
    approx_eq_tol(bbox.lat_max, 50.0, EPSILON);
    approx_eq_tol(bbox.lon_min, 50.0, EPSILON);
    approx_eq_tol(bbox.lon_max, 50.0, EPSILON);

    let bbox = calculate_bounding_box(90.0, 0.0, 0.0);
    assert!(bbox.lat_min.is_finite() && bbox.lon_min.is_finite());

    let bbox = calculate_bounding_box(10.0, 10.0, f64::NAN);
    approx_eq_tol(bbox.lat_min, 10.0, EPSILON);
    approx_eq_tol(bbox.lat_max, 10.0, EPSILON);
}

#[test]
fn bounding_box_never_produces_nan_near_the_pole() {
    for radius in [0.0, 1.0, 50.0, 100.0, 5_000.0] {
        for lat in [89.0, 89.999_999, -89.999_999, 90.0, -90.0] {
            let bbox = calculate_bounding_box(lat, 179.999, radius);
            assert!(bbox.lat_min.is_finite());
            assert!(bbox.lat_max.is_finite());
            assert!(bbox.lon_min.is_finite());
            assert!(bbox.lon_max.is_finite());
            assert!(bbox.lat_min <= bbox.lat_max);
        }
    }
}
