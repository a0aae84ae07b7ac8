use std::error::Error;
use std::f64::consts::{FRAC_PI_2, PI};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Owner identity shared by users and their stored coordinate.
pub type OwnerId = u64;

/// Mean Earth radius used by every distance computation, in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

pub const MIN_LATITUDE: f64 = -90.0;
pub const MAX_LATITUDE: f64 = 90.0;
pub const MIN_LONGITUDE: f64 = -180.0;
pub const MAX_LONGITUDE: f64 = 180.0;

const COORDINATE_SCALE: f64 = 1_000_000.0;

/// Error type for coordinate validation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeoError {
    /// Returned when latitude or longitude is NaN or infinite.
    NonFinite { latitude: f64, longitude: f64 },
    /// Returned when latitude falls outside [-90, 90].
    LatitudeOutOfRange(f64),
    /// Returned when longitude falls outside [-180, 180].
    LongitudeOutOfRange(f64),
}

impl fmt::Display for GeoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonFinite {
                latitude,
                longitude,
            } => write!(
                f,
                "coordinates must be finite, got latitude={latitude}, longitude={longitude}"
            ),
            Self::LatitudeOutOfRange(value) => {
                write!(f, "latitude must be within [-90, 90], got {value}")
            }
            Self::LongitudeOutOfRange(value) => {
                write!(f, "longitude must be within [-180, 180], got {value}")
            }
        }
    }
}

impl Error for GeoError {}

/// A stored coordinate owned by exactly one user.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub owner_id: OwnerId,
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Validates ranges and quantizes both axes to 6 decimal digits.
    pub fn new(owner_id: OwnerId, latitude: f64, longitude: f64) -> Result<Self, GeoError> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(GeoError::NonFinite {
                latitude,
                longitude,
            });
        }
        let latitude = quantize_coordinate(latitude);
        let longitude = quantize_coordinate(longitude);
        if !(MIN_LATITUDE..=MAX_LATITUDE).contains(&latitude) {
            return Err(GeoError::LatitudeOutOfRange(latitude));
        }
        if !(MIN_LONGITUDE..=MAX_LONGITUDE).contains(&longitude) {
            return Err(GeoError::LongitudeOutOfRange(longitude));
        }

        Ok(Self {
            owner_id,
            latitude,
            longitude,
        })
    }

    /// Great-circle distance to `other` in kilometers.
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        haversine_distance_km(self.latitude, self.longitude, other.latitude, other.longitude)
    }
}

/// Rounds a degree value to the 6 decimal digits kept by storage.
pub fn quantize_coordinate(value: f64) -> f64 {
    (value * COORDINATE_SCALE).round() / COORDINATE_SCALE
}

/// Axis-aligned latitude/longitude rectangle in degrees.
///
/// When the query circle crosses the antimeridian the longitude range wraps,
/// which is represented by `lon_min > lon_max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl BoundingBox {
    pub fn wraps_antimeridian(&self) -> bool {
        self.lon_min > self.lon_max
    }

    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        if latitude < self.lat_min || latitude > self.lat_max {
            return false;
        }
        if self.wraps_antimeridian() {
            longitude >= self.lon_min || longitude <= self.lon_max
        } else {
            longitude >= self.lon_min && longitude <= self.lon_max
        }
    }

    pub fn contains_point(&self, point: &GeoPoint) -> bool {
        self.contains(point.latitude, point.longitude)
    }
}

/// Computes a bounding box that encloses every point within `radius_km` of
/// (`latitude`, `longitude`). Inputs and outputs are in degrees.
///
/// The box is a superset of the query circle; callers filter false positives
/// with [`haversine_distance_km`].
pub fn calculate_bounding_box(latitude: f64, longitude: f64, radius_km: f64) -> BoundingBox {
    let lat = latitude.to_radians();
    let lon = longitude.to_radians();
    let radius_km = if radius_km.is_finite() {
        radius_km.max(0.0)
    } else {
        0.0
    };
    let angular_radius = radius_km / EARTH_RADIUS_KM;

    let mut lat_min = lat - angular_radius;
    let mut lat_max = lat + angular_radius;
    let lon_min;
    let lon_max;

    if lat_min > -FRAC_PI_2 && lat_max < FRAC_PI_2 {
        let ratio = (angular_radius.sin() / lat.cos()).clamp(-1.0, 1.0);
        let delta_lon = ratio.asin();

        let mut min = lon - delta_lon;
        if min < -PI {
            min += 2.0 * PI;
        }
        let mut max = lon + delta_lon;
        if max > PI {
            max -= 2.0 * PI;
        }
        lon_min = min;
        lon_max = max;
    } else {
        // the circle reaches a pole, so every meridian intersects it
        lat_min = lat_min.max(-FRAC_PI_2);
        lat_max = lat_max.min(FRAC_PI_2);
        lon_min = -PI;
        lon_max = PI;
    }

    BoundingBox {
        lat_min: lat_min.to_degrees().max(MIN_LATITUDE),
        lat_max: lat_max.to_degrees().min(MAX_LATITUDE),
        lon_min: lon_min.to_degrees().clamp(MIN_LONGITUDE, MAX_LONGITUDE),
        lon_max: lon_max.to_degrees().clamp(MIN_LONGITUDE, MAX_LONGITUDE),
    }
}

/// Great-circle distance in kilometers between two degree coordinates
/// (spherical law of cosines).
pub fn haversine_distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    // acos loses precision near 1.0; identical points must be exactly 0
    if lat1 == lat2 && lon1 == lon2 {
        return 0.0;
    }
    let lat1 = lat1.to_radians();
    let lat2 = lat2.to_radians();
    let delta_lon = lon1.to_radians() - lon2.to_radians();

    let cosine = lat1.sin() * lat2.sin() + lat1.cos() * lat2.cos() * delta_lon.cos();
    EARTH_RADIUS_KM * cosine.clamp(-1.0, 1.0).acos()
}

#[cfg(test)]
mod tests;
