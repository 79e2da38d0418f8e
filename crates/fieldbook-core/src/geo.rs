//! Geographic points and proximity math.
//!
//! ## Summary
//! Schedules carry a single (longitude, latitude) point. Proximity search runs
//! a cheap bounding-box prefilter in the database and the exact great-circle
//! distance here.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// A validated WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

/// Inclusive coordinate ranges covering a search circle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_latitude: f64,
    pub max_latitude: f64,
    pub min_longitude: f64,
    pub max_longitude: f64,
}

impl GeoPoint {
    /// ## Summary
    /// Builds a point after checking that both coordinates are finite and in range.
    ///
    /// ## Errors
    /// Returns a validation error for NaN, infinite or out-of-range coordinates.
    pub fn new(longitude: f64, latitude: f64) -> CoreResult<Self> {
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(CoreError::ValidationError(format!(
                "longitude {longitude} is outside [-180, 180]"
            )));
        }
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(CoreError::ValidationError(format!(
                "latitude {latitude} is outside [-90, 90]"
            )));
        }
        Ok(Self {
            longitude,
            latitude,
        })
    }

    /// ## Summary
    /// Builds a point from a `[longitude, latitude]` coordinate array.
    ///
    /// ## Errors
    /// Returns a validation error unless exactly two valid coordinates are given.
    pub fn from_coordinates(coordinates: &[f64]) -> CoreResult<Self> {
        match coordinates {
            [longitude, latitude] => Self::new(*longitude, *latitude),
            _ => Err(CoreError::ValidationError(format!(
                "expected [longitude, latitude], got {} values",
                coordinates.len()
            ))),
        }
    }

    /// Great-circle distance in kilometres.
    #[must_use]
    pub fn distance_km(&self, other: &Self) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let d_lat = (other.latitude - self.latitude).to_radians();
        let d_lon = (other.longitude - self.longitude).to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_KM * c
    }

    /// ## Summary
    /// Returns a box that contains every point within `radius_km`.
    ///
    /// The box is conservative: near the poles or across the antimeridian it
    /// widens to the full longitude range and the exact distance check does
    /// the rest.
    #[must_use]
    pub fn bounding_box(&self, radius_km: f64) -> BoundingBox {
        let angular = (radius_km / EARTH_RADIUS_KM).to_degrees();
        let min_latitude = (self.latitude - angular).max(-90.0);
        let max_latitude = (self.latitude + angular).min(90.0);

        if min_latitude <= -90.0 || max_latitude >= 90.0 {
            return BoundingBox {
                min_latitude,
                max_latitude,
                min_longitude: -180.0,
                max_longitude: 180.0,
            };
        }

        let lon_delta = angular / self.latitude.to_radians().cos();
        let min_longitude = self.longitude - lon_delta;
        let max_longitude = self.longitude + lon_delta;

        if min_longitude < -180.0 || max_longitude > 180.0 {
            BoundingBox {
                min_latitude,
                max_latitude,
                min_longitude: -180.0,
                max_longitude: 180.0,
            }
        } else {
            BoundingBox {
                min_latitude,
                max_latitude,
                min_longitude,
                max_longitude,
            }
        }
    }
}

#[cfg(test)]
impl BoundingBox {
    fn contains(&self, point: &GeoPoint) -> bool {
        (self.min_latitude..=self.max_latitude).contains(&point.latitude)
            && (self.min_longitude..=self.max_longitude).contains(&point.longitude)
    }
}
