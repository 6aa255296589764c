// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Planar geometry for geofence matching.
//!
//! Coordinates are treated as planar `(lng, lat)` pairs, which is accurate enough
//! for city-scale geofences. A geography is validated and prepared once, yielding
//! a [`BoundingBox`] for cheap rejection and a [`PreparedShape`] for the exact
//! containment test.

mod bbox;
mod polygon;

pub use bbox::BoundingBox;
pub use polygon::{prepare, PreparedShape};

use crate::errors::GeometryError;
use crate::model::GpsFix;

/// A validated point in `(lng, lat)` order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub lng: f64,
    pub lat: f64,
}

impl Point {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    /// Validate a GPS fix as a point on the globe.
    pub fn from_gps(gps: &GpsFix) -> Result<Self, GeometryError> {
        let invalid = |reason: &str| GeometryError::InvalidPoint {
            lat: gps.lat,
            lng: gps.lng,
            reason: reason.to_string(),
        };

        if !gps.lat.is_finite() || !gps.lng.is_finite() {
            return Err(invalid("coordinates must be finite"));
        }
        if !(-90.0..=90.0).contains(&gps.lat) {
            return Err(invalid("latitude out of range"));
        }
        if !(-180.0..=180.0).contains(&gps.lng) {
            return Err(invalid("longitude out of range"));
        }
        Ok(Self::new(gps.lng, gps.lat))
    }
}
