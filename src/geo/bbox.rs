// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::Point;

/// Axis-aligned rectangle fully containing a geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lng: f64,
    pub min_lat: f64,
    pub max_lng: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    /// Smallest box around `points`, or `None` when there are none.
    pub fn around(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let start = Self {
            min_lng: first.lng,
            min_lat: first.lat,
            max_lng: first.lng,
            max_lat: first.lat,
        };
        Some(points.fold(start, |bbox, point| bbox.extended(point)))
    }

    fn extended(self, point: Point) -> Self {
        Self {
            min_lng: self.min_lng.min(point.lng),
            min_lat: self.min_lat.min(point.lat),
            max_lng: self.max_lng.max(point.lng),
            max_lat: self.max_lat.max(point.lat),
        }
    }

    /// Inclusive containment; points on the edge are inside.
    pub fn contains(&self, point: Point) -> bool {
        point.lng >= self.min_lng
            && point.lng <= self.max_lng
            && point.lat >= self.min_lat
            && point.lat <= self.max_lat
    }
}
