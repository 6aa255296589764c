// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::{BoundingBox, Point};
use crate::errors::GeometryError;
use crate::model::{Geography, Position, Ring};

const MIN_RING_POSITIONS: usize = 4;

#[derive(Debug, Clone, PartialEq)]
struct PreparedPolygon {
    exterior: Vec<Point>,
    holes: Vec<Vec<Point>>,
}

/// Validated polygons of one geography, ready for repeated containment tests.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedShape {
    polygons: Vec<PreparedPolygon>,
}

impl PreparedShape {
    /// Exact test: the point is inside some polygon's exterior and outside its holes.
    pub fn contains(&self, point: Point) -> bool {
        self.polygons.iter().any(|polygon| {
            ring_contains(&polygon.exterior, point)
                && !polygon.holes.iter().any(|hole| ring_contains(hole, point))
        })
    }

    pub fn polygon_count(&self) -> usize {
        self.polygons.len()
    }
}

/// Validate a geography's boundary and compute its bounding box.
pub fn prepare(geography: &Geography) -> Result<(BoundingBox, PreparedShape), GeometryError> {
    let geography_id = geography.geography_id.as_str();

    let polygons = geography
        .geography_json
        .polygons()
        .into_iter()
        .map(|rings| prepare_polygon(geography_id, rings))
        .collect::<Result<Vec<_>, _>>()?;

    let bbox = BoundingBox::around(
        polygons
            .iter()
            .flat_map(|polygon| polygon.exterior.iter().copied()),
    )
    .ok_or_else(|| GeometryError::EmptyGeometry {
        geography_id: geography_id.to_string(),
    })?;

    Ok((bbox, PreparedShape { polygons }))
}

fn prepare_polygon(geography_id: &str, rings: &[Ring]) -> Result<PreparedPolygon, GeometryError> {
    let (exterior, holes) = rings.split_first().ok_or_else(|| GeometryError::InvalidRing {
        geography_id: geography_id.to_string(),
        reason: "polygon has no exterior ring".to_string(),
    })?;

    Ok(PreparedPolygon {
        exterior: prepare_ring(geography_id, exterior)?,
        holes: holes
            .iter()
            .map(|hole| prepare_ring(geography_id, hole))
            .collect::<Result<_, _>>()?,
    })
}

fn prepare_ring(geography_id: &str, ring: &[Position]) -> Result<Vec<Point>, GeometryError> {
    let invalid = |reason: String| GeometryError::InvalidRing {
        geography_id: geography_id.to_string(),
        reason,
    };

    if ring.len() < MIN_RING_POSITIONS {
        return Err(invalid(format!(
            "ring has {} positions, at least {} required",
            ring.len(),
            MIN_RING_POSITIONS
        )));
    }

    let points = ring
        .iter()
        .map(|position| match position.as_slice() {
            [lng, lat, ..] if lng.is_finite() && lat.is_finite() => Ok(Point::new(*lng, *lat)),
            _ => Err(invalid(format!("invalid position {:?}", position))),
        })
        .collect::<Result<Vec<_>, _>>()?;

    if points.first() != points.last() {
        return Err(invalid("ring is not closed".to_string()));
    }
    Ok(points)
}

// Even-odd ray cast towards +lng.
fn ring_contains(ring: &[Point], point: Point) -> bool {
    let mut inside = false;
    for (a, b) in ring.iter().zip(ring.iter().skip(1)) {
        if (a.lat > point.lat) != (b.lat > point.lat) {
            let crossing_lng = a.lng + (point.lat - a.lat) / (b.lat - a.lat) * (b.lng - a.lng);
            if point.lng < crossing_lng {
                inside = !inside;
            }
        }
    }
    inside
}
