// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeographyId(pub String);

impl GeographyId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GeographyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GeographyId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A GeoJSON position: `[lng, lat]` with an optional trailing altitude.
pub type Position = Vec<f64>;

/// A closed ring of positions. The first and last positions are equal.
pub type Ring = Vec<Position>;

/// GeoJSON boundary of a geofence.
///
/// Features and feature collections are unwrapped to their polygonal geometries;
/// any other geometry type fails to deserialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeographyShape {
    Polygon {
        coordinates: Vec<Ring>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Ring>>,
    },
    Feature {
        geometry: Box<GeographyShape>,
    },
    FeatureCollection {
        features: Vec<GeographyShape>,
    },
}

impl GeographyShape {
    /// Every polygon in the shape, each as `[exterior, holes...]`.
    pub fn polygons(&self) -> Vec<&[Ring]> {
        let mut polygons = Vec::new();
        self.collect_polygons(&mut polygons);
        polygons
    }

    fn collect_polygons<'a>(&'a self, out: &mut Vec<&'a [Ring]>) {
        match self {
            GeographyShape::Polygon { coordinates } => out.push(coordinates.as_slice()),
            GeographyShape::MultiPolygon { coordinates } => {
                out.extend(coordinates.iter().map(|polygon| polygon.as_slice()))
            }
            GeographyShape::Feature { geometry } => geometry.collect_polygons(out),
            GeographyShape::FeatureCollection { features } => {
                for feature in features {
                    feature.collect_polygons(out);
                }
            }
        }
    }
}

/// A named geofence.
///
/// `publish_date` is set once the geography has been published; unpublished
/// drafts are never returned by a `published_only` read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geography {
    pub geography_id: GeographyId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub publish_date: Option<i64>,
    pub geography_json: GeographyShape,
}

impl Geography {
    pub fn is_published(&self) -> bool {
        self.publish_date.is_some()
    }
}
