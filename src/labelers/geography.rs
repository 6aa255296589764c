// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::errors::LabelError;
use crate::geo::{self, BoundingBox, Point, PreparedShape};
use crate::model::{Geography, GeographyId, Labels, Message};
use crate::observability::messages::labeler::{GeographiesIndexed, GeographyRejected};
use crate::observability::messages::StructuredLog;
use crate::traits::{GeographyStore, Labeler};

pub const GEOGRAPHY_IDS_LABEL: &str = "geography_ids";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeographyIndexStats {
    /// Geographies currently in the index.
    pub indexed: usize,
    /// Candidates eliminated by the bounding box check.
    pub bbox_rejections: u64,
    /// Exact polygon containment tests run.
    pub polygon_tests: u64,
    /// Geographies reported as containing a point.
    pub matches: u64,
}

struct IndexedGeography {
    geography_id: GeographyId,
    bbox: BoundingBox,
    shape: PreparedShape,
}

// Append-only arena of prepared geographies plus an id -> position map for
// O(1) seen checks. Positions never change, so arena order is index order.
#[derive(Default)]
struct GeographyIndex {
    geographies: Vec<IndexedGeography>,
    positions: HashMap<GeographyId, usize>,
    stats: GeographyIndexStats,
}

impl GeographyIndex {
    /// Prepare every unseen geography, then append them all. A malformed
    /// geography fails the whole batch and leaves the index untouched.
    fn extend(&mut self, fetched: &[Geography]) -> Result<usize, LabelError> {
        let mut pending: Vec<IndexedGeography> = Vec::new();
        for geography in fetched {
            let id = &geography.geography_id;
            if self.positions.contains_key(id) || pending.iter().any(|p| &p.geography_id == id) {
                continue;
            }
            let (bbox, shape) = geo::prepare(geography).inspect_err(|error| {
                GeographyRejected { error }.log();
            })?;
            pending.push(IndexedGeography {
                geography_id: id.clone(),
                bbox,
                shape,
            });
        }

        let added = pending.len();
        for indexed in pending {
            self.positions
                .insert(indexed.geography_id.clone(), self.geographies.len());
            self.geographies.push(indexed);
        }
        self.stats.indexed = self.geographies.len();
        Ok(added)
    }

    fn matching(&mut self, point: Point) -> Vec<GeographyId> {
        let mut matched = Vec::new();
        for indexed in &self.geographies {
            if !indexed.bbox.contains(point) {
                self.stats.bbox_rejections += 1;
                continue;
            }
            self.stats.polygon_tests += 1;
            if indexed.shape.contains(point) {
                matched.push(indexed.geography_id.clone());
            }
        }
        self.stats.matches += matched.len() as u64;
        matched
    }
}

/// Labels a message with the ids of every geofence containing its GPS fix.
///
/// The geography list is fetched from the store on every call. Only geographies
/// not seen before are prepared (validated, bounding box computed) and appended
/// to the process-local index, which never shrinks unless [`invalidate`] is
/// called. Each point is checked against the cheap bounding boxes first and the
/// exact polygon test runs only on the survivors.
///
/// A message without telemetry or without a GPS fix gets an empty list.
///
/// [`invalidate`]: GeographyLabeler::invalidate
pub struct GeographyLabeler {
    store: Arc<dyn GeographyStore>,
    published_only: bool,
    index: Mutex<GeographyIndex>,
}

impl GeographyLabeler {
    pub fn new(store: Arc<dyn GeographyStore>) -> Self {
        Self::with_published_only(store, true)
    }

    pub fn with_published_only(store: Arc<dyn GeographyStore>, published_only: bool) -> Self {
        Self {
            store,
            published_only,
            index: Mutex::new(GeographyIndex::default()),
        }
    }

    pub async fn stats(&self) -> GeographyIndexStats {
        self.index.lock().await.stats
    }

    /// Drop every indexed geography. The next call re-indexes from the store.
    pub async fn invalidate(&self) {
        let mut index = self.index.lock().await;
        index.geographies.clear();
        index.positions.clear();
        index.stats.indexed = 0;
    }

    async fn geography_ids(&self, point: Option<Point>) -> Result<Vec<GeographyId>, LabelError> {
        let fetched = self.store.read_geographies(self.published_only).await?;

        let mut index = self.index.lock().await;
        let added = index.extend(&fetched)?;
        if added > 0 {
            GeographiesIndexed {
                added,
                total: index.geographies.len(),
            }
            .log();
        }

        Ok(point.map(|point| index.matching(point)).unwrap_or_default())
    }
}

#[async_trait]
impl Labeler for GeographyLabeler {
    async fn label(&self, message: &Message) -> Result<Labels, LabelError> {
        let point = match message.telemetry()?.and_then(|telemetry| telemetry.gps) {
            Some(gps) => Some(Point::from_gps(&gps)?),
            None => None,
        };

        let ids = self.geography_ids(point).await?;

        let mut labels = Labels::new();
        labels.insert(GEOGRAPHY_IDS_LABEL.to_string(), json!(ids));
        Ok(labels)
    }

    fn name(&self) -> &'static str {
        "geography"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::StoreError;
    use crate::model::{GeographyShape, Ring};
    use crate::stores::memory::MemoryGeographyStore;
    use serde_json::json;

    fn rect(min_lng: f64, min_lat: f64, max_lng: f64, max_lat: f64) -> Ring {
        vec![
            vec![min_lng, min_lat],
            vec![max_lng, min_lat],
            vec![max_lng, max_lat],
            vec![min_lng, max_lat],
            vec![min_lng, min_lat],
        ]
    }

    fn geography(id: &str, ring: Ring) -> Geography {
        Geography {
            geography_id: GeographyId::from(id),
            name: Some(id.to_string()),
            publish_date: Some(1),
            geography_json: GeographyShape::Polygon {
                coordinates: vec![ring],
            },
        }
    }

    fn downtown_la() -> Geography {
        geography("downtown", rect(-118.30, 34.00, -118.20, 34.10))
    }

    fn at(lat: f64, lng: f64) -> Message {
        Message::from_value(json!({ "telemetry": { "gps": { "lat": lat, "lng": lng } } })).unwrap()
    }

    fn ids(labels: &Labels) -> Vec<String> {
        serde_json::from_value(labels[GEOGRAPHY_IDS_LABEL].clone()).unwrap()
    }

    #[tokio::test]
    async fn test_point_inside_geography() {
        let store = Arc::new(MemoryGeographyStore::from_geographies([downtown_la()]));
        let labeler = GeographyLabeler::new(store);

        let labels = labeler.label(&at(34.05, -118.24)).await.unwrap();

        assert_eq!(ids(&labels), vec!["downtown"]);
    }

    #[tokio::test]
    async fn test_no_gps_yields_empty_list_without_polygon_tests() {
        let store = Arc::new(MemoryGeographyStore::from_geographies([downtown_la()]));
        let labeler = GeographyLabeler::new(store);

        for msg in [
            json!({ "device_id": "d1" }),
            json!({ "telemetry": { "charge": 0.5 } }),
            json!({ "telemetry": null }),
        ] {
            let labels = labeler
                .label(&Message::from_value(msg).unwrap())
                .await
                .unwrap();
            assert_eq!(labels[GEOGRAPHY_IDS_LABEL], json!([]));
        }

        let stats = labeler.stats().await;
        assert_eq!(stats.polygon_tests, 0);
        assert_eq!(stats.bbox_rejections, 0);
    }

    #[tokio::test]
    async fn test_points_outside_bbox_never_reach_polygon_test() {
        let store = Arc::new(MemoryGeographyStore::from_geographies([
            downtown_la(),
            geography("santa_monica", rect(-118.52, 33.99, -118.47, 34.05)),
        ]));
        let labeler = GeographyLabeler::new(store);

        let labels = labeler.label(&at(40.71, -74.00)).await.unwrap();

        assert!(ids(&labels).is_empty());
        let stats = labeler.stats().await;
        assert_eq!(stats.bbox_rejections, 2);
        assert_eq!(stats.polygon_tests, 0);
    }

    #[tokio::test]
    async fn test_bbox_hit_polygon_miss() {
        let triangle = geography(
            "triangle",
            vec![
                vec![0.0, 0.0],
                vec![10.0, 0.0],
                vec![0.0, 10.0],
                vec![0.0, 0.0],
            ],
        );
        let store = Arc::new(MemoryGeographyStore::from_geographies([triangle]));
        let labeler = GeographyLabeler::new(store);

        let labels = labeler.label(&at(9.0, 9.0)).await.unwrap();

        assert!(ids(&labels).is_empty());
        let stats = labeler.stats().await;
        assert_eq!(stats.polygon_tests, 1);
        assert_eq!(stats.matches, 0);
    }

    #[tokio::test]
    async fn test_overlapping_geographies_returned_in_index_order() {
        let store = Arc::new(MemoryGeographyStore::from_geographies([
            geography("zeta", rect(-119.0, 33.0, -118.0, 35.0)),
            downtown_la(),
        ]));
        let labeler = GeographyLabeler::new(store.clone());

        labeler.label(&at(34.05, -118.24)).await.unwrap();
        store.insert(geography("alpha", rect(-120.0, 30.0, -110.0, 40.0))).await;

        let labels = labeler.label(&at(34.05, -118.24)).await.unwrap();
        assert_eq!(ids(&labels), vec!["zeta", "downtown", "alpha"]);
    }

    #[tokio::test]
    async fn test_index_is_monotonic_and_fetch_happens_every_call() {
        let store = Arc::new(MemoryGeographyStore::from_geographies([downtown_la()]));
        let labeler = GeographyLabeler::new(store.clone());

        labeler.label(&at(34.05, -118.24)).await.unwrap();
        labeler.label(&at(34.05, -118.24)).await.unwrap();
        assert_eq!(store.calls(), 2);
        assert_eq!(labeler.stats().await.indexed, 1);

        // Unpublished geographies stay indexed until invalidated.
        store.remove(&GeographyId::from("downtown")).await;
        let labels = labeler.label(&at(34.05, -118.24)).await.unwrap();
        assert_eq!(ids(&labels), vec!["downtown"]);

        labeler.invalidate().await;
        let labels = labeler.label(&at(34.05, -118.24)).await.unwrap();
        assert!(ids(&labels).is_empty());
        assert_eq!(labeler.stats().await.indexed, 0);
    }

    #[tokio::test]
    async fn test_malformed_geography_fails_call_without_corrupting_index() {
        let store = Arc::new(MemoryGeographyStore::from_geographies([downtown_la()]));
        let labeler = GeographyLabeler::new(store.clone());
        labeler.label(&at(34.05, -118.24)).await.unwrap();

        store
            .insert(geography("open_ring", vec![vec![0.0, 0.0], vec![1.0, 0.0], vec![1.0, 1.0], vec![0.0, 1.0]]))
            .await;
        store.insert(geography("valid_late", rect(-119.0, 33.0, -118.0, 35.0))).await;

        let err = labeler.label(&at(34.05, -118.24)).await.unwrap_err();
        assert!(matches!(err, LabelError::Geometry(_)));
        assert_eq!(labeler.stats().await.indexed, 1);

        store.remove(&GeographyId::from("open_ring")).await;
        let labels = labeler.label(&at(34.05, -118.24)).await.unwrap();
        assert_eq!(ids(&labels), vec!["downtown", "valid_late"]);
    }

    #[tokio::test]
    async fn test_invalid_point_is_an_error() {
        let store = Arc::new(MemoryGeographyStore::from_geographies([downtown_la()]));
        let labeler = GeographyLabeler::new(store.clone());

        let err = labeler.label(&at(120.0, 0.0)).await.unwrap_err();

        assert!(matches!(err, LabelError::Geometry(_)));
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let store = Arc::new(
            MemoryGeographyStore::new().failing_with(StoreError::backend("geographies", "down")),
        );
        let labeler = GeographyLabeler::new(store);

        let err = labeler.label(&at(34.05, -118.24)).await.unwrap_err();
        assert!(matches!(err, LabelError::Store(_)));
    }

    #[tokio::test]
    async fn test_unpublished_geographies_are_not_indexed() {
        let mut draft = downtown_la();
        draft.publish_date = None;
        let store = Arc::new(MemoryGeographyStore::from_geographies([draft]));

        let published = GeographyLabeler::new(store.clone());
        assert!(ids(&published.label(&at(34.05, -118.24)).await.unwrap()).is_empty());

        let all = GeographyLabeler::with_published_only(store, false);
        assert_eq!(ids(&all.label(&at(34.05, -118.24)).await.unwrap()), vec!["downtown"]);
    }
}
