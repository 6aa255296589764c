// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::json;
use std::sync::Arc;

use mobility_enrich::engine::{StreamProcessor, StreamStats};
use mobility_enrich::errors::{LabelError, StreamError};
use mobility_enrich::labelers::{
    DeviceLabeler, GeographyLabeler, LabelChain, LatencyLabeler, OptionalTelemetryLabeler,
    TelemetryLabeler, TELEMETRY_LABELS,
};
use mobility_enrich::model::{Device, Geography, GeographyId, GeographyShape, Message};
use mobility_enrich::stores::{ChannelSource, CollectingSink, MemoryDeviceStore, MemoryGeographyStore};
use mobility_enrich::traits::Transform;

fn downtown_la() -> Geography {
    Geography {
        geography_id: GeographyId::from("g-downtown"),
        name: Some("Downtown".to_string()),
        publish_date: Some(1_700_000_000_000),
        geography_json: GeographyShape::Polygon {
            coordinates: vec![vec![
                vec![-118.30, 34.00],
                vec![-118.20, 34.00],
                vec![-118.20, 34.10],
                vec![-118.30, 34.10],
                vec![-118.30, 34.00],
            ]],
        },
    }
}

fn enrichment_chain(devices: Arc<MemoryDeviceStore>) -> LabelChain {
    let geographies = Arc::new(MemoryGeographyStore::from_geographies([downtown_la()]));
    LabelChain::new()
        .with(Arc::new(DeviceLabeler::new(devices, 100)))
        .with(Arc::new(GeographyLabeler::new(geographies)))
        .with(Arc::new(TelemetryLabeler))
        .with(Arc::new(LatencyLabeler))
}

fn scooter_store() -> Arc<MemoryDeviceStore> {
    Arc::new(MemoryDeviceStore::from_devices([Device::new(
        "d1",
        "scooter",
        vec!["electric".to_string()],
    )]))
}

fn trip_event() -> Message {
    Message::from_value(json!({
        "device_id": "d1",
        "telemetry": { "lat": 34.05, "lng": -118.24 },
        "timestamp": 1000,
        "recorded": 1500
    }))
    .unwrap()
}

#[tokio::test]
async fn test_event_is_enriched_end_to_end() {
    let (sender, source) = ChannelSource::new("events", 4);
    let source = Arc::new(source);
    let sink = Arc::new(CollectingSink::new());
    let processor = StreamProcessor::new(
        "enrichment",
        source.clone(),
        Arc::new(enrichment_chain(scooter_store())),
        sink.clone(),
    );

    processor.start().await.unwrap();
    sender.send(trip_event()).await.unwrap();
    drop(sender);
    source.finished().await;
    processor.stop().await.unwrap();

    let output = sink.messages().await;
    assert_eq!(output.len(), 1);
    let enriched = &output[0];

    assert_eq!(enriched.get("device_id"), Some(&json!("d1")));
    assert_eq!(enriched.get("vehicle_type"), Some(&json!("scooter")));
    assert_eq!(enriched.get("vehicle_propulsion"), Some(&json!(["electric"])));
    assert_eq!(enriched.get("geography_ids"), Some(&json!(["g-downtown"])));
    assert_eq!(enriched.get("telemetry_lat"), Some(&json!(34.05)));
    assert_eq!(enriched.get("telemetry_lng"), Some(&json!(-118.24)));
    assert_eq!(enriched.get("latency_ms"), Some(&json!(500)));
    // The original event fields survive untouched.
    assert_eq!(enriched.get("timestamp"), Some(&json!(1000)));
    assert_eq!(enriched.get("recorded"), Some(&json!(1500)));
}

#[tokio::test]
async fn test_unknown_device_never_reaches_the_sink() {
    let (sender, source) = ChannelSource::new("events", 4);
    let source = Arc::new(source);
    let sink = Arc::new(CollectingSink::new());
    let processor = StreamProcessor::new(
        "enrichment",
        source.clone(),
        Arc::new(enrichment_chain(Arc::new(MemoryDeviceStore::new()))),
        sink.clone(),
    );

    processor.start().await.unwrap();
    sender.send(trip_event()).await.unwrap();
    drop(sender);
    source.finished().await;
    processor.stop().await.unwrap();

    assert!(sink.messages().await.is_empty());
    assert_eq!(
        processor.stats(),
        StreamStats {
            received: 1,
            written: 0,
            dropped: 0,
            failed: 1,
        }
    );
}

#[tokio::test]
async fn test_chain_reports_which_labeler_failed() {
    let chain = enrichment_chain(Arc::new(MemoryDeviceStore::new()));

    let err = chain.transform(trip_event()).await.unwrap_err();

    assert_eq!(
        err,
        StreamError::Label {
            labeler: "device",
            source: LabelError::NotFound {
                device_id: "d1".to_string()
            },
        }
    );
}

#[tokio::test]
async fn test_events_without_telemetry_use_optional_variant() {
    let geographies = Arc::new(MemoryGeographyStore::from_geographies([downtown_la()]));
    let chain = LabelChain::new()
        .with(Arc::new(DeviceLabeler::new(scooter_store(), 100)))
        .with(Arc::new(GeographyLabeler::new(geographies)))
        .with(Arc::new(OptionalTelemetryLabeler))
        .with(Arc::new(LatencyLabeler));

    let enriched = chain
        .transform(
            Message::from_value(json!({ "device_id": "d1", "timestamp": 10, "recorded": 5 }))
                .unwrap(),
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(enriched.get("geography_ids"), Some(&json!([])));
    // Telemetry labels are present but null; `get` hides nulls, so read the raw fields.
    for label in TELEMETRY_LABELS {
        assert_eq!(enriched.fields().get(label), Some(&serde_json::Value::Null));
    }
    assert_eq!(enriched.get("telemetry_lat"), None);
    assert_eq!(enriched.get("latency_ms"), Some(&json!(-5)));
}
