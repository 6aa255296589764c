// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::path::Path;
use std::sync::Arc;

use mobility_enrich::config::consts::DEFAULT_CHANNEL_CAPACITY;
use mobility_enrich::config::{load_and_validate_config, PipelineConfig};
use mobility_enrich::engine::{ProviderAggregator, StreamProcessor};
use mobility_enrich::labelers::{
    DeviceLabeler, GeographyLabeler, LabelChain, LatencyLabeler, OptionalTelemetryLabeler,
};
use mobility_enrich::model::{Device, Geography, Message, ProviderId, ProviderStateEntry};
use mobility_enrich::observability::init_tracing;
use mobility_enrich::stores::{
    ChannelSource, JsonLinesSink, MemoryDeviceStore, MemoryGeographyStore, MemoryMetricsSink,
    MemoryProviderStateStore,
};

/// Registry contents loaded into the in-memory stores.
#[derive(Debug, Default, Deserialize)]
struct Fixtures {
    #[serde(default)]
    devices: Vec<Device>,
    #[serde(default)]
    geographies: Vec<Geography>,
    /// Optional provider rollups; drained once after the stream finishes.
    #[serde(default)]
    provider_states: HashMap<ProviderId, ProviderStateEntry>,
}

async fn load_fixtures(path: &Path) -> Result<Fixtures> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading fixtures {}", path.display()))?;
    let fixtures = serde_yaml::from_str(&content)
        .with_context(|| format!("parsing fixtures {}", path.display()))?;
    Ok(fixtures)
}

fn enrichment_chain(config: &PipelineConfig, fixtures: &mut Fixtures) -> LabelChain {
    let devices = Arc::new(MemoryDeviceStore::from_devices(std::mem::take(
        &mut fixtures.devices,
    )));
    let geographies = Arc::new(MemoryGeographyStore::from_geographies(std::mem::take(
        &mut fixtures.geographies,
    )));

    LabelChain::new()
        .with(Arc::new(DeviceLabeler::new(
            devices,
            config.device_cache.capacity,
        )))
        .with(Arc::new(GeographyLabeler::with_published_only(
            geographies,
            config.geography.published_only,
        )))
        .with(Arc::new(OptionalTelemetryLabeler))
        .with(Arc::new(LatencyLabeler))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() != 4 {
        eprintln!(
            "Usage: {} <config.yaml> <fixtures.yaml> <messages.jsonl>",
            args[0]
        );
        eprintln!(
            "Example: {} demos/config.yaml demos/fixtures.yaml demos/messages.jsonl",
            args[0]
        );
        std::process::exit(2);
    }

    let config = load_and_validate_config(&args[1])
        .with_context(|| format!("loading config {}", args[1]))?;
    init_tracing(&config.logging.filter);

    let mut fixtures = load_fixtures(Path::new(&args[2])).await?;
    let chain = enrichment_chain(&config, &mut fixtures);

    let (sender, source) = ChannelSource::new("messages", DEFAULT_CHANNEL_CAPACITY);
    let source = Arc::new(source);
    let processor = StreamProcessor::new(
        "enrichment",
        source.clone(),
        Arc::new(chain),
        Arc::new(JsonLinesSink::new("stdout", tokio::io::stdout())),
    );
    processor.start().await?;

    let input = tokio::fs::read_to_string(&args[3])
        .await
        .with_context(|| format!("reading messages {}", args[3]))?;
    for (index, line) in input.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let message = match serde_json::from_str(line)
            .map_err(anyhow::Error::from)
            .and_then(|value| Message::from_value(value).map_err(anyhow::Error::from))
        {
            Ok(message) => message,
            Err(error) => {
                tracing::warn!(line = index + 1, error = %error, "Skipping malformed message");
                continue;
            }
        };
        sender
            .send(message)
            .await
            .context("stream processor stopped accepting messages")?;
    }

    // Closing the channel lets the consumer drain what is queued, then exit.
    drop(sender);
    source.finished().await;
    processor.stop().await?;

    if !fixtures.provider_states.is_empty() {
        let store = Arc::new(MemoryProviderStateStore::from_entries(
            fixtures.provider_states,
        ));
        let metrics = Arc::new(MemoryMetricsSink::new());
        let aggregator = ProviderAggregator::new(
            store,
            metrics.clone(),
            config.aggregation.dead_device_threshold(),
        );
        aggregator.run_cycle().await?;
        for record in metrics.records().await {
            eprintln!("{}", serde_json::to_string(&record)?);
        }
    }

    Ok(())
}
