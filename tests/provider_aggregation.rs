// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;
use std::time::Duration;

use mobility_enrich::engine::ProviderAggregator;
use mobility_enrich::model::{ProviderId, ProviderStateEntry};
use mobility_enrich::stores::{MemoryMetricsSink, MemoryProviderStateStore};
use mobility_enrich::traits::ManualTimeSource;

const PROVIDERS: [&str; 4] = ["bird", "jump", "lime", "spin"];

fn store() -> Arc<MemoryProviderStateStore> {
    Arc::new(MemoryProviderStateStore::from_entries(PROVIDERS.iter().map(
        |id| {
            (
                ProviderId::from(*id),
                ProviderStateEntry {
                    invalid_count: 1,
                    ..ProviderStateEntry::default()
                },
            )
        },
    )))
}

fn aggregator(
    store: Arc<MemoryProviderStateStore>,
    metrics: Arc<MemoryMetricsSink>,
    clock: &ManualTimeSource,
) -> ProviderAggregator {
    ProviderAggregator::new(store, metrics, Duration::from_secs(172_800))
        .with_time_source(Arc::new(clock.clone()))
}

#[tokio::test]
async fn test_successful_cycle_empties_store() {
    let store = store();
    let metrics = Arc::new(MemoryMetricsSink::new());
    let clock = ManualTimeSource::new(1_700_000_000_000);

    aggregator(store.clone(), metrics.clone(), &clock)
        .run_cycle()
        .await
        .unwrap();

    assert!(store.is_empty().await);
    assert_eq!(metrics.records().await.len(), PROVIDERS.len());
}

#[tokio::test]
async fn test_failed_provider_is_retried_next_cycle() {
    let store = store();
    let metrics = Arc::new(MemoryMetricsSink::new().failing_for([ProviderId::from("lime")]));
    let clock = ManualTimeSource::new(1_700_000_000_000);
    let aggregator = aggregator(store.clone(), metrics.clone(), &clock);

    let report = aggregator.run_cycle().await.unwrap();

    assert_eq!(report.failed, 1);
    assert_eq!(store.keys().await, vec![ProviderId::from("lime")]);
    assert_eq!(metrics.records().await.len(), PROVIDERS.len() - 1);

    // Still failing: the key stays and no row is added.
    clock.advance(60_000);
    let report = aggregator.run_cycle().await.unwrap();
    assert_eq!(report.timestamp, 1_700_000_060_000);
    assert_eq!(report.failed, 1);
    assert_eq!(store.len().await, 1);
    assert_eq!(metrics.records().await.len(), PROVIDERS.len() - 1);
}

#[tokio::test]
async fn test_rows_from_one_cycle_share_a_timestamp() {
    let metrics = Arc::new(MemoryMetricsSink::new());
    let clock = ManualTimeSource::new(42);

    aggregator(store(), metrics.clone(), &clock)
        .run_cycle()
        .await
        .unwrap();

    let rows = metrics.records().await;
    assert!(rows.iter().all(|row| row.timestamp == 42 && row.invalid_count == 1));
    let providers: Vec<&str> = rows.iter().map(|row| row.provider_id.as_str()).collect();
    assert_eq!(providers, PROVIDERS.to_vec());
}
