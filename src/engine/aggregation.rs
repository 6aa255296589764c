// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Periodic drain of the provider state store into metrics rows.
//!
//! Each cycle reads a snapshot of every provider entry, derives one
//! [`MetricsRecord`] per provider and persists it. A provider's entry is removed
//! from the store only after its row is persisted, so a failed provider is
//! picked up again by the next cycle. A crash between the insert and the
//! removal produces a second row with a later timestamp on the next cycle.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::config::consts::MIN_AGGREGATION_INTERVAL_MILLIS;
use crate::errors::StoreError;
use crate::model::{MetricsRecord, ProviderId, ProviderStateEntry};
use crate::observability::messages::aggregation::{
    AggregationCycleCompleted, AggregationCycleStarted, ProviderAggregationFailed,
    ProviderStateReadFailed, ProviderStateRemovalFailed,
};
use crate::observability::messages::StructuredLog;
use crate::traits::{MetricsSink, ProviderStateStore, SystemTimeSource, TimeSource};

/// Outcome of one aggregation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregationReport {
    /// Timestamp stamped on every row written by this cycle.
    pub timestamp: i64,
    pub persisted: usize,
    pub failed: usize,
}

pub struct ProviderAggregator {
    store: Arc<dyn ProviderStateStore>,
    metrics: Arc<dyn MetricsSink>,
    clock: Arc<dyn TimeSource>,
    dead_threshold: Duration,
}

impl ProviderAggregator {
    pub fn new(
        store: Arc<dyn ProviderStateStore>,
        metrics: Arc<dyn MetricsSink>,
        dead_threshold: Duration,
    ) -> Self {
        Self {
            store,
            metrics,
            clock: Arc::new(SystemTimeSource),
            dead_threshold,
        }
    }

    pub fn with_time_source(mut self, clock: Arc<dyn TimeSource>) -> Self {
        self.clock = clock;
        self
    }

    /// Run one drain over a snapshot of the store.
    ///
    /// Providers are processed one at a time in id order. A failed insert or
    /// removal is logged, counted, and does not stop the cycle. Only a failure
    /// to read the store fails the cycle as a whole.
    pub async fn run_cycle(&self) -> Result<AggregationReport, StoreError> {
        let started = Instant::now();
        let timestamp = self.clock.now_ms();

        let entries = self.store.read_all().await.inspect_err(|error| {
            ProviderStateReadFailed { error }.log();
        })?;

        let cycle = AggregationCycleStarted {
            provider_count: entries.len(),
            timestamp,
        };
        cycle.log();

        let mut providers: Vec<(ProviderId, ProviderStateEntry)> = entries.into_iter().collect();
        providers.sort_by(|a, b| a.0.cmp(&b.0));

        let report = async {
            let mut report = AggregationReport {
                timestamp,
                persisted: 0,
                failed: 0,
            };
            for (provider_id, entry) in providers {
                if self.drain_provider(&provider_id, &entry, timestamp).await {
                    report.persisted += 1;
                } else {
                    report.failed += 1;
                }
            }
            report
        }
        .instrument(cycle.span("aggregation_cycle"))
        .await;

        AggregationCycleCompleted {
            timestamp,
            persisted: report.persisted,
            failed: report.failed,
            duration: started.elapsed(),
        }
        .log();
        Ok(report)
    }

    /// Run a cycle immediately, then once per `interval`, until `cancel` fires.
    /// A cycle in progress when `cancel` fires runs to completion.
    ///
    /// An `interval` shorter than one millisecond is raised to one millisecond.
    ///
    /// Returns the number of cycles run.
    pub async fn run(&self, interval: Duration, cancel: CancellationToken) -> u64 {
        let interval = interval.max(Duration::from_millis(MIN_AGGREGATION_INTERVAL_MILLIS));
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut cycles = 0;
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }
            // Read failures are already logged; the next tick retries.
            let _ = self.run_cycle().await;
            cycles += 1;
        }
        cycles
    }

    async fn drain_provider(
        &self,
        provider_id: &ProviderId,
        entry: &ProviderStateEntry,
        timestamp: i64,
    ) -> bool {
        let record = self.metrics_record(provider_id, entry, timestamp);

        if let Err(error) = self.metrics.insert(record).await {
            ProviderAggregationFailed {
                provider_id: provider_id.as_str(),
                error: &error,
            }
            .log();
            return false;
        }

        if let Err(error) = self.store.remove(provider_id).await {
            ProviderStateRemovalFailed {
                provider_id: provider_id.as_str(),
                error: &error,
            }
            .log();
            return false;
        }
        true
    }

    /// Derive one provider's row at `now_ms`.
    pub fn metrics_record(
        &self,
        provider_id: &ProviderId,
        entry: &ProviderStateEntry,
        now_ms: i64,
    ) -> MetricsRecord {
        let threshold_ms = i64::try_from(self.dead_threshold.as_millis()).unwrap_or(i64::MAX);
        let dead_before = now_ms.saturating_sub(threshold_ms);

        let (cap_count, dead_count) = entry
            .vehicles
            .values()
            .filter(|vehicle| vehicle.state.counts_toward_capacity())
            .fold((0, 0), |(cap, dead), vehicle| {
                let is_dead = vehicle.last_seen_ms() < dead_before;
                (cap + 1, dead + u64::from(is_dead))
            });

        MetricsRecord {
            provider_id: provider_id.clone(),
            timestamp: now_ms,
            cap_count,
            dead_count,
            invalid_count: entry.invalid_count,
            duplicate_count: entry.duplicate_count,
            ooo_count: entry.ooo_count,
        }
    }
}
