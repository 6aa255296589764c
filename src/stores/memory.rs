// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! In-memory implementations of the storage collaborators.
//!
//! Every store counts its reads and can be told to fail, so tests can assert
//! how often a labeler or the aggregator reached the backing service.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

use crate::errors::StoreError;
use crate::model::{
    Device, DeviceId, Geography, GeographyId, MetricsRecord, ProviderId, ProviderStateEntry,
};
use crate::traits::{DeviceStore, GeographyStore, MetricsSink, ProviderStateStore};

#[derive(Default)]
pub struct MemoryDeviceStore {
    devices: Mutex<HashMap<DeviceId, Device>>,
    failure: Option<StoreError>,
    calls: AtomicUsize,
}

impl MemoryDeviceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_devices(devices: impl IntoIterator<Item = Device>) -> Self {
        let devices = devices
            .into_iter()
            .map(|device| (device.device_id.clone(), device))
            .collect();
        Self {
            devices: Mutex::new(devices),
            ..Self::default()
        }
    }

    /// Every read returns `error` instead of consulting the map.
    pub fn failing_with(mut self, error: StoreError) -> Self {
        self.failure = Some(error);
        self
    }

    pub async fn insert(&self, device: Device) {
        self.devices
            .lock()
            .await
            .insert(device.device_id.clone(), device);
    }

    /// Number of `read_device` calls so far, failed ones included.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DeviceStore for MemoryDeviceStore {
    async fn read_device(&self, device_id: &DeviceId) -> Result<Option<Device>, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        Ok(self.devices.lock().await.get(device_id).cloned())
    }
}

/// Geography list kept in insertion order.
#[derive(Default)]
pub struct MemoryGeographyStore {
    geographies: Mutex<Vec<Geography>>,
    failure: Option<StoreError>,
    calls: AtomicUsize,
}

impl MemoryGeographyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_geographies(geographies: impl IntoIterator<Item = Geography>) -> Self {
        Self {
            geographies: Mutex::new(geographies.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn failing_with(mut self, error: StoreError) -> Self {
        self.failure = Some(error);
        self
    }

    /// Replace the geography with the same id in place, or append it.
    pub async fn insert(&self, geography: Geography) {
        let mut geographies = self.geographies.lock().await;
        match geographies
            .iter_mut()
            .find(|existing| existing.geography_id == geography.geography_id)
        {
            Some(existing) => *existing = geography,
            None => geographies.push(geography),
        }
    }

    pub async fn remove(&self, geography_id: &GeographyId) -> Option<Geography> {
        let mut geographies = self.geographies.lock().await;
        let position = geographies
            .iter()
            .position(|geography| &geography.geography_id == geography_id)?;
        Some(geographies.remove(position))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GeographyStore for MemoryGeographyStore {
    async fn read_geographies(&self, published_only: bool) -> Result<Vec<Geography>, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        Ok(self
            .geographies
            .lock()
            .await
            .iter()
            .filter(|geography| !published_only || geography.is_published())
            .cloned()
            .collect())
    }
}

/// Keyed provider state shared between upstream writers and the aggregator.
#[derive(Default)]
pub struct MemoryProviderStateStore {
    entries: Mutex<HashMap<ProviderId, ProviderStateEntry>>,
    read_failure: Option<StoreError>,
    removal_failures: HashSet<ProviderId>,
}

impl MemoryProviderStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (ProviderId, ProviderStateEntry)>) -> Self {
        Self {
            entries: Mutex::new(entries.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn failing_reads_with(mut self, error: StoreError) -> Self {
        self.read_failure = Some(error);
        self
    }

    /// `remove` fails for these providers and leaves their entries in place.
    pub fn failing_removals_for(mut self, providers: impl IntoIterator<Item = ProviderId>) -> Self {
        self.removal_failures.extend(providers);
        self
    }

    /// Write or overwrite one provider's entry, as an upstream writer would.
    pub async fn put(&self, provider_id: ProviderId, entry: ProviderStateEntry) {
        self.entries.lock().await.insert(provider_id, entry);
    }

    pub async fn get(&self, provider_id: &ProviderId) -> Option<ProviderStateEntry> {
        self.entries.lock().await.get(provider_id).cloned()
    }

    /// Provider ids currently held, sorted.
    pub async fn keys(&self) -> Vec<ProviderId> {
        let mut keys: Vec<ProviderId> = self.entries.lock().await.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[async_trait]
impl ProviderStateStore for MemoryProviderStateStore {
    async fn read_all(&self) -> Result<HashMap<ProviderId, ProviderStateEntry>, StoreError> {
        if let Some(error) = &self.read_failure {
            return Err(error.clone());
        }
        Ok(self.entries.lock().await.clone())
    }

    async fn remove(&self, provider_id: &ProviderId) -> Result<(), StoreError> {
        if self.removal_failures.contains(provider_id) {
            return Err(StoreError::backend(
                "provider-state",
                format!("remove '{}' rejected", provider_id),
            ));
        }
        self.entries.lock().await.remove(provider_id);
        Ok(())
    }
}

/// Append-only metrics table.
#[derive(Default)]
pub struct MemoryMetricsSink {
    records: Mutex<Vec<MetricsRecord>>,
    failing_providers: HashSet<ProviderId>,
}

impl MemoryMetricsSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts for these providers fail and are not recorded.
    pub fn failing_for(mut self, providers: impl IntoIterator<Item = ProviderId>) -> Self {
        self.failing_providers.extend(providers);
        self
    }

    pub async fn records(&self) -> Vec<MetricsRecord> {
        self.records.lock().await.clone()
    }
}

#[async_trait]
impl MetricsSink for MemoryMetricsSink {
    async fn insert(&self, record: MetricsRecord) -> Result<(), StoreError> {
        if self.failing_providers.contains(&record.provider_id) {
            return Err(StoreError::backend(
                "metrics",
                format!("insert for provider '{}' rejected", record.provider_id),
            ));
        }
        self.records.lock().await.push(record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GeographyShape;

    fn geography(id: &str, publish_date: Option<i64>) -> Geography {
        Geography {
            geography_id: GeographyId::from(id),
            name: None,
            publish_date,
            geography_json: GeographyShape::Polygon {
                coordinates: Vec::new(),
            },
        }
    }

    #[tokio::test]
    async fn test_device_store_counts_reads() {
        let store = MemoryDeviceStore::from_devices([Device::new("d1", "bicycle", Vec::new())]);

        assert!(store.read_device(&DeviceId::from("d1")).await.unwrap().is_some());
        assert!(store.read_device(&DeviceId::from("d2")).await.unwrap().is_none());
        assert_eq!(store.calls(), 2);
    }

    #[tokio::test]
    async fn test_geography_store_filters_unpublished() {
        let store = MemoryGeographyStore::from_geographies([
            geography("published", Some(10)),
            geography("draft", None),
        ]);

        assert_eq!(store.read_geographies(true).await.unwrap().len(), 1);
        assert_eq!(store.read_geographies(false).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_geography_insert_replaces_in_place() {
        let store = MemoryGeographyStore::from_geographies([
            geography("a", Some(1)),
            geography("b", Some(1)),
        ]);
        store.insert(geography("a", None)).await;

        let all = store.read_geographies(false).await.unwrap();
        assert_eq!(all[0].geography_id, GeographyId::from("a"));
        assert_eq!(all[0].publish_date, None);
        assert_eq!(all.len(), 2);
        assert!(store.remove(&GeographyId::from("missing")).await.is_none());
    }

    #[tokio::test]
    async fn test_provider_store_removal_failure_keeps_entry() {
        let store = MemoryProviderStateStore::from_entries([
            (ProviderId::from("p1"), ProviderStateEntry::default()),
            (ProviderId::from("p2"), ProviderStateEntry::default()),
        ])
        .failing_removals_for([ProviderId::from("p2")]);

        store.remove(&ProviderId::from("p1")).await.unwrap();
        assert!(store.remove(&ProviderId::from("p2")).await.is_err());
        assert_eq!(store.keys().await, vec![ProviderId::from("p2")]);
    }

    #[tokio::test]
    async fn test_metrics_sink_rejects_selected_providers() {
        let sink = MemoryMetricsSink::new().failing_for([ProviderId::from("bad")]);
        let record = |provider: &str| MetricsRecord {
            provider_id: ProviderId::from(provider),
            timestamp: 1,
            cap_count: 0,
            dead_count: 0,
            invalid_count: 0,
            duplicate_count: 0,
            ooo_count: 0,
        };

        sink.insert(record("good")).await.unwrap();
        assert!(sink.insert(record("bad")).await.is_err());
        assert_eq!(sink.records().await, vec![record("good")]);
    }
}
