// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Boundary contracts for the storage collaborators.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::errors::StoreError;
use crate::model::{Device, DeviceId, Geography, MetricsRecord, ProviderId, ProviderStateEntry};

/// Device registry lookup. Used both for the fast-path cache and the authoritative store.
#[async_trait]
pub trait DeviceStore: Send + Sync {
    async fn read_device(&self, device_id: &DeviceId) -> Result<Option<Device>, StoreError>;
}

#[async_trait]
pub trait GeographyStore: Send + Sync {
    async fn read_geographies(&self, published_only: bool) -> Result<Vec<Geography>, StoreError>;
}

/// Shared keyed store of per-provider accumulators.
#[async_trait]
pub trait ProviderStateStore: Send + Sync {
    async fn read_all(&self) -> Result<HashMap<ProviderId, ProviderStateEntry>, StoreError>;

    async fn remove(&self, provider_id: &ProviderId) -> Result<(), StoreError>;
}

/// Durable, append-only destination for metrics rows.
#[async_trait]
pub trait MetricsSink: Send + Sync {
    async fn insert(&self, record: MetricsRecord) -> Result<(), StoreError>;
}
