// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

use crate::cache::{CacheLoader, CacheStats, MemoCache};
use crate::errors::{LabelError, MessageError, StoreError};
use crate::model::{message::DEVICE_ID_FIELD, Device, DeviceId, Labels, Message};
use crate::observability::messages::labeler::{DeviceFastPathFailed, DeviceNotFound};
use crate::observability::messages::StructuredLog;
use crate::traits::{DeviceStore, Labeler};

pub const VEHICLE_TYPE_LABEL: &str = "vehicle_type";
pub const VEHICLE_PROPULSION_LABEL: &str = "vehicle_propulsion";

/// Resolves a device through the optional fast-path cache, then the authoritative store.
///
/// A fast-path failure is logged and treated as a miss.
pub struct DeviceLoader {
    fast_path: Option<Arc<dyn DeviceStore>>,
    store: Arc<dyn DeviceStore>,
}

#[async_trait]
impl CacheLoader<DeviceId, Device> for DeviceLoader {
    type Error = StoreError;

    async fn load(&self, device_id: &DeviceId) -> Result<Option<Device>, StoreError> {
        if let Some(fast_path) = &self.fast_path {
            match fast_path.read_device(device_id).await {
                Ok(Some(device)) => return Ok(Some(device)),
                Ok(None) => {}
                Err(error) => DeviceFastPathFailed {
                    device_id: device_id.as_str(),
                    error: &error,
                }
                .log(),
            }
        }
        self.store.read_device(device_id).await
    }
}

/// Labels a message with the type and propulsion of the device that emitted it.
///
/// Devices are memoized per labeler instance. Unknown devices are not memoized,
/// so a device registered later is picked up on its next message.
pub struct DeviceLabeler {
    devices: MemoCache<DeviceId, Device, DeviceLoader>,
}

impl DeviceLabeler {
    pub fn new(store: Arc<dyn DeviceStore>, capacity: usize) -> Self {
        Self::with_fast_path(None, store, capacity)
    }

    pub fn with_fast_path(
        fast_path: Option<Arc<dyn DeviceStore>>,
        store: Arc<dyn DeviceStore>,
        capacity: usize,
    ) -> Self {
        Self {
            devices: MemoCache::new(capacity, DeviceLoader { fast_path, store }),
        }
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.devices.stats().await
    }
}

#[async_trait]
impl Labeler for DeviceLabeler {
    async fn label(&self, message: &Message) -> Result<Labels, LabelError> {
        let device_id = message
            .device_id()?
            .ok_or(MessageError::MissingField(DEVICE_ID_FIELD))?;

        let Some(device) = self.devices.get(&device_id).await? else {
            DeviceNotFound {
                device_id: device_id.as_str(),
            }
            .log();
            return Err(LabelError::NotFound {
                device_id: device_id.0,
            });
        };

        let mut labels = Labels::new();
        labels.insert(VEHICLE_TYPE_LABEL.to_string(), json!(device.vehicle_type));
        labels.insert(
            VEHICLE_PROPULSION_LABEL.to_string(),
            json!(device.propulsion_types),
        );
        Ok(labels)
    }

    fn name(&self) -> &'static str {
        "device"
    }
}
