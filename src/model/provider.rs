// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::model::DeviceId;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderId(pub String);

impl ProviderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProviderId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleState {
    Available,
    Elsewhere,
    NonOperational,
    OnTrip,
    Removed,
    Reserved,
    Unknown,
}

impl VehicleState {
    /// Whether a vehicle in this state occupies a slot of the provider's permitted fleet.
    pub fn counts_toward_capacity(&self) -> bool {
        matches!(
            self,
            VehicleState::Available
                | VehicleState::NonOperational
                | VehicleState::OnTrip
                | VehicleState::Reserved
        )
    }
}

/// Last known state of one vehicle, as rolled up by upstream event processing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleSnapshot {
    pub state: VehicleState,
    pub last_event_ms: i64,
    #[serde(default)]
    pub last_telemetry_ms: Option<i64>,
}

impl VehicleSnapshot {
    pub fn last_seen_ms(&self) -> i64 {
        self.last_telemetry_ms
            .map_or(self.last_event_ms, |telemetry| telemetry.max(self.last_event_ms))
    }
}

/// Per-provider accumulator held in the shared keyed store between aggregation cycles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderStateEntry {
    #[serde(default)]
    pub invalid_count: u64,
    #[serde(default)]
    pub duplicate_count: u64,
    #[serde(default)]
    pub ooo_count: u64,
    #[serde(default)]
    pub vehicles: HashMap<DeviceId, VehicleSnapshot>,
}

/// One durable metrics row. Rows are append-only and keyed by `(provider_id, timestamp)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsRecord {
    pub provider_id: ProviderId,
    pub timestamp: i64,
    pub cap_count: u64,
    pub dead_count: u64,
    pub invalid_count: u64,
    pub duplicate_count: u64,
    pub ooo_count: u64,
}
