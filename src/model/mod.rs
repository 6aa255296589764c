// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Data carried through the enrichment pipeline and the aggregation engine.

mod device;
mod geography;
pub mod message;
mod provider;
mod telemetry;

pub use device::{Device, DeviceId};
pub use geography::{Geography, GeographyId, GeographyShape, Position, Ring};
pub use message::{Labels, Message};
pub use provider::{MetricsRecord, ProviderId, ProviderStateEntry, VehicleSnapshot, VehicleState};
pub use telemetry::{GpsFix, Telemetry};
