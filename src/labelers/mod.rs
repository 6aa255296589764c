// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message labelers and their sequential composition.
//!
//! Each labeler reads a message and returns a [`Labels`](crate::model::Labels)
//! delta; [`LabelChain`] merges the deltas in order into one enriched message.

pub mod chain;
pub mod device;
pub mod geography;
pub mod latency;
pub mod telemetry;

pub use chain::LabelChain;
pub use device::{DeviceLabeler, DeviceLoader, VEHICLE_PROPULSION_LABEL, VEHICLE_TYPE_LABEL};
pub use geography::{GeographyIndexStats, GeographyLabeler, GEOGRAPHY_IDS_LABEL};
pub use latency::{LatencyLabeler, LATENCY_LABEL};
pub use telemetry::{OptionalTelemetryLabeler, TelemetryLabeler, TELEMETRY_LABELS};
