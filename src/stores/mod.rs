// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! In-process collaborators for the demo host and tests.

pub mod channel;
pub mod memory;

pub use channel::{ChannelSource, CollectingSink, JsonLinesSink};
pub use memory::{MemoryDeviceStore, MemoryGeographyStore, MemoryMetricsSink, MemoryProviderStateStore};
