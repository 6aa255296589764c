// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Default number of devices held by the device labeler's memo cache
pub const DEFAULT_CACHE_CAPACITY: usize = 1000;
/// Default aggregation cycle period (seconds)
pub const DEFAULT_AGGREGATION_INTERVAL_SECONDS: u64 = 60;
/// Default age after which a vehicle with no events or telemetry counts as dead (48 hours)
pub const DEFAULT_DEAD_DEVICE_THRESHOLD_SECONDS: u64 = 48 * 60 * 60;
/// Default tracing filter when RUST_LOG is not set
pub const DEFAULT_LOG_FILTER: &str = "info";
/// Buffered messages between the demo reader and the stream processor
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;
/// Shortest period the aggregation loop will tick at (milliseconds)
pub const MIN_AGGREGATION_INTERVAL_MILLIS: u64 = 1;
