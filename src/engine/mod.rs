// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod aggregation;
pub mod stream_processor;

pub use aggregation::{AggregationReport, ProviderAggregator};
pub use stream_processor::{StreamProcessor, StreamStats};
