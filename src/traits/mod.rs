// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod labeler;
pub mod store;
pub mod stream;
pub mod time;

pub use labeler::{Labeler, Transform};
pub use store::{DeviceStore, GeographyStore, MetricsSink, ProviderStateStore};
pub use stream::{MessageHandler, StreamConsumer, StreamSink, StreamSource};
pub use time::{ManualTimeSource, SystemTimeSource, TimeSource};
