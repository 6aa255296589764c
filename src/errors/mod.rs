// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod config;
mod label;
mod store;
mod stream;

pub use config::ConfigError;
pub use label::{GeometryError, LabelError, MessageError};
pub use store::StoreError;
pub use stream::StreamError;
