// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! Diagnostic and operational log lines are defined as message types in
//! [`messages`], one struct per event with a `Display` implementation, so log
//! text is not scattered through the pipeline code.
//!
//! # Usage
//!
//! ```rust
//! use mobility_enrich::errors::StoreError;
//! use mobility_enrich::observability::messages::aggregation::ProviderAggregationFailed;
//! use mobility_enrich::observability::messages::StructuredLog;
//!
//! let error = StoreError::backend("metrics", "connection reset");
//! ProviderAggregationFailed {
//!     provider_id: "provider-1",
//!     error: &error,
//! }
//! .log();
//! ```

pub mod messages;

use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber.
///
/// `RUST_LOG` takes precedence over `default_filter`. Calling this more than once
/// is harmless; only the first subscriber is installed.
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}
