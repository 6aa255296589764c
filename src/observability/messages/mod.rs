// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! # Organization
//!
//! * `labeler` - Device lookups and geography index events
//! * `stream` - Stream processor lifecycle and per-message outcomes
//! * `aggregation` - Provider aggregation cycles and per-provider failures
//!
//! # Usage Pattern
//!
//! ```rust
//! use mobility_enrich::observability::messages::stream::StreamProcessorStarted;
//!
//! let msg = StreamProcessorStarted { name: "enrichment" };
//!
//! tracing::info!("{}", msg);
//! ```

use tracing::Span;

pub mod aggregation;
pub mod labeler;
pub mod stream;

/// A message that knows its own level and structured fields.
pub trait StructuredLog {
    /// Emit the message as an event at its level with its fields attached.
    fn log(&self);

    /// Open a span carrying the same fields.
    fn span(&self, name: &str) -> Span;
}
