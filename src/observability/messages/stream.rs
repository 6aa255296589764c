// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for stream processor lifecycle and per-message outcomes.

use crate::engine::StreamStats;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Stream processor started: sink then source are initialized.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use mobility_enrich::observability::messages::stream::StreamProcessorStarted;
///
/// let msg = StreamProcessorStarted { name: "enrichment" };
///
/// tracing::info!("{}", msg);
/// ```
pub struct StreamProcessorStarted<'a> {
    pub name: &'a str,
}

impl Display for StreamProcessorStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Stream processor '{}' started", self.name)
    }
}

impl StructuredLog for StreamProcessorStarted<'_> {
    fn log(&self) {
        tracing::info!(processor = self.name, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("stream_started", span_name = name, processor = self.name)
    }
}

/// Stream processor stopped: consumer and producer are both shut down.
///
/// # Log Level
/// `info!` - Important operational event
pub struct StreamProcessorStopped<'a> {
    pub name: &'a str,
    pub stats: StreamStats,
}

impl Display for StreamProcessorStopped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Stream processor '{}' stopped: received={}, written={}, dropped={}, failed={}",
            self.name,
            self.stats.received,
            self.stats.written,
            self.stats.dropped,
            self.stats.failed
        )
    }
}

impl StructuredLog for StreamProcessorStopped<'_> {
    fn log(&self) {
        tracing::info!(
            processor = self.name,
            received = self.stats.received,
            written = self.stats.written,
            dropped = self.stats.dropped,
            failed = self.stats.failed,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "stream_stopped",
            span_name = name,
            processor = self.name,
            received = self.stats.received,
            written = self.stats.written,
        )
    }
}

/// The transform produced no output for a message.
///
/// # Log Level
/// `debug!` - Expected filtering
pub struct MessageDropped<'a> {
    pub name: &'a str,
}

impl Display for MessageDropped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Stream processor '{}' dropped a message", self.name)
    }
}

impl StructuredLog for MessageDropped<'_> {
    fn log(&self) {
        tracing::debug!(processor = self.name, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("message_dropped", span_name = name, processor = self.name)
    }
}

/// A message failed in the handler and never reached the sink.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct MessageFailed<'a> {
    pub source: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for MessageFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Message from source '{}' failed: {}",
            self.source, self.error
        )
    }
}

impl StructuredLog for MessageFailed<'_> {
    fn log(&self) {
        tracing::error!(source = self.source, error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "message_failed",
            span_name = name,
            source = self.source,
            error = %self.error,
        )
    }
}
