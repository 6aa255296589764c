// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for labeler events.
//!
//! This module contains message types for logging events related to:
//! * Device registry lookups (fast path and authoritative)
//! * Geography index growth and rejected geographies

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// The fast-path device cache failed; the lookup falls through to the authoritative store.
///
/// # Log Level
/// `warn!` - Degraded behavior
///
/// # Example
/// ```
/// use mobility_enrich::errors::StoreError;
/// use mobility_enrich::observability::messages::labeler::DeviceFastPathFailed;
///
/// let error = StoreError::unavailable("device-cache", "connection refused");
/// let msg = DeviceFastPathFailed {
///     device_id: "d1",
///     error: &error,
/// };
///
/// tracing::warn!("{}", msg);
/// ```
pub struct DeviceFastPathFailed<'a> {
    pub device_id: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for DeviceFastPathFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Device cache lookup for '{}' failed, falling back to device store: {}",
            self.device_id, self.error
        )
    }
}

impl StructuredLog for DeviceFastPathFailed<'_> {
    fn log(&self) {
        tracing::warn!(
            device_id = self.device_id,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "device_fast_path_failed",
            span_name = name,
            device_id = self.device_id,
            error = %self.error,
        )
    }
}

/// No layer knows the device.
///
/// # Log Level
/// `warn!` - The message is rejected
pub struct DeviceNotFound<'a> {
    pub device_id: &'a str,
}

impl Display for DeviceNotFound<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Device '{}' not found in cache or store", self.device_id)
    }
}

impl StructuredLog for DeviceNotFound<'_> {
    fn log(&self) {
        tracing::warn!(device_id = self.device_id, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("device_not_found", span_name = name, device_id = self.device_id)
    }
}

/// New geographies were added to the process-local index.
///
/// # Log Level
/// `debug!` - Routine growth of the index
pub struct GeographiesIndexed {
    pub added: usize,
    pub total: usize,
}

impl Display for GeographiesIndexed {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Indexed {} new geographies ({} total)",
            self.added, self.total
        )
    }
}

impl StructuredLog for GeographiesIndexed {
    fn log(&self) {
        tracing::debug!(added = self.added, total = self.total, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "geographies_indexed",
            span_name = name,
            added = self.added,
            total = self.total,
        )
    }
}

/// A fetched geography has an unusable boundary. The labeling call fails and the
/// index is left as it was.
///
/// # Log Level
/// `error!` - Bad data in the geography store
pub struct GeographyRejected<'a> {
    pub error: &'a dyn std::error::Error,
}

impl Display for GeographyRejected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Geography rejected, index unchanged: {}", self.error)
    }
}

impl StructuredLog for GeographyRejected<'_> {
    fn log(&self) {
        tracing::error!(error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("geography_rejected", span_name = name, error = %self.error)
    }
}
