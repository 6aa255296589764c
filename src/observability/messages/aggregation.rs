// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for provider aggregation cycles.
//!
//! This module contains message types for logging events related to:
//! * Cycle start and completion
//! * Per-provider persistence failures (the provider is retried next cycle)
//! * Keyed store read and removal failures

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Aggregation cycle started over a snapshot of the provider store.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use mobility_enrich::observability::messages::aggregation::AggregationCycleStarted;
///
/// let msg = AggregationCycleStarted {
///     provider_count: 12,
///     timestamp: 1_700_000_000_000,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct AggregationCycleStarted {
    pub provider_count: usize,
    pub timestamp: i64,
}

impl Display for AggregationCycleStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Aggregation cycle at {} started: {} providers",
            self.timestamp, self.provider_count
        )
    }
}

impl StructuredLog for AggregationCycleStarted {
    fn log(&self) {
        tracing::info!(
            provider_count = self.provider_count,
            timestamp = self.timestamp,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "aggregation_cycle",
            span_name = name,
            provider_count = self.provider_count,
            timestamp = self.timestamp,
        )
    }
}

/// Aggregation cycle completed.
///
/// # Log Level
/// `info!` - Important operational event
pub struct AggregationCycleCompleted {
    pub timestamp: i64,
    pub persisted: usize,
    pub failed: usize,
    pub duration: std::time::Duration,
}

impl Display for AggregationCycleCompleted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Aggregation cycle at {} completed: persisted={}, failed={}, duration={:?}",
            self.timestamp, self.persisted, self.failed, self.duration
        )
    }
}

impl StructuredLog for AggregationCycleCompleted {
    fn log(&self) {
        tracing::info!(
            timestamp = self.timestamp,
            persisted = self.persisted,
            failed = self.failed,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "aggregation_cycle_completed",
            span_name = name,
            timestamp = self.timestamp,
            persisted = self.persisted,
            failed = self.failed,
        )
    }
}

/// Persisting one provider's metrics failed; its state stays in the store.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct ProviderAggregationFailed<'a> {
    pub provider_id: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for ProviderAggregationFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Aggregation for provider '{}' failed, retrying next cycle: {}",
            self.provider_id, self.error
        )
    }
}

impl StructuredLog for ProviderAggregationFailed<'_> {
    fn log(&self) {
        tracing::error!(provider_id = self.provider_id, error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "provider_aggregation_failed",
            span_name = name,
            provider_id = self.provider_id,
            error = %self.error,
        )
    }
}

/// Metrics were persisted but the provider's state could not be removed.
/// The next cycle will write a second row for the same state.
///
/// # Log Level
/// `warn!` - Duplicate row expected
pub struct ProviderStateRemovalFailed<'a> {
    pub provider_id: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for ProviderStateRemovalFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Metrics for provider '{}' persisted but state removal failed: {}",
            self.provider_id, self.error
        )
    }
}

impl StructuredLog for ProviderStateRemovalFailed<'_> {
    fn log(&self) {
        tracing::warn!(provider_id = self.provider_id, error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "provider_state_removal_failed",
            span_name = name,
            provider_id = self.provider_id,
            error = %self.error,
        )
    }
}

/// The provider store could not be read; nothing was aggregated.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct ProviderStateReadFailed<'a> {
    pub error: &'a dyn std::error::Error,
}

impl Display for ProviderStateReadFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Reading provider state failed, cycle skipped: {}", self.error)
    }
}

impl StructuredLog for ProviderStateReadFailed<'_> {
    fn log(&self) {
        tracing::error!(error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("provider_state_read_failed", span_name = name, error = %self.error)
    }
}
