// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde_json::json;

use crate::errors::{LabelError, MessageError};
use crate::model::message::{RECORDED_FIELD, TIMESTAMP_FIELD};
use crate::model::{Labels, Message};
use crate::traits::Labeler;

pub const LATENCY_LABEL: &str = "latency_ms";

/// Labels a message with `recorded - timestamp` in milliseconds.
///
/// The difference is reported as-is. A negative latency means the upstream
/// clocks disagree and is kept visible rather than floored to zero.
pub struct LatencyLabeler;

#[async_trait]
impl Labeler for LatencyLabeler {
    async fn label(&self, message: &Message) -> Result<Labels, LabelError> {
        let timestamp = message
            .timestamp()?
            .ok_or(MessageError::MissingField(TIMESTAMP_FIELD))?;
        let recorded = message
            .recorded()?
            .ok_or(MessageError::MissingField(RECORDED_FIELD))?;

        let latency_ms = recorded
            .checked_sub(timestamp)
            .ok_or_else(|| MessageError::InvalidField {
                field: RECORDED_FIELD,
                reason: format!("latency {} - {} overflows", recorded, timestamp),
            })?;

        let mut labels = Labels::new();
        labels.insert(LATENCY_LABEL.to_string(), json!(latency_ms));
        Ok(labels)
    }

    fn name(&self) -> &'static str {
        "latency"
    }
}
