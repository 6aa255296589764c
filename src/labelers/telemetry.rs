// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde_json::json;

use crate::errors::{LabelError, MessageError};
use crate::model::{message::TELEMETRY_FIELD, Labels, Message, Telemetry};
use crate::traits::Labeler;

pub const TELEMETRY_LABELS: [&str; 8] = [
    "telemetry_timestamp",
    "telemetry_lat",
    "telemetry_lng",
    "telemetry_altitude",
    "telemetry_heading",
    "telemetry_speed",
    "telemetry_accuracy",
    "telemetry_charge",
];

/// Flatten telemetry into `telemetry_*` label fields. Anything absent is `null`.
fn telemetry_labels(telemetry: Option<&Telemetry>) -> Labels {
    let gps = telemetry.and_then(|t| t.gps.as_ref());
    let values = [
        json!(telemetry.and_then(|t| t.timestamp)),
        json!(gps.map(|g| g.lat)),
        json!(gps.map(|g| g.lng)),
        json!(gps.and_then(|g| g.altitude)),
        json!(gps.and_then(|g| g.heading)),
        json!(gps.and_then(|g| g.speed)),
        json!(gps.and_then(|g| g.accuracy)),
        json!(telemetry.and_then(|t| t.charge)),
    ];

    TELEMETRY_LABELS
        .iter()
        .map(|name| name.to_string())
        .zip(values)
        .collect()
}

/// Flattens the message's telemetry. Fails if the message has none.
pub struct TelemetryLabeler;

#[async_trait]
impl Labeler for TelemetryLabeler {
    async fn label(&self, message: &Message) -> Result<Labels, LabelError> {
        let telemetry = message
            .telemetry()?
            .ok_or(MessageError::MissingField(TELEMETRY_FIELD))?;
        Ok(telemetry_labels(Some(&telemetry)))
    }

    fn name(&self) -> &'static str {
        "telemetry"
    }
}

/// Like [`TelemetryLabeler`], but a message without telemetry gets all-null fields.
///
/// Use this wherever upstream cannot guarantee telemetry, such as non-positional
/// event types.
pub struct OptionalTelemetryLabeler;

#[async_trait]
impl Labeler for OptionalTelemetryLabeler {
    async fn label(&self, message: &Message) -> Result<Labels, LabelError> {
        Ok(telemetry_labels(message.telemetry()?.as_ref()))
    }

    fn name(&self) -> &'static str {
        "optional_telemetry"
    }
}
