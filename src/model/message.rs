// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::MessageError;
use crate::model::{DeviceId, Telemetry};

pub const DEVICE_ID_FIELD: &str = "device_id";
pub const TELEMETRY_FIELD: &str = "telemetry";
pub const TIMESTAMP_FIELD: &str = "timestamp";
pub const RECORDED_FIELD: &str = "recorded";

/// Label fields produced by a single labeler, merged into the message by the caller.
pub type Labels = Map<String, Value>;

/// One telemetry or state-change event as it travels through the pipeline.
///
/// The body is untyped at the transport boundary. Labelers read it through the
/// typed accessors below and never mutate it; enrichment produces a new message
/// via [`Message::merged`] or [`Message::with_labels`].
///
/// Accessors return `Ok(None)` for an absent or `null` field and an error for a
/// field that is present but malformed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Message(Map<String, Value>);

impl Message {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Build a message from a JSON value, which must be an object.
    pub fn from_value(value: Value) -> Result<Self, MessageError> {
        match value {
            Value::Object(fields) => Ok(Self(fields)),
            other => Err(MessageError::InvalidField {
                field: "message",
                reason: format!("expected an object, got {}", json_type_name(&other)),
            }),
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field).filter(|value| !value.is_null())
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Return a new message with `labels` overlaid on a copy of this one.
    pub fn merged(&self, labels: Labels) -> Message {
        self.clone().with_labels(labels)
    }

    /// Consume the message and overlay `labels`. Label fields win on collision.
    pub fn with_labels(mut self, labels: Labels) -> Message {
        self.0.extend(labels);
        self
    }

    pub fn device_id(&self) -> Result<Option<DeviceId>, MessageError> {
        match self.get(DEVICE_ID_FIELD) {
            None => Ok(None),
            Some(Value::String(id)) => Ok(Some(DeviceId::from(id.as_str()))),
            Some(other) => Err(MessageError::InvalidField {
                field: DEVICE_ID_FIELD,
                reason: format!("expected a string, got {}", json_type_name(other)),
            }),
        }
    }

    pub fn telemetry(&self) -> Result<Option<Telemetry>, MessageError> {
        self.get(TELEMETRY_FIELD)
            .map(Telemetry::from_value)
            .transpose()
    }

    /// Original event time, epoch milliseconds.
    pub fn timestamp(&self) -> Result<Option<i64>, MessageError> {
        integer_field(self.get(TIMESTAMP_FIELD), TIMESTAMP_FIELD)
    }

    /// Time the platform recorded the event, epoch milliseconds.
    pub fn recorded(&self) -> Result<Option<i64>, MessageError> {
        integer_field(self.get(RECORDED_FIELD), RECORDED_FIELD)
    }
}

impl From<Map<String, Value>> for Message {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

impl From<Message> for Value {
    fn from(message: Message) -> Self {
        Value::Object(message.0)
    }
}

pub(crate) fn integer_field(
    value: Option<&Value>,
    field: &'static str,
) -> Result<Option<i64>, MessageError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(number)) => number.as_i64().map(Some).ok_or_else(|| {
            MessageError::InvalidField {
                field,
                reason: format!("expected an integer, got {}", number),
            }
        }),
        Some(other) => Err(MessageError::InvalidField {
            field,
            reason: format!("expected an integer, got {}", json_type_name(other)),
        }),
    }
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn message(value: Value) -> Message {
        Message::from_value(value).unwrap()
    }

    #[test]
    fn test_from_value_rejects_non_objects() {
        let err = Message::from_value(json!([1, 2, 3])).unwrap_err();
        assert!(err.to_string().contains("expected an object, got array"));
    }

    #[test]
    fn test_null_fields_read_as_absent() {
        let msg = message(json!({ "device_id": null, "timestamp": null }));
        assert_eq!(msg.device_id().unwrap(), None);
        assert_eq!(msg.timestamp().unwrap(), None);
        assert!(msg.get("device_id").is_none());
    }

    #[test]
    fn test_malformed_fields_are_errors() {
        let msg = message(json!({ "device_id": 42, "recorded": "soon" }));
        assert!(matches!(
            msg.device_id(),
            Err(MessageError::InvalidField { field: "device_id", .. })
        ));
        assert!(matches!(
            msg.recorded(),
            Err(MessageError::InvalidField { field: "recorded", .. })
        ));
    }

    #[test]
    fn test_merged_leaves_original_untouched() {
        let original = message(json!({ "device_id": "d1", "vehicle_type": "bicycle" }));

        let mut labels = Labels::new();
        labels.insert("vehicle_type".to_string(), json!("scooter"));
        labels.insert("latency_ms".to_string(), json!(12));

        let enriched = original.merged(labels);

        assert_eq!(original.get("vehicle_type"), Some(&json!("bicycle")));
        assert_eq!(original.len(), 2);
        assert_eq!(enriched.get("vehicle_type"), Some(&json!("scooter")));
        assert_eq!(enriched.get("latency_ms"), Some(&json!(12)));
        assert_eq!(enriched.get("device_id"), Some(&json!("d1")));
    }
}
