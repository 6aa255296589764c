// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::MessageError;
use crate::model::message::{integer_field, json_type_name};

const FIELD: &str = "telemetry";
const GPS_FIELD: &str = "telemetry.gps";
const CHARGE_FIELD: &str = "telemetry.charge";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsFix {
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub altitude: Option<f64>,
    #[serde(default)]
    pub heading: Option<f64>,
    #[serde(default)]
    pub speed: Option<f64>,
    #[serde(default)]
    pub accuracy: Option<f64>,
}

impl GpsFix {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self {
            lat,
            lng,
            altitude: None,
            heading: None,
            speed: None,
            accuracy: None,
        }
    }
}

/// Telemetry attached to an event.
///
/// The fix is normally nested under `gps`. A telemetry object that carries
/// `lat`/`lng` directly is read as its own fix.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Telemetry {
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub gps: Option<GpsFix>,
    #[serde(default)]
    pub charge: Option<f64>,
}

impl Telemetry {
    pub fn from_value(value: &Value) -> Result<Self, MessageError> {
        let object = value.as_object().ok_or_else(|| MessageError::InvalidField {
            field: FIELD,
            reason: format!("expected an object, got {}", json_type_name(value)),
        })?;

        Ok(Self {
            timestamp: integer_field(object.get("timestamp"), "telemetry.timestamp")?,
            gps: gps_fix(object)?,
            charge: match object.get("charge") {
                None | Some(Value::Null) => None,
                Some(Value::Number(n)) => n.as_f64(),
                Some(other) => {
                    return Err(MessageError::InvalidField {
                        field: CHARGE_FIELD,
                        reason: format!("expected a number, got {}", json_type_name(other)),
                    })
                }
            },
        })
    }
}

fn gps_fix(object: &Map<String, Value>) -> Result<Option<GpsFix>, MessageError> {
    let source = match object.get("gps") {
        Some(Value::Null) | None if has_inline_fix(object) => Value::Object(object.clone()),
        Some(Value::Null) | None => return Ok(None),
        Some(gps) => gps.clone(),
    };

    serde_json::from_value(source)
        .map(Some)
        .map_err(|e| MessageError::InvalidField {
            field: GPS_FIELD,
            reason: e.to_string(),
        })
}

fn has_inline_fix(object: &Map<String, Value>) -> bool {
    object.get("lat").is_some_and(|v| !v.is_null()) && object.get("lng").is_some_and(|v| !v.is_null())
}
