// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::ProviderId;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(pub String);

impl DeviceId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for DeviceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A registered vehicle as owned by the external device registry.
///
/// Read-only from the pipeline's perspective. Registry payloads use either the
/// long (`vehicle_type`, `propulsion_types`) or short (`type`, `propulsion`)
/// field names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub device_id: DeviceId,
    #[serde(default)]
    pub provider_id: Option<ProviderId>,
    #[serde(alias = "type")]
    pub vehicle_type: String,
    #[serde(default, alias = "propulsion")]
    pub propulsion_types: Vec<String>,
}

impl Device {
    pub fn new(
        device_id: impl Into<DeviceId>,
        vehicle_type: impl Into<String>,
        propulsion_types: Vec<String>,
    ) -> Self {
        Self {
            device_id: device_id.into(),
            provider_id: None,
            vehicle_type: vehicle_type.into(),
            propulsion_types,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_accepts_short_field_names() {
        let yaml = r#"
device_id: d1
type: scooter
propulsion: [electric]
"#;
        let device: Device = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(device.device_id, DeviceId::from("d1"));
        assert_eq!(device.vehicle_type, "scooter");
        assert_eq!(device.propulsion_types, vec!["electric".to_string()]);
        assert_eq!(device.provider_id, None);
    }
}
