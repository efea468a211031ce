use serde_json::Value;

use crate::actuator::ActuatorKind;

#[derive(Debug, Clone)]
pub struct ActuatorProfile {
    pub id: String,

    pub kind: ActuatorKind,

    pub address: String,

    pub token: String,

    pub last_setting: Option<Value>,

    /// Last commanded state. Never read back from the device.
    pub power_state: bool,

    pub autocontrol_enabled: bool,
}

impl ActuatorProfile {
    pub fn new(kind: ActuatorKind, address: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            id: kind.as_str().to_owned(),
            kind,
            address: address.into(),
            token: token.into(),
            last_setting: None,
            power_state: false,
            autocontrol_enabled: true,
        }
    }
}
