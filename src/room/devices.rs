use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    actuator::{ActuatorKind, ActuatorProfile},
    sensor::Metric,
};

/// Actuator state as shown on the devices page. Tokens are write-only and
/// not included.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeviceStatus {
    pub executor_on: BTreeMap<ActuatorKind, bool>,

    pub executor_autocontrol: BTreeMap<ActuatorKind, bool>,

    pub executor_setting: BTreeMap<ActuatorKind, Option<Value>>,

    pub executor_address: BTreeMap<ActuatorKind, String>,
}

impl DeviceStatus {
    pub fn collect<'a>(actuators: impl IntoIterator<Item = &'a ActuatorProfile>) -> Self {
        let mut status = Self::default();
        for a in actuators {
            status.executor_on.insert(a.kind, a.power_state);
            status
                .executor_autocontrol
                .insert(a.kind, a.autocontrol_enabled);
            status.executor_setting.insert(a.kind, a.last_setting.clone());
            status.executor_address.insert(a.kind, a.address.clone());
        }

        status
    }
}

/// Every section is optional; absent devices are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DeviceSettingsUpdate {
    pub executor_on: BTreeMap<ActuatorKind, bool>,

    pub executor_autocontrol: BTreeMap<ActuatorKind, bool>,

    pub executor_setting: BTreeMap<ActuatorKind, Value>,

    pub executor_token: BTreeMap<ActuatorKind, String>,

    pub executor_address: BTreeMap<ActuatorKind, String>,

    pub sensor_remove: BTreeMap<Metric, bool>,

    pub sensor_new_token: BTreeMap<Metric, String>,
}
