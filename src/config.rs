use std::{collections::BTreeMap, time::Duration};

use crate::{
    actuator::{ActuatorKind, ActuatorProfile, DEFAULT_COMMAND_TIMEOUT},
    sensor::Metric,
    thresholds::{Periods, RequirementThresholds},
};

#[derive(Debug, Clone)]
pub struct RoomConfig {
    pub name: String,

    pub thresholds: RequirementThresholds,

    pub periods: Periods,

    pub command_timeout: Duration,

    pub store_timeout: Duration,

    pub sensor_tokens: BTreeMap<Metric, String>,

    pub actuators: Vec<ActuatorProfile>,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            name: "room".to_owned(),
            thresholds: RequirementThresholds::default(),
            periods: Periods::default(),
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
            store_timeout: Duration::from_secs(5),
            sensor_tokens: BTreeMap::new(),
            actuators: ActuatorKind::ALL
                .into_iter()
                .map(|kind| ActuatorProfile::new(kind, String::new(), String::new()))
                .collect(),
        }
    }
}
