use std::{fmt, str::FromStr};

use anyhow::{Error, bail};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActuatorKind {
    Ac,
    Vent,
    Heater,
    Humidifier,
}

impl ActuatorKind {
    pub const ALL: [ActuatorKind; 4] = [
        ActuatorKind::Ac,
        ActuatorKind::Vent,
        ActuatorKind::Heater,
        ActuatorKind::Humidifier,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActuatorKind::Ac => "ac",
            ActuatorKind::Vent => "vent",
            ActuatorKind::Heater => "heater",
            ActuatorKind::Humidifier => "humidifier",
        }
    }
}

impl fmt::Display for ActuatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActuatorKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ac" => Ok(ActuatorKind::Ac),
            "vent" => Ok(ActuatorKind::Vent),
            "heater" => Ok(ActuatorKind::Heater),
            "humidifier" => Ok(ActuatorKind::Humidifier),
            _ => bail!("unknown actuator kind: {}", s),
        }
    }
}
