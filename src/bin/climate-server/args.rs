use std::{collections::BTreeMap, net::SocketAddr, time::Duration};

use clap::Parser;
use room_climate::{
    actuator::{ActuatorKind, ActuatorProfile},
    config::RoomConfig,
    sensor::Metric,
    thresholds::{Periods, RequirementThresholds, period_from_secs},
};

#[derive(Debug, Parser)]
pub struct Args {
    #[arg(long, env = "LISTEN_ADDR", default_value = "127.0.0.1:5000")]
    pub listen_addr: SocketAddr,

    /// Samples are kept in memory when unset.
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    #[arg(long, env = "ROOM_NAME", default_value = "room")]
    pub room_name: String,

    #[arg(long, env = "REPORT_PERIOD_SECS", default_value_t = 600f64)]
    pub report_period_secs: f64,

    #[arg(long, env = "FORECAST_PERIOD_SECS", default_value_t = 600f64)]
    pub forecast_period_secs: f64,

    #[arg(long, env = "ACTUATOR_TIMEOUT_MS", default_value_t = 1500)]
    pub actuator_timeout_ms: u64,

    #[arg(long, env = "STORE_TIMEOUT_MS", default_value_t = 5000)]
    pub store_timeout_ms: u64,

    #[arg(long, env = "SENSOR_TEMPERATURE_TOKEN")]
    pub sensor_temperature_token: Option<String>,

    #[arg(long, env = "SENSOR_HUMIDITY_TOKEN")]
    pub sensor_humidity_token: Option<String>,

    #[arg(long, env = "SENSOR_CO2_TOKEN")]
    pub sensor_co2_token: Option<String>,

    #[arg(long, env = "SENSOR_TEMPERATURE_OUTER_TOKEN")]
    pub sensor_temperature_outer_token: Option<String>,

    #[arg(long, env = "SENSOR_HUMIDITY_OUTER_TOKEN")]
    pub sensor_humidity_outer_token: Option<String>,

    #[arg(long, env = "ACTUATOR_AC_ADDRESS", default_value = "")]
    pub actuator_ac_address: String,

    #[arg(long, env = "ACTUATOR_AC_TOKEN", default_value = "")]
    pub actuator_ac_token: String,

    #[arg(long, env = "ACTUATOR_VENT_ADDRESS", default_value = "")]
    pub actuator_vent_address: String,

    #[arg(long, env = "ACTUATOR_VENT_TOKEN", default_value = "")]
    pub actuator_vent_token: String,

    #[arg(long, env = "ACTUATOR_HEATER_ADDRESS", default_value = "")]
    pub actuator_heater_address: String,

    #[arg(long, env = "ACTUATOR_HEATER_TOKEN", default_value = "")]
    pub actuator_heater_token: String,

    #[arg(long, env = "ACTUATOR_HUMIDIFIER_ADDRESS", default_value = "")]
    pub actuator_humidifier_address: String,

    #[arg(long, env = "ACTUATOR_HUMIDIFIER_TOKEN", default_value = "")]
    pub actuator_humidifier_token: String,
}

impl Args {
    pub fn room_config(&self) -> RoomConfig {
        let defaults = Periods::default();
        let periods = Periods {
            report: period_from_secs(self.report_period_secs).unwrap_or(defaults.report),
            forecast: period_from_secs(self.forecast_period_secs).unwrap_or(defaults.forecast),
        };

        let sensor_tokens: BTreeMap<Metric, String> = [
            (Metric::Temperature, &self.sensor_temperature_token),
            (Metric::Humidity, &self.sensor_humidity_token),
            (Metric::Co2, &self.sensor_co2_token),
            (Metric::TemperatureOuter, &self.sensor_temperature_outer_token),
            (Metric::HumidityOuter, &self.sensor_humidity_outer_token),
        ]
        .into_iter()
        .filter_map(|(metric, token)| Some((metric, token.clone()?)))
        .collect();

        let actuators = [
            (ActuatorKind::Ac, &self.actuator_ac_address, &self.actuator_ac_token),
            (ActuatorKind::Vent, &self.actuator_vent_address, &self.actuator_vent_token),
            (ActuatorKind::Heater, &self.actuator_heater_address, &self.actuator_heater_token),
            (
                ActuatorKind::Humidifier,
                &self.actuator_humidifier_address,
                &self.actuator_humidifier_token,
            ),
        ]
        .into_iter()
        .map(|(kind, address, token)| ActuatorProfile::new(kind, address, token))
        .collect();

        RoomConfig {
            name: self.room_name.clone(),
            thresholds: RequirementThresholds::default(),
            periods,
            command_timeout: Duration::from_millis(self.actuator_timeout_ms),
            store_timeout: Duration::from_millis(self.store_timeout_ms),
            sensor_tokens,
            actuators,
        }
    }
}
