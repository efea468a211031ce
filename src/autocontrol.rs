use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::{
    actuator::{ActuatorGateway, ActuatorKind, ActuatorProfile, CommandAnswer},
    assessment::{Co2Band, Level},
    report::Report,
    sensor::Metric,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecisionInputs {
    pub temperature_forecast: Level,

    pub humidity_forecast: Level,

    pub temperature_outer: Level,

    pub humidity_outer: Level,

    pub co2: Co2Band,

    pub co2_forecast: Option<Co2Band>,
}

impl DecisionInputs {
    /// Indoor readings use the forecast band, falling back to the current
    /// band when the window was too thin for a trend. Outdoor readings use
    /// the current band.
    pub fn from_report(report: &Report) -> Option<Self> {
        let temperature = report.metric(Metric::Temperature)?;
        let humidity = report.metric(Metric::Humidity)?;
        let temperature_outer = report.metric(Metric::TemperatureOuter)?;
        let humidity_outer = report.metric(Metric::HumidityOuter)?;
        let co2 = report.metric(Metric::Co2)?;

        Some(Self {
            temperature_forecast: temperature.expected_band().comfort()?.level(),
            humidity_forecast: humidity.expected_band().comfort()?.level(),
            temperature_outer: temperature_outer.band.comfort()?.level(),
            humidity_outer: humidity_outer.band.comfort()?.level(),
            co2: co2.band.co2()?,
            co2_forecast: co2.forecast_band.and_then(|b| b.co2()),
        })
    }
}

/// Desired power state per actuator. `false` means "leave alone", never
/// "switch off".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub ac: bool,

    pub heater: bool,

    pub vent: bool,

    pub humidifier: bool,
}

impl Decision {
    pub fn wants(&self, kind: ActuatorKind) -> bool {
        match kind {
            ActuatorKind::Ac => self.ac,
            ActuatorKind::Vent => self.vent,
            ActuatorKind::Heater => self.heater,
            ActuatorKind::Humidifier => self.humidifier,
        }
    }

    fn vent() -> Self {
        Self {
            vent: true,
            ..Self::default()
        }
    }

    fn heater() -> Self {
        Self {
            heater: true,
            ..Self::default()
        }
    }

    fn ac() -> Self {
        Self {
            ac: true,
            ..Self::default()
        }
    }

    fn humidifier() -> Self {
        Self {
            humidifier: true,
            ..Self::default()
        }
    }
}

pub fn decide(inputs: &DecisionInputs) -> Decision {
    use Level::*;

    let out_t = inputs.temperature_outer;
    let out_h = inputs.humidity_outer;

    let mut decision = match (inputs.temperature_forecast, inputs.humidity_forecast) {
        (TooLow, TooLow) => {
            if out_t != TooLow && out_h != TooLow {
                Decision::vent()
            } else {
                Decision {
                    heater: true,
                    humidifier: true,
                    ..Decision::default()
                }
            }
        }
        (TooLow, Optimum) => {
            if out_t != TooLow && out_h == Optimum {
                Decision::vent()
            } else {
                Decision::heater()
            }
        }
        (TooLow, TooHigh) => {
            if out_t != TooLow && out_h != TooHigh {
                Decision::vent()
            } else {
                Decision::heater()
            }
        }
        (Optimum, TooLow) => {
            if out_t == Optimum && out_h != TooLow {
                Decision::vent()
            } else {
                Decision::humidifier()
            }
        }
        (Optimum, Optimum) => Decision::default(),
        (Optimum, TooHigh) => {
            if out_t == Optimum && out_h != TooHigh {
                Decision::vent()
            } else {
                Decision::default()
            }
        }
        (TooHigh, TooLow) | (TooHigh, TooHigh) => {
            if out_t != TooHigh && out_h != TooHigh {
                Decision::vent()
            } else {
                Decision::ac()
            }
        }
        (TooHigh, Optimum) => {
            if out_t != TooHigh && out_h == Optimum {
                Decision::vent()
            } else {
                Decision::ac()
            }
        }
    };

    let co2_at = |band: Co2Band| inputs.co2 == band || inputs.co2_forecast == Some(band);

    if co2_at(Co2Band::Danger) {
        decision.vent = true;
    }
    if co2_at(Co2Band::Harmful) && inputs.temperature_forecast == Optimum {
        decision.vent = true;
    }

    decision
}

/// Sends a power-on command to every actuator the decision wants on and
/// whose autocontrol flag is set. Nothing is ever switched off from here.
pub async fn dispatch(
    decision: &Decision,
    actuators: &mut BTreeMap<ActuatorKind, ActuatorProfile>,
    gateway: &ActuatorGateway,
) -> Vec<(ActuatorKind, CommandAnswer)> {
    let mut answers = Vec::new();

    for (kind, actuator) in actuators.iter_mut() {
        if !decision.wants(*kind) {
            continue;
        }

        if !actuator.autocontrol_enabled {
            debug!(executor = %kind, "autocontrol disabled, skipping");
            continue;
        }

        let answer = gateway.switch_power(actuator, true).await;
        answers.push((*kind, answer));
    }

    answers
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use serde_json::json;

    use super::*;
    use crate::{
        actuator::testing::FakeTransport,
        store::MemoryStore,
    };

    const LEVELS: [Level; 3] = [Level::TooLow, Level::Optimum, Level::TooHigh];
    const CO2: [Co2Band; 4] = [
        Co2Band::Optimum,
        Co2Band::Acceptable,
        Co2Band::Harmful,
        Co2Band::Danger,
    ];

    fn inputs(t: Level, h: Level, out_t: Level, out_h: Level) -> DecisionInputs {
        DecisionInputs {
            temperature_forecast: t,
            humidity_forecast: h,
            temperature_outer: out_t,
            humidity_outer: out_h,
            co2: Co2Band::Optimum,
            co2_forecast: Some(Co2Band::Optimum),
        }
    }

    fn all_inputs() -> impl Iterator<Item = DecisionInputs> {
        LEVELS.into_iter().flat_map(|t| {
            LEVELS.into_iter().flat_map(move |h| {
                LEVELS.into_iter().flat_map(move |ot| {
                    LEVELS.into_iter().flat_map(move |oh| {
                        CO2.into_iter().flat_map(move |c| {
                            [None, Some(Co2Band::Optimum), Some(Co2Band::Danger)]
                                .into_iter()
                                .map(move |cf| DecisionInputs {
                                    co2: c,
                                    co2_forecast: cf,
                                    ..inputs(t, h, ot, oh)
                                })
                        })
                    })
                })
            })
        })
    }

    #[test]
    fn cold_room_with_mild_outdoor_air_is_ventilated() {
        use Level::*;

        let d = decide(&inputs(TooLow, Optimum, Optimum, Optimum));
        assert_eq!(d, Decision::vent());

        let d = decide(&inputs(TooLow, Optimum, TooLow, Optimum));
        assert_eq!(d, Decision::heater());

        let d = decide(&inputs(TooLow, Optimum, Optimum, TooHigh));
        assert_eq!(d, Decision::heater());
    }

    #[test]
    fn primary_table() {
        use Level::*;

        let heat_and_humidify = Decision {
            heater: true,
            humidifier: true,
            ..Decision::default()
        };

        let cases = [
            ((TooLow, TooLow, Optimum, Optimum), Decision::vent()),
            ((TooLow, TooLow, TooLow, Optimum), heat_and_humidify),
            ((TooLow, TooLow, Optimum, TooLow), heat_and_humidify),
            ((TooLow, TooHigh, TooHigh, Optimum), Decision::vent()),
            ((TooLow, TooHigh, Optimum, TooHigh), Decision::heater()),
            ((Optimum, TooLow, Optimum, TooHigh), Decision::vent()),
            ((Optimum, TooLow, TooHigh, Optimum), Decision::humidifier()),
            ((Optimum, TooLow, Optimum, TooLow), Decision::humidifier()),
            ((Optimum, Optimum, TooLow, TooLow), Decision::default()),
            ((Optimum, TooHigh, Optimum, Optimum), Decision::vent()),
            ((Optimum, TooHigh, TooLow, Optimum), Decision::default()),
            ((Optimum, TooHigh, Optimum, TooHigh), Decision::default()),
            ((TooHigh, TooLow, Optimum, TooLow), Decision::vent()),
            ((TooHigh, TooLow, TooHigh, TooLow), Decision::ac()),
            ((TooHigh, Optimum, TooLow, Optimum), Decision::vent()),
            ((TooHigh, Optimum, TooLow, TooLow), Decision::ac()),
            ((TooHigh, TooHigh, TooLow, Optimum), Decision::vent()),
            ((TooHigh, TooHigh, Optimum, TooHigh), Decision::ac()),
        ];

        for ((t, h, ot, oh), expected) in cases {
            assert_eq!(
                decide(&inputs(t, h, ot, oh)),
                expected,
                "temperature {t:?}, humidity {h:?}, outdoor {ot:?}/{oh:?}"
            );
        }
    }

    #[test]
    fn co2_danger_forces_vent() {
        use Level::*;

        let mut i = inputs(TooHigh, TooHigh, TooHigh, TooHigh);
        i.co2 = Co2Band::Danger;
        assert_eq!(
            decide(&i),
            Decision {
                ac: true,
                vent: true,
                ..Decision::default()
            }
        );

        let mut i = inputs(Optimum, Optimum, TooLow, TooLow);
        i.co2_forecast = Some(Co2Band::Danger);
        assert_eq!(decide(&i), Decision::vent());
    }

    #[test]
    fn co2_harmful_vents_only_at_comfortable_temperature() {
        use Level::*;

        let mut i = inputs(Optimum, Optimum, TooLow, TooLow);
        i.co2 = Co2Band::Harmful;
        assert_eq!(decide(&i), Decision::vent());

        let mut i = inputs(TooLow, Optimum, TooLow, Optimum);
        i.co2_forecast = Some(Co2Band::Harmful);
        assert_eq!(decide(&i), Decision::heater());
    }

    #[test]
    fn decisions_are_pure() {
        for i in all_inputs() {
            assert_eq!(decide(&i), decide(&i));
        }
    }

    #[test]
    fn danger_always_vents() {
        for i in all_inputs().filter(|i| i.co2 == Co2Band::Danger) {
            assert!(decide(&i).vent, "{i:?}");
        }
    }

    fn actuators() -> BTreeMap<ActuatorKind, ActuatorProfile> {
        ActuatorKind::ALL
            .into_iter()
            .map(|k| {
                (
                    k,
                    ActuatorProfile::new(k, format!("http://{k}"), format!("{k}-token")),
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn dispatch_only_switches_on_enabled_actuators() {
        let transport = Arc::new(FakeTransport::default());
        let store = Arc::new(MemoryStore::new());
        let gateway = ActuatorGateway::new(transport.clone(), store.clone(), Duration::from_secs(1));

        let mut actuators = actuators();
        actuators.get_mut(&ActuatorKind::Heater).unwrap().autocontrol_enabled = false;
        actuators.get_mut(&ActuatorKind::Ac).unwrap().power_state = true;

        let decision = Decision {
            heater: true,
            vent: true,
            ..Decision::default()
        };
        let answers = dispatch(&decision, &mut actuators, &gateway).await;

        assert_eq!(answers.len(), 1);
        assert_eq!(answers[0].0, ActuatorKind::Vent);
        assert_eq!(
            transport.posts().await,
            [(
                "http://vent".to_owned(),
                "vent-token".to_owned(),
                json!({ "power": true })
            )]
        );
        assert!(actuators[&ActuatorKind::Vent].power_state);
        assert!(!actuators[&ActuatorKind::Heater].power_state);
        // Not wanted, but never switched off either.
        assert!(actuators[&ActuatorKind::Ac].power_state);
        assert_eq!(store.commands().await.len(), 1);
    }

    #[tokio::test]
    async fn failed_command_does_not_stop_the_rest() {
        let transport = Arc::new(FakeTransport::failing_at(&["http://ac"]));
        let store = Arc::new(MemoryStore::new());
        let gateway = ActuatorGateway::new(transport.clone(), store.clone(), Duration::from_secs(1));

        let mut actuators = actuators();
        let decision = Decision {
            ac: true,
            vent: true,
            ..Decision::default()
        };
        let answers = dispatch(&decision, &mut actuators, &gateway).await;

        assert_eq!(answers.len(), 2);
        assert!(!answers[0].1.is_ok());
        assert!(answers[1].1.is_ok());
        assert!(actuators[&ActuatorKind::Ac].power_state);
        assert!(actuators[&ActuatorKind::Vent].power_state);
    }
}
