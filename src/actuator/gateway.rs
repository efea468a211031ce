use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::{
    actuator::{ActuatorProfile, ActuatorTransport},
    error::DeviceCommError,
    store::TimeSeriesStore,
};

#[derive(Debug, Clone, PartialEq)]
pub enum CommandAnswer {
    Response(Value),
    Failed(DeviceCommError),
}

impl CommandAnswer {
    pub fn is_ok(&self) -> bool {
        matches!(self, CommandAnswer::Response(_))
    }

    /// The answer as recorded in the command log. Failures become
    /// `{"error": ...}`, e.g. `{"error": "timeout"}`.
    pub fn to_json(&self) -> Value {
        match self {
            CommandAnswer::Response(v) => v.clone(),
            CommandAnswer::Failed(e) => json!({ "error": e.to_string() }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandLogEntry {
    pub executor: String,

    pub address: String,

    pub command: Value,

    pub answer: Value,

    pub timestamp: DateTime<Utc>,
}

#[derive(Clone)]
pub struct ActuatorGateway {
    transport: Arc<dyn ActuatorTransport>,
    store: Arc<dyn TimeSeriesStore>,
    store_timeout: Duration,
}

impl ActuatorGateway {
    pub fn new(
        transport: Arc<dyn ActuatorTransport>,
        store: Arc<dyn TimeSeriesStore>,
        store_timeout: Duration,
    ) -> Self {
        Self {
            transport,
            store,
            store_timeout,
        }
    }

    /// Never fails: transport errors come back as `CommandAnswer::Failed`
    /// so one dead device cannot stall the others.
    pub async fn send_command(&self, actuator: &ActuatorProfile, payload: Value) -> CommandAnswer {
        let answer = match self
            .transport
            .post(&actuator.address, &actuator.token, &payload)
            .await
        {
            Ok(v) => CommandAnswer::Response(v),
            Err(e) => CommandAnswer::Failed(e),
        };

        let entry = CommandLogEntry {
            executor: actuator.id.clone(),
            address: actuator.address.clone(),
            command: payload,
            answer: answer.to_json(),
            timestamp: Utc::now(),
        };

        if answer.is_ok() {
            info!(executor = %entry.executor, address = %entry.address, command = %entry.command, answer = %entry.answer, "actuator command sent");
        } else {
            warn!(executor = %entry.executor, address = %entry.address, command = %entry.command, answer = %entry.answer, "actuator command failed");
        }

        match tokio::time::timeout(self.store_timeout, self.store.log_command(&entry)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("failed to record actuator command: {e:#}"),
            Err(_) => warn!("timed out recording actuator command"),
        }

        answer
    }

    /// Records the new power state before the command goes out; the state is
    /// what was asked for, not what the device confirmed.
    pub async fn switch_power(&self, actuator: &mut ActuatorProfile, on: bool) -> CommandAnswer {
        actuator.power_state = on;
        self.send_command(actuator, json!({ "power": on })).await
    }

    pub async fn apply_setting(&self, actuator: &mut ActuatorProfile, setting: Value) -> CommandAnswer {
        actuator.last_setting = Some(setting.clone());
        self.send_command(actuator, json!({ "setting": setting })).await
    }
}
