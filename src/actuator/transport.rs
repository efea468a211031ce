use std::time::Duration;

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use serde_json::Value;

use crate::error::DeviceCommError;

pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_millis(1500);

#[async_trait]
pub trait ActuatorTransport: Send + Sync {
    async fn post(
        &self,
        address: &str,
        token: &str,
        payload: &Value,
    ) -> Result<Value, DeviceCommError>;
}

/// Posts `payload` as JSON with an `Auth` header. The whole exchange, body
/// included, is bounded by `timeout`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build actuator HTTP client")?;

        Ok(Self { client, timeout })
    }

    async fn exchange(
        &self,
        address: &str,
        token: &str,
        payload: &Value,
    ) -> Result<Value, DeviceCommError> {
        let response = self
            .client
            .post(address)
            .header("Auth", token)
            .json(payload)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeviceCommError::Status(status.as_u16()));
        }

        let body = response.text().await.map_err(map_reqwest_error)?;
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        Ok(serde_json::from_str(&body).unwrap_or(Value::String(body)))
    }
}

#[async_trait]
impl ActuatorTransport for HttpTransport {
    async fn post(
        &self,
        address: &str,
        token: &str,
        payload: &Value,
    ) -> Result<Value, DeviceCommError> {
        match tokio::time::timeout(self.timeout, self.exchange(address, token, payload)).await {
            Ok(result) => result,
            Err(_) => Err(DeviceCommError::Timeout),
        }
    }
}

fn map_reqwest_error(err: reqwest::Error) -> DeviceCommError {
    if err.is_timeout() {
        DeviceCommError::Timeout
    } else {
        DeviceCommError::Transport(err.to_string())
    }
}
