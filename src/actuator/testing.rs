use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::sync::Mutex;

use crate::{actuator::ActuatorTransport, error::DeviceCommError};

/// Records every post. Addresses listed in `failing` time out.
#[derive(Default)]
pub struct FakeTransport {
    pub posts: Mutex<Vec<(String, String, Value)>>,
    pub failing: Vec<String>,
}

impl FakeTransport {
    pub fn failing_at(addresses: &[&str]) -> Self {
        Self {
            posts: Mutex::default(),
            failing: addresses.iter().map(|a| a.to_string()).collect(),
        }
    }

    pub async fn posts(&self) -> Vec<(String, String, Value)> {
        self.posts.lock().await.clone()
    }
}

#[async_trait]
impl ActuatorTransport for FakeTransport {
    async fn post(
        &self,
        address: &str,
        token: &str,
        payload: &Value,
    ) -> Result<Value, DeviceCommError> {
        self.posts
            .lock()
            .await
            .push((address.to_owned(), token.to_owned(), payload.clone()));

        if self.failing.iter().any(|a| a == address) {
            return Err(DeviceCommError::Timeout);
        }

        Ok(json!({ "ok": true }))
    }
}
