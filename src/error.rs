use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("insufficient data: need at least two samples with distinct timestamps")]
pub struct InsufficientData;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceCommError {
    #[error("timeout")]
    Timeout,

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("unexpected status {0}")]
    Status(u16),
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("rejected setting {field}: {value}")]
pub struct ConfigRejected {
    pub field: &'static str,

    pub value: String,
}
