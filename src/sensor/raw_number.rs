use serde::Deserialize;
use serde_json::Value;

/// A numeric field as it arrives over the wire. Browser forms post numbers
/// as strings, sensors post them as JSON numbers. Anything else is kept as
/// is and has no value.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    Number(f64),
    Text(String),
    Other(Value),
}

impl RawNumber {
    pub fn is_empty(&self) -> bool {
        matches!(self, RawNumber::Text(s) if s.trim().is_empty())
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            RawNumber::Number(v) => Some(*v),
            RawNumber::Text(s) => s.trim().parse().ok(),
            RawNumber::Other(_) => None,
        }
    }
}

impl From<f64> for RawNumber {
    fn from(v: f64) -> Self {
        RawNumber::Number(v)
    }
}

impl From<&str> for RawNumber {
    fn from(s: &str) -> Self {
        RawNumber::Text(s.to_owned())
    }
}
