//! Wire records exchanged with the directory.
//!
//! Requests borrow from the caller; only the registration response is owned.

use crate::{Challenge, PayloadError};
use serde::Serialize;
use serde_json::Value;

/// Body of a heartbeat (`PUT`).
#[derive(Debug, Serialize)]
pub struct HeartbeatRequest<'a> {
    pub challenge: &'a Challenge,
    pub users: &'a [Value],
}

/// Body of an unregister (`DELETE`).
#[derive(Debug, Serialize)]
pub struct UnregisterRequest<'a> {
    pub challenge: &'a Challenge,
}

/// What a successful registration hands back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub challenge: Challenge,
    pub trust_level: i32,
}

impl Registration {
    /// Parse a registration response body.
    ///
    /// The body must be a JSON object with a numeric `verified-level` and a
    /// string `challenge`. Fractional levels are truncated toward zero.
    pub fn from_body(body: &str) -> Result<Self, PayloadError> {
        let root: Value = serde_json::from_str(body)?;
        let object = root.as_object().ok_or(PayloadError::NotAnObject)?;

        let level = object.get("verified-level").ok_or(PayloadError::TrustLevel)?;
        let trust_level = match (level.as_i64(), level.as_f64()) {
            (Some(n), _) => i32::try_from(n).map_err(|_| PayloadError::TrustLevelRange(n as f64))?,
            (None, Some(f)) if f >= i32::MIN as f64 && f <= i32::MAX as f64 => f as i32,
            (None, Some(f)) => return Err(PayloadError::TrustLevelRange(f)),
            (None, None) => return Err(PayloadError::TrustLevel),
        };

        let challenge = object
            .get("challenge")
            .and_then(Value::as_str)
            .ok_or(PayloadError::Challenge)?;

        Ok(Self {
            challenge: Challenge::new(challenge),
            trust_level,
        })
    }
}
