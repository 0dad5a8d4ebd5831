//! Error taxonomy for directory calls.

use crate::TransportError;
use std::fmt;

/// Longest slice of a response body quoted in an error.
pub const MAX_QUOTED_BODY: usize = 256;

/// Which directory call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Register,
    Heartbeat,
    Unregister,
    PublicAddress,
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Call::Register => "register",
            Call::Heartbeat => "heartbeat",
            Call::Unregister => "unregister",
            Call::PublicAddress => "public address lookup",
        })
    }
}

/// Why a 200 response could not be used.
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("response is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("response is not a JSON object")]
    NotAnObject,
    #[error("`verified-level` is missing or not a number")]
    TrustLevel,
    #[error("`verified-level` {0} is out of range")]
    TrustLevelRange(f64),
    #[error("`challenge` is missing or not a string")]
    Challenge,
    #[error("response body is empty")]
    Empty,
}

/// A failed directory call.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No response was received.
    #[error("{call} failed: {source}")]
    Transport {
        call: Call,
        #[source]
        source: TransportError,
    },
    /// The directory answered with something other than 200.
    #[error("{call} failed: HTTP {status}, body: {body}")]
    Status { call: Call, status: u16, body: String },
    /// 200, but the body was unusable.
    #[error("{call} failed: {source}")]
    Payload {
        call: Call,
        #[source]
        source: PayloadError,
    },
    /// The request body could not be encoded.
    #[error("{call} failed: could not encode request: {source}")]
    Encode {
        call: Call,
        #[source]
        source: serde_json::Error,
    },
    /// Called while not registered. This is a caller bug, not a network
    /// failure.
    #[error("{call} requires an active registration")]
    NotRegistered { call: Call },
}

impl Error {
    pub fn transport(call: Call, source: TransportError) -> Self {
        Error::Transport { call, source }
    }

    /// Builds a status error, quoting at most [`MAX_QUOTED_BODY`] bytes.
    pub fn status(call: Call, status: u16, body: &str) -> Self {
        Error::Status {
            call,
            status,
            body: truncate(body, MAX_QUOTED_BODY).to_string(),
        }
    }

    pub fn payload(call: Call, source: impl Into<PayloadError>) -> Self {
        Error::Payload {
            call,
            source: source.into(),
        }
    }

    pub fn call(&self) -> Call {
        match self {
            Error::Transport { call, .. }
            | Error::Status { call, .. }
            | Error::Payload { call, .. }
            | Error::Encode { call, .. }
            | Error::NotRegistered { call } => *call,
        }
    }

    /// True for [`Error::NotRegistered`].
    pub fn is_precondition(&self) -> bool {
        matches!(self, Error::NotRegistered { .. })
    }
}

/// Cut `s` to at most `max` bytes without splitting a character.
pub fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
