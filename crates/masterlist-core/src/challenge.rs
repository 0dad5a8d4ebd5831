//! Session credential issued by the master server.
//!
//! The directory hands out a `challenge` token on successful registration.
//! Every heartbeat and the final unregister must carry it. The token is
//! opaque: this crate never inspects its contents.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque session token returned by a successful registration.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Challenge(String);

impl Challenge {
    /// Wrap a token received from the directory.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Challenge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Tokens end up in logs through `Debug`; show only a prefix.
        let prefix: String = self.0.chars().take(4).collect();
        write!(f, "Challenge({prefix}…)")
    }
}

impl fmt::Display for Challenge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Challenge {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl From<&str> for Challenge {
    fn from(token: &str) -> Self {
        Self(token.to_string())
    }
}
