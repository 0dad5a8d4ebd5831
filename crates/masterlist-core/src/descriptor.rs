//! Server descriptor sent with a registration.

use serde::{Deserialize, Serialize};

/// What the directory lists about this server.
///
/// Field names follow the directory's wire format (`terrain-name`,
/// `max-clients`, `use-password`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ServerDescriptor {
    /// Externally reachable address (IP or hostname).
    pub ip: String,
    /// Port clients connect to.
    pub port: u16,
    /// Human-readable server name.
    pub name: String,
    /// Map/terrain identifier.
    pub terrain_name: String,
    /// Maximum number of connected users.
    pub max_clients: u32,
    /// Protocol version string clients must match.
    pub version: String,
    /// Whether joining requires a password.
    pub use_password: bool,
}
