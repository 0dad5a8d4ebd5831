//! Advertisement configuration.
//!
//! Loaded from TOML with two tables, `[server]` for what gets listed and
//! `[directory]` for where and how often.

use masterlist_core::ServerDescriptor;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MasterlistConfig {
    pub server: ServerSection,
    pub directory: DirectorySection,
}

/// The listed server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSection {
    /// Public address. Looked up through the directory when absent.
    #[serde(default)]
    pub ip: Option<String>,

    /// Port clients connect to
    #[serde(default = "default_port")]
    pub port: u16,

    pub name: String,

    /// Terrain/map identifier
    #[serde(default = "default_terrain")]
    pub terrain: String,

    #[serde(default = "default_max_clients")]
    pub max_clients: u32,

    /// Protocol version string
    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default)]
    pub use_password: bool,
}

/// The master server and advertisement timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectorySection {
    /// Host name, optionally with `:port`
    pub host: String,

    /// Base path under which `server-list` and `get-public-ip` live
    #[serde(default = "default_path")]
    pub path: String,

    /// Use https instead of http
    #[serde(default)]
    pub tls: bool,

    /// Seconds between heartbeats
    #[serde(default = "default_heartbeat_interval")]
    pub heartbeat_interval_secs: u64,

    /// Consecutive failed heartbeats before the listing is dropped
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,

    /// Seconds to wait before retrying a failed registration
    #[serde(default = "default_retry_delay")]
    pub retry_delay_secs: u64,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_port() -> u16 {
    12000
}

fn default_terrain() -> String {
    "any".to_string()
}

fn default_max_clients() -> u32 {
    16
}

fn default_version() -> String {
    "RoRnet_2.44".to_string()
}

fn default_path() -> String {
    "api".to_string()
}

fn default_heartbeat_interval() -> u64 {
    60
}

fn default_failure_threshold() -> u32 {
    5
}

fn default_retry_delay() -> u64 {
    30
}

fn default_request_timeout() -> u64 {
    10
}

impl DirectorySection {
    /// A directory section with default timing.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            path: default_path(),
            tls: false,
            heartbeat_interval_secs: default_heartbeat_interval(),
            failure_threshold: default_failure_threshold(),
            retry_delay_secs: default_retry_delay(),
            request_timeout_secs: default_request_timeout(),
        }
    }

    /// `/{path}/server-list`
    pub fn server_list_path(&self) -> String {
        format!("/{}/server-list", self.path.trim_matches('/'))
    }

    /// `/{path}/get-public-ip`
    pub fn public_ip_path(&self) -> String {
        format!("/{}/get-public-ip", self.path.trim_matches('/'))
    }

    /// URL scheme selected by `tls`.
    pub fn scheme(&self) -> &'static str {
        if self.tls { "https" } else { "http" }
    }

    /// `http://host` or `https://host`
    pub fn base_url(&self) -> String {
        format!("{}://{}", self.scheme(), self.host)
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl ServerSection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            ip: None,
            port: default_port(),
            name: name.into(),
            terrain: default_terrain(),
            max_clients: default_max_clients(),
            version: default_version(),
            use_password: false,
        }
    }

    /// Descriptor advertised at `ip`.
    pub fn descriptor(&self, ip: impl Into<String>) -> ServerDescriptor {
        ServerDescriptor {
            ip: ip.into(),
            port: self.port,
            name: self.name.clone(),
            terrain_name: self.terrain.clone(),
            max_clients: self.max_clients,
            version: self.version.clone(),
            use_password: self.use_password,
        }
    }
}

impl MasterlistConfig {
    pub fn new(server: ServerSection, directory: DirectorySection) -> Self {
        Self { server, directory }
    }

    /// Load and validate a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let d = &self.directory;
        let s = &self.server;
        if d.host.trim().is_empty() {
            return Err(ConfigError::Invalid("directory.host cannot be empty".into()));
        }
        if d.heartbeat_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "directory.heartbeat_interval_secs cannot be 0".into(),
            ));
        }
        if d.failure_threshold == 0 {
            return Err(ConfigError::Invalid(
                "directory.failure_threshold cannot be 0".into(),
            ));
        }
        if d.retry_delay_secs == 0 {
            return Err(ConfigError::Invalid(
                "directory.retry_delay_secs cannot be 0".into(),
            ));
        }
        if d.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "directory.request_timeout_secs cannot be 0".into(),
            ));
        }
        if s.name.trim().is_empty() {
            return Err(ConfigError::Invalid("server.name cannot be empty".into()));
        }
        if s.port == 0 {
            return Err(ConfigError::Invalid("server.port cannot be 0".into()));
        }
        if s.max_clients == 0 {
            return Err(ConfigError::Invalid("server.max_clients cannot be 0".into()));
        }
        if s.ip.as_deref().is_some_and(|ip| ip.trim().is_empty()) {
            return Err(ConfigError::Invalid(
                "server.ip cannot be empty; omit it to look it up".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}
