//! Client side of the master server registration protocol.
//!
//! A game server lists itself on a central directory, keeps the listing alive
//! with heartbeats carrying its user list, and withdraws it on shutdown.
//!
//! ```no_run
//! use masterlist_client::{Advertiser, HttpTransport, MasterlistConfig};
//! use std::path::Path;
//!
//! let config = MasterlistConfig::from_file(Path::new("masterlist.toml"))?;
//! let transport = HttpTransport::new(&config.directory)?;
//! let users = || -> Vec<serde_json::Value> { Vec::new() };
//! let advertiser = Advertiser::new(transport, &config, users).spawn()?;
//! advertiser.activate();
//! // ... serve players ...
//! advertiser.shutdown();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod advertiser;
mod client;
mod config;
mod http;
mod public_ip;

#[cfg(test)]
mod testing;

pub use advertiser::{AdvertiseStatus, Advertiser, AdvertiserHandle, Phase, UserListProvider};
pub use client::RegistrationClient;
pub use config::{ConfigError, DirectorySection, MasterlistConfig, ServerSection};
pub use http::HttpTransport;
pub use public_ip::resolve_public_address;

pub use masterlist_core::{
    Call, Challenge, Error, Liveness, PayloadError, Registration, ServerDescriptor, Transport,
    TransportError,
};
