//! Core types for the master server registration protocol.
//!
//! This crate holds the protocol primitives: the server descriptor, the
//! session credential, wire records and the error taxonomy. It also defines
//! the [`Transport`] seam so the protocol logic can run against any HTTP
//! stack (or a scripted one in tests).

mod challenge;
mod descriptor;
mod error;
mod message;
mod transport;

pub use challenge::Challenge;
pub use descriptor::ServerDescriptor;
pub use error::{Call, Error, MAX_QUOTED_BODY, PayloadError, truncate};
pub use message::{HeartbeatRequest, Registration, UnregisterRequest};
pub use transport::{Method, Request, Response, Transport, TransportError};

/// Content type of every directory request.
pub const CONTENT_TYPE: &str = "application/json";

/// Registration state as seen by the protocol client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Liveness {
    /// No credential held.
    #[default]
    Inactive,
    /// Holding a credential from a successful registration.
    Registered,
}
