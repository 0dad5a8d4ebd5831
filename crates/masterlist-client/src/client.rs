//! Registration client.
//!
//! Holds the session credential between calls and builds the three
//! server-list requests. It performs no retries: every call is one request
//! and the caller decides what a failure means.

use crate::config::DirectorySection;
use masterlist_core::{
    CONTENT_TYPE, Call, Challenge, Error, HeartbeatRequest, Liveness, Method, Registration,
    Request, Response, ServerDescriptor, Transport, UnregisterRequest,
};
use serde_json::Value;

/// Client for one server listing on a master server.
///
/// A challenge is held exactly while the client is registered.
pub struct RegistrationClient<T> {
    transport: T,
    host: String,
    /// `/{path}/server-list`, fixed at construction.
    path: String,
    session: Option<Registration>,
}

impl<T: Transport> RegistrationClient<T> {
    /// Create an unregistered client for the directory at `directory.host`.
    pub fn new(transport: T, directory: &DirectorySection) -> Self {
        Self {
            transport,
            host: directory.host.clone(),
            path: directory.server_list_path(),
            session: None,
        }
    }

    /// Whether a listing is currently held.
    pub fn liveness(&self) -> Liveness {
        match self.session {
            Some(_) => Liveness::Registered,
            None => Liveness::Inactive,
        }
    }

    /// Shorthand for `liveness() == Liveness::Registered`.
    pub fn is_registered(&self) -> bool {
        self.session.is_some()
    }

    /// Trust level from the current registration, if any.
    pub fn trust_level(&self) -> Option<i32> {
        self.session.as_ref().map(|s| s.trust_level)
    }

    /// Session credential from the current registration, if any.
    pub fn challenge(&self) -> Option<&Challenge> {
        self.session.as_ref().map(|s| &s.challenge)
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Create a listing for `descriptor`.
    ///
    /// On success the returned credential is kept for later heartbeats. On
    /// failure the session is left untouched.
    pub fn register(&mut self, descriptor: &ServerDescriptor) -> Result<Registration, Error> {
        let body = serde_json::to_string(descriptor).map_err(|source| Error::Encode {
            call: Call::Register,
            source,
        })?;

        tracing::info!(path = %self.path, name = %descriptor.name, "registering on server list");
        let response = self.request(Call::Register, Method::Post, body)?;
        let registration =
            Registration::from_body(&response.body).map_err(|e| Error::payload(Call::Register, e))?;

        tracing::info!(trust_level = registration.trust_level, "registered on server list");
        self.session = Some(registration.clone());
        Ok(registration)
    }

    /// Report liveness and the current user list.
    pub fn send_heartbeat(&self, users: &[Value]) -> Result<(), Error> {
        let challenge = self.require_session(Call::Heartbeat)?;
        let body = serde_json::to_string(&HeartbeatRequest { challenge, users }).map_err(
            |source| Error::Encode {
                call: Call::Heartbeat,
                source,
            },
        )?;
        tracing::debug!(users = users.len(), body = %body, "heartbeat");

        self.request(Call::Heartbeat, Method::Put, body)?;
        Ok(())
    }

    /// Withdraw the listing.
    ///
    /// The credential is dropped whatever the directory answers, so the
    /// client is inactive afterwards even when this returns an error.
    pub fn unregister(&mut self) -> Result<(), Error> {
        let Some(session) = self.session.take() else {
            tracing::error!(call = %Call::Unregister, "called without an active registration");
            return Err(Error::NotRegistered {
                call: Call::Unregister,
            });
        };

        let body = serde_json::to_string(&UnregisterRequest {
            challenge: &session.challenge,
        })
        .map_err(|source| Error::Encode {
            call: Call::Unregister,
            source,
        })?;
        tracing::debug!(body = %body, "unregister");

        self.request(Call::Unregister, Method::Delete, body)?;
        tracing::info!("unregistered from server list");
        Ok(())
    }

    fn require_session(&self, call: Call) -> Result<&Challenge, Error> {
        match self.challenge() {
            Some(challenge) => Ok(challenge),
            None => {
                tracing::error!(%call, "called without an active registration");
                Err(Error::NotRegistered { call })
            }
        }
    }

    fn request(&self, call: Call, method: Method, body: String) -> Result<Response, Error> {
        let response = self
            .transport
            .send(&Request {
                method,
                host: &self.host,
                path: &self.path,
                content_type: CONTENT_TYPE,
                body,
            })
            .map_err(|e| Error::transport(call, e))?;

        if !response.is_ok() {
            return Err(Error::status(call, response.status, &response.body));
        }
        Ok(response)
    }
}
