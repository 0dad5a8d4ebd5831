//! Public address lookup.
//!
//! The directory echoes back the address it sees the request coming from.
//! Servers behind NAT use this to learn what to advertise.

use crate::config::DirectorySection;
use masterlist_core::{CONTENT_TYPE, Call, Error, Method, PayloadError, Request, Transport};

/// Ask the directory for this host's public address.
///
/// The response body is the address as plain text. Any HTTP status is
/// accepted; an empty body is not.
pub fn resolve_public_address<T: Transport>(
    transport: &T,
    directory: &DirectorySection,
) -> Result<String, Error> {
    let path = directory.public_ip_path();
    tracing::info!(%path, "looking up public address");

    let response = transport
        .send(&Request {
            method: Method::Get,
            host: &directory.host,
            path: &path,
            content_type: CONTENT_TYPE,
            body: String::new(),
        })
        .map_err(|e| Error::transport(Call::PublicAddress, e))?;

    let address = response.body.trim();
    if address.is_empty() {
        return Err(Error::payload(Call::PublicAddress, PayloadError::Empty));
    }

    tracing::info!(%address, "public address resolved");
    Ok(address.to_string())
}
