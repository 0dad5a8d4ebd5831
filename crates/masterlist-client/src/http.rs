//! Blocking HTTP transport backed by reqwest.

use crate::config::DirectorySection;
use masterlist_core::{Method, Request, Response, Transport, TransportError};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;

/// Sends directory requests over HTTP(S) with a fixed per-request timeout.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    scheme: &'static str,
}

impl HttpTransport {
    pub fn new(directory: &DirectorySection) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(directory.request_timeout())
            .connect_timeout(directory.request_timeout())
            .user_agent(concat!("masterlist/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;
        Ok(Self {
            client,
            scheme: directory.scheme(),
        })
    }

    fn url(&self, request: &Request<'_>) -> String {
        format!("{}://{}{}", self.scheme, request.host, request.path)
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &Request<'_>) -> Result<Response, TransportError> {
        let url = self.url(request);
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };

        tracing::trace!(%url, method = %request.method, "directory request");

        let response = self
            .client
            .request(method, &url)
            .header(CONTENT_TYPE, request.content_type)
            .body(request.body.clone())
            .send()
            .map_err(map_error)?;

        let status = response.status().as_u16();
        let body = response.text().map_err(map_error)?;
        Ok(Response { status, body })
    }
}

fn map_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else if e.is_connect() {
        TransportError::Connect(e.to_string())
    } else {
        TransportError::Other(e.to_string())
    }
}
