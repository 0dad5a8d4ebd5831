//! Scripted transport for tests.

use masterlist_core::{Method, Request, Response, Transport, TransportError};
use std::collections::VecDeque;
use std::sync::Mutex;

/// A request as it was sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sent {
    pub method: Method,
    pub host: String,
    pub path: String,
    pub content_type: String,
    pub body: String,
}

impl Sent {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

/// Replays queued outcomes in order and records every request.
///
/// Once the queue is empty every request fails with a connect error.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Result<Response, TransportError>>>,
    sent: Mutex<Vec<Sent>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(&self, status: u16, body: &str) -> &Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(Ok(Response::new(status, body)));
        self
    }

    pub fn fail(&self, error: TransportError) -> &Self {
        self.replies.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn last(&self) -> Sent {
        self.sent().pop().expect("no request sent")
    }

    pub fn methods(&self) -> Vec<Method> {
        self.sent().iter().map(|s| s.method).collect()
    }
}

impl Transport for ScriptedTransport {
    fn send(&self, request: &Request<'_>) -> Result<Response, TransportError> {
        self.sent.lock().unwrap().push(Sent {
            method: request.method,
            host: request.host.to_string(),
            path: request.path.to_string(),
            content_type: request.content_type.to_string(),
            body: request.body.clone(),
        });
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Connect("script exhausted".into())))
    }
}

pub const REGISTERED: &str = r#"{"verified-level": 3, "challenge": "abc123"}"#;
