//! Connected users.

use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::time::{SystemTime, UNIX_EPOCH};

/// A connected user.
#[derive(Debug, Clone)]
pub struct User {
    pub id: u32,
    pub name: String,
    pub addr: SocketAddr,
    pub joined_at: u64,
}

/// Users currently connected to the relay, ordered by join.
pub struct Lobby {
    capacity: u32,
    next_id: u32,
    users: BTreeMap<u32, User>,
}

impl Lobby {
    pub fn new(capacity: u32) -> Self {
        Self {
            capacity,
            next_id: 1,
            users: BTreeMap::new(),
        }
    }

    pub fn is_full(&self) -> bool {
        self.users.len() >= self.capacity as usize
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Add a user, returning its id, or `None` when the lobby is full.
    pub fn join(&mut self, name: String, addr: SocketAddr) -> Option<u32> {
        if self.is_full() {
            return None;
        }
        let id = self.next_id;
        self.next_id += 1;
        let joined_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        self.users.insert(
            id,
            User {
                id,
                name,
                addr,
                joined_at,
            },
        );
        Some(id)
    }

    pub fn leave(&mut self, id: u32) -> Option<User> {
        self.users.remove(&id)
    }

    /// User list in the shape the directory expects in heartbeats.
    pub fn snapshot(&self) -> Vec<Value> {
        self.users
            .values()
            .map(|u| {
                json!({
                    "unique_id": u.id,
                    "username": u.name,
                    "ip": u.addr.ip().to_string(),
                    "joined": u.joined_at,
                })
            })
            .collect()
    }
}
