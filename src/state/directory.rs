//! Client directory.
//!
//! Tracks each connected client's coarse UI status. Only used to decide who
//! receives lobby-list broadcasts, so a stale entry costs a wasted or missed
//! notification and never game state.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Where a client is in the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientStatus {
    /// Main menu
    #[default]
    InMenu,
    /// Looking at the lobby list
    BrowsingLobbies,
    /// Seated in a lobby, game not running
    InLobby,
    /// Playing
    InGame,
}

impl ClientStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InMenu => "in_menu",
            Self::BrowsingLobbies => "browsing_lobbies",
            Self::InLobby => "in_lobby",
            Self::InGame => "in_game",
        }
    }
}

impl fmt::Display for ClientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A connected client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientEntry {
    pub connection_id: String,
    pub status: ClientStatus,
    pub connected_at: DateTime<Utc>,
}

impl ClientEntry {
    pub fn new(connection_id: String) -> Self {
        Self {
            connection_id,
            status: ClientStatus::InMenu,
            connected_at: Utc::now(),
        }
    }
}

/// Directory of connected clients, keyed by connection ID.
#[derive(Debug, Default)]
pub struct ClientDirectory {
    clients: BTreeMap<String, ClientEntry>,
}

impl ClientDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a new connection. Re-registering resets the entry.
    pub fn register(&mut self, connection_id: &str) {
        self.clients.insert(
            connection_id.to_string(),
            ClientEntry::new(connection_id.to_string()),
        );
    }

    /// Stop tracking a connection.
    pub fn unregister(&mut self, connection_id: &str) -> Option<ClientEntry> {
        self.clients.remove(connection_id)
    }

    pub fn get(&self, connection_id: &str) -> Option<&ClientEntry> {
        self.clients.get(connection_id)
    }

    pub fn status(&self, connection_id: &str) -> Option<ClientStatus> {
        self.clients.get(connection_id).map(|c| c.status)
    }

    /// Update a client's status. Returns false for unknown connections.
    pub fn set_status(&mut self, connection_id: &str, status: ClientStatus) -> bool {
        match self.clients.get_mut(connection_id) {
            Some(entry) => {
                entry.status = status;
                true
            }
            None => {
                debug!(connection_id, %status, "Status update for unknown client");
                false
            }
        }
    }

    /// Connection IDs with the given status, ordered by ID.
    pub fn list_by_status(&self, status: ClientStatus) -> Vec<String> {
        self.clients
            .values()
            .filter(|c| c.status == status)
            .map(|c| c.connection_id.clone())
            .collect()
    }

    /// Count tracked clients.
    pub fn count(&self) -> usize {
        self.clients.len()
    }
}
