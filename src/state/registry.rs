//! Session registry - owns every live session.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};

use super::random::CoinFlip;
use super::session::{Session, SessionError};
use crate::config::{ConfigError, GameConfig};

/// Public view of a session for the lobby list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LobbySummary {
    pub id: String,
    pub name: String,
    pub occupant_count: usize,
    pub has_password: bool,
}

impl LobbySummary {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "id": self.id,
            "name": self.name,
            "occupant_count": self.occupant_count,
            "has_password": self.has_password
        })
    }
}

impl From<&Session> for LobbySummary {
    fn from(session: &Session) -> Self {
        Self {
            id: session.id.clone(),
            name: session.name.clone(),
            occupant_count: session.occupant_count(),
            has_password: session.has_password(),
        }
    }
}

/// Registry of sessions, keyed by id, remembering creation order.
#[derive(Debug)]
pub struct SessionRegistry {
    config: GameConfig,

    /// Sessions by ID
    sessions: HashMap<String, Session>,

    /// Session IDs in creation order
    order: Vec<String>,

    /// Next numeric ID to hand out
    next_id: u64,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::with_valid_config(GameConfig::default())
    }
}

impl SessionRegistry {
    /// Registry for sessions built from `config`. Rejects invalid geometry.
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: GameConfig) -> Self {
        Self {
            config,
            sessions: HashMap::new(),
            order: Vec::new(),
            next_id: 1,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Create and store a new session.
    pub fn create(
        &mut self,
        name: &str,
        password: &str,
        creator_id: &str,
        coin: &mut dyn CoinFlip,
    ) -> Result<&Session, SessionError> {
        if name.trim().is_empty() {
            return Err(SessionError::InvalidName);
        }

        let id = self.next_id.to_string();
        self.next_id += 1;

        let session = Session::new(
            id.clone(),
            name.to_string(),
            password.to_string(),
            creator_id.to_string(),
            &self.config,
            coin,
        );
        info!(session_id = %id, name, creator_id, "Session created");

        self.order.push(id.clone());
        Ok(self.sessions.entry(id).or_insert(session))
    }

    /// Get session by ID.
    pub fn get(&self, id: &str) -> Option<&Session> {
        self.sessions.get(id)
    }

    /// Get mutable session by ID.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut Session> {
        self.sessions.get_mut(id)
    }

    /// Like [`get`](Self::get) but with `NotFound` for unknown IDs.
    pub fn find(&self, id: &str) -> Result<&Session, SessionError> {
        self.get(id)
            .ok_or_else(|| SessionError::NotFound(id.to_string()))
    }

    /// Like [`get_mut`](Self::get_mut) but with `NotFound` for unknown IDs.
    pub fn find_mut(&mut self, id: &str) -> Result<&mut Session, SessionError> {
        self.sessions
            .get_mut(id)
            .ok_or_else(|| SessionError::NotFound(id.to_string()))
    }

    /// Summaries of all non-closed sessions in creation order.
    pub fn list_public(&self) -> Vec<LobbySummary> {
        self.order
            .iter()
            .filter_map(|id| self.sessions.get(id))
            .filter(|s| !s.status().is_terminal())
            .map(LobbySummary::from)
            .collect()
    }

    /// Remove a session. Unknown IDs are ignored.
    pub fn evict(&mut self, id: &str) -> Option<Session> {
        let session = self.sessions.remove(id)?;
        self.order.retain(|s| s != id);
        info!(session_id = id, status = session.status().as_str(), "Session evicted");
        Some(session)
    }

    /// IDs of sessions with an occupant whose last-known connection is
    /// `connection_id`.
    pub fn sessions_on_connection(&self, connection_id: &str) -> Vec<String> {
        self.order
            .iter()
            .filter_map(|id| self.sessions.get(id))
            .filter(|s| !s.players_on_connection(connection_id).is_empty())
            .map(|s| s.id.clone())
            .collect()
    }

    /// IDs of sessions with no state change for longer than `max_idle`.
    pub fn idle_sessions(&self, now: DateTime<Utc>, max_idle: Duration) -> Vec<String> {
        let idle: Vec<String> = self
            .order
            .iter()
            .filter_map(|id| self.sessions.get(id))
            .filter(|s| now - s.last_activity > max_idle)
            .map(|s| s.id.clone())
            .collect();
        debug!(count = idle.len(), "Idle sessions found");
        idle
    }

    /// Count sessions.
    pub fn count(&self) -> usize {
        self.sessions.len()
    }

    /// Session IDs in creation order.
    pub fn ids(&self) -> impl Iterator<Item = &String> {
        self.order.iter()
    }
}
