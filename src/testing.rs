//! Deterministic doubles for the injected capabilities.
//!
//! Lets unit and integration tests drive a [`SessionCoordinator`] without a
//! transport or randomness.
//!
//! # Example
//!
//! ```
//! use gomoku_state::testing::{FixedCoin, RecordingNotifier, SequentialIds};
//! use gomoku_state::{GameConfig, SessionCoordinator, Slot};
//!
//! let mut coordinator = SessionCoordinator::new(
//!     GameConfig::default(),
//!     RecordingNotifier::default(),
//!     FixedCoin::for_slot(Slot::Cross),
//!     SequentialIds::new("player"),
//! )
//! .unwrap();
//! coordinator.connect("c1");
//! coordinator.create_session("c1", "Friday game", "", "u1");
//! assert_eq!(coordinator.notifier().sent_to("c1")[0].name(), "session-created");
//! ```
//!
//! [`SessionCoordinator`]: crate::SessionCoordinator

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::state::board::Slot;
use crate::state::notify::{Event, Notifier};
use crate::state::random::{CoinFlip, IdGenerator};

/// Coin that always lands the same way.
#[derive(Debug, Clone, Copy)]
pub struct FixedCoin(pub bool);

impl FixedCoin {
    /// Coin whose flip picks `slot` (`true` is Cross).
    pub fn for_slot(slot: Slot) -> Self {
        Self(slot == Slot::Cross)
    }
}

impl CoinFlip for FixedCoin {
    fn flip(&mut self) -> bool {
        self.0
    }
}

/// Coin that replays a script, then repeats its last value.
#[derive(Debug, Clone)]
pub struct SequenceCoin {
    script: VecDeque<bool>,
    last: bool,
}

impl SequenceCoin {
    pub fn new(script: impl IntoIterator<Item = bool>) -> Self {
        Self {
            script: script.into_iter().collect(),
            last: true,
        }
    }
}

impl CoinFlip for SequenceCoin {
    fn flip(&mut self) -> bool {
        if let Some(next) = self.script.pop_front() {
            self.last = next;
        }
        self.last
    }
}

/// IDs of the form `{prefix}-{n}` starting at 1.
#[derive(Debug, Clone)]
pub struct SequentialIds {
    prefix: String,
    next: u64,
}

impl SequentialIds {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            next: 1,
        }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> String {
        let id = format!("{}-{}", self.prefix, self.next);
        self.next += 1;
        id
    }
}

/// One recorded delivery.
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    Direct {
        connection_id: String,
        event: Event,
    },
    Room {
        session_id: String,
        /// Room members at the time of the broadcast
        members: Vec<String>,
        event: Event,
    },
}

impl Delivery {
    pub fn event(&self) -> &Event {
        match self {
            Self::Direct { event, .. } | Self::Room { event, .. } => event,
        }
    }

    /// Check if `connection_id` received this delivery.
    pub fn reached(&self, connection_id: &str) -> bool {
        match self {
            Self::Direct {
                connection_id: to, ..
            } => to == connection_id,
            Self::Room { members, .. } => members.iter().any(|m| m == connection_id),
        }
    }
}

/// Notifier that records every delivery and tracks room membership.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    deliveries: Vec<Delivery>,
    rooms: BTreeMap<String, BTreeSet<String>>,
}

impl RecordingNotifier {
    pub fn deliveries(&self) -> &[Delivery] {
        &self.deliveries
    }

    /// Events sent directly to a connection.
    pub fn sent_to(&self, connection_id: &str) -> Vec<&Event> {
        self.deliveries
            .iter()
            .filter(|d| matches!(d, Delivery::Direct { connection_id: to, .. } if to == connection_id))
            .map(Delivery::event)
            .collect()
    }

    /// Events broadcast to a session room.
    pub fn broadcasts(&self, session_id: &str) -> Vec<&Event> {
        self.deliveries
            .iter()
            .filter(|d| matches!(d, Delivery::Room { session_id: room, .. } if room == session_id))
            .map(Delivery::event)
            .collect()
    }

    /// Events a connection received, directly or through a room.
    pub fn received_by(&self, connection_id: &str) -> Vec<&Event> {
        self.deliveries
            .iter()
            .filter(|d| d.reached(connection_id))
            .map(Delivery::event)
            .collect()
    }

    /// Names of events a connection received, in order.
    pub fn names_received_by(&self, connection_id: &str) -> Vec<&'static str> {
        self.received_by(connection_id)
            .into_iter()
            .map(Event::name)
            .collect()
    }

    /// Current members of a room.
    pub fn room_members(&self, session_id: &str) -> Vec<String> {
        self.rooms
            .get(session_id)
            .map(|m| m.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn clear(&mut self) {
        self.deliveries.clear();
    }
}

impl Notifier for RecordingNotifier {
    fn send_to(&mut self, connection_id: &str, event: &Event) {
        self.deliveries.push(Delivery::Direct {
            connection_id: connection_id.to_string(),
            event: event.clone(),
        });
    }

    fn broadcast(&mut self, session_id: &str, event: &Event) {
        self.deliveries.push(Delivery::Room {
            session_id: session_id.to_string(),
            members: self.room_members(session_id),
            event: event.clone(),
        });
    }

    fn join_room(&mut self, connection_id: &str, session_id: &str) {
        self.rooms
            .entry(session_id.to_string())
            .or_default()
            .insert(connection_id.to_string());
    }

    fn leave_room(&mut self, connection_id: &str, session_id: &str) {
        if let Some(members) = self.rooms.get_mut(session_id) {
            members.remove(connection_id);
            if members.is_empty() {
                self.rooms.remove(session_id);
            }
        }
    }
}
