//! Outbound notifications.
//!
//! The state layer never talks to a transport. It describes what happened as
//! an [`Event`] and hands it to an injected [`Notifier`], which owns delivery
//! to single connections and to session rooms.

use super::board::{Board, Position, Slot};
use super::registry::LobbySummary;
use super::session::SessionError;
use super::win::GameResult;

/// A notification for one client or a whole session room.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    SessionCreated {
        id: String,
    },
    SessionNotCreated {
        reason: SessionError,
    },
    JoinSucceeded {
        id: String,
        cross_player_id: Option<String>,
        nought_player_id: Option<String>,
        turn: Slot,
    },
    JoinFailed {
        reason: SessionError,
    },
    LobbyPaused {
        session_id: String,
    },
    LobbyResumed {
        session_id: String,
    },
    /// The session was closed without a result
    LobbyClosed {
        session_id: String,
    },
    LobbyListUpdated {
        lobbies: Vec<LobbySummary>,
    },
    GameStarted {
        /// Player ID of whoever moves first
        turn: String,
        board: Board,
    },
    MoveAccepted {
        position: Position,
        symbol: Slot,
    },
    MoveRejected {
        reason: SessionError,
    },
    WhoseTurnNext {
        player_id: String,
    },
    GameEnded {
        result: GameResult,
        winner_id: Option<String>,
    },
}

impl Event {
    /// Wire name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SessionCreated { .. } => "session-created",
            Self::SessionNotCreated { .. } => "session-not-created",
            Self::JoinSucceeded { .. } => "join-succeeded",
            Self::JoinFailed { .. } => "join-failed",
            Self::LobbyPaused { .. } => "lobby-paused",
            Self::LobbyResumed { .. } => "lobby-resumed",
            Self::LobbyClosed { .. } => "lobby-closed",
            Self::LobbyListUpdated { .. } => "lobby-list-updated",
            Self::GameStarted { .. } => "game-started",
            Self::MoveAccepted { .. } => "move-accepted",
            Self::MoveRejected { .. } => "move-rejected",
            Self::WhoseTurnNext { .. } => "whose-turn-next",
            Self::GameEnded { .. } => "game-ended",
        }
    }

    /// Event payload as JSON.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::SessionCreated { id } => serde_json::json!({"id": id}),
            Self::SessionNotCreated { reason }
            | Self::JoinFailed { reason }
            | Self::MoveRejected { reason } => serde_json::json!({
                "code": reason.code(),
                "message": reason.to_string()
            }),
            Self::JoinSucceeded {
                id,
                cross_player_id,
                nought_player_id,
                turn,
            } => serde_json::json!({
                "id": id,
                "cross_player_id": cross_player_id,
                "nought_player_id": nought_player_id,
                "turn": turn.as_str()
            }),
            Self::LobbyPaused { session_id }
            | Self::LobbyResumed { session_id }
            | Self::LobbyClosed { session_id } => {
                serde_json::json!({"session_id": session_id})
            }
            Self::LobbyListUpdated { lobbies } => {
                let lobbies: Vec<serde_json::Value> =
                    lobbies.iter().map(|l| l.to_json()).collect();
                serde_json::Value::Array(lobbies)
            }
            Self::GameStarted { turn, board } => serde_json::json!({
                "turn": turn,
                "board": board.to_json()
            }),
            Self::MoveAccepted { position, symbol } => serde_json::json!({
                "x": position.x,
                "y": position.y,
                "symbol": symbol.as_str()
            }),
            Self::WhoseTurnNext { player_id } => serde_json::json!({"player_id": player_id}),
            Self::GameEnded { result, winner_id } => {
                let mut obj = serde_json::json!({"result": result.as_str()});
                if let Some(winner_id) = winner_id {
                    obj["winner_id"] = serde_json::json!(winner_id);
                }
                obj
            }
        }
    }
}

/// Delivery capability supplied by the transport layer.
///
/// Sends are fire-and-forget: a failed delivery is the transport's concern
/// and never rolls back session state.
pub trait Notifier {
    /// Deliver to a single connection.
    fn send_to(&mut self, connection_id: &str, event: &Event);

    /// Deliver to every connection in a session's room.
    fn broadcast(&mut self, session_id: &str, event: &Event);

    /// Add a connection to a session's room.
    fn join_room(&mut self, connection_id: &str, session_id: &str);

    /// Remove a connection from a session's room.
    fn leave_room(&mut self, connection_id: &str, session_id: &str);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_event_names() {
        assert_eq!(Event::SessionCreated { id: "1".into() }.name(), "session-created");
        assert_eq!(
            Event::WhoseTurnNext {
                player_id: "p".into()
            }
            .name(),
            "whose-turn-next"
        );

        let closed = Event::LobbyClosed {
            session_id: "3".into(),
        };
        assert_eq!(closed.name(), "lobby-closed");
        assert_eq!(closed.to_json(), serde_json::json!({"session_id": "3"}));
    }

    #[test]
    fn test_failure_payload() {
        let event = Event::MoveRejected {
            reason: SessionError::NotYourTurn,
        };
        assert_eq!(
            event.to_json(),
            serde_json::json!({"code": "not_your_turn", "message": "it's not your turn"})
        );
    }

    #[test]
    fn test_game_ended_payload() {
        let win = Event::GameEnded {
            result: GameResult::Win,
            winner_id: Some("p1".into()),
        };
        assert_eq!(
            win.to_json(),
            serde_json::json!({"result": "win", "winner_id": "p1"})
        );

        let draw = Event::GameEnded {
            result: GameResult::Draw,
            winner_id: None,
        };
        assert_eq!(draw.to_json(), serde_json::json!({"result": "draw"}));
    }

    #[test]
    fn test_move_accepted_payload() {
        let event = Event::MoveAccepted {
            position: Position::new(3, 9),
            symbol: Slot::Nought,
        };
        assert_eq!(
            event.to_json(),
            serde_json::json!({"x": 3, "y": 9, "symbol": "nought"})
        );
    }

    #[test]
    fn test_join_succeeded_payload() {
        let event = Event::JoinSucceeded {
            id: "4".into(),
            cross_player_id: Some("p1".into()),
            nought_player_id: None,
            turn: Slot::Cross,
        };
        assert_eq!(
            event.to_json(),
            serde_json::json!({
                "id": "4",
                "cross_player_id": "p1",
                "nought_player_id": null,
                "turn": "cross"
            })
        );
    }
}
