//! Session (lobby) state machine.
//!
//! A session owns one board and two seats, `Cross` and `Nought`.
//!
//! # State Diagram
//!
//! ```text
//! ┌──────┐  2nd occupant   ┌───────────────┐  both ready  ┌────────────┐
//! │ Open │────────────────▶│ AwaitingReady │─────────────▶│ InProgress │
//! └──────┘◀────────────────└───────────────┘              └─────┬──────┘
//!              occupant leaves                     leave ▲      │ win / draw
//!                                                        │      │
//!                                          rejoin  ┌─────┴──┐   ▼
//!                                      ┌──────────▶│ Paused │ ┌────────┐
//!                                      └───────────┴────────┘ │ Closed │
//!                                                             └────────┘
//! ```
//!
//! A started game never goes back to `Open` or `AwaitingReady`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use super::board::{Board, IllegalPlacement, Position, Slot};
use super::random::CoinFlip;
use super::win::{GameResult, WinDetector};
use crate::config::GameConfig;

/// Session lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Zero or one occupant
    #[default]
    Open,
    /// Both seats taken, waiting for both players to be ready
    AwaitingReady,
    /// Game running
    InProgress,
    /// Game started but an occupant left; resumes when they rejoin
    Paused,
    /// Game finished; awaiting eviction
    Closed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::AwaitingReady => "awaiting_ready",
            Self::InProgress => "in_progress",
            Self::Paused => "paused",
            Self::Closed => "closed",
        }
    }

    /// Check if the game has started (running or paused).
    pub fn is_started(&self) -> bool {
        matches!(self, Self::InProgress | Self::Paused)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

/// Session errors. Every variant is recoverable at the intent boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("session {0} not found")]
    NotFound(String),

    #[error("wrong password")]
    WrongPassword,

    #[error("lobby is full")]
    LobbyFull,

    #[error("a game is already in progress")]
    GameInProgress,

    #[error("game is not active")]
    GameNotActive,

    #[error("it's not your turn")]
    NotYourTurn,

    #[error("position ({x}, {y}) is outside the board")]
    OutOfBounds { x: i32, y: i32 },

    #[error("cell ({x}, {y}) is already occupied")]
    CellOccupied { x: i32, y: i32 },

    #[error("session name must not be empty")]
    InvalidName,
}

impl SessionError {
    /// Stable machine-readable code carried in failure notifications.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::WrongPassword => "wrong_password",
            Self::LobbyFull => "lobby_full",
            Self::GameInProgress => "game_in_progress",
            Self::GameNotActive => "game_not_active",
            Self::NotYourTurn => "not_your_turn",
            Self::OutOfBounds { .. } => "out_of_bounds",
            Self::CellOccupied { .. } => "cell_occupied",
            Self::InvalidName => "invalid_name",
        }
    }
}

impl From<IllegalPlacement> for SessionError {
    fn from(err: IllegalPlacement) -> Self {
        match err {
            IllegalPlacement::OutOfBounds { x, y } => Self::OutOfBounds { x, y },
            IllegalPlacement::CellOccupied { x, y } => Self::CellOccupied { x, y },
        }
    }
}

/// The player currently holding a seat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotOccupant {
    pub player_id: String,
    pub display_name: String,
    /// Transport connection the player last joined from
    pub connection_id: String,
    pub ready: bool,
}

/// A record of a player taking a seat. Append-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub player_id: String,
    pub connection_id: String,
    pub slot: Slot,
    pub joined_at: DateTime<Utc>,
}

/// Result of a successful seat assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinOutcome {
    pub slot: Slot,
    /// The player had held this seat before
    pub reconnected: bool,
    /// The join moved a paused game back to `InProgress`
    pub resumed: bool,
}

/// Result of vacating a seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaveOutcome {
    pub slot: Slot,
    /// Occupants left after the departure
    pub remaining: usize,
}

/// Result of a readiness change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadyOutcome {
    /// The player holds no seat; nothing changed
    Ignored,
    /// Flag recorded, game not started
    Updated,
    /// Both players ready; the game is now running
    Started { first_player_id: String },
}

/// Result of an accepted move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    pub position: Position,
    pub slot: Slot,
    pub result: GameResult,
    /// Set on `Win`
    pub winner_id: Option<String>,
    /// Set on `InProgress`
    pub next_player_id: Option<String>,
}

/// Session state.
#[derive(Debug, Clone)]
pub struct Session {
    /// Unique session ID
    pub id: String,

    /// Display name shown in the lobby list
    pub name: String,

    /// Empty string means no password
    password: String,

    /// Player ID of whoever created the session
    pub creator_id: String,

    status: SessionStatus,

    /// Which seat owns the next move
    turn: Slot,

    cross: Option<SlotOccupant>,
    nought: Option<SlotOccupant>,

    history: Vec<HistoryEntry>,

    board: Board,
    detector: WinDetector,

    /// When session was created
    pub created_at: DateTime<Utc>,

    /// Last successful state change
    pub last_activity: DateTime<Utc>,
}

impl Session {
    /// Create a new open session. The first turn is drawn from `coin`.
    pub fn new(
        id: String,
        name: String,
        password: String,
        creator_id: String,
        config: &GameConfig,
        coin: &mut dyn CoinFlip,
    ) -> Self {
        let turn = if coin.flip() { Slot::Cross } else { Slot::Nought };
        let now = Utc::now();
        Self {
            id,
            name,
            password,
            creator_id,
            status: SessionStatus::Open,
            turn,
            cross: None,
            nought: None,
            history: Vec::new(),
            board: Board::new(config.board_size),
            detector: WinDetector::new(config.win_length),
            created_at: now,
            last_activity: now,
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn turn(&self) -> Slot {
        self.turn
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn has_password(&self) -> bool {
        !self.password.is_empty()
    }

    /// Get the occupant of a seat.
    pub fn occupant(&self, slot: Slot) -> Option<&SlotOccupant> {
        match slot {
            Slot::Cross => self.cross.as_ref(),
            Slot::Nought => self.nought.as_ref(),
        }
    }

    fn seat_mut(&mut self, slot: Slot) -> &mut Option<SlotOccupant> {
        match slot {
            Slot::Cross => &mut self.cross,
            Slot::Nought => &mut self.nought,
        }
    }

    /// Player ID in a seat, if any.
    pub fn player_id(&self, slot: Slot) -> Option<&str> {
        self.occupant(slot).map(|o| o.player_id.as_str())
    }

    /// Player ID whose turn it is.
    pub fn turn_player_id(&self) -> Option<&str> {
        self.player_id(self.turn)
    }

    /// Find the seat a player occupies.
    pub fn slot_of(&self, player_id: &str) -> Option<Slot> {
        Slot::ALL
            .into_iter()
            .find(|&slot| self.player_id(slot) == Some(player_id))
    }

    /// Seat the player most recently held, according to history.
    pub fn historic_slot(&self, player_id: &str) -> Option<Slot> {
        self.history
            .iter()
            .rev()
            .find(|e| e.player_id == player_id)
            .map(|e| e.slot)
    }

    /// Count occupied seats.
    pub fn occupant_count(&self) -> usize {
        Slot::ALL
            .into_iter()
            .filter(|&slot| self.occupant(slot).is_some())
            .count()
    }

    /// Check if every seat is vacant.
    pub fn is_abandoned(&self) -> bool {
        self.occupant_count() == 0
    }

    /// Connection IDs of the current occupants.
    pub fn member_connections(&self) -> Vec<String> {
        Slot::ALL
            .into_iter()
            .filter_map(|slot| self.occupant(slot))
            .map(|o| o.connection_id.clone())
            .collect()
    }

    /// Player IDs of occupants whose last-known connection is `connection_id`.
    pub fn players_on_connection(&self, connection_id: &str) -> Vec<String> {
        Slot::ALL
            .into_iter()
            .filter_map(|slot| self.occupant(slot))
            .filter(|o| o.connection_id == connection_id)
            .map(|o| o.player_id.clone())
            .collect()
    }

    /// Seat a player.
    ///
    /// A player who already holds a seat, or whose historic seat is vacant,
    /// is put back into that seat whatever the session status. Anyone else
    /// gets a random seat in an empty session, the vacant seat when one
    /// player is waiting, and `LobbyFull` when both seats are taken.
    #[instrument(skip(self, password, coin), fields(session_id = %self.id))]
    pub fn assign_slot(
        &mut self,
        player_id: &str,
        connection_id: &str,
        display_name: &str,
        password: &str,
        coin: &mut dyn CoinFlip,
    ) -> Result<JoinOutcome, SessionError> {
        if self.status.is_terminal() {
            return Err(SessionError::GameNotActive);
        }

        if self.password != password {
            warn!(player_id, "Wrong session password");
            return Err(SessionError::WrongPassword);
        }

        let (slot, reconnected) = match self.slot_of(player_id) {
            Some(slot) => (slot, true),
            None => match self
                .historic_slot(player_id)
                .filter(|&s| self.occupant(s).is_none())
            {
                Some(slot) => (slot, true),
                None => (self.pick_free_slot(coin)?, false),
            },
        };

        let ready = self.occupant(slot).is_some_and(|o| o.ready);
        *self.seat_mut(slot) = Some(SlotOccupant {
            player_id: player_id.to_string(),
            display_name: display_name.to_string(),
            connection_id: connection_id.to_string(),
            ready,
        });
        self.history.push(HistoryEntry {
            player_id: player_id.to_string(),
            connection_id: connection_id.to_string(),
            slot,
            joined_at: Utc::now(),
        });

        let was_paused = self.status == SessionStatus::Paused;
        self.refresh_status();
        let resumed = was_paused && self.status == SessionStatus::InProgress;
        self.last_activity = Utc::now();

        info!(
            player_id,
            slot = slot.as_str(),
            reconnected,
            resumed,
            status = self.status.as_str(),
            "Player seated"
        );

        Ok(JoinOutcome {
            slot,
            reconnected,
            resumed,
        })
    }

    fn pick_free_slot(&self, coin: &mut dyn CoinFlip) -> Result<Slot, SessionError> {
        match (self.cross.is_some(), self.nought.is_some()) {
            (false, false) if !self.status.is_started() => {
                Ok(if coin.flip() { Slot::Cross } else { Slot::Nought })
            }
            (true, true) => Err(SessionError::LobbyFull),
            _ if self.status.is_started() => Err(SessionError::GameInProgress),
            (true, false) => Ok(Slot::Nought),
            (false, true) => Ok(Slot::Cross),
            (false, false) => Err(SessionError::GameInProgress),
        }
    }

    /// Remove a player from their seat. Returns `None` if they hold none.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn vacate_slot(&mut self, player_id: &str) -> Option<LeaveOutcome> {
        let slot = self.slot_of(player_id)?;
        *self.seat_mut(slot) = None;

        self.refresh_status();
        self.last_activity = Utc::now();

        let remaining = self.occupant_count();
        info!(
            player_id,
            slot = slot.as_str(),
            remaining,
            status = self.status.as_str(),
            "Player left seat"
        );

        Some(LeaveOutcome { slot, remaining })
    }

    /// Set a player's readiness. Starts the game when both seats are ready.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn set_ready(&mut self, player_id: &str, ready: bool) -> ReadyOutcome {
        let Some(slot) = self.slot_of(player_id) else {
            debug!(player_id, "Ready from non-occupant ignored");
            return ReadyOutcome::Ignored;
        };

        if let Some(occupant) = self.seat_mut(slot) {
            occupant.ready = ready;
        }
        self.last_activity = Utc::now();

        if self.status != SessionStatus::AwaitingReady || !self.all_ready() {
            return ReadyOutcome::Updated;
        }

        self.status = SessionStatus::InProgress;
        let first_player_id = self.turn_player_id().unwrap_or_default().to_string();
        info!(turn = self.turn.as_str(), first_player_id = %first_player_id, "Game started");

        ReadyOutcome::Started { first_player_id }
    }

    /// Check if both seats are occupied and ready.
    pub fn all_ready(&self) -> bool {
        Slot::ALL
            .into_iter()
            .all(|slot| self.occupant(slot).is_some_and(|o| o.ready))
    }

    /// Play `player_id`'s mark at `pos`.
    ///
    /// All checks run before the board is touched, so a rejected move leaves
    /// board and turn unchanged.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn apply_move(
        &mut self,
        player_id: &str,
        pos: Position,
    ) -> Result<MoveOutcome, SessionError> {
        if self.status != SessionStatus::InProgress {
            return Err(SessionError::GameNotActive);
        }

        let slot = self.turn;
        if self.player_id(slot) != Some(player_id) {
            return Err(SessionError::NotYourTurn);
        }

        if !self.board.contains(pos) {
            return Err(SessionError::OutOfBounds { x: pos.x, y: pos.y });
        }
        if !self.board.is_empty_at(pos) {
            return Err(SessionError::CellOccupied { x: pos.x, y: pos.y });
        }

        self.board.place(pos, slot)?;
        self.turn = slot.other();
        self.last_activity = Utc::now();

        let result = self.detector.evaluate(&self.board, pos);
        let mut outcome = MoveOutcome {
            position: pos,
            slot,
            result,
            winner_id: None,
            next_player_id: None,
        };

        match result {
            GameResult::Win => {
                self.status = SessionStatus::Closed;
                outcome.winner_id = Some(player_id.to_string());
                info!(winner_id = player_id, "Game won");
            }
            GameResult::Draw => {
                self.status = SessionStatus::Closed;
                info!("Game drawn");
            }
            GameResult::InProgress => {
                outcome.next_player_id = self.turn_player_id().map(str::to_string);
            }
        }

        Ok(outcome)
    }

    /// Derive status from occupancy. Never moves a started game back to
    /// `Open`/`AwaitingReady`.
    fn refresh_status(&mut self) {
        let full = self.occupant_count() == 2;
        self.status = match self.status {
            SessionStatus::Open | SessionStatus::AwaitingReady if full => {
                SessionStatus::AwaitingReady
            }
            SessionStatus::Open | SessionStatus::AwaitingReady => SessionStatus::Open,
            SessionStatus::InProgress | SessionStatus::Paused if full => {
                SessionStatus::InProgress
            }
            SessionStatus::InProgress | SessionStatus::Paused => SessionStatus::Paused,
            SessionStatus::Closed => SessionStatus::Closed,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::board::Symbol;
    use crate::testing::FixedCoin;
    use pretty_assertions::assert_eq;

    fn make_session(password: &str, first_turn: Slot) -> Session {
        Session::new(
            "1".to_string(),
            "Test".to_string(),
            password.to_string(),
            "creator".to_string(),
            &GameConfig::default(),
            &mut FixedCoin::for_slot(first_turn),
        )
    }

    /// Cross = p1, Nought = p2, both ready, `first_turn` moves first.
    fn started_session(first_turn: Slot) -> Session {
        let mut session = make_session("", first_turn);
        let mut coin = FixedCoin::for_slot(Slot::Cross);
        session.assign_slot("p1", "c1", "P1", "", &mut coin).unwrap();
        session.assign_slot("p2", "c2", "P2", "", &mut coin).unwrap();
        session.set_ready("p1", true);
        session.set_ready("p2", true);
        assert_eq!(session.status(), SessionStatus::InProgress);
        session
    }

    #[test]
    fn test_session_new() {
        let session = make_session("", Slot::Nought);
        assert_eq!(session.status(), SessionStatus::Open);
        assert_eq!(session.turn(), Slot::Nought);
        assert!(session.is_abandoned());
        assert!(!session.has_password());
        assert_eq!(session.board().empty_count(), 225);
    }

    #[test]
    fn test_first_occupant_side_from_coin() {
        for side in Slot::ALL {
            let mut session = make_session("", Slot::Cross);
            let outcome = session
                .assign_slot("p1", "c1", "P1", "", &mut FixedCoin::for_slot(side))
                .unwrap();
            assert_eq!(outcome.slot, side);
            assert!(!outcome.reconnected);
        }
    }

    #[test]
    fn test_second_occupant_takes_vacant_slot() {
        let mut session = make_session("", Slot::Cross);
        let mut coin = FixedCoin::for_slot(Slot::Nought);

        session.assign_slot("p1", "c1", "P1", "", &mut coin).unwrap();
        let outcome = session.assign_slot("p2", "c2", "P2", "", &mut coin).unwrap();

        assert_eq!(outcome.slot, Slot::Cross);
        assert_eq!(session.status(), SessionStatus::AwaitingReady);
        assert_eq!(session.player_id(Slot::Nought), Some("p1"));
        assert_eq!(session.player_id(Slot::Cross), Some("p2"));
    }

    #[test]
    fn test_wrong_password() {
        let mut session = make_session("secret", Slot::Cross);
        let mut coin = FixedCoin::for_slot(Slot::Cross);

        let result = session.assign_slot("p1", "c1", "P1", "guess", &mut coin);
        assert_eq!(result, Err(SessionError::WrongPassword));
        assert!(session.is_abandoned());
        assert!(session.history().is_empty());

        assert!(session.assign_slot("p1", "c1", "P1", "secret", &mut coin).is_ok());
    }

    #[test]
    fn test_lobby_full() {
        let mut session = make_session("", Slot::Cross);
        let mut coin = FixedCoin::for_slot(Slot::Cross);
        session.assign_slot("p1", "c1", "P1", "", &mut coin).unwrap();
        session.assign_slot("p2", "c2", "P2", "", &mut coin).unwrap();

        let result = session.assign_slot("p3", "c3", "P3", "", &mut coin);
        assert_eq!(result, Err(SessionError::LobbyFull));
    }

    #[test]
    fn test_rejoin_while_seated_keeps_slot() {
        let mut session = make_session("", Slot::Cross);
        let mut coin = FixedCoin::for_slot(Slot::Cross);
        session.assign_slot("p1", "c1", "P1", "", &mut coin).unwrap();
        session.assign_slot("p2", "c2", "P2", "", &mut coin).unwrap();

        let outcome = session.assign_slot("p1", "c9", "P1", "", &mut coin).unwrap();

        assert_eq!(outcome.slot, Slot::Cross);
        assert!(outcome.reconnected);
        assert_eq!(session.occupant_count(), 2);
        assert_eq!(session.occupant(Slot::Cross).unwrap().connection_id, "c9");
    }

    #[test]
    fn test_reconnection_restores_original_slot() {
        let mut session = make_session("pw", Slot::Cross);
        let mut coin = FixedCoin::for_slot(Slot::Cross);
        session.assign_slot("p1", "c1", "P1", "pw", &mut coin).unwrap();
        session.assign_slot("p2", "c2", "P2", "pw", &mut coin).unwrap();

        session.vacate_slot("p1").unwrap();
        assert_eq!(session.status(), SessionStatus::Open);

        // Coin would pick Nought for a fresh player; history wins.
        let outcome = session
            .assign_slot("p1", "c3", "P1", "pw", &mut FixedCoin::for_slot(Slot::Nought))
            .unwrap();
        assert_eq!(outcome.slot, Slot::Cross);
        assert!(outcome.reconnected);
        assert_eq!(session.history().len(), 3);
    }

    #[test]
    fn test_historied_player_prefers_old_slot_in_empty_session() {
        let mut session = make_session("", Slot::Cross);
        session
            .assign_slot("p1", "c1", "P1", "", &mut FixedCoin::for_slot(Slot::Nought))
            .unwrap();
        session.vacate_slot("p1").unwrap();

        let outcome = session
            .assign_slot("p1", "c2", "P1", "", &mut FixedCoin::for_slot(Slot::Cross))
            .unwrap();
        assert_eq!(outcome.slot, Slot::Nought);
    }

    #[test]
    fn test_vacate_unknown_player() {
        let mut session = make_session("", Slot::Cross);
        assert_eq!(session.vacate_slot("ghost"), None);
    }

    #[test]
    fn test_vacate_clears_readiness() {
        let mut session = make_session("", Slot::Cross);
        let mut coin = FixedCoin::for_slot(Slot::Cross);
        session.assign_slot("p1", "c1", "P1", "", &mut coin).unwrap();
        session.assign_slot("p2", "c2", "P2", "", &mut coin).unwrap();
        session.set_ready("p1", true);

        let outcome = session.vacate_slot("p1").unwrap();
        assert_eq!(
            outcome,
            LeaveOutcome {
                slot: Slot::Cross,
                remaining: 1
            }
        );

        session.assign_slot("p3", "c3", "P3", "", &mut coin).unwrap();
        assert!(!session.occupant(Slot::Cross).unwrap().ready);
        assert!(!session.all_ready());
    }

    #[test]
    fn test_ready_starts_game() {
        let mut session = make_session("", Slot::Nought);
        let mut coin = FixedCoin::for_slot(Slot::Cross);
        session.assign_slot("p1", "c1", "P1", "", &mut coin).unwrap();
        session.assign_slot("p2", "c2", "P2", "", &mut coin).unwrap();

        assert_eq!(session.set_ready("p1", true), ReadyOutcome::Updated);
        assert_eq!(session.status(), SessionStatus::AwaitingReady);

        assert_eq!(
            session.set_ready("p2", true),
            ReadyOutcome::Started {
                first_player_id: "p2".to_string()
            }
        );
        assert_eq!(session.status(), SessionStatus::InProgress);
    }

    #[test]
    fn test_not_ready_blocks_start() {
        let mut session = make_session("", Slot::Cross);
        let mut coin = FixedCoin::for_slot(Slot::Cross);
        session.assign_slot("p1", "c1", "P1", "", &mut coin).unwrap();
        session.assign_slot("p2", "c2", "P2", "", &mut coin).unwrap();

        session.set_ready("p1", true);
        session.set_ready("p1", false);
        assert_eq!(session.set_ready("p2", true), ReadyOutcome::Updated);
        assert_eq!(session.status(), SessionStatus::AwaitingReady);
    }

    #[test]
    fn test_ready_alone_does_not_start() {
        let mut session = make_session("", Slot::Cross);
        let mut coin = FixedCoin::for_slot(Slot::Cross);
        session.assign_slot("p1", "c1", "P1", "", &mut coin).unwrap();

        assert_eq!(session.set_ready("p1", true), ReadyOutcome::Updated);
        assert_eq!(session.status(), SessionStatus::Open);
        assert_eq!(session.set_ready("stranger", true), ReadyOutcome::Ignored);
    }

    #[test]
    fn test_move_before_start_rejected() {
        let mut session = make_session("", Slot::Cross);
        let mut coin = FixedCoin::for_slot(Slot::Cross);
        session.assign_slot("p1", "c1", "P1", "", &mut coin).unwrap();

        let result = session.apply_move("p1", Position::new(0, 0));
        assert_eq!(result, Err(SessionError::GameNotActive));
    }

    #[test]
    fn test_out_of_turn_move_rejected_without_mutation() {
        let mut session = started_session(Slot::Cross);

        let result = session.apply_move("p2", Position::new(0, 0));

        assert_eq!(result, Err(SessionError::NotYourTurn));
        assert_eq!(session.board().get(Position::new(0, 0)), Some(Symbol::Empty));
        assert_eq!(session.board().empty_count(), 225);
        assert_eq!(session.turn(), Slot::Cross);
    }

    #[test]
    fn test_out_of_bounds_rejected() {
        let mut session = started_session(Slot::Cross);

        for (x, y) in [(-1, 0), (15, 0)] {
            assert_eq!(
                session.apply_move("p1", Position::new(x, y)),
                Err(SessionError::OutOfBounds { x, y })
            );
        }
        assert_eq!(session.turn(), Slot::Cross);
        assert_eq!(session.board().empty_count(), 225);
    }

    #[test]
    fn test_occupied_cell_rejected() {
        let mut session = started_session(Slot::Cross);
        session.apply_move("p1", Position::new(7, 7)).unwrap();

        let result = session.apply_move("p2", Position::new(7, 7));

        assert_eq!(result, Err(SessionError::CellOccupied { x: 7, y: 7 }));
        assert_eq!(session.turn(), Slot::Nought);
        assert_eq!(session.board().empty_count(), 224);
    }

    #[test]
    fn test_move_flips_turn() {
        let mut session = started_session(Slot::Nought);

        let outcome = session.apply_move("p2", Position::new(3, 4)).unwrap();

        assert_eq!(
            outcome,
            MoveOutcome {
                position: Position::new(3, 4),
                slot: Slot::Nought,
                result: GameResult::InProgress,
                winner_id: None,
                next_player_id: Some("p1".to_string()),
            }
        );
        assert_eq!(session.turn(), Slot::Cross);
        assert_eq!(session.board().get(Position::new(3, 4)), Some(Symbol::Nought));
    }

    #[test]
    fn test_win_closes_session() {
        let mut session = started_session(Slot::Cross);

        for y in 0..4 {
            session.apply_move("p1", Position::new(0, y)).unwrap();
            session.apply_move("p2", Position::new(1, y)).unwrap();
        }
        let outcome = session.apply_move("p1", Position::new(0, 4)).unwrap();

        assert_eq!(outcome.result, GameResult::Win);
        assert_eq!(outcome.winner_id.as_deref(), Some("p1"));
        assert_eq!(session.status(), SessionStatus::Closed);

        let turn = session.turn();
        assert_eq!(
            session.apply_move("p2", Position::new(5, 5)),
            Err(SessionError::GameNotActive)
        );
        assert_eq!(session.turn(), turn);
    }

    #[test]
    fn test_leave_mid_game_pauses() {
        let mut session = started_session(Slot::Cross);

        session.vacate_slot("p2").unwrap();
        assert_eq!(session.status(), SessionStatus::Paused);
        assert_eq!(
            session.apply_move("p1", Position::new(0, 0)),
            Err(SessionError::GameNotActive)
        );

        let mut coin = FixedCoin::for_slot(Slot::Cross);
        assert_eq!(
            session.assign_slot("p3", "c3", "P3", "", &mut coin),
            Err(SessionError::GameInProgress)
        );

        let outcome = session.assign_slot("p2", "c4", "P2", "", &mut coin).unwrap();
        assert_eq!(
            outcome,
            JoinOutcome {
                slot: Slot::Nought,
                reconnected: true,
                resumed: true
            }
        );
        assert_eq!(session.status(), SessionStatus::InProgress);
        assert!(session.apply_move("p1", Position::new(0, 0)).is_ok());
    }

    #[test]
    fn test_join_closed_session() {
        let mut session = started_session(Slot::Cross);
        for y in 0..4 {
            session.apply_move("p1", Position::new(0, y)).unwrap();
            session.apply_move("p2", Position::new(1, y)).unwrap();
        }
        session.apply_move("p1", Position::new(0, 4)).unwrap();

        let mut coin = FixedCoin::for_slot(Slot::Cross);
        assert_eq!(
            session.assign_slot("p2", "c2", "P2", "", &mut coin),
            Err(SessionError::GameNotActive)
        );
    }

    #[test]
    fn test_players_on_connection() {
        let mut session = make_session("", Slot::Cross);
        let mut coin = FixedCoin::for_slot(Slot::Cross);
        session.assign_slot("p1", "c1", "P1", "", &mut coin).unwrap();
        session.assign_slot("p2", "c2", "P2", "", &mut coin).unwrap();

        assert_eq!(session.players_on_connection("c2"), vec!["p2".to_string()]);
        assert!(session.players_on_connection("c3").is_empty());
        assert_eq!(
            session.member_connections(),
            vec!["c1".to_string(), "c2".to_string()]
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(SessionError::NotFound("9".into()).code(), "not_found");
        assert_eq!(SessionError::NotFound("9".into()).to_string(), "session 9 not found");
        assert_eq!(
            SessionError::from(IllegalPlacement::CellOccupied { x: 1, y: 2 }),
            SessionError::CellOccupied { x: 1, y: 2 }
        );
        assert_eq!(
            SessionError::from(IllegalPlacement::OutOfBounds { x: -1, y: 0 }).code(),
            "out_of_bounds"
        );
    }
}
