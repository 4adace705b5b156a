//! Intent handling.
//!
//! [`SessionCoordinator`] owns the registry and directory, applies each
//! external intent to completion, and tells the [`Notifier`] what to deliver.
//! Handlers take `&mut self` and never yield mid-mutation, so one handler
//! always observes the complete effect of the previous one.

use chrono::{Duration, Utc};
use tracing::{debug, info, instrument, warn};

use super::board::{Position, Slot};
use super::directory::{ClientDirectory, ClientStatus};
use super::notify::{Event, Notifier};
use super::random::{CoinFlip, IdGenerator, UuidCoin, UuidIds};
use super::registry::{LobbySummary, SessionRegistry};
use super::session::{JoinOutcome, LeaveOutcome, MoveOutcome, ReadyOutcome, SessionError};
use super::win::GameResult;
use crate::config::{ConfigError, GameConfig};

/// Drives sessions in response to client intents.
pub struct SessionCoordinator<N, C = UuidCoin, G = UuidIds> {
    registry: SessionRegistry,
    directory: ClientDirectory,
    notifier: N,
    coin: C,
    ids: G,
}

impl<N: Notifier> SessionCoordinator<N> {
    /// Coordinator with UUID-backed randomness and ids.
    pub fn with_notifier(config: GameConfig, notifier: N) -> Result<Self, ConfigError> {
        Self::new(config, notifier, UuidCoin, UuidIds)
    }
}

impl<N, C, G> SessionCoordinator<N, C, G>
where
    N: Notifier,
    C: CoinFlip,
    G: IdGenerator,
{
    /// Fails if `config` describes an unplayable board.
    pub fn new(config: GameConfig, notifier: N, coin: C, ids: G) -> Result<Self, ConfigError> {
        Ok(Self {
            registry: SessionRegistry::new(config)?,
            directory: ClientDirectory::new(),
            notifier,
            coin,
            ids,
        })
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn directory(&self) -> &ClientDirectory {
        &self.directory
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn notifier_mut(&mut self) -> &mut N {
        &mut self.notifier
    }

    /// A client connected.
    #[instrument(skip(self))]
    pub fn connect(&mut self, connection_id: &str) {
        self.directory.register(connection_id);
        info!("Client connected");
    }

    /// Fresh player identifier for a client that has none yet.
    pub fn unique_id(&mut self) -> String {
        self.ids.next_id()
    }

    /// Public lobby list. The client is now browsing lobbies and will receive
    /// list updates.
    #[instrument(skip(self))]
    pub fn list_sessions(&mut self, connection_id: &str) -> Vec<LobbySummary> {
        self.directory
            .set_status(connection_id, ClientStatus::BrowsingLobbies);
        self.registry.list_public()
    }

    /// Create a session. The creator is not seated; they join like anyone else.
    #[instrument(skip(self, password))]
    pub fn create_session(
        &mut self,
        connection_id: &str,
        name: &str,
        password: &str,
        creator_id: &str,
    ) -> Result<String, SessionError> {
        let id = match self
            .registry
            .create(name, password, creator_id, &mut self.coin)
        {
            Ok(session) => session.id.clone(),
            Err(err) => {
                warn!(error = %err, "Session not created");
                self.notifier
                    .send_to(connection_id, &Event::SessionNotCreated { reason: err.clone() });
                return Err(err);
            }
        };

        self.notifier
            .send_to(connection_id, &Event::SessionCreated { id: id.clone() });
        self.broadcast_lobby_list();
        Ok(id)
    }

    /// Seat a player in a session.
    #[instrument(skip(self, password))]
    pub fn join_session(
        &mut self,
        connection_id: &str,
        session_id: &str,
        password: &str,
        player_id: &str,
        display_name: &str,
    ) -> Result<JoinOutcome, SessionError> {
        let joined = self.registry.find_mut(session_id).and_then(|session| {
            let previous = session
                .slot_of(player_id)
                .and_then(|slot| session.occupant(slot))
                .map(|o| o.connection_id.clone());
            let outcome = session.assign_slot(
                player_id,
                connection_id,
                display_name,
                password,
                &mut self.coin,
            )?;
            let reply = Event::JoinSucceeded {
                id: session.id.clone(),
                cross_player_id: session.player_id(Slot::Cross).map(str::to_string),
                nought_player_id: session.player_id(Slot::Nought).map(str::to_string),
                turn: session.turn(),
            };
            let full = session.occupant_count() == 2;
            Ok((outcome, previous, reply, session.status().is_started(), full))
        });

        let (outcome, previous, reply, started, full) = match joined {
            Ok(joined) => joined,
            Err(err) => {
                warn!(error = %err, "Join failed");
                self.notifier
                    .send_to(connection_id, &Event::JoinFailed { reason: err.clone() });
                return Err(err);
            }
        };

        if let Some(previous) = previous.filter(|p| p != connection_id) {
            debug!(previous = %previous, "Replacing stale connection");
            self.notifier.leave_room(&previous, session_id);
        }
        self.notifier.join_room(connection_id, session_id);
        self.notifier.send_to(connection_id, &reply);

        let status = if started {
            ClientStatus::InGame
        } else {
            ClientStatus::InLobby
        };
        self.directory.set_status(connection_id, status);

        if outcome.resumed || (outcome.reconnected && !started && full) {
            self.notifier.broadcast(
                session_id,
                &Event::LobbyResumed {
                    session_id: session_id.to_string(),
                },
            );
        }
        self.broadcast_lobby_list();

        Ok(outcome)
    }

    /// A player leaves their seat. The seat's last-known connection leaves
    /// the room; unknown sessions and non-occupants are ignored.
    #[instrument(skip(self))]
    pub fn leave_session(
        &mut self,
        connection_id: &str,
        session_id: &str,
        player_id: &str,
    ) -> Option<LeaveOutcome> {
        let session = self.registry.get_mut(session_id)?;
        let seat_connection = session
            .slot_of(player_id)
            .and_then(|slot| session.occupant(slot))
            .map(|o| o.connection_id.clone());
        let outcome = session.vacate_slot(player_id)?;

        if let Some(seat_connection) = &seat_connection {
            if seat_connection != connection_id {
                debug!(seat_connection = %seat_connection, "Leave sent from another connection");
            }
            self.notifier.leave_room(seat_connection, session_id);
            self.directory
                .set_status(seat_connection, ClientStatus::BrowsingLobbies);
        }

        self.after_departure(session_id, outcome.remaining);
        self.broadcast_lobby_list();

        Some(outcome)
    }

    /// Mark a player ready. Starts the game once both players are ready.
    #[instrument(skip(self))]
    pub fn set_ready(&mut self, session_id: &str, player_id: &str) -> ReadyOutcome {
        let Some(session) = self.registry.get_mut(session_id) else {
            debug!("Ready for unknown session ignored");
            return ReadyOutcome::Ignored;
        };

        let outcome = session.set_ready(player_id, true);
        if let ReadyOutcome::Started { first_player_id } = &outcome {
            let event = Event::GameStarted {
                turn: first_player_id.clone(),
                board: session.board().clone(),
            };
            let members = session.member_connections();

            self.notifier.broadcast(session_id, &event);
            for connection_id in &members {
                self.directory.set_status(connection_id, ClientStatus::InGame);
            }
            self.broadcast_lobby_list();
        }

        outcome
    }

    /// Withdraw a player's readiness. Nothing is broadcast.
    #[instrument(skip(self))]
    pub fn set_not_ready(&mut self, session_id: &str, player_id: &str) -> ReadyOutcome {
        match self.registry.get_mut(session_id) {
            Some(session) => session.set_ready(player_id, false),
            None => ReadyOutcome::Ignored,
        }
    }

    /// Play a move. Rejections go back to the requesting connection only.
    #[instrument(skip(self))]
    pub fn make_move(
        &mut self,
        connection_id: &str,
        session_id: &str,
        player_id: &str,
        position: Position,
    ) -> Result<MoveOutcome, SessionError> {
        let result = self
            .registry
            .find_mut(session_id)
            .and_then(|session| session.apply_move(player_id, position));

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(error = %err, "Move rejected");
                self.notifier
                    .send_to(connection_id, &Event::MoveRejected { reason: err.clone() });
                return Err(err);
            }
        };

        self.notifier.broadcast(
            session_id,
            &Event::MoveAccepted {
                position: outcome.position,
                symbol: outcome.slot,
            },
        );

        match outcome.result {
            GameResult::InProgress => {
                if let Some(next) = &outcome.next_player_id {
                    self.notifier.broadcast(
                        session_id,
                        &Event::WhoseTurnNext {
                            player_id: next.clone(),
                        },
                    );
                }
            }
            GameResult::Win | GameResult::Draw => {
                self.notifier.broadcast(
                    session_id,
                    &Event::GameEnded {
                        result: outcome.result,
                        winner_id: outcome.winner_id.clone(),
                    },
                );
                self.teardown(session_id);
                self.broadcast_lobby_list();
            }
        }

        Ok(outcome)
    }

    /// A connection dropped. Every seat last joined from it is vacated.
    #[instrument(skip(self))]
    pub fn disconnect(&mut self, connection_id: &str) {
        let affected = self.registry.sessions_on_connection(connection_id);

        for session_id in &affected {
            let Some(session) = self.registry.get_mut(session_id) else {
                continue;
            };
            let mut remaining = session.occupant_count();
            for player_id in session.players_on_connection(connection_id) {
                if let Some(outcome) = session.vacate_slot(&player_id) {
                    remaining = outcome.remaining;
                }
            }

            self.notifier.leave_room(connection_id, session_id);
            self.after_departure(session_id, remaining);
        }

        self.directory.unregister(connection_id);
        info!(sessions = affected.len(), "Client disconnected");

        if !affected.is_empty() {
            self.broadcast_lobby_list();
        }
    }

    /// Evict sessions idle for longer than `max_idle`. Returns evicted IDs.
    #[instrument(skip(self))]
    pub fn reap_idle(&mut self, max_idle: Duration) -> Vec<String> {
        let idle = self.registry.idle_sessions(Utc::now(), max_idle);
        for session_id in &idle {
            self.notifier.broadcast(
                session_id,
                &Event::LobbyClosed {
                    session_id: session_id.clone(),
                },
            );
            self.teardown(session_id);
        }
        if !idle.is_empty() {
            info!(count = idle.len(), "Reaped idle sessions");
            self.broadcast_lobby_list();
        }
        idle
    }

    /// Evict an empty session or tell the remaining occupant the lobby paused.
    fn after_departure(&mut self, session_id: &str, remaining: usize) {
        if remaining == 0 {
            self.registry.evict(session_id);
        } else {
            self.notifier.broadcast(
                session_id,
                &Event::LobbyPaused {
                    session_id: session_id.to_string(),
                },
            );
        }
    }

    /// Evict a session and send its occupants back to the lobby list.
    fn teardown(&mut self, session_id: &str) {
        let Some(session) = self.registry.evict(session_id) else {
            return;
        };
        for connection_id in session.member_connections() {
            self.notifier.leave_room(&connection_id, session_id);
            self.directory
                .set_status(&connection_id, ClientStatus::BrowsingLobbies);
        }
    }

    /// Send the public lobby list to every client browsing it.
    fn broadcast_lobby_list(&mut self) {
        let event = Event::LobbyListUpdated {
            lobbies: self.registry.list_public(),
        };
        let targets = self.directory.list_by_status(ClientStatus::BrowsingLobbies);
        debug!(targets = targets.len(), "Broadcasting lobby list");
        for connection_id in &targets {
            self.notifier.send_to(connection_id, &event);
        }
    }
}
