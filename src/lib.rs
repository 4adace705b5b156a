//! Gomoku State Library
//!
//! Session coordination and win detection for two-player, five-in-a-row
//! games on a 15×15 board.
//!
//! # Overview
//!
//! - **Board** - Grid plus empty-cell counter, mutated only by placement.
//!
//! - **Win Detection** - Scans the four axes through the cell just played.
//!
//! - **Sessions** - Lobby state machine with two seats, readiness, turn
//!   ownership, and a seat history used for reconnection.
//!
//! - **Registries** - Sessions by id in creation order; connected clients by
//!   UI status.
//!
//! - **Coordinator** - Applies client intents and emits notifications.
//!
//! # Design Principles
//!
//! 1. **No networking** - Delivery goes through an injected [`Notifier`].
//!
//! 2. **Injected randomness** - Seat and first-turn selection use a
//!    [`CoinFlip`], so every branch is testable.
//!
//! 3. **Errors are values** - Every rejected intent is a [`SessionError`]
//!    and leaves state untouched.
//!
//! # Example
//!
//! ```rust
//! use gomoku_state::testing::{FixedCoin, RecordingNotifier, SequentialIds};
//! use gomoku_state::{GameConfig, Position, SessionCoordinator, Slot};
//!
//! let mut app = SessionCoordinator::new(
//!     GameConfig::default(),
//!     RecordingNotifier::default(),
//!     FixedCoin::for_slot(Slot::Cross),
//!     SequentialIds::new("player"),
//! )
//! .unwrap();
//!
//! app.connect("socket-a");
//! app.connect("socket-b");
//!
//! let id = app.create_session("socket-a", "Evening match", "", "alice").unwrap();
//! app.join_session("socket-a", &id, "", "alice", "Alice").unwrap();
//! app.join_session("socket-b", &id, "", "bob", "Bob").unwrap();
//!
//! app.set_ready(&id, "alice");
//! app.set_ready(&id, "bob");
//!
//! // Cross (alice) moves first with this coin.
//! app.make_move("socket-a", &id, "alice", Position::new(7, 7)).unwrap();
//! ```

pub mod config;
pub mod state;
pub mod testing;

// Re-export everything from state module at crate root
pub use config::{ConfigError, GameConfig};
pub use state::*;
