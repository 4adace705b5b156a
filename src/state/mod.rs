//! State management module.
//!
//! - `board` - grid, marks, and placement
//! - `win` - win/draw detection for the cell just played
//! - `session` - per-lobby state machine
//! - `registry` - all live sessions
//! - `directory` - connected clients and their UI status
//! - `notify` - outbound events and the notifier capability
//! - `random` - injected coin and id sources
//! - `coordinator` - intent handling over all of the above
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────────┐
//! │                        SessionCoordinator                          │
//! │                                                                    │
//! │  ┌──────────────────────┐   ┌─────────────────┐   ┌─────────────┐  │
//! │  │   SessionRegistry    │   │ ClientDirectory │   │  Notifier   │  │
//! │  │                      │   │                 │   │ (injected)  │  │
//! │  │ session_id →         │   │ connection_id → │   │             │  │
//! │  │   Session            │   │   ClientStatus  │   │ send_to     │  │
//! │  │     ├─ Board         │   │                 │   │ broadcast   │  │
//! │  │     ├─ WinDetector   │   │                 │   │ join/leave  │  │
//! │  │     └─ seats+history │   │                 │   │             │  │
//! │  └──────────────────────┘   └─────────────────┘   └─────────────┘  │
//! └────────────────────────────────────────────────────────────────────┘
//! ```

pub mod board;
pub mod coordinator;
pub mod directory;
pub mod notify;
pub mod random;
pub mod registry;
pub mod session;
pub mod win;

pub use board::{Board, IllegalPlacement, Position, Slot, Symbol, BOARD_SIZE, WIN_LENGTH};
pub use coordinator::SessionCoordinator;
pub use directory::{ClientDirectory, ClientEntry, ClientStatus};
pub use notify::{Event, Notifier};
pub use random::{CoinFlip, IdGenerator, UuidCoin, UuidIds};
pub use registry::{LobbySummary, SessionRegistry};
pub use session::{
    HistoryEntry, JoinOutcome, LeaveOutcome, MoveOutcome, ReadyOutcome, Session, SessionError,
    SessionStatus, SlotOccupant,
};
pub use win::{GameResult, WinDetector};
