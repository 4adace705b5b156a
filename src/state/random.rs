//! Injected sources of randomness and identifiers.
//!
//! Side assignment, first-turn selection, and client ids all go through these
//! traits so tests can substitute deterministic sources.

use uuid::Uuid;

/// A source of random bits.
pub trait CoinFlip {
    /// Return a uniformly random boolean.
    fn flip(&mut self) -> bool;
}

/// A source of unique identifiers.
pub trait IdGenerator {
    fn next_id(&mut self) -> String;
}

/// Coin backed by the random bits of a v4 UUID.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidCoin;

impl CoinFlip for UuidCoin {
    fn flip(&mut self) -> bool {
        // Byte 15 carries no version or variant bits.
        Uuid::new_v4().as_bytes()[15] & 1 == 1
    }
}

/// Hyphenated v4 UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn next_id(&mut self) -> String {
        Uuid::new_v4().to_string()
    }
}
