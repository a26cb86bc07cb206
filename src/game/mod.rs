//! Game service integration
//!
//! Authoritative game state lives on the server. This module holds the
//! snapshot types mirrored from its responses and the REST client used
//! for explicit game actions; gesture-driven guesses travel over the
//! pub/sub channel instead.

pub mod client;
pub mod types;

pub use client::GameClient;
pub use types::{Card, GameSnapshot, GuessDirection, Suit};
