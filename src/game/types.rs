//! Game state types
//!
//! Mirrors of the game service's wire types. Snapshots are accepted
//! wholesale from the server and never mutated locally; the only local
//! decision is whether an inbound update is complete enough to replace
//! the one on hand.

use serde::{Deserialize, Serialize};

/// Card suit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Suit {
    Hearts,
    Diamonds,
    Clubs,
    Spades,
}

impl Suit {
    /// Display symbol for the suit.
    pub fn symbol(&self) -> &'static str {
        match self {
            Suit::Hearts => "♥",
            Suit::Diamonds => "♦",
            Suit::Clubs => "♣",
            Suit::Spades => "♠",
        }
    }
}

/// One playing card as the server reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Card suit
    pub suit: Suit,
    /// Rank as displayed ("2".."10", "J", "Q", "K", "A")
    pub rank: String,
    /// Numeric rank used for comparisons (2..=14)
    pub value: i32,
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.rank, self.suit.symbol())
    }
}

/// Direction of a higher/lower guess
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuessDirection {
    Higher,
    Lower,
}

impl GuessDirection {
    /// Wire spelling of the direction.
    pub fn as_str(&self) -> &'static str {
        match self {
            GuessDirection::Higher => "higher",
            GuessDirection::Lower => "lower",
        }
    }
}

impl std::str::FromStr for GuessDirection {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "higher" => Ok(GuessDirection::Higher),
            "lower" => Ok(GuessDirection::Lower),
            other => Err(crate::Error::MalformedMessage(format!(
                "unknown guess direction: {other}"
            ))),
        }
    }
}

/// Full game state as reported by the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    /// Server-assigned game identifier
    pub game_id: String,
    /// Card currently face up
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_card: Option<Card>,
    /// Card about to be revealed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_card: Option<Card>,
    /// Running score
    #[serde(default)]
    pub score: i32,
    /// Whether the game has ended
    #[serde(default)]
    pub game_over: bool,
    /// Human-readable status text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl GameSnapshot {
    /// One-line rendering for the status display.
    pub fn status_line(&self) -> String {
        let card = self
            .current_card
            .as_ref()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "--".to_string());
        let state = if self.game_over { "over" } else { "live" };
        format!(
            "game {} [{}] card {} score {}",
            self.game_id, state, card, self.score
        )
    }
}
