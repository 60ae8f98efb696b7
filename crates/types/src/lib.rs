//! Core types module - card values and table constants
//!
//! This module defines the fundamental types used throughout the server.
//! All types are pure data with no external dependencies, so the same
//! definitions serve the rules engine, the text protocol and the agents.
//!
//! # Table Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `DECK_SIZE` | 104 | Cards numbered 1 through 104 |
//! | `ROWS` | 4 | Lanes on the table |
//! | `ROW_MAX` | 5 | A sixth card takes the row |
//! | `HAND_SIZE` | 10 | Cards dealt per player and turns per round |
//! | `MIN_PLAYERS` / `MAX_PLAYERS` | 2 / 10 | Seats per game |
//! | `SCORE_LIMIT` | 66 | Reaching it ends the game |
//!
//! # Bulls
//!
//! Every card carries a penalty ("bulls") that depends only on its value:
//!
//! | Value | Bulls |
//! |-------|-------|
//! | 55 | 7 |
//! | multiple of 11 | 5 |
//! | multiple of 10 | 3 |
//! | multiple of 5 | 2 |
//! | anything else | 1 |
//!
//! # Examples
//!
//! ```
//! use take_six_types::{bulls, Card, DECK_SIZE};
//!
//! assert_eq!(bulls(55), 7);
//! assert_eq!(bulls(44), 5);
//!
//! let card = Card::new(30).unwrap();
//! assert_eq!(card.bulls(), 3);
//! assert!(Card::new(0).is_none());
//! assert!(Card::new(DECK_SIZE as u8 + 1).is_none());
//! ```

use std::fmt;

/// Number of cards in the deck (values 1..=104).
pub const DECK_SIZE: usize = 104;
/// Number of rows on the table.
pub const ROWS: usize = 4;
/// Maximum cards a row can hold.
pub const ROW_MAX: usize = 5;
/// Cards dealt to each player at the start of a round.
pub const HAND_SIZE: usize = 10;

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 10;

/// Cumulative bulls at which a game ends.
pub const SCORE_LIMIT: u32 = 66;

/// Size of the display-name buffer; names keep at most `PLAYER_NAME_MAX - 1` characters.
pub const PLAYER_NAME_MAX: usize = 32;

/// Default capacity of the waiting queue.
pub const MAX_WAITING: usize = 256;

/// Longest line, in bytes without the terminator, read from a player.
pub const LINE_MAX: usize = 2048;

/// Penalty value of a card.
///
/// 55 is checked before the multiple-of-11 rule: it is the only card worth 7.
/// Values outside 1..=104 are not cards, but the function stays total and
/// applies the same arithmetic.
pub const fn bulls(value: u8) -> u8 {
    if value == 55 {
        7
    } else if value % 11 == 0 {
        5
    } else if value % 10 == 0 {
        3
    } else if value % 5 == 0 {
        2
    } else {
        1
    }
}

/// A card in 1..=104.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Card(u8);

impl Card {
    pub const MIN: Card = Card(1);
    pub const MAX: Card = Card(DECK_SIZE as u8);

    /// Create a card, returning None if the value is outside 1..=104.
    pub fn new(value: u8) -> Option<Self> {
        if (1..=DECK_SIZE as u8).contains(&value) {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Convert from a wider integer (as parsed from the wire).
    pub fn from_i64(value: i64) -> Option<Self> {
        u8::try_from(value).ok().and_then(Self::new)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn bulls(self) -> u8 {
        bulls(self.0)
    }

    /// Every card of the deck, ascending.
    pub fn all() -> impl Iterator<Item = Card> {
        (1..=DECK_SIZE as u8).map(Card)
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Card> for u8 {
    fn from(card: Card) -> Self {
        card.0
    }
}

/// Sum of bulls over a set of cards.
pub fn total_bulls<'a>(cards: impl IntoIterator<Item = &'a Card>) -> u32 {
    cards.into_iter().map(|c| c.bulls() as u32).sum()
}
