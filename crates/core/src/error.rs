use thiserror::Error;

use crate::types::Card;

/// Errors reported by the round engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("player count {0} is outside 2..=10")]
    InvalidPlayerCount(usize),

    #[error("no player at seat {0}")]
    UnknownPlayer(usize),

    #[error("card {card} is not in the hand of player {player}")]
    CardNotInHand { player: usize, card: Card },

    #[error("player {0} already played this turn")]
    AlreadyPlayed(usize),

    #[error("deck cannot supply {needed} cards ({remaining} left)")]
    DeckExhausted { needed: usize, remaining: usize },

    #[error("invalid layout: {0}")]
    InvalidLayout(String),
}
