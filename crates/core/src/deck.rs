//! Deck module - seeded shuffle and cursor-based drawing
//!
//! The deck holds the 104 cards in a fixed order decided at game start and
//! hands them out strictly from a cursor. Cards are never put back: once the
//! cursor reaches the end the deck is exhausted.
//!
//! Shuffling uses ChaCha8 seeded from a `u64`, so the same seed always yields
//! the same game (useful for replays and tests).

use arrayvec::ArrayVec;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::types::{Card, DECK_SIZE};

#[derive(Debug, Clone)]
pub struct Deck {
    cards: ArrayVec<Card, DECK_SIZE>,
    top: usize,
    seed: Option<u64>,
}

impl Deck {
    /// All 104 cards in ascending order, cursor at the start.
    pub fn sorted() -> Self {
        Self {
            cards: Card::all().collect(),
            top: 0,
            seed: None,
        }
    }

    /// All 104 cards, uniformly shuffled (Fisher-Yates) from `seed`.
    pub fn shuffled(seed: u64) -> Self {
        let mut deck = Self::sorted();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        deck.cards.shuffle(&mut rng);
        deck.seed = Some(seed);
        deck
    }

    /// A deck with an explicit draw order and `consumed` cards already dealt.
    ///
    /// Caller guarantees the cards are distinct.
    pub(crate) fn from_order(cards: ArrayVec<Card, DECK_SIZE>, consumed: usize) -> Self {
        let top = consumed.min(cards.len());
        Self {
            cards,
            top,
            seed: None,
        }
    }

    /// Draw the next card, or None once the deck is exhausted.
    pub fn draw(&mut self) -> Option<Card> {
        let card = self.cards.get(self.top).copied()?;
        self.top += 1;
        Some(card)
    }

    /// Cards still available to draw.
    pub fn remaining(&self) -> usize {
        self.cards.len() - self.top
    }

    /// Cards drawn so far.
    pub fn consumed(&self) -> usize {
        self.top
    }

    pub fn can_supply(&self, count: usize) -> bool {
        self.remaining() >= count
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::sorted()
    }
}
