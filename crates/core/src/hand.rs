//! A player's hand: up to 10 cards, always sorted ascending.

use std::fmt;

use arrayvec::ArrayVec;

use crate::types::{Card, HAND_SIZE};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hand {
    cards: ArrayVec<Card, HAND_SIZE>,
}

impl Hand {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a sorted hand. Returns None if more than `HAND_SIZE` cards are given.
    pub fn from_cards(cards: &[Card]) -> Option<Self> {
        if cards.len() > HAND_SIZE {
            return None;
        }
        let mut cards: ArrayVec<Card, HAND_SIZE> = cards.iter().copied().collect();
        cards.sort_unstable();
        Some(Self { cards })
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn contains(&self, card: Card) -> bool {
        self.cards.contains(&card)
    }

    /// Remove `card`, keeping the rest in order. Returns false if it was not held.
    pub fn remove(&mut self, card: Card) -> bool {
        match self.cards.iter().position(|&c| c == card) {
            Some(index) => {
                self.cards.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn lowest(&self) -> Option<Card> {
        self.cards.first().copied()
    }
}

/// Space-separated values, as sent on the `MAIN` line.
impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, card) in self.cards.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", card)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cards(values: &[u8]) -> Vec<Card> {
        values.iter().map(|&v| Card::new(v).unwrap()).collect()
    }

    #[test]
    fn test_from_cards_sorts() {
        let hand = Hand::from_cards(&cards(&[50, 3, 77, 12])).unwrap();
        assert_eq!(hand.cards(), cards(&[3, 12, 50, 77]).as_slice());
        assert_eq!(hand.to_string(), "3 12 50 77");
        assert_eq!(hand.lowest(), Card::new(3));
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut hand = Hand::from_cards(&cards(&[1, 5, 9, 13])).unwrap();
        assert!(hand.remove(Card::new(5).unwrap()));
        assert_eq!(hand.cards(), cards(&[1, 9, 13]).as_slice());
        assert!(!hand.remove(Card::new(5).unwrap()), "second removal is a no-op");
        assert_eq!(hand.len(), 3);
    }

    #[test]
    fn test_too_many_cards() {
        let eleven: Vec<u8> = (1..=11).collect();
        assert!(Hand::from_cards(&cards(&eleven)).is_none());
    }
}
