//! Table module - the four rows cards are laid into
//!
//! A row holds 1 to 5 cards in strictly increasing order. Uses fixed-capacity
//! storage, so a row can never grow past `ROW_MAX`: the sixth card takes the
//! row instead (see [`crate::RoundEngine::place_card`]).

use std::fmt;

use arrayvec::ArrayVec;

use crate::types::{total_bulls, Card, ROWS, ROW_MAX};

/// One lane of the table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    cards: ArrayVec<Card, ROW_MAX>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// A row holding a single starting card.
    pub fn starting_with(card: Card) -> Self {
        let mut cards = ArrayVec::new();
        cards.push(card);
        Self { cards }
    }

    /// Build a row from explicit cards.
    ///
    /// Returns None if there are more than `ROW_MAX` cards or they are not
    /// strictly increasing.
    pub fn from_cards(cards: &[Card]) -> Option<Self> {
        if cards.len() > ROW_MAX || cards.windows(2).any(|w| w[0] >= w[1]) {
            return None;
        }
        Some(Self {
            cards: cards.iter().copied().collect(),
        })
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Largest (most recent) card of the row.
    pub fn last(&self) -> Option<Card> {
        self.cards.last().copied()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.cards.is_full()
    }

    /// Total bulls of the cards in the row.
    pub fn bulls(&self) -> u32 {
        total_bulls(&self.cards)
    }

    /// Append a card. Returns false (and leaves the row untouched) if the row
    /// is full or the card does not extend it.
    pub fn push(&mut self, card: Card) -> bool {
        if self.is_full() || self.last().is_some_and(|last| card <= last) {
            return false;
        }
        self.cards.push(card);
        true
    }

    /// Empty the row, leaving only `card`. Returns the bulls of the removed cards.
    pub fn take(&mut self, card: Card) -> u32 {
        let bulls = self.bulls();
        self.cards.clear();
        self.cards.push(card);
        bulls
    }

    pub(crate) fn clear(&mut self) {
        self.cards.clear();
    }
}

/// The four rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    rows: [Row; ROWS],
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: [Row; ROWS]) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Row; ROWS] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub(crate) fn row_mut(&mut self, index: usize) -> &mut Row {
        &mut self.rows[index]
    }

    /// Row whose last card is the closest value strictly below `card`.
    ///
    /// Scans rows in index order; on an equal gap the first row scanned wins.
    /// Empty rows never qualify. None means the card is smaller than every row
    /// and the player has to take one.
    pub fn best_fit(&self, card: Card) -> Option<usize> {
        let mut best: Option<(usize, u8)> = None;
        for (index, row) in self.rows.iter().enumerate() {
            let Some(last) = row.last() else {
                continue;
            };
            if card > last {
                let gap = card.value() - last.value();
                if best.map_or(true, |(_, best_gap)| gap < best_gap) {
                    best = Some((index, gap));
                }
            }
        }
        best.map(|(index, _)| index)
    }

    /// True if `card` fits no row, so placing it forces a take.
    pub fn needs_row_choice(&self, card: Card) -> bool {
        self.best_fit(card).is_none()
    }

    /// Row with the fewest total bulls (lowest index on ties).
    pub fn min_bulls_row(&self) -> usize {
        let mut best = 0;
        let mut best_bulls = self.rows[0].bulls();
        for (index, row) in self.rows.iter().enumerate().skip(1) {
            let bulls = row.bulls();
            if bulls < best_bulls {
                best = index;
                best_bulls = bulls;
            }
        }
        best
    }

    /// Every card currently on the table.
    pub fn cards(&self) -> impl Iterator<Item = Card> + '_ {
        self.rows.iter().flat_map(|row| row.cards().iter().copied())
    }

    pub(crate) fn clear(&mut self) {
        for row in &mut self.rows {
            row.clear();
        }
    }
}

/// Renders the table line of the protocol: `R1: 3 8 | R2: 12 | R3: 40 | R4: 77 |`.
impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, row) in self.rows.iter().enumerate() {
            if index > 0 {
                f.write_str(" ")?;
            }
            write!(f, "R{}:", index + 1)?;
            for card in row.cards() {
                write!(f, " {}", card)?;
            }
            f.write_str(" |")?;
        }
        Ok(())
    }
}
