//! Round engine - the complete state of one game
//!
//! Owns the deck, the table, every hand and the scores, and implements the
//! placement/scoring rule. The engine knows nothing about connections: the
//! turn coordinator feeds it plays and row choices and reads back results.
//!
//! Lifecycle: [`RoundEngine::new`] shuffles the deck, then
//! [`setup_rows`](RoundEngine::setup_rows) and [`deal`](RoundEngine::deal)
//! start the first round. After every turn [`end_turn`](RoundEngine::end_turn)
//! advances the counters and starts the next round when hands are spent, or
//! marks the game finished when the deck cannot cover another round.

use std::collections::HashSet;

use crate::deck::Deck;
use crate::error::EngineError;
use crate::hand::Hand;
use crate::table::{Row, Table};
use crate::types::{Card, HAND_SIZE, MAX_PLAYERS, MIN_PLAYERS, ROWS};

/// Outcome of placing one card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// The card was appended to `row`.
    Appended { row: usize },
    /// The player took `row` and scored `bulls`; the row now holds only the played card.
    Took { row: usize, bulls: u32 },
}

impl Placement {
    pub fn row(&self) -> usize {
        match *self {
            Placement::Appended { row } | Placement::Took { row, .. } => row,
        }
    }

    /// Row index taken, if any.
    pub fn taken_row(&self) -> Option<usize> {
        match *self {
            Placement::Took { row, .. } => Some(row),
            Placement::Appended { .. } => None,
        }
    }

    pub fn bulls_taken(&self) -> u32 {
        match *self {
            Placement::Took { bulls, .. } => bulls,
            Placement::Appended { .. } => 0,
        }
    }
}

/// What [`RoundEngine::end_turn`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnAdvance {
    /// Same round, next turn.
    NextTurn,
    /// Hands were spent; rows rebuilt and new hands dealt for this round number.
    NewRound(u32),
    /// Hands were spent and the deck cannot cover another round. The engine is finished.
    Exhausted,
}

#[derive(Debug, Clone)]
pub struct RoundEngine {
    deck: Deck,
    table: Table,
    hands: Vec<Hand>,
    scores: Vec<u32>,
    /// Card played this turn per player, None between turns.
    played: Vec<Option<Card>>,
    round: u32,
    turn: u32,
    finished: bool,
}

impl RoundEngine {
    /// Create a game for `nplayers` with a deck shuffled from `seed`.
    pub fn new(nplayers: usize, seed: u64) -> Result<Self, EngineError> {
        Self::with_deck(nplayers, Deck::shuffled(seed))
    }

    /// Create a game drawing from an already-prepared deck.
    pub fn with_deck(nplayers: usize, deck: Deck) -> Result<Self, EngineError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&nplayers) {
            return Err(EngineError::InvalidPlayerCount(nplayers));
        }
        Ok(Self {
            deck,
            table: Table::new(),
            hands: vec![Hand::new(); nplayers],
            scores: vec![0; nplayers],
            played: vec![None; nplayers],
            round: 1,
            turn: 1,
            finished: false,
        })
    }

    /// Create a game mid-round from explicit rows and hands.
    ///
    /// Every row must hold at least one card and all cards must be distinct.
    /// The deck holds the remaining cards in ascending order, with the rows
    /// and hands counted as already drawn.
    pub fn with_layout(rows: [Row; ROWS], hands: Vec<Hand>) -> Result<Self, EngineError> {
        let nplayers = hands.len();
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&nplayers) {
            return Err(EngineError::InvalidPlayerCount(nplayers));
        }
        if let Some(index) = rows.iter().position(Row::is_empty) {
            return Err(EngineError::InvalidLayout(format!("row {} is empty", index + 1)));
        }

        let mut used = HashSet::new();
        let mut order = arrayvec::ArrayVec::new();
        let layout_cards = rows
            .iter()
            .flat_map(|row| row.cards().iter())
            .chain(hands.iter().flat_map(|hand| hand.cards().iter()));
        for &card in layout_cards {
            if !used.insert(card) {
                return Err(EngineError::InvalidLayout(format!("card {} appears twice", card)));
            }
            order.push(card);
        }
        let consumed = order.len();
        order.extend(Card::all().filter(|card| !used.contains(card)));

        Ok(Self {
            deck: Deck::from_order(order, consumed),
            table: Table::from_rows(rows),
            hands,
            scores: vec![0; nplayers],
            played: vec![None; nplayers],
            round: 1,
            turn: 1,
            finished: false,
        })
    }

    /// Lay one card from the deck at the head of each row.
    pub fn setup_rows(&mut self) -> Result<(), EngineError> {
        self.require_cards(ROWS)?;
        self.table.clear();
        for index in 0..ROWS {
            if let Some(card) = self.deck.draw() {
                *self.table.row_mut(index) = Row::starting_with(card);
            }
        }
        Ok(())
    }

    /// Deal `HAND_SIZE` cards to every player, each hand sorted.
    pub fn deal(&mut self) -> Result<(), EngineError> {
        self.require_cards(self.nplayers() * HAND_SIZE)?;
        for hand in &mut self.hands {
            let mut cards = [Card::MIN; HAND_SIZE];
            for slot in &mut cards {
                if let Some(card) = self.deck.draw() {
                    *slot = card;
                }
            }
            if let Some(dealt) = Hand::from_cards(&cards) {
                *hand = dealt;
            }
        }
        Ok(())
    }

    fn require_cards(&mut self, needed: usize) -> Result<(), EngineError> {
        if self.deck.can_supply(needed) {
            return Ok(());
        }
        self.finished = true;
        Err(EngineError::DeckExhausted {
            needed,
            remaining: self.deck.remaining(),
        })
    }

    /// Whether the deck can cover a full round (rows plus every hand).
    pub fn can_start_round(&self) -> bool {
        self.deck.can_supply(ROWS + self.nplayers() * HAND_SIZE)
    }

    pub fn hand_has(&self, player: usize, card: Card) -> bool {
        self.hands.get(player).is_some_and(|hand| hand.contains(card))
    }

    /// Remove `card` from a hand. Returns false if the player does not hold it.
    pub fn hand_remove(&mut self, player: usize, card: Card) -> bool {
        self.hands
            .get_mut(player)
            .is_some_and(|hand| hand.remove(card))
    }

    /// Record `card` as the player's play for this turn, taking it out of the hand.
    pub fn play_card(&mut self, player: usize, card: Card) -> Result<(), EngineError> {
        let slot = self
            .played
            .get(player)
            .ok_or(EngineError::UnknownPlayer(player))?;
        if slot.is_some() {
            return Err(EngineError::AlreadyPlayed(player));
        }
        if !self.hand_remove(player, card) {
            return Err(EngineError::CardNotInHand { player, card });
        }
        self.played[player] = Some(card);
        Ok(())
    }

    /// True if `card` is not above any row's last card: placing it forces a take
    /// and the player should be asked which row.
    pub fn needs_row_choice(&self, card: Card) -> bool {
        self.table.needs_row_choice(card)
    }

    /// Place `card` for `player`.
    ///
    /// The card goes after the row whose last card is closest below it. If that
    /// row already holds five cards, or no row is below the card, the player
    /// takes a row: its bulls are added to the score and it restarts with the
    /// played card. For a forced take, `chosen_row` picks the row when it is a
    /// valid index; otherwise the row with the fewest bulls is taken.
    pub fn place_card(
        &mut self,
        player: usize,
        card: Card,
        chosen_row: Option<usize>,
    ) -> Result<Placement, EngineError> {
        if player >= self.nplayers() {
            return Err(EngineError::UnknownPlayer(player));
        }

        let placement = match self.table.best_fit(card) {
            Some(row) if !self.table.rows()[row].is_full() => {
                self.table.row_mut(row).push(card);
                Placement::Appended { row }
            }
            Some(row) => self.take_row(player, row, card),
            None => {
                let row = chosen_row
                    .filter(|&row| row < ROWS)
                    .unwrap_or_else(|| self.table.min_bulls_row());
                self.take_row(player, row, card)
            }
        };
        Ok(placement)
    }

    fn take_row(&mut self, player: usize, row: usize, card: Card) -> Placement {
        let bulls = self.table.row_mut(row).take(card);
        self.scores[player] += bulls;
        Placement::Took { row, bulls }
    }

    /// Players who played this turn, ordered by card value ascending.
    pub fn resolution_order(&self) -> Vec<usize> {
        let mut order: Vec<(Card, usize)> = self
            .played
            .iter()
            .enumerate()
            .filter_map(|(player, card)| card.map(|c| (c, player)))
            .collect();
        order.sort();
        order.into_iter().map(|(_, player)| player).collect()
    }

    /// Close the current turn and advance the turn/round counters.
    pub fn end_turn(&mut self) -> TurnAdvance {
        self.played.iter_mut().for_each(|slot| *slot = None);
        self.turn += 1;
        if self.turn as usize <= HAND_SIZE {
            return TurnAdvance::NextTurn;
        }

        self.round += 1;
        self.turn = 1;
        if !self.can_start_round() {
            self.finished = true;
            return TurnAdvance::Exhausted;
        }
        match self.setup_rows().and_then(|()| self.deal()) {
            Ok(()) => TurnAdvance::NewRound(self.round),
            Err(_) => TurnAdvance::Exhausted,
        }
    }

    /// True once the deck ran out or any score reached `limit`.
    pub fn game_over(&self, limit: u32) -> bool {
        self.finished || self.scores.iter().any(|&score| score >= limit)
    }

    pub fn nplayers(&self) -> usize {
        self.hands.len()
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn hand(&self, player: usize) -> Option<&Hand> {
        self.hands.get(player)
    }

    pub fn scores(&self) -> &[u32] {
        &self.scores
    }

    pub fn score(&self, player: usize) -> Option<u32> {
        self.scores.get(player).copied()
    }

    pub fn played(&self, player: usize) -> Option<Card> {
        self.played.get(player).copied().flatten()
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }
}
