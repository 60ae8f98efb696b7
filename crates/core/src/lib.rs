//! Core game logic module - pure, deterministic, and testable
//!
//! This crate holds the rules of the card game: the deck, the four rows on
//! the table, the players' hands and the scoring. It has no dependency on
//! networking or I/O, so the server, the agents and the tests all drive the
//! same engine.
//!
//! # Module Structure
//!
//! - [`deck`]: seeded shuffle and cursor-based drawing
//! - [`table`]: the four rows and the closest-fit rule
//! - [`hand`]: sorted player hands
//! - [`engine`]: the round engine (placement, takes, turn and round advance)
//! - [`error`]: engine errors
//!
//! # Game Rules
//!
//! - Each round lays one card at the head of each row and deals ten cards to
//!   every player.
//! - Every turn each player picks a card; the cards are placed in ascending
//!   order of value.
//! - A card goes after the row whose last card is the closest value below it.
//!   The sixth card of a row takes the five others.
//! - A card below every row forces its player to take a row of their choice.
//! - Taken cards add their bulls to the player's score. The game ends when a
//!   score reaches the limit or the deck cannot cover another round.
//!
//! # Example
//!
//! ```
//! use take_six_core::{RoundEngine, TurnAdvance};
//!
//! let mut engine = RoundEngine::new(2, 12345).unwrap();
//! engine.setup_rows().unwrap();
//! engine.deal().unwrap();
//!
//! for player in 0..2 {
//!     let card = engine.hand(player).unwrap().lowest().unwrap();
//!     engine.play_card(player, card).unwrap();
//! }
//! for player in engine.resolution_order() {
//!     let card = engine.played(player).unwrap();
//!     engine.place_card(player, card, None).unwrap();
//! }
//! assert_eq!(engine.end_turn(), TurnAdvance::NextTurn);
//! assert_eq!(engine.hand(0).unwrap().len(), 9);
//! ```

pub mod deck;
pub mod engine;
pub mod error;
pub mod hand;
pub mod table;

pub use take_six_types as types;

pub use deck::Deck;
pub use engine::{Placement, RoundEngine, TurnAdvance};
pub use error::EngineError;
pub use hand::Hand;
pub use table::{Row, Table};
