//! Property tests for the round engine.

use std::collections::HashSet;

use proptest::prelude::*;

use take_six::core::{Placement, RoundEngine, TurnAdvance};
use take_six::types::{Card, HAND_SIZE, ROWS, ROW_MAX};

fn started(nplayers: usize, seed: u64) -> RoundEngine {
    let mut engine = RoundEngine::new(nplayers, seed).unwrap();
    engine.setup_rows().unwrap();
    engine.deal().unwrap();
    engine
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Dealing consumes exactly 4 + 10n distinct cards.
    #[test]
    fn prop_deal_is_distinct(nplayers in 2usize..=10, seed in any::<u64>()) {
        let engine = started(nplayers, seed);
        let mut cards: Vec<Card> = engine.table().cards().collect();
        for p in 0..nplayers {
            cards.extend_from_slice(engine.hand(p).unwrap().cards());
        }
        let unique: HashSet<Card> = cards.iter().copied().collect();
        prop_assert_eq!(unique.len(), cards.len());
        prop_assert_eq!(cards.len(), ROWS + HAND_SIZE * nplayers);
        prop_assert_eq!(engine.deck().consumed(), cards.len());
    }

    /// A card below every row always forces a take, and the fallback row has
    /// the fewest bulls with ties to the lowest index.
    #[test]
    fn prop_forced_take_picks_cheapest_row(seed in any::<u64>()) {
        let mut engine = started(2, seed);
        let lowest_last = engine
            .table()
            .rows()
            .iter()
            .filter_map(|r| r.last())
            .min()
            .unwrap();
        let low = engine
            .hand(0)
            .unwrap()
            .cards()
            .iter()
            .copied()
            .find(|&c| c < lowest_last);
        prop_assume!(low.is_some());
        let card = low.unwrap();

        let row_bulls: Vec<u32> = engine.table().rows().iter().map(|r| r.bulls()).collect();
        let min = *row_bulls.iter().min().unwrap();
        let expected = row_bulls.iter().position(|&b| b == min).unwrap();

        prop_assert!(engine.needs_row_choice(card));
        let placement = engine.place_card(0, card, None).unwrap();
        prop_assert_eq!(placement, Placement::Took { row: expected, bulls: min });
        prop_assert_eq!(engine.score(0), Some(min));
    }

    /// Whole games never break table invariants.
    #[test]
    fn prop_games_keep_rows_well_formed(nplayers in 2usize..=10, seed in any::<u64>(), pick in any::<u64>()) {
        let mut engine = started(nplayers, seed);
        let mut choice = pick;

        while !engine.game_over(66) {
            for p in 0..nplayers {
                let cards = engine.hand(p).unwrap().cards().to_vec();
                prop_assert!(!cards.is_empty());
                let c = cards[(choice % cards.len() as u64) as usize];
                choice = choice.rotate_left(7) ^ 0x9e37_79b9;
                engine.play_card(p, c).unwrap();
            }

            let order = engine.resolution_order();
            prop_assert_eq!(order.len(), nplayers);
            let played: Vec<Card> = order.iter().map(|&p| engine.played(p).unwrap()).collect();
            prop_assert!(played.windows(2).all(|w| w[0] < w[1]));

            for p in order {
                let c = engine.played(p).unwrap();
                let row = engine.needs_row_choice(c).then_some((choice % ROWS as u64) as usize);
                let before = engine.score(p).unwrap();
                let placement = engine.place_card(p, c, row).unwrap();
                prop_assert_eq!(engine.score(p).unwrap(), before + placement.bulls_taken());
                prop_assert_eq!(engine.table().rows()[placement.row()].last(), Some(c));
            }

            for r in engine.table().rows() {
                prop_assert!(!r.is_empty() && r.len() <= ROW_MAX);
                prop_assert!(r.cards().windows(2).all(|w| w[0] < w[1]));
            }

            if engine.end_turn() == TurnAdvance::Exhausted {
                prop_assert!(engine.is_finished());
            }
        }
    }
}
