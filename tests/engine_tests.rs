use std::collections::HashSet;

use take_six::core::{EngineError, Hand, Placement, RoundEngine, Row, TurnAdvance};
use take_six::types::{bulls, Card, HAND_SIZE, ROWS};

fn card(v: u8) -> Card {
    Card::new(v).unwrap()
}

fn row(values: &[u8]) -> Row {
    let cards: Vec<Card> = values.iter().map(|&v| card(v)).collect();
    Row::from_cards(&cards).unwrap()
}

fn hand(values: &[u8]) -> Hand {
    let cards: Vec<Card> = values.iter().map(|&v| card(v)).collect();
    Hand::from_cards(&cards).unwrap()
}

fn started(nplayers: usize, seed: u64) -> RoundEngine {
    let mut engine = RoundEngine::new(nplayers, seed).unwrap();
    engine.setup_rows().unwrap();
    engine.deal().unwrap();
    engine
}

#[test]
fn test_bulls_values() {
    assert_eq!(bulls(55), 7);
    assert_eq!(bulls(11), 5);
    assert_eq!(bulls(22), 5);
    assert_eq!(bulls(10), 3);
    assert_eq!(bulls(5), 2);
    assert_eq!(bulls(7), 1);
    for card in Card::all() {
        assert!([1, 2, 3, 5, 7].contains(&card.bulls()));
        assert_eq!(card.bulls(), bulls(card.value()));
    }
}

#[test]
fn test_deal_invariants_for_every_table_size() {
    for n in 2..=10 {
        let engine = started(n, 1000 + n as u64);
        assert_eq!(engine.deck().consumed(), ROWS + HAND_SIZE * n);

        let mut seen = HashSet::new();
        for r in engine.table().rows() {
            assert_eq!(r.len(), 1);
            assert!(seen.insert(r.cards()[0]));
        }
        for p in 0..n {
            let h = engine.hand(p).unwrap();
            assert_eq!(h.len(), HAND_SIZE);
            assert!(h.cards().windows(2).all(|w| w[0] < w[1]), "hand {} not sorted", p);
            for &c in h.cards() {
                assert!(seen.insert(c), "card {} dealt twice", c);
            }
        }
        assert_eq!(seen.len(), ROWS + HAND_SIZE * n);
    }
}

#[test]
fn test_same_seed_same_game() {
    let a = started(4, 77);
    let b = started(4, 77);
    assert_eq!(a.table(), b.table());
    for p in 0..4 {
        assert_eq!(a.hand(p), b.hand(p));
    }
    assert_ne!(started(4, 78).table(), a.table());
}

#[test]
fn test_two_player_scenario() {
    // Row 2 holds five cards ending in 50: 1 + 1 + 1 + 1 + 3 bulls.
    let mut engine = RoundEngine::with_layout(
        [row(&[1]), row(&[46, 47, 48, 49, 50]), row(&[20]), row(&[30])],
        vec![hand(&[2, 60]), hand(&[51, 70])],
    )
    .unwrap();

    engine.play_card(0, card(2)).unwrap();
    engine.play_card(1, card(51)).unwrap();
    assert_eq!(engine.resolution_order(), vec![0, 1]);

    let a = engine.place_card(0, card(2), None).unwrap();
    assert_eq!(a, Placement::Appended { row: 0 });
    assert_eq!(engine.table().rows()[0].cards(), &[card(1), card(2)]);

    let b = engine.place_card(1, card(51), None).unwrap();
    assert_eq!(b, Placement::Took { row: 1, bulls: 7 });
    assert_eq!(b.taken_row(), Some(1));
    assert_eq!(engine.table().rows()[1].cards(), &[card(51)]);

    assert_eq!(engine.scores(), &[0, 7]);
}

#[test]
fn test_forced_take_fallback_ties_to_lowest_index() {
    // Bulls per row: 2, 1, 1, 3. Rows 2 and 3 tie; row 2 wins.
    let layout = || {
        RoundEngine::with_layout(
            [row(&[25]), row(&[31]), row(&[42]), row(&[60])],
            vec![hand(&[3]), hand(&[4])],
        )
        .unwrap()
    };

    let mut engine = layout();
    assert!(engine.needs_row_choice(card(3)));
    let placement = engine.place_card(0, card(3), None).unwrap();
    assert_eq!(placement, Placement::Took { row: 1, bulls: 1 });
    assert_eq!(engine.table().rows()[1].cards(), &[card(3)]);

    let mut engine = layout();
    let placement = engine.place_card(0, card(3), Some(3)).unwrap();
    assert_eq!(placement, Placement::Took { row: 3, bulls: 3 });
}

#[test]
fn test_card_equal_to_smallest_last_forces_take() {
    let engine = RoundEngine::with_layout(
        [row(&[25]), row(&[31]), row(&[42]), row(&[60])],
        vec![hand(&[26]), hand(&[4])],
    )
    .unwrap();
    assert!(engine.needs_row_choice(card(24)));
    assert!(!engine.needs_row_choice(card(26)));
}

#[test]
fn test_resolution_order_ignores_play_order() {
    let mut engine = RoundEngine::with_layout(
        [row(&[1]), row(&[20]), row(&[40]), row(&[60])],
        vec![hand(&[7, 90]), hand(&[3, 91]), hand(&[15, 92])],
    )
    .unwrap();
    engine.play_card(2, card(15)).unwrap();
    engine.play_card(1, card(3)).unwrap();
    engine.play_card(0, card(7)).unwrap();
    assert_eq!(engine.resolution_order(), vec![1, 0, 2]);
}

#[test]
fn test_rejected_plays_leave_state_untouched() {
    let mut engine = started(2, 3);
    let before = engine.hand(0).unwrap().clone();
    let foreign = engine.hand(1).unwrap().lowest().unwrap();

    assert_eq!(
        engine.play_card(0, foreign),
        Err(EngineError::CardNotInHand { player: 0, card: foreign })
    );
    assert_eq!(engine.hand(0), Some(&before));
    assert_eq!(engine.played(0), None);
    assert!(!engine.hand_remove(0, foreign));
}

#[test]
fn test_counters_only_move_forward() {
    let mut engine = started(3, 21);
    let mut last = (engine.round(), engine.turn());
    let mut last_scores = engine.scores().to_vec();

    while !engine.game_over(u32::MAX) {
        for p in 0..3 {
            let c = engine.hand(p).unwrap().lowest().unwrap();
            engine.play_card(p, c).unwrap();
        }
        for p in engine.resolution_order() {
            let c = engine.played(p).unwrap();
            engine.place_card(p, c, None).unwrap();
        }
        let advance = engine.end_turn();

        let now = (engine.round(), engine.turn());
        assert!(now > last, "{:?} did not move past {:?}", now, last);
        if let TurnAdvance::NewRound(round) = advance {
            assert_eq!(now, (round, 1));
        }
        for (old, new) in last_scores.iter().zip(engine.scores()) {
            assert!(new >= old);
        }
        last = now;
        last_scores = engine.scores().to_vec();
    }
    // 3 players use 34 cards a round: three rounds fit in the deck.
    assert!(engine.is_finished());
    assert_eq!(engine.round(), 4);
}

#[test]
fn test_bulls_are_conserved() {
    // Every bull a player scores came off the table.
    let mut engine = started(5, 8);
    let table_bulls = |e: &RoundEngine| -> u32 { e.table().cards().map(|c| c.bulls() as u32).sum() };
    for _ in 0..HAND_SIZE {
        let before: u32 = table_bulls(&engine) + engine.scores().iter().sum::<u32>();
        let mut played = 0;
        for p in 0..5 {
            let c = engine.hand(p).unwrap().lowest().unwrap();
            played += c.bulls() as u32;
            engine.play_card(p, c).unwrap();
        }
        for p in engine.resolution_order() {
            let c = engine.played(p).unwrap();
            engine.place_card(p, c, None).unwrap();
        }
        let after: u32 = table_bulls(&engine) + engine.scores().iter().sum::<u32>();
        assert_eq!(after, before + played);
        if engine.end_turn() != TurnAdvance::NextTurn {
            break;
        }
    }
}
