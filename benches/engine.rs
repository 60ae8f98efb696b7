use criterion::{black_box, criterion_group, criterion_main, Criterion};
use take_six::core::{RoundEngine, Table};
use take_six::types::{Card, SCORE_LIMIT};

/// Play one game where everybody plays their lowest card. Returns the turns played.
fn simulate_game(nplayers: usize, seed: u64) -> u32 {
    let mut engine = RoundEngine::new(nplayers, seed).unwrap();
    engine.setup_rows().unwrap();
    engine.deal().unwrap();

    let mut turns = 0;
    while !engine.game_over(SCORE_LIMIT) {
        for player in 0..nplayers {
            let card = engine.hand(player).and_then(|h| h.lowest()).unwrap();
            engine.play_card(player, card).unwrap();
        }
        for player in engine.resolution_order() {
            let card = engine.played(player).unwrap();
            engine.place_card(player, card, None).unwrap();
        }
        engine.end_turn();
        turns += 1;
    }
    turns
}

fn bench_full_game(c: &mut Criterion) {
    let mut seed = 0u64;
    c.bench_function("full_game_4_players", |b| {
        b.iter(|| {
            seed += 1;
            simulate_game(black_box(4), seed)
        })
    });
}

fn bench_ten_player_round(c: &mut Criterion) {
    c.bench_function("full_game_10_players", |b| {
        b.iter(|| simulate_game(black_box(10), 42))
    });
}

fn bench_best_fit(c: &mut Criterion) {
    let mut engine = RoundEngine::new(2, 7).unwrap();
    engine.setup_rows().unwrap();
    let table: Table = engine.table().clone();

    c.bench_function("best_fit_all_cards", |b| {
        b.iter(|| {
            Card::all()
                .filter_map(|card| table.best_fit(black_box(card)))
                .count()
        })
    });
}

fn bench_shuffle(c: &mut Criterion) {
    c.bench_function("new_engine_shuffle", |b| {
        b.iter(|| RoundEngine::new(4, black_box(99)).unwrap())
    });
}

criterion_group!(
    benches,
    bench_full_game,
    bench_ten_player_round,
    bench_best_fit,
    bench_shuffle
);
criterion_main!(benches);
