//! Turn coordinator - one running game
//!
//! A session owns its players' connections and one [`RoundEngine`], and
//! cycles through four phases until the game ends:
//!
//! ```text
//! AwaitPlays -> ResolveRows -> ScoreBroadcast -> AwaitPlays | End
//! ```
//!
//! - **AwaitPlays**: broadcast the table, send every hand and a card prompt,
//!   then wait on all players that still owe a card at once. Replies are
//!   handled in arrival order; a bad one earns an error and a fresh prompt.
//! - **ResolveRows**: place the cards in ascending order. A card below every
//!   row makes its player choose the row to take before anything else moves.
//! - **ScoreBroadcast**: send the scores, advance the turn (dealing a new
//!   round when hands are empty) and check for the end of the game.
//! - **End**: send the final standings and release every connection.
//!
//! A failed read anywhere ends the session at once. The turn in progress is
//! abandoned and the remaining players are told who left. A line with invalid
//! UTF-8 or over `LINE_MAX` bytes is not a failed read, only a bad reply.

use std::time::Duration;

use futures::future::{join_all, select_all};
use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::connection::{ConnectionError, PlayerConnection};
use crate::core::{EngineError, Placement, RoundEngine, TurnAdvance};
use crate::game_log::{GameEvent, GameLog};
use crate::protocol::{parse_play, parse_row_choice, ServerMessage, INVALID_CARD, INVALID_ROW};
use crate::types::SCORE_LIMIT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    AwaitPlays,
    ResolveRows,
    ScoreBroadcast,
    End,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The game reached its end. `rounds` counts the rounds actually played.
    Completed { scores: Vec<u32>, rounds: u32 },
    /// The player at `seat` went away during `phase`.
    Aborted { seat: usize, phase: Phase },
}

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub score_limit: u32,
    pub read_timeout: Option<Duration>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            score_limit: SCORE_LIMIT,
            read_timeout: None,
        }
    }
}

#[derive(Debug)]
struct Disconnect {
    seat: usize,
    phase: Phase,
    error: ConnectionError,
}

pub struct Session {
    id: u64,
    engine: RoundEngine,
    seats: Vec<PlayerConnection>,
    options: SessionOptions,
    log: Option<GameLog>,
}

impl Session {
    /// Seat `players` in order at a started engine (rows laid, hands dealt).
    pub fn new(
        id: u64,
        engine: RoundEngine,
        players: Vec<PlayerConnection>,
        options: SessionOptions,
    ) -> Result<Self, EngineError> {
        if players.len() != engine.nplayers() {
            return Err(EngineError::InvalidPlayerCount(players.len()));
        }
        Ok(Self {
            id,
            engine,
            seats: players,
            options,
            log: None,
        })
    }

    pub fn with_log(mut self, log: GameLog) -> Self {
        self.log = Some(log);
        self
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Play the game to its end, then close every connection.
    pub async fn run(self) -> SessionOutcome {
        let span = info_span!("session", id = self.id);
        self.drive().instrument(span).await
    }

    async fn drive(mut self) -> SessionOutcome {
        let players: Vec<String> = self.seats.iter().map(|c| c.name().to_string()).collect();
        info!(players = ?players, "game started");
        self.record(GameEvent::SessionStarted {
            session: self.id,
            players,
            seed: self.engine.deck().seed(),
        });
        self.broadcast(&ServerMessage::info(format!("Partie {} demarree.", self.id)));

        let mut phase = if self.game_over() {
            Phase::End
        } else {
            Phase::AwaitPlays
        };

        let outcome = loop {
            let step = match phase {
                Phase::AwaitPlays => self.await_plays().await.map(|()| Phase::ResolveRows),
                Phase::ResolveRows => self.resolve_rows().await.map(|()| Phase::ScoreBroadcast),
                Phase::ScoreBroadcast => Ok(self.score_broadcast()),
                Phase::End => break self.complete(),
            };
            match step {
                Ok(next) => phase = next,
                Err(disconnect) => break self.abort(disconnect),
            }
        };

        self.record(GameEvent::SessionEnded {
            completed: matches!(outcome, SessionOutcome::Completed { .. }),
            scores: self.engine.scores().to_vec(),
        });
        self.shutdown().await;
        outcome
    }

    async fn await_plays(&mut self) -> Result<(), Disconnect> {
        let (round, turn) = (self.engine.round(), self.engine.turn());
        let table = self.engine.table().clone();
        info!(round, turn, table = %table, "turn started");
        self.record(GameEvent::Table {
            round,
            turn,
            table: table.to_string(),
        });
        self.broadcast(&ServerMessage::Table(table));

        for (seat, conn) in self.seats.iter().enumerate() {
            let hand = self
                .engine
                .hand(seat)
                .map(|hand| hand.cards().to_vec())
                .unwrap_or_default();
            conn.send(&ServerMessage::Hand(hand));
            conn.send(&ServerMessage::RequestCard);
        }

        let mut waiting = vec![true; self.seats.len()];
        let mut deadlines = vec![self.deadline(); self.seats.len()];

        while waiting.contains(&true) {
            let (seat, result) = {
                let reads = self
                    .seats
                    .iter_mut()
                    .enumerate()
                    .filter(|(seat, _)| waiting[*seat])
                    .map(|(seat, conn)| {
                        let deadline = deadlines[seat];
                        Box::pin(async move { (seat, conn.recv_line_until(deadline).await) })
                    });
                select_all(reads).await.0
            };

            let line = match result {
                Ok(line) => Ok(line),
                Err(error) if !error.is_fatal() => Err(error.to_string()),
                Err(error) => {
                    return Err(Disconnect {
                        seat,
                        phase: Phase::AwaitPlays,
                        error,
                    })
                }
            };

            let played = line
                .and_then(|line| parse_play(&line).map_err(|err| err.to_string()))
                .and_then(|card| {
                    self.engine
                        .play_card(seat, card)
                        .map(|()| card)
                        .map_err(|err| err.to_string())
                });
            match played {
                Ok(card) => {
                    waiting[seat] = false;
                    info!(seat = seat + 1, name = self.seats[seat].name(), card = card.value(), "card played");
                    self.record(GameEvent::Played {
                        round,
                        turn,
                        seat,
                        card: card.value(),
                    });
                }
                Err(reason) => {
                    debug!(seat = seat + 1, reason = %reason, "play rejected");
                    let conn = &self.seats[seat];
                    conn.send(&ServerMessage::error(INVALID_CARD));
                    conn.send(&ServerMessage::RequestCard);
                    deadlines[seat] = self.deadline();
                }
            }
        }
        Ok(())
    }

    async fn resolve_rows(&mut self) -> Result<(), Disconnect> {
        let (round, turn) = (self.engine.round(), self.engine.turn());

        for seat in self.engine.resolution_order() {
            let Some(card) = self.engine.played(seat) else {
                continue;
            };

            let chosen = if self.engine.needs_row_choice(card) {
                debug!(seat = seat + 1, card = card.value(), "row choice needed");
                Some(self.ask_row(seat).await?)
            } else {
                None
            };

            match self.engine.place_card(seat, card, chosen) {
                Ok(Placement::Took { row, bulls }) => {
                    let name = self.seats[seat].name().to_string();
                    info!(seat = seat + 1, name = %name, row = row + 1, bulls, "row taken");
                    self.record(GameEvent::RowTaken {
                        round,
                        turn,
                        seat,
                        row: row + 1,
                        bulls,
                    });
                    self.broadcast(&ServerMessage::info(format!(
                        "{} ramasse la rangee {} (+{})",
                        name,
                        row + 1,
                        bulls
                    )));
                }
                Ok(Placement::Appended { row }) => {
                    debug!(seat = seat + 1, card = card.value(), row = row + 1, "card placed");
                }
                Err(err) => error!(seat = seat + 1, error = %err, "placement failed"),
            }
        }
        Ok(())
    }

    /// Prompt one player until they name a valid row. Returns the zero-based index.
    async fn ask_row(&mut self, seat: usize) -> Result<usize, Disconnect> {
        loop {
            self.seats[seat].send(&ServerMessage::RequestRow);
            let deadline = self.deadline();
            let chosen = match self.seats[seat].recv_line_until(deadline).await {
                Ok(line) => parse_row_choice(&line).map_err(|err| err.to_string()),
                Err(error) if !error.is_fatal() => Err(error.to_string()),
                Err(error) => {
                    return Err(Disconnect {
                        seat,
                        phase: Phase::ResolveRows,
                        error,
                    })
                }
            };

            match chosen {
                Ok(row) => {
                    info!(seat = seat + 1, row = row + 1, "row chosen");
                    self.record(GameEvent::RowChosen {
                        round: self.engine.round(),
                        turn: self.engine.turn(),
                        seat,
                        row: row + 1,
                    });
                    return Ok(row);
                }
                Err(reason) => {
                    debug!(seat = seat + 1, reason = %reason, "row choice rejected");
                    self.seats[seat].send(&ServerMessage::error(INVALID_ROW));
                }
            }
        }
    }

    fn score_broadcast(&mut self) -> Phase {
        let scores = self.engine.scores().to_vec();
        info!(round = self.engine.round(), turn = self.engine.turn(), scores = ?scores, "turn scored");
        self.record(GameEvent::Scores {
            round: self.engine.round(),
            turn: self.engine.turn(),
            scores: scores.clone(),
        });
        self.broadcast(&ServerMessage::Scores(scores));

        let advance = self.engine.end_turn();
        if self.game_over() {
            if advance == TurnAdvance::Exhausted {
                info!("deck exhausted");
            }
            return Phase::End;
        }
        if let TurnAdvance::NewRound(round) = advance {
            info!(round, "new round dealt");
            self.record(GameEvent::NewRound { round });
            self.broadcast(&ServerMessage::info(format!("Manche {}", round)));
        }
        Phase::AwaitPlays
    }

    fn complete(&self) -> SessionOutcome {
        let scores = self.engine.scores().to_vec();
        let rounds = rounds_played(&self.engine);
        info!(scores = ?scores, rounds, "game over");
        let names: Vec<&str> = self.seats.iter().map(PlayerConnection::name).collect();
        self.broadcast(&ServerMessage::info(standings(self.id, &names, &scores)));
        SessionOutcome::Completed { scores, rounds }
    }

    fn abort(&self, disconnect: Disconnect) -> SessionOutcome {
        let Disconnect { seat, phase, error } = disconnect;
        let name = self.seats[seat].name().to_string();
        warn!(seat = seat + 1, name = %name, phase = ?phase, error = %error, "player disconnected, ending game");
        self.record(GameEvent::Disconnected {
            seat,
            name: name.clone(),
            phase,
        });

        let notice = ServerMessage::info(format!(
            "Joueur {} ({}) deconnecte. Fin de la partie {}.",
            seat + 1,
            name,
            self.id
        ));
        for (other, conn) in self.seats.iter().enumerate() {
            if other != seat {
                conn.send(&notice);
            }
        }
        SessionOutcome::Aborted { seat, phase }
    }

    async fn shutdown(mut self) {
        join_all(self.seats.drain(..).map(PlayerConnection::close)).await;
        if let Some(log) = self.log.take() {
            log.close().await;
        }
    }

    fn broadcast(&self, msg: &ServerMessage) {
        let line = msg.to_string();
        for conn in &self.seats {
            conn.send_line(line.clone());
        }
    }

    fn record(&self, event: GameEvent) {
        if let Some(log) = &self.log {
            log.record(event);
        }
    }

    fn deadline(&self) -> Option<Instant> {
        self.options.read_timeout.map(|timeout| Instant::now() + timeout)
    }

    fn game_over(&self) -> bool {
        self.engine.game_over(self.options.score_limit)
    }
}

/// Rounds with at least one turn played. After the last turn of a round the
/// engine has already moved its counter to the next one.
fn rounds_played(engine: &RoundEngine) -> u32 {
    if engine.turn() == 1 {
        engine.round().saturating_sub(1)
    } else {
        engine.round()
    }
}

/// Final standings, lowest score first; equal scores keep seat order.
fn standings(id: u64, names: &[&str], scores: &[u32]) -> String {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by_key(|&seat| scores[seat]);

    let mut text = format!("Fin de la partie {}. Classement:", id);
    for (rank, seat) in order.into_iter().enumerate() {
        let name = names.get(seat).copied().unwrap_or("?");
        text.push_str(&format!(" {}. {} ({})", rank + 1, name, scores[seat]));
    }
    text
}
