//! Per-session event log
//!
//! One JSON object per line in `<dir>/game_<id>.jsonl`, written by a
//! background task so the session never waits on the disk.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::session::Phase;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    SessionStarted {
        session: u64,
        players: Vec<String>,
        seed: Option<u64>,
    },
    Table {
        round: u32,
        turn: u32,
        table: String,
    },
    Played {
        round: u32,
        turn: u32,
        seat: usize,
        card: u8,
    },
    /// `row` is 1-based, as on the wire.
    RowChosen {
        round: u32,
        turn: u32,
        seat: usize,
        row: usize,
    },
    RowTaken {
        round: u32,
        turn: u32,
        seat: usize,
        row: usize,
        bulls: u32,
    },
    Scores {
        round: u32,
        turn: u32,
        scores: Vec<u32>,
    },
    NewRound {
        round: u32,
    },
    Disconnected {
        seat: usize,
        name: String,
        phase: Phase,
    },
    SessionEnded {
        completed: bool,
        scores: Vec<u32>,
    },
}

#[derive(Serialize)]
struct Record<'a> {
    ts: u64,
    #[serde(flatten)]
    event: &'a GameEvent,
}

pub struct GameLog {
    path: PathBuf,
    tx: mpsc::UnboundedSender<GameEvent>,
    writer: JoinHandle<()>,
}

impl GameLog {
    /// Create (or truncate) the log file for `session` under `dir`.
    pub async fn create(dir: &Path, session: u64) -> std::io::Result<Self> {
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(format!("game_{}.jsonl", session));
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)
            .await?;

        let (tx, mut rx) = mpsc::unbounded_channel::<GameEvent>();
        let writer = tokio::spawn(async move {
            let mut buf: Vec<u8> = Vec::with_capacity(512);
            while let Some(event) = rx.recv().await {
                buf.clear();
                let record = Record {
                    ts: current_timestamp_ms(),
                    event: &event,
                };
                if serde_json::to_writer(&mut buf, &record).is_err() {
                    continue;
                }
                buf.push(b'\n');
                if file.write_all(&buf).await.is_err() {
                    break;
                }
            }
            let _ = file.flush().await;
        });

        Ok(Self { path, tx, writer })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn record(&self, event: GameEvent) {
        let _ = self.tx.send(event);
    }

    /// Write out pending events and close the file.
    pub async fn close(self) {
        drop(self.tx);
        let _ = self.writer.await;
    }
}

fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
