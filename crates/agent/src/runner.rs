//! Protocol driver for a scripted player.

use std::io;

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::debug;

use take_six_server::{Reply, ServerMessage};

use crate::strategy::Strategy;
use crate::view::PlayerView;

/// Errors after which a bot gives up on its connection.
const MAX_CONSECUTIVE_ERRORS: usize = 3;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("connection failed: {0}")]
    Io(#[from] io::Error),

    #[error("asked for a card with an empty hand")]
    EmptyHand,

    #[error("server kept rejecting replies: {0}")]
    Rejected(String),
}

/// How a game went from one player's side.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameSummary {
    pub game_id: Option<u64>,
    /// Last score line seen.
    pub scores: Vec<u32>,
    /// Final standings text, if the game ran to its end.
    pub standings: Option<String>,
    /// Every `INFO` text received.
    pub infos: Vec<String>,
    pub cards_played: usize,
    pub rows_chosen: usize,
    pub errors: usize,
    /// An `ERREUR` text that no later reply settled.
    pub last_error: Option<String>,
}

impl GameSummary {
    pub fn completed(&self) -> bool {
        self.standings.is_some()
    }

    /// True if the server turned the player away with a full queue.
    pub fn rejected(&self) -> bool {
        self.infos.iter().any(|text| text.starts_with("Serveur complet"))
    }
}

/// Send `name`, then answer every prompt with `strategy` until the server
/// closes the connection.
pub async fn play<S, T>(stream: S, name: &str, strategy: &mut T) -> Result<GameSummary, AgentError>
where
    S: AsyncRead + AsyncWrite,
    T: Strategy + ?Sized,
{
    let (reader, mut writer) = tokio::io::split(stream);
    let mut lines = BufReader::new(reader).lines();

    writer.write_all(format!("{}\n", name).as_bytes()).await?;
    writer.flush().await?;

    let mut view = PlayerView::new();
    let mut summary = GameSummary::default();
    let mut consecutive_errors = 0;

    while let Some(line) = lines.next_line().await? {
        let msg: ServerMessage = match line.parse() {
            Ok(msg) => msg,
            Err(err) => {
                debug!(line = %line, error = %err, "ignoring line");
                continue;
            }
        };
        view.apply(&msg);

        let reply = match msg {
            ServerMessage::RequestCard => {
                let card = strategy.choose_card(&view).ok_or(AgentError::EmptyHand)?;
                view.remove_card(card);
                summary.cards_played += 1;
                Reply::Play(card)
            }
            ServerMessage::RequestRow => {
                summary.rows_chosen += 1;
                Reply::Row(strategy.choose_row(&view))
            }
            ServerMessage::Error(text) => {
                summary.errors += 1;
                consecutive_errors += 1;
                if consecutive_errors >= MAX_CONSECUTIVE_ERRORS {
                    return Err(AgentError::Rejected(text));
                }
                continue;
            }
            ServerMessage::Info(text) => {
                if text.starts_with("Fin de la partie") {
                    summary.standings = Some(text);
                }
                continue;
            }
            ServerMessage::Scores(_) => {
                consecutive_errors = 0;
                continue;
            }
            ServerMessage::Table(_) | ServerMessage::Hand(_) => continue,
        };

        debug!(reply = %reply, "answering prompt");
        writer.write_all(format!("{}\n", reply).as_bytes()).await?;
        writer.flush().await?;
        view.answered();
    }

    summary.game_id = view.game_id;
    summary.scores = view.scores;
    summary.infos = view.infos;
    summary.last_error = view.last_error;
    Ok(summary)
}
