//! Line protocol definitions
//!
//! Every message is one text line. The server sends [`ServerMessage`]s; a
//! player answers prompts with a [`Reply`]. Both directions are encoded with
//! `Display` and decoded with `FromStr` or the reply parsers, so the server and
//! the agents share one codec.
//!
//! ```text
//! INFO Partie 1 demarree.
//! R1: 12 | R2: 40 | R3: 77 | R4: 95 |
//! MAIN 3 17 28 44 51 60 63 81 90 102
//! DEMANDE_CARTE
//! CHOISIR_RANGEES
//! J1=0 J2=5
//! ERREUR Carte invalide
//! ```

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::core::{Row, Table};
use crate::types::{Card, ROWS};

pub const REQUEST_CARD: &str = "DEMANDE_CARTE";
pub const REQUEST_ROW: &str = "CHOISIR_RANGEES";

pub const INVALID_CARD: &str = "Carte invalide";
pub const INVALID_ROW: &str = "Choix de rangee invalide";
pub const SERVER_FULL: &str = "Serveur complet. Reessayez plus tard.";

/// Keywords accepted before the card number.
const PLAY_KEYWORDS: &[&str] = &["JOUER"];
/// Keywords accepted before the row number. `RANGEE` is listed before its
/// prefix `RANGE`.
const ROW_KEYWORDS: &[&str] = &["RANGEE", "RANGE", "PRENDRE"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("malformed reply: {0:?}")]
    MalformedReply(String),

    #[error("no such card: {0}")]
    InvalidCard(i64),

    #[error("no such row: {0}")]
    InvalidRow(i64),

    #[error("unrecognised server line: {0:?}")]
    UnknownMessage(String),

    #[error("malformed table line: {0:?}")]
    MalformedTable(String),

    #[error("malformed score line: {0:?}")]
    MalformedScores(String),
}

/// Server to player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    Info(String),
    Table(Table),
    Hand(Vec<Card>),
    RequestCard,
    RequestRow,
    /// Cumulative scores in seat order.
    Scores(Vec<u32>),
    Error(String),
}

impl ServerMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self::Info(text.into())
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::Error(text.into())
    }

    /// True for the two lines that expect a reply.
    pub fn is_prompt(&self) -> bool {
        matches!(self, Self::RequestCard | Self::RequestRow)
    }
}

impl fmt::Display for ServerMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info(text) => write!(f, "INFO {}", text),
            Self::Table(table) => write!(f, "{}", table),
            Self::Hand(cards) => {
                f.write_str("MAIN")?;
                for card in cards {
                    write!(f, " {}", card)?;
                }
                Ok(())
            }
            Self::RequestCard => f.write_str(REQUEST_CARD),
            Self::RequestRow => f.write_str(REQUEST_ROW),
            Self::Scores(scores) => {
                for (seat, score) in scores.iter().enumerate() {
                    if seat > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "J{}={}", seat + 1, score)?;
                }
                Ok(())
            }
            Self::Error(text) => write!(f, "ERREUR {}", text),
        }
    }
}

impl FromStr for ServerMessage {
    type Err = ProtocolError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line == REQUEST_CARD {
            return Ok(Self::RequestCard);
        }
        if line == REQUEST_ROW {
            return Ok(Self::RequestRow);
        }
        if let Some(text) = strip_word(line, "INFO") {
            return Ok(Self::Info(text.to_string()));
        }
        if let Some(text) = strip_word(line, "ERREUR") {
            return Ok(Self::Error(text.to_string()));
        }
        if let Some(cards) = strip_word(line, "MAIN") {
            return parse_cards(cards)
                .map(Self::Hand)
                .ok_or_else(|| ProtocolError::UnknownMessage(line.to_string()));
        }
        if line.starts_with("R1:") {
            return parse_table(line).map(Self::Table);
        }
        if line.starts_with("J1=") {
            return parse_scores(line).map(Self::Scores);
        }
        Err(ProtocolError::UnknownMessage(line.to_string()))
    }
}

/// `"INFO text"` -> `Some("text")`; also accepts the bare word.
fn strip_word<'a>(line: &'a str, word: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(word)?;
    if rest.is_empty() {
        Some(rest)
    } else {
        rest.strip_prefix(' ')
    }
}

fn parse_cards(text: &str) -> Option<Vec<Card>> {
    text.split_whitespace()
        .map(|token| token.parse::<u8>().ok().and_then(Card::new))
        .collect()
}

fn parse_table(line: &str) -> Result<Table, ProtocolError> {
    let malformed = || ProtocolError::MalformedTable(line.to_string());

    let segments: Vec<&str> = line
        .split('|')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect();
    if segments.len() != ROWS {
        return Err(malformed());
    }

    let mut rows: [Row; ROWS] = Default::default();
    for (index, segment) in segments.iter().enumerate() {
        let label = format!("R{}:", index + 1);
        let cards = segment
            .strip_prefix(label.as_str())
            .and_then(parse_cards)
            .ok_or_else(malformed)?;
        rows[index] = Row::from_cards(&cards).ok_or_else(malformed)?;
    }
    Ok(Table::from_rows(rows))
}

fn parse_scores(line: &str) -> Result<Vec<u32>, ProtocolError> {
    line.split_whitespace()
        .enumerate()
        .map(|(seat, token)| {
            let (label, score) = token.split_once('=')?;
            if label != format!("J{}", seat + 1) {
                return None;
            }
            score.parse().ok()
        })
        .collect::<Option<Vec<u32>>>()
        .ok_or_else(|| ProtocolError::MalformedScores(line.to_string()))
}

/// Player to server, in answer to a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    Play(Card),
    /// Zero-based row index; encoded 1-based.
    Row(usize),
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Play(card) => write!(f, "JOUER {}", card),
            Reply::Row(index) => write!(f, "RANGEE {}", index + 1),
        }
    }
}

/// Reply grammar: optional case-insensitive keyword, optional whitespace,
/// a signed decimal integer, optional trailing whitespace.
fn parse_reply(line: &str, keywords: &[&str]) -> Result<i64, ProtocolError> {
    let malformed = || ProtocolError::MalformedReply(line.to_string());

    let mut rest = line.trim_start();
    for keyword in keywords {
        if let Some(head) = rest.get(..keyword.len()) {
            if head.eq_ignore_ascii_case(keyword) {
                rest = rest[keyword.len()..].trim_start();
                break;
            }
        }
    }

    let number = rest.trim_end();
    let digits = number.strip_prefix(['+', '-']).unwrap_or(number);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }
    number.parse().map_err(|_| malformed())
}

/// Parse an answer to `DEMANDE_CARTE`. Membership in the hand is checked by the caller.
pub fn parse_play(line: &str) -> Result<Card, ProtocolError> {
    let value = parse_reply(line, PLAY_KEYWORDS)?;
    Card::from_i64(value).ok_or(ProtocolError::InvalidCard(value))
}

/// Parse an answer to `CHOISIR_RANGEES` into a zero-based row index.
pub fn parse_row_choice(line: &str) -> Result<usize, ProtocolError> {
    let value = parse_reply(line, ROW_KEYWORDS)?;
    match usize::try_from(value) {
        Ok(row @ 1..=ROWS) => Ok(row - 1),
        _ => Err(ProtocolError::InvalidRow(value)),
    }
}
