//! Player connection
//!
//! Wraps one client stream as a line channel. Reads go through a buffered
//! line reader owned by whoever drives the player (the lobby, then a session).
//! Lines are capped at `LINE_MAX` bytes and decoded lossily.
//! Writes are queued on an unbounded channel and flushed by a dedicated
//! writer task, so sending never blocks the caller.

use std::io;

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::protocol::ServerMessage;
use crate::types::{LINE_MAX, PLAYER_NAME_MAX};

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("connection closed by peer")]
    Closed,

    #[error("read failed: {0}")]
    Io(#[from] io::Error),

    #[error("no reply before the deadline")]
    TimedOut,

    /// The peer sent more than `LINE_MAX` bytes before a newline. The rest of
    /// that line is discarded and the connection stays usable.
    #[error("line longer than {} bytes", LINE_MAX)]
    LineTooLong,
}

impl ConnectionError {
    /// True when the peer is gone or silent; false for a bad line on a live connection.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ConnectionError::LineTooLong)
    }
}

type Reader = BufReader<Box<dyn AsyncRead + Send + Unpin>>;

/// One line as read off the wire, before decoding.
#[derive(Debug, Default)]
struct RawLine {
    bytes: Vec<u8>,
    overflowed: bool,
}

pub struct PlayerConnection {
    name: String,
    reader: Reader,
    /// Bytes of the line being read. Kept here so a cancelled read loses nothing.
    pending: RawLine,
    tx: mpsc::UnboundedSender<String>,
    writer: JoinHandle<()>,
}

impl PlayerConnection {
    /// Split `stream` and spawn its writer task. Must be called inside a tokio runtime.
    pub fn new<S>(stream: S) -> Self
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let (reader, mut writer) = tokio::io::split(stream);
        let reader: Box<dyn AsyncRead + Send + Unpin> = Box::new(reader);
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();

        let writer = tokio::spawn(async move {
            while let Some(line) = rx.recv().await {
                if writer.write_all(line.as_bytes()).await.is_err() {
                    break;
                }
                if writer.write_all(b"\n").await.is_err() {
                    break;
                }
                if writer.flush().await.is_err() {
                    break;
                }
            }
            let _ = writer.shutdown().await;
        });

        Self {
            name: String::new(),
            reader: BufReader::new(reader),
            pending: RawLine::default(),
            tx,
            writer,
        }
    }

    /// A connection whose display name is already known.
    pub fn with_name<S>(stream: S, name: impl Into<String>) -> Self
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let mut conn = Self::new(stream);
        conn.name = truncate_name(&name.into());
        conn
    }

    /// Read the first line as the display name: trimmed, at most 31 characters.
    /// An empty name is accepted.
    pub async fn handshake(&mut self) -> Result<&str, ConnectionError> {
        let raw = self.read_raw_line().await?.ok_or(ConnectionError::Closed)?;
        self.name = truncate_name(&decode(&raw.bytes));
        Ok(&self.name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Queue one line (without terminator). Lines queued after the peer went
    /// away are dropped; the loss shows up on the next read.
    pub fn send_line(&self, line: impl Into<String>) {
        let _ = self.tx.send(line.into());
    }

    pub fn send(&self, msg: &ServerMessage) {
        self.send_line(msg.to_string());
    }

    /// Next line with the terminator and any trailing CR stripped. Invalid
    /// UTF-8 is replaced, not rejected; the reply parser deals with it.
    ///
    /// Cancel safe: dropping the future before it completes loses no data.
    pub async fn recv_line(&mut self) -> Result<String, ConnectionError> {
        let raw = self.read_raw_line().await?.ok_or(ConnectionError::Closed)?;
        if raw.overflowed {
            return Err(ConnectionError::LineTooLong);
        }
        Ok(decode(&raw.bytes))
    }

    /// Read up to the next newline, keeping at most `LINE_MAX` bytes of it.
    /// Returns None at end of stream with nothing pending.
    async fn read_raw_line(&mut self) -> io::Result<Option<RawLine>> {
        loop {
            let available = self.reader.fill_buf().await?;
            if available.is_empty() {
                if self.pending.bytes.is_empty() && !self.pending.overflowed {
                    return Ok(None);
                }
                return Ok(Some(std::mem::take(&mut self.pending)));
            }

            let newline = available.iter().position(|&b| b == b'\n');
            let chunk = &available[..newline.unwrap_or(available.len())];
            let room = LINE_MAX.saturating_sub(self.pending.bytes.len());
            if chunk.len() > room {
                self.pending.overflowed = true;
            }
            self.pending
                .bytes
                .extend_from_slice(&chunk[..chunk.len().min(room)]);

            match newline {
                Some(index) => {
                    self.reader.consume(index + 1);
                    return Ok(Some(std::mem::take(&mut self.pending)));
                }
                None => {
                    let used = available.len();
                    self.reader.consume(used);
                }
            }
        }
    }

    /// Like [`recv_line`](Self::recv_line), failing with `TimedOut` once `deadline` passes.
    pub async fn recv_line_until(
        &mut self,
        deadline: Option<Instant>,
    ) -> Result<String, ConnectionError> {
        match deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, self.recv_line())
                .await
                .map_err(|_| ConnectionError::TimedOut)?,
            None => self.recv_line().await,
        }
    }

    /// Flush every queued line, then shut the stream down.
    pub async fn close(self) {
        let Self { tx, writer, .. } = self;
        drop(tx);
        let _ = writer.await;
    }
}

impl std::fmt::Debug for PlayerConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerConnection")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

fn decode(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .trim_end_matches('\r')
        .to_string()
}

fn truncate_name(raw: &str) -> String {
    raw.trim().chars().take(PLAYER_NAME_MAX - 1).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{duplex, AsyncReadExt};

    #[tokio::test]
    async fn test_handshake_trims_and_truncates() {
        let (client, server) = duplex(1024);
        let mut conn = PlayerConnection::new(server);
        let (_read, mut write) = tokio::io::split(client);

        let long = "x".repeat(50);
        write
            .write_all(format!("  {}  \r\n", long).as_bytes())
            .await
            .unwrap();
        let name = conn.handshake().await.unwrap().to_string();
        assert_eq!(name.len(), PLAYER_NAME_MAX - 1);
        assert_eq!(conn.name(), name);
    }

    #[tokio::test]
    async fn test_empty_name_is_accepted() {
        let (client, server) = duplex(1024);
        let mut conn = PlayerConnection::new(server);
        let (_read, mut write) = tokio::io::split(client);
        write.write_all(b"\n").await.unwrap();
        assert_eq!(conn.handshake().await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_send_then_close_flushes_lines() {
        let (client, server) = duplex(1024);
        let conn = PlayerConnection::with_name(server, "alice");
        conn.send(&ServerMessage::RequestCard);
        conn.send_line("INFO bonjour");
        conn.close().await;

        let mut received = String::new();
        let (mut read, _write) = tokio::io::split(client);
        read.read_to_string(&mut received).await.unwrap();
        assert_eq!(received, "DEMANDE_CARTE\nINFO bonjour\n");
    }

    #[tokio::test]
    async fn test_recv_line_reports_closed_on_eof() {
        let (client, server) = duplex(1024);
        let mut conn = PlayerConnection::new(server);
        drop(client);
        assert!(matches!(conn.recv_line().await, Err(ConnectionError::Closed)));
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_replaced() {
        let (client, server) = duplex(1024);
        let mut conn = PlayerConnection::new(server);
        let (_read, mut write) = tokio::io::split(client);
        write.write_all(b"JOUER \xff\r\nJOUER 5\n").await.unwrap();

        assert_eq!(conn.recv_line().await.unwrap(), "JOUER \u{FFFD}");
        assert_eq!(conn.recv_line().await.unwrap(), "JOUER 5");
    }

    #[tokio::test]
    async fn test_overlong_line_is_rejected_and_skipped() {
        let (client, server) = duplex(64 * 1024);
        let mut conn = PlayerConnection::new(server);
        let (_read, mut write) = tokio::io::split(client);

        let long = "9".repeat(LINE_MAX + 500);
        write
            .write_all(format!("{}\nJOUER 7\n", long).as_bytes())
            .await
            .unwrap();

        let err = conn.recv_line().await.unwrap_err();
        assert!(matches!(err, ConnectionError::LineTooLong));
        assert!(!err.is_fatal());
        assert_eq!(conn.recv_line().await.unwrap(), "JOUER 7");
    }

    #[tokio::test]
    async fn test_overlong_name_is_truncated() {
        let (client, server) = duplex(64 * 1024);
        let mut conn = PlayerConnection::new(server);
        let (_read, mut write) = tokio::io::split(client);

        let long = "a".repeat(LINE_MAX * 3);
        write
            .write_all(format!("{}\nJOUER 7\n", long).as_bytes())
            .await
            .unwrap();

        assert_eq!(conn.handshake().await.unwrap(), "a".repeat(PLAYER_NAME_MAX - 1));
        assert_eq!(conn.recv_line().await.unwrap(), "JOUER 7");
    }

    #[tokio::test]
    async fn test_partial_line_at_eof_is_returned() {
        let (client, server) = duplex(1024);
        let mut conn = PlayerConnection::new(server);
        let (read, mut write) = tokio::io::split(client);
        write.write_all(b"JOUER 3").await.unwrap();
        drop(write);
        drop(read);

        assert_eq!(conn.recv_line().await.unwrap(), "JOUER 3");
        assert!(matches!(conn.recv_line().await, Err(ConnectionError::Closed)));
    }

    #[tokio::test]
    async fn test_recv_line_until_deadline() {
        let (_client, server) = duplex(1024);
        let mut conn = PlayerConnection::new(server);
        let deadline = Instant::now() + std::time::Duration::from_millis(20);
        assert!(matches!(
            conn.recv_line_until(Some(deadline)).await,
            Err(ConnectionError::TimedOut)
        ));
    }
}
