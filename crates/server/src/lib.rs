//! Take Six table server
//!
//! Runs many independent games of Take Six over a line-based TCP protocol.
//! Players connect, send a name, and wait in a FIFO queue; every time enough
//! players are waiting, the oldest of them are seated at a new table that
//! runs in its own task.
//!
//! # Protocol Overview
//!
//! 1. **Connection**: the client connects and sends its display name on the first line
//! 2. **Waiting**: the server answers `INFO En attente de joueurs (k/N)` until a table is full
//! 3. **Game**: each turn the server sends the table, the player's hand and `DEMANDE_CARTE`;
//!    the player answers with a card (`JOUER 42` or `42`)
//! 4. **Row choice**: a card lower than every row triggers `CHOISIR_RANGEES`;
//!    the player answers with a row number 1 to 4
//! 5. **Scores**: `J1=<score> J2=<score> ...` after every turn
//! 6. **End**: final standings as an `INFO` line, then the server closes the connection
//!
//! A player who disconnects ends their own game only.
//!
//! # Module Structure
//!
//! - [`protocol`]: encoding and decoding of every line
//! - [`connection`]: one player's line channel
//! - [`lobby`]: the waiting queue
//! - [`session`]: the per-game turn coordinator
//! - [`server`]: accept loop and session fan-out
//! - [`game_log`]: per-game JSON lines log
//! - [`config`], [`logging`]: process setup

pub mod config;
pub mod connection;
pub mod game_log;
pub mod lobby;
pub mod logging;
pub mod protocol;
pub mod server;
pub mod session;

pub use take_six_core as core;
pub use take_six_types as types;

pub use config::{Args, ConfigError, ServerConfig};
pub use connection::{ConnectionError, PlayerConnection};
pub use protocol::{parse_play, parse_row_choice, ProtocolError, Reply, ServerMessage};
pub use server::{check_tcp_listen_available, run_server, serve, Orchestrator};
pub use session::{Phase, Session, SessionOptions, SessionOutcome};
