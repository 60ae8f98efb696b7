//! Server configuration
//!
//! Settings come from three layers: built-in defaults, `TAKE_SIX_*`
//! environment variables, then command-line arguments.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `TAKE_SIX_HOST` | `0.0.0.0` |
//! | `TAKE_SIX_PORT` | `7777` |
//! | `TAKE_SIX_PLAYERS` | `2` |
//! | `TAKE_SIX_MAX_WAITING` | `256` |
//! | `TAKE_SIX_SCORE_LIMIT` | `66` |
//! | `TAKE_SIX_SEED` | random |
//! | `TAKE_SIX_READ_TIMEOUT_SECS` | none |
//! | `TAKE_SIX_MAX_SESSIONS` | none |
//! | `TAKE_SIX_LOG_DIR` | none |

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use thiserror::Error;

use crate::types::{MAX_PLAYERS, MAX_WAITING, MIN_PLAYERS, SCORE_LIMIT};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("players per game must be between 2 and 10, got {0}")]
    PlayerCount(usize),

    #[error("waiting queue of {max_waiting} cannot seat a game of {players}")]
    QueueTooSmall { max_waiting: usize, players: usize },

    #[error("score limit must be positive")]
    ZeroScoreLimit,

    #[error("max sessions must be positive when set")]
    ZeroMaxSessions,

    #[error("read timeout must be positive when set")]
    ZeroReadTimeout,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub players_per_game: usize,
    pub max_waiting: usize,
    pub score_limit: u32,
    /// Base seed; session `k` shuffles with `seed + k`. None draws from entropy.
    pub seed: Option<u64>,
    /// Per-prompt reply deadline. None waits forever.
    pub read_timeout: Option<Duration>,
    /// Cap on concurrently running sessions. None is unbounded.
    pub max_sessions: Option<usize>,
    /// Directory for per-session game logs. None disables them.
    pub log_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 7777,
            players_per_game: 2,
            max_waiting: MAX_WAITING,
            score_limit: SCORE_LIMIT,
            seed: None,
            read_timeout: None,
            max_sessions: None,
            log_dir: None,
        }
    }
}

impl ServerConfig {
    /// Defaults overridden by `TAKE_SIX_*` variables. Unparseable values are ignored.
    pub fn from_env() -> Self {
        use std::env;

        fn parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
            env::var(key).ok().and_then(|s| s.trim().parse().ok())
        }

        let defaults = Self::default();
        let host = env::var("TAKE_SIX_HOST")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.host);

        let log_dir = env::var("TAKE_SIX_LOG_DIR")
            .ok()
            .map(|s| s.trim().to_string())
            .and_then(|s| if s.is_empty() { None } else { Some(PathBuf::from(s)) });

        Self {
            host,
            port: parsed("TAKE_SIX_PORT").unwrap_or(defaults.port),
            players_per_game: parsed("TAKE_SIX_PLAYERS").unwrap_or(defaults.players_per_game),
            max_waiting: parsed("TAKE_SIX_MAX_WAITING").unwrap_or(defaults.max_waiting),
            score_limit: parsed("TAKE_SIX_SCORE_LIMIT").unwrap_or(defaults.score_limit),
            seed: parsed("TAKE_SIX_SEED"),
            read_timeout: parsed("TAKE_SIX_READ_TIMEOUT_SECS").map(Duration::from_secs),
            max_sessions: parsed("TAKE_SIX_MAX_SESSIONS"),
            log_dir,
        }
    }

    /// Apply command-line overrides on top of this configuration.
    pub fn with_args(mut self, args: &Args) -> Self {
        self.port = args.port;
        self.players_per_game = args.players;
        if let Some(host) = &args.host {
            self.host = host.clone();
        }
        if let Some(seed) = args.seed {
            self.seed = Some(seed);
        }
        if let Some(max_waiting) = args.max_waiting {
            self.max_waiting = max_waiting;
        }
        if let Some(limit) = args.score_limit {
            self.score_limit = limit;
        }
        if let Some(secs) = args.read_timeout {
            self.read_timeout = Some(Duration::from_secs(secs));
        }
        if let Some(max) = args.max_sessions {
            self.max_sessions = Some(max);
        }
        if args.no_game_log {
            self.log_dir = None;
        } else if let Some(dir) = &args.log_dir {
            self.log_dir = Some(dir.clone());
        } else if self.log_dir.is_none() {
            self.log_dir = Some(PathBuf::from("logs"));
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&self.players_per_game) {
            return Err(ConfigError::PlayerCount(self.players_per_game));
        }
        if self.max_waiting < self.players_per_game {
            return Err(ConfigError::QueueTooSmall {
                max_waiting: self.max_waiting,
                players: self.players_per_game,
            });
        }
        if self.score_limit == 0 {
            return Err(ConfigError::ZeroScoreLimit);
        }
        if self.max_sessions == Some(0) {
            return Err(ConfigError::ZeroMaxSessions);
        }
        if self.read_timeout == Some(Duration::ZERO) {
            return Err(ConfigError::ZeroReadTimeout);
        }
        Ok(())
    }

    /// `host:port`, as accepted by `TcpListener::bind`.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Shuffle seed for session `id`.
    pub fn session_seed(&self, id: u64) -> u64 {
        match self.seed {
            Some(seed) => seed.wrapping_add(id),
            None => rand::random(),
        }
    }
}

/// Command-line arguments for `take-six-server`.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Take Six table server", long_about = None)]
pub struct Args {
    /// TCP port to listen on
    pub port: u16,

    /// Players seated at each table (2 to 10)
    pub players: usize,

    /// Bind address
    #[arg(long)]
    pub host: Option<String>,

    /// Base shuffle seed; session k uses seed + k
    #[arg(long)]
    pub seed: Option<u64>,

    /// Capacity of the waiting queue
    #[arg(long)]
    pub max_waiting: Option<usize>,

    /// Score that ends a game
    #[arg(long)]
    pub score_limit: Option<u32>,

    /// Seconds a player has to answer a prompt before being dropped
    #[arg(long)]
    pub read_timeout: Option<u64>,

    /// Maximum sessions running at once
    #[arg(long)]
    pub max_sessions: Option<usize>,

    /// Directory for per-game logs (default: logs)
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Disable per-game logs
    #[arg(long, conflicts_with = "log_dir")]
    pub no_game_log: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,
}
