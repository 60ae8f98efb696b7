//! TCP server and session orchestration
//!
//! The accept loop hands every connection to its own task, which reads the
//! player's name and admits them to the [`Lobby`]. Each complete group
//! becomes a [`Session`] running in a task of its own; sessions share nothing
//! with the accept loop or with each other.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tokio::sync::{oneshot, Semaphore};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::ServerConfig;
use crate::connection::PlayerConnection;
use crate::core::{EngineError, RoundEngine};
use crate::game_log::GameLog;
use crate::lobby::{Admission, Lobby, SessionSeed};
use crate::protocol::{ServerMessage, SERVER_FULL};
use crate::session::{Session, SessionOptions, SessionOutcome};

/// Fail early with a clear error if `host:port` cannot be bound.
pub fn check_tcp_listen_available(host: &str, port: u16) -> std::io::Result<()> {
    std::net::TcpListener::bind((host, port)).map(drop)
}

/// Validate the configuration, bind, and serve until the listener fails.
///
/// `ready_tx` receives the bound address once the socket is listening
/// (useful with port 0).
pub async fn run_server(
    config: ServerConfig,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    config.validate()?;

    let listener = TcpListener::bind(config.bind_addr()).await?;
    let bound = listener.local_addr()?;
    info!(
        addr = %bound,
        players_per_game = config.players_per_game,
        "listening"
    );
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    serve(listener, config).await
}

/// Accept connections forever on an already-bound listener.
pub async fn serve(listener: TcpListener, config: ServerConfig) -> anyhow::Result<()> {
    let orchestrator = Arc::new(Orchestrator::new(config));

    loop {
        let (socket, addr) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(err) => {
                warn!(error = %err, "accept failed");
                tokio::time::sleep(Duration::from_millis(100)).await;
                continue;
            }
        };
        debug!(peer = %addr, "connection accepted");

        let orchestrator = Arc::clone(&orchestrator);
        tokio::spawn(async move {
            orchestrator.handle_connection(socket, addr.to_string()).await;
        });
    }
}

/// Groups waiting players into sessions and runs them.
pub struct Orchestrator {
    config: ServerConfig,
    lobby: Lobby,
    permits: Option<Arc<Semaphore>>,
}

impl Orchestrator {
    pub fn new(config: ServerConfig) -> Self {
        let lobby = Lobby::new(config.players_per_game, config.max_waiting);
        let permits = config.max_sessions.map(|max| Arc::new(Semaphore::new(max)));
        Self {
            config,
            lobby,
            permits,
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn lobby(&self) -> &Lobby {
        &self.lobby
    }

    /// Read the player's name, then admit them. A connection that closes
    /// before naming itself is dropped.
    pub async fn handle_connection<S>(
        self: &Arc<Self>,
        stream: S,
        peer: String,
    ) -> Vec<JoinHandle<Option<SessionOutcome>>>
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let mut conn = PlayerConnection::new(stream);
        match conn.handshake().await {
            Ok(name) => info!(peer = %peer, name, "player connected"),
            Err(err) => {
                info!(peer = %peer, error = %err, "connection dropped before sending a name");
                conn.close().await;
                return Vec::new();
            }
        }
        self.admit(conn).await
    }

    /// Queue a named player and start every session that became complete.
    pub async fn admit(
        self: &Arc<Self>,
        conn: PlayerConnection,
    ) -> Vec<JoinHandle<Option<SessionOutcome>>> {
        match self.lobby.admit(conn).await {
            Admission::Full(conn) => {
                warn!(name = conn.name(), "waiting queue full, turning player away");
                conn.send(&ServerMessage::info(SERVER_FULL));
                conn.close().await;
                Vec::new()
            }
            Admission::Queued { waiting, sessions } => {
                debug!(waiting, "player queued");
                sessions
                    .into_iter()
                    .map(|seed| self.spawn_session(seed))
                    .collect()
            }
        }
    }

    fn spawn_session(self: &Arc<Self>, seed: SessionSeed) -> JoinHandle<Option<SessionOutcome>> {
        info!(session = seed.id, players = seed.players.len(), "game created");
        let this = Arc::clone(self);
        tokio::spawn(async move {
            let _permit = match &this.permits {
                Some(permits) => match Arc::clone(permits).acquire_owned().await {
                    Ok(permit) => Some(permit),
                    Err(_) => return None,
                },
                None => None,
            };
            this.run_session(seed).await
        })
    }

    async fn run_session(&self, seed: SessionSeed) -> Option<SessionOutcome> {
        let SessionSeed { id, players } = seed;

        let engine = match start_engine(players.len(), self.config.session_seed(id)) {
            Ok(engine) => engine,
            Err(err) => {
                error!(session = id, error = %err, "could not start game");
                join_all(players.into_iter().map(PlayerConnection::close)).await;
                return None;
            }
        };

        let options = SessionOptions {
            score_limit: self.config.score_limit,
            read_timeout: self.config.read_timeout,
        };
        let mut session = match Session::new(id, engine, players, options) {
            Ok(session) => session,
            Err(err) => {
                error!(session = id, error = %err, "could not seat players");
                return None;
            }
        };

        if let Some(dir) = &self.config.log_dir {
            match GameLog::create(dir, id).await {
                Ok(log) => session = session.with_log(log),
                Err(err) => warn!(
                    session = id,
                    dir = %dir.display(),
                    error = %err,
                    "cannot open game log, continuing without it"
                ),
            }
        }

        let outcome = session.run().await;
        match &outcome {
            SessionOutcome::Completed { scores, rounds } => {
                info!(session = id, scores = ?scores, rounds, "game finished")
            }
            SessionOutcome::Aborted { seat, phase } => {
                info!(session = id, seat = seat + 1, phase = ?phase, "game aborted")
            }
        }
        Some(outcome)
    }
}

/// A fresh engine with rows laid and hands dealt.
fn start_engine(nplayers: usize, seed: u64) -> Result<RoundEngine, EngineError> {
    let mut engine = RoundEngine::new(nplayers, seed)?;
    engine.setup_rows()?;
    engine.deal()?;
    Ok(engine)
}
