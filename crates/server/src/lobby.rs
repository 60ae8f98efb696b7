//! Waiting queue
//!
//! Named connections wait here in arrival order until a full table can be
//! seated. The queue and the session-id counter live behind one lock, held
//! only while a player is appended and complete groups are detached.

use std::collections::VecDeque;

use tokio::sync::Mutex;

use crate::connection::PlayerConnection;
use crate::protocol::ServerMessage;

/// A group of players detached from the queue, ready to start a session.
#[derive(Debug)]
pub struct SessionSeed {
    pub id: u64,
    pub players: Vec<PlayerConnection>,
}

#[derive(Debug)]
pub enum Admission {
    /// The player joined the queue. `waiting` is the queue length after any
    /// groups were detached; `sessions` holds those groups in creation order.
    Queued {
        waiting: usize,
        sessions: Vec<SessionSeed>,
    },
    /// The queue is at capacity; the connection is handed back untouched.
    Full(PlayerConnection),
}

#[derive(Debug, Default)]
struct LobbyState {
    waiting: VecDeque<PlayerConnection>,
    last_id: u64,
}

#[derive(Debug)]
pub struct Lobby {
    players_per_game: usize,
    capacity: usize,
    state: Mutex<LobbyState>,
}

impl Lobby {
    pub fn new(players_per_game: usize, capacity: usize) -> Self {
        Self {
            players_per_game,
            capacity,
            state: Mutex::new(LobbyState::default()),
        }
    }

    pub fn players_per_game(&self) -> usize {
        self.players_per_game
    }

    /// Append a player and detach every complete group, oldest first.
    ///
    /// A player left waiting is told how many seats are filled.
    pub async fn admit(&self, conn: PlayerConnection) -> Admission {
        let mut state = self.state.lock().await;
        if state.waiting.len() >= self.capacity {
            return Admission::Full(conn);
        }

        state.waiting.push_back(conn);

        let mut sessions = Vec::new();
        while state.waiting.len() >= self.players_per_game {
            state.last_id += 1;
            let players = state.waiting.drain(..self.players_per_game).collect();
            sessions.push(SessionSeed {
                id: state.last_id,
                players,
            });
        }

        let waiting = state.waiting.len();
        if sessions.is_empty() {
            if let Some(conn) = state.waiting.back() {
                conn.send(&ServerMessage::info(format!(
                    "En attente de joueurs ({}/{})",
                    waiting, self.players_per_game
                )));
            }
        }
        Admission::Queued { waiting, sessions }
    }

    pub async fn waiting(&self) -> usize {
        self.state.lock().await.waiting.len()
    }

    /// Id of the most recently created session (0 before the first).
    pub async fn last_session_id(&self) -> u64 {
        self.state.lock().await.last_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{duplex, AsyncBufReadExt, BufReader, DuplexStream};

    fn player(name: &str) -> (PlayerConnection, DuplexStream) {
        let (client, server) = duplex(1024);
        (PlayerConnection::with_name(server, name), client)
    }

    fn names(seed: &SessionSeed) -> Vec<&str> {
        seed.players.iter().map(PlayerConnection::name).collect()
    }

    #[tokio::test]
    async fn test_groups_form_in_arrival_order() {
        let lobby = Lobby::new(2, 8);
        let mut clients = Vec::new();

        let (a, ca) = player("a");
        clients.push(ca);
        match lobby.admit(a).await {
            Admission::Queued { waiting, sessions } => {
                assert_eq!(waiting, 1);
                assert!(sessions.is_empty());
            }
            Admission::Full(_) => panic!("queue should accept"),
        }

        let (b, cb) = player("b");
        clients.push(cb);
        let Admission::Queued { waiting, sessions } = lobby.admit(b).await else {
            panic!("queue should accept");
        };
        assert_eq!(waiting, 0);
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].id, 1);
        assert_eq!(names(&sessions[0]), ["a", "b"]);

        let (c, cc) = player("c");
        clients.push(cc);
        lobby.admit(c).await;
        let (d, cd) = player("d");
        clients.push(cd);
        let Admission::Queued { sessions, .. } = lobby.admit(d).await else {
            panic!("queue should accept");
        };
        assert_eq!(sessions[0].id, 2);
        assert_eq!(names(&sessions[0]), ["c", "d"]);
        assert_eq!(lobby.last_session_id().await, 2);
    }

    #[tokio::test]
    async fn test_waiting_player_is_told_the_count() {
        let lobby = Lobby::new(3, 8);
        let (a, client) = player("a");
        lobby.admit(a).await;

        let mut lines = BufReader::new(client).lines();
        assert_eq!(
            lines.next_line().await.unwrap().as_deref(),
            Some("INFO En attente de joueurs (1/3)")
        );
    }

    #[tokio::test]
    async fn test_full_queue_hands_connection_back() {
        let lobby = Lobby::new(3, 1);
        let (a, _ca) = player("a");
        let (b, _cb) = player("b");
        assert!(matches!(lobby.admit(a).await, Admission::Queued { .. }));
        match lobby.admit(b).await {
            Admission::Full(conn) => assert_eq!(conn.name(), "b"),
            Admission::Queued { .. } => panic!("queue is at capacity"),
        }
        assert_eq!(lobby.waiting().await, 1);
    }
}
