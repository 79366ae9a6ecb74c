//! Shared fixtures for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use llm_chess_core::{MoveRequest, Position, ShakmatyEngine};
use llm_chess_server::{ApiError, Envelope, GameSession, MoveApi, MoveService, http};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Starts the move API on an ephemeral port. Returns the API base URL and
/// a handle on the served session.
pub async fn spawn_server() -> (String, GameSession) {
    let session = GameSession::new(ShakmatyEngine);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    let service = MoveService::new(session.clone());
    tokio::spawn(async move {
        let _ = http::serve(listener, service).await;
    });
    (format!("http://{}/api", addr), session)
}

/// A base URL nothing listens on.
pub async fn unreachable_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{}/api", addr)
}

/// Scripted move API. `get_board` replays queued boards and then repeats
/// the last one.
#[derive(Debug)]
pub struct FakeApi {
    move_reply: Mutex<Result<Envelope, ApiError>>,
    boards: Mutex<VecDeque<Result<Envelope, ApiError>>>,
    last: Mutex<Envelope>,
    pub moves: Mutex<Vec<MoveRequest>>,
    pub resets: AtomicUsize,
    pub board_reads: AtomicUsize,
}

impl FakeApi {
    pub fn new(initial: &str) -> Self {
        let envelope = Envelope::new(true, Position::new(initial), "Current board state");
        Self {
            move_reply: Mutex::new(Ok(envelope.clone())),
            boards: Mutex::new(VecDeque::new()),
            last: Mutex::new(envelope),
            moves: Mutex::new(Vec::new()),
            resets: AtomicUsize::new(0),
            board_reads: AtomicUsize::new(0),
        }
    }

    pub fn reply_to_moves(self, reply: Result<Envelope, ApiError>) -> Self {
        *self.move_reply.lock().expect("lock") = reply;
        self
    }

    pub fn then_board(self, fen: &str) -> Self {
        self.boards
            .lock()
            .expect("lock")
            .push_back(Ok(Envelope::new(true, Position::new(fen), "Current board state")));
        self
    }

    pub fn then_error(self, error: ApiError) -> Self {
        self.boards.lock().expect("lock").push_back(Err(error));
        self
    }
}

#[async_trait]
impl MoveApi for FakeApi {
    async fn make_move(&self, request: &MoveRequest) -> Result<Envelope, ApiError> {
        self.moves.lock().expect("lock").push(request.clone());
        self.move_reply.lock().expect("lock").clone()
    }

    async fn reset_board(&self) -> Result<Envelope, ApiError> {
        self.resets.fetch_add(1, Ordering::SeqCst);
        Ok(Envelope::new(true, Position::starting(), "A new game has started"))
    }

    async fn get_board(&self) -> Result<Envelope, ApiError> {
        self.board_reads.fetch_add(1, Ordering::SeqCst);
        let next = self.boards.lock().expect("lock").pop_front();
        match next {
            Some(Ok(envelope)) => {
                *self.last.lock().expect("lock") = envelope.clone();
                Ok(envelope)
            }
            Some(Err(e)) => Err(e),
            None => Ok(self.last.lock().expect("lock").clone()),
        }
    }
}

pub fn transport_error() -> ApiError {
    ApiError::Transport {
        operation: "get-board",
        url: "http://localhost:5008/api/get-board".to_string(),
        message: "connection refused".to_string(),
    }
}
