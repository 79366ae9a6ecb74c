//! Human-facing client that keeps a local copy of the board in sync.

use crate::api_client::{ApiError, MoveApi};
use crate::bridge::MIN_POLL_INTERVAL;
use crate::envelope::Envelope;
use llm_chess_core::{MoveRequest, Position, Side, Turn, turn_of};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info, instrument, warn};

/// Status line shown on the human's turn.
pub const YOUR_TURN: &str = "Your turn";

/// Status line shown before the agent's first move.
pub const TELL_AI_TO_PLAY: &str = "Tell AI to play";

/// Status line shown while the agent is expected to move.
pub const AI_THINKING: &str = "AI's thinking...";

/// Mirrors the shared board for a human player.
///
/// Mounting resets the game and starts a background poll that refreshes the
/// local board. Moves are only submitted on the human's turn. Poll failures
/// are logged and the last known board stays displayed.
#[derive(Debug)]
pub struct UiSyncClient<A: MoveApi + 'static> {
    api: Arc<A>,
    human_side: Side,
    board: Arc<watch::Sender<Position>>,
    poll: Option<JoinHandle<()>>,
}

impl<A: MoveApi + 'static> UiSyncClient<A> {
    /// Resets the game, fetches the board and starts polling.
    #[instrument(skip(api))]
    pub async fn mount(api: A, human_side: Side, poll_interval: Duration) -> Self {
        let api = Arc::new(api);
        let (board, _) = watch::channel(Position::starting());
        let board = Arc::new(board);

        match api.reset_board().await {
            Ok(envelope) => {
                info!(fen = %envelope.board, "Game reset on mount");
                board.send_replace(envelope.board);
            }
            Err(e) => warn!(error = %e, "Reset on mount failed"),
        }
        refresh(api.as_ref(), &board).await;

        let poll = tokio::spawn(poll_board(Arc::clone(&api), Arc::clone(&board), poll_interval));

        Self {
            api,
            human_side,
            board,
            poll: Some(poll),
        }
    }

    /// The side the human plays.
    pub fn human_side(&self) -> Side {
        self.human_side
    }

    /// The last known board.
    pub fn board(&self) -> Position {
        self.board.borrow().clone()
    }

    /// Side to move on the last known board.
    pub fn turn(&self) -> Option<Turn> {
        turn_of(self.board.borrow().as_str())
    }

    /// True when the human may move.
    pub fn is_human_turn(&self) -> bool {
        self.turn().is_some_and(|turn| turn.side == self.human_side)
    }

    /// The intro is shown while the board is still at the starting position.
    pub fn intro_visible(&self) -> bool {
        self.board.borrow().is_starting()
    }

    /// Turn message for the current board.
    pub fn status_line(&self) -> &'static str {
        match self.turn() {
            Some(turn) if turn.side == self.human_side => YOUR_TURN,
            Some(turn) if turn.move_number == 1 => TELL_AI_TO_PLAY,
            _ => AI_THINKING,
        }
    }

    /// Subscribes to local board updates.
    pub fn subscribe(&self) -> watch::Receiver<Position> {
        self.board.subscribe()
    }

    /// Submits a move if it is the human's turn.
    ///
    /// Returns `Ok(None)` without contacting the API when it is not. The local
    /// board takes whatever board the API returns, which is unchanged for a
    /// rejected move.
    #[instrument(skip(self, request), fields(request = %request))]
    pub async fn submit(&self, request: MoveRequest) -> Result<Option<Envelope>, ApiError> {
        if !self.is_human_turn() {
            debug!("Not the human's turn, ignoring move");
            return Ok(None);
        }

        let envelope = self.api.make_move(&request).await.map_err(|e| {
            warn!(error = %e, "Move submission failed");
            e
        })?;

        if envelope.valid {
            info!(fen = %envelope.board, "Move accepted");
        } else {
            info!(prompt = %envelope.prompt, "Move rejected");
        }
        replace_if_changed(&self.board, envelope.board.clone());
        Ok(Some(envelope))
    }

    /// Drag-and-drop entry point: a move from one square to another.
    pub async fn on_drop(
        &self,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Result<Option<Envelope>, ApiError> {
        self.submit(MoveRequest::squares(from, to)).await
    }

    /// True while the background poll is running.
    pub fn is_polling(&self) -> bool {
        self.poll.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Stops polling. The last known board stays readable.
    pub fn unmount(&mut self) {
        if let Some(handle) = self.poll.take() {
            debug!("Stopping board poll");
            handle.abort();
        }
    }
}

impl<A: MoveApi + 'static> Drop for UiSyncClient<A> {
    fn drop(&mut self) {
        self.unmount();
    }
}

async fn poll_board<A: MoveApi>(
    api: Arc<A>,
    board: Arc<watch::Sender<Position>>,
    period: Duration,
) {
    let mut ticker = interval(period.max(MIN_POLL_INTERVAL));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; mount already fetched.
    ticker.tick().await;
    loop {
        ticker.tick().await;
        refresh(api.as_ref(), &board).await;
    }
}

async fn refresh<A: MoveApi + ?Sized>(api: &A, board: &watch::Sender<Position>) {
    match api.get_board().await {
        Ok(envelope) => replace_if_changed(board, envelope.board),
        Err(e) => warn!(error = %e, "Failed to fetch board state"),
    }
}

fn replace_if_changed(board: &watch::Sender<Position>, next: Position) {
    board.send_if_modified(|current| {
        if *current == next {
            false
        } else {
            debug!(fen = %next, "Board updated");
            *current = next;
            true
        }
    });
}
