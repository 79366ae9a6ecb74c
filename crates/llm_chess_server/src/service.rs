//! Move API service: the three board operations over the game session.

use crate::envelope::{
    CURRENT_STATE_PROMPT, Envelope, NEW_GAME_PROMPT, after_move_prompt, continue_prompt,
};
use crate::session::{GameSession, MoveRefused};
use derive_more::{Display, Error};
use llm_chess_core::{EngineError, MoveRequest, Position};
use tracing::{error, info, instrument, warn};

/// Service-level failure. Only raised when the rules engine itself breaks.
#[derive(Debug, Clone, Display, Error)]
#[display("Service error: {} at {}:{}", message, file, line)]
pub struct ServiceError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ServiceError {
    /// Creates a new service error with caller location tracking.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

/// Stateless handlers for make-move, reset-board and get-board.
#[derive(Debug, Clone)]
pub struct MoveService {
    session: GameSession,
}

impl MoveService {
    /// Creates a service over the given session.
    pub fn new(session: GameSession) -> Self {
        Self { session }
    }

    /// Attempts a move.
    ///
    /// Illegal or malformed moves produce `valid = false` with the unchanged
    /// board. Only an engine fault becomes an error.
    #[instrument(skip(self, request), fields(request = %request))]
    pub fn make_move(&self, request: &MoveRequest) -> Result<Envelope, ServiceError> {
        info!("Received move from player");

        match self.session.apply_move(request) {
            Ok(next) => {
                let status = self.session.status_of(&next).map_err(|e| {
                    error!(error = %e, fen = %next, "Could not evaluate game status");
                    ServiceError::new(e.to_string())
                })?;
                let envelope = Envelope::new(true, next, "");
                let prompt = after_move_prompt(envelope.current_player, status);
                info!(fen = %envelope.board, status = ?status, "Move is valid");
                Ok(Envelope { prompt, ..envelope })
            }
            Err(MoveRefused {
                error: EngineError::Rejected(rejection),
                current,
            }) => {
                warn!(reason = %rejection, "Move is invalid");
                Ok(rejected_at(current))
            }
            Err(MoveRefused {
                error: e @ EngineError::Fault(_),
                ..
            }) => {
                error!(error = %e, "Rules engine failed while applying move");
                Err(ServiceError::new(e.to_string()))
            }
        }
    }

    /// Envelope for a move that could not even be read, such as a request
    /// body without a move.
    #[instrument(skip(self))]
    pub fn reject_malformed(&self, reason: &str) -> Envelope {
        warn!(reason, "Malformed move request");
        rejected_at(self.session.get())
    }

    /// Resets the game to the starting position.
    #[instrument(skip(self))]
    pub fn reset_board(&self) -> Envelope {
        info!("Resetting current board state");
        Envelope::new(true, self.session.reset(), NEW_GAME_PROMPT)
    }

    /// Returns the current board.
    pub fn get_board(&self) -> Envelope {
        Envelope::new(true, self.session.get(), CURRENT_STATE_PROMPT)
    }
}

/// Rejection envelope for the board the move was judged against.
fn rejected_at(board: Position) -> Envelope {
    let envelope = Envelope::new(false, board, "");
    let prompt = continue_prompt(envelope.current_player);
    Envelope { prompt, ..envelope }
}
