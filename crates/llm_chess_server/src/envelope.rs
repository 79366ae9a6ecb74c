//! The uniform response shape of every API and tool call.

use llm_chess_core::{GameStatus, Position, Side, turn_of};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Prompt returned after a reset.
pub const NEW_GAME_PROMPT: &str = "A new game has started";

/// Prompt returned when the board is only read.
pub const CURRENT_STATE_PROMPT: &str = "Current board state";

/// Response to every board operation.
///
/// `valid` is false only for a rejected move, in which case `board` still
/// holds the unchanged current position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    /// FEN notation of the current board state.
    pub board: Position,
    /// Side to move ("white" or "black").
    pub current_player: Option<Side>,
    /// Whether the given input gave a valid output.
    pub valid: bool,
    /// Further instructions for whoever acts next.
    pub prompt: String,
}

impl Envelope {
    /// Builds an envelope, deriving `current_player` from the board.
    pub fn new(valid: bool, board: Position, prompt: impl Into<String>) -> Self {
        Self {
            current_player: turn_of(board.as_str()).map(|turn| turn.side),
            board,
            valid,
            prompt: prompt.into(),
        }
    }
}

/// Asks the side to move for its next move.
pub fn continue_prompt(side: Option<Side>) -> String {
    match side {
        Some(side) => format!(
            "Play another move as {}. Explain your reasoning. I want to learn.",
            side
        ),
        None => "No game in progress. Reset the board to start a new game.".to_string(),
    }
}

/// Prompt after a successful move, taking the game status into account.
pub fn after_move_prompt(side: Option<Side>, status: GameStatus) -> String {
    match status {
        GameStatus::InProgress => continue_prompt(side),
        GameStatus::Checkmate { winner } => format!(
            "Checkmate. {} wins. Explain how the game was decided, then reset the board to play again.",
            winner
        ),
        GameStatus::Stalemate => {
            "Stalemate. The game is a draw. Reset the board to play again.".to_string()
        }
        GameStatus::InsufficientMaterial => {
            "Draw by insufficient material. Reset the board to play again.".to_string()
        }
    }
}
