//! FEN position snapshot.

use crate::turn::{Turn, turn_of};
use derive_more::Display;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// FEN of the standard starting position.
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// A chess position in Forsyth-Edwards Notation.
///
/// The wrapper does not validate its contents. Positions produced by a
/// [`RulesEngine`](crate::RulesEngine) are always well formed, and the game
/// session only ever stores engine output.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct Position(String);

impl Position {
    /// Wraps a FEN string.
    pub fn new(fen: impl Into<String>) -> Self {
        Self(fen.into())
    }

    /// The standard starting position.
    pub fn starting() -> Self {
        Self(STARTING_FEN.to_string())
    }

    /// Returns the FEN text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when this is exactly the standard starting FEN.
    pub fn is_starting(&self) -> bool {
        self.0 == STARTING_FEN
    }

    /// Side to move and full-move number, if the FEN is non-empty.
    pub fn turn(&self) -> Option<Turn> {
        turn_of(&self.0)
    }

    /// Piece placement field (first FEN field).
    pub fn placement(&self) -> &str {
        self.0.split_whitespace().next().unwrap_or("")
    }
}
