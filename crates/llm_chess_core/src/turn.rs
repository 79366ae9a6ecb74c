//! Side-to-move derivation from FEN text.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A side in the game.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    JsonSchema,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Side {
    /// White (moves first).
    White,
    /// Black.
    Black,
}

impl Side {
    /// Returns the other side.
    pub fn opponent(self) -> Self {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }
}

/// Whose move it is, derived from a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Turn {
    /// Side to move.
    pub side: Side,
    /// Full-move number (sixth FEN field).
    pub move_number: u32,
}

/// Derives the turn from a FEN string.
///
/// The side is white iff the second field is exactly `w`. The move number is
/// the sixth field, or 1 when that field is absent or not a number. Empty
/// input yields `None`, meaning no game is in progress.
pub fn turn_of(fen: &str) -> Option<Turn> {
    let mut fields = fen.split_whitespace();
    fields.next()?;

    let side = match fields.next() {
        Some("w") => Side::White,
        _ => Side::Black,
    };
    let move_number = fields
        .nth(3)
        .and_then(|n| n.parse().ok())
        .unwrap_or(1);

    Some(Turn { side, move_number })
}
