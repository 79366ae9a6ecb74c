//! Rules engine capability and its shakmaty-backed implementation.

use crate::moves::MoveRequest;
use crate::position::Position;
use crate::turn::Side;
use derive_more::{Display, Error, From};
use serde::{Deserialize, Serialize};
use shakmaty::fen::Fen;
use shakmaty::san::SanPlus;
use shakmaty::uci::UciMove;
use shakmaty::{CastlingMode, Chess, Color, EnPassantMode, Move, Position as _, Role, Square};
use tracing::{debug, instrument, warn};

/// Why a move was refused.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display("{}", reason)]
pub struct Rejection {
    /// Human-readable reason.
    pub reason: String,
}

impl Rejection {
    /// Creates a rejection with the given reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Failure of a rules-engine call.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error, From)]
pub enum EngineError {
    /// The move is illegal or malformed. A normal, reportable outcome.
    #[display("Move rejected: {}", _0)]
    Rejected(Rejection),
    /// The engine itself could not operate (e.g. unloadable position).
    #[display("Rules engine fault: {}", _0)]
    #[from(ignore)]
    Fault(#[error(not(source))] String),
}

/// Whether the game in a position is still going.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum GameStatus {
    /// The side to move has legal moves.
    InProgress,
    /// The side to move is checkmated.
    Checkmate {
        /// The side that delivered mate.
        winner: Side,
    },
    /// The side to move has no legal moves and is not in check.
    Stalemate,
    /// Neither side can mate.
    InsufficientMaterial,
}

impl GameStatus {
    /// True once no further moves can change the result.
    pub fn is_over(self) -> bool {
        !matches!(self, GameStatus::InProgress)
    }
}

/// Validates and applies chess moves.
///
/// Any implementation that can load a FEN and play a move on it can back the
/// game session.
pub trait RulesEngine: Send + Sync + std::fmt::Debug {
    /// Position a new game starts from.
    fn starting_position(&self) -> Position;

    /// Plays `request` on `position`, returning the resulting position.
    ///
    /// Illegal or malformed moves yield [`EngineError::Rejected`]; the input
    /// position is never modified.
    fn apply(&self, position: &Position, request: &MoveRequest) -> Result<Position, EngineError>;

    /// Reports whether the game in `position` is over.
    fn status(&self, position: &Position) -> Result<GameStatus, EngineError>;
}

/// Standard chess rules from the `shakmaty` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShakmatyEngine;

impl ShakmatyEngine {
    #[instrument(skip(self, position), fields(fen = %position))]
    fn load(&self, position: &Position) -> Result<Chess, EngineError> {
        let fen: Fen = position.as_str().parse().map_err(|e| {
            warn!(error = %e, "Stored position is not parseable FEN");
            EngineError::Fault(format!("position is not valid FEN: {}", e))
        })?;

        fen.into_position::<Chess>(CastlingMode::Standard)
            .map_err(|e| {
                warn!(error = %e, "Stored position is not a legal setup");
                EngineError::Fault(format!("position is not a legal setup: {}", e))
            })
    }

    fn resolve(&self, pos: &Chess, request: &MoveRequest) -> Result<Move, Rejection> {
        match request {
            MoveRequest::Squares {
                from,
                to,
                promotion,
            } => {
                let from = parse_square(from)?;
                let to = parse_square(to)?;
                let promotion = promotion.as_deref().map(parse_role).transpose()?;

                let uci = UciMove::Normal { from, to, promotion };
                match uci.to_move(pos) {
                    Ok(mv) => Ok(mv),
                    // A bare pawn push to the last rank promotes to a queen.
                    Err(_) if promotion.is_none() => UciMove::Normal {
                        from,
                        to,
                        promotion: Some(Role::Queen),
                    }
                    .to_move(pos)
                    .map_err(|_| Rejection::new(format!("Illegal move: {}", request))),
                    Err(_) => Err(Rejection::new(format!("Illegal move: {}", request))),
                }
            }
            MoveRequest::Notation(text) => {
                let text = text.trim();
                if let Ok(san) = text.parse::<SanPlus>()
                    && let Ok(mv) = san.san.to_move(pos)
                {
                    return Ok(mv);
                }
                let uci: UciMove = text
                    .parse()
                    .map_err(|_| Rejection::new(format!("Unrecognized move notation: {}", text)))?;
                uci.to_move(pos)
                    .map_err(|_| Rejection::new(format!("Illegal move: {}", text)))
            }
        }
    }
}

impl RulesEngine for ShakmatyEngine {
    fn starting_position(&self) -> Position {
        Position::starting()
    }

    #[instrument(skip(self, position, request), fields(fen = %position, request = %request))]
    fn apply(&self, position: &Position, request: &MoveRequest) -> Result<Position, EngineError> {
        let pos = self.load(position)?;
        let mv = self.resolve(&pos, request)?;

        let next = pos.play(mv).map_err(|e| {
            EngineError::Rejected(Rejection::new(format!("Illegal move: {}", e)))
        })?;

        let fen = Fen::from_position(&next, EnPassantMode::Legal).to_string();
        debug!(next = %fen, "Move applied");
        Ok(Position::new(fen))
    }

    #[instrument(skip(self, position), fields(fen = %position))]
    fn status(&self, position: &Position) -> Result<GameStatus, EngineError> {
        let pos = self.load(position)?;
        let status = if pos.is_checkmate() {
            GameStatus::Checkmate {
                winner: side_of(pos.turn()).opponent(),
            }
        } else if pos.is_stalemate() {
            GameStatus::Stalemate
        } else if pos.is_insufficient_material() {
            GameStatus::InsufficientMaterial
        } else {
            GameStatus::InProgress
        };
        Ok(status)
    }
}

fn side_of(color: Color) -> Side {
    match color {
        Color::White => Side::White,
        Color::Black => Side::Black,
    }
}

fn parse_square(text: &str) -> Result<Square, Rejection> {
    text.trim()
        .to_ascii_lowercase()
        .parse()
        .map_err(|_| Rejection::new(format!("Invalid square: {:?}", text)))
}

fn parse_role(text: &str) -> Result<Role, Rejection> {
    let mut chars = text.trim().chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Role::from_char(c.to_ascii_lowercase())
            .filter(|role| !matches!(role, Role::Pawn | Role::King))
            .ok_or_else(|| Rejection::new(format!("Invalid promotion piece: {:?}", text))),
        _ => Err(Rejection::new(format!("Invalid promotion piece: {:?}", text))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play(fen: &str, request: MoveRequest) -> Result<Position, EngineError> {
        ShakmatyEngine.apply(&Position::new(fen), &request)
    }

    #[test]
    fn test_e4_from_start() {
        let next = ShakmatyEngine
            .apply(&Position::starting(), &MoveRequest::squares("e2", "e4"))
            .unwrap();
        assert_eq!(
            next.as_str(),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1"
        );
    }

    #[test]
    fn test_blocked_pawn_is_rejected() {
        let result = ShakmatyEngine.apply(&Position::starting(), &MoveRequest::squares("e2", "e5"));
        assert!(matches!(result, Err(EngineError::Rejected(_))));
    }

    #[test]
    fn test_out_of_turn_is_rejected() {
        let result = ShakmatyEngine.apply(&Position::starting(), &MoveRequest::squares("e7", "e5"));
        assert!(matches!(result, Err(EngineError::Rejected(_))));
    }

    #[test]
    fn test_bad_square_is_rejected() {
        let result = ShakmatyEngine.apply(&Position::starting(), &MoveRequest::squares("z9", "e4"));
        assert!(matches!(result, Err(EngineError::Rejected(_))));
    }

    #[test]
    fn test_san_and_uci_notation() {
        let after_san = ShakmatyEngine
            .apply(&Position::starting(), &MoveRequest::notation("Nf3"))
            .unwrap();
        let after_uci = ShakmatyEngine
            .apply(&Position::starting(), &MoveRequest::notation("g1f3"))
            .unwrap();
        assert_eq!(after_san, after_uci);
    }

    #[test]
    fn test_garbage_notation_is_rejected() {
        let result = ShakmatyEngine.apply(&Position::starting(), &MoveRequest::notation("hello"));
        assert!(matches!(result, Err(EngineError::Rejected(_))));
    }

    #[test]
    fn test_promotion_defaults_to_queen() {
        let next = play("8/4P3/8/8/8/8/k7/4K3 w - - 0 1", MoveRequest::squares("e7", "e8")).unwrap();
        assert!(next.placement().starts_with("4Q3"));
    }

    #[test]
    fn test_explicit_underpromotion() {
        let request = MoveRequest::Squares {
            from: "e7".into(),
            to: "e8".into(),
            promotion: Some("n".into()),
        };
        let next = play("8/4P3/8/8/8/8/k7/4K3 w - - 0 1", request).unwrap();
        assert!(next.placement().starts_with("4N3"));
    }

    #[test]
    fn test_castling_by_king_squares() {
        let next = play(
            "r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1",
            MoveRequest::squares("e1", "g1"),
        )
        .unwrap();
        assert!(next.placement().ends_with("R4RK1"));
    }

    #[test]
    fn test_malformed_position_is_a_fault() {
        let result = play("not a fen", MoveRequest::squares("e2", "e4"));
        assert!(matches!(result, Err(EngineError::Fault(_))));
    }

    #[test]
    fn test_status_checkmate() {
        // Fool's mate
        let status = ShakmatyEngine
            .status(&Position::new(
                "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3",
            ))
            .unwrap();
        assert_eq!(
            status,
            GameStatus::Checkmate {
                winner: Side::Black
            }
        );
        assert!(status.is_over());
    }

    #[test]
    fn test_status_in_progress() {
        let status = ShakmatyEngine.status(&Position::starting()).unwrap();
        assert_eq!(status, GameStatus::InProgress);
    }
}
