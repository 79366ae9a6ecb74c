//! LLM Chess core - chess vocabulary shared by the move API and the agent bridge.
//!
//! The game state is a single FEN string. Everything here either derives
//! values from that string or hands it to a [`RulesEngine`] to validate and
//! apply a move.
//!
//! # Example
//!
//! ```
//! use llm_chess_core::{MoveRequest, RulesEngine, ShakmatyEngine, Side, turn_of};
//!
//! let engine = ShakmatyEngine;
//! let start = engine.starting_position();
//! let next = engine.apply(&start, &MoveRequest::squares("e2", "e4")).unwrap();
//! assert_eq!(turn_of(next.as_str()).map(|t| t.side), Some(Side::Black));
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod board;
mod engine;
mod moves;
mod position;
mod turn;

pub use board::render_board;
pub use engine::{EngineError, GameStatus, Rejection, RulesEngine, ShakmatyEngine};
pub use moves::MoveRequest;
pub use position::{Position, STARTING_FEN};
pub use turn::{Side, Turn, turn_of};
