//! The single authoritative game session.

use derive_more::{Display, Error};
use llm_chess_core::{EngineError, GameStatus, MoveRequest, Position, RulesEngine};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

/// Owns the one shared chess position.
///
/// Mutations (`apply_move`, `reset`) run inside the watch channel's write
/// lock, so concurrent moves never interleave their read-modify-write and
/// readers only ever see a whole position. Every mutation is published to
/// subscribers.
///
/// Cloning yields another handle to the same game.
#[derive(Debug, Clone)]
pub struct GameSession {
    inner: Arc<SessionInner>,
}

#[derive(Debug)]
struct SessionInner {
    engine: Box<dyn RulesEngine>,
    position: watch::Sender<Position>,
}

/// A move the session did not apply, with the position it was judged against.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display("{}", error)]
pub struct MoveRefused {
    /// Why the engine refused the move.
    pub error: EngineError,
    /// The stored position at the time of the attempt, which is unchanged.
    pub current: Position,
}

impl GameSession {
    /// Creates a session at the engine's starting position.
    #[instrument(skip(engine))]
    pub fn new(engine: impl RulesEngine + 'static) -> Self {
        let start = engine.starting_position();
        info!(fen = %start, "Creating game session");
        let (position, _) = watch::channel(start);
        Self {
            inner: Arc::new(SessionInner {
                engine: Box::new(engine),
                position,
            }),
        }
    }

    /// Returns the current position.
    pub fn get(&self) -> Position {
        self.inner.position.borrow().clone()
    }

    /// Replaces the current position with the starting position.
    #[instrument(skip(self))]
    pub fn reset(&self) -> Position {
        let start = self.inner.engine.starting_position();
        let previous = self.inner.position.send_replace(start.clone());
        info!(previous = %previous, "Board reset to starting position");
        start
    }

    /// Applies a move to the current position.
    ///
    /// On success the stored position is swapped for the result and
    /// subscribers are notified. On any error the stored position is left
    /// exactly as it was and is returned inside the [`MoveRefused`].
    #[instrument(skip(self, request), fields(request = %request))]
    pub fn apply_move(&self, request: &MoveRequest) -> Result<Position, MoveRefused> {
        let mut outcome = None;

        self.inner.position.send_if_modified(|current| {
            match self.inner.engine.apply(current, request) {
                Ok(next) => {
                    debug!(from = %current, to = %next, "Position replaced");
                    *current = next.clone();
                    outcome = Some(Ok(next));
                    true
                }
                Err(error) => {
                    warn!(error = %error, fen = %current, "Move not applied");
                    outcome = Some(Err(MoveRefused {
                        error,
                        current: current.clone(),
                    }));
                    false
                }
            }
        });

        outcome.unwrap_or_else(|| {
            Err(MoveRefused {
                error: EngineError::Fault("move was not evaluated".to_string()),
                current: self.get(),
            })
        })
    }

    /// Reports the status of an arbitrary position with this session's engine.
    pub fn status_of(&self, position: &Position) -> Result<GameStatus, EngineError> {
        self.inner.engine.status(position)
    }

    /// Subscribes to position changes.
    pub fn subscribe(&self) -> watch::Receiver<Position> {
        self.inner.position.subscribe()
    }
}
