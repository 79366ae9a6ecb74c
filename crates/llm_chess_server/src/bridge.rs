//! Agent bridge: submits agent moves and waits out the human's reply.

use crate::api_client::{ApiError, MoveApi};
use crate::envelope::Envelope;
use derive_more::{Display, Error, From};
use llm_chess_core::{MoveRequest, Side};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};

/// Shortest delay between polls. Zero intervals are raised to this.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Failure of an agent bridge operation.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error, From)]
pub enum BridgeError {
    /// The move API could not be reached or answered badly.
    #[display("{}", _0)]
    Api(ApiError),
    /// The human did not move before the deadline.
    #[display("Timed out waiting for opponent after {:?}", waited)]
    #[from(ignore)]
    TimedOut {
        /// How long the bridge waited.
        waited: Duration,
    },
    /// The caller cancelled the wait.
    #[display("Cancelled while waiting for opponent")]
    #[from(ignore)]
    Cancelled,
}

/// Creates a linked cancel handle and token.
pub fn cancel_pair() -> (CancelHandle, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelToken { rx })
}

/// Aborts waits holding the matching [`CancelToken`].
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Cancels every wait observing this handle's token.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

/// Observes cancellation requested through a [`CancelHandle`].
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    /// A token that is never cancelled.
    pub fn never() -> Self {
        let (_, rx) = watch::channel(false);
        Self { rx }
    }

    /// Resolves once cancellation is requested. Pends forever if the handle
    /// is dropped without cancelling.
    pub async fn cancelled(&mut self) {
        if self.rx.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Bridge between an agent's tool calls and the move API.
///
/// The agent plays the side opposite `human_side`. After each agent move the
/// bridge polls until it is no longer the human's turn, so a tool call
/// returns only once the human has answered.
#[derive(Debug, Clone)]
pub struct AgentBridge<A> {
    api: A,
    human_side: Side,
    poll_interval: Duration,
    wait_timeout: Option<Duration>,
}

impl<A: MoveApi> AgentBridge<A> {
    /// Creates a bridge over a move API client.
    pub fn new(api: A, human_side: Side, poll_interval: Duration) -> Self {
        let poll_interval = poll_interval.max(MIN_POLL_INTERVAL);
        info!(human_side = %human_side, ?poll_interval, "Creating agent bridge");
        Self {
            api,
            human_side,
            poll_interval,
            wait_timeout: None,
        }
    }

    /// Sets the deadline for waiting on the human. `None` waits indefinitely.
    pub fn with_wait_timeout(mut self, wait_timeout: Option<Duration>) -> Self {
        self.wait_timeout = wait_timeout;
        self
    }

    /// Delay between polls while waiting for the human.
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// The side the agent plays.
    pub fn agent_side(&self) -> Side {
        self.human_side.opponent()
    }

    /// Reads the board once, without waiting.
    #[instrument(skip(self))]
    pub async fn get_agent_view(&self) -> Result<Envelope, BridgeError> {
        debug!("Getting board state for agent");
        self.api.get_board().await.map_err(|e| {
            error!(error = %e, "Failed to get board state");
            BridgeError::from(e)
        })
    }

    /// Submits a move and waits for the human's reply, subject to the
    /// configured deadline.
    pub async fn make_agent_move(&self, request: &MoveRequest) -> Result<Envelope, BridgeError> {
        self.make_agent_move_with_cancel(request, CancelToken::never())
            .await
    }

    /// Submits a move, then polls until it is no longer the human's turn.
    ///
    /// Polling happens whether or not the move was accepted. When it was
    /// rejected the returned envelope keeps `valid = false` and the
    /// rejection prompt, with the board as of the end of the wait.
    #[instrument(skip(self, request, cancel), fields(request = %request))]
    pub async fn make_agent_move_with_cancel(
        &self,
        request: &MoveRequest,
        mut cancel: CancelToken,
    ) -> Result<Envelope, BridgeError> {
        let submitted = self.api.make_move(request).await.map_err(|e| {
            error!(error = %e, "Failed to make move");
            BridgeError::from(e)
        })?;

        if submitted.valid {
            info!(fen = %submitted.board, "Agent move accepted, waiting for opponent");
        } else {
            warn!(fen = %submitted.board, "Agent move rejected, waiting for opponent");
        }

        let deadline = async {
            match self.wait_timeout {
                Some(limit) => {
                    sleep(limit).await;
                    limit
                }
                None => std::future::pending::<Duration>().await,
            }
        };

        let latest = tokio::select! {
            result = self.wait_for_opponent() => result?,
            waited = deadline => {
                warn!(?waited, "Timed out waiting for opponent");
                return Err(BridgeError::TimedOut { waited });
            }
            _ = cancel.cancelled() => {
                info!("Wait for opponent cancelled");
                return Err(BridgeError::Cancelled);
            }
        };

        if submitted.valid {
            Ok(latest)
        } else {
            Ok(Envelope {
                valid: false,
                prompt: submitted.prompt,
                ..latest
            })
        }
    }

    async fn wait_for_opponent(&self) -> Result<Envelope, BridgeError> {
        let mut polls: u64 = 0;
        loop {
            sleep(self.poll_interval).await;
            polls += 1;

            let envelope = self.api.get_board().await.map_err(|e| {
                error!(error = %e, polls, "Failed to poll board while waiting for opponent");
                BridgeError::from(e)
            })?;

            if envelope.current_player != Some(self.human_side) {
                info!(polls, fen = %envelope.board, "Opponent has moved");
                return Ok(envelope);
            }

            if polls % 10 == 0 {
                debug!(polls, "Still waiting for opponent");
            }
        }
    }
}
