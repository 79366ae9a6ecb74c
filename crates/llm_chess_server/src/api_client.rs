//! HTTP client for the move API.

use crate::envelope::Envelope;
use async_trait::async_trait;
use derive_more::{Display, Error};
use llm_chess_core::MoveRequest;
use std::fmt::Debug;
use std::sync::Arc;
use tracing::{debug, error, instrument};

/// Failure talking to the move API.
///
/// Rejected moves are not errors; they arrive as envelopes with
/// `valid = false`.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum ApiError {
    /// The request could not be sent or the response not received.
    #[display("{} failed: could not reach {}: {}", operation, url, message)]
    Transport {
        /// Operation attempted.
        operation: &'static str,
        /// URL requested.
        url: String,
        /// Underlying transport error.
        message: String,
    },
    /// The API answered with a non-success status.
    #[display("{} failed: {} returned HTTP {}: {}", operation, url, status, body)]
    Status {
        /// Operation attempted.
        operation: &'static str,
        /// URL requested.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Response body, for diagnosis.
        body: String,
    },
    /// The response body was not an envelope.
    #[display("{} failed: unreadable response from {}: {}", operation, url, message)]
    Decode {
        /// Operation attempted.
        operation: &'static str,
        /// URL requested.
        url: String,
        /// Parse error.
        message: String,
    },
}

/// The three move API operations, as seen by a client.
#[async_trait]
pub trait MoveApi: Send + Sync + Debug {
    /// Submits a move.
    async fn make_move(&self, request: &MoveRequest) -> Result<Envelope, ApiError>;

    /// Resets the game.
    async fn reset_board(&self) -> Result<Envelope, ApiError>;

    /// Reads the current board.
    async fn get_board(&self) -> Result<Envelope, ApiError>;
}

#[async_trait]
impl<T: MoveApi + ?Sized> MoveApi for Arc<T> {
    async fn make_move(&self, request: &MoveRequest) -> Result<Envelope, ApiError> {
        (**self).make_move(request).await
    }

    async fn reset_board(&self) -> Result<Envelope, ApiError> {
        (**self).reset_board().await
    }

    async fn get_board(&self) -> Result<Envelope, ApiError> {
        (**self).get_board().await
    }
}

/// Move API client over HTTP.
#[derive(Debug, Clone)]
pub struct ChessApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl ChessApiClient {
    /// Creates a client for an API base URL such as `http://localhost:5008/api`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        debug!(base_url = %base_url, "Creating chess API client");
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    async fn send(
        &self,
        operation: &'static str,
        url: String,
        request: reqwest::RequestBuilder,
    ) -> Result<Envelope, ApiError> {
        let response = request.send().await.map_err(|e| {
            error!(operation, url = %url, error = %e, "Failed to send request");
            ApiError::Transport {
                operation,
                url: url.clone(),
                message: e.to_string(),
            }
        })?;

        let status = response.status();
        debug!(operation, status = %status, "Received response");

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(operation, url = %url, status = %status, body = %body, "Request failed");
            return Err(ApiError::Status {
                operation,
                url,
                status: status.as_u16(),
                body,
            });
        }

        response.json::<Envelope>().await.map_err(|e| {
            error!(operation, url = %url, error = %e, "Failed to parse envelope");
            ApiError::Decode {
                operation,
                url: url.clone(),
                message: e.to_string(),
            }
        })
    }
}

#[async_trait]
impl MoveApi for ChessApiClient {
    #[instrument(skip(self, request), fields(request = %request))]
    async fn make_move(&self, request: &MoveRequest) -> Result<Envelope, ApiError> {
        let url = format!("{}/make-move", self.base_url);
        let builder = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "move": request }));
        self.send("make-move", url, builder).await
    }

    #[instrument(skip(self))]
    async fn reset_board(&self) -> Result<Envelope, ApiError> {
        let url = format!("{}/reset-board", self.base_url);
        let builder = self.client.get(&url);
        self.send("reset-board", url, builder).await
    }

    #[instrument(skip(self))]
    async fn get_board(&self) -> Result<Envelope, ApiError> {
        let url = format!("{}/get-board", self.base_url);
        let builder = self.client.get(&url);
        self.send("get-board", url, builder).await
    }
}
