//! LLM Chess server - one shared chess game for a human and an agent.
//!
//! The [`GameSession`] owns the only position. [`MoveService`] wraps it in
//! the three move API operations, served over HTTP by [`http::router`]. The
//! agent reaches the same game through [`ChessMcpServer`], whose tools go
//! through an [`AgentBridge`] that waits out the human's turn. The human
//! plays through a [`UiSyncClient`].

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod api_client;
pub mod bridge;
pub mod cli;
pub mod config;
pub mod envelope;
pub mod http;
pub mod mcp;
pub mod service;
pub mod session;
pub mod terminal;
pub mod ui_sync;

pub use api_client::{ApiError, ChessApiClient, MoveApi};
pub use bridge::{AgentBridge, BridgeError, CancelHandle, CancelToken, cancel_pair};
pub use config::{ChessConfig, ConfigError};
pub use envelope::Envelope;
pub use mcp::ChessMcpServer;
pub use service::{MoveService, ServiceError};
pub use session::{GameSession, MoveRefused};
pub use ui_sync::UiSyncClient;
