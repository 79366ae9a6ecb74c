//! LLM Chess - unified CLI
//!
//! Runs the move API, the agent-facing MCP server or the terminal player.

#![warn(missing_docs)]

use anyhow::Result;
use clap::Parser;
use llm_chess_core::ShakmatyEngine;
use llm_chess_server::cli::{Cli, Command};
use llm_chess_server::{
    AgentBridge, ChessApiClient, ChessConfig, ChessMcpServer, GameSession, MoveApi, MoveService,
    http, terminal,
};
use rmcp::ServiceExt;
use std::sync::Arc;
use tracing::{error, info, instrument};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "info,llm_chess_server=debug";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = ChessConfig::load(cli.config.as_deref())?;

    match cli.command {
        Command::Serve { host, port } => run_http_server(config.with_host(host).with_port(port)).await,
        Command::Mcp { api_url } => run_mcp_server(config.with_api_base_url(api_url)).await,
        Command::Play { api_url } => terminal::run_play(config.with_api_base_url(api_url)).await,
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Run the HTTP move API
#[instrument(skip_all, fields(host = %config.host(), port = config.port()))]
async fn run_http_server(config: ChessConfig) -> Result<()> {
    tracing_subscriber::fmt().with_env_filter(env_filter()).init();

    info!("Starting LLM Chess move API");

    let session = GameSession::new(ShakmatyEngine);
    let service = MoveService::new(session);

    let listener = tokio::net::TcpListener::bind((config.host().as_str(), *config.port())).await?;
    http::serve(listener, service).await?;

    Ok(())
}

/// Run the MCP server (stdio mode)
async fn run_mcp_server(config: ChessConfig) -> Result<()> {
    // stdout carries JSON-RPC
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!(api_base_url = %config.api_base_url(), "Starting LLM Chess MCP server");

    let api: Arc<dyn MoveApi> = Arc::new(ChessApiClient::new(config.api_base_url().clone()));
    let bridge = AgentBridge::new(api, *config.human_side(), config.agent_poll_interval())
        .with_wait_timeout(config.agent_wait_timeout());
    let server = ChessMcpServer::new(bridge);

    let service = match server.serve(rmcp::transport::stdio()).await {
        Ok(service) => service,
        Err(e) => {
            error!(error = %e, "Fatal error in main()");
            std::process::exit(1);
        }
    };

    info!("Chess MCP Server running on stdio");
    service.waiting().await?;

    Ok(())
}
