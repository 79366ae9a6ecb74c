//! Command-line interface for llm_chess.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// LLM Chess - play chess against an agent over MCP
#[derive(Parser, Debug)]
#[command(name = "llm_chess")]
#[command(about = "Shared chess game for a human and an LLM agent", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to a TOML config file (defaults to llm_chess.toml if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP move API
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Run the agent-facing MCP server (stdio mode)
    Mcp {
        /// Move API base URL
        #[arg(long)]
        api_url: Option<String>,
    },

    /// Play as the human from the terminal
    Play {
        /// Move API base URL
        #[arg(long)]
        api_url: Option<String>,
    },
}
