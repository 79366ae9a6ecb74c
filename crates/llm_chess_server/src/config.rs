//! Runtime configuration.

use derive_getters::Getters;
use derive_more::{Display, Error};
use llm_chess_core::Side;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "llm_chess.toml";

/// Settings shared by the server, the MCP bridge and the terminal player.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct ChessConfig {
    /// Host the HTTP API binds to.
    host: String,

    /// Port the HTTP API binds to.
    port: u16,

    /// Base URL clients use to reach the move API.
    api_base_url: String,

    /// Side played by the human. The agent plays the other one.
    human_side: Side,

    /// Delay between agent bridge polls, in milliseconds.
    agent_poll_interval_ms: u64,

    /// Delay between UI polls, in milliseconds.
    ui_poll_interval_ms: u64,

    /// How long the agent waits for the human, in seconds. 0 waits forever.
    agent_wait_timeout_secs: u64,
}

impl Default for ChessConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5008,
            api_base_url: "http://localhost:5008/api".to_string(),
            human_side: Side::White,
            agent_poll_interval_ms: 1000,
            ui_poll_interval_ms: 500,
            agent_wait_timeout_secs: 600,
        }
    }
}

impl ChessConfig {
    /// Loads configuration from a TOML file. Missing keys take defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        info!(api_base_url = %config.api_base_url, "Config loaded successfully");
        Ok(config)
    }

    /// Rejects settings the clients cannot run with.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.agent_poll_interval_ms == 0 {
            return Err(ConfigError::new("agent_poll_interval_ms must be at least 1".to_string()));
        }
        if self.ui_poll_interval_ms == 0 {
            return Err(ConfigError::new("ui_poll_interval_ms must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Loads the given file, or `llm_chess.toml` when none is given.
    ///
    /// An explicitly named file must exist. The default file is optional.
    #[instrument]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::from_file(path)
                } else {
                    debug!("No config file found, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    /// Overrides the bind host.
    pub fn with_host(mut self, host: Option<String>) -> Self {
        if let Some(host) = host {
            self.host = host;
        }
        self
    }

    /// Overrides the bind port.
    pub fn with_port(mut self, port: Option<u16>) -> Self {
        if let Some(port) = port {
            self.port = port;
        }
        self
    }

    /// Overrides the move API base URL.
    pub fn with_api_base_url(mut self, url: Option<String>) -> Self {
        if let Some(url) = url {
            self.api_base_url = url;
        }
        self
    }

    /// Delay between agent bridge polls.
    pub fn agent_poll_interval(&self) -> Duration {
        Duration::from_millis(self.agent_poll_interval_ms)
    }

    /// Delay between UI polls.
    pub fn ui_poll_interval(&self) -> Duration {
        Duration::from_millis(self.ui_poll_interval_ms)
    }

    /// Deadline for the agent's wait, if any.
    pub fn agent_wait_timeout(&self) -> Option<Duration> {
        match self.agent_wait_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
