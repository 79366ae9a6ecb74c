//! MCP server exposing the shared game to an agent.

use crate::api_client::MoveApi;
use crate::bridge::{AgentBridge, BridgeError};
use crate::envelope::Envelope;
use llm_chess_core::MoveRequest;
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::tool::ToolCallContext;
use rmcp::handler::server::wrapper::{Json, Parameters};
use rmcp::model::{
    CallToolRequestParams, CallToolResult, ListPromptsResult, ListToolsResult,
    PaginatedRequestParams, Prompt, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::{RequestContext, RoleServer};
use rmcp::{ErrorData as McpError, ServerHandler, tool, tool_router};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Arguments of the `chess_move` tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ChessMoveRequest {
    /// Source square (e.g. 'e2').
    pub from: String,
    /// Destination square (e.g. 'e4').
    pub to: String,
    /// Promotion piece for a pawn reaching the last rank (q, r, b or n). Defaults to a queen.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion: Option<String>,
}

impl From<ChessMoveRequest> for MoveRequest {
    fn from(req: ChessMoveRequest) -> Self {
        MoveRequest::Squares {
            from: req.from,
            to: req.to,
            promotion: req.promotion,
        }
    }
}

/// A prompt offered to the agent for discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChessPrompt {
    /// Identifier the agent refers to the prompt by.
    pub id: &'static str,
    /// Human-readable title.
    pub name: &'static str,
    /// What the prompt is for.
    pub description: &'static str,
}

const CHESS_PROMPTS: [ChessPrompt; 2] = [
    ChessPrompt {
        id: "get_board_state",
        name: "Get board state",
        description: "Analyze the current board position and determine a move.",
    },
    ChessPrompt {
        id: "explain_move",
        name: "Explain Move",
        description: "Make a move and explain the reasoning",
    },
];

/// The static prompt catalog.
pub fn prompts() -> &'static [ChessPrompt] {
    &CHESS_PROMPTS
}

/// MCP server handler. Every tool call goes through the agent bridge, so
/// `chess_move` returns only after the human has replied.
pub struct ChessMcpServer {
    bridge: Arc<AgentBridge<Arc<dyn MoveApi>>>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl ChessMcpServer {
    /// Creates a server driving the given bridge.
    #[instrument(skip(bridge), fields(agent_side = %bridge.agent_side()))]
    pub fn new(bridge: AgentBridge<Arc<dyn MoveApi>>) -> Self {
        info!("Creating chess MCP server");
        Self {
            bridge: Arc::new(bridge),
            tool_router: Self::tool_router(),
        }
    }

    /// Tools this server exposes, with their schemas.
    pub fn tools(&self) -> Vec<Tool> {
        self.tool_router.list_all()
    }

    /// Makes a move and waits for the opponent's reply.
    #[instrument(skip(self, req), fields(from = %req.from, to = %req.to))]
    #[tool(description = "Makes a move in the chess game using from and to square coordinates")]
    pub async fn chess_move(
        &self,
        Parameters(req): Parameters<ChessMoveRequest>,
    ) -> Result<Json<Envelope>, McpError> {
        info!("Agent requested move");
        let request = MoveRequest::from(req);
        let envelope = self
            .bridge
            .make_agent_move(&request)
            .await
            .map_err(|e| bridge_error("chess_move", e))?;
        debug!(valid = envelope.valid, fen = %envelope.board, "Returning move result");
        Ok(Json(envelope))
    }

    /// Reads the current board.
    #[instrument(skip(self))]
    #[tool(description = "Gets the current state of the chess board")]
    pub async fn chess_board(&self) -> Result<Json<Envelope>, McpError> {
        let envelope = self
            .bridge
            .get_agent_view()
            .await
            .map_err(|e| bridge_error("chess_board", e))?;
        Ok(Json(envelope))
    }
}

fn bridge_error(tool: &str, e: BridgeError) -> McpError {
    error!(tool, error = %e, "Tool call failed");
    McpError::internal_error(e.to_string(), Some(json!({ "tool": tool })))
}

fn unknown_tool(name: &str) -> McpError {
    warn!(name, "Unknown tool requested");
    McpError::invalid_params(
        format!("Unknown tool or resource: {}", name),
        Some(json!({ "name": name })),
    )
}

impl ServerHandler for ChessMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo::new(
            ServerCapabilities::builder()
                .enable_tools()
                .enable_prompts()
                .build(),
        )
        .with_instructions(
            "Chess against a human. Use chess_board to see the position and chess_move to play; \
             chess_move returns once your opponent has replied.",
        )
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        debug!(name = %request.name, "Handling CallTool request");
        if !self.tool_router.has_route(&request.name) {
            return Err(unknown_tool(&request.name));
        }
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult::with_all_items(self.tools()))
    }

    async fn list_prompts(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListPromptsResult, McpError> {
        let prompts = prompts()
            .iter()
            .map(|p| Prompt::new(p.id, Some(p.description), None).with_title(p.name))
            .collect();
        Ok(ListPromptsResult::with_all_items(prompts))
    }
}
