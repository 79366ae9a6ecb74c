//! HTTP routes for the move API.

use crate::envelope::Envelope;
use crate::service::{MoveService, ServiceError};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use llm_chess_core::MoveRequest;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, error, info, instrument};

/// Body of `POST /api/make-move`.
///
/// Browser clients also send the board they believe is current; it is
/// ignored in favor of the server's own position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MakeMoveBody {
    /// The move to attempt.
    #[serde(rename = "move")]
    pub mv: MoveRequest,
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        error!(error = %self, "Internal error");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "detail": self.message })),
        )
            .into_response()
    }
}

/// Builds the API router over a move service.
pub fn router(service: MoveService) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/make-move", post(make_move))
        .route("/api/reset-board", get(reset_board))
        .route("/api/get-board", get(get_board))
        .layer(middleware::from_fn(log_request))
        .layer(cors)
        .with_state(service)
}

/// Serves the API on an already-bound listener until the server stops.
#[instrument(skip_all)]
pub async fn serve(listener: TcpListener, service: MoveService) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    info!(%addr, "HTTP Server running on http://{}", addr);
    axum::serve(listener, router(service)).await
}

async fn health() -> &'static str {
    "ok"
}

async fn make_move(
    State(service): State<MoveService>,
    body: Result<Json<MakeMoveBody>, JsonRejection>,
) -> Result<Json<Envelope>, ServiceError> {
    match body {
        Ok(Json(body)) => service.make_move(&body.mv).map(Json),
        Err(rejection) => Ok(Json(service.reject_malformed(&rejection.body_text()))),
    }
}

async fn reset_board(State(service): State<MoveService>) -> Json<Envelope> {
    Json(service.reset_board())
}

async fn get_board(State(service): State<MoveService>) -> Json<Envelope> {
    Json(service.get_board())
}

async fn log_request(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let response = next.run(req).await;
    debug!(method = %method, uri = %uri, status = %response.status(), "Request handled");
    response
}
