//! HTTP entry point for clinical queries.
//!
//! ## Endpoints
//!
//! - `POST /api/clinical-query` — answer a clinical query
//! - `GET /health` — liveness probe
//!
//! Each query runs on its own spawned task, so a panic anywhere in the
//! pipeline becomes a 500 response instead of a dropped connection.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::info;
use uuid::Uuid;

use crate::config::ServerConfig;
use crate::error::{ClinicalError, Result};
use crate::pipeline::ClinicalPipeline;
use crate::types::{ClinicalRequest, QUERY_REQUIRED};

/// Message returned for any failure not caused by the request.
pub const INTERNAL_ERROR: &str = "Internal server error";

/// Message returned when the body is not a JSON request object.
pub const INVALID_BODY: &str = "Invalid request body";

/// Error response body: `{"error": "..."}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Liveness response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Shared state for axum handlers.
#[derive(Clone)]
struct AppState {
    pipeline: Arc<ClinicalPipeline>,
}

/// Build the service router around a pipeline.
pub fn router(pipeline: Arc<ClinicalPipeline>) -> Router {
    Router::new()
        .route("/api/clinical-query", post(handle_clinical_query))
        .route("/health", get(handle_health))
        .with_state(AppState { pipeline })
}

/// Clinical query HTTP server running on a background task.
pub struct ClinicalServer {
    /// The address the server is listening on.
    addr: SocketAddr,
    /// Handle to the background server task.
    handle: JoinHandle<()>,
}

impl ClinicalServer {
    /// Start the server.
    ///
    /// Binds to `{config.host}:{config.port}` (use port `0` for auto-assign)
    /// and begins serving in a background tokio task.
    ///
    /// # Errors
    ///
    /// Returns an error if the TCP listener cannot bind.
    pub async fn start(pipeline: Arc<ClinicalPipeline>, config: &ServerConfig) -> Result<Self> {
        let app = router(pipeline);

        let bind_addr = format!("{}:{}", config.host, config.port);
        let listener = TcpListener::bind(&bind_addr)
            .await
            .map_err(|e| ClinicalError::Config(format!("bind to {bind_addr} failed: {e}")))?;

        let addr = listener.local_addr()?;

        info!("clinical query server listening on http://{addr}");

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("clinical query server error: {e}");
            }
        });

        Ok(Self { addr, handle })
    }

    /// Returns the address the server is listening on.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Returns the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Abort the server task.
    pub fn shutdown(&self) {
        self.handle.abort();
    }
}

impl Drop for ClinicalServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.to_owned(),
        }),
    )
        .into_response()
}

/// `GET /health` — liveness probe.
async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_owned(),
    })
}

/// `POST /api/clinical-query` — answer a clinical query.
async fn handle_clinical_query(
    State(state): State<AppState>,
    body: std::result::Result<Json<ClinicalRequest>, JsonRejection>,
) -> Response {
    let request_id = Uuid::new_v4();

    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => {
            tracing::debug!(%request_id, error = %rejection, "rejected request body");
            return error_response(StatusCode::BAD_REQUEST, INVALID_BODY);
        }
    };

    let pipeline = Arc::clone(&state.pipeline);
    let task = tokio::spawn(async move { pipeline.run(&request).await });

    match task.await {
        Ok(Ok(answer)) => (StatusCode::OK, Json(answer)).into_response(),
        Ok(Err(ClinicalError::InvalidRequest(_))) => {
            error_response(StatusCode::BAD_REQUEST, QUERY_REQUIRED)
        }
        Ok(Err(err)) => {
            tracing::error!(%request_id, error = %err, "clinical query failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR)
        }
        Err(join_err) => {
            tracing::error!(%request_id, error = %join_err, "clinical query task aborted");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR)
        }
    }
}
