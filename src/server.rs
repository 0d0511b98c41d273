//! HTTP façade (spec.md §4.J), exposing `POST /analyze` over the same
//! `engine::analyze` orchestration the CLI drives. This module has no
//! teacher analogue — it is an enrichment grounded in the pack's
//! `rdaum-moor/crates/web-host` handlers: a plain `axum::Json` request body,
//! a `StatusCode`/`Json` response built by hand rather than a derived
//! `IntoResponse`, and fatal errors mapped to 4xx/5xx via
//! `AnalysisError::is_client_error`.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use tracing::info;

use crate::config::AnalysisOptions;
use crate::diagnostics::AnalysisError;
use crate::engine;

#[derive(Clone)]
struct AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeRequest {
    source_text: String,
    #[serde(default)]
    source_name: Option<String>,
    #[serde(default)]
    options: AnalysisOptions,
}

/// Binds a `POST /analyze` listener on `port` and serves until the process
/// is signalled to stop.
pub async fn serve(port: u16) -> Result<(), AnalysisError> {
    let app = Router::new()
        .route("/analyze", post(analyze_handler))
        .with_state(AppState);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AnalysisError::Internal {
            message: format!("failed to bind {addr}: {e}"),
        })?;

    info!(%addr, "sympath HTTP façade listening");

    axum::serve(listener, app)
        .await
        .map_err(|e| AnalysisError::Internal {
            message: format!("server error: {e}"),
        })
}

async fn analyze_handler(
    State(_state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Response {
    let source_name = request.source_name.unwrap_or_else(|| "<request>".to_string());
    match engine::analyze(&source_name, &request.source_text, &request.options) {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(err) => {
            let status = if err.is_client_error() {
                StatusCode::BAD_REQUEST
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            let body = serde_json::json!({ "error": err.to_string() });
            (status, Json(body)).into_response()
        }
    }
}
