//! HTTP server implementation for the API

use anyhow::Result;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use super::{
    handlers,
    models::{ErrorResponse, VideoAnalysisRequest},
};
use crate::error::AnalyzerError;
use crate::pipeline::VideoAnalyzer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<VideoAnalyzer>,
}

/// Configure and start the HTTP server
pub async fn start_http_server(analyzer: Arc<VideoAnalyzer>, host: &str, port: u16) -> Result<()> {
    let app = router(AppState { analyzer });

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port)).await?;
    info!("🌐 API server listening on http://{}:{}", host, port);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    // Browser clients call this from arbitrary origins.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/analyze_video", post(analyze_video_handler))
        .route("/health", get(health_handler))
        .with_state(state)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(cors))
}

/// Video analysis handler
async fn analyze_video_handler(
    State(state): State<AppState>,
    Json(request): Json<VideoAnalysisRequest>,
) -> Response {
    match handlers::analyze_video(&state.analyzer, request).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => error_response(e),
    }
}

/// Health check handler
async fn health_handler(State(state): State<AppState>) -> Response {
    let health = handlers::health_check(&state.analyzer).await;
    (StatusCode::OK, Json(health)).into_response()
}

/// Map pipeline errors onto HTTP statuses and detail strings.
fn error_response(err: AnalyzerError) -> Response {
    let (status, detail) = match &err {
        AnalyzerError::InvalidReference(url) => (
            StatusCode::BAD_REQUEST,
            format!("Invalid YouTube URL: {}", url),
        ),
        AnalyzerError::EmptyTranscript => (
            StatusCode::NOT_FOUND,
            "Failed to retrieve video content".to_string(),
        ),
        AnalyzerError::NoConcepts => (
            StatusCode::NOT_FOUND,
            "Failed to extract key concepts".to_string(),
        ),
        AnalyzerError::Internal(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };

    (status, Json(ErrorResponse { detail })).into_response()
}
