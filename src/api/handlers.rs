//! API request handlers

use std::sync::Arc;

use crate::error::AnalyzerError;
use crate::pipeline::VideoAnalyzer;

use super::models::{HealthResponse, VideoAnalysisRequest, VideoAnalysisResponse};

/// Run the full analysis for one request.
pub async fn analyze_video(
    analyzer: &Arc<VideoAnalyzer>,
    request: VideoAnalysisRequest,
) -> Result<VideoAnalysisResponse, AnalyzerError> {
    let analysis = analyzer.analyze(&request.youtube_link).await?;
    Ok(VideoAnalysisResponse {
        key_concepts: analysis.key_concepts,
    })
}

/// Handle health check requests
pub async fn health_check(analyzer: &Arc<VideoAnalyzer>) -> HealthResponse {
    HealthResponse {
        status: "healthy".to_string(),
        service: "keyconcepts".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        llm_available: analyzer.llm_available().await,
    }
}
