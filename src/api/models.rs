//! API data models

use serde::{Deserialize, Serialize};

use crate::llm::extraction::ConceptMap;

/// Request body for video analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoAnalysisRequest {
    pub youtube_link: String,
}

/// Successful analysis response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoAnalysisResponse {
    pub key_concepts: Vec<ConceptMap>,
}

/// Error payload, FastAPI-style `detail` field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

/// Health probe response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub timestamp: String,
    pub llm_available: bool,
}
