//! Key-concept extraction from YouTube video transcripts.
//!
//! Fetches a video's caption track, chunks the flattened transcript into
//! fixed-size documents, partitions them into groups, and asks an LLM
//! for a concept-to-definition map per group. An optional axum API
//! exposes the pipeline over HTTP.

pub mod chunking;
pub mod config;
pub mod cost;
pub mod error;
pub mod grouping;
pub mod llm;
pub mod pipeline;
pub mod transcript;

#[cfg(feature = "api")]
pub mod api;

// Re-export main types for easy access
pub use crate::chunking::{Document, TranscriptChunker};
pub use crate::config::{Config, ConfigBuilder};
pub use crate::error::AnalyzerError;
pub use crate::grouping::{GroupingPlan, QualityWarning};
pub use crate::llm::extraction::{ConceptExtractor, ConceptMap};
pub use crate::llm::summary::TranscriptSummarizer;
pub use crate::llm::{create_llm, LLMConfig, LLMProvider, LLMResponse, LLM};
pub use crate::pipeline::{AnalysisStats, ExtractionOutcome, VideoAnalysis, VideoAnalyzer};
pub use crate::transcript::{TranscriptFetcher, TranscriptSegment, TranscriptSource};
