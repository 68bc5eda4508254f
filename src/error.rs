//! Error taxonomy for the analysis pipeline.
//!
//! Soft conditions (unavailable transcripts, malformed LLM output) are
//! absorbed close to their source and never show up here; only the
//! failures a caller must act on cross the pipeline boundary.

use thiserror::Error;

/// Errors surfaced by [`VideoAnalyzer`](crate::pipeline::VideoAnalyzer).
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// The video reference could not be resolved to a video ID. Raised
    /// before any network call; never retried.
    #[error("invalid YouTube URL: {0}")]
    InvalidReference(String),

    /// The transcript source produced no content (disabled captions,
    /// no caption track, or a fetch failure that was absorbed as empty).
    /// "Not found" class.
    #[error("no transcript content could be retrieved for this video")]
    EmptyTranscript,

    /// Every group was dropped or came back empty; there is nothing to
    /// return. "Not found" class.
    #[error("no key concepts could be extracted from the transcript")]
    NoConcepts,

    /// Any other internal fault, carrying the original message.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AnalyzerError {
    /// True for the two "not found" conditions the outer boundary maps
    /// to a 404-class response.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::EmptyTranscript | Self::NoConcepts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_classification() {
        assert!(AnalyzerError::EmptyTranscript.is_not_found());
        assert!(AnalyzerError::NoConcepts.is_not_found());
        assert!(!AnalyzerError::InvalidReference("x".into()).is_not_found());
        assert!(!AnalyzerError::Internal(anyhow::anyhow!("boom")).is_not_found());
    }

    #[test]
    fn invalid_reference_message_contains_url() {
        let err = AnalyzerError::InvalidReference("http://example.com/clip".into());
        assert!(err.to_string().contains("http://example.com/clip"));
    }
}
