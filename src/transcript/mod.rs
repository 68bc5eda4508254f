//! Transcript retrieval.
//!
//! A [`TranscriptSource`] produces timed caption segments for a video ID;
//! [`TranscriptFetcher`] wraps a source with URL parsing and the
//! fail-soft policy: unavailable transcripts become an empty segment
//! list rather than an error, so downstream stages can report "nothing
//! retrieved" uniformly.

pub mod youtube;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::error::AnalyzerError;
use youtube::parse_video_id;

/// A single caption segment with its start offset in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub text: String,
    pub start: f64,
}

/// Errors a transcript source can raise.
#[derive(Debug, Error)]
pub enum TranscriptError {
    /// Captions are switched off for this video.
    #[error("transcripts are disabled for video {video_id}")]
    Disabled { video_id: String },

    /// The video exists but exposes no caption track.
    #[error("no transcript is available for video {video_id}")]
    NotAvailable { video_id: String },

    /// Transport-level failure talking to the caption host.
    #[error("transcript request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The response arrived but could not be understood.
    #[error("malformed transcript payload: {0}")]
    Malformed(String),
}

/// Anything that can turn a video ID into caption segments.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    async fn get_transcript(&self, video_id: &str)
        -> Result<Vec<TranscriptSegment>, TranscriptError>;
}

/// Fetches transcripts by video URL, absorbing unavailability.
pub struct TranscriptFetcher {
    source: Arc<dyn TranscriptSource>,
}

impl TranscriptFetcher {
    pub fn new(source: Arc<dyn TranscriptSource>) -> Self {
        Self { source }
    }

    /// Resolve `url` to a video ID and fetch its transcript.
    ///
    /// An unparseable URL is a hard error. Disabled or missing captions
    /// and transport failures all collapse to an empty segment list;
    /// the caller decides what an empty transcript means.
    pub async fn fetch(&self, url: &str) -> Result<(String, Vec<TranscriptSegment>), AnalyzerError> {
        let video_id =
            parse_video_id(url).ok_or_else(|| AnalyzerError::InvalidReference(url.to_string()))?;

        debug!("📹 Fetching transcript for video {}", video_id);

        match self.source.get_transcript(&video_id).await {
            Ok(segments) => {
                debug!("✅ Retrieved {} transcript segments", segments.len());
                Ok((video_id, segments))
            }
            Err(TranscriptError::Disabled { .. }) => {
                warn!("⚠️ Transcripts are disabled for video {}", video_id);
                Ok((video_id, Vec::new()))
            }
            Err(TranscriptError::NotAvailable { .. }) => {
                warn!("⚠️ No transcript available for video {}", video_id);
                Ok((video_id, Vec::new()))
            }
            Err(e) => {
                warn!("⚠️ Transcript fetch failed for video {}: {}", video_id, e);
                Ok((video_id, Vec::new()))
            }
        }
    }
}

/// Join segment texts into one space-separated transcript string.
pub fn join_segments(segments: &[TranscriptSegment]) -> String {
    segments
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
