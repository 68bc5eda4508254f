//! YouTube caption retrieval without an API key.
//!
//! The watch page embeds a player-response JSON blob whose
//! `captions.playerCaptionsTracklistRenderer.captionTracks` array points
//! at the timedtext endpoint for each caption track. We scrape that blob,
//! take the first track, and fetch it in `json3` format.

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::{TranscriptError, TranscriptSegment, TranscriptSource};

const WATCH_BASE_URL: &str = "https://www.youtube.com";
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Extract the 11-character video ID from a YouTube URL.
///
/// Accepts `youtu.be/<id>` short links and `youtube.com/watch?v=<id>`
/// long links, with or without `www.`. Returns `None` for anything else.
pub fn parse_video_id(link: &str) -> Option<String> {
    let parsed = Url::parse(link).ok()?;
    let host = parsed.host_str()?;

    match host {
        "youtu.be" | "www.youtu.be" => {
            let id = parsed.path_segments()?.next()?.to_string();
            if id.is_empty() {
                None
            } else {
                Some(id)
            }
        }
        "youtube.com" | "www.youtube.com" | "m.youtube.com" => parsed
            .query_pairs()
            .find(|(key, _)| key == "v")
            .map(|(_, value)| value.into_owned())
            .filter(|id| !id.is_empty()),
        _ => None,
    }
}

/// Fetches caption tracks from youtube.com.
#[derive(Clone)]
pub struct YouTubeTranscriptClient {
    client: Client,
    base_url: String,
}

impl YouTubeTranscriptClient {
    /// Create a client with the given request timeout.
    pub fn new(timeout_seconds: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: WATCH_BASE_URL.to_string(),
        }
    }

    /// Point the client at a different watch-page host.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn fetch_watch_page(&self, video_id: &str) -> Result<String, TranscriptError> {
        let watch_url = format!("{}/watch?v={}", self.base_url, video_id);
        debug!("🌐 Fetching watch page: {}", watch_url);

        let response = self
            .client
            .get(&watch_url)
            .header("Accept-Language", "en-US,en")
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND || status == reqwest::StatusCode::GONE {
            return Err(TranscriptError::NotAvailable {
                video_id: video_id.to_string(),
            });
        }
        if !status.is_success() {
            return Err(TranscriptError::Malformed(format!(
                "watch page returned HTTP {}",
                status
            )));
        }

        Ok(response.text().await?)
    }

    /// Pull the captions JSON object out of the player-response blob.
    fn extract_captions_json(html: &str) -> Option<String> {
        let document = Html::parse_document(html);
        let selector = Selector::parse("script").ok()?;
        let pattern = Regex::new(r#"(?s)"captions":(\{.+?\}),"videoDetails""#).ok()?;

        for script in document.select(&selector) {
            let body = script.text().collect::<String>();
            if let Some(captures) = pattern.captures(&body) {
                return captures.get(1).map(|m| m.as_str().to_string());
            }
        }

        // Inline player responses are not always inside <script> tags that
        // scraper preserves verbatim, so fall back to the raw page.
        pattern
            .captures(html)
            .and_then(|captures| captures.get(1).map(|m| m.as_str().to_string()))
    }

    fn first_track(
        captions_json: &str,
        video_id: &str,
    ) -> Result<CaptionTrack, TranscriptError> {
        let captions: CaptionsWrapper = serde_json::from_str(captions_json)
            .map_err(|e| TranscriptError::Malformed(format!("captions JSON: {}", e)))?;

        captions
            .renderer
            .and_then(|renderer| renderer.caption_tracks.into_iter().next())
            .ok_or_else(|| TranscriptError::NotAvailable {
                video_id: video_id.to_string(),
            })
    }

    async fn fetch_track(&self, track: &CaptionTrack) -> Result<Vec<TranscriptSegment>, TranscriptError> {
        let track_url = if track.base_url.starts_with("http") {
            track.base_url.clone()
        } else {
            format!("{}{}", self.base_url, track.base_url)
        };
        let separator = if track_url.contains('?') { '&' } else { '?' };
        let timedtext_url = format!("{}{}fmt=json3", track_url, separator);

        debug!("🌐 Fetching caption track: {}", timedtext_url);
        let response = self.client.get(&timedtext_url).send().await?;

        if !response.status().is_success() {
            return Err(TranscriptError::Malformed(format!(
                "timedtext endpoint returned HTTP {}",
                response.status()
            )));
        }

        let timedtext: TimedTextResponse = response
            .json()
            .await
            .map_err(|e| TranscriptError::Malformed(format!("timedtext JSON: {}", e)))?;

        Ok(events_to_segments(timedtext.events))
    }
}

/// Flatten json3 events into segments, dropping styling-only events and
/// collapsing embedded newlines.
fn events_to_segments(events: Vec<TimedTextEvent>) -> Vec<TranscriptSegment> {
    events
        .into_iter()
        .filter_map(|event| {
            let segs = event.segs?;
            let text = segs
                .iter()
                .map(|seg| seg.utf8.as_str())
                .collect::<String>()
                .replace('\n', " ")
                .trim()
                .to_string();
            if text.is_empty() {
                return None;
            }
            Some(TranscriptSegment {
                text,
                start: event.start_ms as f64 / 1000.0,
            })
        })
        .collect()
}

#[async_trait]
impl TranscriptSource for YouTubeTranscriptClient {
    async fn get_transcript(
        &self,
        video_id: &str,
    ) -> Result<Vec<TranscriptSegment>, TranscriptError> {
        let html = self.fetch_watch_page(video_id).await?;

        // A watch page without a captions block means the uploader turned
        // captions off.
        let captions_json = Self::extract_captions_json(&html).ok_or_else(|| {
            TranscriptError::Disabled {
                video_id: video_id.to_string(),
            }
        })?;

        let track = Self::first_track(&captions_json, video_id)?;
        debug!(
            "📜 Using caption track '{}' for video {}",
            track.language_code, video_id
        );

        self.fetch_track(&track).await
    }
}

#[derive(Debug, Deserialize)]
struct CaptionsWrapper {
    #[serde(rename = "playerCaptionsTracklistRenderer")]
    renderer: Option<TracklistRenderer>,
}

#[derive(Debug, Deserialize)]
struct TracklistRenderer {
    #[serde(rename = "captionTracks", default)]
    caption_tracks: Vec<CaptionTrack>,
}

#[derive(Debug, Clone, Deserialize)]
struct CaptionTrack {
    #[serde(rename = "baseUrl")]
    base_url: String,
    #[serde(rename = "languageCode", default)]
    language_code: String,
}

#[derive(Debug, Deserialize)]
struct TimedTextResponse {
    #[serde(default)]
    events: Vec<TimedTextEvent>,
}

#[derive(Debug, Deserialize)]
struct TimedTextEvent {
    #[serde(rename = "tStartMs", default)]
    start_ms: u64,
    #[serde(default)]
    segs: Option<Vec<TimedTextSeg>>,
}

#[derive(Debug, Deserialize)]
struct TimedTextSeg {
    #[serde(default)]
    utf8: String,
}
