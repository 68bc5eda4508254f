//! End-to-end analysis pipeline.
//!
//! `VideoAnalyzer` wires the transcript fetcher, chunker, grouper, and
//! extraction client together. The two-phase shape (retrieve, then
//! extract) is part of the public surface so callers can inspect the
//! chunked transcript or summarize it without re-fetching.

use anyhow::Result;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::chunking::{Document, TranscriptChunker};
use crate::config::Config;
use crate::cost;
use crate::error::AnalyzerError;
use crate::grouping::{group_documents, GroupingPlan};
use crate::llm::extraction::{ConceptExtractor, ConceptMap, GroupExtraction};
use crate::llm::summary::TranscriptSummarizer;
use crate::llm::{create_llm, LLM};
use crate::transcript::youtube::YouTubeTranscriptClient;
use crate::transcript::{join_segments, TranscriptFetcher, TranscriptSource};

/// Result of a full analysis run.
#[derive(Debug, Clone, Serialize)]
pub struct VideoAnalysis {
    pub key_concepts: Vec<ConceptMap>,
    pub stats: AnalysisStats,
}

/// Run statistics reported alongside the concepts.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisStats {
    pub video_id: String,
    pub chunk_count: usize,
    pub group_count: usize,
    pub extracted_groups: usize,
    pub dropped_groups: usize,
    /// Only measured in verbose mode; counting costs one provider call
    /// per chunk.
    pub billable_characters: Option<u64>,
    pub estimated_cost: f64,
    pub completed_at: DateTime<Utc>,
}

/// Outcome of the extraction phase over already-retrieved documents.
#[derive(Debug, Clone)]
pub struct ExtractionOutcome {
    pub concepts: Vec<ConceptMap>,
    pub plan: GroupingPlan,
    pub dropped_groups: usize,
    pub estimated_cost: f64,
}

/// Orchestrates transcript retrieval and concept extraction.
pub struct VideoAnalyzer {
    fetcher: TranscriptFetcher,
    llm: Arc<dyn LLM>,
    chunker: TranscriptChunker,
    sample_size: usize,
    concurrency: usize,
    verbose: bool,
}

impl VideoAnalyzer {
    /// Build an analyzer with the real YouTube client and the configured
    /// provider.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut client = YouTubeTranscriptClient::new(config.transcript.request_timeout_seconds);
        if let Some(base_url) = &config.transcript.base_url {
            client = client.with_base_url(base_url.clone());
        }
        let llm = create_llm(&config.llm)?;
        Ok(Self::new(Arc::new(client), llm, config))
    }

    /// Build an analyzer around caller-supplied transcript source and
    /// provider.
    pub fn new(source: Arc<dyn TranscriptSource>, llm: Arc<dyn LLM>, config: &Config) -> Self {
        Self {
            fetcher: TranscriptFetcher::new(source),
            llm,
            chunker: TranscriptChunker::new(
                config.chunking.chunk_size,
                config.chunking.chunk_overlap,
            ),
            sample_size: config.extraction.sample_size,
            concurrency: config.extraction.concurrency.max(1),
            verbose: config.extraction.verbose,
        }
    }

    /// Fetch, flatten, and chunk the transcript behind `url`.
    ///
    /// An unavailable transcript yields `Ok(vec![])`; only an
    /// unparseable URL is an error.
    pub async fn retrieve_documents(&self, url: &str) -> Result<Vec<Document>, AnalyzerError> {
        let (video_id, documents) = self.retrieve_inner(url).await?;
        if self.verbose && !documents.is_empty() {
            info!("Retrieved transcript for video ID: {}", video_id);
            info!("Split into {} chunks", documents.len());
            let billable = cost::total_billable_units(self.llm.as_ref(), &documents).await;
            info!("Total Billable Characters: {}", billable);
        }
        Ok(documents)
    }

    async fn retrieve_inner(&self, url: &str) -> Result<(String, Vec<Document>), AnalyzerError> {
        let (video_id, segments) = self.fetcher.fetch(url).await?;
        if segments.is_empty() {
            return Ok((video_id, Vec::new()));
        }

        let transcript = join_segments(&segments);
        let documents = self.chunker.split(&transcript, url);
        Ok((video_id, documents))
    }

    /// Group the documents and extract one concept map per group.
    ///
    /// Groups whose replies cannot be parsed are dropped; the outcome
    /// reports how many. Requests run `concurrency` at a time and the
    /// returned maps stay in group order.
    pub async fn find_key_concepts(
        &self,
        documents: &[Document],
        sample_size: usize,
    ) -> ExtractionOutcome {
        let (plan, groups) = group_documents(documents, sample_size, self.verbose);
        if groups.is_empty() {
            error!("No documents provided to find key concepts.");
            return ExtractionOutcome {
                concepts: Vec::new(),
                plan,
                dropped_groups: 0,
                estimated_cost: 0.0,
            };
        }

        info!("Finding key concepts...");
        let extractor = ConceptExtractor::new(self.llm.clone(), self.verbose);
        let contents: Vec<String> = groups
            .iter()
            .map(|group| {
                group
                    .iter()
                    .map(|d| d.content.as_str())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect();

        let results: Vec<GroupExtraction> =
            stream::iter(contents.iter().map(|content| extractor.extract(content)))
                .buffered(self.concurrency)
                .collect()
                .await;

        let mut concepts = Vec::new();
        let mut dropped_groups = 0;
        let mut estimated_cost = 0.0;
        for result in results {
            estimated_cost += result.cost.total();
            match result.concepts {
                Some(map) => concepts.push(map),
                None => dropped_groups += 1,
            }
        }

        debug!(
            "🔍 Extracted {} of {} groups (estimated cost ${:.6})",
            concepts.len(),
            plan.group_count,
            estimated_cost
        );

        ExtractionOutcome {
            concepts,
            plan,
            dropped_groups,
            estimated_cost,
        }
    }

    /// Full retrieval and extraction for one video.
    pub async fn analyze(&self, url: &str) -> Result<VideoAnalysis, AnalyzerError> {
        let (video_id, documents) = self.retrieve_inner(url).await?;
        if documents.is_empty() {
            return Err(AnalyzerError::EmptyTranscript);
        }

        if self.verbose {
            info!("Retrieved transcript for video ID: {}", video_id);
            info!("Split into {} chunks", documents.len());
        }

        let billable_characters = if self.verbose {
            let total = cost::total_billable_units(self.llm.as_ref(), &documents).await;
            info!("Total Billable Characters: {}", total);
            Some(total)
        } else {
            None
        };

        let outcome = self.find_key_concepts(&documents, self.sample_size).await;
        if outcome.concepts.is_empty() {
            return Err(AnalyzerError::NoConcepts);
        }

        info!(
            "✅ Extracted {} concept maps for video {} ({} groups, {} dropped)",
            outcome.concepts.len(),
            video_id,
            outcome.plan.group_count,
            outcome.dropped_groups
        );

        let extracted_groups = outcome.concepts.len();
        Ok(VideoAnalysis {
            key_concepts: outcome.concepts,
            stats: AnalysisStats {
                video_id,
                chunk_count: documents.len(),
                group_count: outcome.plan.group_count,
                extracted_groups,
                dropped_groups: outcome.dropped_groups,
                billable_characters,
                estimated_cost: outcome.estimated_cost,
                completed_at: Utc::now(),
            },
        })
    }

    /// Summarize already-retrieved documents.
    pub async fn summarize(&self, documents: &[Document]) -> Option<String> {
        TranscriptSummarizer::new(self.llm.clone())
            .summarize(documents)
            .await
    }

    /// Probe the configured provider.
    pub async fn llm_available(&self) -> bool {
        self.llm.is_available().await
    }
}
