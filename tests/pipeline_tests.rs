//! End-to-end pipeline tests with mocked transcript source and provider.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use keyconcepts::config::{Config, ConfigBuilder};
use keyconcepts::error::AnalyzerError;
use keyconcepts::llm::{LLMProvider, LLMResponse, LLM};
use keyconcepts::transcript::{TranscriptError, TranscriptSegment, TranscriptSource};
use keyconcepts::VideoAnalyzer;

const VIDEO_URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

/// 1,200 ten-character words, so a 1,000-character window always ends on
/// whitespace and every chunk holds exactly 100 distinct words.
fn transcript_text() -> String {
    (0..1200).map(|i| format!("w{:08} ", i)).collect()
}

fn first_word(text: &str) -> &str {
    text.split_whitespace().next().unwrap_or("")
}

struct FixedTranscript {
    text: String,
}

#[async_trait]
impl TranscriptSource for FixedTranscript {
    async fn get_transcript(
        &self,
        _video_id: &str,
    ) -> Result<Vec<TranscriptSegment>, TranscriptError> {
        Ok(vec![TranscriptSegment {
            text: self.text.clone(),
            start: 0.0,
        }])
    }
}

/// Replies with a JSON object keyed by the first word of the group's
/// content, so tests can match output maps back to input groups.
struct KeyedLLM {
    calls: AtomicUsize,
    /// Groups whose first word is listed here get an unparseable reply.
    garbage_for: Vec<String>,
    /// Delay applied to the first call only.
    first_call_delay: Option<Duration>,
    fail_transport: bool,
}

impl KeyedLLM {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            garbage_for: Vec::new(),
            first_call_delay: None,
            fail_transport: false,
        }
    }

    fn garbage_for(mut self, words: &[&str]) -> Self {
        self.garbage_for = words.iter().map(|w| w.to_string()).collect();
        self
    }

    fn delay_first_call(mut self, delay: Duration) -> Self {
        self.first_call_delay = Some(delay);
        self
    }

    fn failing() -> Self {
        Self {
            fail_transport: true,
            ..Self::new()
        }
    }
}

#[async_trait]
impl LLM for KeyedLLM {
    async fn invoke(&self, prompt: &str) -> Result<LLMResponse> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_transport {
            return Err(anyhow!("connection reset"));
        }
        if call == 0 {
            if let Some(delay) = self.first_call_delay {
                tokio::time::sleep(delay).await;
            }
        }

        // The group's content follows the first prompt line.
        let content = prompt.lines().nth(1).unwrap_or("");
        let key = first_word(content).to_string();

        if self.garbage_for.contains(&key) {
            return Ok(LLMResponse {
                content: "no concepts found, sorry".to_string(),
                tokens_used: None,
            });
        }

        Ok(LLMResponse {
            content: format!(r#"{{"group_{}": "definition"}}"#, key),
            tokens_used: None,
        })
    }

    async fn count_billable_units(&self, text: &str) -> Result<u64> {
        Ok(text.chars().count() as u64)
    }

    async fn is_available(&self) -> bool {
        !self.fail_transport
    }

    fn provider_type(&self) -> LLMProvider {
        LLMProvider::LMStudio
    }
}

fn analyzer_with(llm: Arc<dyn LLM>, config: &Config) -> VideoAnalyzer {
    VideoAnalyzer::new(
        Arc::new(FixedTranscript {
            text: transcript_text(),
        }),
        llm,
        config,
    )
}

#[tokio::test]
async fn twelve_thousand_chars_flow_through_two_groups() {
    let analyzer = analyzer_with(Arc::new(KeyedLLM::new()), &Config::default());

    let documents = analyzer.retrieve_documents(VIDEO_URL).await.unwrap();
    assert_eq!(documents.len(), 12);
    assert!(documents
        .iter()
        .all(|d| d.content.chars().count() == 1000));
    assert!(documents.iter().all(|d| d.source == VIDEO_URL));

    // Default sample: 12 / 5 = 2 groups of 6 chunks.
    let outcome = analyzer.find_key_concepts(&documents, 0).await;
    assert_eq!(outcome.plan.sample_size, 2);
    assert_eq!(outcome.plan.docs_per_group, 6);
    assert_eq!(outcome.concepts.len(), 2);
    assert_eq!(outcome.dropped_groups, 0);

    // Concept maps come back in group order: group 0 starts at word 0,
    // group 1 at word 600.
    assert!(outcome.concepts[0].contains_key("group_w00000000"));
    assert!(outcome.concepts[1].contains_key("group_w00000600"));
}

#[tokio::test]
async fn analyze_reports_stats_for_the_run() {
    let analyzer = analyzer_with(Arc::new(KeyedLLM::new()), &Config::default());

    let analysis = analyzer.analyze(VIDEO_URL).await.unwrap();
    assert_eq!(analysis.key_concepts.len(), 2);

    let stats = &analysis.stats;
    assert_eq!(stats.video_id, "dQw4w9WgXcQ");
    assert_eq!(stats.chunk_count, 12);
    assert_eq!(stats.group_count, 2);
    assert_eq!(stats.extracted_groups, 2);
    assert_eq!(stats.dropped_groups, 0);
    assert!(stats.billable_characters.is_none());
    assert!(stats.estimated_cost > 0.0);
}

#[tokio::test]
async fn verbose_mode_measures_billable_characters() {
    let config = ConfigBuilder::new().verbose(true).build();
    let analyzer = analyzer_with(Arc::new(KeyedLLM::new()), &config);

    let analysis = analyzer.analyze(VIDEO_URL).await.unwrap();
    // The mock counts characters, so 12 chunks of 1,000 come back whole.
    assert_eq!(analysis.stats.billable_characters, Some(12_000));
}

#[tokio::test]
async fn unparseable_group_is_dropped_but_others_survive() {
    let llm = KeyedLLM::new().garbage_for(&["w00000600"]);
    let analyzer = analyzer_with(Arc::new(llm), &Config::default());

    let analysis = analyzer.analyze(VIDEO_URL).await.unwrap();
    assert_eq!(analysis.key_concepts.len(), 1);
    assert!(analysis.key_concepts[0].contains_key("group_w00000000"));
    assert_eq!(analysis.stats.dropped_groups, 1);
    assert_eq!(analysis.stats.extracted_groups, 1);
}

#[tokio::test]
async fn all_groups_dropped_means_no_concepts() {
    let llm = KeyedLLM::new().garbage_for(&["w00000000", "w00000600"]);
    let analyzer = analyzer_with(Arc::new(llm), &Config::default());

    let err = analyzer.analyze(VIDEO_URL).await.unwrap_err();
    assert!(matches!(err, AnalyzerError::NoConcepts));
}

#[tokio::test]
async fn transport_failures_surface_as_no_concepts() {
    let analyzer = analyzer_with(Arc::new(KeyedLLM::failing()), &Config::default());

    let err = analyzer.analyze(VIDEO_URL).await.unwrap_err();
    assert!(matches!(err, AnalyzerError::NoConcepts));
}

#[tokio::test]
async fn concurrent_extraction_preserves_group_order() {
    // Slow down the first group so later groups finish before it.
    let llm = KeyedLLM::new().delay_first_call(Duration::from_millis(50));
    let config = ConfigBuilder::new().with_concurrency(4).build();
    let analyzer = analyzer_with(Arc::new(llm), &config);

    let documents = analyzer.retrieve_documents(VIDEO_URL).await.unwrap();
    let outcome = analyzer.find_key_concepts(&documents, 4).await;

    assert_eq!(outcome.concepts.len(), 4);
    assert!(outcome.concepts[0].contains_key("group_w00000000"));
    assert!(outcome.concepts[1].contains_key("group_w00000300"));
    assert!(outcome.concepts[2].contains_key("group_w00000600"));
    assert!(outcome.concepts[3].contains_key("group_w00000900"));
}

#[tokio::test]
async fn extraction_is_idempotent_under_a_deterministic_provider() {
    let analyzer = analyzer_with(Arc::new(KeyedLLM::new()), &Config::default());
    let documents = analyzer.retrieve_documents(VIDEO_URL).await.unwrap();

    let first = analyzer.find_key_concepts(&documents, 0).await;
    let second = analyzer.find_key_concepts(&documents, 0).await;

    assert_eq!(first.concepts, second.concepts);
    assert_eq!(first.plan, second.plan);
    assert_eq!(first.dropped_groups, second.dropped_groups);
}

#[tokio::test]
async fn explicit_sample_size_controls_group_count() {
    let analyzer = analyzer_with(Arc::new(KeyedLLM::new()), &Config::default());

    let documents = analyzer.retrieve_documents(VIDEO_URL).await.unwrap();
    let outcome = analyzer.find_key_concepts(&documents, 12).await;

    assert_eq!(outcome.plan.docs_per_group, 1);
    assert_eq!(outcome.concepts.len(), 12);
}

#[tokio::test]
async fn empty_object_reply_still_counts_as_extracted() {
    struct EmptyObjectLLM;

    #[async_trait]
    impl LLM for EmptyObjectLLM {
        async fn invoke(&self, _prompt: &str) -> Result<LLMResponse> {
            Ok(LLMResponse {
                content: "{}".to_string(),
                tokens_used: None,
            })
        }

        async fn count_billable_units(&self, text: &str) -> Result<u64> {
            Ok(text.chars().count() as u64)
        }

        async fn is_available(&self) -> bool {
            true
        }

        fn provider_type(&self) -> LLMProvider {
            LLMProvider::LMStudio
        }
    }

    let analyzer = analyzer_with(Arc::new(EmptyObjectLLM), &Config::default());
    let analysis = analyzer.analyze(VIDEO_URL).await.unwrap();
    assert_eq!(analysis.key_concepts.len(), 2);
    assert!(analysis.key_concepts.iter().all(|map| map.is_empty()));
}

#[tokio::test]
async fn summarize_uses_map_reduce_over_many_chunks() {
    let llm = Arc::new(KeyedLLM::new());
    let analyzer = analyzer_with(llm.clone(), &Config::default());

    let documents = analyzer.retrieve_documents(VIDEO_URL).await.unwrap();
    let summary = analyzer.summarize(&documents).await;

    assert!(summary.is_some());
    // 12 chunks exceed the single-request limit: one call per chunk plus
    // the combining call.
    assert_eq!(llm.calls.load(Ordering::SeqCst), 13);
}
