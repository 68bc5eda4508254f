//! Free-text summarization of the chunked transcript.
//!
//! Small transcripts are summarized in one request; anything over
//! [`STUFF_LIMIT`] chunks goes through a map-reduce pass so no single
//! prompt has to carry the whole transcript.

use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, error};

use super::LLM;
use crate::chunking::Document;

/// Largest chunk count summarized in a single request.
const STUFF_LIMIT: usize = 10;

fn summary_prompt(text: &str) -> String {
    format!(
        "Write a concise summary of the following:\n\n\"{}\"\n\nCONCISE SUMMARY:",
        text
    )
}

/// Produces a transcript summary through the configured provider.
pub struct TranscriptSummarizer {
    llm: Arc<dyn LLM>,
}

impl TranscriptSummarizer {
    pub fn new(llm: Arc<dyn LLM>) -> Self {
        Self { llm }
    }

    /// Summarize the chunked transcript.
    ///
    /// Returns `None` for empty input or when the provider fails; the
    /// failure is logged, never propagated.
    pub async fn summarize(&self, documents: &[Document]) -> Option<String> {
        if documents.is_empty() {
            error!("No documents provided for summary generation");
            return None;
        }

        let outcome = if documents.len() > STUFF_LIMIT {
            debug!("📝 Summarizing {} chunks with map-reduce", documents.len());
            self.map_reduce(documents).await
        } else {
            debug!("📝 Summarizing {} chunks in one pass", documents.len());
            self.stuff(documents).await
        };

        match outcome {
            Ok(summary) => Some(summary),
            Err(e) => {
                error!("Failed to generate summary: {}", e);
                None
            }
        }
    }

    async fn stuff(&self, documents: &[Document]) -> Result<String> {
        let combined = documents
            .iter()
            .map(|d| d.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        let response = self.llm.invoke(&summary_prompt(&combined)).await?;
        Ok(response.content.trim().to_string())
    }

    async fn map_reduce(&self, documents: &[Document]) -> Result<String> {
        let mut partials = Vec::with_capacity(documents.len());
        for document in documents {
            let response = self.llm.invoke(&summary_prompt(&document.content)).await?;
            partials.push(response.content.trim().to_string());
        }

        let combined = partials.join("\n\n");
        let response = self.llm.invoke(&summary_prompt(&combined)).await?;
        Ok(response.content.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{LLMProvider, LLMResponse};
    use anyhow::anyhow;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingLLM {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingLLM {
        fn new(fail: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail,
            }
        }
    }

    #[async_trait]
    impl LLM for CountingLLM {
        async fn invoke(&self, _prompt: &str) -> Result<LLMResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(anyhow!("provider down"));
            }
            Ok(LLMResponse {
                content: "a summary".to_string(),
                tokens_used: None,
            })
        }

        async fn count_billable_units(&self, text: &str) -> Result<u64> {
            Ok(text.chars().count() as u64)
        }

        async fn is_available(&self) -> bool {
            !self.fail
        }

        fn provider_type(&self) -> LLMProvider {
            LLMProvider::LMStudio
        }
    }

    fn docs(n: usize) -> Vec<Document> {
        (0..n)
            .map(|i| Document::new(format!("chunk {}", i), "video"))
            .collect()
    }

    #[tokio::test]
    async fn empty_input_yields_none() {
        let summarizer = TranscriptSummarizer::new(Arc::new(CountingLLM::new(false)));
        assert!(summarizer.summarize(&[]).await.is_none());
    }

    #[tokio::test]
    async fn small_batches_use_a_single_request() {
        let llm = Arc::new(CountingLLM::new(false));
        let summarizer = TranscriptSummarizer::new(llm.clone());
        let summary = summarizer.summarize(&docs(10)).await;
        assert_eq!(summary.as_deref(), Some("a summary"));
        assert_eq!(llm.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn large_batches_map_then_reduce() {
        let llm = Arc::new(CountingLLM::new(false));
        let summarizer = TranscriptSummarizer::new(llm.clone());
        let summary = summarizer.summarize(&docs(11)).await;
        assert!(summary.is_some());
        // One request per chunk plus the combining request.
        assert_eq!(llm.calls.load(Ordering::SeqCst), 12);
    }

    #[tokio::test]
    async fn provider_failure_yields_none() {
        let summarizer = TranscriptSummarizer::new(Arc::new(CountingLLM::new(true)));
        assert!(summarizer.summarize(&docs(3)).await.is_none());
    }
}
