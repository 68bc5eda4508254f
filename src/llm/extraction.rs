//! Key-concept extraction from grouped transcript text.
//!
//! One LLM request per group. The model is told to answer with a bare
//! JSON object mapping concept names to definitions; because models
//! routinely wrap that object in prose or code fences, the reply is
//! clipped to its outermost brace span before parsing. A group whose
//! reply still fails to parse is dropped, not fatal.

use serde_json::Value;
use std::sync::Arc;
use tracing::error;

use super::LLM;
use crate::cost::RequestCost;

/// Concept name to definition, as returned by the model. Values stay as
/// raw JSON so models that answer with nested structures are tolerated.
pub type ConceptMap = serde_json::Map<String, Value>;

/// Build the extraction prompt for one group's content.
pub fn build_concept_prompt(text: &str) -> String {
    format!(
        "Find and define key concepts and definitions found in the following text:\n\
         {}\n\
         Respond only in clean JSON format without any labels or additional text. \
         The output needs to look exactly like this:\n\
         {{\"concept1\": \"definition1\", \"concept2\": \"definition2\", ...}}",
        text
    )
}

/// Clip `raw` to the span from its first `{` to its last `}`.
///
/// Returns `None` when either brace is missing or the last `}` comes
/// before the first `{`.
pub fn clean_json_span(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&raw[start..=end])
}

/// Outcome of one group's extraction request.
#[derive(Debug, Clone)]
pub struct GroupExtraction {
    /// `None` when the request failed or the reply was unparseable.
    pub concepts: Option<ConceptMap>,
    pub cost: RequestCost,
}

/// Runs concept extraction against a provider.
pub struct ConceptExtractor {
    llm: Arc<dyn LLM>,
    verbose: bool,
}

impl ConceptExtractor {
    pub fn new(llm: Arc<dyn LLM>, verbose: bool) -> Self {
        Self { llm, verbose }
    }

    /// Extract concepts from one group's combined content.
    ///
    /// Request and parse failures are logged and reported as an empty
    /// result so a single bad group cannot abort the batch.
    pub async fn extract(&self, group_content: &str) -> GroupExtraction {
        let prompt = build_concept_prompt(group_content);
        let input_chars = group_content.chars().count();

        let raw = match self.llm.invoke(&prompt).await {
            Ok(response) => response.content,
            Err(e) => {
                error!("❌ LLM request failed for group: {}", e);
                return GroupExtraction {
                    concepts: None,
                    cost: RequestCost::for_exchange(input_chars, 0),
                };
            }
        };

        let cost = RequestCost::for_exchange(input_chars, raw.chars().count());
        if self.verbose {
            cost.log_details();
        }

        let concepts = match clean_json_span(&raw) {
            Some(span) => match serde_json::from_str::<ConceptMap>(span) {
                Ok(map) => Some(map),
                Err(e) => {
                    error!("Failed to parse JSON: {}", e);
                    None
                }
            },
            None => {
                error!("No JSON object found in LLM output");
                None
            }
        };

        GroupExtraction { concepts, cost }
    }
}
