pub mod extraction;
pub mod providers;
pub mod summary;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// LLM provider types
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum LLMProvider {
    Gemini,
    OpenAI,
    LMStudio,
}

/// LLM configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMConfig {
    pub provider: LLMProvider,
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_seconds: u64,
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            provider: LLMProvider::Gemini,
            endpoint: None,
            api_key: None,
            model: "gemini-1.5-flash-002".to_string(),
            max_tokens: 4096,
            temperature: 0.1,
            timeout_seconds: 60,
        }
    }
}

/// Chat message for OpenAI-compatible wire formats
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// LLM response
#[derive(Debug, Clone)]
pub struct LLMResponse {
    pub content: String,
    pub tokens_used: Option<u32>,
}

/// Trait for LLM providers
#[async_trait]
pub trait LLM: Send + Sync {
    /// Send a single prompt and return the raw completion text.
    async fn invoke(&self, prompt: &str) -> Result<LLMResponse>;

    /// Billable units for `text` under this provider's pricing. Gemini
    /// reports billable characters from its count endpoint; providers
    /// without one fall back to the local character count.
    async fn count_billable_units(&self, text: &str) -> Result<u64>;

    async fn is_available(&self) -> bool;

    fn provider_type(&self) -> LLMProvider;
}

/// Create LLM instance based on configuration
pub fn create_llm(config: &LLMConfig) -> Result<Arc<dyn LLM>> {
    match config.provider {
        LLMProvider::Gemini => Ok(Arc::new(providers::GeminiProvider::new(config.clone())?)),
        LLMProvider::OpenAI => Ok(Arc::new(providers::OpenAIProvider::new(config.clone())?)),
        LLMProvider::LMStudio => Ok(Arc::new(providers::LMStudioProvider::new(config.clone())?)),
    }
}
