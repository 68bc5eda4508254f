use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::llm::{LLMConfig, LLMProvider};

/// Configuration for the key-concept analyzer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Transcript retrieval settings
    pub transcript: TranscriptConfig,

    /// Transcript chunking settings
    pub chunking: ChunkingConfig,

    /// Concept extraction settings
    pub extraction: ExtractionConfig,

    /// LLM provider settings
    pub llm: LLMConfig,

    /// Web API settings
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptConfig {
    /// Override for the watch-page host (testing; None = youtube.com)
    pub base_url: Option<String>,

    /// HTTP request timeout in seconds
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Chunk window size in characters
    pub chunk_size: usize,

    /// Characters repeated between consecutive chunks
    pub chunk_overlap: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Target group count (0 = one fifth of the chunk count)
    pub sample_size: usize,

    /// Concurrent extraction requests
    pub concurrency: usize,

    /// Log per-group cost and billable-character details
    pub verbose: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address for the API server
    pub host: String,

    /// Bind port for the API server
    pub port: u16,
}

impl Config {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        // Try to load from various locations
        let config_paths = [
            "keyconcepts.toml",
            "config/keyconcepts.toml",
            "~/.config/keyconcepts/config.toml",
            "/etc/keyconcepts/config.toml",
        ];

        for path in &config_paths {
            if let Ok(config_str) = std::fs::read_to_string(path) {
                match toml::from_str(&config_str) {
                    Ok(config) => {
                        tracing::info!("📄 Loaded configuration from: {}", path);
                        return Ok(config);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config file {}: {}", path, e);
                    }
                }
            }
        }

        // Try environment variables
        if let Ok(config) = Self::from_env() {
            return Ok(config);
        }

        Err(anyhow!("No configuration file found"))
    }

    /// Load configuration from an explicit file path
    pub fn load_from(path: &str) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;
        let config = toml::from_str(&config_str)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;
        tracing::info!("📄 Loaded configuration from: {}", path);
        Ok(config)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        // Override with environment variables
        if let Ok(provider) = std::env::var("KEYCONCEPTS_PROVIDER") {
            match provider.to_lowercase().as_str() {
                "gemini" => config.llm.provider = LLMProvider::Gemini,
                "openai" => config.llm.provider = LLMProvider::OpenAI,
                "lmstudio" => config.llm.provider = LLMProvider::LMStudio,
                other => tracing::warn!("Unknown LLM provider '{}', keeping default", other),
            }
        }

        if let Ok(api_key) = std::env::var("KEYCONCEPTS_API_KEY") {
            config.llm.api_key = Some(api_key);
        }

        if let Ok(model) = std::env::var("KEYCONCEPTS_MODEL") {
            config.llm.model = model;
        }

        if let Ok(endpoint) = std::env::var("KEYCONCEPTS_ENDPOINT") {
            config.llm.endpoint = Some(endpoint);
        }

        if let Ok(sample_size) = std::env::var("KEYCONCEPTS_SAMPLE_SIZE") {
            config.extraction.sample_size = sample_size.parse().unwrap_or(0);
        }

        if let Ok(concurrency) = std::env::var("KEYCONCEPTS_CONCURRENCY") {
            config.extraction.concurrency = concurrency.parse().unwrap_or(1);
        }

        if let Ok(chunk_size) = std::env::var("KEYCONCEPTS_CHUNK_SIZE") {
            config.chunking.chunk_size = chunk_size.parse().unwrap_or(1000);
        }

        if let Ok(port) = std::env::var("KEYCONCEPTS_PORT") {
            config.server.port = port.parse().unwrap_or(8000);
        }

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &str) -> Result<()> {
        let config_str = toml::to_string_pretty(self)?;
        std::fs::write(path, config_str)?;
        tracing::info!("💾 Configuration saved to: {}", path);
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.chunking.chunk_size == 0 {
            return Err(anyhow!("chunk_size must be greater than 0"));
        }

        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return Err(anyhow!("chunk_overlap must be smaller than chunk_size"));
        }

        if self.extraction.concurrency == 0 {
            return Err(anyhow!("concurrency must be at least 1"));
        }

        if self.transcript.request_timeout_seconds == 0 {
            return Err(anyhow!("request_timeout_seconds must be greater than 0"));
        }

        match self.llm.provider {
            LLMProvider::Gemini | LLMProvider::OpenAI => {
                if self.llm.api_key.is_none() {
                    return Err(anyhow!(
                        "API key required for {:?} provider",
                        self.llm.provider
                    ));
                }
            }
            LLMProvider::LMStudio => {
                if self.llm.endpoint.is_none() {
                    return Err(anyhow!("Endpoint required for LMStudio provider"));
                }
            }
        }

        tracing::info!("✅ Configuration validation passed");
        Ok(())
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "Key Concepts Analyzer Configuration:\n\
            - LLM Provider: {:?}\n\
            - Model: {}\n\
            - Chunk Size: {} chars (overlap {})\n\
            - Sample Size: {} (0 = adaptive)\n\
            - Extraction Concurrency: {}\n\
            - Transcript Timeout: {}s\n\
            - Server: {}:{}",
            self.llm.provider,
            self.llm.model,
            self.chunking.chunk_size,
            self.chunking.chunk_overlap,
            self.extraction.sample_size,
            self.extraction.concurrency,
            self.transcript.request_timeout_seconds,
            self.server.host,
            self.server.port
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            transcript: TranscriptConfig {
                base_url: None,
                request_timeout_seconds: 30,
            },
            chunking: ChunkingConfig {
                chunk_size: 1000,
                chunk_overlap: 0,
            },
            extraction: ExtractionConfig {
                sample_size: 0,
                concurrency: 1,
                verbose: false,
            },
            llm: LLMConfig::default(),
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
            },
        }
    }
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_provider(mut self, provider: LLMProvider) -> Self {
        self.config.llm.provider = provider;
        self
    }

    pub fn with_api_key(mut self, api_key: String) -> Self {
        self.config.llm.api_key = Some(api_key);
        self
    }

    pub fn with_model(mut self, model: String) -> Self {
        self.config.llm.model = model;
        self
    }

    pub fn with_endpoint(mut self, endpoint: String) -> Self {
        self.config.llm.endpoint = Some(endpoint);
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.config.chunking.chunk_size = chunk_size;
        self
    }

    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.config.extraction.sample_size = sample_size;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.config.extraction.concurrency = concurrency;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.config.extraction.verbose = verbose;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.chunking.chunk_size, 1000);
        assert_eq!(config.chunking.chunk_overlap, 0);
        assert_eq!(config.extraction.sample_size, 0);
        assert_eq!(config.extraction.concurrency, 1);
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.llm.provider, LLMProvider::Gemini);
    }

    #[test]
    fn test_config_builder() {
        let config = ConfigBuilder::new()
            .with_provider(LLMProvider::LMStudio)
            .with_endpoint("http://localhost:1234/v1/chat/completions".to_string())
            .with_chunk_size(500)
            .with_sample_size(4)
            .with_concurrency(3)
            .verbose(true)
            .build();

        assert_eq!(config.llm.provider, LLMProvider::LMStudio);
        assert_eq!(config.chunking.chunk_size, 500);
        assert_eq!(config.extraction.sample_size, 4);
        assert_eq!(config.extraction.concurrency, 3);
        assert!(config.extraction.verbose);
    }

    #[test]
    fn test_validation_requires_provider_credentials() {
        // Gemini is the default and needs a key.
        assert!(Config::default().validate().is_err());

        let with_key = ConfigBuilder::new()
            .with_api_key("test-key".to_string())
            .build();
        assert!(with_key.validate().is_ok());

        let lmstudio = ConfigBuilder::new()
            .with_provider(LLMProvider::LMStudio)
            .with_endpoint("http://localhost:1234/v1/chat/completions".to_string())
            .build();
        assert!(lmstudio.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_chunking() {
        let mut config = ConfigBuilder::new()
            .with_api_key("test-key".to_string())
            .build();

        config.chunking.chunk_size = 0;
        assert!(config.validate().is_err());

        config.chunking.chunk_size = 100;
        config.chunking.chunk_overlap = 100;
        assert!(config.validate().is_err());

        config.chunking.chunk_overlap = 99;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_zero_concurrency() {
        let mut config = ConfigBuilder::new()
            .with_api_key("test-key".to_string())
            .build();
        config.extraction.concurrency = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");

        let config = ConfigBuilder::new()
            .with_api_key("test-key".to_string())
            .with_chunk_size(750)
            .build();
        config.save(path.to_str().unwrap()).unwrap();

        let loaded = Config::load_from(path.to_str().unwrap()).unwrap();
        assert_eq!(loaded.chunking.chunk_size, 750);
        assert_eq!(loaded.llm.api_key.as_deref(), Some("test-key"));

        let missing = dir.path().join("nope.toml");
        assert!(Config::load_from(missing.to_str().unwrap()).is_err());
    }

    #[test]
    fn test_save_round_trips_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keyconcepts.toml");

        let config = ConfigBuilder::new()
            .with_api_key("test-key".to_string())
            .with_sample_size(7)
            .build();
        config.save(path.to_str().unwrap()).unwrap();

        let reloaded: Config =
            toml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(reloaded.extraction.sample_size, 7);
        assert_eq!(reloaded.llm.api_key.as_deref(), Some("test-key"));
    }
}
