use std::time::Duration;

use crate::config::ExtractorConfig;
use crate::error::PipelineError;
use crate::pipeline::RecipePipeline;
use crate::providers::{ProviderFactory, StructuredExtractor};

/// Extraction service to use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAI,
    Anthropic,
    Ollama,
    /// Offline, heading-driven extraction
    RuleBased,
}

impl Provider {
    /// Convert to provider name string used by the factory
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAI => "openai",
            Provider::Anthropic => "anthropic",
            Provider::Ollama => "ollama",
            Provider::RuleBased => "rule_based",
        }
    }
}

/// Builder for configuring a [`RecipePipeline`]
#[derive(Default)]
pub struct RecipePipelineBuilder {
    config: Option<ExtractorConfig>,
    provider: Option<Provider>,
    timeout: Option<Duration>,
    api_key: Option<String>,
    model: Option<String>,
    extractor: Option<Box<dyn StructuredExtractor>>,
}

impl RecipePipelineBuilder {
    /// Start from an explicit configuration instead of the defaults
    pub fn config(mut self, config: ExtractorConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the extraction provider
    ///
    /// # Example
    /// ```
    /// use recipe_extract::{Provider, RecipePipeline};
    ///
    /// let builder = RecipePipeline::builder().provider(Provider::Anthropic);
    /// ```
    pub fn provider(mut self, provider: Provider) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set a timeout for extraction service requests
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Set the API key for the provider
    ///
    /// This allows passing the API key directly instead of relying on
    /// environment variables or config files.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the model name for the provider
    ///
    /// # Example
    /// ```
    /// use recipe_extract::{Provider, RecipePipeline};
    ///
    /// let builder = RecipePipeline::builder()
    ///     .provider(Provider::OpenAI)
    ///     .model("gpt-4o");
    /// ```
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Use a ready-made extractor; provider, key and model are then ignored
    pub fn extractor(mut self, extractor: Box<dyn StructuredExtractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    /// Assemble the pipeline
    ///
    /// # Errors
    /// Returns [`PipelineError::Setup`] if the provider cannot be created,
    /// for example when no API key is available.
    ///
    /// # Example
    /// ```
    /// # use recipe_extract::{Provider, RecipePipeline};
    /// let pipeline = RecipePipeline::builder()
    ///     .provider(Provider::RuleBased)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(pipeline.provider_name(), "rule_based");
    /// ```
    pub fn build(self) -> Result<RecipePipeline, PipelineError> {
        let mut config = self.config.unwrap_or_default();
        if let Some(timeout) = self.timeout {
            config.timeout = timeout.as_secs().max(1);
        }

        if let Some(extractor) = self.extractor {
            return RecipePipeline::with_extractor(&config, extractor);
        }

        let provider_name = self
            .provider
            .map(|p| p.as_str().to_string())
            .unwrap_or_else(|| config.default_provider.clone());

        let mut provider_config = config.provider(&provider_name);
        if let Some(api_key) = self.api_key {
            provider_config.api_key = Some(api_key);
        }
        if let Some(model) = self.model {
            provider_config.model = model;
        }

        let extractor =
            ProviderFactory::create(&provider_name, &provider_config, config.service_timeout())
                .map_err(|e| PipelineError::Setup(e.to_string()))?;

        RecipePipeline::with_extractor(&config, extractor)
    }
}
