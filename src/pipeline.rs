use log::{info, warn};

use crate::builder::RecipePipelineBuilder;
use crate::config::ExtractorConfig;
use crate::engine::ExtractionEngine;
use crate::error::{ExtractionError, PipelineError};
use crate::model::Recipe;
use crate::providers::{ProviderFactory, StructuredExtractor};
use crate::schema::Strictness;
use crate::url_to_text::{ContentAcquirer, NormalizedContent};

/// URL in, validated [`Recipe`] out.
///
/// Acquisition and extraction run one after the other. Configuration and
/// HTTP clients are fixed at construction, so one pipeline can be shared
/// across tasks.
pub struct RecipePipeline {
    acquirer: ContentAcquirer,
    engine: ExtractionEngine,
    validation_retries: u32,
}

impl RecipePipeline {
    /// Pipeline using the configured default provider
    pub fn new(config: &ExtractorConfig) -> Result<Self, PipelineError> {
        let extractor = ProviderFactory::get_default_provider(config)
            .map_err(|e| PipelineError::Setup(e.to_string()))?;
        Self::with_extractor(config, extractor)
    }

    pub fn with_extractor(
        config: &ExtractorConfig,
        extractor: Box<dyn StructuredExtractor>,
    ) -> Result<Self, PipelineError> {
        let acquirer =
            ContentAcquirer::new(config).map_err(|e| PipelineError::Setup(e.to_string()))?;

        Ok(Self {
            acquirer,
            engine: ExtractionEngine::new(extractor),
            validation_retries: config.retry.bounded(),
        })
    }

    /// Creates a new builder for configuring a pipeline
    ///
    /// # Example
    /// ```
    /// use recipe_extract::{Provider, RecipePipeline};
    ///
    /// let builder = RecipePipeline::builder().provider(Provider::RuleBased);
    /// ```
    pub fn builder() -> RecipePipelineBuilder {
        RecipePipelineBuilder::default()
    }

    pub fn provider_name(&self) -> &str {
        self.engine.provider_name()
    }

    /// Fetch `url` and extract the recipe it contains.
    ///
    /// # Errors
    /// Acquisition failures abort before the extraction service is called.
    /// The returned error's [`PipelineError::stage`] names the failing stage.
    pub async fn extract(&self, url: &str) -> Result<Recipe, PipelineError> {
        let content = self.acquirer.acquire(url).await?;
        info!(
            "Acquired {} ({} characters, {} media URLs)",
            content.source_url,
            content.text.len(),
            content.media_urls.len()
        );

        Ok(self.extract_content(&content).await?)
    }

    /// Extraction stage alone, for content obtained elsewhere.
    ///
    /// Answers that fail validation or are not a JSON object are retried
    /// with stricter instructions. Refusals and service errors are returned
    /// as-is.
    pub async fn extract_content(
        &self,
        content: &NormalizedContent,
    ) -> Result<Recipe, ExtractionError> {
        let mut strictness = Strictness::Normal;
        let mut retries = 0;

        loop {
            match self.engine.extract_schema(content, strictness).await {
                Err(
                    err @ (ExtractionError::Validation(_) | ExtractionError::InvalidResponse(_)),
                ) if retries < self.validation_retries => {
                    retries += 1;
                    warn!(
                        "Answer for {} was rejected ({}), retry {}/{}",
                        content.source_url, err, retries, self.validation_retries
                    );
                    strictness = Strictness::Strict;
                }
                result => return result,
            }
        }
    }
}
