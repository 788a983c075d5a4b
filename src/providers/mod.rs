mod anthropic;
mod factory;
mod ollama;
mod open_ai;
mod rule_based;

pub use anthropic::AnthropicProvider;
pub use factory::ProviderFactory;
pub use ollama::OllamaProvider;
pub use open_ai::OpenAIProvider;
pub use rule_based::RuleBasedExtractor;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ExtractionError;
use crate::schema::RecipeSchema;
use crate::url_to_text::NormalizedContent;

/// Everything a structured-extraction service needs for one call.
pub struct ExtractionRequest<'a> {
    pub schema: &'a RecipeSchema,
    pub instructions: &'a str,
    pub content: &'a NormalizedContent,
}

/// Answer of a structured-extraction service.
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceResponse {
    /// A JSON object that should conform to the schema
    Parsed(Value),
    /// The service declined to answer
    Refusal(String),
}

/// Capability to fill the recipe schema from content.
///
/// Implementations only talk to the service; validation of the returned
/// object is done by the engine.
#[async_trait]
pub trait StructuredExtractor: Send + Sync {
    /// Get the provider name (e.g., "openai", "anthropic")
    fn provider_name(&self) -> &str;

    async fn extract(
        &self,
        request: &ExtractionRequest<'_>,
    ) -> Result<ServiceResponse, ExtractionError>;
}

/// Parse a model's text answer as a JSON object, tolerating a Markdown fence.
pub(crate) fn parse_json_content(content: &str) -> Result<Value, ExtractionError> {
    let trimmed = content.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();

    let value: Value = serde_json::from_str(unfenced)?;
    if !value.is_object() {
        return Err(ExtractionError::InvalidResponse(format!(
            "expected a JSON object, got {value}"
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_content() {
        let value = parse_json_content("```json\n{\"title\": \"Soup\"}\n```").unwrap();
        assert_eq!(value["title"], "Soup");

        let value = parse_json_content("  {\"title\": \"Soup\"}  ").unwrap();
        assert_eq!(value["title"], "Soup");

        assert!(matches!(
            parse_json_content("[1, 2]"),
            Err(ExtractionError::InvalidResponse(_))
        ));
        assert!(parse_json_content("not json").is_err());
    }
}
