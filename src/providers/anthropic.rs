use crate::config::ProviderConfig;
use crate::error::ExtractionError;
use crate::providers::open_ai::build_client;
use crate::providers::{parse_json_content, ExtractionRequest, ServiceResponse, StructuredExtractor};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const TOOL_NAME: &str = "record_recipe";

/// Uses a forced tool call so the answer arrives as a schema-shaped object.
pub struct AnthropicProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl AnthropicProvider {
    /// Create a new Anthropic provider from configuration
    pub fn new(config: &ProviderConfig, timeout: Duration) -> Result<Self, ExtractionError> {
        // Try config first, then fall back to environment variable
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok())
            .ok_or_else(|| {
                ExtractionError::NotConfigured(
                    "ANTHROPIC_API_KEY not found in config or environment".to_string(),
                )
            })?;

        Ok(AnthropicProvider {
            client: build_client(timeout)?,
            api_key,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    #[doc(hidden)]
    pub fn with_base_url(api_key: String, base_url: String, model: String) -> Self {
        AnthropicProvider {
            client: Client::new(),
            api_key,
            base_url,
            model,
            temperature: 0.0,
            max_tokens: 4000,
        }
    }
}

#[async_trait]
impl StructuredExtractor for AnthropicProvider {
    fn provider_name(&self) -> &str {
        "anthropic"
    }

    async fn extract(
        &self,
        request: &ExtractionRequest<'_>,
    ) -> Result<ServiceResponse, ExtractionError> {
        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&json!({
                "model": self.model,
                "max_tokens": self.max_tokens,
                "temperature": self.temperature,
                "system": request.instructions,
                "tools": [{
                    "name": TOOL_NAME,
                    "description": "Record the recipe extracted from the content.",
                    "input_schema": request.schema.json_schema()
                }],
                "tool_choice": {"type": "tool", "name": TOOL_NAME},
                "messages": [
                    {
                        "role": "user",
                        "content": request.content.to_prompt_input()
                    }
                ]
            }))
            .send()
            .await?;

        let status = response.status();
        let response_body: Value = response.json().await?;
        debug!("{:?}", response_body);

        if !status.is_success() {
            let message = response_body["error"]["message"]
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| response_body.to_string());
            return Err(ExtractionError::Service(format!(
                "Anthropic API returned {status}: {message}"
            )));
        }

        let blocks = response_body["content"]
            .as_array()
            .cloned()
            .unwrap_or_default();

        if response_body["stop_reason"] == "refusal" {
            let reason = blocks
                .iter()
                .find_map(|block| block["text"].as_str())
                .unwrap_or("The model declined to answer")
                .to_string();
            return Ok(ServiceResponse::Refusal(reason));
        }

        if let Some(input) = blocks
            .iter()
            .find(|block| block["type"] == "tool_use" && block["name"] == TOOL_NAME)
            .map(|block| block["input"].clone())
        {
            return Ok(ServiceResponse::Parsed(input));
        }

        // No tool call: the model answered in prose, usually to decline
        let text = blocks
            .iter()
            .find_map(|block| block["text"].as_str())
            .ok_or_else(|| {
                ExtractionError::InvalidResponse(
                    "Failed to extract content from Anthropic response".to_string(),
                )
            })?;

        match parse_json_content(text) {
            Ok(value) => Ok(ServiceResponse::Parsed(value)),
            Err(_) => Ok(ServiceResponse::Refusal(text.trim().to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::RecipeSchema;
    use crate::url_to_text::{NormalizedContent, SourceKind};
    use mockito::{Matcher, Server};

    fn content() -> NormalizedContent {
        NormalizedContent {
            source_url: "https://example.com/soup".to_string(),
            source: SourceKind::GenericPage,
            text: "Tomato soup".to_string(),
            media_urls: Vec::new(),
        }
    }

    async fn run(server: &Server) -> Result<ServiceResponse, ExtractionError> {
        let provider = AnthropicProvider::with_base_url(
            "test-key".to_string(),
            server.url(),
            "claude-sonnet-4-5".to_string(),
        );
        let schema = RecipeSchema::recipe();
        let content = content();
        let request = ExtractionRequest {
            schema: &schema,
            instructions: "extract",
            content: &content,
        };
        provider.extract(&request).await
    }

    #[tokio::test]
    async fn test_tool_use_response() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/messages")
            .match_header("x-api-key", "test-key")
            .match_body(Matcher::PartialJson(json!({
                "tool_choice": {"type": "tool", "name": "record_recipe"}
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "stop_reason": "tool_use",
                    "content": [
                        {"type": "tool_use", "name": "record_recipe", "input": {"title": "Tomato soup"}}
                    ]
                }"#,
            )
            .create_async()
            .await;

        match run(&server).await.unwrap() {
            ServiceResponse::Parsed(value) => assert_eq!(value["title"], "Tomato soup"),
            other => panic!("expected parsed response, got {other:?}"),
        }
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_refusal_stop_reason() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/messages")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"stop_reason": "refusal", "content": [{"type": "text", "text": "No."}]}"#,
            )
            .create_async()
            .await;

        assert_eq!(
            run(&server).await.unwrap(),
            ServiceResponse::Refusal("No.".to_string())
        );
    }

    #[tokio::test]
    async fn test_prose_answer_is_a_refusal() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/messages")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"stop_reason": "end_turn", "content": [{"type": "text", "text": "This page is not a recipe."}]}"#,
            )
            .create_async()
            .await;

        assert_eq!(
            run(&server).await.unwrap(),
            ServiceResponse::Refusal("This page is not a recipe.".to_string())
        );
    }

    #[test]
    fn test_provider_name() {
        let config = ProviderConfig {
            api_key: Some("test-key".to_string()),
            ..ProviderConfig::new("claude-sonnet-4-5")
        };

        let provider = AnthropicProvider::new(&config, Duration::from_secs(30)).unwrap();
        assert_eq!(provider.provider_name(), "anthropic");
    }
}
