use crate::config::ProviderConfig;
use crate::error::ExtractionError;
use crate::providers::{parse_json_content, ExtractionRequest, ServiceResponse, StructuredExtractor};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.openai.com";

pub struct OpenAIProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider from configuration
    pub fn new(config: &ProviderConfig, timeout: Duration) -> Result<Self, ExtractionError> {
        // Try config first, then fall back to environment variable
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .ok_or_else(|| {
                ExtractionError::NotConfigured(
                    "OPENAI_API_KEY not found in config or environment".to_string(),
                )
            })?;

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(OpenAIProvider {
            client: build_client(timeout)?,
            api_key,
            base_url,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    #[doc(hidden)]
    pub fn with_base_url(api_key: String, base_url: String, model: String) -> Self {
        OpenAIProvider {
            client: Client::new(),
            api_key,
            base_url,
            model,
            temperature: 0.0,
            max_tokens: 4000,
        }
    }
}

pub(crate) fn build_client(timeout: Duration) -> Result<Client, ExtractionError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ExtractionError::NotConfigured(format!("failed to build HTTP client: {e}")))
}

#[async_trait]
impl StructuredExtractor for OpenAIProvider {
    fn provider_name(&self) -> &str {
        "openai"
    }

    async fn extract(
        &self,
        request: &ExtractionRequest<'_>,
    ) -> Result<ServiceResponse, ExtractionError> {
        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&json!({
                "model": self.model,
                "messages": [
                    {"role": "system", "content": request.instructions},
                    {"role": "user", "content": request.content.to_prompt_input()}
                ],
                "temperature": self.temperature,
                "max_tokens": self.max_tokens,
                "response_format": {
                    "type": "json_schema",
                    "json_schema": {
                        "name": "recipe",
                        "strict": true,
                        "schema": request.schema.json_schema()
                    }
                }
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
                "OpenAI API returned {status}: {message}"
            )));
        }

        let message = &response_body["choices"][0]["message"];
        if let Some(refusal) = message["refusal"].as_str() {
            return Ok(ServiceResponse::Refusal(refusal.to_string()));
        }

        let content = message["content"].as_str().ok_or_else(|| {
            ExtractionError::InvalidResponse("Failed to extract content from response".to_string())
        })?;

        Ok(ServiceResponse::Parsed(parse_json_content(content)?))
    }
}
