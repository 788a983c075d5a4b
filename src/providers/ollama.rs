use crate::config::ProviderConfig;
use crate::error::ExtractionError;
use crate::providers::open_ai::build_client;
use crate::providers::{parse_json_content, ExtractionRequest, ServiceResponse, StructuredExtractor};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Local models through Ollama's native chat API, with the JSON schema passed
/// as the `format` constraint.
pub struct OllamaProvider {
    client: Client,
    base_url: String,
    model: String,
    temperature: f32,
}

impl OllamaProvider {
    /// Create a new Ollama provider from configuration
    pub fn new(config: &ProviderConfig, timeout: Duration) -> Result<Self, ExtractionError> {
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(OllamaProvider {
            client: build_client(timeout)?,
            base_url,
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    #[doc(hidden)]
    pub fn with_base_url(base_url: String, model: String) -> Self {
        OllamaProvider {
            client: Client::new(),
            base_url,
            model,
            temperature: 0.0,
        }
    }
}

#[async_trait]
impl StructuredExtractor for OllamaProvider {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    async fn extract(
        &self,
        request: &ExtractionRequest<'_>,
    ) -> Result<ServiceResponse, ExtractionError> {
        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&json!({
                "model": self.model,
                "stream": false,
                "format": request.schema.json_schema(),
                "options": {"temperature": self.temperature},
                "messages": [
                    {"role": "system", "content": request.instructions},
                    {"role": "user", "content": request.content.to_prompt_input()}
                ]
            }))
            .send()
            .await?;

        let response_body: Value = response.json().await?;
        debug!("Ollama response: {:?}", response_body);

        // Check for API error response
        if let Some(error) = response_body.get("error") {
            let message = error.as_str().map(str::to_string).unwrap_or_else(|| error.to_string());
            return Err(ExtractionError::Service(format!("Ollama API error: {message}")));
        }

        let content = response_body["message"]["content"]
            .as_str()
            .ok_or_else(|| {
                ExtractionError::InvalidResponse(
                    "Failed to extract content from Ollama response".to_string(),
                )
            })?;

        Ok(ServiceResponse::Parsed(parse_json_content(content)?))
    }
}
