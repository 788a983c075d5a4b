use crate::config::{ExtractorConfig, ProviderConfig};
use crate::error::ExtractionError;
use crate::providers::{
    AnthropicProvider, OllamaProvider, OpenAIProvider, RuleBasedExtractor, StructuredExtractor,
};
use std::time::Duration;

pub struct ProviderFactory;

impl ProviderFactory {
    /// Create a provider instance from configuration
    pub fn create(
        provider_name: &str,
        config: &ProviderConfig,
        timeout: Duration,
    ) -> Result<Box<dyn StructuredExtractor>, ExtractionError> {
        // Validate that provider is enabled
        if !config.enabled {
            return Err(ExtractionError::NotConfigured(format!(
                "Provider '{}' is not enabled in configuration",
                provider_name
            )));
        }

        match provider_name {
            "openai" => Ok(Box::new(OpenAIProvider::new(config, timeout)?)),
            "anthropic" => Ok(Box::new(AnthropicProvider::new(config, timeout)?)),
            "ollama" => Ok(Box::new(OllamaProvider::new(config, timeout)?)),
            "rule_based" => Ok(Box::new(RuleBasedExtractor::new())),
            _ => Err(ExtractionError::NotConfigured(format!(
                "Unknown provider: {}",
                provider_name
            ))),
        }
    }

    /// Get the default provider from configuration
    pub fn get_default_provider(
        config: &ExtractorConfig,
    ) -> Result<Box<dyn StructuredExtractor>, ExtractionError> {
        let provider_name = &config.default_provider;
        Self::create(
            provider_name,
            &config.provider(provider_name),
            config.service_timeout(),
        )
    }

    /// List all available provider names
    pub fn available_providers() -> Vec<&'static str> {
        vec!["openai", "anthropic", "ollama", "rule_based"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn create_test_provider_config() -> ProviderConfig {
        ProviderConfig {
            enabled: true,
            model: "test-model".to_string(),
            temperature: 0.7,
            max_tokens: 2000,
            api_key: Some("test-key".to_string()),
            base_url: None,
        }
    }

    fn timeout() -> Duration {
        Duration::from_secs(30)
    }

    #[test]
    fn test_create_openai_provider() {
        let config = create_test_provider_config();
        let provider = ProviderFactory::create("openai", &config, timeout()).unwrap();
        assert_eq!(provider.provider_name(), "openai");
    }

    #[test]
    fn test_create_anthropic_provider() {
        let config = create_test_provider_config();
        let provider = ProviderFactory::create("anthropic", &config, timeout()).unwrap();
        assert_eq!(provider.provider_name(), "anthropic");
    }

    #[test]
    fn test_create_ollama_provider() {
        let config = create_test_provider_config();
        let provider = ProviderFactory::create("ollama", &config, timeout()).unwrap();
        assert_eq!(provider.provider_name(), "ollama");
    }

    #[test]
    fn test_create_rule_based_provider() {
        let config = ProviderConfig::new("");
        let provider = ProviderFactory::create("rule_based", &config, timeout()).unwrap();
        assert_eq!(provider.provider_name(), "rule_based");
    }

    #[test]
    fn test_create_unknown_provider() {
        let config = create_test_provider_config();
        let result = ProviderFactory::create("unknown", &config, timeout());
        assert!(result.is_err());
        if let Err(e) = result {
            assert!(e.to_string().contains("Unknown provider"));
        }
    }

    #[test]
    fn test_create_disabled_provider() {
        let mut config = create_test_provider_config();
        config.enabled = false;

        let result = ProviderFactory::create("openai", &config, timeout());
        assert!(result.is_err());
        if let Err(e) = result {
            assert!(e.to_string().contains("not enabled in configuration"));
        }
    }

    #[test]
    fn test_get_default_provider() {
        let mut providers = HashMap::new();
        providers.insert("anthropic".to_string(), create_test_provider_config());

        let config = ExtractorConfig {
            default_provider: "anthropic".to_string(),
            providers,
            ..Default::default()
        };

        let provider = ProviderFactory::get_default_provider(&config).unwrap();
        assert_eq!(provider.provider_name(), "anthropic");
    }

    #[test]
    fn test_get_default_provider_without_entry() {
        let config = ExtractorConfig {
            default_provider: "rule_based".to_string(),
            ..Default::default()
        };

        let provider = ProviderFactory::get_default_provider(&config).unwrap();
        assert_eq!(provider.provider_name(), "rule_based");
    }

    #[test]
    fn test_available_providers() {
        let providers = ProviderFactory::available_providers();
        assert_eq!(providers.len(), 4);
        assert!(providers.contains(&"openai"));
        assert!(providers.contains(&"anthropic"));
        assert!(providers.contains(&"ollama"));
        assert!(providers.contains(&"rule_based"));
    }
}
