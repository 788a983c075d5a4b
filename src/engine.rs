use log::{debug, info, warn};

use crate::error::ExtractionError;
use crate::model::Recipe;
use crate::providers::{ExtractionRequest, ServiceResponse, StructuredExtractor};
use crate::schema::{RecipeSchema, Strictness};
use crate::url_to_text::NormalizedContent;
use crate::validation::validate_recipe;

/// Fills the recipe schema from normalized content through one extractor
/// and validates the answer.
///
/// Holds no per-call state, so a single engine can serve concurrent calls.
pub struct ExtractionEngine {
    extractor: Box<dyn StructuredExtractor>,
    schema: RecipeSchema,
}

impl ExtractionEngine {
    pub fn new(extractor: Box<dyn StructuredExtractor>) -> Self {
        Self {
            extractor,
            schema: RecipeSchema::recipe(),
        }
    }

    pub fn provider_name(&self) -> &str {
        self.extractor.provider_name()
    }

    pub fn schema(&self) -> &RecipeSchema {
        &self.schema
    }

    /// One service call plus validation. Never retries.
    pub async fn extract_schema(
        &self,
        content: &NormalizedContent,
        strictness: Strictness,
    ) -> Result<Recipe, ExtractionError> {
        let instructions = self.schema.instructions(strictness);
        let request = ExtractionRequest {
            schema: &self.schema,
            instructions: &instructions,
            content,
        };

        info!(
            "Extracting recipe from {} with {} ({:?})",
            content.source_url,
            self.extractor.provider_name(),
            strictness
        );

        match self.extractor.extract(&request).await? {
            ServiceResponse::Parsed(value) => {
                debug!("Service answer: {}", value);
                let mut recipe = validate_recipe(&value)?;
                if recipe.original_link.is_none() {
                    recipe.original_link = Some(content.source_url.clone());
                }
                Ok(recipe)
            }
            ServiceResponse::Refusal(reason) => {
                warn!("{} refused {}: {}", self.provider_name(), content.source_url, reason);
                Err(ExtractionError::Refusal(reason))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::taxonomy::MeasurementUnit;
    use crate::url_to_text::SourceKind;
    use async_trait::async_trait;
    use serde_json::{json, Value};

    struct FixedExtractor(ServiceResponse);

    #[async_trait]
    impl StructuredExtractor for FixedExtractor {
        fn provider_name(&self) -> &str {
            "fixed"
        }

        async fn extract(
            &self,
            _request: &ExtractionRequest<'_>,
        ) -> Result<ServiceResponse, ExtractionError> {
            Ok(self.0.clone())
        }
    }

    fn content() -> NormalizedContent {
        NormalizedContent {
            source_url: "https://example.com/cookies".to_string(),
            source: SourceKind::GenericPage,
            text: "Cookies".to_string(),
            media_urls: Vec::new(),
        }
    }

    fn engine(value: Value) -> ExtractionEngine {
        ExtractionEngine::new(Box::new(FixedExtractor(ServiceResponse::Parsed(value))))
    }

    #[tokio::test]
    async fn test_valid_answer() {
        let engine = engine(json!({
            "title": "Cookies",
            "category": "cookies",
            "ingredients": [
                {"ingredient_name": "flour", "quantity": "2 cups", "measurement_unit": null, "notes": null}
            ],
            "instructions": [{"step_number": 1, "description": "Bake"}]
        }));

        let recipe = engine
            .extract_schema(&content(), Strictness::Normal)
            .await
            .unwrap();
        assert_eq!(recipe.title, "Cookies");
        assert_eq!(recipe.ingredients[0].quantity, 2.0);
        assert_eq!(recipe.ingredients[0].measurement_unit, MeasurementUnit::Cup);
        assert_eq!(recipe.original_link.as_deref(), Some("https://example.com/cookies"));
    }

    #[tokio::test]
    async fn test_missing_title() {
        let engine = engine(json!({"ingredients": [], "instructions": []}));
        let result = engine.extract_schema(&content(), Strictness::Normal).await;
        assert!(matches!(
            result,
            Err(ExtractionError::Validation(ValidationError::MissingField(field))) if field == "title"
        ));
    }

    #[tokio::test]
    async fn test_refusal() {
        let engine = ExtractionEngine::new(Box::new(FixedExtractor(ServiceResponse::Refusal(
            "not a recipe".to_string(),
        ))));
        let result = engine.extract_schema(&content(), Strictness::Normal).await;
        assert!(matches!(result, Err(ExtractionError::Refusal(reason)) if reason == "not a recipe"));
    }
}
