pub mod builder;
pub mod config;
pub mod engine;
pub mod error;
pub mod ingredient_parser;
pub mod model;
pub mod pipeline;
pub mod providers;
pub mod schema;
pub mod taxonomy;
pub mod url_to_text;
pub mod validation;

pub use builder::{Provider, RecipePipelineBuilder};
pub use crate::config::ExtractorConfig;
pub use engine::ExtractionEngine;
pub use error::{AcquisitionError, ExtractionError, PipelineError, Stage, ValidationError};
pub use model::{Ingredient, Instruction, Recipe};
pub use pipeline::RecipePipeline;
pub use taxonomy::{Category, MeasurementUnit};
pub use url_to_text::{NormalizedContent, SourceKind};

/// Extract a recipe from `url` with configuration loaded from
/// `recipe-extract.toml` and `RECIPE_EXTRACT__*` environment variables.
///
/// Builds a fresh pipeline for the single call; keep a [`RecipePipeline`]
/// around when extracting many recipes.
pub async fn extract_recipe(url: &str) -> Result<Recipe, PipelineError> {
    let config = ExtractorConfig::load()?;
    RecipePipeline::new(&config)?.extract(url).await
}
