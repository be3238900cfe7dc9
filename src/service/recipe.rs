use crate::error::app_error::AppError;
use crate::models::recipe::{AnalyzedInstruction, NO_INSTRUCTIONS, RecipeSummary};
use crate::service::provider::{ProviderError, RecipeProvider};
use tracing::{error, warn};

/// Reshapes provider responses into the app's own records.
///
/// Every call goes straight to the provider: nothing is cached and nothing is retried.
pub struct RecipeService<'a> {
    provider: &'a dyn RecipeProvider,
}

impl<'a> RecipeService<'a> {
    pub fn new(provider: &'a dyn RecipeProvider) -> Self {
        Self { provider }
    }

    pub async fn suggest(&self, ingredients: &str) -> Result<Vec<RecipeSummary>, AppError> {
        let hits = self
            .provider
            .find_by_ingredients(ingredients)
            .await
            .map_err(|e| upstream_error(e, "Spoonacular API request failed", "Failed to generate recipe"))?;

        Ok(hits.iter().map(RecipeSummary::from).collect())
    }

    pub async fn weekly_plan(&self) -> Result<serde_json::Value, AppError> {
        self.provider
            .generate_week_plan()
            .await
            .map_err(|e| upstream_error(e, "Failed to generate meal plan", "Failed to generate meal plan"))
    }

    /// Step-by-step instructions for a recipe.
    ///
    /// Provider failures degrade to [`NO_INSTRUCTIONS`] instead of an error;
    /// only a missing API key is reported as one.
    pub async fn instructions(&self, recipe_id: i64) -> Result<String, AppError> {
        match self.provider.analyzed_instructions(recipe_id).await {
            Ok(blocks) => Ok(render_instructions(&blocks)),
            Err(ProviderError::MissingApiKey) => Err(missing_api_key()),
            Err(e) => {
                warn!(recipe_id, error = %e, "instructions unavailable, using fallback");
                Ok(NO_INSTRUCTIONS.to_string())
            }
        }
    }
}

/// `rejected` is reported when the provider answered with an error status,
/// `failed` when the call did not complete or its payload was unreadable.
fn upstream_error(e: ProviderError, rejected: &str, failed: &str) -> AppError {
    match e {
        ProviderError::MissingApiKey => missing_api_key(),
        ProviderError::Status { .. } => {
            error!(error = %e, "recipe provider rejected the request");
            AppError::upstream(rejected)
        }
        _ => {
            error!(error = %e, "recipe provider call failed");
            AppError::upstream(failed)
        }
    }
}

fn missing_api_key() -> AppError {
    error!("recipe provider called without an API key");
    AppError::upstream(ProviderError::MissingApiKey.to_string())
}

/// Renders the first instruction block as numbered lines, or the fallback text when it has no steps.
pub fn render_instructions(blocks: &[AnalyzedInstruction]) -> String {
    match blocks.first().and_then(|block| block.steps.as_ref()).filter(|steps| !steps.is_empty()) {
        Some(steps) => steps.iter().map(|step| step.line()).collect::<Vec<_>>().join("\n"),
        None => NO_INSTRUCTIONS.to_string(),
    }
}
