//! Access to the third-party recipe provider (Spoonacular).

use crate::config::SpoonacularConfig;
use crate::models::recipe::{AnalyzedInstruction, IngredientMatch};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Results requested per ingredient search.
pub const SEARCH_RESULT_COUNT: u32 = 3;
/// Spoonacular ranking 1: maximize used ingredients.
pub const RANK_BY_USED_INGREDIENTS: u32 = 1;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Spoonacular API key not configured")]
    MissingApiKey,

    #[error("provider responded with status {status}: {body}")]
    Status { status: u16, body: String },

    /// Transport failure. Never carries the request URL, which includes the API key.
    #[error("provider request failed: {0}")]
    RequestFailed(#[source] reqwest::Error),

    #[error("provider response could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        ProviderError::RequestFailed(e.without_url())
    }
}

/// The upstream calls the recipe proxy depends on, so tests can swap in a fake.
#[async_trait::async_trait]
pub trait RecipeProvider: Send + Sync {
    async fn find_by_ingredients(&self, ingredients: &str) -> Result<Vec<IngredientMatch>, ProviderError>;

    async fn generate_week_plan(&self) -> Result<serde_json::Value, ProviderError>;

    async fn analyzed_instructions(&self, recipe_id: i64) -> Result<Vec<AnalyzedInstruction>, ProviderError>;
}

/// Shared handle to the recipe provider, managed as Rocket state.
pub type ProviderHandle = Arc<dyn RecipeProvider>;

pub struct SpoonacularClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl SpoonacularClient {
    pub fn new(config: &SpoonacularConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("smartchef/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key().map(str::to_string),
        })
    }

    fn api_key(&self) -> Result<&str, ProviderError> {
        self.api_key.as_deref().ok_or(ProviderError::MissingApiKey)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T, ProviderError> {
        let api_key = self.api_key()?;
        let url = format!("{}{}", self.base_url, path);

        tracing::debug!(url = %url, "calling recipe provider");
        let response = self.http.get(&url).query(query).query(&[("apiKey", api_key)]).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body: String = body.chars().take(200).collect();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str::<T>(&body)?)
    }
}

#[async_trait::async_trait]
impl RecipeProvider for SpoonacularClient {
    async fn find_by_ingredients(&self, ingredients: &str) -> Result<Vec<IngredientMatch>, ProviderError> {
        self.get_json(
            "/recipes/findByIngredients",
            &[
                ("ingredients", ingredients.to_string()),
                ("number", SEARCH_RESULT_COUNT.to_string()),
                ("ranking", RANK_BY_USED_INGREDIENTS.to_string()),
                ("ignorePantry", "true".to_string()),
            ],
        )
        .await
    }

    async fn generate_week_plan(&self) -> Result<serde_json::Value, ProviderError> {
        self.get_json("/mealplanner/generate", &[("timeFrame", "week".to_string())]).await
    }

    async fn analyzed_instructions(&self, recipe_id: i64) -> Result<Vec<AnalyzedInstruction>, ProviderError> {
        self.get_json(&format!("/recipes/{}/analyzedInstructions", recipe_id), &[]).await
    }
}
