use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;

/// Calories are not part of the find-by-ingredients payload, so every summary carries this placeholder.
pub const PLACEHOLDER_CALORIES: &str = "250";

pub const NO_INSTRUCTIONS: &str = "No instructions available for this recipe.";

/// The app's normalized recipe record, derived from a provider search hit.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
pub struct RecipeSummary {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub calories: String,
}

/// One hit of the provider's find-by-ingredients search.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct IngredientMatch {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub used_ingredient_count: u32,
    #[serde(default)]
    pub missed_ingredient_count: u32,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct AnalyzedInstruction {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub steps: Option<Vec<InstructionStep>>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct InstructionStep {
    pub number: u32,
    pub step: String,
}

#[derive(Deserialize, Debug, JsonSchema)]
pub struct SuggestRequest {
    pub ingredients: String,
}

#[derive(Serialize, Deserialize, Debug, JsonSchema)]
pub struct SuggestResponse {
    pub recipes: Vec<RecipeSummary>,
}

#[derive(Serialize, Deserialize, Debug, JsonSchema)]
pub struct MealPlanResponse {
    pub plan: serde_json::Value,
}

#[derive(Serialize, Deserialize, Debug, JsonSchema)]
pub struct InstructionsResponse {
    pub instructions: String,
}

impl IngredientMatch {
    pub fn description(&self) -> String {
        format!("Used: {} | Missed: {}", self.used_ingredient_count, self.missed_ingredient_count)
    }
}

impl From<&IngredientMatch> for RecipeSummary {
    fn from(hit: &IngredientMatch) -> Self {
        Self {
            id: hit.id,
            title: hit.title.clone(),
            description: hit.description(),
            image: hit.image.clone(),
            calories: PLACEHOLDER_CALORIES.to_string(),
        }
    }
}

impl InstructionStep {
    pub fn line(&self) -> String {
        format!("{}. {}", self.number, self.step)
    }
}
