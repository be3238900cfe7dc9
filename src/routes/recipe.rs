use crate::error::app_error::AppError;
use crate::models::recipe::{InstructionsResponse, MealPlanResponse, SuggestRequest, SuggestResponse};
use crate::service::provider::ProviderHandle;
use crate::service::recipe::RecipeService;
use rocket::serde::json::Json;
use rocket::{State, get, post};
use rocket_okapi::openapi;

/// Suggest recipes for a comma-separated list of ingredients
#[openapi(tag = "Recipes")]
#[post("/ai", data = "<payload>")]
pub async fn suggest_recipes(provider: &State<ProviderHandle>, payload: Json<SuggestRequest>) -> Result<Json<SuggestResponse>, AppError> {
    let service = RecipeService::new(provider.inner().as_ref());
    let recipes = service.suggest(&payload.ingredients).await?;
    Ok(Json(SuggestResponse { recipes }))
}

/// Generate a weekly meal plan
#[openapi(tag = "Recipes")]
#[get("/plan")]
pub async fn weekly_plan(provider: &State<ProviderHandle>) -> Result<Json<MealPlanResponse>, AppError> {
    let service = RecipeService::new(provider.inner().as_ref());
    let plan = service.weekly_plan().await?;
    Ok(Json(MealPlanResponse { plan }))
}

/// Step-by-step instructions for a recipe
///
/// Answers with a placeholder text rather than an error when the provider has none.
#[openapi(tag = "Recipes")]
#[get("/instructions/<id>")]
pub async fn recipe_instructions(provider: &State<ProviderHandle>, id: i64) -> Result<Json<InstructionsResponse>, AppError> {
    let service = RecipeService::new(provider.inner().as_ref());
    let instructions = service.instructions(id).await?;
    Ok(Json(InstructionsResponse { instructions }))
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![suggest_recipes, weekly_plan, recipe_instructions]
}

#[cfg(test)]
mod tests {
    use crate::models::recipe::{AnalyzedInstruction, IngredientMatch, InstructionStep, NO_INSTRUCTIONS};
    use crate::test_utils::{FakeRecipeProvider, test_client};
    use rocket::http::{ContentType, Status};

    fn hit(id: i64, used: u32, missed: u32) -> IngredientMatch {
        IngredientMatch {
            id,
            title: format!("Recipe {}", id),
            image: Some(format!("https://img.example.com/{}.jpg", id)),
            used_ingredient_count: used,
            missed_ingredient_count: missed,
        }
    }

    #[rocket::async_test]
    async fn suggest_returns_summaries() {
        let provider = FakeRecipeProvider {
            matches: Ok(vec![hit(11, 2, 1), hit(12, 1, 4)]),
            ..FakeRecipeProvider::default()
        };
        let (client, _) = test_client(provider).await;

        let response = client
            .post("/api/recipes/ai")
            .header(ContentType::JSON)
            .body(r#"{"ingredients": "tomato,onion"}"#)
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        let body: serde_json::Value = response.into_json().await.expect("json body");
        let recipes = body["recipes"].as_array().expect("recipes array");
        assert_eq!(recipes.len(), 2);
        assert_eq!(recipes[0]["id"], 11);
        assert_eq!(recipes[0]["description"], "Used: 2 | Missed: 1");
        assert_eq!(recipes[1]["description"], "Used: 1 | Missed: 4");
        assert_eq!(recipes[0]["calories"], "250");
        assert_eq!(recipes[0]["image"], "https://img.example.com/11.jpg");
    }

    #[rocket::async_test]
    async fn suggest_failure_is_500_with_error() {
        let (client, _) = test_client(FakeRecipeProvider::failing(401)).await;

        let response = client
            .post("/api/recipes/ai")
            .header(ContentType::JSON)
            .body(r#"{"ingredients": "egg"}"#)
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::InternalServerError);
        let body: serde_json::Value = response.into_json().await.expect("json body");
        assert_eq!(body["error"], "Spoonacular API request failed");
    }

    #[rocket::async_test]
    async fn unreadable_upstream_payload_fails_suggest_and_plan_but_not_instructions() {
        let (client, _) = test_client(FakeRecipeProvider::malformed()).await;

        let response = client
            .post("/api/recipes/ai")
            .header(ContentType::JSON)
            .body(r#"{"ingredients": "egg"}"#)
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::InternalServerError);
        let body: serde_json::Value = response.into_json().await.expect("json body");
        assert_eq!(body["error"], "Failed to generate recipe");

        let response = client.get("/api/recipes/plan").dispatch().await;
        assert_eq!(response.status(), Status::InternalServerError);
        let body: serde_json::Value = response.into_json().await.expect("json body");
        assert_eq!(body["error"], "Failed to generate meal plan");

        let response = client.get("/api/recipes/instructions/5").dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        let body: serde_json::Value = response.into_json().await.expect("json body");
        assert_eq!(body["instructions"], NO_INSTRUCTIONS);
    }

    #[rocket::async_test]
    async fn plan_wraps_upstream_payload() {
        let plan = serde_json::json!({"week": {"monday": {"meals": [], "nutrients": {"calories": 2000.0}}}});
        let provider = FakeRecipeProvider {
            plan: Ok(plan.clone()),
            ..FakeRecipeProvider::default()
        };
        let (client, _) = test_client(provider).await;

        let response = client.get("/api/recipes/plan").dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        let body: serde_json::Value = response.into_json().await.expect("json body");
        assert_eq!(body["plan"], plan);
    }

    #[rocket::async_test]
    async fn plan_without_key_is_500() {
        let (client, _) = test_client(FakeRecipeProvider::without_key()).await;

        let response = client.get("/api/recipes/plan").dispatch().await;
        assert_eq!(response.status(), Status::InternalServerError);
        let body: serde_json::Value = response.into_json().await.expect("json body");
        assert_eq!(body["error"], "Spoonacular API key not configured");
    }

    #[rocket::async_test]
    async fn instructions_are_joined_lines() {
        let provider = FakeRecipeProvider {
            instructions: Ok(vec![AnalyzedInstruction {
                name: String::new(),
                steps: Some(vec![
                    InstructionStep {
                        number: 1,
                        step: "Dice tomatoes.".to_string(),
                    },
                    InstructionStep {
                        number: 2,
                        step: "Simmer.".to_string(),
                    },
                ]),
            }]),
            ..FakeRecipeProvider::default()
        };
        let (client, _) = test_client(provider).await;

        let response = client.get("/api/recipes/instructions/716429").dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        let body: serde_json::Value = response.into_json().await.expect("json body");
        assert_eq!(body["instructions"], "1. Dice tomatoes.\n2. Simmer.");
    }

    #[rocket::async_test]
    async fn instructions_without_steps_fall_back_with_success() {
        let (client, _) = test_client(FakeRecipeProvider::default()).await;

        let response = client.get("/api/recipes/instructions/1").dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        let body: serde_json::Value = response.into_json().await.expect("json body");
        assert_eq!(body["instructions"], NO_INSTRUCTIONS);
    }

    #[rocket::async_test]
    async fn instructions_upstream_error_still_succeeds() {
        let (client, _) = test_client(FakeRecipeProvider::failing(500)).await;

        let response = client.get("/api/recipes/instructions/1").dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        let body: serde_json::Value = response.into_json().await.expect("json body");
        assert_eq!(body["instructions"], NO_INSTRUCTIONS);
    }

    #[rocket::async_test]
    async fn instructions_with_non_numeric_id_is_rejected() {
        let (client, _) = test_client(FakeRecipeProvider::default()).await;

        let response = client.get("/api/recipes/instructions/abc").dispatch().await;
        assert!(response.status().class().is_client_error());
        let body: serde_json::Value = response.into_json().await.expect("json body");
        assert!(body["error"].is_string());
    }
}
