use crate::config::Config;
use crate::database::user::UserRepository;
use crate::db::UserStore;
use crate::error::app_error::AppError;
use crate::models::recipe::{AnalyzedInstruction, IngredientMatch};
use crate::models::user::User;
use crate::service::provider::{ProviderError, ProviderHandle, RecipeProvider};
use chrono::Utc;
use rocket::local::asynchronous::Client;
use std::sync::{Arc, Mutex};
use tokio::sync::RwLock;
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "test-jwt-secret";

/// Credential store kept in memory, enforcing the same email uniqueness as the `users` table.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<Vec<User>>,
}

impl InMemoryUserRepository {
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn remove_by_email(&self, email: &str) {
        self.users.write().await.retain(|u| u.email != email);
    }
}

#[async_trait::async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create_user(&self, name: &str, email: &str, password_hash: &str) -> Result<User, AppError> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == email) {
            return Err(AppError::UserAlreadyExists);
        }

        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self.users.read().await.iter().find(|u| u.email == email).cloned())
    }

    async fn get_user_by_id(&self, id: &Uuid) -> Result<Option<User>, AppError> {
        Ok(self.users.read().await.iter().find(|u| &u.id == id).cloned())
    }
}

#[derive(Debug, Clone, Copy)]
pub enum FakeFailure {
    MissingKey,
    Status(u16),
    /// A success status whose body is not the expected JSON.
    Malformed,
}

impl From<FakeFailure> for ProviderError {
    fn from(failure: FakeFailure) -> Self {
        match failure {
            FakeFailure::MissingKey => ProviderError::MissingApiKey,
            FakeFailure::Status(status) => ProviderError::Status {
                status,
                body: "{\"message\":\"fake failure\"}".to_string(),
            },
            FakeFailure::Malformed => ProviderError::Decode(
                serde_json::from_str::<serde_json::Value>("<html>maintenance</html>").expect_err("markup is not JSON"),
            ),
        }
    }
}

/// Canned provider responses.
pub struct FakeRecipeProvider {
    pub matches: Result<Vec<IngredientMatch>, FakeFailure>,
    pub plan: Result<serde_json::Value, FakeFailure>,
    pub instructions: Result<Vec<AnalyzedInstruction>, FakeFailure>,
    pub seen_ingredients: Mutex<Option<String>>,
}

impl Default for FakeRecipeProvider {
    fn default() -> Self {
        Self {
            matches: Ok(Vec::new()),
            plan: Ok(serde_json::json!({})),
            instructions: Ok(Vec::new()),
            seen_ingredients: Mutex::new(None),
        }
    }
}

impl FakeRecipeProvider {
    pub fn failing(status: u16) -> Self {
        Self::failing_with(FakeFailure::Status(status))
    }

    pub fn without_key() -> Self {
        Self::failing_with(FakeFailure::MissingKey)
    }

    pub fn malformed() -> Self {
        Self::failing_with(FakeFailure::Malformed)
    }

    fn failing_with(failure: FakeFailure) -> Self {
        Self {
            matches: Err(failure),
            plan: Err(failure),
            instructions: Err(failure),
            seen_ingredients: Mutex::new(None),
        }
    }

    pub fn last_ingredients(&self) -> Option<String> {
        self.seen_ingredients.lock().ok().and_then(|seen| seen.clone())
    }
}

#[async_trait::async_trait]
impl RecipeProvider for FakeRecipeProvider {
    async fn find_by_ingredients(&self, ingredients: &str) -> Result<Vec<IngredientMatch>, ProviderError> {
        if let Ok(mut seen) = self.seen_ingredients.lock() {
            *seen = Some(ingredients.to_string());
        }
        self.matches.clone().map_err(ProviderError::from)
    }

    async fn generate_week_plan(&self) -> Result<serde_json::Value, ProviderError> {
        self.plan.clone().map_err(ProviderError::from)
    }

    async fn analyzed_instructions(&self, _recipe_id: i64) -> Result<Vec<AnalyzedInstruction>, ProviderError> {
        self.instructions.clone().map_err(ProviderError::from)
    }
}

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.auth.jwt_secret = Some(TEST_JWT_SECRET.to_string());
    config.api.enable_swagger = false;
    config
}

/// A local client for the full application, backed by an in-memory store and the given provider.
pub async fn test_client_with(config: Config, provider: FakeRecipeProvider) -> (Client, Arc<InMemoryUserRepository>) {
    let repo = Arc::new(InMemoryUserRepository::default());
    let store: UserStore = repo.clone();
    let provider: ProviderHandle = Arc::new(provider);

    let rocket = crate::assemble_rocket(&config).manage(store).manage(provider);
    let client = Client::tracked(rocket).await.expect("valid rocket instance");
    (client, repo)
}

pub async fn test_client(provider: FakeRecipeProvider) -> (Client, Arc<InMemoryUserRepository>) {
    test_client_with(test_config(), provider).await
}
