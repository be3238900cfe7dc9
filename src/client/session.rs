use crate::client::storage::KeyValueStorage;
use crate::models::recipe::RecipeSummary;
use tracing::warn;

pub const TOKEN_KEY: &str = "token";
pub const RECIPES_KEY: &str = "recipes";

pub const LOGIN_ROUTE: &str = "/login";
/// Routes that require a stored token.
pub const PROTECTED_ROUTES: &[&str] = &["/home"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Allow,
    Redirect(&'static str),
}

/// Auth token and last search results cached in device storage.
///
/// The cached token only decides client-side navigation. Anything that needs
/// the user's identity goes through `GET /api/auth/me`, which re-validates it.
pub struct ClientSession<S: KeyValueStorage> {
    storage: S,
}

impl<S: KeyValueStorage> ClientSession<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn token(&self) -> Option<String> {
        self.storage.get(TOKEN_KEY).filter(|t| !t.is_empty())
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    pub fn store_token(&mut self, token: &str) {
        self.storage.set(TOKEN_KEY, token.to_string());
    }

    pub fn logout(&mut self) {
        self.storage.remove(TOKEN_KEY);
    }

    /// The last fetched recipes. A missing or unreadable entry reads as empty.
    pub fn recipes(&self) -> Vec<RecipeSummary> {
        let Some(raw) = self.storage.get(RECIPES_KEY) else {
            return Vec::new();
        };

        match serde_json::from_str::<Option<Vec<RecipeSummary>>>(&raw) {
            Ok(recipes) => recipes.unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "discarding unreadable cached recipes");
                Vec::new()
            }
        }
    }

    pub fn store_recipes(&mut self, recipes: &[RecipeSummary]) -> Result<(), serde_json::Error> {
        let raw = serde_json::to_string(recipes)?;
        self.storage.set(RECIPES_KEY, raw);
        Ok(())
    }

    pub fn find_recipe(&self, id: i64) -> Option<RecipeSummary> {
        self.recipes().into_iter().find(|r| r.id == id)
    }

    pub fn guard(&self, route: &str) -> RouteDecision {
        let route = route.trim_end_matches('/');
        if PROTECTED_ROUTES.contains(&route) && !self.is_authenticated() {
            RouteDecision::Redirect(LOGIN_ROUTE)
        } else {
            RouteDecision::Allow
        }
    }
}
