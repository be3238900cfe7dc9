use crate::auth::BearerToken;
use crate::config::{Config, RuntimeProfile};
use crate::db::UserStore;
use crate::error::app_error::AppError;
use crate::models::user::{EnvironmentCheckResponse, LoginRequest, LoginResponse, MeResponse, RegisterRequest, RegisterResponse};
use crate::service::auth::AuthService;
use crate::service::token::TokenSigner;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{State, get, post};
use rocket_okapi::openapi;

/// Register a new account
#[openapi(tag = "Auth")]
#[post("/register", data = "<payload>")]
pub async fn register(store: &State<UserStore>, signer: &State<TokenSigner>, payload: Json<RegisterRequest>) -> Result<(Status, Json<RegisterResponse>), AppError> {
    let service = AuthService::new(store.inner().as_ref(), signer);
    let message = service.register(&payload).await?;
    Ok((
        Status::Created,
        Json(RegisterResponse {
            message: message.to_string(),
        }),
    ))
}

/// Exchange credentials for a session token
#[openapi(tag = "Auth")]
#[post("/login", data = "<payload>")]
pub async fn login(store: &State<UserStore>, signer: &State<TokenSigner>, payload: Json<LoginRequest>) -> Result<Json<LoginResponse>, AppError> {
    let service = AuthService::new(store.inner().as_ref(), signer);
    Ok(Json(service.login(&payload.email, &payload.password).await?))
}

/// Resolve the bearer token to the current user
#[openapi(tag = "Auth")]
#[get("/me")]
pub async fn me(store: &State<UserStore>, signer: &State<TokenSigner>, token: BearerToken) -> Result<Json<MeResponse>, AppError> {
    let service = AuthService::new(store.inner().as_ref(), signer);
    let user = service.resolve_token(token.as_deref()).await?;
    Ok(Json(MeResponse { user }))
}

/// Report which deployment settings are present
#[openapi(tag = "Auth")]
#[get("/test")]
pub fn environment_check(config: &State<Config>, profile: &State<RuntimeProfile>) -> Json<EnvironmentCheckResponse> {
    tracing::info!(profile = %profile.0, "environment check requested");

    Json(EnvironmentCheckResponse {
        jwt_secret_exists: config.auth.signing_secret().is_some(),
        database_url_exists: !config.database.url.trim().is_empty(),
        api_key_exists: config.spoonacular.api_key().is_some(),
        profile: profile.0.clone(),
        message: "Backend is running and environment check complete".to_string(),
    })
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![register, login, me, environment_check]
}
