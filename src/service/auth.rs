// src/service/auth.rs

use crate::database::user::{UserRepository, dummy_verify, hash_password, verify_password};
use crate::error::app_error::AppError;
use crate::models::user::{LoginResponse, RegisterRequest, UserProfile, UserResponse};
use crate::service::token::TokenSigner;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

pub const REGISTERED_MESSAGE: &str = "Registered successfully";

pub struct AuthService<'a> {
    pub repo: &'a dyn UserRepository,
    pub signer: &'a TokenSigner,
}

impl<'a> AuthService<'a> {
    pub fn new(repo: &'a dyn UserRepository, signer: &'a TokenSigner) -> Self {
        Self { repo, signer }
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<&'static str, AppError> {
        request.validate()?;

        if self.repo.get_user_by_email(&request.email).await?.is_some() {
            return Err(AppError::UserAlreadyExists);
        }

        let password_hash = hash_password(&request.password)?;
        let user = self.repo.create_user(&request.name, &request.email, &password_hash).await?;
        info!(user_id = %user.id, "user registered");

        Ok(REGISTERED_MESSAGE)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, AppError> {
        let Some(user) = self.repo.get_user_by_email(email).await? else {
            dummy_verify(password);
            warn!("login rejected: unknown email");
            return Err(AppError::Unauthorized("User not found"));
        };

        if let Err(e) = verify_password(&user, password) {
            warn!(user_id = %user.id, "login rejected: invalid password");
            return Err(e);
        }

        let token = self.signer.issue(&user.id)?;
        info!(user_id = %user.id, "session token issued");

        Ok(LoginResponse {
            token,
            user: UserProfile::from(&user),
        })
    }

    /// Resolves a bearer token to the user it was issued for.
    pub async fn resolve_token(&self, token: Option<&str>) -> Result<UserResponse, AppError> {
        let token = token
            .filter(|t| !t.is_empty())
            .ok_or(AppError::Unauthorized("Unauthorized - No token provided"))?;
        let user_id: Uuid = self.signer.validate(token)?;

        match self.repo.get_user_by_id(&user_id).await? {
            Some(user) => Ok(UserResponse::from(&user)),
            None => {
                warn!(user_id = %user_id, "token refers to a user that no longer exists");
                Err(AppError::UserNotFound)
            }
        }
    }
}
