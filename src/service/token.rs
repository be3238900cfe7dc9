use crate::config::AuthConfig;
use crate::error::app_error::AppError;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and validates HS256 session tokens.
///
/// Built once from configuration and shared read-only between requests.
/// A signer without a secret still exists so the server can start; every
/// operation on it fails with [`AppError::ServerMisconfiguration`].
pub struct TokenSigner {
    keys: Option<(EncodingKey, DecodingKey)>,
    ttl: Duration,
}

impl TokenSigner {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            keys: Some((EncodingKey::from_secret(secret.as_bytes()), DecodingKey::from_secret(secret.as_bytes()))),
            ttl,
        }
    }

    pub fn from_config(auth: &AuthConfig) -> Self {
        let ttl = Duration::days(auth.token_ttl_days);
        match auth.signing_secret() {
            Some(secret) => Self::new(secret, ttl),
            None => Self { keys: None, ttl },
        }
    }

    fn keys(&self) -> Result<&(EncodingKey, DecodingKey), AppError> {
        self.keys
            .as_ref()
            .ok_or_else(|| AppError::ServerMisconfiguration("Server configuration error".to_string()))
    }

    pub fn issue(&self, user_id: &Uuid) -> Result<String, AppError> {
        self.issue_at(user_id, Utc::now())
    }

    /// Issues a token as if it had been created at `issued_at`.
    pub fn issue_at(&self, user_id: &Uuid, issued_at: DateTime<Utc>) -> Result<String, AppError> {
        let (encoding, _) = self.keys()?;
        let claims = Claims {
            sub: user_id.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + self.ttl).timestamp(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, encoding).map_err(|e| {
            tracing::error!(error = %e, "failed to sign session token");
            AppError::ServerMisconfiguration("Server configuration error".to_string())
        })
    }

    /// Checks signature and expiry and returns the user id the token was issued for.
    pub fn validate(&self, token: &str) -> Result<Uuid, AppError> {
        let (_, decoding) = self.keys()?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let data = jsonwebtoken::decode::<Claims>(token, decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => tracing::debug!("session token expired"),
                kind => tracing::debug!(error = ?kind, "session token rejected"),
            }
            AppError::Unauthorized("Unauthorized - Invalid token")
        })?;

        Uuid::parse_str(&data.claims.sub).map_err(|_| AppError::Unauthorized("Unauthorized - Invalid token"))
    }
}
