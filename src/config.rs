use rocket::figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE_PATH: &str = "/api";
pub const DEFAULT_SPOONACULAR_BASE_URL: &str = "https://api.spoonacular.com";

/// Signing secret used when none is configured and the insecure fallback is allowed.
/// Only suitable for local development.
pub const DEVELOPMENT_JWT_SECRET: &str = "fallback-jwt-secret-for-development-only";

/// Name of the Rocket profile the server was ignited with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeProfile(pub String);

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub cors: CorsConfig,
    pub api: ApiConfig,
    pub auth: AuthConfig,
    pub spoonacular: SpoonacularConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub address: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub json_format: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiConfig {
    pub base_path: String,
    pub enable_swagger: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: Option<String>,
    /// When the secret is unset, sign with [`DEVELOPMENT_JWT_SECRET`] instead of failing.
    pub allow_insecure_fallback: bool,
    pub token_ttl_days: i64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SpoonacularConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/smartchef".to_string(),
            max_connections: 16,
            min_connections: 1,
            acquire_timeout: 5,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            address: "127.0.0.1".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".to_string()],
            allow_credentials: false,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_path: DEFAULT_API_BASE_PATH.to_string(),
            enable_swagger: true,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            allow_insecure_fallback: true,
            token_ttl_days: 7,
        }
    }
}

impl Default for SpoonacularConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_SPOONACULAR_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

impl AuthConfig {
    /// The secret tokens are signed with, if one is available.
    ///
    /// Empty strings count as unset.
    pub fn signing_secret(&self) -> Option<&str> {
        match self.jwt_secret.as_deref().map(str::trim) {
            Some(secret) if !secret.is_empty() => Some(secret),
            _ if self.allow_insecure_fallback => Some(DEVELOPMENT_JWT_SECRET),
            _ => None,
        }
    }

    pub fn uses_fallback_secret(&self) -> bool {
        self.jwt_secret.as_deref().is_none_or(|s| s.trim().is_empty()) && self.allow_insecure_fallback
    }
}

impl SpoonacularConfig {
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| !key.trim().is_empty())
    }
}

impl Config {
    /// Load configuration from multiple sources in priority order:
    /// 1. SmartChef.toml (base configuration file)
    /// 2. Environment variables (prefixed with SMARTCHEF_, sections separated by `__`,
    ///    e.g. SMARTCHEF_AUTH__JWT_SECRET)
    /// 3. Legacy deployment variables: DATABASE_URL / MONGO_URI, JWT_SECRET, PORT, SPOONACULAR_API_KEY
    pub fn load() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }

    fn figment() -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file("SmartChef.toml").nested())
            .merge(Env::prefixed("SMARTCHEF_").split("__"))
            .merge(Env::raw().only(&["MONGO_URI"]).map(|_| "database.url".into()))
            .merge(Env::raw().only(&["DATABASE_URL"]).map(|_| "database.url".into()))
            .merge(Env::raw().only(&["JWT_SECRET"]).map(|_| "auth.jwt_secret".into()))
            .merge(Env::raw().only(&["PORT"]).map(|_| "server.port".into()))
            .merge(Env::raw().only(&["SPOONACULAR_API_KEY"]).map(|_| "spoonacular.api_key".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_deployment_expectations() {
        let config = Config::default();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.auth.token_ttl_days, 7);
        assert_eq!(config.api.base_path, "/api");
        assert!(config.spoonacular.api_key().is_none());
    }

    #[test]
    fn signing_secret_prefers_configured_value() {
        let auth = AuthConfig {
            jwt_secret: Some("configured".to_string()),
            ..AuthConfig::default()
        };
        assert_eq!(auth.signing_secret(), Some("configured"));
        assert!(!auth.uses_fallback_secret());
    }

    #[test]
    fn signing_secret_falls_back_in_development() {
        let auth = AuthConfig::default();
        assert_eq!(auth.signing_secret(), Some(DEVELOPMENT_JWT_SECRET));
        assert!(auth.uses_fallback_secret());
    }

    #[test]
    fn signing_secret_missing_without_fallback() {
        let auth = AuthConfig {
            jwt_secret: Some("   ".to_string()),
            allow_insecure_fallback: false,
            ..AuthConfig::default()
        };
        assert_eq!(auth.signing_secret(), None);
    }

    #[test]
    fn legacy_environment_variables_are_mapped() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("PORT", "6001");
            jail.set_env("JWT_SECRET", "from-env");
            jail.set_env("SPOONACULAR_API_KEY", "key-123");
            jail.set_env("DATABASE_URL", "postgres://db/smartchef");

            let config: Config = Config::figment().extract()?;
            assert_eq!(config.server.port, 6001);
            assert_eq!(config.auth.jwt_secret.as_deref(), Some("from-env"));
            assert_eq!(config.spoonacular.api_key(), Some("key-123"));
            assert_eq!(config.database.url, "postgres://db/smartchef");
            Ok(())
        });
    }

    #[test]
    fn toml_file_overrides_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "SmartChef.toml",
                r#"
                [default.logging]
                level = "debug"
                json_format = true
                "#,
            )?;

            let config: Config = Config::figment().extract()?;
            assert_eq!(config.logging.level, "debug");
            assert!(config.logging.json_format);
            Ok(())
        });
    }
}
