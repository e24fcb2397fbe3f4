//! Application settings and configuration structures.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Root configuration structure containing all application settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Server configuration (host, port)
    pub server: ServerSettings,

    /// Database configuration (PostgreSQL)
    pub database: DatabaseSettings,

    /// CORS configuration
    pub cors: CorsSettings,

    /// Avatar file storage
    pub avatars: AvatarSettings,

    /// External identity provider (Google)
    pub identity: IdentitySettings,

    /// Current environment (development, staging, production)
    pub environment: String,
}

/// Server binding configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// Host address to bind to (e.g., "0.0.0.0")
    pub host: String,

    /// Port number to listen on
    pub port: u16,
}

/// PostgreSQL database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// Database connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections to maintain
    pub min_connections: u32,

    /// Connection acquire timeout in seconds
    pub acquire_timeout: u64,

    /// Apply pending migrations at startup
    pub run_migrations: bool,
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CorsSettings {
    /// Allowed origins; empty allows any origin
    pub allowed_origins: Vec<String>,
}

/// Avatar storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AvatarSettings {
    /// Directory avatar files are written to
    pub directory: String,

    /// Maximum upload size in bytes
    pub max_bytes: usize,
}

/// Google identity provider configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentitySettings {
    /// OAuth client id (required for the authorization-code flow)
    pub google_client_id: Option<String>,

    /// OAuth client secret (required for the authorization-code flow)
    pub google_client_secret: Option<String>,

    /// Redirect URI used when the client does not send one
    pub default_redirect_uri: String,

    /// ID token verification endpoint
    pub tokeninfo_url: String,

    /// Authorization code exchange endpoint
    pub token_url: String,

    /// Profile endpoint for exchanged access tokens
    pub userinfo_url: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Settings {
    /// Load settings from environment variables and configuration files.
    ///
    /// The loading order is:
    /// 1. config/default.toml (base configuration)
    /// 2. config/{RUN_ENV}.toml (environment-specific overrides)
    /// 3. Environment variables (highest priority)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if configuration cannot be loaded or parsed,
    /// or if a limit is set to zero.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let environment = std::env::var("RUN_ENV").unwrap_or_else(|_| "development".into());

        Config::builder()
            .set_default("environment", environment.clone())?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5000)?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("database.acquire_timeout", 30)?
            .set_default("database.run_migrations", true)?
            .set_default("cors.allowed_origins", Vec::<String>::new())?
            .set_default("avatars.directory", "avatars")?
            .set_default("avatars.max_bytes", 1_048_576_i64)? // 1 MiB
            .set_default(
                "identity.default_redirect_uri",
                "urn:ietf:wg:oauth:2.0:oob",
            )?
            .set_default(
                "identity.tokeninfo_url",
                "https://oauth2.googleapis.com/tokeninfo",
            )?
            .set_default("identity.token_url", "https://oauth2.googleapis.com/token")?
            .set_default(
                "identity.userinfo_url",
                "https://www.googleapis.com/oauth2/v2/userinfo",
            )?
            .set_default("identity.timeout_secs", 10)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // APP__SERVER__PORT=5000 -> server.port = 5000
            .add_source(
                Environment::default()
                    .prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("server.host", std::env::var("SERVER_HOST").ok())?
            .set_override_option("server.port", std::env::var("SERVER_PORT").ok())?
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .set_override_option("avatars.directory", std::env::var("AVATARS_DIR").ok())?
            .set_override_option(
                "identity.google_client_id",
                std::env::var("GOOGLE_CLIENT_ID").ok(),
            )?
            .set_override_option(
                "identity.google_client_secret",
                std::env::var("GOOGLE_CLIENT_SECRET").ok(),
            )?
            .build()?
            .try_deserialize()
            .and_then(|settings: Self| settings.validate())
    }

    /// Reject settings that would make requests unbounded or impossible.
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.avatars.max_bytes == 0 {
            return Err(ConfigError::Message(
                "avatars.max_bytes must be greater than zero".into(),
            ));
        }
        if self.identity.timeout_secs == 0 {
            return Err(ConfigError::Message(
                "identity.timeout_secs must be greater than zero".into(),
            ));
        }
        Ok(self)
    }

    /// Get the full server address as a string.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl IdentitySettings {
    /// Client credentials, when both are configured.
    pub fn client_credentials(&self) -> Option<(&str, &str)> {
        match (&self.google_client_id, &self.google_client_secret) {
            (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => {
                Some((id.as_str(), secret.as_str()))
            }
            _ => None,
        }
    }
}
