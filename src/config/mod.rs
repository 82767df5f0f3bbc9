use std::env;

use thiserror::Error;

pub mod cors;

pub use cors::create_cors_layer;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),
}

/// Process configuration, read once at startup and injected from there.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// Symmetric secret used to sign session cookies.
    pub session_secret: String,
    /// Secret API key for the payment provider.
    pub payment_secret_key: String,
    /// Base URL of the payment provider's REST API. Overridable so tests
    /// can point the adapter at a mock server.
    pub payment_api_url: String,
    /// Externally reachable base URL of this API, used to build the
    /// payment callback URL.
    pub public_base_url: String,
    /// URL of the client application, used for cancel redirects.
    pub client_url: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            database_url: require("DATABASE_URL")?,
            session_secret: require("SESSION_SECRET")?,
            payment_secret_key: require("PAYMENT_SECRET_KEY")?,
            payment_api_url: env::var("PAYMENT_API_URL")
                .unwrap_or_else(|_| "https://api.stripe.com".to_string()),
            public_base_url: env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3001".to_string()),
            client_url: env::var("CLIENT_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3001),
        })
    }
}

fn require(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::MissingVar(name))
}
