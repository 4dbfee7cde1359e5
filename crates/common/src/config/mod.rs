//! Configuration management for WebLoom
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config/default, config/{APP_ENV}, config/local)
//! - Default values
//!
//! Existing deployments configure the remote model and token secret
//! through the bare `GEMINI_API_KEY` and `JWT_SECRET` variables; those
//! are honored as fallbacks.

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Remote model (Gemini) configuration
    pub ai: AiConfig,

    /// Authentication configuration
    pub auth: AuthConfig,

    /// Observability configuration
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds; must exceed `ai.timeout_secs` so a
    /// stalled remote call still resolves to a fallback answer
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Shutdown timeout in seconds
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// SQLite database URL
    #[serde(default = "default_database_url")]
    pub url: String,

    /// Maximum number of connections
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AiConfig {
    /// API key for the remote model; absent means AI answering is disabled
    pub api_key: Option<String>,

    /// API base URL
    #[serde(default = "default_ai_api_base")]
    pub api_base: String,

    /// Model to use
    #[serde(default = "default_ai_model")]
    pub model: String,

    /// Request timeout in seconds; the remote call is abandoned past this bound
    #[serde(default = "default_ai_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Secret for token signing
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,

    /// Token expiration in seconds
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level (debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default = "default_json_logging")]
    pub json_logging: bool,

    /// Service name for tracing
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

// Default value functions
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 3002 }
fn default_request_timeout() -> u64 { 60 }
fn default_shutdown_timeout() -> u64 { 30 }
fn default_database_url() -> String { "sqlite://webloom.db".to_string() }
fn default_max_connections() -> u32 { 5 }
fn default_connect_timeout() -> u64 { 10 }
fn default_ai_api_base() -> String { "https://generativelanguage.googleapis.com/v1beta".to_string() }
fn default_ai_model() -> String { crate::DEFAULT_MODEL.to_string() }
fn default_ai_timeout() -> u64 { 30 }
fn default_jwt_secret() -> String { "webloom-dev-secret".to_string() }
fn default_token_ttl() -> u64 { 7 * 24 * 60 * 60 }
fn default_log_level() -> String { "info".to_string() }
fn default_json_logging() -> bool { false }
fn default_service_name() -> String { "webloom".to_string() }

impl AppConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Start with defaults
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port() as i64)?

            // Load base config file
            .add_source(File::with_name("config/default").required(false))

            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))

            // Load local overrides
            .add_source(File::with_name("config/local").required(false))

            // Load from environment variables with APP__ prefix
            // e.g., APP__SERVER__PORT=8081
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true)
            )

            .build()?;

        let mut config: AppConfig = config.try_deserialize()?;
        config.apply_legacy_env();
        Ok(config)
    }

    /// Load from a specific TOML file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true)
            )
            .build()?;

        let mut config: AppConfig = config.try_deserialize()?;
        config.apply_legacy_env();
        Ok(config)
    }

    /// Honor the bare environment variables existing deployments use.
    fn apply_legacy_env(&mut self) {
        if self.ai.api_key.is_none() {
            self.ai.api_key = std::env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty());
        }
        if let Ok(secret) = std::env::var("JWT_SECRET") {
            if !secret.is_empty() {
                self.auth.jwt_secret = secret;
            }
        }
        if let Ok(port) = std::env::var("PORT") {
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
    }

    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }

    /// Get shutdown timeout as Duration
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.server.shutdown_timeout_secs)
    }

    /// Whether a remote model is configured
    pub fn ai_configured(&self) -> bool {
        self.ai.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: default_host(),
                port: default_port(),
                request_timeout_secs: default_request_timeout(),
                shutdown_timeout_secs: default_shutdown_timeout(),
            },
            database: DatabaseConfig {
                url: default_database_url(),
                max_connections: default_max_connections(),
                connect_timeout_secs: default_connect_timeout(),
            },
            ai: AiConfig {
                api_key: None,
                api_base: default_ai_api_base(),
                model: default_ai_model(),
                timeout_secs: default_ai_timeout(),
            },
            auth: AuthConfig {
                jwt_secret: default_jwt_secret(),
                token_ttl_secs: default_token_ttl(),
            },
            observability: ObservabilityConfig {
                log_level: default_log_level(),
                json_logging: default_json_logging(),
                service_name: default_service_name(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 3002);
        assert_eq!(config.ai.model, "gemini-2.5-flash");
        assert!(!config.ai_configured());
    }

    #[test]
    fn test_token_ttl_default() {
        let config = AppConfig::default();
        // Tokens live for seven days
        assert_eq!(config.auth.token_ttl_secs, 604_800);
    }

    #[test]
    fn test_ai_configured() {
        let mut config = AppConfig::default();
        config.ai.api_key = Some(String::new());
        assert!(!config.ai_configured());
        config.ai.api_key = Some("key".to_string());
        assert!(config.ai_configured());
    }
}
