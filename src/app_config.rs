// Centralized configuration management for the payment recovery service
// Load ALL env vars ONCE at startup, then pass the struct explicitly

use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub platform: PlatformConfig,
    pub email: EmailConfig,
    pub dev_bypass: DevBypassConfig,
    pub disable_embedded_migrations: bool,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub environment: Environment,
    pub rust_log: String,
}

/// Environment type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Staging,
    Production,
}

impl From<String> for Environment {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Environment::Development,
            "test" => Environment::Test,
            "staging" | "stage" => Environment::Staging,
            // Anything unrecognised is treated as production so dev-only shortcuts stay off
            _ => Environment::Production,
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Staging => write!(f, "staging"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: u64,
    pub idle_timeout: u64,
    pub max_lifetime: u64,
}

/// Membership platform API + webhook configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    pub api_url: String,
    pub api_key: String,
    pub app_id: String,
    pub agent_user_id: Option<String>,
    pub webhook_secret: Option<String>,
    pub webhook_tolerance_secs: u64,
    /// PEM encoded ES256 public key used to verify `x-whop-user-token`
    pub user_token_public_key: Option<String>,
    pub http_timeout_secs: u64,
}

impl std::fmt::Debug for PlatformConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &"<redacted>")
            .field("app_id", &self.app_id)
            .field("agent_user_id", &self.agent_user_id)
            .field("webhook_secret", &self.webhook_secret.as_ref().map(|_| "<redacted>"))
            .field("webhook_tolerance_secs", &self.webhook_tolerance_secs)
            .field("user_token_public_key", &self.user_token_public_key.is_some())
            .field("http_timeout_secs", &self.http_timeout_secs)
            .finish()
    }
}

/// Email configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    pub resend_api_key: String,
    pub resend_api_url: String,
    pub from_email: String,
    pub from_name: String,
    pub update_payment_url: String, // Where recipients go to fix their billing details
    pub max_retries: u32,
    pub retry_delay_ms: u64,
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("resend_api_key", &"<redacted>")
            .field("resend_api_url", &self.resend_api_url)
            .field("from_email", &self.from_email)
            .field("from_name", &self.from_name)
            .field("update_payment_url", &self.update_payment_url)
            .field("max_retries", &self.max_retries)
            .field("retry_delay_ms", &self.retry_delay_ms)
            .finish()
    }
}

/// Development-only shortcut that replaces member lookups with a fixed identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevBypassConfig {
    pub enabled: bool,
    pub test_email: String,
    pub test_name: String,
}

/// Fixed recipient used while the identity bypass is active
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestIdentity {
    pub email: String,
    pub name: String,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Helper function to get required env var
        let get_required = |key: &str| -> Result<String, ConfigError> {
            env::var(key).map_err(|_| ConfigError::MissingVar(key.to_string()))
        };

        // Helper function to get optional env var with default
        let get_or_default = |key: &str, default: &str| -> String {
            env::var(key).unwrap_or_else(|_| default.to_string())
        };

        let get_optional = |key: &str| -> Option<String> {
            env::var(key).ok().filter(|v| !v.trim().is_empty())
        };

        let parse_or_default = |key: &str, default: &str| -> Result<u32, ConfigError> {
            get_or_default(key, default).parse().map_err(|_| {
                ConfigError::InvalidValue(key.to_string(), "not a valid u32".to_string())
            })
        };

        let parse_u64_or_default = |key: &str, default: &str| -> Result<u64, ConfigError> {
            get_or_default(key, default).parse().map_err(|_| {
                ConfigError::InvalidValue(key.to_string(), "not a valid u64".to_string())
            })
        };

        let parse_bool_or_default = |key: &str, default: &str| -> bool {
            get_or_default(key, default).to_lowercase() == "true"
        };

        // Parse bind address to extract port
        let bind_address = get_or_default("BIND_ADDRESS", "0.0.0.0:8080");
        let port = bind_address
            .rsplit(':')
            .next()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        let environment = Environment::from(get_or_default("ENVIRONMENT", "production"));

        let server = ServerConfig {
            bind_address,
            port,
            environment,
            rust_log: get_or_default("RUST_LOG", "info"),
        };

        let database = DatabaseConfig {
            url: get_required("DATABASE_URL")?,
            max_connections: parse_or_default("DATABASE_MAX_CONNECTIONS", "20")?,
            min_connections: parse_or_default("DATABASE_MIN_CONNECTIONS", "2")?,
            connect_timeout: parse_u64_or_default("DATABASE_CONNECT_TIMEOUT", "30")?,
            idle_timeout: parse_u64_or_default("DATABASE_IDLE_TIMEOUT", "600")?,
            max_lifetime: parse_u64_or_default("DATABASE_MAX_LIFETIME", "1800")?,
        };

        if database.min_connections > database.max_connections {
            return Err(ConfigError::InvalidValue(
                "DATABASE_MIN_CONNECTIONS".to_string(),
                "cannot exceed DATABASE_MAX_CONNECTIONS".to_string(),
            ));
        }

        // Signature checks are skipped in development, so the secret is only mandatory elsewhere
        let webhook_secret = get_optional("WHOP_WEBHOOK_SECRET");
        if webhook_secret.is_none() && environment != Environment::Development {
            return Err(ConfigError::MissingVar("WHOP_WEBHOOK_SECRET".to_string()));
        }

        let platform = PlatformConfig {
            api_url: get_or_default("WHOP_API_URL", "https://api.whop.com"),
            api_key: get_required("WHOP_API_KEY")?,
            app_id: get_or_default("WHOP_APP_ID", ""),
            agent_user_id: get_optional("WHOP_AGENT_USER_ID"),
            webhook_secret,
            webhook_tolerance_secs: parse_u64_or_default("WEBHOOK_TOLERANCE_SECS", "300")?,
            user_token_public_key: get_optional("WHOP_USER_TOKEN_PUBLIC_KEY"),
            http_timeout_secs: parse_u64_or_default("PLATFORM_HTTP_TIMEOUT_SECS", "15")?,
        };

        let email = EmailConfig {
            resend_api_key: get_required("RESEND_API_KEY")?,
            resend_api_url: get_or_default("RESEND_API_URL", "https://api.resend.com/emails"),
            from_email: get_or_default("EMAIL_FROM_ADDRESS", "onboarding@resend.dev"),
            from_name: get_or_default("EMAIL_FROM_NAME", "Payment Recovery"),
            update_payment_url: get_or_default(
                "UPDATE_PAYMENT_URL",
                "https://whop.com/hub/settings/billing",
            ),
            max_retries: parse_or_default("EMAIL_MAX_RETRIES", "3")?.max(1),
            retry_delay_ms: parse_u64_or_default("EMAIL_RETRY_DELAY_MS", "1000")?,
        };

        let dev_bypass = DevBypassConfig {
            enabled: parse_bool_or_default("DEV_MODE_BYPASS_WHOP_API", "false"),
            test_email: get_or_default("DEV_MODE_TEST_EMAIL", "test@example.com"),
            test_name: get_or_default("DEV_MODE_TEST_NAME", "Test User"),
        };

        Ok(Self {
            server,
            database,
            platform,
            email,
            dev_bypass,
            disable_embedded_migrations: parse_bool_or_default(
                "DISABLE_EMBEDDED_MIGRATIONS",
                "false",
            ),
        })
    }

    /// Check if running in development
    pub fn is_development(&self) -> bool {
        self.server.environment == Environment::Development
    }

    /// Fixed identity to use instead of member lookups.
    ///
    /// Both conditions must hold: development environment AND the bypass flag.
    /// The flag alone is inert in every other environment.
    pub fn identity_bypass(&self) -> Option<TestIdentity> {
        if self.is_development() && self.dev_bypass.enabled {
            Some(TestIdentity {
                email: self.dev_bypass.test_email.clone(),
                name: self.dev_bypass.test_name.clone(),
            })
        } else {
            None
        }
    }

    /// True when the bypass flag is set somewhere it has no effect
    pub fn has_inert_bypass_flag(&self) -> bool {
        self.dev_bypass.enabled && !self.is_development()
    }
}
