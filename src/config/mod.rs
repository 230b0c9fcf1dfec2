use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub session: SessionConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    /// Seconds to wait when acquiring a pooled connection
    pub connection_timeout: u64,
    pub run_migrations: bool,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// HS256 secret shared with the identity provider
    #[serde(skip_serializing)]
    pub secret: String,
    pub issuer: Option<String>,
    pub audience: Option<String>,
    pub cookie_name: String,
    pub token_ttl_hours: u64,
}

// Hand-written so the secret never reaches a log line
impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("cookie_name", &self.cookie_name)
            .field("token_ttl_hours", &self.token_ttl_hours)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("SESSION_SECRET must be set in {0:?} mode")]
    MissingSessionSecret(Environment),
}

const DEVELOPMENT_SESSION_SECRET: &str = "notes-api-development-secret";

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| env::var(key).ok())
    }

    /// Apply overrides from `lookup`, keyed by environment variable name
    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        // Server overrides
        if let Some(v) = lookup("SERVER_HOST") {
            self.server.host = v;
        }
        if let Some(v) = lookup("SERVER_PORT").or_else(|| lookup("PORT")) {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }

        // Database overrides
        if let Some(v) = lookup("DATABASE_URL") {
            if !v.trim().is_empty() {
                self.database.url = Some(v);
            }
        }
        if let Some(v) = lookup("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Some(v) = lookup("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Some(v) = lookup("DATABASE_RUN_MIGRATIONS") {
            self.database.run_migrations = v.parse().unwrap_or(self.database.run_migrations);
        }

        // Session overrides
        if let Some(v) = lookup("SESSION_SECRET") {
            self.session.secret = v;
        }
        if let Some(v) = lookup("SESSION_ISSUER") {
            self.session.issuer = Some(v).filter(|s| !s.is_empty());
        }
        if let Some(v) = lookup("SESSION_AUDIENCE") {
            self.session.audience = Some(v).filter(|s| !s.is_empty());
        }
        if let Some(v) = lookup("SESSION_COOKIE_NAME") {
            if !v.is_empty() {
                self.session.cookie_name = v;
            }
        }
        if let Some(v) = lookup("SESSION_TOKEN_TTL_HOURS") {
            self.session.token_ttl_hours = v.parse().unwrap_or(self.session.token_ttl_hours);
        }

        // Security overrides
        if let Some(v) = lookup("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Some(v) = lookup("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        self
    }

    /// Checks settings that have no safe default outside development
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session.secret.is_empty() {
            return Err(ConfigError::MissingSessionSecret(self.environment));
        }
        Ok(())
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
                run_migrations: true,
            },
            session: SessionConfig {
                secret: DEVELOPMENT_SESSION_SECRET.to_string(),
                issuer: None,
                audience: None,
                cookie_name: "appSession".to_string(),
                token_ttl_hours: 24 * 7, // 1 week
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 10,
                run_migrations: true,
            },
            session: SessionConfig {
                secret: String::new(),
                issuer: None,
                audience: None,
                cookie_name: "appSession".to_string(),
                token_ttl_hours: 24,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
                run_migrations: true,
            },
            session: SessionConfig {
                secret: String::new(),
                issuer: None,
                audience: None,
                cookie_name: "appSession".to_string(),
                token_ttl_hours: 4,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.environment, Environment::Development);
        assert!(config.database.run_migrations);
        assert!(!config.session.secret.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(config.database.run_migrations);
        assert_eq!(config.session.token_ttl_hours, 4);
        assert_eq!(
            config.validate(),
            Err(ConfigError::MissingSessionSecret(Environment::Production))
        );
    }

    fn overrides(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: std::collections::HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_env_overrides_replace_profile_defaults() {
        let config = AppConfig::production().with_overrides(overrides(&[
            ("SERVER_HOST", "10.0.0.5"),
            ("PORT", "8080"),
            ("DATABASE_URL", "postgres://notes@db/notes"),
            ("DATABASE_MAX_CONNECTIONS", "7"),
            ("DATABASE_RUN_MIGRATIONS", "false"),
            ("SESSION_SECRET", "s3cret"),
            ("SESSION_AUDIENCE", "notes"),
            ("SESSION_ISSUER", ""),
            ("SESSION_COOKIE_NAME", "sid"),
            ("SESSION_TOKEN_TTL_HOURS", "12"),
            ("SECURITY_ENABLE_CORS", "false"),
            ("SECURITY_CORS_ORIGINS", "https://a.example.com, ,https://b.example.com"),
        ]));

        assert_eq!(config.server.host, "10.0.0.5");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.url.as_deref(), Some("postgres://notes@db/notes"));
        assert_eq!(config.database.max_connections, 7);
        assert!(!config.database.run_migrations);
        assert_eq!(config.session.secret, "s3cret");
        assert_eq!(config.session.audience.as_deref(), Some("notes"));
        assert_eq!(config.session.issuer, None);
        assert_eq!(config.session.cookie_name, "sid");
        assert_eq!(config.session.token_ttl_hours, 12);
        assert!(!config.security.enable_cors);
        assert_eq!(
            config.security.cors_origins,
            vec!["https://a.example.com".to_string(), "https://b.example.com".to_string()]
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unparseable_overrides_keep_defaults() {
        let config = AppConfig::development().with_overrides(overrides(&[
            ("SERVER_PORT", "http"),
            ("SERVER_HOST", "0.0.0.0"),
            ("DATABASE_URL", "  "),
            ("DATABASE_RUN_MIGRATIONS", "maybe"),
            ("SESSION_COOKIE_NAME", ""),
        ]));

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.database.url, None);
        assert!(config.database.run_migrations);
        assert_eq!(config.session.cookie_name, "appSession");
    }

    #[test]
    fn test_server_port_takes_precedence_over_port() {
        let config = AppConfig::staging().with_overrides(overrides(&[("SERVER_PORT", "4000"), ("PORT", "5000")]));
        assert_eq!(config.server.port, 4000);
    }

    #[test]
    fn test_session_secret_not_in_debug_output() {
        let config = AppConfig::development();
        let printed = format!("{:?}", config.session);
        assert!(!printed.contains(DEVELOPMENT_SESSION_SECRET));
        assert!(printed.contains("<redacted>"));
    }
}
