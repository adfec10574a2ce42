//! # Configuration
//!
//! Layered configuration: a TOML file (`config/liftops.toml`, with an
//! optional per-environment override alongside it) topped by `LIFTOPS_`
//! environment variables. Loading is explicit and validated; there are no
//! silent fallbacks for values that matter, and an empty session secret is
//! refused outright.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{LiftopsError, Result};

/// Database connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_pool")]
    pub pool: u32,
}

fn default_pool() -> u32 {
    10
}

/// Session token settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub session_secret: String,
    #[serde(default = "default_issuer")]
    pub jwt_issuer: String,
    #[serde(default = "default_audience")]
    pub jwt_audience: String,
    #[serde(default = "default_ttl")]
    pub token_ttl_seconds: i64,
}

fn default_issuer() -> String {
    "liftops".to_string()
}

fn default_audience() -> String {
    "liftops-web".to_string()
}

fn default_ttl() -> i64 {
    60 * 60 * 8
}

impl AuthConfig {
    /// Fixed secret for unit tests only.
    pub fn for_tests() -> Self {
        AuthConfig {
            session_secret: "test-session-secret-not-for-production".to_string(),
            jwt_issuer: default_issuer(),
            jwt_audience: default_audience(),
            token_ttl_seconds: default_ttl(),
        }
    }
}

/// Upload storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadsConfig {
    #[serde(default = "default_uploads_dir")]
    pub dir: String,
    #[serde(default = "default_public_base")]
    pub public_base: String,
}

fn default_uploads_dir() -> String {
    "uploads".to_string()
}

fn default_public_base() -> String {
    "/uploads".to_string()
}

impl Default for UploadsConfig {
    fn default() -> Self {
        UploadsConfig {
            dir: default_uploads_dir(),
            public_base: default_public_base(),
        }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiftopsConfig {
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub uploads: UploadsConfig,
}

impl LiftopsConfig {
    /// Load configuration for the current environment.
    ///
    /// Sources, later layers overriding earlier ones:
    /// 1. `config/liftops.toml`
    /// 2. `config/liftops.{env}.toml` where `env` is `LIFTOPS_ENV`
    ///    (default `development`)
    /// 3. `LIFTOPS_*` environment variables (`LIFTOPS_DATABASE__URL`, ...)
    pub fn load() -> Result<Self> {
        let environment =
            std::env::var("LIFTOPS_ENV").unwrap_or_else(|_| "development".to_string());
        info!(%environment, "loading configuration");

        let settings = config::Config::builder()
            .add_source(config::File::with_name("config/liftops").required(false))
            .add_source(
                config::File::with_name(&format!("config/liftops.{environment}")).required(false),
            )
            .add_source(config::Environment::with_prefix("LIFTOPS").separator("__"))
            .build()
            .map_err(|e| LiftopsError::Configuration(e.to_string()))?;

        let loaded: LiftopsConfig = settings
            .try_deserialize()
            .map_err(|e| LiftopsError::Configuration(e.to_string()))?;
        loaded.validate()?;
        Ok(loaded)
    }

    pub fn validate(&self) -> Result<()> {
        if self.database.url.is_empty() {
            return Err(LiftopsError::Configuration(
                "database.url must be set".to_string(),
            ));
        }
        if self.auth.session_secret.is_empty() {
            return Err(LiftopsError::Configuration(
                "auth.session_secret must be set".to_string(),
            ));
        }
        if self.auth.token_ttl_seconds <= 0 {
            return Err(LiftopsError::Configuration(
                "auth.token_ttl_seconds must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Install the structured-logging subscriber for binaries and tools.
/// `RUST_LOG` controls the filter; defaults to `info`.
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> LiftopsConfig {
        LiftopsConfig {
            database: DatabaseConfig {
                url: "postgres://localhost/liftops_test".to_string(),
                pool: default_pool(),
            },
            auth: AuthConfig::for_tests(),
            uploads: UploadsConfig::default(),
        }
    }

    #[test]
    fn valid_config_passes_validation() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn empty_secret_fails_validation() {
        let mut config = valid_config();
        config.auth.session_secret = String::new();
        assert!(matches!(
            config.validate(),
            Err(LiftopsError::Configuration(_))
        ));
    }

    #[test]
    fn nonpositive_ttl_fails_validation() {
        let mut config = valid_config();
        config.auth.token_ttl_seconds = 0;
        assert!(config.validate().is_err());
    }
}
