//! Gateway client configuration

use crate::{Error, Result, DEFAULT_BATCH_CONCURRENCY, DEFAULT_REQUEST_TIMEOUT_SECONDS, DEFAULT_SETTLE_DELAY_MS};
use momo_protocol::{Environment, SchemaVersion};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming the active environment
pub const ENVIRONMENT_VAR: &str = "ENVIRONMENT";
/// Environment variable naming the default API generation
pub const API_VERSION_VAR: &str = "PAWAPAY_API_VERSION";
/// Environment variable carrying the SDK license key
pub const LICENSE_KEY_VAR: &str = "KATORYMND_PAWAPAY_SDK_LICENSE_KEY";

/// Gateway client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Active environment
    pub environment: Environment,

    /// Default API generation when a call does not pick one
    pub api_version: SchemaVersion,

    /// Sandbox bearer token
    pub sandbox_api_token: Option<String>,

    /// Production bearer token
    pub production_api_token: Option<String>,

    /// SDK license key
    pub license_key: Option<String>,

    /// Base URL override applied to every environment
    pub base_url: Option<String>,

    /// Per-request timeout (seconds)
    pub request_timeout_seconds: u64,

    /// Pause between payout initiation and its status check (milliseconds)
    pub settle_delay_ms: u64,

    /// Recipients processed in parallel by the batch coordinator
    pub batch_concurrency: usize,

    /// Directory for configuration-feed snapshots
    pub data_dir: PathBuf,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Sandbox,
            api_version: SchemaVersion::V1,
            sandbox_api_token: None,
            production_api_token: None,
            license_key: None,
            base_url: None,
            request_timeout_seconds: DEFAULT_REQUEST_TIMEOUT_SECONDS,
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            batch_concurrency: DEFAULT_BATCH_CONCURRENCY,
            data_dir: PathBuf::from("./data"),
        }
    }
}

impl GatewayConfig {
    /// Load from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: GatewayConfig = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = GatewayConfig::default();
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(env) = var(ENVIRONMENT_VAR) {
            config.environment = Environment::from_name(&env);
        }

        if let Some(version) = var(API_VERSION_VAR) {
            config.api_version = version
                .parse()
                .map_err(|e| Error::Config(format!("{}: {}", API_VERSION_VAR, e)))?;
        }

        config.sandbox_api_token = var(&Environment::Sandbox.token_var());
        config.production_api_token = var(&Environment::Production.token_var());
        config.license_key = var(LICENSE_KEY_VAR);
        config.base_url = var("PAWAPAY_BASE_URL");

        if let Some(dir) = var("MOMO_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }

        if let Some(delay) = var("MOMO_SETTLE_DELAY_MS") {
            config.settle_delay_ms = delay
                .parse()
                .map_err(|e| Error::Config(format!("MOMO_SETTLE_DELAY_MS: {}", e)))?;
        }

        if let Some(limit) = var("MOMO_BATCH_CONCURRENCY") {
            config.batch_concurrency = limit
                .parse()
                .map_err(|e| Error::Config(format!("MOMO_BATCH_CONCURRENCY: {}", e)))?;
        }

        Ok(config)
    }

    /// Bearer token for an environment
    pub fn api_token(&self, environment: Environment) -> Option<&str> {
        match environment {
            Environment::Sandbox => self.sandbox_api_token.as_deref(),
            Environment::Production => self.production_api_token.as_deref(),
        }
    }

    /// Base URL for an environment, honoring the override
    pub fn base_url_for(&self, environment: Environment) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| environment.default_base_url().to_string())
            .trim_end_matches('/')
            .to_string()
    }

    /// Settle delay as a duration
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Fail fast when credentials for `environment` are missing
    pub fn validate(&self, environment: Environment) -> Result<()> {
        if self.api_token(environment).is_none() {
            return Err(Error::Config(format!(
                "API token not found for {} environment (set {})",
                environment,
                environment.token_var()
            )));
        }
        if self.license_key.is_none() {
            return Err(Error::Config(format!(
                "SDK license key not configured (set {})",
                LICENSE_KEY_VAR
            )));
        }
        if self.batch_concurrency == 0 {
            return Err(Error::Config("batch_concurrency must be at least 1".into()));
        }
        Ok(())
    }
}
