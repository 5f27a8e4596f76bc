//! Client configuration: defaults, optional TOML file, then environment.

use crate::RetryConfig;
use config::{Config, Environment, File};
use derive_getters::Getters;
use librato_error::{ConfigError, ConfigErrorKind};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Production API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://metrics-api.librato.com/v1";

/// Per-request timeout unless configured otherwise.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Environment variable prefix, e.g. `LIBRATO_EMAIL`, `LIBRATO_RETRY__MAX_ATTEMPTS`.
pub const ENV_PREFIX: &str = "LIBRATO";

fn default_user_agent() -> String {
    format!("librato-rs/{}", env!("CARGO_PKG_VERSION"))
}

/// Connection settings for the Librato API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, derive_builder::Builder)]
#[builder(setter(into))]
pub struct ClientConfig {
    /// API base URL
    #[builder(default = "DEFAULT_BASE_URL.to_string()")]
    base_url: String,
    /// Account email used as the basic-auth user
    email: String,
    /// API token used as the basic-auth password
    #[serde(skip_serializing)]
    token: String,
    /// Per-request timeout in seconds
    #[builder(default = "DEFAULT_TIMEOUT_SECS")]
    timeout_secs: u64,
    /// User-Agent header
    #[builder(default = "default_user_agent()")]
    user_agent: String,
    /// Retry policy for transient failures
    #[builder(default)]
    retry: RetryConfig,
}

/// Shape of the merged configuration before credentials are checked.
#[derive(Debug, Deserialize)]
struct RawClientConfig {
    base_url: String,
    email: Option<String>,
    token: Option<String>,
    timeout_secs: u64,
    user_agent: String,
    #[serde(default)]
    retry: RetryConfig,
}

impl ClientConfig {
    /// Returns a builder for constructing a ClientConfig.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Load configuration from defaults, a TOML file and the environment.
    ///
    /// With `path` the file must exist. Without it,
    /// `<config dir>/librato/config.toml` is read if present.
    /// Environment variables (`LIBRATO_EMAIL`, `LIBRATO_TOKEN`,
    /// `LIBRATO_BASE_URL`, `LIBRATO_TIMEOUT_SECS`, `LIBRATO_RETRY__MAX_ATTEMPTS`, ...)
    /// override the file.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be parsed or credentials are missing.
    #[instrument(skip_all, fields(path = ?path))]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => Some(File::from(path).required(true)),
            None => default_config_path().map(|path| File::from(path).required(false)),
        };
        let environment = Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true);
        Self::from_sources(file, Some(environment))
    }

    /// Load configuration from a single TOML file, ignoring the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, malformed, or lacks credentials.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_sources(Some(File::from(path.as_ref()).required(true)), None)
    }

    fn from_sources(
        file: Option<File<config::FileSourceFile, config::FileFormat>>,
        environment: Option<Environment>,
    ) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("base_url", DEFAULT_BASE_URL)
            .and_then(|b| b.set_default("timeout_secs", DEFAULT_TIMEOUT_SECS as i64))
            .and_then(|b| b.set_default("user_agent", default_user_agent()))
            .map_err(load_error)?;

        if let Some(file) = file {
            builder = builder.add_source(file);
        }
        if let Some(environment) = environment {
            builder = builder.add_source(environment);
        }

        let raw: RawClientConfig = builder
            .build()
            .and_then(|settings| settings.try_deserialize())
            .map_err(load_error)?;

        let email = raw.email.filter(|s| !s.is_empty()).ok_or_else(|| {
            ConfigError::new(ConfigErrorKind::MissingCredential {
                field: "email",
                env_var: "LIBRATO_EMAIL",
            })
        })?;
        let token = raw.token.filter(|s| !s.is_empty()).ok_or_else(|| {
            ConfigError::new(ConfigErrorKind::MissingCredential {
                field: "token",
                env_var: "LIBRATO_TOKEN",
            })
        })?;

        raw.retry.validate()?;

        debug!(base_url = %raw.base_url, email = %email, "Loaded client configuration");

        Ok(Self {
            base_url: raw.base_url,
            email,
            token,
            timeout_secs: raw.timeout_secs,
            user_agent: raw.user_agent,
            retry: raw.retry,
        })
    }
}

/// `<config dir>/librato/config.toml`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("librato").join("config.toml"))
}

fn load_error(err: config::ConfigError) -> ConfigError {
    ConfigError::new(ConfigErrorKind::Load(err.to_string()))
}
