//! Configuration loading via `ortho-config`.

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

/// Default region used when none is configured.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Compute provider settings derived from environment variables and
/// configuration files.
#[derive(Clone, Deserialize, OrthoConfig, PartialEq, Eq)]
#[ortho_config(
    prefix = "PORTAL_COMPUTE",
    discovery(
        app_name = "geoportal",
        env_var = "GEOPORTAL_CONFIG_PATH",
        config_file_name = "geoportal.toml",
        dotfile_name = ".geoportal.toml",
        project_file_name = "geoportal.toml"
    )
)]
pub struct ComputeConfig {
    /// URL of the EC2-compatible compute endpoint. When absent the regional
    /// AWS endpoint is used.
    pub endpoint: Option<String>,
    /// Access key (user name) used to sign requests.
    pub access_key: String,
    /// Secret key (password) used to sign requests.
    pub secret_key: String,
    /// Signing region. Defaults to `us-east-1`.
    #[ortho_config(default = DEFAULT_REGION.to_owned())]
    pub region: String,
}

impl std::fmt::Debug for ComputeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComputeConfig")
            .field("endpoint", &self.endpoint)
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("region", &self.region)
            .finish()
    }
}

/// Metadata for a configuration field, used to generate actionable error messages.
struct FieldMetadata {
    description: &'static str,
    env_var: &'static str,
    toml_key: &'static str,
}

impl FieldMetadata {
    const fn new(description: &'static str, env_var: &'static str, toml_key: &'static str) -> Self {
        Self {
            description,
            env_var,
            toml_key,
        }
    }
}

impl ComputeConfig {
    fn require_field(value: &str, metadata: &FieldMetadata) -> Result<(), ConfigError> {
        if value.trim().is_empty() {
            return Err(ConfigError::MissingField(format!(
                "missing {}: set {} or add {} to geoportal.toml",
                metadata.description, metadata.env_var, metadata.toml_key
            )));
        }
        Ok(())
    }

    /// Loads configuration without attempting to parse CLI arguments. Values
    /// merge defaults, configuration files, and environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the merge fails.
    pub fn load_without_cli_args() -> Result<Self, ConfigError> {
        Self::load_from_iter([std::ffi::OsString::from("geoportal")])
            .map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Performs semantic validation on required fields.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when a required field is empty,
    /// or [`ConfigError::InvalidEndpoint`] when the endpoint is not a URL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Self::require_field(
            &self.access_key,
            &FieldMetadata::new(
                "compute access key",
                "PORTAL_COMPUTE_ACCESS_KEY",
                "access_key",
            ),
        )?;
        Self::require_field(
            &self.secret_key,
            &FieldMetadata::new(
                "compute secret key",
                "PORTAL_COMPUTE_SECRET_KEY",
                "secret_key",
            ),
        )?;
        Self::require_field(
            &self.region,
            &FieldMetadata::new("compute region", "PORTAL_COMPUTE_REGION", "region"),
        )?;
        if let Some(endpoint) = &self.endpoint {
            reqwest::Url::parse(endpoint).map_err(|err| ConfigError::InvalidEndpoint {
                endpoint: endpoint.clone(),
                message: err.to_string(),
            })?;
        }
        Ok(())
    }
}

/// Errors raised during configuration loading and validation.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    /// Indicates a required configuration field is empty or missing.
    #[error("missing configuration field: {0}")]
    MissingField(String),
    /// Raised when the configured endpoint cannot be parsed as a URL.
    #[error("invalid compute endpoint `{endpoint}`: {message}")]
    InvalidEndpoint {
        /// Endpoint as configured.
        endpoint: String,
        /// Parser error message.
        message: String,
    },
    /// Surfaces errors from the `ortho-config` loader.
    #[error("configuration parsing failed: {0}")]
    Parse(String),
}

impl From<ortho_config::OrthoError> for ConfigError {
    fn from(value: ortho_config::OrthoError) -> Self {
        Self::Parse(value.to_string())
    }
}
