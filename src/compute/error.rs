//! Error types for the cloud job launcher.

use crate::config::ConfigError;
use thiserror::Error;

/// Errors raised while launching or terminating job instances.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ComputeError {
    /// Raised when the compute configuration is incomplete.
    #[error("configuration error: {0}")]
    Config(String),
    /// Raised when a job is missing a field required for launch.
    #[error("invalid job: missing or empty field: {0}")]
    Validation(String),
    /// Raised when terminating a job that was never launched.
    #[error("job {job_id} has no instance id to terminate")]
    MissingInstanceId {
        /// Identifier of the job.
        job_id: String,
    },
    /// The request never received a verdict from the provider (connection,
    /// timeout, dispatch or response decoding failure).
    #[error("transport failure: {message}")]
    Transport {
        /// Description of the client-side failure.
        message: String,
    },
    /// The provider understood the request and refused it.
    #[error("provider rejected request ({code}): {message}")]
    ProviderRejected {
        /// Provider error code, for example `InstanceLimitExceeded`.
        code: String,
        /// Message returned by the provider.
        message: String,
    },
}

impl From<ConfigError> for ComputeError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value.to_string())
    }
}
