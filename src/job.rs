//! Job records consumed by the cloud job launcher.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A unit of remote work executed on a dedicated virtual machine.
///
/// The job is owned by the job-management layer; the launcher only borrows it
/// to read launch parameters and the recorded instance identifier.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct CloudJob {
    /// Identifier used by the job-management layer and in log output.
    pub id: String,
    /// Machine image (for example an AMI id) the instance boots from.
    pub image_id: String,
    /// Instance type to request; `None` uses the provider default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<String>,
    /// Access key pair name installed on the instance; `None` installs none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_name: Option<String>,
    /// Provider instance identifier, present once the job has been launched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
}

/// Errors raised while updating a [`CloudJob`].
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum JobError {
    /// Raised when an instance id is recorded on a job that already has one.
    #[error("job {job_id} already runs on instance {instance_id}")]
    InstanceAlreadyRecorded {
        /// Job identifier.
        job_id: String,
        /// Instance identifier already stored on the job.
        instance_id: String,
    },
}

impl CloudJob {
    /// Creates a job with the required fields and no optional overrides.
    #[must_use]
    pub fn new(id: impl Into<String>, image_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            image_id: image_id.into(),
            ..Self::default()
        }
    }

    /// Sets the instance type.
    #[must_use]
    pub fn with_instance_type(mut self, value: impl Into<String>) -> Self {
        self.instance_type = Some(value.into());
        self
    }

    /// Sets the access key pair name.
    #[must_use]
    pub fn with_key_name(mut self, value: impl Into<String>) -> Self {
        self.key_name = Some(value.into());
        self
    }

    /// Sets the instance identifier of an already running job.
    #[must_use]
    pub fn with_instance_id(mut self, value: impl Into<String>) -> Self {
        self.instance_id = Some(value.into());
        self
    }

    /// Records the instance identifier returned by a successful launch.
    ///
    /// # Errors
    ///
    /// Returns [`JobError::InstanceAlreadyRecorded`] when the job already
    /// carries an instance id; the stored id is left untouched.
    pub fn record_instance_id(&mut self, instance_id: impl Into<String>) -> Result<(), JobError> {
        if let Some(existing) = &self.instance_id {
            return Err(JobError::InstanceAlreadyRecorded {
                job_id: self.id.clone(),
                instance_id: existing.clone(),
            });
        }
        self.instance_id = Some(instance_id.into());
        Ok(())
    }
}
