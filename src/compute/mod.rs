//! Cloud job launcher.
//!
//! Each job runs on its own short-lived virtual machine. [`CloudComputeService`]
//! turns a [`CloudJob`] into exactly one provider call per operation: launch
//! requests a single instance, terminate releases the instance recorded on
//! the job. Nothing is retried or polled; callers own that policy.

mod ec2;
mod error;

use std::future::Future;
use std::pin::Pin;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::{debug, info, warn};

use crate::config::ComputeConfig;
use crate::job::CloudJob;

pub use ec2::Ec2ComputeApi;
pub use error::ComputeError;

/// Future returned by [`ComputeApi`] operations.
pub type ComputeFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ComputeError>> + Send + 'a>>;

/// Instance count requested for every job launch.
const INSTANCES_PER_JOB: i32 = 1;

/// Parameters of a run-instances call.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RunInstancesRequest {
    /// Machine image to boot.
    pub image_id: String,
    /// Minimum number of instances to create.
    pub min_count: i32,
    /// Maximum number of instances to create.
    pub max_count: i32,
    /// Instance type; `None` leaves the provider default.
    pub instance_type: Option<String>,
    /// Key pair name; `None` installs no key.
    pub key_name: Option<String>,
    /// Base64 encoded user data handed to the instance on boot.
    pub user_data: String,
}

/// Parameters of a terminate-instances call.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TerminateInstancesRequest {
    /// Instances to terminate.
    pub instance_ids: Vec<String>,
}

/// Instance record reported by a run-instances call.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct LaunchedInstance {
    /// Provider identifier, when the provider reported one.
    pub instance_id: Option<String>,
}

/// Outcome of a run-instances call.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RunInstancesResponse {
    /// Instances created by the call, in provider order.
    pub instances: Vec<LaunchedInstance>,
}

/// Instance lifecycle calls offered by a compute provider.
pub trait ComputeApi {
    /// Creates instances as described by `request`.
    fn run_instances<'a>(
        &'a self,
        request: &'a RunInstancesRequest,
    ) -> ComputeFuture<'a, RunInstancesResponse>;

    /// Terminates the instances listed in `request`.
    fn terminate_instances<'a>(
        &'a self,
        request: &'a TerminateInstancesRequest,
    ) -> ComputeFuture<'a, ()>;
}

/// Builds the run-instances request for `job` without sending it.
///
/// `user_data` is Base64 encoded with the standard, padded alphabet and no
/// line wrapping.
///
/// # Errors
///
/// Returns [`ComputeError::Validation`] when the job has no image id.
pub fn build_run_request(
    job: &CloudJob,
    user_data: &str,
) -> Result<RunInstancesRequest, ComputeError> {
    if job.image_id.trim().is_empty() {
        return Err(ComputeError::Validation(String::from("image_id")));
    }
    Ok(RunInstancesRequest {
        image_id: job.image_id.clone(),
        min_count: INSTANCES_PER_JOB,
        max_count: INSTANCES_PER_JOB,
        instance_type: job.instance_type.clone(),
        key_name: job.key_name.clone(),
        user_data: STANDARD.encode(user_data.as_bytes()),
    })
}

/// Launches and terminates job instances through a [`ComputeApi`].
#[derive(Clone, Debug)]
pub struct CloudComputeService<A> {
    api: A,
}

impl CloudComputeService<Ec2ComputeApi> {
    /// Builds a service talking to the EC2 endpoint described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ComputeError::Config`] when the configuration is invalid.
    pub fn from_config(config: &ComputeConfig) -> Result<Self, ComputeError> {
        Ok(Self::new(Ec2ComputeApi::new(config)?))
    }
}

impl<A: ComputeApi> CloudComputeService<A> {
    /// Wraps a provider client.
    #[must_use]
    pub const fn new(api: A) -> Self {
        Self { api }
    }

    /// Returns the wrapped provider client.
    #[must_use]
    pub const fn api(&self) -> &A {
        &self.api
    }

    /// Starts a single instance for `job` and returns its identifier.
    ///
    /// `Ok(None)` means the provider accepted the call but created no
    /// instance; callers decide whether that is fatal.
    ///
    /// # Errors
    ///
    /// Returns [`ComputeError::Validation`] for a job without image id, and
    /// propagates [`ComputeError::Transport`] or
    /// [`ComputeError::ProviderRejected`] from the provider unchanged.
    pub async fn launch(
        &self,
        job: &CloudJob,
        user_data: &str,
    ) -> Result<Option<String>, ComputeError> {
        let request = build_run_request(job, user_data)?;
        debug!(
            job = %job.id,
            image = %request.image_id,
            instance_type = ?request.instance_type,
            key_name = ?request.key_name,
            "requesting job instance"
        );

        let response = self.api.run_instances(&request).await?;
        let Some(instance) = response.instances.into_iter().next() else {
            warn!(job = %job.id, "provider reported no instances for job launch");
            return Ok(None);
        };

        let Some(instance_id) = instance.instance_id else {
            warn!(job = %job.id, "provider reported an instance without id");
            return Ok(None);
        };
        info!(job = %job.id, instance = %instance_id, "job instance launched");
        Ok(Some(instance_id))
    }

    /// Requests termination of the instance recorded on `job`.
    ///
    /// # Errors
    ///
    /// Returns [`ComputeError::MissingInstanceId`] when the job was never
    /// launched, and propagates provider failures unchanged.
    pub async fn terminate(&self, job: &CloudJob) -> Result<(), ComputeError> {
        let instance_id = job
            .instance_id
            .clone()
            .ok_or_else(|| ComputeError::MissingInstanceId {
                job_id: job.id.clone(),
            })?;
        let request = TerminateInstancesRequest {
            instance_ids: vec![instance_id],
        };

        self.api.terminate_instances(&request).await?;
        info!(job = %job.id, instances = ?request.instance_ids, "job instance terminated");
        Ok(())
    }
}
