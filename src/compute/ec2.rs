//! EC2 implementation of [`ComputeApi`].
//!
//! Any EC2-compatible endpoint (AWS or a private cloud exposing the EC2 API)
//! can be targeted through [`ComputeConfig::endpoint`].

use aws_sdk_ec2::Client;
use aws_sdk_ec2::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_ec2::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_ec2::operation::run_instances::builders::RunInstancesFluentBuilder;
use aws_sdk_ec2::operation::terminate_instances::builders::TerminateInstancesFluentBuilder;
use aws_sdk_ec2::types::{InstanceType, ShutdownBehavior};

use crate::config::ComputeConfig;

use super::{
    ComputeApi, ComputeError, ComputeFuture, LaunchedInstance, RunInstancesRequest,
    RunInstancesResponse, TerminateInstancesRequest,
};

/// Name reported by the static credentials provider in SDK diagnostics.
const CREDENTIALS_PROVIDER: &str = "geoportal-config";

/// Fallback code for service errors that carry no error code.
const UNKNOWN_ERROR_CODE: &str = "Unknown";

/// [`ComputeApi`] backed by the AWS EC2 SDK.
#[derive(Clone, Debug)]
pub struct Ec2ComputeApi {
    client: Client,
}

impl Ec2ComputeApi {
    /// Builds a client using the endpoint and static credentials in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ComputeError::Config`] when the configuration fails
    /// validation.
    pub fn new(config: &ComputeConfig) -> Result<Self, ComputeError> {
        config.validate()?;
        let credentials = Credentials::new(
            config.access_key.clone(),
            config.secret_key.clone(),
            None,
            None,
            CREDENTIALS_PROVIDER,
        );
        let mut builder = aws_sdk_ec2::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials);
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint.clone());
        }
        Ok(Self::from_client(Client::from_conf(builder.build())))
    }

    /// Wraps an already configured SDK client.
    #[must_use]
    pub const fn from_client(client: Client) -> Self {
        Self { client }
    }

    /// Maps `request` onto the SDK call. Instance-initiated shutdown is
    /// always `terminate`.
    fn run_instances_call(&self, request: &RunInstancesRequest) -> RunInstancesFluentBuilder {
        self.client
            .run_instances()
            .image_id(&request.image_id)
            .min_count(request.min_count)
            .max_count(request.max_count)
            .set_instance_type(request.instance_type.as_deref().map(InstanceType::from))
            .set_key_name(request.key_name.clone())
            .user_data(&request.user_data)
            .instance_initiated_shutdown_behavior(ShutdownBehavior::Terminate)
    }

    fn terminate_instances_call(
        &self,
        request: &TerminateInstancesRequest,
    ) -> TerminateInstancesFluentBuilder {
        self.client
            .terminate_instances()
            .set_instance_ids(Some(request.instance_ids.clone()))
    }
}

impl ComputeApi for Ec2ComputeApi {
    fn run_instances<'a>(
        &'a self,
        request: &'a RunInstancesRequest,
    ) -> ComputeFuture<'a, RunInstancesResponse> {
        Box::pin(async move {
            let output = self
                .run_instances_call(request)
                .send()
                .await
                .map_err(classify_sdk_error)?;

            let instances = output
                .instances()
                .iter()
                .map(|instance| LaunchedInstance {
                    instance_id: instance.instance_id().map(str::to_owned),
                })
                .collect();
            Ok(RunInstancesResponse { instances })
        })
    }

    fn terminate_instances<'a>(
        &'a self,
        request: &'a TerminateInstancesRequest,
    ) -> ComputeFuture<'a, ()> {
        Box::pin(async move {
            self.terminate_instances_call(request)
                .send()
                .await
                .map_err(classify_sdk_error)?;
            Ok(())
        })
    }
}

/// Splits SDK failures into provider rejections (the service answered with an
/// error) and transport failures (everything else).
fn classify_sdk_error<E, R>(err: SdkError<E, R>) -> ComputeError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    match err {
        SdkError::ServiceError(context) => {
            let service_err = context.err();
            ComputeError::ProviderRejected {
                code: service_err.code().unwrap_or(UNKNOWN_ERROR_CODE).to_owned(),
                message: service_err.message().map_or_else(
                    || DisplayErrorContext(service_err).to_string(),
                    str::to_owned,
                ),
            }
        }
        other => ComputeError::Transport {
            message: DisplayErrorContext(&other).to_string(),
        },
    }
}
