//! Binary entry point for the geoportal CLI.

use std::io::{self, Write};
use std::process;

use clap::Parser;
use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use geoportal::compute::ComputeApi;
use geoportal::{
    BoundingBox, CloudComputeService, CloudJob, ComputeConfig, ComputeError, FeatureInfoParams,
    GetMapParams, GetRequest, ImageSize, JobError, LegendParams, UserDataError, WmsError,
    get_capabilities, get_feature_info, get_legend_graphic, get_map, resolve_user_data,
};

mod cli;

use cli::{Cli, ExtentArgs, JobCommand, LaunchArgs, TerminateArgs, WmsCommand};

/// Exit status reported when the provider accepted a launch but returned no
/// instance.
const EXIT_NO_INSTANCE: i32 = 3;

#[derive(Debug, Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error(transparent)]
    Wms(#[from] WmsError),
    #[error(transparent)]
    UserData(#[from] UserDataError),
    #[error("compute error: {0}")]
    Compute(#[from] ComputeError),
    #[error(transparent)]
    Job(#[from] JobError),
    #[error("failed to write output: {0}")]
    Output(String),
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();
    let exit_code = match dispatch(cli, io::stdout()).await {
        Ok(code) => code,
        Err(err) => {
            report_error(&err);
            1
        }
    };

    process::exit(exit_code);
}

fn init_tracing() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init()
        .ok();
}

async fn dispatch(cli: Cli, out: impl Write) -> Result<i32, CliError> {
    match cli {
        Cli::Wms(command) => {
            let (request, json) = build_wms_request(command)?;
            write_request(out, &request, json)?;
            Ok(0)
        }
        Cli::Job(JobCommand::Launch(args)) => {
            let user_data =
                resolve_user_data(args.user_data.as_deref(), args.user_data_file.as_deref())?;
            let service = ec2_service()?;
            launch_job(&service, &args, &user_data, out).await
        }
        Cli::Job(JobCommand::Terminate(args)) => {
            let service = ec2_service()?;
            terminate_job(&service, &args).await?;
            Ok(0)
        }
    }
}

fn ec2_service() -> Result<CloudComputeService<geoportal::Ec2ComputeApi>, CliError> {
    let config =
        ComputeConfig::load_without_cli_args().map_err(|err| CliError::Config(err.to_string()))?;
    Ok(CloudComputeService::from_config(&config)?)
}

const fn bbox(extent: &ExtentArgs) -> BoundingBox {
    BoundingBox::new(extent.west, extent.south, extent.east, extent.north)
}

const fn image_size(extent: &ExtentArgs) -> ImageSize {
    ImageSize::new(extent.width, extent.height)
}

fn build_wms_request(command: WmsCommand) -> Result<(GetRequest, bool), CliError> {
    let (request, json) = match command {
        WmsCommand::Capabilities(args) => {
            (get_capabilities(&args.endpoint.url)?, args.endpoint.json)
        }
        WmsCommand::Map(args) => {
            let params = GetMapParams {
                styles: args.styles,
                style_body: args.style_body,
                ..GetMapParams::new(
                    args.layer,
                    args.format,
                    args.extent.srs.clone(),
                    bbox(&args.extent),
                    image_size(&args.extent),
                )
            };
            (get_map(&args.endpoint.url, &params)?, args.endpoint.json)
        }
        WmsCommand::Legend(args) => {
            let params = LegendParams {
                layer: args.layer,
                width: args.width,
                height: args.height,
                styles: args.styles,
            };
            (
                get_legend_graphic(&args.endpoint.url, &params)?,
                args.endpoint.json,
            )
        }
        WmsCommand::FeatureInfo(args) => {
            let params = FeatureInfoParams {
                info_format: args.info_format,
                layer: args.layer,
                srs: args.extent.srs.clone(),
                bbox: bbox(&args.extent),
                size: image_size(&args.extent),
                lng: args.lng,
                lat: args.lat,
                x: args.x,
                y: args.y,
                styles: args.styles,
                sld: args.sld,
            };
            (
                get_feature_info(&args.endpoint.url, &params)?,
                args.endpoint.json,
            )
        }
    };
    Ok((request, json))
}

fn write_request(mut out: impl Write, request: &GetRequest, json: bool) -> Result<(), CliError> {
    let rendered = if json {
        serde_json::to_string_pretty(request).map_err(|err| CliError::Output(err.to_string()))?
    } else {
        request.to_string()
    };
    writeln!(out, "{rendered}").map_err(|err| CliError::Output(err.to_string()))
}

fn job_from_args(args: &LaunchArgs) -> CloudJob {
    let mut job = CloudJob::new(args.job_id.as_str(), args.image_id.as_str());
    if let Some(instance_type) = &args.instance_type {
        job = job.with_instance_type(instance_type.as_str());
    }
    if let Some(key_name) = &args.key_name {
        job = job.with_key_name(key_name.as_str());
    }
    job
}

async fn launch_job<A: ComputeApi>(
    service: &CloudComputeService<A>,
    args: &LaunchArgs,
    user_data: &str,
    mut out: impl Write,
) -> Result<i32, CliError> {
    let mut job = job_from_args(args);
    let Some(instance_id) = service.launch(&job, user_data).await? else {
        writeln!(
            io::stderr(),
            "job {} launched no instance; the provider returned an empty reservation",
            job.id
        )
        .ok();
        return Ok(EXIT_NO_INSTANCE);
    };
    job.record_instance_id(instance_id.as_str())?;

    let rendered = if args.json {
        serde_json::to_string_pretty(&job).map_err(|err| CliError::Output(err.to_string()))?
    } else {
        instance_id
    };
    writeln!(out, "{rendered}").map_err(|err| CliError::Output(err.to_string()))?;
    Ok(0)
}

async fn terminate_job<A: ComputeApi>(
    service: &CloudComputeService<A>,
    args: &TerminateArgs,
) -> Result<(), CliError> {
    let job = CloudJob::new(args.job_id.as_str(), "").with_instance_id(args.instance_id.as_str());
    service.terminate(&job).await?;
    Ok(())
}

fn report_error(err: &CliError) {
    write_error(io::stderr(), err);
}

fn write_error(mut target: impl Write, err: &CliError) {
    writeln!(target, "{err}").ok();
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoportal::test_support::RecordingComputeApi;
    use rstest::{fixture, rstest};

    #[fixture]
    fn launch_args() -> LaunchArgs {
        LaunchArgs {
            job_id: String::from("job-7"),
            image_id: String::from("ami-0abc"),
            instance_type: Some(String::from("t3.small")),
            key_name: None,
            user_data: None,
            user_data_file: None,
            json: false,
        }
    }

    fn rendered(buffer: Vec<u8>) -> String {
        String::from_utf8(buffer).expect("output should be utf-8")
    }

    #[rstest]
    fn map_command_prints_url() {
        let cli = Cli::try_parse_from([
            "geoportal",
            "wms",
            "map",
            "--url",
            "http://x/wms",
            "--layer",
            "layerA",
            "--west",
            "-10",
            "--south",
            "-5",
            "--east",
            "10",
            "--north",
            "5",
            "--width",
            "256",
            "--height",
            "256",
        ])
        .expect("arguments should parse");
        let Cli::Wms(command) = cli else {
            panic!("expected a wms command");
        };

        let (request, json) = build_wms_request(command).expect("request should build");
        assert!(!json);
        assert_eq!(
            request.to_string(),
            "http://x/wms?service=WMS&request=GetMap&version=1.1.1&format=image/png\
             &transparent=TRUE&layers=layerA&srs=EPSG:4326&bbox=-10.0,-5.0,10.0,5.0\
             &width=256&height=256"
        );
    }

    #[rstest]
    fn json_output_describes_request() {
        let request = get_capabilities("http://x/wms").expect("request should build");
        let mut buffer = Vec::new();
        write_request(&mut buffer, &request, true).expect("output should be written");

        let value: serde_json::Value =
            serde_json::from_str(&rendered(buffer)).expect("output should be JSON");
        assert_eq!(value["method"], "GET");
        assert_eq!(value["base_url"], "http://x/wms");
    }

    #[rstest]
    fn invalid_endpoint_is_reported() {
        let cli = Cli::try_parse_from(["geoportal", "wms", "capabilities", "--url", "no-scheme"])
            .expect("arguments should parse");
        let Cli::Wms(command) = cli else {
            panic!("expected a wms command");
        };
        let err = build_wms_request(command).expect_err("endpoint should be rejected");
        assert!(matches!(err, CliError::Wms(_)), "unexpected error: {err}");
    }

    #[rstest]
    #[tokio::test]
    async fn launch_prints_instance_id(launch_args: LaunchArgs) {
        let api = RecordingComputeApi::new();
        api.push_launched(&["i-0123"]);
        let service = CloudComputeService::new(api.clone());
        let mut buffer = Vec::new();

        let code = launch_job(&service, &launch_args, "echo hi", &mut buffer)
            .await
            .expect("launch should succeed");

        assert_eq!(code, 0);
        assert_eq!(rendered(buffer), "i-0123\n");
        let requests = api.run_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests.first().and_then(|req| req.instance_type.as_deref()),
            Some("t3.small")
        );
    }

    #[rstest]
    #[tokio::test]
    async fn launch_json_includes_recorded_instance(launch_args: LaunchArgs) {
        let api = RecordingComputeApi::new();
        api.push_launched(&["i-0456"]);
        let service = CloudComputeService::new(api);
        let args = LaunchArgs {
            json: true,
            ..launch_args
        };
        let mut buffer = Vec::new();

        launch_job(&service, &args, "", &mut buffer)
            .await
            .expect("launch should succeed");

        let value: serde_json::Value =
            serde_json::from_str(&rendered(buffer)).expect("output should be JSON");
        assert_eq!(value["id"], "job-7");
        assert_eq!(value["instance_id"], "i-0456");
    }

    #[rstest]
    #[tokio::test]
    async fn empty_launch_exits_with_no_instance_code(launch_args: LaunchArgs) {
        let api = RecordingComputeApi::new();
        api.push_empty_launch();
        let service = CloudComputeService::new(api);
        let mut buffer = Vec::new();

        let code = launch_job(&service, &launch_args, "", &mut buffer)
            .await
            .expect("empty launch is not an error");

        assert_eq!(code, EXIT_NO_INSTANCE);
        assert!(buffer.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn terminate_sends_instance_id() {
        let api = RecordingComputeApi::new();
        api.push_terminated();
        let service = CloudComputeService::new(api.clone());
        let args = TerminateArgs {
            job_id: String::from("job-7"),
            instance_id: String::from("i-0789"),
        };

        terminate_job(&service, &args)
            .await
            .expect("terminate should succeed");

        let requests = api.terminate_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests.first().map(|req| req.instance_ids.clone()),
            Some(vec![String::from("i-0789")])
        );
    }

    #[rstest]
    #[tokio::test]
    async fn provider_rejection_surfaces_as_compute_error(launch_args: LaunchArgs) {
        let api = RecordingComputeApi::new();
        api.push_run_response(Err(ComputeError::ProviderRejected {
            code: String::from("InstanceLimitExceeded"),
            message: String::from("quota reached"),
        }));
        let service = CloudComputeService::new(api);

        let err = launch_job(&service, &launch_args, "", Vec::new())
            .await
            .expect_err("rejection should fail");
        assert!(
            err.to_string().contains("InstanceLimitExceeded"),
            "unexpected error: {err}"
        );
    }

    #[rstest]
    fn write_error_writes_cli_error() {
        let mut buf = Vec::new();
        write_error(&mut buf, &CliError::Config(String::from("missing access key")));
        assert_eq!(rendered(buf), "configuration error: missing access key\n");
    }
}
