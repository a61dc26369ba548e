//! Command-line interface definitions for the `geoportal` binary.
//!
//! This module centralises the clap parser structures so both the main binary
//! and the build script can reuse them when generating the manual page.

use clap::{Args, Parser, Subcommand};

/// Top-level CLI for the `geoportal` binary.
#[derive(Debug, Parser)]
#[command(
    name = "geoportal",
    about = "Build WMS requests and launch cloud jobs for a geoscience portal",
    arg_required_else_help = true
)]
pub(crate) enum Cli {
    /// Build OGC Web Map Service requests.
    #[command(subcommand, name = "wms", about = "Build OGC Web Map Service requests")]
    Wms(WmsCommand),
    /// Launch and terminate cloud job instances.
    #[command(subcommand, name = "job", about = "Launch and terminate cloud job instances")]
    Job(JobCommand),
}

/// WMS request builders.
#[derive(Debug, Subcommand)]
pub(crate) enum WmsCommand {
    /// Print a GetCapabilities request.
    #[command(name = "capabilities")]
    Capabilities(CapabilitiesArgs),
    /// Print a GetMap request.
    #[command(name = "map")]
    Map(MapArgs),
    /// Print a GetLegendGraphic request.
    #[command(name = "legend")]
    Legend(LegendArgs),
    /// Print a GetFeatureInfo request.
    #[command(name = "feature-info")]
    FeatureInfo(FeatureInfoArgs),
}

/// Options shared by every WMS subcommand.
#[derive(Debug, Args)]
pub(crate) struct EndpointArgs {
    /// WMS endpoint URL; existing query parameters are kept.
    #[arg(long, value_name = "URL")]
    pub(crate) url: String,
    /// Print the request descriptor as JSON instead of the URL.
    #[arg(long)]
    pub(crate) json: bool,
}

/// Geographic extent and output size of a rendered map.
#[derive(Debug, Args)]
pub(crate) struct ExtentArgs {
    /// Spatial reference system, for example `EPSG:4326`.
    #[arg(long, value_name = "SRS", default_value = "EPSG:4326")]
    pub(crate) srs: String,
    /// West bound.
    #[arg(long, allow_negative_numbers = true)]
    pub(crate) west: f64,
    /// South bound.
    #[arg(long, allow_negative_numbers = true)]
    pub(crate) south: f64,
    /// East bound.
    #[arg(long, allow_negative_numbers = true)]
    pub(crate) east: f64,
    /// North bound.
    #[arg(long, allow_negative_numbers = true)]
    pub(crate) north: f64,
    /// Image width in pixels.
    #[arg(long)]
    pub(crate) width: u32,
    /// Image height in pixels.
    #[arg(long)]
    pub(crate) height: u32,
}

/// Arguments for `geoportal wms capabilities`.
#[derive(Debug, Args)]
pub(crate) struct CapabilitiesArgs {
    #[command(flatten)]
    pub(crate) endpoint: EndpointArgs,
}

/// Arguments for `geoportal wms map`.
#[derive(Debug, Args)]
pub(crate) struct MapArgs {
    #[command(flatten)]
    pub(crate) endpoint: EndpointArgs,
    /// Layer to render.
    #[arg(long)]
    pub(crate) layer: String,
    /// Image MIME type.
    #[arg(long, default_value = "image/png")]
    pub(crate) format: String,
    #[command(flatten)]
    pub(crate) extent: ExtentArgs,
    /// Named style to apply.
    #[arg(long)]
    pub(crate) styles: Option<String>,
    /// Inline style sheet sent as `sld_body`.
    #[arg(long, value_name = "SLD")]
    pub(crate) style_body: Option<String>,
}

/// Arguments for `geoportal wms legend`.
#[derive(Debug, Args)]
pub(crate) struct LegendArgs {
    #[command(flatten)]
    pub(crate) endpoint: EndpointArgs,
    /// Layer whose legend is requested.
    #[arg(long)]
    pub(crate) layer: String,
    /// Legend width in pixels.
    #[arg(long)]
    pub(crate) width: Option<u32>,
    /// Legend height in pixels.
    #[arg(long)]
    pub(crate) height: Option<u32>,
    /// Named style to apply.
    #[arg(long)]
    pub(crate) styles: Option<String>,
}

/// Arguments for `geoportal wms feature-info`.
#[derive(Debug, Args)]
pub(crate) struct FeatureInfoArgs {
    #[command(flatten)]
    pub(crate) endpoint: EndpointArgs,
    /// Layer to query.
    #[arg(long)]
    pub(crate) layer: String,
    /// MIME type of the response.
    #[arg(long, value_name = "FORMAT", default_value = "application/vnd.ogc.gml")]
    pub(crate) info_format: String,
    #[command(flatten)]
    pub(crate) extent: ExtentArgs,
    /// Clicked longitude.
    #[arg(long, allow_negative_numbers = true)]
    pub(crate) lng: f64,
    /// Clicked latitude.
    #[arg(long, allow_negative_numbers = true)]
    pub(crate) lat: f64,
    /// Clicked pixel column.
    #[arg(long)]
    pub(crate) x: u32,
    /// Clicked pixel row.
    #[arg(long)]
    pub(crate) y: u32,
    /// Named style to apply.
    #[arg(long)]
    pub(crate) styles: Option<String>,
    /// Inline style sheet.
    #[arg(long)]
    pub(crate) sld: Option<String>,
}

/// Cloud job lifecycle commands.
#[derive(Debug, Subcommand)]
pub(crate) enum JobCommand {
    /// Launch one instance for a job and print its id.
    #[command(name = "launch")]
    Launch(LaunchArgs),
    /// Terminate a job's instance.
    #[command(name = "terminate")]
    Terminate(TerminateArgs),
}

/// Arguments for `geoportal job launch`.
#[derive(Debug, Args)]
pub(crate) struct LaunchArgs {
    /// Job label used in logs.
    #[arg(long, value_name = "ID", default_value = "cli")]
    pub(crate) job_id: String,
    /// Machine image to boot.
    #[arg(long, value_name = "IMAGE")]
    pub(crate) image_id: String,
    /// Instance type, for example `t3.small`.
    #[arg(long, value_name = "TYPE")]
    pub(crate) instance_type: Option<String>,
    /// Name of the key pair to install.
    #[arg(long, value_name = "NAME")]
    pub(crate) key_name: Option<String>,
    /// Startup payload passed inline.
    #[arg(long, value_name = "USER_DATA", conflicts_with = "user_data_file")]
    pub(crate) user_data: Option<String>,
    /// Startup payload read from a local file.
    #[arg(long, value_name = "PATH", conflicts_with = "user_data")]
    pub(crate) user_data_file: Option<String>,
    /// Print the launched job as JSON instead of the bare instance id.
    #[arg(long)]
    pub(crate) json: bool,
}

/// Arguments for `geoportal job terminate`.
#[derive(Debug, Args)]
pub(crate) struct TerminateArgs {
    /// Job label used in logs.
    #[arg(long, value_name = "ID", default_value = "cli")]
    pub(crate) job_id: String,
    /// Instance to terminate.
    #[arg(long, value_name = "ID")]
    pub(crate) instance_id: String,
}
