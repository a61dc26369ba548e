//! Core library for the geoportal service wrappers.
//!
//! The crate exposes a cloud job launcher that starts and stops EC2 (or
//! EC2-compatible) instances for background jobs, a builder for OGC Web Map
//! Service GET requests, and a checker for OGC exception reports returned by
//! map services.

pub mod compute;
pub mod config;
pub mod job;
pub mod ows;
pub mod test_support;
pub mod user_data;
pub mod wms;

pub use compute::{CloudComputeService, ComputeApi, ComputeError, Ec2ComputeApi};
pub use config::{ComputeConfig, ConfigError};
pub use job::{CloudJob, JobError};
pub use ows::{OwsError, check_for_exception_response};
pub use user_data::{UserDataError, resolve_user_data};
pub use wms::{
    BoundingBox, FeatureInfoParams, GetMapParams, GetRequest, ImageSize, LegendParams, WmsError,
    get_capabilities, get_feature_info, get_legend_graphic, get_map,
};
