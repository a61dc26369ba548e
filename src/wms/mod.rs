//! OGC Web Map Service request builders.
//!
//! Every builder preserves the query parameters already present on the
//! endpoint, then appends `service=WMS`, the operation name and the pinned
//! protocol version, then the operation's own parameters in a fixed order.
//! Builders are pure: the only failure is an endpoint that does not parse as
//! a URL.

pub mod query;
mod request;

use std::fmt;

use thiserror::Error;

use query::{QueryParam, split_endpoint};

pub use request::GetRequest;

/// WMS protocol version sent with every request.
pub const WMS_VERSION: &str = "1.1.1";

/// Image format requested for legend graphics.
pub const LEGEND_FORMAT: &str = "image/png";

/// Errors raised by the WMS builders.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum WmsError {
    /// Raised when the endpoint is not an absolute URL.
    #[error("invalid WMS endpoint `{url}`: {message}")]
    InvalidEndpoint {
        /// Endpoint as supplied by the caller.
        url: String,
        /// Parser error message.
        message: String,
    },
}

/// Formats a coordinate using the shortest representation that round-trips,
/// always keeping a fractional part (`-10` renders as `-10.0`).
#[must_use]
pub fn format_decimal(value: f64) -> String {
    let mut rendered = value.to_string();
    if value.is_finite() && !rendered.contains('.') {
        rendered.push_str(".0");
    }
    rendered
}

/// Geographic extent expressed as west, south, east and north bounds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    /// West bound longitude.
    pub west: f64,
    /// South bound latitude.
    pub south: f64,
    /// East bound longitude.
    pub east: f64,
    /// North bound latitude.
    pub north: f64,
}

impl BoundingBox {
    /// Creates a bounding box.
    #[must_use]
    pub const fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            format_decimal(self.west),
            format_decimal(self.south),
            format_decimal(self.east),
            format_decimal(self.north)
        )
    }
}

/// Output image dimensions in pixels.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ImageSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl ImageSize {
    /// Creates an image size.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Parameters of a `GetMap` request.
#[derive(Clone, Debug, PartialEq)]
pub struct GetMapParams {
    /// Layer to render.
    pub layer: String,
    /// Image MIME type, for example `image/png`.
    pub format: String,
    /// Spatial reference system of the bounding box.
    pub srs: String,
    /// Extent to render.
    pub bbox: BoundingBox,
    /// Output image size.
    pub size: ImageSize,
    /// Named style to apply.
    pub styles: Option<String>,
    /// Inline style sheet (GeoServer `sld_body`).
    pub style_body: Option<String>,
}

impl GetMapParams {
    /// Creates `GetMap` parameters without styling.
    #[must_use]
    pub fn new(
        layer: impl Into<String>,
        format: impl Into<String>,
        srs: impl Into<String>,
        bbox: BoundingBox,
        size: ImageSize,
    ) -> Self {
        Self {
            layer: layer.into(),
            format: format.into(),
            srs: srs.into(),
            bbox,
            size,
            styles: None,
            style_body: None,
        }
    }

    /// Applies a named style.
    #[must_use]
    pub fn with_styles(mut self, styles: impl Into<String>) -> Self {
        self.styles = Some(styles.into());
        self
    }

    /// Applies an inline style sheet.
    #[must_use]
    pub fn with_style_body(mut self, style_body: impl Into<String>) -> Self {
        self.style_body = Some(style_body.into());
        self
    }
}

/// Parameters of a `GetLegendGraphic` request.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct LegendParams {
    /// Layer whose legend is requested.
    pub layer: String,
    /// Desired width in pixels; zero or `None` leaves it to the server.
    pub width: Option<u32>,
    /// Desired height in pixels; zero or `None` leaves it to the server.
    pub height: Option<u32>,
    /// Named style; blank values are ignored.
    pub styles: Option<String>,
}

impl LegendParams {
    /// Creates legend parameters for `layer` with server defaults.
    #[must_use]
    pub fn new(layer: impl Into<String>) -> Self {
        Self {
            layer: layer.into(),
            ..Self::default()
        }
    }

    /// Requests a specific legend size.
    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Applies a named style.
    #[must_use]
    pub fn with_styles(mut self, styles: impl Into<String>) -> Self {
        self.styles = Some(styles.into());
        self
    }
}

/// Parameters of a `GetFeatureInfo` request describing a click on a map
/// previously fetched with `GetMap`.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureInfoParams {
    /// MIME type of the response (`INFO_FORMAT`).
    pub info_format: String,
    /// Layer to query.
    pub layer: String,
    /// Spatial reference system of the bounding box.
    pub srs: String,
    /// Extent of the map that was clicked.
    pub bbox: BoundingBox,
    /// Size of the map that was clicked.
    pub size: ImageSize,
    /// Clicked longitude.
    pub lng: f64,
    /// Clicked latitude.
    pub lat: f64,
    /// Clicked pixel column.
    pub x: u32,
    /// Clicked pixel row.
    pub y: u32,
    /// Named style; blank values are ignored.
    pub styles: Option<String>,
    /// Inline style sheet; blank values are ignored.
    pub sld: Option<String>,
}

/// Returns `value` trimmed, or `None` when it is absent or blank.
fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|trimmed| !trimmed.is_empty())
}

/// Accumulates the parameter list of one request.
struct RequestParams {
    params: Vec<QueryParam>,
}

impl RequestParams {
    fn for_operation(existing: Vec<QueryParam>, operation: &str) -> Self {
        let mut params = Self { params: existing };
        params.push("service", "WMS");
        params.push("request", operation);
        params.push("version", WMS_VERSION);
        params
    }

    fn push(&mut self, name: &str, value: impl Into<String>) {
        self.params.push(QueryParam::new(name, value));
    }

    fn push_opt(&mut self, name: &str, value: Option<&str>) {
        if let Some(present) = value {
            self.push(name, present);
        }
    }

    fn into_vec(self) -> Vec<QueryParam> {
        self.params
    }
}

fn build(
    endpoint: &str,
    operation: &str,
    append: impl FnOnce(&mut RequestParams),
) -> Result<GetRequest, WmsError> {
    let (base_url, existing) = split_endpoint(endpoint)?;
    let mut params = RequestParams::for_operation(existing, operation);
    append(&mut params);
    Ok(GetRequest::new(base_url, params.into_vec()))
}

/// Builds a `GetCapabilities` request.
///
/// # Errors
///
/// Returns [`WmsError::InvalidEndpoint`] when `endpoint` is not a URL.
pub fn get_capabilities(endpoint: &str) -> Result<GetRequest, WmsError> {
    build(endpoint, "GetCapabilities", |_| {})
}

/// Builds a `GetMap` request for part of a layer rendered as an image.
///
/// # Errors
///
/// Returns [`WmsError::InvalidEndpoint`] when `endpoint` is not a URL.
pub fn get_map(endpoint: &str, map: &GetMapParams) -> Result<GetRequest, WmsError> {
    build(endpoint, "GetMap", |params| {
        params.push("format", map.format.as_str());
        params.push("transparent", "TRUE");
        params.push("layers", map.layer.as_str());
        params.push_opt("styles", map.styles.as_deref());
        params.push_opt("sld_body", map.style_body.as_deref());
        params.push("srs", map.srs.as_str());
        params.push("bbox", map.bbox.to_string());
        params.push("width", map.size.width.to_string());
        params.push("height", map.size.height.to_string());
    })
}

/// Builds a `GetLegendGraphic` request for a PNG legend of one layer.
///
/// # Errors
///
/// Returns [`WmsError::InvalidEndpoint`] when `endpoint` is not a URL.
pub fn get_legend_graphic(endpoint: &str, legend: &LegendParams) -> Result<GetRequest, WmsError> {
    build(endpoint, "GetLegendGraphic", |params| {
        params.push("format", LEGEND_FORMAT);
        params.push("layers", legend.layer.as_str());
        params.push("layer", legend.layer.as_str());
        params.push_opt("styles", non_blank(legend.styles.as_deref()));
        if let Some(width) = legend.width.filter(|width| *width > 0) {
            params.push("width", width.to_string());
        }
        if let Some(height) = legend.height.filter(|height| *height > 0) {
            params.push("height", height.to_string());
        }
    })
}

/// Builds a `GetFeatureInfo` request for a click on a rendered map.
///
/// # Errors
///
/// Returns [`WmsError::InvalidEndpoint`] when `endpoint` is not a URL.
pub fn get_feature_info(
    endpoint: &str,
    info: &FeatureInfoParams,
) -> Result<GetRequest, WmsError> {
    build(endpoint, "GetFeatureInfo", |params| {
        params.push("layers", info.layer.as_str());
        params.push("layer", info.layer.as_str());
        params.push("BBOX", info.bbox.to_string());
        params.push("QUERY_LAYERS", info.layer.as_str());
        params.push("INFO_FORMAT", info.info_format.as_str());
        params.push("lng", format_decimal(info.lng));
        params.push("lat", format_decimal(info.lat));
        params.push("x", info.x.to_string());
        params.push("y", info.y.to_string());
        params.push("width", info.size.width.to_string());
        params.push("height", info.size.height.to_string());
        params.push("SRS", info.srs.as_str());
        // The style sheet is sent untrimmed; only its blankness is checked.
        if non_blank(info.sld.as_deref()).is_some() {
            params.push_opt("SLD", info.sld.as_deref());
        }
        params.push_opt("styles", non_blank(info.styles.as_deref()));
    })
}
