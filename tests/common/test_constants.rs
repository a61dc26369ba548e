//! Shared constants for integration tests.
//!
//! Integration tests are compiled as separate crates (one per top-level file in
//! `tests/`). Placing shared constants under `tests/common/` avoids creating an
//! additional integration test binary while still allowing reuse via:
//!
//! ```rust
//! #[path = "common/test_constants.rs"]
//! mod test_constants;
//! ```

/// Plain WMS endpoint without query parameters.
pub const WMS_ENDPOINT: &str = "http://x/wms";

/// Endpoint routed through a proxy that needs its own query parameters.
pub const PROXIED_ENDPOINT: &str = "http://proxy.example.org/ows?p1=v1&p2=v2";

/// Machine image used by launcher tests.
pub const IMAGE_ID: &str = "ami-0123456789abcdef0";

/// Environment variables read by the compute configuration loader.
pub const COMPUTE_ENV_VARS: [&str; 4] = [
    "PORTAL_COMPUTE_ENDPOINT",
    "PORTAL_COMPUTE_ACCESS_KEY",
    "PORTAL_COMPUTE_SECRET_KEY",
    "PORTAL_COMPUTE_REGION",
];
