//! Unit tests for compute configuration loading and validation.

use geoportal::config::{ComputeConfig, ConfigError, DEFAULT_REGION};
use geoportal::test_support::EnvGuard;
use geoportal::{CloudComputeService, ComputeError};
use rstest::*;

#[fixture]
fn valid_config() -> ComputeConfig {
    ComputeConfig {
        endpoint: Some(String::from("https://ec2.example.org:8773/services/Cloud")),
        access_key: String::from("AKIDEXAMPLE"),
        secret_key: String::from("wJalrXUtnFEMI/K7MDENG/bPxRfiCYEXAMPLEKEY"),
        region: String::from(DEFAULT_REGION),
    }
}

#[rstest]
fn valid_config_passes_validation(valid_config: ComputeConfig) {
    assert_eq!(valid_config.validate(), Ok(()));
}

#[rstest]
fn endpoint_is_optional(valid_config: ComputeConfig) {
    let cfg = ComputeConfig {
        endpoint: None,
        ..valid_config
    };
    assert_eq!(cfg.validate(), Ok(()));
}

/// Verifies that validation produces actionable errors mentioning both the
/// environment variable and configuration file for each required field.
#[rstest]
#[case::access_key(|cfg: &mut ComputeConfig| cfg.access_key.clear(), "PORTAL_COMPUTE_ACCESS_KEY", "access_key")]
#[case::secret_key(|cfg: &mut ComputeConfig| cfg.secret_key = String::from("  "), "PORTAL_COMPUTE_SECRET_KEY", "secret_key")]
#[case::region(|cfg: &mut ComputeConfig| cfg.region.clear(), "PORTAL_COMPUTE_REGION", "region")]
fn validation_errors_are_actionable(
    valid_config: ComputeConfig,
    #[case] mutate: fn(&mut ComputeConfig),
    #[case] env_var: &str,
    #[case] toml_key: &str,
) {
    let mut cfg = valid_config;
    mutate(&mut cfg);

    let error = cfg.validate().expect_err("validation should fail");
    let ConfigError::MissingField(ref message) = error else {
        panic!("expected MissingField error, got {error}");
    };
    assert!(
        message.contains(env_var),
        "error should mention env var {env_var}: {message}"
    );
    assert!(
        message.contains("geoportal.toml"),
        "error should mention config file: {message}"
    );
    assert!(
        message.contains(toml_key),
        "error should mention TOML key {toml_key}: {message}"
    );
}

#[rstest]
fn malformed_endpoint_is_rejected(valid_config: ComputeConfig) {
    let cfg = ComputeConfig {
        endpoint: Some(String::from("ec2 endpoint")),
        ..valid_config
    };

    let error = cfg.validate().expect_err("endpoint should be rejected");
    assert!(
        matches!(error, ConfigError::InvalidEndpoint { ref endpoint, .. } if endpoint == "ec2 endpoint"),
        "unexpected error: {error}"
    );
}

#[rstest]
fn debug_output_redacts_secret(valid_config: ComputeConfig) {
    let rendered = format!("{valid_config:?}");
    assert!(!rendered.contains("wJalrXUtnFEMI"), "secret leaked: {rendered}");
    assert!(rendered.contains("AKIDEXAMPLE"), "rendered: {rendered}");
}

#[rstest]
fn invalid_config_is_rejected_before_building_a_client(valid_config: ComputeConfig) {
    let cfg = ComputeConfig {
        access_key: String::new(),
        ..valid_config
    };

    let err = CloudComputeService::from_config(&cfg).expect_err("client should not be built");
    assert!(
        matches!(err, ComputeError::Config(ref message) if message.contains("PORTAL_COMPUTE_ACCESS_KEY")),
        "unexpected error: {err}"
    );
}

#[rstest]
#[tokio::test]
async fn environment_values_are_loaded() {
    let home = tempfile::tempdir().unwrap_or_else(|err| panic!("tempdir: {err}"));
    let home_str = home
        .path()
        .to_str()
        .unwrap_or_else(|| panic!("temp path should be utf8"));
    let _guard = EnvGuard::set_vars(&[
        ("HOME", home_str),
        ("XDG_CONFIG_HOME", home_str),
        ("PORTAL_COMPUTE_ACCESS_KEY", "AKIDFROMENV"),
        ("PORTAL_COMPUTE_SECRET_KEY", "secret-from-env"),
        ("PORTAL_COMPUTE_REGION", "ap-southeast-2"),
    ])
    .await;

    let cfg = ComputeConfig::load_without_cli_args()
        .unwrap_or_else(|err| panic!("config should load: {err}"));
    assert_eq!(cfg.access_key, "AKIDFROMENV");
    assert_eq!(cfg.secret_key, "secret-from-env");
    assert_eq!(cfg.region, "ap-southeast-2");
}

/// Follows the advice in the missing-field message: a `geoportal.toml` with
/// the keys at the top level must load.
#[rstest]
#[tokio::test]
async fn advised_config_file_layout_loads() {
    let secret_message = ComputeConfig {
        secret_key: String::new(),
        endpoint: None,
        access_key: String::from("AKIDEXAMPLE"),
        region: String::from(DEFAULT_REGION),
    }
    .validate()
    .expect_err("blank secret should fail")
    .to_string();
    assert!(
        secret_message.contains("add secret_key to geoportal.toml"),
        "unexpected advice: {secret_message}"
    );

    let dir = tempfile::tempdir().unwrap_or_else(|err| panic!("tempdir: {err}"));
    let config_path = dir.path().join("geoportal.toml");
    std::fs::write(
        &config_path,
        concat!(
            "endpoint = \"https://ec2.example.org:8773/services/Cloud\"\n",
            "access_key = \"AKIDFROMFILE\"\n",
            "secret_key = \"secret-from-file\"\n",
            "region = \"eu-west-1\"\n",
        ),
    )
    .unwrap_or_else(|err| panic!("write config: {err}"));
    let dir_str = dir
        .path()
        .to_str()
        .unwrap_or_else(|| panic!("temp path should be utf8"));
    let path_str = config_path
        .to_str()
        .unwrap_or_else(|| panic!("config path should be utf8"));
    let _guard = EnvGuard::set_vars(&[
        ("HOME", dir_str),
        ("XDG_CONFIG_HOME", dir_str),
        ("GEOPORTAL_CONFIG_PATH", path_str),
    ])
    .await;

    let cfg = ComputeConfig::load_without_cli_args()
        .unwrap_or_else(|err| panic!("advised file should load: {err}"));
    assert_eq!(cfg.access_key, "AKIDFROMFILE");
    assert_eq!(cfg.secret_key, "secret-from-file");
    assert_eq!(cfg.region, "eu-west-1");
    assert_eq!(
        cfg.endpoint.as_deref(),
        Some("https://ec2.example.org:8773/services/Cloud")
    );
    assert_eq!(cfg.validate(), Ok(()));
}
