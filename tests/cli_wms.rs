//! Behavioural tests for the `geoportal wms` subcommands.

#[path = "common/test_constants.rs"]
mod test_constants;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use rstest::rstest;

use test_constants::{PROXIED_ENDPOINT, WMS_ENDPOINT};

const EXTENT_ARGS: [&str; 12] = [
    "--west", "-10", "--south", "-5", "--east", "10", "--north", "5", "--width", "256",
    "--height", "256",
];

#[test]
fn cli_without_arguments_prints_usage() {
    let mut cmd = cargo_bin_cmd!("geoportal");
    cmd.assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn capabilities_prints_request_url() {
    let mut cmd = cargo_bin_cmd!("geoportal");
    cmd.args(["wms", "capabilities", "--url", WMS_ENDPOINT]);
    cmd.assert()
        .success()
        .stdout("http://x/wms?service=WMS&request=GetCapabilities&version=1.1.1\n")
        .stderr("");
}

#[test]
fn map_prints_request_url() {
    let mut cmd = cargo_bin_cmd!("geoportal");
    cmd.args(["wms", "map", "--url", WMS_ENDPOINT, "--layer", "layerA"])
        .args(EXTENT_ARGS);
    cmd.assert().success().stdout(
        "http://x/wms?service=WMS&request=GetMap&version=1.1.1&format=image/png\
         &transparent=TRUE&layers=layerA&srs=EPSG:4326&bbox=-10.0,-5.0,10.0,5.0\
         &width=256&height=256\n",
    );
}

#[rstest]
#[case(&["capabilities"])]
#[case(&["legend", "--layer", "ga:geology"])]
fn proxied_endpoint_params_come_first(#[case] command: &[&str]) {
    let mut cmd = cargo_bin_cmd!("geoportal");
    cmd.arg("wms")
        .args(command)
        .args(["--url", PROXIED_ENDPOINT]);
    cmd.assert().success().stdout(predicate::str::starts_with(
        "http://proxy.example.org/ows?p1=v1&p2=v2&service=WMS&request=",
    ));
}

#[test]
fn legend_omits_zero_dimensions() {
    let mut cmd = cargo_bin_cmd!("geoportal");
    cmd.args([
        "wms", "legend", "--url", WMS_ENDPOINT, "--layer", "ga:geology", "--width", "0",
        "--height", "40", "--styles", " outline ",
    ]);
    cmd.assert().success().stdout(
        "http://x/wms?service=WMS&request=GetLegendGraphic&version=1.1.1&format=image/png\
         &layers=ga:geology&layer=ga:geology&styles=outline&height=40\n",
    );
}

#[test]
fn feature_info_json_lists_params_in_order() {
    let mut cmd = cargo_bin_cmd!("geoportal");
    cmd.args([
        "wms",
        "feature-info",
        "--url",
        WMS_ENDPOINT,
        "--json",
        "--layer",
        "gsml:MappedFeature",
        "--lng",
        "-1.5",
        "--lat",
        "2",
        "--x",
        "10",
        "--y",
        "20",
        "--styles",
        "  ",
    ])
    .args(EXTENT_ARGS);
    let output = cmd.assert().success().get_output().stdout.clone();

    let value: serde_json::Value = serde_json::from_slice(&output)
        .unwrap_or_else(|err| panic!("stdout should be JSON: {err}"));
    let names: Vec<&str> = value["params"]
        .as_array()
        .unwrap_or_else(|| panic!("params should be an array: {value}"))
        .iter()
        .filter_map(|param| param["name"].as_str())
        .collect();
    assert_eq!(
        names,
        vec![
            "service",
            "request",
            "version",
            "layers",
            "layer",
            "BBOX",
            "QUERY_LAYERS",
            "INFO_FORMAT",
            "lng",
            "lat",
            "x",
            "y",
            "width",
            "height",
            "SRS",
        ]
    );
    assert_eq!(value["method"], "GET");
}

#[test]
fn invalid_endpoint_reports_error() {
    let mut cmd = cargo_bin_cmd!("geoportal");
    cmd.args(["wms", "capabilities", "--url", "not a url"]);
    cmd.assert()
        .code(1)
        .stdout("")
        .stderr(predicate::str::contains("invalid WMS endpoint `not a url`"));
}
