use std::fs;
use std::path::PathBuf;

use fes_core::errors::FesError;
use fes_fit::config::{load_config, load_config_or_default, PipelineConfig, CONFIG_FILE};
use fes_fit::grid::GridSpec;
use fes_fit::mlp::Activation;

#[test]
fn defaults_reproduce_reference_protocol() {
    let config = PipelineConfig::default();
    assert_eq!(config.inputs.len(), 5);
    assert_eq!(config.inputs[0], PathBuf::from("smd1/colvar"));
    assert_eq!(config.inputs[4], PathBuf::from("smd5/colvar"));
    assert_eq!(config.kt, 2.4943389);
    assert_eq!(config.kernel.alpha, 0.1);
    assert_eq!(config.split.seed, 9531);
    assert_eq!(config.network.seed, 57451);
    assert_eq!(config.network.hidden_layers, vec![12]);
    assert_eq!(config.network.activation, Activation::Tanh);
    assert_eq!(config.network.max_iter, 10_000);
    assert_eq!(config.output.fes, PathBuf::from("fes.txt"));
    config.validate().expect("defaults are valid");
}

#[test]
fn yaml_round_trip_preserves_config() {
    let config = PipelineConfig::default();
    let yaml = config.to_yaml_string().expect("yaml");
    let decoded: PipelineConfig =
        fes_fit::serde::from_yaml_slice(yaml.as_bytes()).expect("decode");
    assert_eq!(decoded, config);
    assert_eq!(decoded.config_hash().expect("hash"), config.config_hash().expect("hash"));
}

#[test]
fn partial_yaml_falls_back_to_defaults() {
    let temp = tempfile::tempdir().expect("tmp dir");
    let path = temp.path().join(CONFIG_FILE);
    fs::write(
        &path,
        "kt: 2.5\nnetwork:\n  max_iter: 50\n  activation: relu\noutput:\n  report: null\n",
    )
    .expect("write");
    let config = load_config(&path).expect("load");
    assert_eq!(config.kt, 2.5);
    assert_eq!(config.network.max_iter, 50);
    assert_eq!(config.network.activation, Activation::Relu);
    assert_eq!(config.network.hidden_layers, vec![12]);
    assert_eq!(config.output.report, None);
    assert_eq!(config.output.fes, PathBuf::from("fes.txt"));
    assert_ne!(
        config.config_hash().expect("hash"),
        PipelineConfig::default().config_hash().expect("hash")
    );
}

#[test]
fn missing_config_file_uses_defaults() {
    let temp = tempfile::tempdir().expect("tmp dir");
    let config = load_config_or_default(temp.path()).expect("defaults");
    assert_eq!(config, PipelineConfig::default());
}

#[test]
fn invalid_values_are_config_errors() {
    let temp = tempfile::tempdir().expect("tmp dir");
    let path = temp.path().join(CONFIG_FILE);
    fs::write(&path, "kt: -1.0\n").expect("write");
    assert!(matches!(load_config(&path), Err(FesError::Config(_))));

    fs::write(&path, "split:\n  test_fraction: 1.5\n").expect("write");
    assert!(matches!(load_config(&path), Err(FesError::Config(_))));

    fs::write(&path, "output_grid:\n  start: 1.0\n  stop: 0.0\n  step: 0.1\n").expect("write");
    assert!(matches!(load_config(&path), Err(FesError::Config(_))));
}

#[test]
fn oversized_grid_fails_validation() {
    let mut config = PipelineConfig::default();
    config.output_grid = GridSpec {
        start: -1.5,
        stop: 1.51,
        step: 1e-300,
    };
    let err = config.validate().expect_err("grid too large");
    assert!(matches!(err, FesError::Config(_)));
    assert_eq!(err.info().code, "grid_size");
    assert_eq!(err.info().context.get("grid").map(String::as_str), Some("output_grid"));
}

#[test]
fn malformed_yaml_is_serde_error() {
    let temp = tempfile::tempdir().expect("tmp dir");
    let path = temp.path().join(CONFIG_FILE);
    fs::write(&path, "kt: [not, a, number]\n").expect("write");
    assert!(matches!(load_config(&path), Err(FesError::Serde(_))));
}
