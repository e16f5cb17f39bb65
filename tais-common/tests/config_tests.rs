//! Config file resolution and TOML loading
//!
//! Tests that manipulate TAIS_TEST_MODULE_CONFIG are marked #[serial] so they
//! do not race on the process environment.

use serde::Deserialize;
use serial_test::serial;
use std::env;
use std::io::Write;
use tais_common::config::{load_toml_or_default, ConfigFileResolver};
use tais_common::Error;

#[derive(Debug, Default, Deserialize, PartialEq)]
struct SampleConfig {
    #[serde(default)]
    port: u16,
    #[serde(default)]
    emit_primary_targets: bool,
}

fn write_config(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("create temp file");
    file.write_all(content.as_bytes()).expect("write temp file");
    file
}

#[test]
#[serial]
fn test_cli_path_wins_over_env() {
    let cli_file = write_config("port = 1");
    let env_file = write_config("port = 2");
    env::set_var("TAIS_TEST_MODULE_CONFIG", env_file.path());

    let resolver = ConfigFileResolver::new("tais-test-module");
    let resolved = resolver.resolve(Some(cli_file.path())).unwrap();
    assert_eq!(resolved.as_deref(), Some(cli_file.path()));

    env::remove_var("TAIS_TEST_MODULE_CONFIG");
}

#[test]
#[serial]
fn test_env_path_used_without_cli() {
    let env_file = write_config("port = 2");
    env::set_var("TAIS_TEST_MODULE_CONFIG", env_file.path());

    let resolver = ConfigFileResolver::new("tais-test-module");
    let resolved = resolver.resolve(None).unwrap();
    assert_eq!(resolved.as_deref(), Some(env_file.path()));

    env::remove_var("TAIS_TEST_MODULE_CONFIG");
}

#[test]
#[serial]
fn test_env_path_missing_is_error() {
    env::set_var("TAIS_TEST_MODULE_CONFIG", "/nonexistent/tais-test-module.toml");

    let resolver = ConfigFileResolver::new("tais-test-module");
    assert!(matches!(resolver.resolve(None), Err(Error::Config(_))));

    env::remove_var("TAIS_TEST_MODULE_CONFIG");
}

#[test]
#[serial]
fn test_no_file_anywhere_resolves_to_none() {
    env::remove_var("TAIS_TEST_MODULE_CONFIG");
    let resolver = ConfigFileResolver::new("tais-test-module");
    assert_eq!(resolver.resolve(None).unwrap(), None);
}

#[test]
fn test_load_toml_from_file() {
    let file = write_config("port = 5000\nemit_primary_targets = true\n");
    let config: SampleConfig = load_toml_or_default(Some(file.path())).unwrap();
    assert_eq!(
        config,
        SampleConfig {
            port: 5000,
            emit_primary_targets: true
        }
    );
}

#[test]
fn test_missing_file_falls_back_to_default() {
    let config: SampleConfig = load_toml_or_default(None).unwrap();
    assert_eq!(config, SampleConfig::default());
}

#[test]
fn test_malformed_file_is_config_error() {
    let file = write_config("port = [");
    let result: Result<SampleConfig, Error> = load_toml_or_default(Some(file.path()));
    assert!(matches!(result, Err(Error::Config(_))));
}
