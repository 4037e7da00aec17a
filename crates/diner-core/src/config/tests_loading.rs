use std::io::Write;

use super::{load::env_layer, load_toml_file, PartialConfig, SimulationConfig};

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = match tempfile::NamedTempFile::new() {
        Ok(file) => file,
        Err(e) => unreachable!("temp file: {e}"),
    };
    let written = file.write_all(contents.as_bytes());
    assert!(written.is_ok());
    file
}

#[test]
fn test_partial_file_keeps_lower_layer_values() {
    let file = write_config("settle_delay = 1\nseed = 9\n");
    let layer = load_toml_file(file.path());
    assert!(layer.is_ok());
    let config = SimulationConfig::default().merge(layer.unwrap_or_default());

    assert_eq!(config.settle_delay, 1);
    assert_eq!(config.seed, Some(9));
    assert_eq!(config.table_count, 5);
    assert_eq!(config.poll_interval, 2);
}

#[test]
fn test_unknown_key_is_parse_error() {
    let file = write_config("tables = 3\n");
    let result = load_toml_file(file.path());
    assert!(matches!(result, Err(crate::Error::Parse(_))));
}

#[test]
fn test_malformed_toml_is_parse_error() {
    let file = write_config("table_count = [\n");
    assert!(matches!(load_toml_file(file.path()), Err(crate::Error::Parse(_))));
}

#[test]
fn test_directory_path_rejected() {
    let dir = tempfile::tempdir();
    assert!(dir.is_ok());
    if let Ok(dir) = dir {
        assert!(matches!(load_toml_file(dir.path()), Err(crate::Error::Io(_))));
    }
}

#[test]
fn test_env_layer_reads_diner_vars() {
    let layer = env_layer(|key| match key {
        "DINER_TABLE_COUNT" => Some("3".to_string()),
        "DINER_TIME_UNIT_MS" => Some(" 25 ".to_string()),
        _ => None,
    });
    assert_eq!(
        layer.ok(),
        Some(PartialConfig {
            table_count: Some(3),
            time_unit_ms: Some(25),
            ..PartialConfig::default()
        })
    );
}

#[test]
fn test_env_layer_rejects_garbage() {
    let layer = env_layer(|key| (key == "DINER_SEED").then(|| "forty-two".to_string()));
    assert!(matches!(layer, Err(crate::Error::InvalidConfig(_))));
}

#[test]
fn test_overlay_prefers_upper_layer() {
    let lower = PartialConfig {
        think_max: Some(1),
        eat_max: Some(1),
        ..PartialConfig::default()
    };
    let upper = PartialConfig {
        eat_max: Some(3),
        ..PartialConfig::default()
    };
    let merged = lower.overlay(upper);
    assert_eq!(merged.think_max, Some(1));
    assert_eq!(merged.eat_max, Some(3));
}

#[test]
#[serial_test::serial]
fn test_load_config_applies_explicit_file_then_overrides() {
    let file = write_config("table_count = 2\nseats_per_table = 3\n");
    let overrides = PartialConfig {
        seats_per_table: Some(4),
        ..PartialConfig::default()
    };
    let config = super::load_config(Some(file.path()), overrides);
    assert!(config.is_ok());
    if let Ok(config) = config {
        assert_eq!(config.table_count, 2);
        assert_eq!(config.seats_per_table, 4);
    }
}

#[test]
#[serial_test::serial]
fn test_load_config_validates_result() {
    let overrides = PartialConfig {
        poll_interval: Some(0),
        ..PartialConfig::default()
    };
    assert!(super::load_config(None, overrides).is_err());
}
