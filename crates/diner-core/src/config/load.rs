//! Configuration loading from files and environment (immutable functional pattern)
//!
//! This module handles loading configuration from:
//! 1. Built-in defaults
//! 2. Global config: ~/.config/diner/config.toml
//! 3. Project config: ./diner.toml
//! 4. An explicit file passed by the caller
//! 5. Environment variables: DINER_*
//! 6. Caller overrides (CLI flags)

use std::{
    path::{Path, PathBuf},
    str::FromStr,
};

use super::types::{PartialConfig, SimulationConfig};
use crate::{Error, Result};

// ═══════════════════════════════════════════════════════════════════════════
// PUBLIC API
// ═══════════════════════════════════════════════════════════════════════════

/// Load configuration from all sources with hierarchy
///
/// # Errors
///
/// Returns error if:
/// - A config file is malformed TOML or has unknown keys
/// - An explicit config file does not exist
/// - A `DINER_*` variable does not parse
/// - The merged values fail validation
pub fn load_config(explicit: Option<&Path>, overrides: PartialConfig) -> Result<SimulationConfig> {
    let global = match global_config_path() {
        Some(path) if path.is_file() => load_toml_file(&path)?,
        _ => PartialConfig::default(),
    };

    let project_path = project_config_path()?;
    let project = if project_path.is_file() {
        load_toml_file(&project_path)?
    } else {
        PartialConfig::default()
    };

    let explicit = explicit.map(load_toml_file).transpose()?.unwrap_or_default();
    let env = env_layer(|key| std::env::var(key).ok())?;

    let layered = [global, project, explicit, env, overrides]
        .into_iter()
        .fold(PartialConfig::default(), PartialConfig::overlay);

    let config = SimulationConfig::default().merge(layered);
    config.validate()?;
    Ok(config)
}

// ═══════════════════════════════════════════════════════════════════════════
// PATH HELPERS
// ═══════════════════════════════════════════════════════════════════════════

/// Get path to global config file
pub fn global_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "diner")
        .map(|proj_dirs| proj_dirs.config_dir().join("config.toml"))
}

/// Get path to project config file
///
/// # Errors
///
/// Returns error if current directory cannot be determined
pub fn project_config_path() -> Result<PathBuf> {
    std::env::current_dir()
        .map(|dir| dir.join("diner.toml"))
        .map_err(|e| Error::io_error(format!("Failed to get current directory: {e}")))
}

/// Load a TOML file into a partial config layer
///
/// # Errors
///
/// Returns error if:
/// - File cannot be read
/// - Path is a directory instead of a file
/// - TOML is malformed or contains unknown keys
pub fn load_toml_file(path: &Path) -> Result<PartialConfig> {
    if path.is_dir() {
        return Err(Error::io_error(format!(
            "Config path is a directory, not a file: {}",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::io_error(format!(
            "Failed to read config file {}: {e}",
            path.display()
        ))
    })?;

    toml::from_str(&content).map_err(|e| {
        Error::parse_error(format!(
            "Failed to parse config file {}: {e}",
            path.display()
        ))
    })
}

// ═══════════════════════════════════════════════════════════════════════════
// ENVIRONMENT
// ═══════════════════════════════════════════════════════════════════════════

/// Build a layer from `DINER_*` variables looked up through `lookup`
///
/// # Errors
///
/// Returns error if a set variable does not parse as a number
pub(crate) fn env_layer(lookup: impl Fn(&str) -> Option<String>) -> Result<PartialConfig> {
    Ok(PartialConfig {
        table_count: parse_var(&lookup, "DINER_TABLE_COUNT")?,
        seats_per_table: parse_var(&lookup, "DINER_SEATS_PER_TABLE")?,
        think_max: parse_var(&lookup, "DINER_THINK_MAX")?,
        eat_max: parse_var(&lookup, "DINER_EAT_MAX")?,
        settle_delay: parse_var(&lookup, "DINER_SETTLE_DELAY")?,
        poll_interval: parse_var(&lookup, "DINER_POLL_INTERVAL")?,
        time_unit_ms: parse_var(&lookup, "DINER_TIME_UNIT_MS")?,
        seed: parse_var(&lookup, "DINER_SEED")?,
        max_runtime: parse_var(&lookup, "DINER_MAX_RUNTIME")?,
        shutdown_grace_ms: parse_var(&lookup, "DINER_SHUTDOWN_GRACE_MS")?,
    })
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|e| Error::invalid_config(format!("Invalid {key} value '{raw}': {e}")))
        })
        .transpose()
}
