//! Configuration file loading with precedence handling.

use super::settings::LayoutSettings;
use crate::geometry::{EdgeInsets, Size};
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "STABLE_LAYOUT_CONFIG";

/// Environment variable overriding `allow_pinning`.
pub const ALLOW_PINNING_ENV_VAR: &str = "STABLE_LAYOUT_ALLOW_PINNING";

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Config file path contains invalid UTF-8 or cannot be resolved.
    #[error("Invalid config path: {0}")]
    InvalidPath(String),

    /// Failed to read config file (file may not exist or have permission issues).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML syntax.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, the defaults of
/// [`LayoutSettings`] are used. Corresponds to
/// `~/.config/stable-layout/config.toml`:
///
/// ```toml
/// inter_item_spacing = 4.0
/// allow_pinning = true
///
/// [estimated_item_size]
/// width = 320.0
/// height = 44.0
///
/// [additional_insets]
/// top = 8.0
/// bottom = 8.0
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Starting size for items sized `Auto`.
    #[serde(default)]
    pub estimated_item_size: Option<Size>,

    /// Space above the first section.
    #[serde(default)]
    pub space_above_first_item: Option<f64>,

    /// Space between items of a section.
    #[serde(default)]
    pub inter_item_spacing: Option<f64>,

    /// Space below the last section.
    #[serde(default)]
    pub space_below_last_item: Option<f64>,

    /// Space between sections.
    #[serde(default)]
    pub inter_section_spacing: Option<f64>,

    /// Extra insets around the content. Missing edges are zero.
    #[serde(default)]
    pub additional_insets: Option<EdgeInsets>,

    /// Reposition pinned elements while scrolling.
    #[serde(default)]
    pub allow_pinning: Option<bool>,

    /// Keep the viewport at the bottom across batch updates.
    #[serde(default)]
    pub keep_content_offset_at_bottom_on_batch_updates: Option<bool>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    /// Settings handed to the layout.
    pub settings: LayoutSettings,
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            settings: LayoutSettings::default(),
            log_file_path: default_log_path(),
        }
    }
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/stable-layout/stable-layout.log` on Unix-like
/// systems, or the platform equivalent elsewhere. Falls back to the current
/// directory when no state directory exists.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("stable-layout").join("stable-layout.log")
    } else {
        PathBuf::from("stable-layout.log")
    }
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
///
/// # Errors
///
/// Returns error if file exists but has read or parse errors.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Resolve default config file path.
///
/// Returns `~/.config/stable-layout/config.toml` on Unix, appropriate path
/// on other platforms. Returns `None` if no config directory is known.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("stable-layout").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `STABLE_LAYOUT_CONFIG` environment variable
/// 3. Default path `~/.config/stable-layout/config.toml`
///
/// Missing config files are NOT errors - defaults are used.
///
/// # Errors
///
/// Returns error only if a config file exists but cannot be read or parsed,
/// or if the environment variable is set to a non-UTF-8 value.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    match std::env::var(CONFIG_ENV_VAR) {
        Ok(env_path) => return load_config_file(PathBuf::from(env_path)),
        Err(std::env::VarError::NotUnicode(raw)) => {
            return Err(ConfigError::InvalidPath(raw.to_string_lossy().into_owned()));
        }
        Err(std::env::VarError::NotPresent) => {}
    }

    if let Some(default_path) = default_config_path() {
        return load_config_file(default_path);
    }

    Ok(None)
}

/// Parse a boolean environment value (`1`/`0`, `true`/`false`, `yes`/`no`).
fn parse_env_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Apply environment variable overrides to resolved config.
///
/// Checks for:
/// - `STABLE_LAYOUT_ALLOW_PINNING`: Override `allow_pinning`. Values that
///   are not recognisable booleans are ignored.
pub fn apply_env_overrides(mut config: ResolvedConfig) -> ResolvedConfig {
    if let Ok(value) = std::env::var(ALLOW_PINNING_ENV_VAR) {
        match parse_env_bool(&value) {
            Some(allow) => config.settings.allow_pinning = allow,
            None => tracing::warn!(
                variable = ALLOW_PINNING_ENV_VAR,
                value = %value,
                "Ignoring unrecognised boolean"
            ),
        }
    }

    config
}

/// Merge config file into defaults to create resolved config.
///
/// For each field in `ConfigFile`, if `Some(value)`, use it; otherwise use default.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return defaults;
    };

    let base = defaults.settings;
    ResolvedConfig {
        settings: LayoutSettings {
            estimated_item_size: config.estimated_item_size.or(base.estimated_item_size),
            space_above_first_item: config
                .space_above_first_item
                .unwrap_or(base.space_above_first_item),
            inter_item_spacing: config
                .inter_item_spacing
                .unwrap_or(base.inter_item_spacing),
            space_below_last_item: config
                .space_below_last_item
                .unwrap_or(base.space_below_last_item),
            inter_section_spacing: config
                .inter_section_spacing
                .unwrap_or(base.inter_section_spacing),
            additional_insets: config.additional_insets.unwrap_or(base.additional_insets),
            allow_pinning: config.allow_pinning.unwrap_or(base.allow_pinning),
            keep_content_offset_at_bottom_on_batch_updates: config
                .keep_content_offset_at_bottom_on_batch_updates
                .unwrap_or(base.keep_content_offset_at_bottom_on_batch_updates),
        },
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
    }
}

/// Apply CLI argument overrides to resolved config.
///
/// CLI args have the highest precedence and override all other sources.
/// Only applies overrides for flags that were explicitly set by the user.
///
/// Precedence chain: Defaults → Config File → Env Vars → CLI Args (highest)
pub fn apply_cli_overrides(
    mut config: ResolvedConfig,
    pinning_override: Option<bool>,
) -> ResolvedConfig {
    if let Some(allow) = pinning_override {
        config.settings.allow_pinning = allow;
    }

    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
