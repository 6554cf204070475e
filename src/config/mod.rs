//! Configuration module.
//!
//! [`LayoutSettings`] is what the layout consumes; [`loader`] resolves it
//! from defaults, the TOML config file, environment and CLI.

pub mod loader;
pub mod settings;

pub use loader::{
    apply_cli_overrides, apply_env_overrides, default_config_path, default_log_path,
    load_config_file, load_config_with_precedence, merge_config, ConfigError, ConfigFile,
    ResolvedConfig,
};
pub use settings::LayoutSettings;
