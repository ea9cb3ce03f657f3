//! Configuration file loader for the `.stepkit/` directory.
//!
//! Only `.stepkit/config.toml` is read today. Missing directories and files
//! fall back to defaults; files that exist must parse.

use crate::config::error::ConfigError;
use crate::config::error::ConfigResult;
use crate::config::models::AppConfig;
use sk_protocol::config_models::GlobalConfig;
use std::path::Path;

/// Loads all configuration from the `.stepkit/` directory.
///
/// # Arguments
///
/// * `root` - Root directory containing the `.stepkit/` folder
///
/// # Errors
///
/// Returns `ConfigError` if:
/// - `config.toml` exists but cannot be read
/// - `config.toml` has invalid TOML syntax or unknown values
/// - A setting is out of range (for example `event-buffer = 0`)
pub async fn load_config(root: &Path) -> ConfigResult<AppConfig> {
    let sk_dir = root.join(".stepkit");

    // If .stepkit doesn't exist, return default config
    if !sk_dir.exists() {
        return Ok(AppConfig::with_root(root));
    }

    let global = load_global_config(&sk_dir)?;

    Ok(AppConfig {
        root: root.to_path_buf(),
        global,
    })
}

/// Loads global configuration from `config.toml`.
fn load_global_config(sk_dir: &Path) -> ConfigResult<GlobalConfig> {
    let config_path = sk_dir.join("config.toml");

    // If config.toml doesn't exist, return default
    if !config_path.exists() {
        return Ok(GlobalConfig::default());
    }

    let content =
        std::fs::read_to_string(&config_path).map_err(|source| ConfigError::FileRead {
            path: config_path.clone(),
            source,
        })?;

    let config: GlobalConfig =
        toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
            path: config_path.clone(),
            source,
        })?;

    if config.event_buffer == 0 {
        return Err(ConfigError::InvalidConfig {
            path: config_path,
            reason: "event-buffer must be at least 1".to_string(),
        });
    }

    Ok(config)
}
