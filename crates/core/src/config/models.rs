//! Configuration models resolved against a project root.

use sk_protocol::config_models::GlobalConfig;
use std::path::{Path, PathBuf};

/// Application configuration loaded from the `.stepkit/` directory.
///
/// # Example
///
/// ```rust,no_run
/// use sk_core::config::loader::load_config;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new(".")).await?;
/// println!("Checkpoints go to {}", config.checkpoint_dir().display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Project root the configuration was loaded from.
    pub root: PathBuf,

    /// Global settings from `config.toml`.
    pub global: GlobalConfig,
}

impl AppConfig {
    /// Default configuration for a project root with no `.stepkit/` directory.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            global: GlobalConfig::default(),
        }
    }

    /// Checkpoint directory, resolved against the project root when relative.
    pub fn checkpoint_dir(&self) -> PathBuf {
        resolve(&self.root, &self.global.checkpoint_dir)
    }
}

fn resolve(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
