//! Locating and loading `config.json`.

use std::path::{Path, PathBuf};

use crate::domain::{ConfigError, DeployConfig};

pub const CONFIG_FILE: &str = "config.json";

/// `config.json` on disk.
pub struct JsonConfigFile {
    path: PathBuf,
}

impl JsonConfigFile {
    /// `$HOSTER_CONFIG` when set (passed in as `override_path`), otherwise
    /// `<root>/config.json`.
    #[must_use]
    pub fn locate(root: &Path, override_path: Option<PathBuf>) -> Self {
        Self {
            path: override_path.unwrap_or_else(|| root.join(CONFIG_FILE)),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read, parse and validate the file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Unreadable`] for I/O and JSON errors, and the
    /// validation error otherwise.
    pub fn load(&self) -> Result<DeployConfig, ConfigError> {
        let origin = self.path.display().to_string();
        let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::Unreadable {
            path: origin.clone(),
            reason: e.to_string(),
        })?;
        let config = DeployConfig::parse(&origin, &content)?;
        tracing::debug!(
            path = %origin,
            projects = config.projects.len(),
            regions = config.regions.len(),
            "loaded config"
        );
        Ok(config)
    }
}
