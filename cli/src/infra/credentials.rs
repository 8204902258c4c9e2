//! Infrastructure implementation of the `CredentialSource` port.

use std::path::{Path, PathBuf};

use crate::application::ports::CredentialSource;
use crate::domain::{DeployError, KeySource, PrivateKey};

/// Environment variable holding the key text when no key file is configured.
pub const SSH_PRIVATE_KEY_ENV: &str = "SSH_PRIVATE_KEY";

/// Resolves the private key from `ssh.private_key_path`, falling back to
/// `$SSH_PRIVATE_KEY`.
pub struct KeyResolver {
    configured_path: Option<PathBuf>,
    env_key: Option<String>,
}

impl KeyResolver {
    #[must_use]
    pub fn new(configured_path: Option<PathBuf>, env_key: Option<String>) -> Self {
        Self {
            configured_path,
            env_key,
        }
    }

    /// Resolver reading the fallback key from the process environment.
    #[must_use]
    pub fn from_env(configured_path: Option<PathBuf>) -> Self {
        Self::new(configured_path, std::env::var(SSH_PRIVATE_KEY_ENV).ok())
    }
}

impl CredentialSource for KeyResolver {
    fn private_key(&self) -> Result<PrivateKey, DeployError> {
        if let Some(path) = self.configured_path.as_deref().map(expand_tilde) {
            if path.is_file() {
                let text = std::fs::read_to_string(&path).map_err(|e| {
                    DeployError::Credential(format!("cannot read {}: {e}", path.display()))
                })?;
                return Ok(PrivateKey::new(
                    &text,
                    KeySource::File(path.display().to_string()),
                ));
            }
            tracing::debug!(path = %path.display(), "configured key file not found");
        }

        match self.env_key.as_deref() {
            Some(text) if !text.trim().is_empty() => {
                Ok(PrivateKey::new(text, KeySource::Env(SSH_PRIVATE_KEY_ENV)))
            }
            _ => Err(DeployError::Credential(format!(
                "set ssh.private_key_path in config.json or ${SSH_PRIVATE_KEY_ENV}"
            ))),
        }
    }
}

/// Expand a leading `~` to the home directory.
#[must_use]
pub fn expand_tilde(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir().map_or_else(|| path.to_path_buf(), |home| home.join(rest)),
        Err(_) => path.to_path_buf(),
    }
}
