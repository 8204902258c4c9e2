//! SSH private key material.

use std::fmt;

/// Where the run's private key came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySource {
    /// `ssh.private_key_path` from the config.
    File(String),
    /// An environment variable, by name.
    Env(&'static str),
}

impl fmt::Display for KeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "file {path}"),
            Self::Env(var) => write!(f, "${var}"),
        }
    }
}

/// PEM/OpenSSH private key text. `Debug` never prints the material.
#[derive(Clone)]
pub struct PrivateKey {
    material: String,
    source: KeySource,
}

impl PrivateKey {
    /// Wrap key text, normalising the trailing newline OpenSSH requires.
    #[must_use]
    pub fn new(material: &str, source: KeySource) -> Self {
        let mut material = material.trim_end().to_string();
        material.push('\n');
        Self { material, source }
    }

    #[must_use]
    pub fn material(&self) -> &str {
        &self.material
    }

    #[must_use]
    pub fn source(&self) -> &KeySource {
        &self.source
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}
