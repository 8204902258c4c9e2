//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

// ── Config errors ─────────────────────────────────────────────────────────────

/// Problems found while validating `config.json`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Duplicate subdomains found in config: {}", .0.join(", "))]
    DuplicateSubdomains(Vec<String>),

    #[error("Missing expected keys in config: {}", .0.join(", "))]
    MissingKeys(Vec<String>),

    #[error("Invalid subdomain '{0}': must be a lowercase DNS label (a-z, 0-9, '-')")]
    InvalidSubdomain(String),

    #[error("Project '{0}' has no repository URL")]
    MissingRepo(String),

    #[error("Duplicate region '{0}' in config")]
    DuplicateRegion(String),

    #[error("Cannot load config {path}: {reason}")]
    Unreadable { path: String, reason: String },
}

// ── Deploy errors ─────────────────────────────────────────────────────────────

/// Every failure the deploy core can surface.
///
/// The variant decides the blast radius: see [`DeployError::is_run_fatal`].
#[derive(Debug, Error)]
pub enum DeployError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("SSH private key not found: {0}")]
    Credential(String),

    #[error("Cannot resolve HEAD of {repo_url}: {message}")]
    DesiredState { repo_url: String, message: String },

    #[error("Cannot resolve address of region {region}: {message}")]
    Provisioning { region: String, message: String },

    #[error("Cannot connect to {target}: {message}")]
    Connection { target: String, message: String },

    #[error("Error running {command}: {message}")]
    RemoteCommand { command: String, message: String },

    #[error("Cannot decode {command} response as JSON: {raw_payload:?}")]
    Decode { command: String, raw_payload: String },

    #[error("{command} timed out after {seconds}s")]
    Timeout { command: String, seconds: u64 },

    #[error("Run cancelled")]
    Cancelled,
}

/// Discriminant of [`DeployError`], for policy decisions and JSON codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Credential,
    DesiredState,
    Provisioning,
    Connection,
    RemoteCommand,
    Decode,
    Timeout,
    Cancelled,
}

impl ErrorKind {
    /// Stable machine-readable code used in JSON output.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Config => "config_error",
            Self::Credential => "credential_error",
            Self::DesiredState => "desired_state_error",
            Self::Provisioning => "provisioning_error",
            Self::Connection => "connection_error",
            Self::RemoteCommand => "remote_command_error",
            Self::Decode => "decode_error",
            Self::Timeout => "timeout",
            Self::Cancelled => "cancelled",
        }
    }
}

impl DeployError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::Config,
            Self::Credential(_) => ErrorKind::Credential,
            Self::DesiredState { .. } => ErrorKind::DesiredState,
            Self::Provisioning { .. } => ErrorKind::Provisioning,
            Self::Connection { .. } => ErrorKind::Connection,
            Self::RemoteCommand { .. } => ErrorKind::RemoteCommand,
            Self::Decode { .. } => ErrorKind::Decode,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// Returns `true` for failures that must stop the whole run rather than
    /// a single region.
    #[must_use]
    pub fn is_run_fatal(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Config | ErrorKind::Credential | ErrorKind::DesiredState | ErrorKind::Cancelled
        )
    }
}
