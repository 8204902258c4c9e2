//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` — never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::Path;
use std::process::{ExitStatus, Output};
use std::time::Duration;

use anyhow::Result;

use crate::domain::{DeployError, PrivateKey};

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    ///
    /// Implementations should delegate to `run_with_timeout` using the
    /// instance's configured default timeout.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
    /// Run a program with a custom timeout override.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds `timeout`.
    /// On timeout, the child process must be killed (not left orphaned).
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output>;
    /// Run a program with `dir` as its working directory.
    async fn run_in_dir(&self, dir: &Path, program: &str, args: &[&str]) -> Result<Output>;
    /// Run a program with inherited stdio and return only its exit status.
    async fn run_status(&self, program: &str, args: &[&str]) -> Result<ExitStatus>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait — no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}

// ── Remote Session Ports ──────────────────────────────────────────────────────

/// An open session to one region server.
///
/// The session stays usable until `close` is called; callers close it
/// exactly once.
#[allow(async_fn_in_trait)]
pub trait RemoteShell {
    /// Address the session is connected to.
    fn target(&self) -> &str;
    /// Run `command_line` through the remote login shell and capture output.
    ///
    /// # Errors
    ///
    /// Returns an error only when the transport fails; a remote command that
    /// writes to stderr still yields `Ok`.
    async fn exec(&self, command_line: &str) -> Result<Output>;
    /// Tear the session down.
    async fn close(&self) -> Result<()>;
}

/// Opens [`RemoteShell`] sessions.
#[allow(async_fn_in_trait)]
pub trait SessionConnector {
    type Session: RemoteShell;
    /// Authenticate against `target` with `key` and open a session.
    async fn connect(&self, target: &str, key: &PrivateKey) -> Result<Self::Session>;
}

// ── Collaborator Ports ────────────────────────────────────────────────────────

/// Yields the connection address of a region's server.
#[allow(async_fn_in_trait)]
pub trait TargetResolver {
    async fn resolve(&self, region: &str) -> Result<String>;
}

/// Yields the current HEAD commit id of a repository.
#[allow(async_fn_in_trait)]
pub trait CommitResolver {
    async fn head_commit(&self, repo_url: &str) -> Result<String>;
}

/// Resolves the run's SSH private key.
pub trait CredentialSource {
    /// # Errors
    ///
    /// Returns [`DeployError::Credential`] when no usable key exists.
    fn private_key(&self) -> Result<PrivateKey, DeployError>;
}
