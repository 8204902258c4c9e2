//! Infrastructure implementation of the `SessionConnector` port on top of the
//! system OpenSSH client.
//!
//! A session is an OpenSSH ControlMaster kept alive with `ControlPersist`.
//! Every remote command is a short `ssh` invocation multiplexed over the
//! master's control socket. The key copy, the control socket and a private
//! `known_hosts` file live in a per-session temp directory that is removed
//! together with the session.

use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::{Context, Result};
use tempfile::TempDir;
use tracing::{debug, warn};

use crate::application::ports::{CommandRunner, RemoteShell, SessionConnector};
use crate::domain::PrivateKey;

/// Default bound for establishing the master connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Outer bound for one multiplexed command. Callers apply their own, tighter,
/// timeout and drop the call; the child is killed on drop.
pub const DEFAULT_EXEC_CEILING: Duration = Duration::from_secs(4 * 60 * 60);

/// Opens [`OpenSshSession`]s as `user@target`.
///
/// Generic over `R: CommandRunner` so tests can record the exact `ssh`
/// argument lists without spawning processes.
pub struct OpenSshConnector<R> {
    runner: R,
    user: String,
    connect_timeout: Duration,
    exec_ceiling: Duration,
}

impl<R: CommandRunner + Clone> OpenSshConnector<R> {
    #[must_use]
    pub fn new(runner: R, user: impl Into<String>, connect_timeout: Duration) -> Self {
        Self {
            runner,
            user: user.into(),
            connect_timeout,
            exec_ceiling: DEFAULT_EXEC_CEILING,
        }
    }
}

impl<R: CommandRunner + Clone> SessionConnector for OpenSshConnector<R> {
    type Session = OpenSshSession<R>;

    async fn connect(&self, target: &str, key: &PrivateKey) -> Result<Self::Session> {
        let files = SessionFiles::create(key)?;
        let destination = format!("{}@{target}", self.user);

        let mut args = files.options();
        args.extend(
            [
                "-o",
                "ControlMaster=yes",
                "-o",
                "ControlPersist=yes",
                "-o",
                "ServerAliveInterval=30",
            ]
            .map(String::from),
        );
        args.push("-o".to_string());
        args.push(format!("ConnectTimeout={}", self.connect_timeout.as_secs().max(1)));
        args.push(destination.clone());
        args.push("true".to_string());

        debug!(%destination, "opening control master");
        let argv: Vec<&str> = args.iter().map(String::as_str).collect();
        let output = self
            .runner
            .run_with_timeout("ssh", &argv, self.connect_timeout * 2)
            .await
            .with_context(|| format!("ssh {destination}"))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("ssh {destination} failed: {}", stderr.trim());
        }

        Ok(OpenSshSession {
            runner: self.runner.clone(),
            target: target.to_string(),
            destination,
            files,
            exec_ceiling: self.exec_ceiling,
            closed: AtomicBool::new(false),
        })
    }
}

/// One multiplexed OpenSSH session.
pub struct OpenSshSession<R> {
    runner: R,
    target: String,
    destination: String,
    files: SessionFiles,
    exec_ceiling: Duration,
    closed: AtomicBool,
}

impl<R> OpenSshSession<R> {
    fn control_args(&self, extra: &[&str]) -> Vec<String> {
        let mut args = self.files.options();
        args.extend(extra.iter().map(|s| (*s).to_string()));
        args
    }
}

impl<R: CommandRunner> RemoteShell for OpenSshSession<R> {
    fn target(&self) -> &str {
        &self.target
    }

    async fn exec(&self, command_line: &str) -> Result<Output> {
        anyhow::ensure!(
            !self.closed.load(Ordering::Acquire),
            "session to {} is closed",
            self.target
        );
        let args = self.control_args(&[
            "-o",
            "ControlMaster=no",
            &self.destination,
            "--",
            command_line,
        ]);
        let argv: Vec<&str> = args.iter().map(String::as_str).collect();
        self.runner
            .run_with_timeout("ssh", &argv, self.exec_ceiling)
            .await
            .with_context(|| format!("ssh {}", self.destination))
    }

    async fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        let args = self.control_args(&["-O", "exit", &self.destination]);
        let argv: Vec<&str> = args.iter().map(String::as_str).collect();
        let output = self
            .runner
            .run("ssh", &argv)
            .await
            .with_context(|| format!("closing ssh {}", self.destination))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("closing ssh {}: {}", self.destination, stderr.trim());
        }
        debug!(destination = %self.destination, "control master closed");
        Ok(())
    }
}

impl<R> Drop for OpenSshSession<R> {
    fn drop(&mut self) {
        if self.closed.load(Ordering::Acquire) {
            return;
        }
        // Dropped without close(): stop the master before its socket
        // directory disappears.
        let args = self.control_args(&["-O", "exit", &self.destination]);
        let status = std::process::Command::new("ssh")
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
        if let Err(e) = status {
            warn!(destination = %self.destination, error = %e, "failed to stop control master");
        }
    }
}

/// Arguments for an interactive login on `user@target`, with the configured
/// identity file when there is one.
#[must_use]
pub fn interactive_args(user: &str, target: &str, identity: Option<&Path>) -> Vec<String> {
    let mut args = Vec::new();
    if let Some(path) = identity {
        args.push("-i".to_string());
        args.push(path.display().to_string());
    }
    args.push(format!("{user}@{target}"));
    args
}

/// Per-session private files.
struct SessionFiles {
    dir: TempDir,
}

impl SessionFiles {
    fn create(key: &PrivateKey) -> Result<Self> {
        // Short prefix: the control socket path must fit in sun_path.
        let dir = tempfile::Builder::new()
            .prefix("hoster-")
            .tempdir()
            .context("cannot create session directory")?;
        let files = Self { dir };
        write_private(&files.key(), key.material())?;
        Ok(files)
    }

    fn key(&self) -> PathBuf {
        self.dir.path().join("id")
    }

    fn control(&self) -> PathBuf {
        self.dir.path().join("ctl")
    }

    fn known_hosts(&self) -> PathBuf {
        self.dir.path().join("known_hosts")
    }

    /// Options every invocation against this session carries.
    fn options(&self) -> Vec<String> {
        vec![
            "-i".to_string(),
            self.key().display().to_string(),
            "-o".to_string(),
            "IdentitiesOnly=yes".to_string(),
            "-o".to_string(),
            "BatchMode=yes".to_string(),
            "-o".to_string(),
            "StrictHostKeyChecking=accept-new".to_string(),
            "-o".to_string(),
            format!("UserKnownHostsFile={}", self.known_hosts().display()),
            "-o".to_string(),
            format!("ControlPath={}", self.control().display()),
            "-o".to_string(),
            "LogLevel=ERROR".to_string(),
        ]
    }
}

#[cfg(unix)]
fn write_private(path: &Path, contents: &str) -> Result<()> {
    use std::io::Write as _;
    use std::os::unix::fs::OpenOptionsExt as _;

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(0o600)
        .open(path)
        .with_context(|| format!("cannot create {}", path.display()))?;
    file.write_all(contents.as_bytes())
        .with_context(|| format!("cannot write {}", path.display()))
}

#[cfg(not(unix))]
fn write_private(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).with_context(|| format!("cannot write {}", path.display()))
}
