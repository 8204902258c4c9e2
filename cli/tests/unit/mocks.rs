//! Recording mocks of the application ports.
//!
//! Every mock writes its calls into a shared [`Journal`] so tests can assert
//! on the exact order of remote commands, connections and closes across
//! regions.

#![allow(dead_code, clippy::expect_used)]

use std::collections::HashMap;
use std::path::Path;
use std::process::{ExitStatus, Output};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Result, bail};
use hoster_cli::application::ports::{
    CommandRunner, CommitResolver, CredentialSource, ProgressReporter, RemoteShell,
    SessionConnector, TargetResolver,
};
use hoster_cli::domain::{DeployError, KeySource, PrivateKey};
use tokio_util::sync::CancellationToken;

// ── Output helpers ────────────────────────────────────────────────────────────

#[cfg(unix)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(code << 8)
}

#[cfg(windows)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    #[allow(clippy::cast_sign_loss)]
    ExitStatus::from_raw(code as u32)
}

pub fn ok_output(stdout: &str) -> Output {
    Output {
        status: exit_status(0),
        stdout: stdout.as_bytes().to_vec(),
        stderr: Vec::new(),
    }
}

pub fn err_output(code: i32, stderr: &str) -> Output {
    Output {
        status: exit_status(code),
        stdout: Vec::new(),
        stderr: stderr.as_bytes().to_vec(),
    }
}

pub fn commit(n: u8) -> String {
    format!("{n:x}").repeat(40).chars().take(40).collect()
}

// ── Journal ───────────────────────────────────────────────────────────────────

/// Everything observable that happened during a run, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Resolve(String),
    Connect(String),
    Exec { target: String, line: String },
    Close(String),
}

#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<Event>>>);

impl Journal {
    pub fn push(&self, event: Event) {
        self.0.lock().expect("journal lock").push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.lock().expect("journal lock").clone()
    }

    pub fn execs(&self, target: &str) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Exec { target: t, line } if t == target => Some(line),
                _ => None,
            })
            .collect()
    }

    pub fn closes(&self, target: &str) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, Event::Close(t) if t == target))
            .count()
    }

    pub fn connects(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, Event::Connect(_)))
            .count()
    }
}

// ── Remote side ───────────────────────────────────────────────────────────────

/// Canned behaviour of one region server.
#[derive(Clone)]
pub struct Server {
    /// Payload returned by `list-services`.
    pub services: String,
    /// Per-command overrides keyed by agent command name.
    pub responses: HashMap<&'static str, Output>,
    /// Commands that never answer.
    pub hang: Vec<&'static str>,
    pub refuse_connection: bool,
    pub fail_close: bool,
    /// Command during which the operator hits Ctrl-C: the token is
    /// cancelled and the ssh client exits with no output.
    pub interrupt: Option<(&'static str, CancellationToken)>,
}

impl Server {
    pub fn with_services(services: &str) -> Self {
        Self {
            services: services.to_string(),
            responses: HashMap::new(),
            hang: Vec::new(),
            refuse_connection: false,
            fail_close: false,
            interrupt: None,
        }
    }

    pub fn empty() -> Self {
        Self::with_services("[]")
    }

    pub fn respond(mut self, command: &'static str, output: Output) -> Self {
        self.responses.insert(command, output);
        self
    }

    pub fn hang_on(mut self, command: &'static str) -> Self {
        self.hang.push(command);
        self
    }

    pub fn refusing(mut self) -> Self {
        self.refuse_connection = true;
        self
    }

    pub fn interrupted_on(mut self, command: &'static str, cancel: &CancellationToken) -> Self {
        self.interrupt = Some((command, cancel.clone()));
        self
    }

    pub fn failing_close(mut self) -> Self {
        self.fail_close = true;
        self
    }
}

/// Agent command name in a `/mnt/data/agent/cli <command> ...` line.
pub fn command_of(line: &str) -> &str {
    line.split_whitespace().nth(1).unwrap_or_default()
}

pub struct MockSession {
    target: String,
    server: Server,
    journal: Journal,
}

impl RemoteShell for MockSession {
    fn target(&self) -> &str {
        &self.target
    }

    async fn exec(&self, command_line: &str) -> Result<Output> {
        self.journal.push(Event::Exec {
            target: self.target.clone(),
            line: command_line.to_string(),
        });
        let command = command_of(command_line);
        if let Some((_, cancel)) = self.server.interrupt.as_ref().filter(|(c, _)| *c == command) {
            cancel.cancel();
            return Ok(ok_output(""));
        }
        if self.server.hang.iter().any(|c| *c == command) {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        if let Some(output) = self.server.responses.get(command) {
            return Ok(output.clone());
        }
        if command == "list-services" {
            return Ok(ok_output(&self.server.services));
        }
        Ok(ok_output("{}"))
    }

    async fn close(&self) -> Result<()> {
        self.journal.push(Event::Close(self.target.clone()));
        if self.server.fail_close {
            bail!("control socket gone");
        }
        Ok(())
    }
}

/// Connector serving one [`Server`] per target address.
pub struct MockConnector {
    pub servers: HashMap<String, Server>,
    pub journal: Journal,
}

impl MockConnector {
    pub fn new(journal: &Journal) -> Self {
        Self {
            servers: HashMap::new(),
            journal: journal.clone(),
        }
    }

    pub fn serve(mut self, target: &str, server: Server) -> Self {
        self.servers.insert(target.to_string(), server);
        self
    }
}

impl SessionConnector for MockConnector {
    type Session = MockSession;

    async fn connect(&self, target: &str, _key: &PrivateKey) -> Result<MockSession> {
        self.journal.push(Event::Connect(target.to_string()));
        let Some(server) = self.servers.get(target) else {
            bail!("no route to host {target}");
        };
        if server.refuse_connection {
            bail!("connection refused");
        }
        Ok(MockSession {
            target: target.to_string(),
            server: server.clone(),
            journal: self.journal.clone(),
        })
    }
}

// ── Collaborators ─────────────────────────────────────────────────────────────

/// Region `r` resolves to `ip-r`; regions in `missing` fail.
pub struct MockTargets {
    pub missing: Vec<String>,
    pub journal: Journal,
}

impl MockTargets {
    pub fn new(journal: &Journal) -> Self {
        Self {
            missing: Vec::new(),
            journal: journal.clone(),
        }
    }

    pub fn without(mut self, region: &str) -> Self {
        self.missing.push(region.to_string());
        self
    }
}

pub fn ip(region: &str) -> String {
    format!("ip-{region}")
}

impl TargetResolver for MockTargets {
    async fn resolve(&self, region: &str) -> Result<String> {
        self.journal.push(Event::Resolve(region.to_string()));
        if self.missing.iter().any(|r| r == region) {
            bail!("terragrunt output failed: no outputs found");
        }
        Ok(ip(region))
    }
}

/// HEAD commits keyed by repository URL.
#[derive(Default)]
pub struct MockCommits {
    pub heads: HashMap<String, String>,
    pub calls: Mutex<Vec<String>>,
}

impl MockCommits {
    pub fn with(mut self, repo: &str, head: &str) -> Self {
        self.heads.insert(repo.to_string(), head.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }
}

impl CommitResolver for MockCommits {
    async fn head_commit(&self, repo_url: &str) -> Result<String> {
        self.calls.lock().expect("calls lock").push(repo_url.to_string());
        match self.heads.get(repo_url) {
            Some(head) => Ok(head.clone()),
            None => bail!("repository not found"),
        }
    }
}

pub struct StaticKey;

impl CredentialSource for StaticKey {
    fn private_key(&self) -> Result<PrivateKey, DeployError> {
        Ok(PrivateKey::new("KEY", KeySource::Env("SSH_PRIVATE_KEY")))
    }
}

pub struct NoKey;

impl CredentialSource for NoKey {
    fn private_key(&self) -> Result<PrivateKey, DeployError> {
        Err(DeployError::Credential("set SSH_PRIVATE_KEY".to_string()))
    }
}

/// Records reporter messages.
#[derive(Default)]
pub struct RecordingReporter {
    pub messages: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().expect("reporter lock").clone()
    }
}

impl ProgressReporter for RecordingReporter {
    fn step(&self, message: &str) {
        self.messages.lock().expect("reporter lock").push(format!("step: {message}"));
    }
    fn success(&self, message: &str) {
        self.messages.lock().expect("reporter lock").push(format!("ok: {message}"));
    }
    fn warn(&self, message: &str) {
        self.messages.lock().expect("reporter lock").push(format!("warn: {message}"));
    }
}

// ── Process runner ────────────────────────────────────────────────────────────

/// A `CommandRunner` that records every call and answers from a queue.
///
/// Clonable so one log can be shared by the connector and its sessions.
#[derive(Clone, Default)]
pub struct MockCommandRunner {
    pub calls: Arc<Mutex<Vec<(String, Vec<String>, Option<String>)>>>,
    pub replies: Arc<Mutex<Vec<Output>>>,
}

impl MockCommandRunner {
    /// Replies are consumed in order; once exhausted every call succeeds
    /// with empty output.
    pub fn replying(replies: Vec<Output>) -> Self {
        Self {
            calls: Arc::default(),
            replies: Arc::new(Mutex::new(replies)),
        }
    }

    pub fn calls(&self) -> Vec<(String, Vec<String>, Option<String>)> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn record(&self, program: &str, args: &[&str], dir: Option<&Path>) -> Output {
        self.calls.lock().expect("calls lock").push((
            program.to_string(),
            args.iter().map(|s| (*s).to_string()).collect(),
            dir.map(|d| d.display().to_string()),
        ));
        let mut replies = self.replies.lock().expect("replies lock");
        if replies.is_empty() {
            ok_output("")
        } else {
            replies.remove(0)
        }
    }
}

impl CommandRunner for MockCommandRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        Ok(self.record(program, args, None))
    }

    async fn run_with_timeout(&self, program: &str, args: &[&str], _: Duration) -> Result<Output> {
        Ok(self.record(program, args, None))
    }

    async fn run_in_dir(&self, dir: &Path, program: &str, args: &[&str]) -> Result<Output> {
        Ok(self.record(program, args, Some(dir)))
    }

    async fn run_status(&self, program: &str, args: &[&str]) -> Result<ExitStatus> {
        Ok(self.record(program, args, None).status)
    }
}
