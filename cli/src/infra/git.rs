//! Infrastructure implementation of the `CommitResolver` port.

use anyhow::{Context, Result};

use crate::application::ports::{CommandRunner, CommitResolver};

/// Asks the remote for its HEAD with `git ls-remote`.
pub struct GitLsRemote<R> {
    runner: R,
}

impl<R: CommandRunner> GitLsRemote<R> {
    #[must_use]
    pub fn new(runner: R) -> Self {
        Self { runner }
    }
}

impl<R: CommandRunner> CommitResolver for GitLsRemote<R> {
    async fn head_commit(&self, repo_url: &str) -> Result<String> {
        let output = self
            .runner
            .run("git", &["ls-remote", repo_url, "HEAD"])
            .await
            .context("git ls-remote")?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("git ls-remote {repo_url} failed: {}", stderr.trim());
        }
        first_token(&String::from_utf8_lossy(&output.stdout))
            .ok_or_else(|| anyhow::anyhow!("git ls-remote {repo_url} returned no HEAD"))
    }
}

/// First whitespace-separated token of `<sha>\tHEAD`.
#[must_use]
pub fn first_token(stdout: &str) -> Option<String> {
    stdout.split_whitespace().next().map(str::to_string)
}
