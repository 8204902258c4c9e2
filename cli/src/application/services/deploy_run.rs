//! Application service — run every configured region.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::application::ports::{
    CommitResolver, CredentialSource, ProgressReporter, SessionConnector, TargetResolver,
};
use crate::application::services::desired_state::resolve_desired;
use crate::application::services::region_sync::RegionSync;
use crate::domain::{DeployConfig, DeployError, RunReport, ServiceMap, SyncMode};

/// Default upper bound for one agent call (image builds are slow).
pub const DEFAULT_AGENT_TIMEOUT: Duration = Duration::from_secs(1800);

/// Knobs for a run.
#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    pub mode: SyncMode,
    pub agent_timeout: Duration,
    /// Stop at the first failed region instead of moving on.
    pub fail_fast: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            mode: SyncMode::Apply,
            agent_timeout: DEFAULT_AGENT_TIMEOUT,
            fail_fast: false,
        }
    }
}

/// Drives a run over every configured region.
///
/// Owns an immutable copy of the configuration; nothing is read from
/// process state once constructed.
pub struct RunCoordinator<K, G, T, C> {
    config: DeployConfig,
    options: RunOptions,
    credentials: K,
    commits: G,
    targets: T,
    connector: C,
}

impl<K, G, T, C> RunCoordinator<K, G, T, C>
where
    K: CredentialSource,
    G: CommitResolver,
    T: TargetResolver,
    C: SessionConnector,
{
    pub fn new(
        config: DeployConfig,
        options: RunOptions,
        credentials: K,
        commits: G,
        targets: T,
        connector: C,
    ) -> Self {
        Self {
            config,
            options,
            credentials,
            commits,
            targets,
            connector,
        }
    }

    /// Validate, resolve credentials and desired state, then sync each region
    /// in configured order.
    ///
    /// # Errors
    ///
    /// Only run-fatal failures are returned as `Err`: configuration,
    /// credential, desired-state resolution, or cancellation before the
    /// first region. Region failures are recorded in the [`RunReport`].
    pub async fn run(
        &self,
        reporter: &impl ProgressReporter,
        cancel: CancellationToken,
    ) -> Result<RunReport, DeployError> {
        self.config.validate()?;
        let key = self.credentials.private_key()?;
        debug!(source = %key.source(), "resolved private key");
        if cancel.is_cancelled() {
            return Err(DeployError::Cancelled);
        }

        let started_at = Utc::now();
        let desired = if self.options.mode == SyncMode::Inspect {
            ServiceMap::new()
        } else {
            reporter.step("resolving latest commits");
            tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(DeployError::Cancelled),
                res = resolve_desired(&self.config.projects, &self.commits) => res?,
            }
        };
        info!(services = desired.len(), regions = self.config.regions.len(), "starting run");

        let sync = RegionSync {
            config: &self.config,
            desired: &desired,
            key: &key,
            targets: &self.targets,
            connector: &self.connector,
            reporter,
            agent_timeout: self.options.agent_timeout,
            cancel: cancel.clone(),
            mode: self.options.mode,
        };

        let mut regions = Vec::with_capacity(self.config.regions.len());
        let mut skipped = Vec::new();
        let mut pending = self.config.regions.iter();
        while let Some(region) = pending.next() {
            if cancel.is_cancelled() {
                skipped.push(region.name.clone());
                continue;
            }
            let report = sync.run(region).await;
            let halt = report
                .error()
                .is_some_and(|e| e.is_run_fatal() || self.options.fail_fast);
            regions.push(report);
            if halt {
                skipped.extend(pending.by_ref().map(|r| r.name.clone()));
            }
        }

        Ok(RunReport {
            started_at,
            finished_at: Utc::now(),
            regions,
            skipped,
        })
    }
}
