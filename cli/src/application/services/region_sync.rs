//! Application service — converge one region onto the desired services.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! All I/O is routed through injected port traits.

use std::time::Duration;

use hoster_common::SubdomainSpec;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use crate::application::ports::{ProgressReporter, RemoteShell, SessionConnector, TargetResolver};
use crate::application::services::agent_client::RemoteAgentClient;
use crate::domain::{
    DeployConfig, DeployError, PrivateKey, RegionConfig, RegionOutcome, RegionReport, RegionStage,
    ServiceMap, SyncMode, diff, repo_drift, service_map,
};

/// Everything a region sync needs, borrowed from the run.
pub struct RegionSync<'a, T, C, R> {
    pub config: &'a DeployConfig,
    /// Desired services, identical for every region.
    pub desired: &'a ServiceMap,
    pub key: &'a PrivateKey,
    pub targets: &'a T,
    pub connector: &'a C,
    pub reporter: &'a R,
    /// Upper bound for each agent call.
    pub agent_timeout: Duration,
    pub cancel: CancellationToken,
    pub mode: SyncMode,
}

type StageResult<T> = Result<T, (RegionStage, DeployError)>;

impl<T, C, R> RegionSync<'_, T, C, R>
where
    T: TargetResolver,
    C: SessionConnector,
    R: ProgressReporter,
{
    /// Run the region through every stage and report where it ended.
    ///
    /// Never returns early with an open session: once connected, the session
    /// is closed exactly once whatever the later stages do.
    #[instrument(skip_all, fields(region = %region.name))]
    pub async fn run(&self, region: &RegionConfig) -> RegionReport {
        let name = region.name.as_str();

        let target = match self.resolve_target(name).await {
            Ok(target) => target,
            Err((stage, error)) => return failed(name, None, stage, error),
        };

        self.reporter.step(&format!("{name}: connecting to {target}"));
        let session = match self.connect(&target).await {
            Ok(session) => session,
            Err((stage, error)) => return failed(name, Some(target), stage, error),
        };

        let result = self.converge(name, &session).await;

        if let Err(e) = session.close().await {
            let message = format!("{e:#}");
            warn!(host = %target, error = %message, "failed to close session");
        }

        match result {
            Ok(outcome) => RegionReport {
                region: name.to_string(),
                target: Some(target),
                outcome,
            },
            Err((stage, error)) => failed(name, Some(target), stage, error),
        }
    }

    async fn resolve_target(&self, region: &str) -> StageResult<String> {
        let stage = RegionStage::ResolveTarget;
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err((stage, DeployError::Cancelled)),
            res = self.targets.resolve(region) => res.map_err(|e| {
                (stage, DeployError::Provisioning {
                    region: region.to_string(),
                    message: format!("{e:#}"),
                })
            }),
        }
    }

    async fn connect(&self, target: &str) -> StageResult<C::Session> {
        let stage = RegionStage::Connect;
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err((stage, DeployError::Cancelled)),
            res = self.connector.connect(target, self.key) => res.map_err(|e| {
                (stage, DeployError::Connection {
                    target: target.to_string(),
                    message: format!("{e:#}"),
                })
            }),
        }
    }

    async fn converge(&self, region: &str, session: &C::Session) -> StageResult<RegionOutcome> {
        let client = RemoteAgentClient::new(session, self.agent_timeout, self.cancel.clone());

        let observed = service_map(
            client
                .list_services()
                .await
                .map_err(|e| (RegionStage::FetchObserved, e))?,
        );
        info!(host = session.target(), services = observed.len(), "fetched observed services");

        if self.mode == SyncMode::Inspect {
            return Ok(RegionOutcome::Inspected {
                services: observed.into_values().collect(),
            });
        }

        let partition = diff(self.desired, &observed);
        if self.mode == SyncMode::Plan {
            return Ok(RegionOutcome::Planned {
                drift: repo_drift(self.desired, &observed),
                partition,
            });
        }

        let to_build = partition.to_build();
        let built: Vec<String> = to_build.iter().map(|s| s.subdomain.clone()).collect();
        if !to_build.is_empty() {
            self.reporter
                .step(&format!("{region}: building {}", built.join(", ")));
            let pairs: Vec<(&str, &str)> = to_build
                .iter()
                .map(|s| (s.repo_url.as_str(), s.subdomain.as_str()))
                .collect();
            client
                .clone_repos(&pairs)
                .await
                .map_err(|e| (RegionStage::Build, e))?;

            let specs = to_build
                .iter()
                .map(|s| SubdomainSpec {
                    subdomain: s.subdomain.clone(),
                    extra_traefik_labels: self
                        .config
                        .project(&s.subdomain)
                        .map(|p| p.extra_traefik_labels.clone())
                        .unwrap_or_default(),
                })
                .collect();
            client
                .rebuild(&self.config.domain_name, specs)
                .await
                .map_err(|e| (RegionStage::Build, e))?;
        }

        let destroyed = partition.to_destroy().to_vec();
        if !destroyed.is_empty() {
            self.reporter
                .step(&format!("{region}: removing {}", destroyed.join(", ")));
            client
                .remove(&destroyed)
                .await
                .map_err(|e| (RegionStage::Destroy, e))?;
        }

        // The run report prints the per-region summary.
        Ok(RegionOutcome::Synced { built, destroyed })
    }
}

fn failed(region: &str, target: Option<String>, stage: RegionStage, error: DeployError) -> RegionReport {
    warn!(region, %stage, error = %error, "region failed");
    RegionReport {
        region: region.to_string(),
        target,
        outcome: RegionOutcome::Failed { stage, error },
    }
}
