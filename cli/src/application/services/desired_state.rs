//! Desired service map from configured projects.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use hoster_common::ServiceRecord;
use tracing::debug;

use crate::application::ports::CommitResolver;
use crate::domain::{DeployError, Project, ServiceMap, is_commit_id, service_map};

/// Resolve each project's HEAD commit, preserving configuration order.
///
/// # Errors
///
/// Returns [`DeployError::DesiredState`] for the first repository whose HEAD
/// cannot be resolved to a full commit id.
pub async fn resolve_desired(
    projects: &[Project],
    commits: &impl CommitResolver,
) -> Result<ServiceMap, DeployError> {
    let mut records = Vec::with_capacity(projects.len());
    for project in projects {
        let commit = commits
            .head_commit(&project.repo_url)
            .await
            .map_err(|e| DeployError::DesiredState {
                repo_url: project.repo_url.clone(),
                message: format!("{e:#}"),
            })?;
        if !is_commit_id(&commit) {
            return Err(DeployError::DesiredState {
                repo_url: project.repo_url.clone(),
                message: format!("not a commit id: {commit:?}"),
            });
        }
        debug!(subdomain = %project.subdomain, %commit, "resolved HEAD");
        records.push(ServiceRecord::new(&project.subdomain, commit, &project.repo_url));
    }
    Ok(service_map(records))
}
