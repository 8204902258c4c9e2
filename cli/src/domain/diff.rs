//! Desired-vs-observed comparison.
//!
//! Only `last_commit` decides whether a service changed. Repository drift is
//! reported separately by [`repo_drift`] and never triggers a rebuild.

use hoster_common::ServiceRecord;
use serde::Serialize;

use crate::domain::service::ServiceMap;

/// Three-way classification of subdomains relative to observed state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiffPartition {
    /// In desired, absent from observed. Desired order.
    pub new: Vec<ServiceRecord>,
    /// In both, with a different `last_commit`. Desired order.
    pub changed: Vec<ServiceRecord>,
    /// In observed, absent from desired. Observed order.
    pub removed: Vec<String>,
}

impl DiffPartition {
    /// Services to clone and rebuild: new first, then changed.
    #[must_use]
    pub fn to_build(&self) -> Vec<&ServiceRecord> {
        self.new.iter().chain(&self.changed).collect()
    }

    /// Subdomains to remove.
    #[must_use]
    pub fn to_destroy(&self) -> &[String] {
        &self.removed
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.new.is_empty() && self.changed.is_empty() && self.removed.is_empty()
    }
}

/// Compare `desired` against `observed`.
#[must_use]
pub fn diff(desired: &ServiceMap, observed: &ServiceMap) -> DiffPartition {
    let mut partition = DiffPartition::default();

    for (subdomain, service) in desired {
        match observed.get(subdomain) {
            None => partition.new.push(service.clone()),
            Some(remote) if remote.last_commit != service.last_commit => {
                partition.changed.push(service.clone());
            }
            Some(_) => {}
        }
    }

    partition.removed = observed
        .keys()
        .filter(|subdomain| !desired.contains_key(*subdomain))
        .cloned()
        .collect();

    partition
}

/// Subdomains deployed at the desired commit but from a different repository.
///
/// Agents that do not report a repository URL never show drift.
#[must_use]
pub fn repo_drift(desired: &ServiceMap, observed: &ServiceMap) -> Vec<String> {
    desired
        .iter()
        .filter_map(|(subdomain, service)| {
            let remote = observed.get(subdomain)?;
            let drifted = remote.last_commit == service.last_commit
                && !remote.repo_url.is_empty()
                && remote.repo_url != service.repo_url;
            drifted.then(|| subdomain.clone())
        })
        .collect()
}
