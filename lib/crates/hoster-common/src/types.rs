use serde::{Deserialize, Serialize};

/// A deployed (or deployable) service, keyed by its subdomain.
///
/// The agent reports these from `list-services`; the deployer builds the
/// same shape locally from each project's HEAD commit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceRecord {
    pub subdomain: String,
    /// Full 40-hex commit id the service was built from.
    pub last_commit: String,
    /// Older agents omit the repository URL.
    #[serde(default)]
    pub repo_url: String,
}

impl ServiceRecord {
    #[must_use]
    pub fn new(
        subdomain: impl Into<String>,
        last_commit: impl Into<String>,
        repo_url: impl Into<String>,
    ) -> Self {
        Self {
            subdomain: subdomain.into(),
            last_commit: last_commit.into(),
            repo_url: repo_url.into(),
        }
    }
}

/// One entry of a `rebuild` request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubdomainSpec {
    pub subdomain: String,
    #[serde(default)]
    pub extra_traefik_labels: Vec<String>,
}

/// Body of the `rebuild` command.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RebuildRequest {
    /// Apex domain the subdomains are routed under.
    pub domain: String,
    pub subdomains: Vec<SubdomainSpec>,
}
