//! Domain types and validators for `config.json`.
//!
//! Pure functions only — no I/O, no async, no filesystem access.

use std::collections::HashSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;

// ── Config schema ────────────────────────────────────────────────────────────

/// A git repository published under `<subdomain>.<domain_name>`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Project {
    pub subdomain: String,
    /// Repository URL, any form `git ls-remote` accepts.
    #[serde(rename = "repo", alias = "repo_url")]
    pub repo_url: String,
    #[serde(default)]
    pub extra_traefik_labels: Vec<String>,
    #[serde(default)]
    pub description: String,
}

/// A deployment region; the name doubles as the Terragrunt directory name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegionConfig {
    #[serde(rename = "region")]
    pub name: String,
}

/// SSH login settings shared by every region.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SshConfig {
    pub user: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key_path: Option<PathBuf>,
}

/// Validated deploy configuration. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployConfig {
    pub domain_name: String,
    pub projects: Vec<Project>,
    pub regions: Vec<RegionConfig>,
    pub ssh: SshConfig,
}

/// `config.json` as written by hand, before validation.
///
/// Provisioning and template keys (`tf_state`, `base_tag`, `email`) belong to
/// other tools and are ignored here.
#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    projects: Option<Vec<Project>>,
    regions: Option<Vec<RegionConfig>>,
    ssh: Option<RawSsh>,
    domain_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawSsh {
    user: Option<String>,
    private_key_path: Option<PathBuf>,
    public_key_path: Option<PathBuf>,
}

impl DeployConfig {
    /// Parse and validate the contents of `config.json`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the JSON is malformed, a required key is
    /// missing, or the project list violates an invariant.
    pub fn parse(origin: &str, json: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_json::from_str(json).map_err(|e| ConfigError::Unreadable {
            path: origin.to_string(),
            reason: e.to_string(),
        })?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawConfig) -> Result<Self, ConfigError> {
        let mut missing = Vec::new();
        if raw.projects.is_none() {
            missing.push("projects");
        }
        if raw.regions.is_none() {
            missing.push("regions");
        }
        if raw.domain_name.as_deref().is_none_or(str::is_empty) {
            missing.push("domain_name");
        }
        match &raw.ssh {
            None => missing.push("ssh"),
            Some(ssh) if ssh.user.as_deref().is_none_or(str::is_empty) => missing.push("ssh.user"),
            Some(_) => {}
        }

        let (Some(projects), Some(regions), Some(domain_name), Some(ssh), true) = (
            raw.projects,
            raw.regions,
            raw.domain_name,
            raw.ssh,
            missing.is_empty(),
        ) else {
            return Err(ConfigError::MissingKeys(
                missing.into_iter().map(str::to_string).collect(),
            ));
        };

        let config = Self {
            domain_name,
            projects,
            regions,
            ssh: SshConfig {
                user: ssh.user.unwrap_or_default(),
                private_key_path: ssh.private_key_path,
                public_key_path: ssh.public_key_path,
            },
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants every run relies on.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let duplicates = duplicate_subdomains(&self.projects);
        if !duplicates.is_empty() {
            return Err(ConfigError::DuplicateSubdomains(duplicates));
        }
        for project in &self.projects {
            validate_subdomain(&project.subdomain)?;
            if project.repo_url.trim().is_empty() {
                return Err(ConfigError::MissingRepo(project.subdomain.clone()));
            }
        }
        let mut seen = HashSet::new();
        for region in &self.regions {
            if !seen.insert(region.name.as_str()) {
                return Err(ConfigError::DuplicateRegion(region.name.clone()));
            }
        }
        Ok(())
    }

    /// Look up a configured project by subdomain.
    #[must_use]
    pub fn project(&self, subdomain: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.subdomain == subdomain)
    }

    /// Look up a configured region by name.
    #[must_use]
    pub fn region(&self, name: &str) -> Option<&RegionConfig> {
        self.regions.iter().find(|r| r.name == name)
    }
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Subdomains that appear more than once, in first-seen order.
#[must_use]
pub fn duplicate_subdomains(projects: &[Project]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut dups = Vec::new();
    for p in projects {
        if !seen.insert(p.subdomain.as_str()) && !dups.contains(&p.subdomain) {
            dups.push(p.subdomain.clone());
        }
    }
    dups
}

/// Validates that `subdomain` is a single lowercase DNS label.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidSubdomain`] otherwise.
pub fn validate_subdomain(subdomain: &str) -> Result<(), ConfigError> {
    let valid = !subdomain.is_empty()
        && subdomain.len() <= 63
        && !subdomain.starts_with('-')
        && !subdomain.ends_with('-')
        && subdomain
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidSubdomain(subdomain.to_string()))
    }
}

// ── Unit tests ───────────────────────────────────────────────────────────────
