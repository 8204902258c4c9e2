//! Per-region sync stages and run reports.

use std::fmt;

use chrono::{DateTime, Utc};
use hoster_common::ServiceRecord;

use crate::domain::diff::DiffPartition;
use crate::domain::error::DeployError;

/// Stages a region moves through, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionStage {
    ResolveTarget,
    Connect,
    FetchObserved,
    ComputeDiff,
    Build,
    Destroy,
    Disconnect,
}

impl RegionStage {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ResolveTarget => "resolve-target",
            Self::Connect => "connect",
            Self::FetchObserved => "fetch-observed",
            Self::ComputeDiff => "compute-diff",
            Self::Build => "build",
            Self::Destroy => "destroy",
            Self::Disconnect => "disconnect",
        }
    }
}

impl fmt::Display for RegionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How far a region sync goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// Build and destroy until the region matches desired state.
    Apply,
    /// Stop after computing the diff.
    Plan,
    /// Stop after fetching observed services.
    Inspect,
}

impl SyncMode {
    /// Subcommand that runs in this mode.
    #[must_use]
    pub fn command(self) -> &'static str {
        match self {
            Self::Apply => "deploy",
            Self::Plan => "plan",
            Self::Inspect => "status",
        }
    }
}

/// Terminal state of one region.
#[derive(Debug)]
pub enum RegionOutcome {
    Synced {
        built: Vec<String>,
        destroyed: Vec<String>,
    },
    Planned {
        partition: DiffPartition,
        /// Subdomains whose repository changed without a new commit.
        drift: Vec<String>,
    },
    Inspected {
        services: Vec<ServiceRecord>,
    },
    Failed {
        stage: RegionStage,
        error: DeployError,
    },
}

/// Result of syncing one region.
#[derive(Debug)]
pub struct RegionReport {
    pub region: String,
    /// Resolved connection address, if resolution got that far.
    pub target: Option<String>,
    pub outcome: RegionOutcome,
}

impl RegionReport {
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, RegionOutcome::Failed { .. })
    }

    /// The failure, if this region failed.
    #[must_use]
    pub fn error(&self) -> Option<&DeployError> {
        match &self.outcome {
            RegionOutcome::Failed { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// Aggregate result of a run across regions.
#[derive(Debug)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Regions that were attempted, in configured order.
    pub regions: Vec<RegionReport>,
    /// Regions never attempted because the run stopped early.
    pub skipped: Vec<String>,
}

impl RunReport {
    /// `true` when every configured region was attempted and none failed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.skipped.is_empty() && !self.regions.iter().any(RegionReport::is_failed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &RegionReport> {
        self.regions.iter().filter(|r| r.is_failed())
    }
}
