//! Domain layer — pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod config;
pub mod credential;
pub mod diff;
pub mod error;
pub mod region;
pub mod service;

pub use config::{DeployConfig, Project, RegionConfig, SshConfig, validate_subdomain};
pub use credential::{KeySource, PrivateKey};
pub use diff::{DiffPartition, diff, repo_drift};
pub use error::{ConfigError, DeployError, ErrorKind};
pub use region::{RegionOutcome, RegionReport, RegionStage, RunReport, SyncMode};
pub use service::{ServiceMap, is_commit_id, service_map};
