//! `hoster status` — list the services each region reports.

use std::process::ExitCode;

use anyhow::Result;
use tokio_util::sync::CancellationToken;

use crate::app::AppContext;
use crate::commands::{RunArgs, deploy};
use crate::domain::SyncMode;

/// Run the status command. Commits are not resolved.
///
/// # Errors
///
/// See [`deploy::run`].
pub async fn run(app: &AppContext, args: &RunArgs, cancel: CancellationToken) -> Result<ExitCode> {
    deploy::sync(app, args, SyncMode::Inspect, cancel).await
}
