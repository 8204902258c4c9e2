//! `hoster plan` — show what `deploy` would build and remove.

use std::process::ExitCode;

use anyhow::Result;
use tokio_util::sync::CancellationToken;

use crate::app::AppContext;
use crate::commands::{RunArgs, deploy};
use crate::domain::SyncMode;

/// Run the plan command. Nothing is cloned, rebuilt or removed.
///
/// # Errors
///
/// See [`deploy::run`].
pub async fn run(app: &AppContext, args: &RunArgs, cancel: CancellationToken) -> Result<ExitCode> {
    deploy::sync(app, args, SyncMode::Plan, cancel).await
}
