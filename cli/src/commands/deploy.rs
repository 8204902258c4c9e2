//! `hoster deploy` — converge every region onto the configured projects.

use std::process::ExitCode;

use anyhow::Result;
use tokio_util::sync::CancellationToken;

use crate::app::AppContext;
use crate::application::services::deploy_run::{RunCoordinator, RunOptions};
use crate::commands::RunArgs;
use crate::domain::SyncMode;
use crate::infra::credentials::KeyResolver;
use crate::infra::git::GitLsRemote;
use crate::infra::ssh::OpenSshConnector;
use crate::infra::terragrunt::TerragruntResolver;
use crate::output::TerminalReporter;

/// Run the deploy command.
///
/// # Errors
///
/// Returns an error for run-fatal failures (config, credentials, commit
/// resolution, cancellation before the first region).
pub async fn run(app: &AppContext, args: &RunArgs, cancel: CancellationToken) -> Result<ExitCode> {
    sync(app, args, SyncMode::Apply, cancel).await
}

/// Shared driver for `deploy`, `plan` and `status`.
///
/// # Errors
///
/// See [`run`].
pub async fn sync(
    app: &AppContext,
    args: &RunArgs,
    mode: SyncMode,
    cancel: CancellationToken,
) -> Result<ExitCode> {
    let config = app.load_config()?;
    let credentials = KeyResolver::from_env(config.ssh.private_key_path.clone());
    let connector = OpenSshConnector::new(app.runner, config.ssh.user.clone(), args.connect_timeout());
    let options = RunOptions {
        mode,
        agent_timeout: args.agent_timeout(),
        fail_fast: args.fail_fast,
    };

    let coordinator = RunCoordinator::new(
        config,
        options,
        credentials,
        GitLsRemote::new(app.runner),
        TerragruntResolver::new(app.runner, &app.root),
        connector,
    );

    let reporter = TerminalReporter::new(&app.output);
    let report = coordinator.run(&reporter, cancel).await?;
    app.renderer().render_run(&report, mode)?;

    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
