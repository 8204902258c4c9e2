//! `hoster shell` — interactive SSH login on a region server.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;

use crate::app::AppContext;
use crate::application::ports::{CommandRunner, TargetResolver};
use crate::infra::credentials::expand_tilde;
use crate::infra::ip_cache::IpCacheFile;
use crate::infra::ssh::interactive_args;
use crate::infra::terragrunt::{CachedTargets, TerragruntResolver};

/// Arguments for the shell command.
#[derive(Args, Debug)]
pub struct ShellArgs {
    /// Region to connect to (defaults to the first configured region)
    pub region: Option<String>,

    /// Ask terragrunt for the address instead of using the address cache
    #[arg(long)]
    pub no_cache: bool,
}

/// Run the shell command.
///
/// # Errors
///
/// Returns an error if the region is unknown, its address cannot be
/// resolved, or `ssh` cannot be started.
pub async fn run(app: &AppContext, args: &ShellArgs) -> Result<ExitCode> {
    let config = app.load_config()?;

    let region = match &args.region {
        Some(name) => name.clone(),
        None => {
            let first = config
                .regions
                .first()
                .context("no regions configured")?
                .name
                .clone();
            app.output
                .warn(&format!("no region given, using first configured region: {first}"));
            first
        }
    };
    anyhow::ensure!(
        config.region(&region).is_some(),
        "region {region} not found in config"
    );

    if args.no_cache {
        app.output.info("skipping cache");
    }
    let targets = CachedTargets::new(
        TerragruntResolver::new(app.runner, &app.root),
        IpCacheFile::in_root(&app.root),
        !args.no_cache,
    );
    let ip = targets
        .resolve(&region)
        .await
        .with_context(|| format!("cannot resolve address of region {region}"))?;

    let identity = config
        .ssh
        .private_key_path
        .as_deref()
        .map(expand_tilde)
        .filter(|p| p.is_file());
    let ssh_args = interactive_args(&config.ssh.user, &ip, identity.as_deref());
    let argv: Vec<&str> = ssh_args.iter().map(String::as_str).collect();

    app.output.step(&format!("connecting to {ip}"));
    let status = app.runner.run_status("ssh", &argv).await?;
    Ok(if status.success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
