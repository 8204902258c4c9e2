//! CLI argument parsing with clap derive

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;

use crate::app::{AppContext, AppFlags, OutputFlags};
use crate::commands;

/// Deploy git projects to self-hosted region servers
#[derive(Parser)]
#[command(
    name = "hoster",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub no_color: bool,

    /// Show debug logs on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Deployment checkout containing config.json and terraform/
    #[arg(long, global = true, env = "HOSTER_ROOT", default_value = ".")]
    pub root: PathBuf,

    /// Config file to use instead of <root>/config.json
    #[arg(long, global = true, env = "HOSTER_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Build, rebuild and remove services until every region matches config
    Deploy(commands::RunArgs),

    /// Show what deploy would change, without changing anything
    Plan(commands::RunArgs),

    /// List the services each region is running
    Status(commands::RunArgs),

    /// Check config.json without touching the network
    Validate,

    /// Open an interactive SSH session on a region server
    Shell(commands::shell::ShellArgs),

    /// Show version
    Version,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails before producing a report.
    pub async fn run(self, cancel: CancellationToken) -> Result<ExitCode> {
        let Cli {
            json,
            quiet,
            no_color,
            verbose,
            root,
            config,
            command,
        } = self;
        crate::logging::init(verbose);

        let app = AppContext::new(AppFlags {
            output: OutputFlags {
                no_color,
                quiet,
                json,
            },
            root,
            config,
        });

        match command {
            Command::Deploy(args) => commands::deploy::run(&app, &args, cancel).await,
            Command::Plan(args) => commands::plan::run(&app, &args, cancel).await,
            Command::Status(args) => commands::status::run(&app, &args, cancel).await,
            Command::Validate => commands::validate::run(&app).map(|()| ExitCode::SUCCESS),
            Command::Shell(args) => commands::shell::run(&app, &args).await,
            Command::Version => commands::version::run(&app).map(|()| ExitCode::SUCCESS),
        }
    }
}
