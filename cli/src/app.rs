//! Application context — unified state passed to every command handler.
//!
//! `AppContext` is constructed once in `Cli::run()` from the global flags so
//! that command handlers never read flags or process state themselves.

use std::path::PathBuf;

use anyhow::Result;

use crate::domain::DeployConfig;
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::config::JsonConfigFile;
use crate::output::{HumanRenderer, JsonRenderer, OutputContext, Renderer};

/// Output rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable terminal output (default).
    Human,
    /// Machine-readable JSON output.
    Json,
}

/// Output rendering flags.
pub struct OutputFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
    /// Enable JSON output mode.
    pub json: bool,
}

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    /// Output rendering options.
    pub output: OutputFlags,
    /// Deployment checkout holding `config.json` and `terraform/`.
    pub root: PathBuf,
    /// Explicit config file, overriding `<root>/config.json`.
    pub config: Option<PathBuf>,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context. Quiet in JSON mode so stdout carries only
    /// the JSON document.
    pub output: OutputContext,
    /// Output rendering mode (human vs JSON).
    pub mode: OutputMode,
    pub root: PathBuf,
    config_file: JsonConfigFile,
    /// Runner for local collaborators (terragrunt, git, ssh).
    pub runner: TokioCommandRunner,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    #[must_use]
    pub fn new(flags: AppFlags) -> Self {
        let mode = if flags.output.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        };
        let quiet = flags.output.quiet || mode == OutputMode::Json;

        Self {
            output: OutputContext::new(flags.output.no_color, quiet),
            mode,
            config_file: JsonConfigFile::locate(&flags.root, flags.config),
            root: flags.root,
            runner: TokioCommandRunner::default(),
        }
    }

    /// Returns `true` when JSON output mode is active.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.mode == OutputMode::Json
    }

    /// Returns the appropriate `Renderer` variant for the current output mode.
    #[must_use]
    pub fn renderer(&self) -> Renderer<'_> {
        match self.mode {
            OutputMode::Human => Renderer::Human(HumanRenderer::new(&self.output)),
            OutputMode::Json => Renderer::Json(JsonRenderer),
        }
    }

    /// Load and validate `config.json`.
    ///
    /// # Errors
    ///
    /// Returns the [`crate::domain::ConfigError`] (wrapped in a
    /// `DeployError`) when the file is unreadable or invalid.
    pub fn load_config(&self) -> Result<DeployConfig> {
        let config = self
            .config_file
            .load()
            .map_err(crate::domain::DeployError::from)?;
        Ok(config)
    }
}
