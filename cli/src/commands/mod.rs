//! Command implementations

pub mod deploy;
pub mod plan;
pub mod shell;
pub mod status;
pub mod validate;
pub mod version;

use std::time::Duration;

use clap::Args;

/// Knobs shared by every command that talks to region servers.
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Seconds one agent command may take before the region fails
    #[arg(long, env = "HOSTER_AGENT_TIMEOUT", default_value_t = 1800, value_name = "SECS")]
    pub agent_timeout: u64,

    /// Seconds to wait for an SSH connection
    #[arg(long, env = "HOSTER_CONNECT_TIMEOUT", default_value_t = 30, value_name = "SECS")]
    pub connect_timeout: u64,

    /// Stop at the first failed region
    #[arg(long)]
    pub fail_fast: bool,
}

impl RunArgs {
    #[must_use]
    pub fn agent_timeout(&self) -> Duration {
        Duration::from_secs(self.agent_timeout)
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }
}
