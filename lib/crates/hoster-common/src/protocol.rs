//! Remote agent command vocabulary.

use std::fmt;

/// Location of the agent executable on every server.
pub const AGENT_CLI_PATH: &str = "/mnt/data/agent/cli";

/// Flag appended to every invocation so the agent answers in JSON.
pub const JSON_FLAG: &str = "--json";

/// Commands understood by the agent CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentCommand {
    Clone,
    Rebuild,
    Remove,
    ListServices,
}

impl AgentCommand {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Clone => "clone",
            Self::Rebuild => "rebuild",
            Self::Remove => "remove",
            Self::ListServices => "list-services",
        }
    }
}

impl fmt::Display for AgentCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
