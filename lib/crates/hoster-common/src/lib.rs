pub mod protocol;
pub mod types;

pub use protocol::{AGENT_CLI_PATH, AgentCommand, JSON_FLAG};
pub use types::*;
