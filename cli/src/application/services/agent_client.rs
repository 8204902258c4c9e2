//! Remote agent command protocol.
//!
//! Every call runs `/mnt/data/agent/cli <command> <args> --json` once over an
//! open [`RemoteShell`]. Nothing is retried.

use std::process::Output;
use std::time::Duration;

use hoster_common::{
    AGENT_CLI_PATH, AgentCommand, JSON_FLAG, RebuildRequest, ServiceRecord, SubdomainSpec,
};
use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::application::ports::RemoteShell;
use crate::domain::DeployError;

/// Arguments of one agent command.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandArgs {
    /// Serialized as one double-quoted JSON string.
    StructuredJson(Map<String, Value>),
    /// Joined with single spaces, unescaped.
    PlainTokens(Vec<String>),
}

impl CommandArgs {
    /// Render the arguments as they appear on the remote command line.
    #[must_use]
    pub fn encode(&self) -> String {
        match self {
            Self::StructuredJson(object) => {
                let json = Value::Object(object.clone()).to_string();
                format!("\"{}\"", json.replace('"', "\\\""))
            }
            Self::PlainTokens(tokens) => tokens.join(" "),
        }
    }
}

/// Full remote command line for `command`.
#[must_use]
pub fn command_line(command: AgentCommand, args: &CommandArgs) -> String {
    format!("{AGENT_CLI_PATH} {command} {} {JSON_FLAG}", args.encode())
}

/// Apply the agent response contract to a finished invocation.
///
/// # Errors
///
/// - [`DeployError::RemoteCommand`] if stderr is non-empty (stdout is not
///   inspected) or the JSON object carries a truthy `error` field.
/// - [`DeployError::Decode`] if stdout is not JSON.
pub fn parse_response(command: AgentCommand, output: &Output) -> Result<Value, DeployError> {
    if !output.stderr.is_empty() {
        return Err(DeployError::RemoteCommand {
            command: command.to_string(),
            message: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
        });
    }

    let value: Value = serde_json::from_slice(&output.stdout).map_err(|e| {
        let raw_payload = String::from_utf8_lossy(&output.stdout).into_owned();
        error!(%command, %raw_payload, error = %e, "agent returned malformed JSON");
        DeployError::Decode {
            command: command.to_string(),
            raw_payload,
        }
    })?;

    if let Some(err) = value.as_object().and_then(|o| o.get("error")).filter(|e| is_truthy(e)) {
        let message = match err {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        return Err(DeployError::RemoteCommand {
            command: command.to_string(),
            message,
        });
    }

    Ok(value)
}

/// JSON truthiness: `null`, `false`, `0`, `""`, `[]` and `{}` are falsy.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Client for the agent running behind one session.
pub struct RemoteAgentClient<'a, S: RemoteShell> {
    shell: &'a S,
    timeout: Duration,
    cancel: CancellationToken,
}

impl<'a, S: RemoteShell> RemoteAgentClient<'a, S> {
    /// Every call is bounded by `timeout` and aborts when `cancel` fires.
    pub fn new(shell: &'a S, timeout: Duration, cancel: CancellationToken) -> Self {
        Self {
            shell,
            timeout,
            cancel,
        }
    }

    /// Run one agent command and return its JSON payload untouched.
    ///
    /// # Errors
    ///
    /// See [`parse_response`]; additionally [`DeployError::Timeout`],
    /// [`DeployError::Cancelled`], and [`DeployError::Connection`] when the
    /// session transport fails.
    pub async fn invoke(&self, command: AgentCommand, args: &CommandArgs) -> Result<Value, DeployError> {
        let line = command_line(command, args);
        debug!(%command, host = self.shell.target(), "invoking agent");

        let output = tokio::select! {
            biased;
            () = self.cancel.cancelled() => return Err(DeployError::Cancelled),
            res = tokio::time::timeout(self.timeout, self.shell.exec(&line)) => match res {
                Err(_) => {
                    return Err(DeployError::Timeout {
                        command: command.to_string(),
                        seconds: self.timeout.as_secs(),
                    });
                }
                Ok(Err(e)) => {
                    return Err(DeployError::Connection {
                        target: self.shell.target().to_string(),
                        message: format!("{e:#}"),
                    });
                }
                Ok(Ok(output)) => output,
            },
        };
        // Ctrl-C also reaches the foreground ssh client, which may exit
        // before the token is observed.
        if self.cancel.is_cancelled() {
            return Err(DeployError::Cancelled);
        }

        parse_response(command, &output)
    }

    /// Ask the agent to clone (or fetch) each `(repo_url, subdomain)` pair.
    ///
    /// # Errors
    ///
    /// Any [`Self::invoke`] failure.
    pub async fn clone_repos(&self, pairs: &[(&str, &str)]) -> Result<(), DeployError> {
        let tokens = pairs
            .iter()
            .flat_map(|(repo, subdomain)| [(*repo).to_string(), (*subdomain).to_string()])
            .collect();
        self.invoke(AgentCommand::Clone, &CommandArgs::PlainTokens(tokens))
            .await
            .map(drop)
    }

    /// Rebuild and route `subdomains` under `domain`.
    ///
    /// # Errors
    ///
    /// Any [`Self::invoke`] failure.
    pub async fn rebuild(&self, domain: &str, subdomains: Vec<SubdomainSpec>) -> Result<(), DeployError> {
        let command = AgentCommand::Rebuild;
        let request = RebuildRequest {
            domain: domain.to_string(),
            subdomains,
        };
        let Ok(Value::Object(object)) = serde_json::to_value(&request) else {
            return Err(DeployError::RemoteCommand {
                command: command.to_string(),
                message: "rebuild request is not a JSON object".to_string(),
            });
        };
        self.invoke(command, &CommandArgs::StructuredJson(object))
            .await
            .map(drop)
    }

    /// Stop and delete `subdomains`.
    ///
    /// # Errors
    ///
    /// Any [`Self::invoke`] failure.
    pub async fn remove(&self, subdomains: &[String]) -> Result<(), DeployError> {
        self.invoke(AgentCommand::Remove, &CommandArgs::PlainTokens(subdomains.to_vec()))
            .await
            .map(drop)
    }

    /// Services currently deployed on the server.
    ///
    /// # Errors
    ///
    /// Any [`Self::invoke`] failure, or [`DeployError::Decode`] when the
    /// payload is not a list of services.
    pub async fn list_services(&self) -> Result<Vec<ServiceRecord>, DeployError> {
        let command = AgentCommand::ListServices;
        let value = self.invoke(command, &CommandArgs::PlainTokens(Vec::new())).await?;
        serde_json::from_value(value.clone()).map_err(|e| {
            error!(%command, error = %e, "unexpected list-services payload");
            DeployError::Decode {
                command: command.to_string(),
                raw_payload: value.to_string(),
            }
        })
    }
}
