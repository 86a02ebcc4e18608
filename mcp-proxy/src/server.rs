//! A single installed tool server: its config, status machine, and (while
//! running) its live [`ChildProcess`] and advertised tool catalog (§4.2).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use octave_error::Error;

use crate::child_process::ChildProcess;
use crate::env_filter::build_server_env;
use crate::program_resolver;

pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);
pub const MAX_RESTART_ATTEMPTS: u32 = 5;

/// §4.2 status machine. `Error` carries the message that caused the
/// transition (spawn failure, non-zero `initialize`, or an observed crash).
#[derive(Debug, Clone, PartialEq)]
pub enum ServerStatus {
    Installed,
    Starting,
    Running,
    Stopped,
    Error(String),
}

impl ServerStatus {
    pub fn is_running(&self) -> bool {
        matches!(self, ServerStatus::Running)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "inputSchema")]
    pub input_schema: Value,
    #[serde(rename = "_serverId")]
    pub server_id: String,
    #[serde(rename = "_serverName")]
    pub server_name: String,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub name: String,
    pub command: String,
    pub args: Vec<String>,
    pub extra_env_vars: Vec<String>,
    pub extra_env: Option<HashMap<String, String>>,
    pub auto_restart: bool,
    pub call_timeout: Duration,
}

impl ServerConfig {
    pub fn new(name: impl Into<String>, command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            args,
            extra_env_vars: Vec::new(),
            extra_env: None,
            auto_restart: false,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }
}

/// Normalizes a package-style identifier into the opaque server id used
/// throughout the proxy and in `MCPCall.server_id`: leading `@` stripped,
/// `/` rewritten to `-` (§4.2).
pub fn normalize_server_id(raw: &str) -> String {
    raw.strip_prefix('@').unwrap_or(raw).replace('/', "-")
}

pub struct ToolServer {
    pub id: String,
    pub config: ServerConfig,
    status: ServerStatus,
    process: Option<Arc<ChildProcess>>,
    tools: Vec<ToolDescriptor>,
    restart_attempts: u32,
}

impl ToolServer {
    pub fn new(id: impl Into<String>, config: ServerConfig) -> Self {
        Self {
            id: id.into(),
            config,
            status: ServerStatus::Installed,
            process: None,
            tools: Vec::new(),
            restart_attempts: 0,
        }
    }

    pub fn status(&self) -> &ServerStatus {
        &self.status
    }

    pub fn tools(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    pub fn restart_attempts(&self) -> u32 {
        self.restart_attempts
    }

    /// Spawns the child process, resolves `command` for the current
    /// platform, filters the inherited environment, and runs the
    /// `initialize` handshake. Leaves status `Running` on success, `Error`
    /// otherwise.
    pub async fn start(&mut self) -> Result<(), Error> {
        self.status = ServerStatus::Starting;

        let resolved = program_resolver::resolve(
            self.config.command.clone().into(),
            &build_server_env(&[], None),
        )
        .map_err(|e| Error::ToolServerCrashed {
            server_id: self.id.clone(),
            message: format!("failed to resolve program: {e}"),
        })?;
        let command = resolved.to_string_lossy().into_owned();
        let env = build_server_env(&self.config.extra_env_vars, self.config.extra_env.clone());

        let process = match ChildProcess::spawn(&command, &self.config.args, &env) {
            Ok(process) => process,
            Err(e) => {
                self.status = ServerStatus::Error(e.to_string());
                return Err(e);
            }
        };

        let init_result = process
            .request(
                &self.id,
                "initialize",
                serde_json::json!({"protocolVersion": "2024-11-05"}),
                self.config.call_timeout,
            )
            .await;

        if let Err(e) = init_result {
            self.status = ServerStatus::Error(e.to_string());
            return Err(e);
        }
        process.notify("notifications/initialized", Value::Null).await.ok();

        let tools_result = process
            .request(&self.id, "tools/list", Value::Null, self.config.call_timeout)
            .await;

        self.tools = match tools_result {
            Ok(value) => parse_tool_list(&value, &self.id, &self.config.name),
            Err(_) => Vec::new(),
        };

        self.process = Some(Arc::new(process));
        self.status = ServerStatus::Running;
        self.restart_attempts = 0;
        Ok(())
    }

    /// Terminates the child process and marks the server `Stopped`. Any
    /// call still awaiting a response observes `ServerUnavailable` once its
    /// pending entry is dropped with the reader task.
    pub async fn stop(&mut self) {
        if let Some(process) = self.process.take() {
            process.kill().await;
        }
        self.status = ServerStatus::Stopped;
    }

    pub fn mark_crashed(&mut self, message: String) {
        self.process = None;
        self.status = ServerStatus::Error(message);
    }

    pub fn record_restart_attempt(&mut self) -> u32 {
        self.restart_attempts += 1;
        self.restart_attempts
    }

    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<Value, Error> {
        if !self.status.is_running() {
            return Err(Error::ToolServerUnavailable {
                server_id: self.id.clone(),
            });
        }
        let Some(process) = &self.process else {
            return Err(Error::ToolServerUnavailable {
                server_id: self.id.clone(),
            });
        };
        process
            .request(
                &self.id,
                "tools/call",
                serde_json::json!({"name": name, "arguments": arguments}),
                self.config.call_timeout,
            )
            .await
    }

    /// Tail of this server's stderr, or empty if it isn't currently running.
    pub fn recent_logs(&self, lines: usize) -> Vec<String> {
        self.process.as_ref().map(|p| p.recent_logs(lines)).unwrap_or_default()
    }

    /// An owned handle to the running child, or `None` if the server isn't
    /// `Running`. The supervisor clones this out from under a short-lived
    /// read lock and then awaits `ChildProcess::wait` on it with no lock
    /// held, so `stop`/`uninstall`'s `write().await` is never blocked behind
    /// a crash-detection wait on a healthy, long-running child.
    pub fn process_handle(&self) -> Option<Arc<ChildProcess>> {
        self.process.clone()
    }
}

fn parse_tool_list(value: &Value, server_id: &str, server_name: &str) -> Vec<ToolDescriptor> {
    let Some(tools) = value.get("tools").and_then(Value::as_array) else {
        return Vec::new();
    };
    tools
        .iter()
        .filter_map(|t| {
            let name = t.get("name")?.as_str()?.to_string();
            Some(ToolDescriptor {
                name,
                description: t
                    .get("description")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                input_schema: t.get("inputSchema").cloned().unwrap_or(Value::Null),
                server_id: server_id.to_string(),
                server_name: server_name.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
#[path = "server.test.rs"]
mod tests;
