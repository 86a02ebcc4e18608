//! [`ServerRegistry`]: the set of installed tool servers, their supervision
//! tasks, and the union view (`tools/list`, `/mcp/status`) over all of them
//! (§4.2). One registry is a process-wide singleton (§9 — "process-wide
//! state").

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use octave_error::Error;
use octave_protocol::{McpCall, McpCallStatus};
use octave_storage::Db;

use crate::server::{MAX_RESTART_ATTEMPTS, ServerConfig, ServerStatus, ToolDescriptor, ToolServer};

#[derive(Debug, Clone, Serialize)]
pub struct ServerStatusInfo {
    pub id: String,
    pub name: String,
    pub status: String,
    pub error: Option<String>,
    pub tool_count: usize,
    pub restart_attempts: u32,
}

pub struct ServerRegistry {
    servers: RwLock<HashMap<String, Arc<RwLock<ToolServer>>>>,
    db: Arc<Db>,
}

impl ServerRegistry {
    pub fn new(db: Arc<Db>) -> Self {
        Self {
            servers: RwLock::new(HashMap::new()),
            db,
        }
    }

    /// Installs a server definition in `Installed` state without starting
    /// its process. Returns the normalized server id.
    pub async fn install(&self, id: String, config: ServerConfig) -> String {
        let server = ToolServer::new(id.clone(), config);
        self.servers
            .write()
            .await
            .insert(id.clone(), Arc::new(RwLock::new(server)));
        id
    }

    /// Starts the server's process and spawns a supervisor task that
    /// detects crashes and, if `auto_restart` is set, retries with
    /// exponential backoff up to [`MAX_RESTART_ATTEMPTS`] (§4.2).
    pub async fn start(&self, id: &str) -> Result<(), Error> {
        let handle = self.get(id).await?;
        {
            let mut server = handle.write().await;
            server.start().await?;
        }
        self.spawn_supervisor(id.to_string(), handle);
        Ok(())
    }

    pub async fn stop(&self, id: &str) -> Result<(), Error> {
        let handle = self.get(id).await?;
        handle.write().await.stop().await;
        Ok(())
    }

    pub async fn uninstall(&self, id: &str) -> Result<(), Error> {
        let handle = self.get(id).await?;
        handle.write().await.stop().await;
        self.servers.write().await.remove(id);
        Ok(())
    }

    /// Union of tools advertised by every `Running` server (§4.2 `tools/list`).
    pub async fn list_tools(&self) -> Vec<ToolDescriptor> {
        let servers = self.servers.read().await;
        let mut tools = Vec::new();
        for handle in servers.values() {
            let server = handle.read().await;
            if server.status().is_running() {
                tools.extend(server.tools().iter().cloned());
            }
        }
        tools
    }

    /// Tail of stderr for one installed server (`GET /mcp/logs/:serverId`).
    pub async fn logs_for(&self, id: &str, lines: usize) -> Result<Vec<String>, Error> {
        let handle = self.get(id).await?;
        Ok(handle.read().await.recent_logs(lines))
    }

    pub async fn status_snapshot(&self) -> Vec<ServerStatusInfo> {
        let servers = self.servers.read().await;
        let mut out = Vec::with_capacity(servers.len());
        for (id, handle) in servers.iter() {
            let server = handle.read().await;
            let (status_name, error) = match server.status() {
                ServerStatus::Installed => ("installed".to_string(), None),
                ServerStatus::Starting => ("starting".to_string(), None),
                ServerStatus::Running => ("running".to_string(), None),
                ServerStatus::Stopped => ("stopped".to_string(), None),
                ServerStatus::Error(message) => ("error".to_string(), Some(message.clone())),
            };
            out.push(ServerStatusInfo {
                id: id.clone(),
                name: server.config.name.clone(),
                status: status_name,
                error,
                tool_count: server.tools().len(),
                restart_attempts: server.restart_attempts(),
            });
        }
        out
    }

    /// Locates the server advertising `tool_name`, opens a pending
    /// [`McpCall`] row, forwards the call, and records the terminal
    /// status (§4.2 `tools/call`, §8 scenario 5).
    pub async fn call_tool(&self, tool_name: &str, arguments: Value) -> Result<Value, Error> {
        self.call_tool_scoped(tool_name, arguments, None).await
    }

    /// As [`Self::call_tool`], but when `server_id` is given the tool must
    /// belong to that exact server (`POST /mcp/call`'s optional `serverId`,
    /// §6) — a name collision across servers does not silently pick the
    /// wrong one.
    pub async fn call_tool_scoped(
        &self,
        tool_name: &str,
        arguments: Value,
        server_id: Option<&str>,
    ) -> Result<Value, Error> {
        let (server_id, server_name, handle) = self.find_owning_server(tool_name, server_id).await?;

        let call_id = Uuid::new_v4().to_string();
        let started_at = now_ms();
        let call = McpCall::pending(
            call_id.clone(),
            started_at,
            server_id.clone(),
            server_name,
            "tools/call",
            tool_name,
            arguments.clone(),
        );
        self.db.insert_pending_call(&call)?;

        let server = handle.read().await;
        let result = server.call_tool(tool_name, arguments).await;
        drop(server);

        let duration_ms = now_ms() - started_at;
        match &result {
            Ok(value) => {
                self.db.complete_call_success(&call_id, value, duration_ms)?;
            }
            Err(e) => {
                let status = match e {
                    Error::ToolCallTimeout { .. } => McpCallStatus::Timeout,
                    _ => McpCallStatus::Error,
                };
                let error_payload = serde_json::json!({"message": e.to_string()});
                self.db.complete_call_failed(&call_id, status, &error_payload, duration_ms)?;
            }
        }
        result
    }

    async fn find_owning_server(
        &self,
        tool_name: &str,
        server_id: Option<&str>,
    ) -> Result<(String, String, Arc<RwLock<ToolServer>>), Error> {
        let servers = self.servers.read().await;
        for (id, handle) in servers.iter() {
            if server_id.is_some_and(|wanted| wanted != id) {
                continue;
            }
            let server = handle.read().await;
            if server.status().is_running() && server.tools().iter().any(|t| t.name == tool_name) {
                return Ok((id.clone(), server.config.name.clone(), handle.clone()));
            }
        }
        Err(Error::NotFound {
            kind: "tool".to_string(),
            id: tool_name.to_string(),
        })
    }

    async fn get(&self, id: &str) -> Result<Arc<RwLock<ToolServer>>, Error> {
        self.servers
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| Error::NotFound {
                kind: "tool_server".to_string(),
                id: id.to_string(),
            })
    }

    fn spawn_supervisor(&self, id: String, handle: Arc<RwLock<ToolServer>>) {
        tokio::spawn(async move {
            loop {
                // Clone the child handle out from under a short-lived read
                // guard, then await its exit with no guard held at all —
                // `ChildProcess::wait` can run for as long as the server is
                // healthy, and holding `handle.read()` across that would
                // starve `stop`/`uninstall`'s `write().await` forever (a
                // tokio `RwLock` cannot grant a writer while any reader is
                // alive).
                let process = {
                    let server = handle.read().await;
                    server.process_handle()
                };
                let wait_result = match process {
                    Some(process) => process.wait().await.map_err(|e| Error::ToolServerCrashed {
                        server_id: id.clone(),
                        message: e.to_string(),
                    }),
                    None => Err(Error::ToolServerUnavailable {
                        server_id: id.clone(),
                    }),
                };

                let mut server = handle.write().await;
                if *server.status() == ServerStatus::Stopped {
                    // Explicit `stop` raced the exit; leave it alone.
                    break;
                }
                let message = wait_result.err().map_or_else(
                    || "child process exited unexpectedly".to_string(),
                    |e| e.to_string(),
                );
                server.mark_crashed(message);
                tracing::warn!(server_id = %id, "tool server crashed");

                if !server.config.auto_restart || server.restart_attempts() >= MAX_RESTART_ATTEMPTS {
                    break;
                }
                let attempt = server.record_restart_attempt();
                let backoff = Duration::from_millis(500 * 2u64.saturating_pow(attempt.saturating_sub(1)));
                drop(server);

                tokio::time::sleep(backoff).await;

                let mut server = handle.write().await;
                if *server.status() == ServerStatus::Stopped {
                    // Stopped (or uninstalled) while backing off; honor that.
                    break;
                }
                if server.start().await.is_ok() {
                    drop(server);
                    continue;
                }
                break;
            }
        });
    }
}

fn now_ms() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
#[path = "registry.test.rs"]
mod tests;
