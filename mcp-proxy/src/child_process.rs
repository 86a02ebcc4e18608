//! A tool server's child process: line-delimited JSON-RPC over stdio (§4.2).
//! Requests we send are demultiplexed by a numeric id we generate; responses
//! are matched back to the waiting caller via a oneshot channel. Malformed
//! lines from the child are dropped, never treated as a fatal protocol error
//! (§4.2 — "malformed lines from a tool server do not kill the server").

use std::collections::{HashMap, VecDeque};
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{ChildStdin, Command};
use tokio::sync::{Mutex, Notify, oneshot, watch};
use tokio::task::JoinHandle;

use octave_error::Error;

/// The outcome of a child process exiting, broadcast to every `wait()`/
/// `kill()` caller via a `watch` channel. Kept separate from
/// `std::io::Result<ExitStatus>` because `io::Error` isn't `Clone` and the
/// channel needs to hand the same outcome to every subscriber.
#[derive(Debug, Clone)]
enum ExitOutcome {
    Exited(ExitStatus),
    WaitFailed(String),
}

/// Caps the in-memory tail kept for `GET /mcp/logs/:serverId` (§6); older
/// lines are dropped, never written to disk by the proxy itself.
const LOG_BUFFER_CAPACITY: usize = 500;

#[derive(Deserialize)]
struct RawLine {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RawRpcError>,
}

#[derive(Deserialize)]
struct RawRpcError {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

/// A live connection to one tool server's stdio. Owns the writer half
/// directly; the reader runs in a background task for the lifetime of this
/// value and is aborted on drop.
pub struct ChildProcess {
    stdin: Mutex<ChildStdin>,
    pending: Arc<StdMutex<HashMap<u64, oneshot::Sender<Result<Value, String>>>>>,
    next_id: AtomicU64,
    reader_task: JoinHandle<()>,
    logs: Arc<StdMutex<VecDeque<String>>>,
    /// Requests the owning task (see `spawn`) kill the child. Never awaited
    /// directly — `kill()` notifies then waits on `exit_rx` like every other
    /// observer, so it never contends with an in-flight `wait()`.
    kill_notify: Arc<Notify>,
    /// Broadcasts the child's exit outcome once, to every `wait()`/`kill()`
    /// caller. The task that owns the `Child` is the only thing that ever
    /// calls its `wait()`/`start_kill()`, so those two operations never race
    /// each other across separate lock acquisitions.
    exit_rx: watch::Receiver<Option<ExitOutcome>>,
    wait_task: JoinHandle<()>,
}

impl ChildProcess {
    /// Spawns `command args[]` with the given environment and wires up the
    /// stdout reader. `command` has already been through
    /// [`crate::program_resolver::resolve`] by the time it reaches here.
    pub fn spawn(
        command: &str,
        args: &[String],
        env: &HashMap<String, String>,
    ) -> Result<Self, Error> {
        let mut cmd = Command::new(command);
        cmd.args(args)
            .env_clear()
            .envs(env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| Error::ToolServerCrashed {
            server_id: command.to_string(),
            message: format!("failed to spawn: {e}"),
        })?;

        let stdin = child.stdin.take().ok_or_else(|| Error::ToolServerCrashed {
            server_id: command.to_string(),
            message: "child process has no stdin".to_string(),
        })?;
        let stdout = child.stdout.take().ok_or_else(|| Error::ToolServerCrashed {
            server_id: command.to_string(),
            message: "child process has no stdout".to_string(),
        })?;
        let stderr = child.stderr.take();

        let pending: Arc<StdMutex<HashMap<u64, oneshot::Sender<Result<Value, String>>>>> =
            Arc::new(StdMutex::new(HashMap::new()));
        let pending_for_reader = pending.clone();
        let command_name = command.to_string();

        let reader_task = tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        if line.trim().is_empty() {
                            continue;
                        }
                        let Ok(parsed) = serde_json::from_str::<RawLine>(&line) else {
                            tracing::debug!(%command_name, %line, "dropped malformed JSON-RPC line");
                            continue;
                        };
                        let Some(id_value) = parsed.id else {
                            continue;
                        };
                        let Some(id) = id_value.as_u64() else {
                            continue;
                        };
                        let outcome = match (parsed.result, parsed.error) {
                            (Some(result), _) => Ok(result),
                            (None, Some(err)) => Err(format!("[{}] {}", err.code, err.message)),
                            (None, None) => Ok(Value::Null),
                        };
                        if let Some(sender) =
                            pending_for_reader.lock().unwrap_or_else(|e| e.into_inner()).remove(&id)
                        {
                            let _ = sender.send(outcome);
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        tracing::debug!(%command_name, error = %e, "tool server stdout read error");
                        break;
                    }
                }
            }
        });

        let logs: Arc<StdMutex<VecDeque<String>>> = Arc::new(StdMutex::new(VecDeque::new()));
        if let Some(stderr) = stderr {
            let command_name = command.to_string();
            let logs_for_stderr = logs.clone();
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    tracing::warn!(server = %command_name, "{line}");
                    let mut buffer = logs_for_stderr.lock().unwrap_or_else(|e| e.into_inner());
                    if buffer.len() >= LOG_BUFFER_CAPACITY {
                        buffer.pop_front();
                    }
                    buffer.push_back(line);
                }
            });
        }

        let kill_notify = Arc::new(Notify::new());
        let (exit_tx, exit_rx) = watch::channel(None);
        let kill_notify_for_wait = kill_notify.clone();
        // Owns `child` for its entire life: the only task that ever calls
        // its `wait()` or `start_kill()`, so those two never contend for a
        // lock the way a shared `Mutex<Child>` would (the bug this replaces
        // — `kill()` could never acquire a mutex held by an in-flight
        // `wait()`). Mirrors the teacher's own `select!` between "process
        // exited" and "cancellation requested" around a directly-owned
        // `Child` (`exec/shell`'s command executor).
        let wait_task = tokio::spawn(async move {
            let outcome = tokio::select! {
                status = child.wait() => status_to_outcome(status),
                () = kill_notify_for_wait.notified() => {
                    let _ = child.start_kill();
                    status_to_outcome(child.wait().await)
                }
            };
            let _ = exit_tx.send(Some(outcome));
        });

        Ok(Self {
            stdin: Mutex::new(stdin),
            pending,
            next_id: AtomicU64::new(1),
            reader_task,
            logs,
            kill_notify,
            exit_rx,
            wait_task,
        })
    }

    /// Returns up to the last `lines` stderr lines emitted by the child
    /// (`GET /mcp/logs/:serverId`, §6).
    pub fn recent_logs(&self, lines: usize) -> Vec<String> {
        let buffer = self.logs.lock().unwrap_or_else(|e| e.into_inner());
        buffer.iter().rev().take(lines).rev().cloned().collect()
    }

    /// Sends a request and awaits the matching response, or
    /// `ToolCallTimeout` if `timeout` elapses first. The child is not killed
    /// on timeout (§4.2, §5).
    pub async fn request(
        &self,
        server_id: &str,
        method: &str,
        params: Value,
        timeout: Duration,
    ) -> Result<Value, Error> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = oneshot::channel();
        self.pending.lock().unwrap_or_else(|e| e.into_inner()).insert(id, tx);

        let line = serde_json::json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        })
        .to_string();

        if let Err(e) = self.write_line(&line).await {
            self.pending.lock().unwrap_or_else(|e| e.into_inner()).remove(&id);
            return Err(e);
        }

        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(Ok(result))) => Ok(result),
            Ok(Ok(Err(message))) => Err(Error::ToolServerCrashed {
                server_id: server_id.to_string(),
                message,
            }),
            Ok(Err(_recv_error)) => Err(Error::ToolServerUnavailable {
                server_id: server_id.to_string(),
            }),
            Err(_elapsed) => {
                self.pending.lock().unwrap_or_else(|e| e.into_inner()).remove(&id);
                Err(Error::ToolCallTimeout {
                    server_id: server_id.to_string(),
                    tool_name: method.to_string(),
                })
            }
        }
    }

    /// Sends a one-way notification; the child never replies.
    pub async fn notify(&self, method: &str, params: Value) -> Result<(), Error> {
        let line = serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
        })
        .to_string();
        self.write_line(&line).await
    }

    async fn write_line(&self, line: &str) -> Result<(), Error> {
        let mut stdin = self.stdin.lock().await;
        stdin
            .write_all(line.as_bytes())
            .await
            .map_err(|e| Error::ToolServerCrashed {
                server_id: "<unknown>".to_string(),
                message: format!("write to stdin failed: {e}"),
            })?;
        stdin
            .write_all(b"\n")
            .await
            .map_err(|e| Error::ToolServerCrashed {
                server_id: "<unknown>".to_string(),
                message: format!("write to stdin failed: {e}"),
            })?;
        stdin.flush().await.map_err(|e| Error::ToolServerCrashed {
            server_id: "<unknown>".to_string(),
            message: format!("flush stdin failed: {e}"),
        })
    }

    /// Waits for the child to exit. Used by the supervisor to detect
    /// crashes; never holds a lock across the wait, so an explicit `kill()`
    /// preempts it instead of blocking behind it.
    pub async fn wait(&self) -> std::io::Result<ExitStatus> {
        let mut rx = self.exit_rx.clone();
        loop {
            if let Some(outcome) = rx.borrow().clone() {
                return match outcome {
                    ExitOutcome::Exited(status) => Ok(status),
                    ExitOutcome::WaitFailed(message) => Err(std::io::Error::other(message)),
                };
            }
            if rx.changed().await.is_err() {
                return Err(std::io::Error::other("child process exit watcher closed"));
            }
        }
    }

    /// Best-effort termination, used on explicit `stop` and on shutdown.
    /// Signals the task that owns the `Child` and waits for the exit it
    /// broadcasts, rather than locking the child itself.
    pub async fn kill(&self) {
        self.kill_notify.notify_one();
        let _ = self.wait().await;
    }
}

/// Folds `Child::wait()`'s result into the `Clone`-able outcome the `watch`
/// channel broadcasts.
fn status_to_outcome(result: std::io::Result<ExitStatus>) -> ExitOutcome {
    match result {
        Ok(status) => ExitOutcome::Exited(status),
        Err(e) => ExitOutcome::WaitFailed(e.to_string()),
    }
}

impl Drop for ChildProcess {
    fn drop(&mut self) {
        self.reader_task.abort();
        self.wait_task.abort();
    }
}

#[cfg(test)]
#[path = "child_process.test.rs"]
mod tests;
