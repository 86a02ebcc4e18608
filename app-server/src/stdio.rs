//! The stdio JSON-RPC proxy (§6): the same line-delimited protocol
//! [`octave_mcp_proxy::ChildProcess`] speaks to a tool server, but here the
//! core itself is the server and an external client (the UI shell's
//! embedder, or a developer poking at it with `nc`) is the one driving it
//! over this process's own stdin/stdout.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use octave_mcp_proxy::{ServerRegistry, handle_request};

/// Reads one JSON-RPC request per line from `stdin` until EOF, dispatches
/// each through `registry`, and writes one response line per request with
/// an `id` to `stdout`. Malformed lines get a JSON-RPC parse-error response
/// rather than killing the loop (§4.2's "malformed input is never fatal"
/// carried over to this surface).
pub async fn serve(registry: Arc<ServerRegistry>) {
    let stdin = tokio::io::stdin();
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(stdin).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "stdio proxy read error");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let request = match serde_json::from_str::<octave_mcp_proxy::JsonRpcRequest>(&line) {
            Ok(request) => request,
            Err(e) => {
                tracing::debug!(%line, error = %e, "dropped malformed stdio JSON-RPC line");
                continue;
            }
        };

        if let Some(response) = handle_request(&registry, request).await {
            let Ok(mut serialized) = serde_json::to_string(&response) else {
                continue;
            };
            serialized.push('\n');
            if stdout.write_all(serialized.as_bytes()).await.is_err() {
                break;
            }
            if stdout.flush().await.is_err() {
                break;
            }
        }
    }
}
