//! Tool-Server Proxy (§4.2): presents the union of many external tool-server
//! child processes as a single JSON-RPC surface. [`registry::ServerRegistry`]
//! owns the supervised child processes; [`dispatch::handle_request`] maps
//! incoming JSON-RPC onto it, used identically by the stdio proxy and the
//! HTTP bridge in `app-server`.

mod child_process;
mod deny_list;
mod dispatch;
mod env_filter;
mod jsonrpc;
mod program_resolver;
mod registry;
mod server;

pub use deny_list::check_command;
pub use dispatch::handle_request;
pub use jsonrpc::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
pub use registry::{ServerRegistry, ServerStatusInfo};
pub use server::{ServerConfig, ServerStatus, ToolDescriptor, normalize_server_id};
