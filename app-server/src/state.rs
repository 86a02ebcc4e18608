//! The one piece of shared, cloneable state every surface (IPC, HTTP, stdio)
//! dispatches against: the persistence layer and the tool-server registry
//! (§6 — "the core wires PL/TSP/MIP/CCE together behind three surfaces").

use std::sync::Arc;

use octave_context::CompactSettings;
use octave_mcp_proxy::ServerRegistry;
use octave_storage::Db;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Db>,
    pub registry: Arc<ServerRegistry>,
    pub compact_settings: CompactSettings,
}

impl AppState {
    pub fn new(db: Arc<Db>, registry: Arc<ServerRegistry>, compact_cli: String) -> Self {
        Self {
            db,
            registry,
            compact_settings: CompactSettings {
                cli_command: compact_cli,
                ..CompactSettings::default()
            },
        }
    }
}

pub fn now_ms() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
