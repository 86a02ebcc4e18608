//! `AppConfig`: the binary's only configuration surface (§6, §10). Resolved
//! in layers — built-in defaults, then the four `OCTAVE_*` environment
//! variables the core itself reads. Tool-server credentials are
//! deliberately not modeled here: the core passes them through to tool
//! servers via [`octave_mcp_proxy`]'s env allow-list without ever parsing
//! them itself.

use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

pub const DEFAULT_HTTP_PORT: u16 = 3737;
const DEFAULT_LOG_DIRECTIVE: &str = "info";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("OCTAVE_HTTP_PORT is not a valid port: {value}")]
    InvalidPort { value: String },
    #[error("OCTAVE_DATA_DIR is not a usable path: {value}")]
    InvalidPath { value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    /// Always loopback (§6 — "never listens on a non-loopback address");
    /// only the port is configurable.
    pub http_addr: IpAddr,
    pub http_port: u16,
    pub log_directive: String,
    pub compact_cli: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            http_addr: IpAddr::V4(Ipv4Addr::LOCALHOST),
            http_port: DEFAULT_HTTP_PORT,
            log_directive: DEFAULT_LOG_DIRECTIVE.to_string(),
            compact_cli: "claude".to_string(),
        }
    }
}

impl AppConfig {
    /// Layers the four `OCTAVE_*` environment variables over the built-in
    /// defaults. `OCTAVE_HTTP_ADDR` does not exist — the bridge always binds
    /// loopback regardless of environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(value) = std::env::var("OCTAVE_DATA_DIR") {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidPath { value });
            }
            config.data_dir = PathBuf::from(value);
        }

        if let Ok(value) = std::env::var("OCTAVE_HTTP_PORT") {
            config.http_port = u16::from_str(&value).map_err(|_| ConfigError::InvalidPort {
                value: value.clone(),
            })?;
        }

        if let Ok(value) = std::env::var("OCTAVE_LOG") {
            config.log_directive = value;
        }

        if let Ok(value) = std::env::var("OCTAVE_COMPACT_CLI") {
            config.compact_cli = value;
        }

        Ok(config)
    }
}

fn default_data_dir() -> PathBuf {
    dirs_next_data_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// A minimal, dependency-free stand-in for a user data directory lookup:
/// `$XDG_DATA_HOME` on Unix, `%APPDATA%` on Windows, falling back to `$HOME`.
fn dirs_next_data_dir() -> Option<PathBuf> {
    if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        if !xdg.trim().is_empty() {
            return Some(PathBuf::from(xdg));
        }
    }
    #[cfg(windows)]
    {
        if let Ok(appdata) = std::env::var("APPDATA") {
            return Some(PathBuf::from(appdata));
        }
    }
    std::env::var("HOME").ok().map(|home| PathBuf::from(home).join(".local/share"))
}

#[cfg(test)]
#[path = "config.test.rs"]
mod tests;
