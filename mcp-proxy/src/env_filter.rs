//! Environment variable allow-list for tool-server child processes (§4.2 —
//! "inherited environment filtered through an explicit allow-list"). A
//! supervisor that handed every server the full parent environment would
//! leak credentials meant for one server into every other.

use std::collections::HashMap;
use std::env;

#[cfg(unix)]
pub const DEFAULT_ENV_VARS: &[&str] = &[
    "HOME", "LOGNAME", "PATH", "SHELL", "USER", "LANG", "LC_ALL", "TERM", "TMPDIR", "TZ",
];

#[cfg(windows)]
pub const DEFAULT_ENV_VARS: &[&str] = &[
    "PATH",
    "PATHEXT",
    "COMSPEC",
    "SYSTEMROOT",
    "SYSTEMDRIVE",
    "USERNAME",
    "USERDOMAIN",
    "USERPROFILE",
    "HOMEDRIVE",
    "HOMEPATH",
    "PROGRAMFILES",
    "PROGRAMDATA",
    "LOCALAPPDATA",
    "APPDATA",
    "TEMP",
    "TMP",
];

/// Builds the environment a tool-server child process is spawned with: the
/// platform default allow-list plus `extra_vars` (e.g. from the server's own
/// config), each resolved against the *current* process's environment, then
/// overlaid with `extra_env` (explicit values the server config provides
/// directly, not read from this process).
pub fn build_server_env(
    extra_vars: &[String],
    extra_env: Option<HashMap<String, String>>,
) -> HashMap<String, String> {
    DEFAULT_ENV_VARS
        .iter()
        .copied()
        .chain(extra_vars.iter().map(String::as_str))
        .filter_map(|var| env::var(var).ok().map(|value| (var.to_string(), value)))
        .chain(extra_env.unwrap_or_default())
        .collect()
}

#[cfg(test)]
#[path = "env_filter.test.rs"]
mod tests;
