//! Platform-sensitive resolution of a tool server's `command` (§4.2).
//!
//! Unix lets the kernel's shebang mechanism and `PATH` search handle
//! anything `Command::new` is given, so resolution there is a no-op. Windows
//! cannot execute an extension-less script name directly; it needs a
//! `PATHEXT`-aware lookup, which [`which::which_in`] provides.

use std::collections::HashMap;
use std::ffi::OsString;

#[cfg(windows)]
use std::env;

#[cfg(unix)]
pub fn resolve(program: OsString, _env: &HashMap<String, String>) -> std::io::Result<OsString> {
    Ok(program)
}

#[cfg(windows)]
pub fn resolve(program: OsString, env: &HashMap<String, String>) -> std::io::Result<OsString> {
    let cwd = env::current_dir()
        .map_err(|e| std::io::Error::other(format!("failed to get current directory: {e}")))?;
    let search_path = env.get("PATH");

    match which::which_in(&program, search_path, &cwd) {
        Ok(resolved) => {
            tracing::debug!(?program, ?resolved, "resolved tool server program");
            Ok(resolved.into_os_string())
        }
        Err(e) => {
            tracing::debug!(?program, error = %e, "failed to resolve program, using as-is");
            Ok(program)
        }
    }
}

#[cfg(test)]
#[path = "program_resolver.test.rs"]
mod tests;
