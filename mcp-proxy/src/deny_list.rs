//! Command-substring deny-list for user-initiated shell execution (§1, §7).
//! Deliberately not a sandbox: a small, fixed list of substrings that are
//! almost never legitimate, checked before a command is ever handed to the
//! process spawner.

use octave_error::Error;

const DENIED_SUBSTRINGS: &[&str] = &["rm -rf /", "sudo", ":(){", "mkfs", "dd if="];

/// Returns `Ok(())` if `command` contains none of the denied substrings,
/// otherwise `Err(DangerousCommand)` naming the offending command verbatim
/// (this check runs before the IPC/HTTP boundary, so the full text is safe
/// to surface to the caller that issued it).
pub fn check_command(command: &str) -> Result<(), Error> {
    for denied in DENIED_SUBSTRINGS {
        if command.contains(denied) {
            return Err(Error::DangerousCommand {
                command: command.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "deny_list.test.rs"]
mod tests;
