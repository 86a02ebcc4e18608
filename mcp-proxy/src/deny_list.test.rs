use super::*;

#[test]
fn allows_ordinary_commands() {
    assert!(check_command("ls -la").is_ok());
    assert!(check_command("cargo build --release").is_ok());
}

#[test]
fn blocks_every_listed_substring() {
    for denied in DENIED_SUBSTRINGS {
        let command = format!("echo before && {denied} && echo after");
        let err = check_command(&command).unwrap_err();
        assert!(matches!(err, Error::DangerousCommand { .. }));
    }
}

#[test]
fn blocks_rm_rf_root_as_a_substring_of_a_longer_command() {
    assert!(check_command("cd / && rm -rf / --no-preserve-root").is_err());
}

#[test]
fn sudo_is_blocked_anywhere_in_the_command() {
    assert!(check_command("sudo apt-get install foo").is_err());
}
