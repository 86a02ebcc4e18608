use super::*;

#[cfg(unix)]
#[test]
fn unix_resolve_returns_program_unchanged() {
    let env = HashMap::new();
    let resolved = resolve(OsString::from("node"), &env).unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(resolved, OsString::from("node"));
}

#[cfg(windows)]
#[test]
fn windows_resolve_falls_back_to_original_when_not_found() {
    let env = HashMap::new();
    let resolved =
        resolve(OsString::from("definitely-not-a-real-binary"), &env).unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(resolved, OsString::from("definitely-not-a-real-binary"));
}
