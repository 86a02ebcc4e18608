use super::*;

#[test]
fn path_is_always_inherited_when_set() {
    // SAFETY: test-local env mutation, no other test in this crate reads PATH.
    unsafe { env::set_var("PATH", "/usr/bin") };
    let built = build_server_env(&[], None);
    assert_eq!(built.get("PATH").map(String::as_str), Some("/usr/bin"));
}

#[test]
fn extra_vars_are_pulled_from_process_env() {
    // SAFETY: test-local env mutation, unique var name avoids cross-test races.
    unsafe { env::set_var("OCTAVE_TEST_EXTRA_VAR", "hello") };
    let built = build_server_env(&["OCTAVE_TEST_EXTRA_VAR".to_string()], None);
    assert_eq!(
        built.get("OCTAVE_TEST_EXTRA_VAR").map(String::as_str),
        Some("hello")
    );
    unsafe { env::remove_var("OCTAVE_TEST_EXTRA_VAR") };
}

#[test]
fn explicit_extra_env_overrides_process_env() {
    unsafe { env::set_var("OCTAVE_TEST_OVERRIDE_VAR", "from-process") };
    let mut extra_env = HashMap::new();
    extra_env.insert("OCTAVE_TEST_OVERRIDE_VAR".to_string(), "from-config".to_string());
    let built = build_server_env(
        &["OCTAVE_TEST_OVERRIDE_VAR".to_string()],
        Some(extra_env),
    );
    assert_eq!(
        built.get("OCTAVE_TEST_OVERRIDE_VAR").map(String::as_str),
        Some("from-config")
    );
    unsafe { env::remove_var("OCTAVE_TEST_OVERRIDE_VAR") };
}

#[test]
fn unset_vars_are_absent_not_empty_string() {
    unsafe { env::remove_var("OCTAVE_TEST_NEVER_SET_VAR") };
    let built = build_server_env(&["OCTAVE_TEST_NEVER_SET_VAR".to_string()], None);
    assert!(!built.contains_key("OCTAVE_TEST_NEVER_SET_VAR"));
}
