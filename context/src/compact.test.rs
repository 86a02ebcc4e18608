use std::io::Write;
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

use octave_protocol::Role;
use tempfile::tempdir;

use super::*;

fn filler_messages(n: usize) -> Vec<Message> {
    (0..n)
        .map(|i| Message {
            id: format!("m{i}"),
            conversation_id: "c".to_string(),
            role: Role::User,
            content: "just some ordinary filler text".to_string(),
            timestamp: i as i64,
            metadata: None,
        })
        .collect()
}

fn write_fake_cli(dir: &std::path::Path, script: &str) -> String {
    let path = dir.join("fake-cli.sh");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(script.as_bytes()).unwrap();
    #[cfg(unix)]
    {
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
    }
    path.to_string_lossy().into_owned()
}

#[tokio::test]
async fn successful_compact_returns_summary_and_token_totals() {
    let dir = tempdir().unwrap();
    let cli = write_fake_cli(
        dir.path(),
        "#!/bin/sh\ncat >/dev/null\necho '{\"text\":\"summarized content\"}'\n",
    );

    let settings = CompactSettings {
        cli_command: cli,
        max_attempts: 1,
        base_backoff: Duration::from_millis(1),
    };
    let messages = filler_messages(25);
    let cancel = CancellationToken::new();

    let outcome = compact(&settings, &messages, SmartSelectionParams::default(), &cancel)
        .await
        .unwrap();

    assert_eq!(outcome.summary, "summarized content");
    assert_eq!(outcome.summarized_count, 12);
    assert!(outcome.tokens_after > 0);
}

#[tokio::test]
async fn already_cancelled_token_surfaces_cancelled() {
    let dir = tempdir().unwrap();
    let cli = write_fake_cli(
        dir.path(),
        "#!/bin/sh\ncat >/dev/null\necho '{\"text\":\"unused\"}'\n",
    );
    let settings = CompactSettings {
        cli_command: cli,
        max_attempts: 3,
        base_backoff: Duration::from_millis(1),
    };
    let messages = filler_messages(25);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = compact(&settings, &messages, SmartSelectionParams::default(), &cancel)
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), octave_error::StatusCode::Cancelled);
}

#[tokio::test]
async fn a_cli_that_always_fails_exhausts_retries_and_surfaces_model_error() {
    let dir = tempdir().unwrap();
    let cli = write_fake_cli(dir.path(), "#!/bin/sh\ncat >/dev/null\nexit 1\n");
    let settings = CompactSettings {
        cli_command: cli,
        max_attempts: 2,
        base_backoff: Duration::from_millis(1),
    };
    let messages = filler_messages(25);
    let cancel = CancellationToken::new();

    let err = compact(&settings, &messages, SmartSelectionParams::default(), &cancel)
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), octave_error::StatusCode::ModelError);
}
