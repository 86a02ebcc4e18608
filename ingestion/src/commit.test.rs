use tempfile::tempdir;

use super::*;

fn sample_message(content: &str) -> Message {
    Message {
        id: "m1".to_string(),
        conversation_id: "c1".to_string(),
        role: Role::Assistant,
        content: content.to_string(),
        timestamp: 1,
        metadata: None,
    }
}

#[test]
fn commits_segmented_blocks_and_a_trailing_file_summary() {
    let dir = tempdir().unwrap();
    let db = Db::open(dir.path()).unwrap();
    db.create_conversation("c1", None).unwrap();
    // save_message_with_blocks touches the owning conversation row, which
    // must already exist for its UPDATE to matter (it's a no-op otherwise).

    let message = sample_message("edited the file\n```rust\nfn x() {}\n```");
    let traces = vec![ToolTrace::Write {
        file_path: "/work/src/x.rs".to_string(),
        content: "fn x() {}\n".to_string(),
    }];

    let parsed = ingest_assistant_message(&db, &message, &traces, "/work").unwrap();
    assert_eq!(parsed.blocks.last().unwrap().block_type, BlockType::FileSummary);
    assert_eq!(parsed.blocks.last().unwrap().order, octave_protocol::FILE_SUMMARY_ORDER);

    let stored = db.get_blocks("m1").unwrap();
    assert_eq!(stored.len(), parsed.blocks.len());
}

#[test]
fn user_messages_never_get_a_file_summary_block() {
    let dir = tempdir().unwrap();
    let db = Db::open(dir.path()).unwrap();
    db.create_conversation("c1", None).unwrap();

    let mut message = sample_message("please edit src/x.rs");
    message.role = Role::User;

    let traces = vec![ToolTrace::Write {
        file_path: "/work/src/x.rs".to_string(),
        content: "fn x() {}\n".to_string(),
    }];

    let parsed = ingest_assistant_message(&db, &message, &traces, "/work").unwrap();
    assert!(
        parsed
            .blocks
            .iter()
            .all(|b| b.block_type != BlockType::FileSummary)
    );
}

#[test]
fn diff_blocks_in_the_body_feed_the_aggregator_too() {
    let dir = tempdir().unwrap();
    let db = Db::open(dir.path()).unwrap();
    db.create_conversation("c1", None).unwrap();

    let message = sample_message(
        "```diff\ndiff --git a/work/f.rs b/work/f.rs\n--- a/work/f.rs\n+++ b/work/f.rs\n+line\n```",
    );
    let parsed = ingest_assistant_message(&db, &message, &[], "/work").unwrap();

    let summary = parsed
        .blocks
        .iter()
        .find(|b| b.block_type == BlockType::FileSummary)
        .unwrap();
    let metadata: octave_protocol::FileSummaryMetadata =
        serde_json::from_value(summary.metadata.clone().unwrap()).unwrap();
    assert_eq!(metadata.total_files, 1);
}
