#![allow(clippy::unwrap_used)]

use super::*;

#[test]
fn block_type_round_trips_through_wire_strings() {
    for bt in [
        BlockType::Text,
        BlockType::Code,
        BlockType::Command,
        BlockType::File,
        BlockType::Diff,
        BlockType::Error,
        BlockType::Result,
        BlockType::Diagram,
        BlockType::Link,
        BlockType::Quote,
        BlockType::List,
        BlockType::Table,
        BlockType::Tool,
        BlockType::Checklist,
        BlockType::FileSummary,
    ] {
        let s = bt.as_str();
        assert_eq!(BlockType::from_str(s), Some(bt));
    }
}

#[test]
fn file_summary_order_sentinel_sorts_last() {
    assert_eq!(FILE_SUMMARY_ORDER, 9999);
    assert!(FILE_SUMMARY_ORDER > 0);
}

#[test]
fn file_summary_metadata_serializes_camel_case_fields() {
    let meta = FileSummaryMetadata {
        files: vec![FileChangeEntry {
            file_path: "src/a.ts".into(),
            change_type: ChangeType::Modified,
            additions: 1,
            deletions: 1,
        }],
        total_files: 1,
        total_additions: 1,
        total_deletions: 1,
    };
    let json = serde_json::to_value(&meta).unwrap();
    assert_eq!(json["totalFiles"], 1);
    assert_eq!(json["files"][0]["changeType"], "modified");
}
