use super::*;

#[test]
fn write_to_new_path_is_created_with_line_count_additions() {
    let mut agg = FileChangeAggregator::new("/work");
    agg.ingest(&ToolTrace::Write {
        file_path: "/work/src/new.rs".to_string(),
        content: "a\nb\nc\n".to_string(),
    });

    let block = agg.finish("m1").unwrap();
    let metadata: octave_protocol::FileSummaryMetadata =
        serde_json::from_value(block.metadata.unwrap()).unwrap();
    assert_eq!(metadata.total_files, 1);
    assert_eq!(metadata.files[0].file_path, "src/new.rs");
    assert_eq!(metadata.files[0].change_type, ChangeType::Created);
    assert_eq!(metadata.files[0].additions, 3);
    assert_eq!(metadata.files[0].deletions, 0);
}

#[test]
fn second_write_to_same_path_is_modified_not_created() {
    let mut agg = FileChangeAggregator::new("/work");
    agg.ingest(&ToolTrace::Write {
        file_path: "/work/a.txt".to_string(),
        content: "one\n".to_string(),
    });
    agg.ingest(&ToolTrace::Write {
        file_path: "/work/a.txt".to_string(),
        content: "one\ntwo\n".to_string(),
    });

    let block = agg.finish("m1").unwrap();
    let metadata: octave_protocol::FileSummaryMetadata =
        serde_json::from_value(block.metadata.unwrap()).unwrap();
    assert_eq!(metadata.total_files, 1);
    assert_eq!(metadata.files[0].change_type, ChangeType::Modified);
}

#[test]
fn edit_diff_is_multiset_line_difference() {
    let mut agg = FileChangeAggregator::new("/work");
    agg.ingest(&ToolTrace::Edit {
        file_path: "/work/lib.rs".to_string(),
        old_string: "a\nb\nc\n".to_string(),
        new_string: "a\nB\nc\n".to_string(),
    });

    let block = agg.finish("m1").unwrap();
    let metadata: octave_protocol::FileSummaryMetadata =
        serde_json::from_value(block.metadata.unwrap()).unwrap();
    assert_eq!(metadata.files[0].additions, 1);
    assert_eq!(metadata.files[0].deletions, 1);
}

#[test]
fn absolute_path_outside_workspace_root_is_dropped_with_a_warning() {
    let mut agg = FileChangeAggregator::new("/work");
    agg.ingest(&ToolTrace::Write {
        file_path: "/etc/passwd".to_string(),
        content: "x\n".to_string(),
    });

    assert!(agg.finish("m1").is_none());
}

#[test]
fn relative_path_with_dot_slash_and_backslashes_is_normalized() {
    let mut agg = FileChangeAggregator::new("/work");
    agg.ingest(&ToolTrace::Write {
        file_path: "./src\\mod.rs".to_string(),
        content: "x\n".to_string(),
    });

    let block = agg.finish("m1").unwrap();
    let metadata: octave_protocol::FileSummaryMetadata =
        serde_json::from_value(block.metadata.unwrap()).unwrap();
    // Path::new on unix treats backslash as a plain filename character, so
    // this collapses to a single normalized path rather than two components.
    assert_eq!(metadata.files.len(), 1);
}

#[test]
fn duplicate_touches_of_the_same_file_collapse_into_one_entry() {
    let mut agg = FileChangeAggregator::new("/work");
    agg.ingest(&ToolTrace::Edit {
        file_path: "/work/a.rs".to_string(),
        old_string: "x\n".to_string(),
        new_string: "y\n".to_string(),
    });
    agg.ingest(&ToolTrace::Edit {
        file_path: "/work/a.rs".to_string(),
        old_string: "y\n".to_string(),
        new_string: "z\n".to_string(),
    });

    let block = agg.finish("m1").unwrap();
    let metadata: octave_protocol::FileSummaryMetadata =
        serde_json::from_value(block.metadata.unwrap()).unwrap();
    assert_eq!(metadata.total_files, 1);
    assert_eq!(metadata.files[0].additions, 2);
    assert_eq!(metadata.files[0].deletions, 2);
}

#[test]
fn no_entries_means_no_file_summary_block() {
    let agg = FileChangeAggregator::new("/work");
    assert!(agg.finish("m1").is_none());
}

#[test]
fn git_diff_text_with_multiple_files_aggregates_each() {
    let mut agg = FileChangeAggregator::new("/work");
    agg.ingest(&ToolTrace::GitDiffText(
        "diff --git a/work/one.rs b/work/one.rs\n\
         --- a/work/one.rs\n+++ b/work/one.rs\n+x\n\
         diff --git a/work/two.rs b/work/two.rs\n\
         --- a/work/two.rs\n+++ b/work/two.rs\n-y\n"
            .to_string(),
    ));

    let block = agg.finish("m1").unwrap();
    let metadata: octave_protocol::FileSummaryMetadata =
        serde_json::from_value(block.metadata.unwrap()).unwrap();
    assert_eq!(metadata.total_files, 2);
    assert_eq!(metadata.total_additions, 1);
    assert_eq!(metadata.total_deletions, 1);
}
