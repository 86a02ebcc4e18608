use super::*;

#[test]
fn harvests_file_paths_with_common_extensions() {
    let content = "I edited src/lib.rs and also tests/commit.test.rs. See README.md too.";
    let extracted = extract_context(content);
    assert_eq!(
        extracted.file_paths,
        vec!["src/lib.rs", "tests/commit.test.rs", "README.md"]
    );
}

#[test]
fn harvests_backtick_identifiers_excluding_ones_already_a_file_path() {
    let content = "Rename `parse_message_to_blocks` and fix `src/lib.rs`.";
    let extracted = extract_context(content);
    assert_eq!(extracted.identifiers, vec!["parse_message_to_blocks"]);
    assert_eq!(extracted.file_paths, vec!["src/lib.rs"]);
}

#[test]
fn deduplicates_while_preserving_first_occurrence_order() {
    let content = "`a` then `b` then `a` again";
    let extracted = extract_context(content);
    assert_eq!(extracted.identifiers, vec!["a", "b"]);
}

#[test]
fn plain_prose_yields_nothing() {
    let extracted = extract_context("just some words with no code or paths");
    assert!(extracted.file_paths.is_empty());
    assert!(extracted.identifiers.is_empty());
}
