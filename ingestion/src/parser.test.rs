use super::*;

#[test]
fn plain_text_becomes_one_text_block() {
    let result = parse_message_to_blocks("just some prose\nacross two lines", "m1");
    assert_eq!(result.blocks.len(), 1);
    assert_eq!(result.blocks[0].block_type, BlockType::Text);
    assert!(result.errors.is_empty());
}

#[test]
fn fenced_code_becomes_a_code_block_with_language_metadata() {
    let content = "before\n```rust\nfn main() {}\n```\nafter";
    let result = parse_message_to_blocks(content, "m1");
    assert_eq!(result.blocks.len(), 3);
    assert_eq!(result.blocks[0].block_type, BlockType::Text);
    assert_eq!(result.blocks[1].block_type, BlockType::Code);
    assert_eq!(result.blocks[1].content, "fn main() {}");
    assert_eq!(
        result.blocks[1].metadata.as_ref().and_then(|v| v.get("language")),
        Some(&serde_json::Value::String("rust".to_string()))
    );
    assert_eq!(result.blocks[2].block_type, BlockType::Text);

    // order is dense and matches occurrence order
    assert_eq!(result.blocks[0].order, 0);
    assert_eq!(result.blocks[1].order, 1);
    assert_eq!(result.blocks[2].order, 2);
}

#[test]
fn fenced_diff_language_becomes_a_diff_block() {
    let content = "```diff\n--- a/x\n+++ b/x\n+added\n-removed\n```";
    let result = parse_message_to_blocks(content, "m1");
    assert_eq!(result.blocks.len(), 1);
    assert_eq!(result.blocks[0].block_type, BlockType::Diff);
    let metadata: DiffMetadata =
        serde_json::from_value(result.blocks[0].metadata.clone().unwrap()).unwrap();
    assert_eq!(metadata.additions, 1);
    assert_eq!(metadata.deletions, 1);
}

#[test]
fn unterminated_fence_is_a_warning_not_a_fatal_error() {
    let content = "before\n```rust\nfn main() {}";
    let result = parse_message_to_blocks(content, "m1");
    assert_eq!(result.blocks.len(), 2);
    assert_eq!(result.blocks[1].block_type, BlockType::Code);
    assert_eq!(result.errors.len(), 1);
}

#[test]
fn consecutive_dollar_lines_become_one_command_block() {
    let content = "run this:\n$ cargo build\n$ cargo test\ndone";
    let result = parse_message_to_blocks(content, "m1");
    assert_eq!(result.blocks.len(), 3);
    assert_eq!(result.blocks[1].block_type, BlockType::Command);
    assert_eq!(result.blocks[1].content, "cargo build\ncargo test");
}

#[test]
fn order_and_types_are_stable_across_reparses() {
    let content = "text\n```js\ncode\n```\n$ ls\nmore text";
    let first = parse_message_to_blocks(content, "m1");
    let second = parse_message_to_blocks(content, "m1");

    let shape = |p: &ParsedMessage| {
        p.blocks
            .iter()
            .map(|b| (b.block_type, b.order))
            .collect::<Vec<_>>()
    };
    assert_eq!(shape(&first), shape(&second));
}
