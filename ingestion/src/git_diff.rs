//! Shared `git diff`-text parsing, used both by the block segmenter (when an
//! assistant message embeds a raw diff) and the file-change aggregator (when
//! a tool trace hands us a whole `git diff` invocation's output).

use octave_protocol::ChangeType;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitDiffFile {
    pub file_path: String,
    pub change_type: ChangeType,
    pub additions: u32,
    pub deletions: u32,
}

/// Splits unified-diff text on `diff --git a/… b/…` headers and counts
/// `+`/`-` body lines per file, skipping the `+++`/`---` path headers
/// themselves. `new file mode` / `deleted file mode` lines mark creation and
/// deletion; anything else is a modification.
pub fn parse_git_diff_text(text: &str) -> Vec<GitDiffFile> {
    let mut files = Vec::new();
    let mut current: Option<GitDiffFile> = None;

    for line in text.lines() {
        if let Some(header) = line.strip_prefix("diff --git ") {
            if let Some(file) = current.take() {
                files.push(file);
            }
            current = Some(GitDiffFile {
                file_path: extract_git_header_path(header).unwrap_or_default(),
                change_type: ChangeType::Modified,
                additions: 0,
                deletions: 0,
            });
            continue;
        }

        let Some(file) = current.as_mut() else {
            continue;
        };

        if line.starts_with("new file mode") {
            file.change_type = ChangeType::Created;
        } else if line.starts_with("deleted file mode") {
            file.change_type = ChangeType::Deleted;
        } else if line.starts_with("+++") || line.starts_with("---") {
            // path header, not a content line
        } else if line.starts_with('+') {
            file.additions += 1;
        } else if line.starts_with('-') {
            file.deletions += 1;
        }
    }

    if let Some(file) = current.take() {
        files.push(file);
    }

    files.retain(|f| !f.file_path.is_empty());
    files
}

/// `a/path/to/file.rs b/path/to/file.rs` → `path/to/file.rs`. Falls back to
/// the raw `b/...` side when the two sides disagree (renames).
fn extract_git_header_path(header: &str) -> Option<String> {
    let mut parts = header.split(" b/");
    let a_side = parts.next()?;
    let b_side = parts.next();

    let from_a = a_side.strip_prefix("a/").map(str::to_string);
    let from_b = b_side.map(str::to_string);

    from_b.or(from_a)
}

#[cfg(test)]
#[path = "git_diff.test.rs"]
mod tests;
