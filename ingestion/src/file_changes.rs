//! File-change aggregation (§4.3): folds a turn's Edit/Write tool traces and
//! parsed diff content into one `file-summary` block, keyed by a
//! workspace-relative, normalized path so repeated touches of the same file
//! collapse into a single entry.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use octave_protocol::{
    Block, BlockType, ChangeType, DiffMetadata, FILE_SUMMARY_ORDER, FileChangeEntry,
    FileSummaryMetadata,
};

use crate::git_diff::parse_git_diff_text;

/// A tool-call observation fed into the aggregator for a single turn. Crosses
/// the IPC boundary as JSON (`message:ingest-assistant`'s `toolTraces`), so
/// this carries `serde` derives like the rest of `octave_protocol`'s wire
/// types even though it otherwise lives entirely inside this crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum ToolTrace {
    Edit {
        file_path: String,
        old_string: String,
        new_string: String,
    },
    Write {
        file_path: String,
        content: String,
    },
    /// Raw `git diff` output, possibly spanning several files.
    GitDiffText(String),
}

pub struct FileChangeAggregator {
    workspace_root: PathBuf,
    order: Vec<String>,
    entries: HashMap<String, FileChangeEntry>,
    warnings: Vec<String>,
}

impl FileChangeAggregator {
    pub fn new(workspace_root: impl Into<PathBuf>) -> Self {
        Self {
            workspace_root: workspace_root.into(),
            order: Vec::new(),
            entries: HashMap::new(),
            warnings: Vec::new(),
        }
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn ingest(&mut self, trace: &ToolTrace) {
        match trace {
            ToolTrace::Edit {
                file_path,
                old_string,
                new_string,
            } => self.ingest_edit(file_path, old_string, new_string),
            ToolTrace::Write { file_path, content } => self.ingest_write(file_path, content),
            ToolTrace::GitDiffText(text) => self.ingest_git_diff_text(text),
        }
    }

    pub fn ingest_diff_block(&mut self, metadata: &DiffMetadata) {
        let Some(path) = self.normalize(&metadata.file_path) else {
            return;
        };
        self.merge(path, ChangeType::Modified, metadata.additions, metadata.deletions);
    }

    fn ingest_edit(&mut self, file_path: &str, old_string: &str, new_string: &str) {
        let Some(path) = self.normalize(file_path) else {
            return;
        };
        let (additions, deletions) = line_multiset_diff(old_string, new_string);
        self.merge(path, ChangeType::Modified, additions, deletions);
    }

    fn ingest_write(&mut self, file_path: &str, content: &str) {
        let Some(path) = self.normalize(file_path) else {
            return;
        };
        let change_type = if self.entries.contains_key(&path) {
            ChangeType::Modified
        } else {
            ChangeType::Created
        };
        let additions = content.lines().count() as u32;
        self.merge(path, change_type, additions, 0);
    }

    fn ingest_git_diff_text(&mut self, text: &str) {
        for file in parse_git_diff_text(text) {
            let Some(path) = self.normalize(&file.file_path) else {
                continue;
            };
            self.merge(path, file.change_type, file.additions, file.deletions);
        }
    }

    fn merge(&mut self, path: String, change_type: ChangeType, additions: u32, deletions: u32) {
        match self.entries.get_mut(&path) {
            Some(entry) => {
                entry.additions += additions;
                entry.deletions += deletions;
                entry.change_type = change_type;
            }
            None => {
                self.order.push(path.clone());
                self.entries.insert(
                    path.clone(),
                    FileChangeEntry {
                        file_path: path,
                        change_type,
                        additions,
                        deletions,
                    },
                );
            }
        }
    }

    /// Workspace-relative, forward-slash path, or `None` (with a recorded
    /// warning) when `path` is absolute and escapes the workspace root.
    fn normalize(&mut self, path: &str) -> Option<String> {
        let as_path = Path::new(path);
        let relative = if as_path.is_absolute() {
            match as_path.strip_prefix(&self.workspace_root) {
                Ok(stripped) => stripped,
                Err(_) => {
                    self.warnings.push(format!(
                        "dropped path outside workspace root: {path}"
                    ));
                    return None;
                }
            }
        } else {
            as_path
        };

        let normalized = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/");

        let normalized = normalized.strip_prefix("./").unwrap_or(&normalized).to_string();
        if normalized.is_empty() {
            return None;
        }
        Some(normalized)
    }

    /// Emits the turn's `file-summary` block, or `None` if nothing was
    /// tracked. Consumes `self`: a fresh aggregator is created per turn.
    pub fn finish(self, message_id: &str) -> Option<Block> {
        if self.order.is_empty() {
            return None;
        }

        let files: Vec<FileChangeEntry> = self
            .order
            .into_iter()
            .filter_map(|path| self.entries.get(&path).cloned())
            .collect();

        let metadata = FileSummaryMetadata {
            total_files: files.len(),
            total_additions: files.iter().map(|f| f.additions).sum(),
            total_deletions: files.iter().map(|f| f.deletions).sum(),
            files,
        };

        Some(Block {
            id: Uuid::new_v4().to_string(),
            message_id: message_id.to_string(),
            block_type: BlockType::FileSummary,
            content: String::new(),
            metadata: serde_json::to_value(&metadata).ok(),
            order: FILE_SUMMARY_ORDER,
            created_at: Utc::now().to_rfc3339(),
        })
    }
}

/// Multiset line diff (§4.3): a line present `n` more times on the new side
/// than the old counts as `n` additions, and symmetrically for deletions.
/// This is not a positional LCS diff — reordered-but-unchanged lines net to
/// zero either way.
fn line_multiset_diff(old: &str, new: &str) -> (u32, u32) {
    let mut counts: HashMap<&str, i64> = HashMap::new();
    for line in old.lines() {
        *counts.entry(line).or_insert(0) -= 1;
    }
    for line in new.lines() {
        *counts.entry(line).or_insert(0) += 1;
    }

    let mut additions = 0u32;
    let mut deletions = 0u32;
    for count in counts.into_values() {
        if count > 0 {
            additions += count as u32;
        } else if count < 0 {
            deletions += (-count) as u32;
        }
    }
    (additions, deletions)
}

#[cfg(test)]
#[path = "file_changes.test.rs"]
mod tests;
